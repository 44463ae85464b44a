//! Display fields derived from the selection: names, chants, colors

use super::result::SpellLore;
use crate::codex::{AttributeDef, RankDef};
use crate::types::MagicSystem;
use rand::Rng;

/// Name used when no known spell supplies one
pub fn spell_name(keyword: &AttributeDef, rank: &RankDef) -> String {
    format!("{}{}", keyword.kanji, rank.suffix)
}

/// Incantation, chosen by rank band
pub fn chant(attribute: &str, system: MagicSystem, keyword: &AttributeDef, rank: &RankDef) -> String {
    if rank.rank <= 2 {
        format!("我が声に応えよ、{}の精霊。{}を開始する。", attribute, rank.theory)
    } else if rank.rank <= 4 {
        format!(
            "深淵より来たる{}の理よ、我が魔力をもって形となせ。{}を引き起こせ！",
            keyword.reading, rank.effect
        )
    } else {
        format!(
            "原初の刻、{}の理において命ず。{}の権能をここに顕現させ、{}を完遂せよ。",
            system.label(),
            keyword.kanji,
            rank.theory
        )
    }
}

pub fn description(system: MagicSystem, keyword: &AttributeDef, rank: &RankDef) -> String {
    format!(
        "Ring {} {} spell. Applies {} to bring a {} of {} to the target area.",
        rank.rank,
        system.english(),
        rank.theory,
        rank.effect,
        keyword.kanji
    )
}

/// Attributes naming a domain (域) are their own domain
pub fn domain(attribute: &str) -> String {
    if attribute.contains('域') {
        attribute.to_string()
    } else {
        "通常領域".to_string()
    }
}

/// Eye color of the caster while channeling, as a hex string
pub fn eye_color(attribute: &str, system: MagicSystem) -> &'static str {
    let attr = attribute.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| attr.contains(k));
    let sys = system.label();

    if has(&["火", "fire", "熱", "灼", "煉獄"]) {
        "#ef4444"
    } else if has(&["水", "water", "氷", "ice", "凍"]) {
        "#3b82f6"
    } else if has(&["風", "wind", "空", "air", "音"]) {
        "#10b981"
    } else if has(&["土", "earth", "地", "rock"]) {
        "#a16207"
    } else if has(&["光", "light", "雷", "thunder", "星"]) {
        "#fbbf24"
    } else if has(&["闇", "dark", "影", "shadow"]) {
        "#7e22ce"
    } else if sys.contains("因果") || has(&["時", "律"]) {
        "#8b5cf6"
    } else if sys.contains("黎明") {
        "#fef08a"
    } else if sys.contains("創造") || has(&["夢", "心"]) {
        "#ec4899"
    } else {
        "#9ca3af"
    }
}

/// Consciousness level derived from the emotion index
pub fn consciousness(emotion_index: u32) -> &'static str {
    if emotion_index > 80 {
        "Exalted (変性意識)"
    } else if emotion_index > 50 {
        "Clear (覚醒)"
    } else {
        "Normal (通常)"
    }
}

/// Amplitude grows tenfold per rank
pub fn oip_amplitude(rank: u8) -> String {
    format!("1.00e+{} Wm", rank)
}

/// Resonance frequency, 400 to 500 THz
pub fn oip_frequency(rng: &mut impl Rng) -> String {
    format!("{:.2} THz", rng.gen_range(400.0..500.0))
}

pub fn lore(rank: &RankDef) -> SpellLore {
    SpellLore {
        magic_type: if rank.rank > 4 { "Ritual" } else { "Instant" }.to_string(),
        cost: if rank.rank > 5 { "Caster life force" } else { "Ambient mana" }.to_string(),
        theory: rank.theory.clone(),
    }
}
