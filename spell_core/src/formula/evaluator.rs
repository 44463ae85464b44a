//! Spell evaluation - turning a request + codex into a SpellResult

use super::factors::{
    base_power, buff_factor, climate_bonus, density_ratio, internal_factor, is_crisis,
    protection_factor, tool_factor, vitality_factor, weather_bonus, weather_note,
};
use super::naming;
use super::request::SpellRequest;
use super::result::{FormulaBreakdown, SpellLore, SpellResult};
use crate::codex::{Codex, HiddenArt};
use crate::config::FormulaConstants;
use crate::types::CasterStatus;
use rand::Rng;

/// Evaluate a spell request (uses the thread RNG for the cosmetic frequency)
pub fn evaluate(codex: &Codex, request: &SpellRequest, constants: &FormulaConstants) -> SpellResult {
    let mut rng = rand::thread_rng();
    evaluate_with_rng(codex, request, constants, &mut rng)
}

/// Evaluate with a provided RNG (for deterministic testing)
///
/// Never fails: unknown ids fall back to the inert protection and tool, the
/// rank is clamped and unknown attributes use their own name as keyword.
/// Damage itself draws no random numbers.
pub fn evaluate_with_rng(
    codex: &Codex,
    request: &SpellRequest,
    constants: &FormulaConstants,
    rng: &mut impl Rng,
) -> SpellResult {
    let request = request.normalized();
    let system = request.system;
    let attribute = request.attribute.as_str();

    let protection = codex.protection_or_none(&request.protection_id);
    let tool = codex.tool_or_unarmed(&request.tool_id);

    let mut caster = request.caster.clone();
    caster.consciousness = naming::consciousness(caster.emotion_index).to_string();

    if let Some(art) = codex.hidden_art(&request.protection_id, system, attribute, request.rank) {
        tracing::info!("hidden art triggered: {}", art.name);
        return hidden_art_result(art, &request, caster, &protection.name, &tool.name);
    }

    let keyword = codex.keyword(attribute, system);
    let rank_def = codex.rank(request.rank);
    let known = request.known_spell.as_ref();

    // Step 1: Base power
    let known_damage = known.map(|k| k.predicted_damage);
    let base = base_power(request.rank, known_damage, constants);
    let base_from_spell = known_damage.map_or(false, |d| d > 0);

    // Step 2: Caster state
    let hp_ratio = caster.hp_ratio();
    let internal = internal_factor(caster.emotion_index, caster.heart_rate);
    let vitality = vitality_factor(hp_ratio, constants);
    let crisis = is_crisis(hp_ratio, constants);

    // Step 3: Environment
    let env = &request.environment;
    let density = density_ratio(env.w_density, constants);
    let weather = weather_bonus(attribute, env.weather);
    let climate = if constants.climate_synergy {
        climate_bonus(attribute, env)
    } else {
        1.0
    };
    let environment = density * weather * climate;

    // Step 4: Modifiers
    let protection_mult = protection_factor(&protection, attribute, system);
    let protection_active = !protection.is_none() && protection.resonates_with(attribute, system);
    let tool_mult = tool_factor(&tool, system, request.reinforcement, constants);
    let buff = buff_factor(request.buff_level, constants);

    let breakdown = FormulaBreakdown {
        base,
        base_from_spell,
        internal,
        vitality,
        crisis,
        density,
        weather,
        climate,
        environment,
        protection: protection_mult,
        protection_active,
        tool: tool_mult,
        buff,
        fate: None,
    };
    let product = breakdown.product();
    let predicted_damage = if product.is_finite() && product > 0.0 {
        product.floor() as u64
    } else {
        0
    };

    // Step 5: Trace
    let mut lines = Vec::new();
    lines.push(format!(
        "[BASE] {}: {}",
        if base_from_spell { "Spell Power" } else { "Rank Power" },
        base
    ));
    lines.push(format!(
        "[INTERNAL] (Emotion {}% + Vitals {} bpm): x{:.3}",
        caster.emotion_index, caster.heart_rate, internal
    ));
    lines.push(format!(
        "[VITALITY] HP {}/{}: x{:.2} {}",
        caster.hp,
        caster.max_hp,
        vitality,
        if crisis { "(CRISIS BOOST)" } else { "(Health Factor)" }
    ));
    lines.push(format!("[EXTERNAL] (W-Density {}): x{:.2}", env.w_density, density));
    lines.push(format!(
        "[WEATHER] {} {}: x{:.2}",
        env.weather,
        weather_note(attribute, env.weather),
        weather
    ));
    if constants.climate_synergy {
        lines.push(format!(
            "[CLIMATE] {:.1}C / {}%: x{:.2}",
            env.temperature, env.humidity, climate
        ));
    }
    lines.push(format!(
        "[DIVINE] {} ({}): x{:.2}",
        protection.name,
        if protection.is_none() {
            "Inactive"
        } else if protection_active {
            "Active (Resonance)"
        } else {
            "Inactive (Incompatible)"
        },
        protection_mult
    ));
    lines.push(format!(
        "[TOOL] {} (Reinf: {:+}): x{:.2}",
        tool.name, request.reinforcement, tool_mult
    ));
    lines.push(format!("[BUFF] Resonance Amp: Lv{} (x{:.2})", request.buff_level, buff));
    lines.push("--------------------------------".to_string());
    lines.push(format!("TOTAL: {}", predicted_damage));

    tracing::debug!(
        "evaluated {} rank {} -> {} (base {}, env {:.3})",
        attribute,
        request.rank,
        predicted_damage,
        base,
        environment
    );

    SpellResult {
        name: known
            .and_then(|k| k.name.clone())
            .unwrap_or_else(|| naming::spell_name(&keyword, &rank_def)),
        system,
        attribute: request.attribute.clone(),
        domain: naming::domain(attribute),
        rank: request.rank,
        predicted_damage,
        trace: lines.join("\n"),
        breakdown: Some(breakdown),
        description: known
            .and_then(|k| k.description.clone())
            .unwrap_or_else(|| naming::description(system, &keyword, &rank_def)),
        chant: known
            .and_then(|k| k.chant.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| naming::chant(attribute, system, &keyword, &rank_def)),
        eye_color: naming::eye_color(attribute, system).to_string(),
        oip_amplitude: naming::oip_amplitude(request.rank),
        oip_frequency: naming::oip_frequency(rng),
        lore: naming::lore(&rank_def),
        caster,
        environment: request.environment.clone(),
        protection_id: protection.id.clone(),
        protection_name: protection.name.clone(),
        tool_id: tool.id.clone(),
        tool_name: tool.name.clone(),
        reinforcement: request.reinforcement,
        buff_level: request.buff_level,
        hidden_art: false,
    }
}

fn hidden_art_result(
    art: &HiddenArt,
    request: &SpellRequest,
    caster: CasterStatus,
    protection_name: &str,
    tool_name: &str,
) -> SpellResult {
    SpellResult {
        name: art.name.clone(),
        system: request.system,
        attribute: request.attribute.clone(),
        domain: request.attribute.clone(),
        rank: request.rank,
        predicted_damage: art.predicted_damage,
        trace: "[HIDDEN COMMAND] DIVINE INTERVENTION DETECTED. LIMITERS RELEASED.".to_string(),
        breakdown: None,
        description: art.description.clone(),
        chant: art.chant.clone(),
        eye_color: art.eye_color.clone(),
        oip_amplitude: art.oip_amplitude.clone(),
        oip_frequency: art.oip_frequency.clone(),
        lore: SpellLore {
            magic_type: "Hidden Art".to_string(),
            cost: "None".to_string(),
            theory: "Divine".to_string(),
        },
        caster,
        environment: request.environment.clone(),
        protection_id: request.protection_id.clone(),
        protection_name: protection_name.to_string(),
        tool_id: request.tool_id.clone(),
        tool_name: tool_name.to_string(),
        reinforcement: request.reinforcement,
        buff_level: request.buff_level,
        hidden_art: true,
    }
}
