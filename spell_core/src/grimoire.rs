//! Grimoire - in-memory record of manifested spells
//!
//! Entries keep insertion order. Queries return filtered, sorted views and
//! never reorder the underlying list.

use crate::codex::{Codex, LibrarySpell, ProtectionDef, ToolDef};
use crate::formula::{naming, KnownSpell, SpellLore, SpellResult};
use crate::types::{now_millis, CasterStatus, MagicSystem, SpellEnvironment};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GrimoireError {
    #[error("No grimoire entry with id '{0}'")]
    UnknownEntry(String),
    #[error("Spell name cannot be empty")]
    EmptyName,
}

/// A spell result recorded with an id and a millisecond timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestedSpell {
    pub id: String,
    pub timestamp: u64,
    pub spell: SpellResult,
}

impl ManifestedSpell {
    /// Power and texts used when this entry is cast again
    pub fn as_known(&self) -> KnownSpell {
        KnownSpell {
            name: Some(self.spell.name.clone()),
            description: Some(self.spell.description.clone()),
            chant: Some(self.spell.chant.clone()),
            predicted_damage: self.spell.predicted_damage,
        }
    }
}

/// Sort orders offered by the grimoire view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    RankDesc,
    DamageDesc,
}

impl SortOrder {
    pub fn all() -> &'static [SortOrder] {
        &[
            SortOrder::Newest,
            SortOrder::Oldest,
            SortOrder::RankDesc,
            SortOrder::DamageDesc,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Date (New)",
            SortOrder::Oldest => "Date (Old)",
            SortOrder::RankDesc => "Rank (High)",
            SortOrder::DamageDesc => "Damage (High)",
        }
    }

    /// Next order, wrapping around
    pub fn next(&self) -> SortOrder {
        let all = SortOrder::all();
        let idx = all.iter().position(|o| o == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

/// Filter, search and sort settings of a grimoire view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrimoireQuery {
    pub system: Option<MagicSystem>,
    /// Case-insensitive match on name or attribute
    pub search: String,
    pub sort: SortOrder,
}

impl GrimoireQuery {
    fn matches(&self, entry: &ManifestedSpell) -> bool {
        if let Some(system) = self.system {
            if entry.spell.system != system {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        let q = self.search.to_lowercase();
        entry.spell.name.to_lowercase().contains(&q)
            || entry.spell.attribute.to_lowercase().contains(&q)
    }
}

/// Manually registered spell, as entered in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDraft {
    pub name: String,
    pub system: MagicSystem,
    pub attribute: String,
    pub rank: u8,
    pub predicted_damage: u64,
    pub description: String,
    pub chant: String,
    pub protection_id: String,
}

impl SpellDraft {
    /// Editor defaults for a new entry
    pub fn blank(codex: &Codex) -> Self {
        SpellDraft {
            name: "Unnamed Spell".to_string(),
            system: MagicSystem::Elemental,
            attribute: codex
                .first_attribute(MagicSystem::Elemental)
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            rank: 1,
            predicted_damage: 100,
            description: "Manually registered spell effect.".to_string(),
            chant: "N/A".to_string(),
            protection_id: ProtectionDef::NONE_ID.to_string(),
        }
    }

    /// Draft pre-filled from an existing entry
    pub fn from_entry(entry: &ManifestedSpell) -> Self {
        SpellDraft {
            name: entry.spell.name.clone(),
            system: entry.spell.system,
            attribute: entry.spell.attribute.clone(),
            rank: entry.spell.rank,
            predicted_damage: entry.spell.predicted_damage,
            description: entry.spell.description.clone(),
            chant: entry.spell.chant.clone(),
            protection_id: entry.spell.protection_id.clone(),
        }
    }
}

/// Spell record without a formula run (library and manual entries)
#[allow(clippy::too_many_arguments)]
fn recorded_result(
    name: &str,
    system: MagicSystem,
    attribute: &str,
    rank: u8,
    predicted_damage: u64,
    description: &str,
    chant: &str,
    protection_id: &str,
) -> SpellResult {
    let rank = rank.clamp(1, 7);
    SpellResult {
        name: name.to_string(),
        system,
        attribute: attribute.to_string(),
        domain: naming::domain(attribute),
        rank,
        predicted_damage,
        trace: format!("[RECORDED] Registered power: {}", predicted_damage),
        breakdown: None,
        description: description.to_string(),
        chant: chant.to_string(),
        eye_color: naming::eye_color(attribute, system).to_string(),
        oip_amplitude: naming::oip_amplitude(rank),
        oip_frequency: "Unknown".to_string(),
        lore: SpellLore {
            magic_type: "Recorded".to_string(),
            cost: "Unknown".to_string(),
            theory: "Unknown".to_string(),
        },
        caster: CasterStatus::default(),
        environment: SpellEnvironment::default(),
        protection_id: protection_id.to_string(),
        protection_name: String::new(),
        tool_id: ToolDef::NONE_ID.to_string(),
        tool_name: String::new(),
        reinforcement: 0,
        buff_level: 0,
        hidden_art: false,
    }
}

impl From<&LibrarySpell> for ManifestedSpell {
    fn from(lib: &LibrarySpell) -> Self {
        ManifestedSpell {
            id: lib.id.clone(),
            timestamp: 0,
            spell: recorded_result(
                &lib.name,
                lib.system,
                &lib.attribute,
                lib.rank,
                lib.predicted_damage,
                &lib.description,
                &lib.chant,
                ProtectionDef::NONE_ID,
            ),
        }
    }
}

/// Ordered list of manifested spells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grimoire {
    entries: Vec<ManifestedSpell>,
}

impl Grimoire {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grimoire preloaded with the codex library
    pub fn with_library(codex: &Codex) -> Self {
        Grimoire {
            entries: codex.library().iter().map(ManifestedSpell::from).collect(),
        }
    }

    pub fn entries(&self) -> &[ManifestedSpell] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ManifestedSpell> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a finished spell
    pub fn push(&mut self, entry: ManifestedSpell) {
        tracing::info!("grimoire: recorded {} ({})", entry.id, entry.spell.name);
        self.entries.push(entry);
    }

    /// Record a spell result under a fresh id with the given prefix
    pub fn record(&mut self, spell: SpellResult, prefix: &str, rng: &mut impl Rng) -> ManifestedSpell {
        let entry = ManifestedSpell {
            id: self.generate_id(prefix, rng),
            timestamp: now_millis(),
            spell,
        };
        self.push(entry.clone());
        entry
    }

    /// Remove an entry by id; returns the removed entry
    pub fn remove(&mut self, id: &str) -> Option<ManifestedSpell> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        tracing::info!("grimoire: removed {}", id);
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        tracing::info!("grimoire: cleared {} entries", self.entries.len());
        self.entries.clear();
    }

    /// Entry to reuse as a known spell: the active one, else a matching selection
    pub fn known_spell(
        &self,
        active_id: Option<&str>,
        system: MagicSystem,
        rank: u8,
        attribute: &str,
    ) -> Option<&ManifestedSpell> {
        active_id.and_then(|id| self.get(id)).or_else(|| {
            self.entries.iter().find(|e| {
                e.spell.system == system && e.spell.rank == rank && e.spell.attribute == attribute
            })
        })
    }

    /// Filtered and sorted view
    pub fn query(&self, query: &GrimoireQuery) -> Vec<&ManifestedSpell> {
        // Insertion index breaks timestamp ties
        let mut result: Vec<(usize, &ManifestedSpell)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| query.matches(e))
            .collect();

        match query.sort {
            SortOrder::Newest => result.sort_by(|(ia, a), (ib, b)| {
                b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia))
            }),
            SortOrder::Oldest => result.sort_by(|(ia, a), (ib, b)| {
                a.timestamp.cmp(&b.timestamp).then(ia.cmp(ib))
            }),
            SortOrder::RankDesc => result.sort_by(|(_, a), (_, b)| b.spell.rank.cmp(&a.spell.rank)),
            SortOrder::DamageDesc => result.sort_by(|(_, a), (_, b)| {
                b.spell.predicted_damage.cmp(&a.spell.predicted_damage)
            }),
        }
        result.into_iter().map(|(_, e)| e).collect()
    }

    /// Add a manual entry, or edit one in place (keeping id and timestamp)
    pub fn save_draft(
        &mut self,
        draft: &SpellDraft,
        editing: Option<&str>,
        rng: &mut impl Rng,
    ) -> Result<String, GrimoireError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(GrimoireError::EmptyName);
        }
        let spell = recorded_result(
            name,
            draft.system,
            &draft.attribute,
            draft.rank,
            draft.predicted_damage,
            &draft.description,
            &draft.chant,
            &draft.protection_id,
        );

        match editing {
            Some(id) => {
                let entry = self
                    .entries
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| GrimoireError::UnknownEntry(id.to_string()))?;
                let mut spell = spell;
                // Keep the snapshot taken at cast time
                spell.caster = entry.spell.caster.clone();
                spell.environment = entry.spell.environment.clone();
                spell.tool_id = entry.spell.tool_id.clone();
                spell.tool_name = entry.spell.tool_name.clone();
                entry.spell = spell;
                tracing::info!("grimoire: edited {}", id);
                Ok(id.to_string())
            }
            None => {
                let entry = self.record(spell, "MG", rng);
                Ok(entry.id)
            }
        }
    }

    /// Four-digit id with a prefix, unique within this grimoire
    pub fn generate_id(&self, prefix: &str, rng: &mut impl Rng) -> String {
        for _ in 0..32 {
            let id = format!("{}{:04}", prefix, rng.gen_range(0..10_000));
            if !self.contains(&id) {
                return id;
            }
        }
        (0..10_000)
            .map(|n| format!("{}{:04}", prefix, n))
            .find(|id| !self.contains(id))
            .unwrap_or_else(|| format!("{}{}", prefix, now_millis()))
    }
}
