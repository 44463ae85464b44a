//! Combat log entries

use super::enemy::Effectiveness;
use crate::types::now_millis;
use serde::{Deserialize, Serialize};

/// Oldest entries are dropped past this many
pub const MAX_LOG_ENTRIES: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub id: u64,
    pub timestamp: u64,
    pub message: String,
    pub damage: Option<u64>,
    pub critical: bool,
    pub effectiveness: Option<Effectiveness>,
}

impl CombatLogEntry {
    /// One display line, with damage tags appended
    pub fn display(&self) -> String {
        let mut line = self.message.clone();
        if let Some(damage) = self.damage {
            line.push_str(&format!(" [{} dmg]", damage));
        }
        if self.critical {
            line.push_str(" CRITICAL!");
        }
        match self.effectiveness {
            Some(Effectiveness::Super) => line.push_str(" It's super effective!"),
            Some(Effectiveness::Poor) => line.push_str(" It's not very effective..."),
            Some(Effectiveness::Immune) => line.push_str(" No effect!"),
            _ => {}
        }
        line
    }
}

/// Bounded log with increasing ids
#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    entries: Vec<CombatLogEntry>,
    next_id: u64,
}

impl CombatLog {
    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&CombatLogEntry> {
        self.entries.last()
    }

    pub fn push(
        &mut self,
        message: impl Into<String>,
        damage: Option<u64>,
        critical: bool,
        effectiveness: Option<Effectiveness>,
    ) -> CombatLogEntry {
        self.next_id += 1;
        let entry = CombatLogEntry {
            id: self.next_id,
            timestamp: now_millis(),
            message: message.into(),
            damage,
            critical,
            effectiveness,
        };
        self.entries.push(entry.clone());
        while self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
        entry
    }

    pub fn note(&mut self, message: impl Into<String>) -> CombatLogEntry {
        self.push(message, None, false, None)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
