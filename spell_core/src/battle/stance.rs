//! Stance picked from the focus slider

use crate::config::BattleConstants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    Attack,
    Defend,
    Recover,
}

impl Stance {
    pub fn all() -> &'static [Stance] {
        &[Stance::Attack, Stance::Defend, Stance::Recover]
    }

    /// Threshold a 0..1 focus value
    pub fn from_focus(focus: f64, constants: &BattleConstants) -> Stance {
        let focus = focus.clamp(0.0, 1.0);
        if focus < constants.stance_attack_below {
            Stance::Attack
        } else if focus < constants.stance_defend_below {
            Stance::Defend
        } else {
            Stance::Recover
        }
    }

    /// Focus value at the middle of this stance's band
    pub fn center(&self, constants: &BattleConstants) -> f64 {
        match self {
            Stance::Attack => constants.stance_attack_below / 2.0,
            Stance::Defend => (constants.stance_attack_below + constants.stance_defend_below) / 2.0,
            Stance::Recover => (constants.stance_defend_below + 1.0) / 2.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stance::Attack => "Attack",
            Stance::Defend => "Defend",
            Stance::Recover => "Recover",
        }
    }
}
