//! Per-invocation narrative context derived from the battle state

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;
use crate::fighter::Environment;

/// Strict-context tag names as they appear in variant tag sets
pub mod strict_tags {
    pub const CRITICAL: &str = "critical";
    pub const MISS: &str = "miss";
    pub const HUMOR: &str = "humor";
    pub const DESPERATE: &str = "desperate";

    pub const ALL: [&str; 4] = [CRITICAL, MISS, HUMOR, DESPERATE];
}

/// Turns counted as the early phase
pub const EARLY_PHASE_TURNS: Turn = 2;
/// Lowest fighter health percentage that switches the battle into its late phase
pub const LATE_PHASE_HP_PERCENT: f32 = 30.0;

/// Coarse battle phase used for narrative matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativePhase {
    #[default]
    Early,
    Mid,
    Late,
}

impl NarrativePhase {
    pub fn tag(&self) -> &'static str {
        match self {
            NarrativePhase::Early => "early",
            NarrativePhase::Mid => "mid",
            NarrativePhase::Late => "late",
        }
    }

    /// Late once anyone is badly hurt, early for the first turns, mid otherwise
    pub fn derive(turn: Turn, lowest_health_percent: f32) -> Self {
        if lowest_health_percent <= LATE_PHASE_HP_PERCENT {
            NarrativePhase::Late
        } else if turn <= EARLY_PHASE_TURNS {
            NarrativePhase::Early
        } else {
            NarrativePhase::Mid
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnContext {
    pub is_crit: bool,
    pub is_miss: bool,
    pub humor_trigger: bool,
    pub low_hp: bool,
    pub phase: NarrativePhase,
}

impl TurnContext {
    /// Strict tags that are currently true, in declared order
    pub fn active_strict_tags(&self) -> Vec<&'static str> {
        let mut active = Vec::new();
        if self.is_crit {
            active.push(strict_tags::CRITICAL);
        }
        if self.is_miss {
            active.push(strict_tags::MISS);
        }
        if self.humor_trigger {
            active.push(strict_tags::HUMOR);
        }
        if self.low_hp {
            active.push(strict_tags::DESPERATE);
        }
        active
    }
}

/// Context for one variant selection
///
/// `reasons` is a diagnostic trail only; nothing branches on it.
#[derive(Debug, Clone)]
pub struct NarrativeContext<'a> {
    pub turn: TurnContext,
    pub environment: Option<&'a Environment>,
    pub reasons: Vec<String>,
}

impl<'a> NarrativeContext<'a> {
    pub fn new(turn: TurnContext, environment: Option<&'a Environment>) -> Self {
        Self {
            turn,
            environment,
            reasons: Vec::new(),
        }
    }

    pub fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }
}
