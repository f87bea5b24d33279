//! Threat analysis - how endangered a fighter currently is
//!
//! Recomputed from the live state on every decision; nothing is cached.
//! Missing inputs classify as `Low` rather than failing.

use serde::{Deserialize, Serialize};

use crate::battle::state::BattleState;
use crate::core::types::FighterId;
use crate::fighter::{Fighter, MoveTable};

/// Opponent move power above which the threat score gets a flat bonus
pub const HIGH_DAMAGE_THRESHOLD: u32 = 40;
pub const HIGH_DAMAGE_BONUS: f32 = 20.0;

/// At or below this health percent the threat is always high
pub const CRITICAL_HEALTH_PERCENT: f32 = 30.0;
/// At or below this, a heavy-hitting opponent makes the threat high
pub const EXPOSED_HEALTH_PERCENT: f32 = 50.0;
/// At or below this the threat is at least medium
pub const WORN_HEALTH_PERCENT: f32 = 60.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThreatAssessment {
    pub level: ThreatLevel,
    /// `100 - health_percent`, plus a bonus against heavy hitters
    pub score: f32,
    pub health_percent: f32,
    pub opponent_max_power: u32,
}

/// Classification by fixed cutoffs
pub fn classify_threat(health_percent: f32, opponent_max_power: u32) -> ThreatLevel {
    if health_percent <= CRITICAL_HEALTH_PERCENT
        || (health_percent <= EXPOSED_HEALTH_PERCENT && opponent_max_power >= HIGH_DAMAGE_THRESHOLD)
    {
        ThreatLevel::High
    } else if health_percent <= WORN_HEALTH_PERCENT {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

pub fn threat_score(health_percent: f32, opponent_max_power: u32) -> f32 {
    let mut score = 100.0 - health_percent;
    if opponent_max_power > HIGH_DAMAGE_THRESHOLD {
        score += HIGH_DAMAGE_BONUS;
    }
    score
}

/// Strongest power among the opponent's moves; unknown ids are skipped
pub fn opponent_max_power(opponent: &Fighter, moves: &MoveTable) -> u32 {
    opponent
        .moves
        .iter()
        .filter_map(|id| moves.get(id))
        .map(|m| m.power)
        .max()
        .unwrap_or(0)
}

pub fn assess_threat(state: &BattleState, self_id: &FighterId, moves: &MoveTable) -> ThreatAssessment {
    let Some(me) = state.fighter(self_id) else {
        return ThreatAssessment::default();
    };
    if me.max_health <= 0 {
        return ThreatAssessment::default();
    }

    let health_percent = me.health_percent();
    let max_power = state
        .opponent_of(self_id)
        .map(|o| opponent_max_power(o, moves))
        .unwrap_or(0);

    ThreatAssessment {
        level: classify_threat(health_percent, max_power),
        score: threat_score(health_percent, max_power),
        health_percent,
        opponent_max_power: max_power,
    }
}

pub fn analyze_threat(state: &BattleState, self_id: &FighterId, moves: &MoveTable) -> ThreatLevel {
    assess_threat(state, self_id, moves).level
}
