//! Move scoring calculators
//!
//! Each calculator produces one independent component. `combine` applies
//! the fixed weights and then the character's bias, where every bias field
//! scales exactly one weighted term.

use serde::{Deserialize, Serialize};

use crate::ai::bias::AiBias;
use crate::ai::threat::ThreatLevel;
use crate::core::config::ScoreWeights;
use crate::fighter::{tags, Environment, Fighter, Move};

/// Extra risk when the move's recoil would leave the user under the safety margin
pub const SAFETY_MARGIN_PENALTY: f32 = 1.0;

// Strategic bonuses (added, never multiplied)
pub const DISABLE_BONUS_HIGH_THREAT: f32 = 15.0;
pub const DEFENSE_BONUS_HIGH_THREAT: f32 = 10.0;
pub const DEFENSE_BONUS_MEDIUM_THREAT: f32 = 4.0;
pub const DESPERATION_BONUS: f32 = 20.0;
pub const TERRAIN_BONUS: f32 = 5.0;
pub const FINISHER_BONUS: f32 = 25.0;
pub const FLASHY_BONUS_IN_CONTROL: f32 = 6.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveScores {
    pub damage: f32,
    pub accuracy: f32,
    pub risk: f32,
    pub strategic: f32,
}

/// Situation facts the strategic calculator reads
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategicInputs<'a> {
    pub threat: ThreatLevel,
    pub desperation_available: bool,
    /// Healthy, unshaken and facing a composed opponent
    pub in_control: bool,
    pub environment: Option<&'a Environment>,
    /// Opponent's current HP, if there is an opponent
    pub opponent_health: Option<i32>,
}

/// Expected damage: power weighted by hit chance
pub fn damage_score(mv: &Move) -> f32 {
    mv.power as f32 * mv.hit_chance()
}

pub fn accuracy_score(mv: &Move) -> f32 {
    mv.hit_chance()
}

/// Miss chance, plus a penalty when recoil would push the user under the margin
pub fn risk_score(mv: &Move, actor: &Fighter, safety_hp_fraction: f32) -> f32 {
    let mut risk = 1.0 - mv.hit_chance();
    let margin = safety_hp_fraction * actor.max_health as f32;
    if mv.recoil > 0 && ((actor.health - mv.recoil as i32) as f32) < margin {
        risk += SAFETY_MARGIN_PENALTY;
    }
    risk
}

pub fn strategic_score(mv: &Move, inputs: &StrategicInputs<'_>) -> f32 {
    let mut score = 0.0;

    if mv.has_tag(tags::DEBUFF_DISABLE) && inputs.threat == ThreatLevel::High {
        score += DISABLE_BONUS_HIGH_THREAT;
    }

    if mv.has_tag(tags::DEFENSE) {
        score += match inputs.threat {
            ThreatLevel::High => DEFENSE_BONUS_HIGH_THREAT,
            ThreatLevel::Medium => DEFENSE_BONUS_MEDIUM_THREAT,
            ThreatLevel::Low => 0.0,
        };
    }

    if mv.has_tag(tags::FLASHY) && inputs.in_control {
        score += FLASHY_BONUS_IN_CONTROL;
    }

    if mv.has_tag(tags::DESPERATION) && inputs.desperation_available {
        score += DESPERATION_BONUS;
    }

    let terrain_fit = mv.has_tag(tags::TERRAIN)
        || inputs.environment.is_some_and(|env| env.shares_tag(&mv.tags));
    if terrain_fit {
        score += TERRAIN_BONUS;
    }

    if mv.power > 0
        && inputs
            .opponent_health
            .is_some_and(|hp| damage_score(mv) >= hp as f32)
    {
        score += FINISHER_BONUS;
    }

    score
}

pub fn score_move(
    mv: &Move,
    actor: &Fighter,
    safety_hp_fraction: f32,
    inputs: &StrategicInputs<'_>,
) -> MoveScores {
    MoveScores {
        damage: damage_score(mv),
        accuracy: accuracy_score(mv),
        risk: risk_score(mv, actor, safety_hp_fraction),
        strategic: strategic_score(mv, inputs),
    }
}

/// Weighted sum, then bias: overkill -> damage, self_preservation -> risk,
/// betrayal_risk -> strategic, showboating -> accuracy
pub fn combine(scores: &MoveScores, weights: &ScoreWeights, bias: &AiBias) -> f32 {
    let damage = weights.damage * scores.damage;
    let accuracy = weights.accuracy * scores.accuracy;
    let risk = weights.risk * scores.risk;
    let strategic = weights.strategic * scores.strategic;

    let base = damage + accuracy - risk + strategic;

    base + bias.overkill * damage - bias.self_preservation * risk
        + bias.betrayal_risk * strategic
        - bias.showboating * accuracy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(hp: i32) -> Fighter {
        let mut f = Fighter::new("zuko", "Zuko", 100, 20);
        f.health = hp;
        f
    }

    #[test]
    fn test_expected_damage() {
        let m = Move::new("fire_blast", "Fire Blast", 30, 80, 5);
        assert!((damage_score(&m) - 24.0).abs() < 1e-5);
    }

    #[test]
    fn test_risk_penalises_recoil_below_margin() {
        let m = Move::new("jet", "Fire Jet", 20, 100, 0).with_recoil(15);
        assert_eq!(risk_score(&m, &actor(100), 0.2), 0.0);
        assert_eq!(risk_score(&m, &actor(30), 0.2), SAFETY_MARGIN_PENALTY);
    }

    #[test]
    fn test_risk_without_recoil_ignores_margin() {
        let m = Move::new("jab", "Jab", 5, 50, 0);
        assert!((risk_score(&m, &actor(5), 0.2) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_disable_bonus_only_under_high_threat() {
        let m = Move::new("chi_block", "Chi Block", 5, 90, 3).with_tags(&[tags::DEBUFF_DISABLE]);
        let high = StrategicInputs {
            threat: ThreatLevel::High,
            ..StrategicInputs::default()
        };
        let low = StrategicInputs::default();
        assert_eq!(strategic_score(&m, &high), DISABLE_BONUS_HIGH_THREAT);
        assert_eq!(strategic_score(&m, &low), 0.0);
    }

    #[test]
    fn test_flashy_bonus_only_when_in_control() {
        let m = Move::new("lightning", "Lightning", 40, 70, 10).with_tags(&[tags::FLASHY]);
        let calm = StrategicInputs {
            in_control: true,
            ..StrategicInputs::default()
        };
        assert_eq!(strategic_score(&m, &calm), FLASHY_BONUS_IN_CONTROL);
        assert_eq!(strategic_score(&m, &StrategicInputs::default()), 0.0);
    }

    #[test]
    fn test_terrain_bonus_from_environment_tag() {
        let env = Environment::new("swamp", "Foggy Swamp").with_tags(&["water"]);
        let m = Move::new("water_whip", "Water Whip", 12, 90, 2).with_tags(&["water"]);
        let inputs = StrategicInputs {
            environment: Some(&env),
            ..StrategicInputs::default()
        };
        assert_eq!(strategic_score(&m, &inputs), TERRAIN_BONUS);
    }

    #[test]
    fn test_finisher_bonus() {
        let m = Move::new("strike", "Strike", 20, 100, 0);
        let inputs = StrategicInputs {
            opponent_health: Some(20),
            ..StrategicInputs::default()
        };
        assert_eq!(strategic_score(&m, &inputs), FINISHER_BONUS);
    }

    #[test]
    fn test_each_bias_field_moves_one_term() {
        let scores = MoveScores {
            damage: 10.0,
            accuracy: 0.5,
            risk: 0.5,
            strategic: 4.0,
        };
        let w = ScoreWeights::default();
        let base = combine(&scores, &w, &AiBias::default());
        assert!((base - (10.0 + 5.0 - 7.5 + 4.0)).abs() < 1e-5);

        let overkill = AiBias { overkill: 1.0, ..AiBias::default() };
        assert!((combine(&scores, &w, &overkill) - (base + 10.0)).abs() < 1e-5);

        let careful = AiBias { self_preservation: 1.0, ..AiBias::default() };
        assert!((combine(&scores, &w, &careful) - (base - 7.5)).abs() < 1e-5);

        let schemer = AiBias { betrayal_risk: 0.5, ..AiBias::default() };
        assert!((combine(&scores, &w, &schemer) - (base + 2.0)).abs() < 1e-5);

        let showoff = AiBias { showboating: 1.0, ..AiBias::default() };
        assert!((combine(&scores, &w, &showoff) - (base - 5.0)).abs() < 1e-5);
    }
}
