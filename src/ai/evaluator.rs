//! Move evaluator and decision engine
//!
//! Illegal moves (unaffordable chi, locked desperation moves) are removed
//! before scoring. The rest are scored, ranked with a stable sort and the
//! first move that survives the veto check is chosen.

use tracing::debug;

use crate::ai::bias::{AiBias, BiasTable};
use crate::ai::conditions::ConditionContext;
use crate::ai::scoring::{combine, score_move, MoveScores, StrategicInputs};
use crate::ai::threat::{analyze_threat, ThreatLevel};
use crate::battle::state::BattleState;
use crate::core::config::{BattleConfig, ScoreWeights};
use crate::core::error::{ChronicleError, Result};
use crate::core::types::{FighterId, MoveId};
use crate::fighter::{tags, Environment, Fighter, Move, MoveTable};

/// Everything a scoring pass needs about the acting fighter's situation
#[derive(Debug, Clone, Copy)]
pub struct MoveEvaluationContext<'a> {
    pub actor: &'a Fighter,
    pub opponent: Option<&'a Fighter>,
    pub environment: Option<&'a Environment>,
    pub threat: ThreatLevel,
    pub bias: AiBias,
    pub weights: &'a ScoreWeights,
    pub safety_hp_fraction: f32,
    pub desperation_available: bool,
    pub in_control: bool,
}

impl<'a> MoveEvaluationContext<'a> {
    fn strategic_inputs(&self) -> StrategicInputs<'a> {
        StrategicInputs {
            threat: self.threat,
            desperation_available: self.desperation_available,
            in_control: self.in_control,
            environment: self.environment,
            opponent_health: self.opponent.map(|o| o.health),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMove<'m> {
    pub mv: &'m Move,
    pub components: MoveScores,
    pub total: f32,
}

/// Outcome of one decision
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Move { move_id: MoveId, score: f32 },
    /// No legal move survived; the turn loop resolves this as a forced pass
    ExhaustedOptions,
}

/// Inputs to a decision, borrowed from the running session
#[derive(Debug, Clone, Copy)]
pub struct DecisionRequest<'a> {
    pub state: &'a BattleState,
    pub actor: &'a FighterId,
    pub moves: &'a MoveTable,
    pub biases: &'a BiasTable,
    pub config: &'a BattleConfig,
}

/// Trait for fighter AI implementations
pub trait FighterAi: Send + Sync {
    fn name(&self) -> &str;

    fn choose_move(&self, request: &DecisionRequest<'_>) -> Result<Decision>;
}

/// Moves the actor may legally use right now, in declared order
///
/// A fighter referencing a move missing from the table is an internal
/// error, not a filtered-out move.
pub fn legal_moves<'m>(
    actor: &Fighter,
    table: &'m MoveTable,
    conditions: &ConditionContext<'_>,
) -> Result<Vec<&'m Move>> {
    let desperation_ok = conditions.can_use_desperation();
    let mut legal = Vec::with_capacity(actor.moves.len());
    for id in &actor.moves {
        let mv = table.require(id)?;
        if mv.energy_cost > actor.energy {
            continue;
        }
        if mv.has_tag(tags::DESPERATION) && !desperation_ok {
            continue;
        }
        legal.push(mv);
    }
    Ok(legal)
}

/// Score and rank moves, best first; equal totals keep input order
pub fn evaluate_moves<'m>(
    moves: &[&'m Move],
    ctx: &MoveEvaluationContext<'_>,
) -> Vec<ScoredMove<'m>> {
    let inputs = ctx.strategic_inputs();
    let mut ranked: Vec<ScoredMove<'m>> = moves
        .iter()
        .map(|&mv| {
            let components = score_move(mv, ctx.actor, ctx.safety_hp_fraction, &inputs);
            ScoredMove {
                mv,
                components,
                total: combine(&components, ctx.weights, &ctx.bias),
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked
}

/// Reason a ranked move must not be chosen, if any
pub fn veto(scored: &ScoredMove<'_>, ctx: &MoveEvaluationContext<'_>) -> Option<&'static str> {
    let recoil = scored.mv.recoil as i32;
    if recoil > 0 && ctx.actor.health - recoil <= 0 {
        let conditions = ConditionContext::new(Some(ctx.actor), ctx.opponent);
        if !conditions.is_finishing_blow(scored.components.damage) {
            return Some("recoil would knock the user out");
        }
    }
    None
}

/// Default heuristic AI
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAi;

impl FighterAi for HeuristicAi {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn choose_move(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        let state = request.state;
        let actor = state
            .fighter(request.actor)
            .ok_or_else(|| ChronicleError::UnknownFighter(request.actor.clone()))?;

        let conditions = ConditionContext::for_actor(state, request.actor, request.biases);
        let legal = legal_moves(actor, request.moves, &conditions)?;
        if legal.is_empty() {
            debug!("{} has no legal moves", actor.id);
            return Ok(Decision::ExhaustedOptions);
        }

        let ctx = MoveEvaluationContext {
            actor,
            opponent: conditions.opponent,
            environment: Some(&state.environment),
            threat: analyze_threat(state, request.actor, request.moves),
            bias: conditions.bias,
            weights: &request.config.weights,
            safety_hp_fraction: request.config.safety_hp_fraction,
            desperation_available: conditions.can_use_desperation(),
            in_control: conditions.is_in_control(),
        };

        let ranked = evaluate_moves(&legal, &ctx);
        for scored in &ranked {
            if let Some(reason) = veto(scored, &ctx) {
                debug!("{} vetoed {}: {}", actor.id, scored.mv.id, reason);
                continue;
            }
            debug!(
                "{} chose {} (score {:.2}, threat {:?})",
                actor.id, scored.mv.id, scored.total, ctx.threat
            );
            return Ok(Decision::Move {
                move_id: scored.mv.id.clone(),
                score: scored.total,
            });
        }

        debug!("{} vetoed every legal move", actor.id);
        Ok(Decision::ExhaustedOptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MoveTable {
        MoveTable::from_moves([
            Move::new("jab", "Jab", 6, 95, 0),
            Move::new("fire_blast", "Fire Blast", 30, 80, 8),
            Move::new("lightning", "Lightning", 60, 70, 15).with_tags(&[tags::DESPERATION]),
            Move::new("kamikaze", "Kamikaze Dive", 40, 90, 0).with_recoil(50),
        ])
    }

    fn battle(actor: Fighter) -> BattleState {
        let foe = Fighter::new("zhao", "Zhao", 100, 20).with_moves(&["jab"]);
        BattleState::new(actor, foe, Environment::new("harbor", "Harbor")).unwrap()
    }

    fn decide(state: &BattleState, table: &MoveTable) -> Decision {
        HeuristicAi
            .choose_move(&DecisionRequest {
                state,
                actor: &FighterId::new("zuko"),
                moves: table,
                biases: &BiasTable::new(),
                config: &BattleConfig::default(),
            })
            .expect("decision should succeed")
    }

    #[test]
    fn test_zero_energy_only_free_moves() {
        let mut zuko = Fighter::new("zuko", "Zuko", 100, 20).with_moves(&["fire_blast", "jab"]);
        zuko.energy = 0;
        let state = battle(zuko);
        assert!(matches!(
            decide(&state, &table()),
            Decision::Move { move_id, .. } if move_id.as_str() == "jab"
        ));
    }

    #[test]
    fn test_exhausted_when_nothing_affordable() {
        let mut zuko = Fighter::new("zuko", "Zuko", 100, 20).with_moves(&["fire_blast"]);
        zuko.energy = 3;
        let state = battle(zuko);
        assert_eq!(decide(&state, &table()), Decision::ExhaustedOptions);
    }

    #[test]
    fn test_desperation_move_locked_until_threshold() {
        let table = table();
        let zuko = Fighter::new("zuko", "Zuko", 100, 20).with_moves(&["lightning"]);
        let state = battle(zuko.clone());
        assert_eq!(decide(&state, &table), Decision::ExhaustedOptions);

        let mut cornered = zuko;
        cornered.health = 8;
        cornered.energy = 16;
        let state = battle(cornered);
        assert!(matches!(
            decide(&state, &table),
            Decision::Move { move_id, .. } if move_id.as_str() == "lightning"
        ));
    }

    #[test]
    fn test_self_knockout_is_vetoed_unless_finishing() {
        let table = table();
        let mut zuko = Fighter::new("zuko", "Zuko", 100, 20).with_moves(&["kamikaze"]);
        zuko.health = 40;
        let state = battle(zuko);
        assert_eq!(decide(&state, &table), Decision::ExhaustedOptions);

        let mut state = state;
        state.fighter_mut(&FighterId::new("zhao")).unwrap().health = 20;
        assert!(matches!(decide(&state, &table), Decision::Move { .. }));
    }

    #[test]
    fn test_in_control_fighter_favours_flashy_move() {
        let table = MoveTable::from_moves([
            Move::new("plain", "Plain Strike", 20, 90, 0),
            Move::new("flourish", "Flourish", 20, 90, 0).with_tags(&[tags::FLASHY]),
        ]);
        let zuko = Fighter::new("zuko", "Zuko", 100, 20).with_moves(&["plain", "flourish"]);
        let state = battle(zuko.clone());
        assert!(matches!(
            decide(&state, &table),
            Decision::Move { move_id, .. } if move_id.as_str() == "flourish"
        ));

        let mut rattled = zuko;
        rattled.flags.took_critical = true;
        let state = battle(rattled);
        assert!(matches!(
            decide(&state, &table),
            Decision::Move { move_id, .. } if move_id.as_str() == "plain"
        ));
    }

    #[test]
    fn test_unknown_move_is_an_error() {
        let zuko = Fighter::new("zuko", "Zuko", 100, 20).with_moves(&["sword_dance"]);
        let state = battle(zuko);
        let result = HeuristicAi.choose_move(&DecisionRequest {
            state: &state,
            actor: &FighterId::new("zuko"),
            moves: &table(),
            biases: &BiasTable::new(),
            config: &BattleConfig::default(),
        });
        assert!(matches!(result, Err(ChronicleError::UnknownMove(_))));
    }

    #[test]
    fn test_ties_keep_declared_order() {
        let a = Move::new("a", "A", 10, 90, 0);
        let b = Move::new("b", "B", 10, 90, 0);
        let c = Move::new("c", "C", 10, 90, 0);
        let actor = Fighter::new("zuko", "Zuko", 100, 20);
        let weights = ScoreWeights::default();
        let ctx = MoveEvaluationContext {
            actor: &actor,
            opponent: None,
            environment: None,
            threat: ThreatLevel::Low,
            bias: AiBias::default(),
            weights: &weights,
            safety_hp_fraction: 0.2,
            desperation_available: false,
            in_control: false,
        };
        let ranked = evaluate_moves(&[&b, &c, &a], &ctx);
        let order: Vec<&str> = ranked.iter().map(|s| s.mv.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_overkill_bias_prefers_heavier_move() {
        let heavy = Move::new("heavy", "Heavy", 40, 60, 0);
        let safe = Move::new("safe", "Safe", 20, 100, 0);
        let actor = Fighter::new("azula", "Azula", 100, 20);
        let weights = ScoreWeights::default();
        let mut ctx = MoveEvaluationContext {
            actor: &actor,
            opponent: None,
            environment: None,
            threat: ThreatLevel::Low,
            bias: AiBias::default(),
            weights: &weights,
            safety_hp_fraction: 0.2,
            desperation_available: false,
            in_control: false,
        };
        // heavy: 24 + 6 - 6 = 24; safe: 20 + 10 - 0 = 30
        assert_eq!(evaluate_moves(&[&heavy, &safe], &ctx)[0].mv.id.as_str(), "safe");

        ctx.bias.overkill = 1.0;
        // heavy: 24 + 24 = 48; safe: 30 + 20 = 50
        assert_eq!(evaluate_moves(&[&heavy, &safe], &ctx)[0].mv.id.as_str(), "safe");

        ctx.bias.overkill = 2.0;
        // heavy: 24 + 48 = 72; safe: 30 + 40 = 70
        assert_eq!(evaluate_moves(&[&heavy, &safe], &ctx)[0].mv.id.as_str(), "heavy");
    }
}
