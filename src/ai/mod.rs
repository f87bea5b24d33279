//! Fighter AI - deterministic heuristic move selection
//!
//! Architecture: Trait + Data hybrid
//! - FighterAi trait defines the interface for swappable implementations
//! - BiasTable holds TOML-loaded per-character nudges
//! - Threat and condition predicates are recomputed from live state on
//!   every decision

pub mod bias;
pub mod conditions;
pub mod evaluator;
pub mod scoring;
pub mod threat;

pub use bias::{AiBias, BiasTable};
pub use conditions::ConditionContext;
pub use evaluator::{
    evaluate_moves, legal_moves, veto, Decision, DecisionRequest, FighterAi, HeuristicAi,
    MoveEvaluationContext, ScoredMove,
};
pub use scoring::{combine, score_move, MoveScores, StrategicInputs};
pub use threat::{
    analyze_threat, assess_threat, classify_threat, threat_score, ThreatAssessment, ThreatLevel,
};
