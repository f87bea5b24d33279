//! Terminal battle summaries and parallel batch runs

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::battle::state::{BattleMetrics, BattleState, BattleStatus, Outcome, StalemateReason};
use crate::battle::turn_loop::BattleSession;
use crate::content::BattleResources;
use crate::core::config::BattleConfig;
use crate::core::error::Result;
use crate::core::types::{FighterId, SessionId, Turn};
use crate::fighter::{FighterStats, MentalState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOutcome {
    Victory,
    Draw,
    Stalemate,
    Aborted,
    /// Summary taken before the battle ended
    Unfinished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterReport {
    pub id: FighterId,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub energy: u32,
    pub mental_state: MentalState,
    pub stats: FighterStats,
}

/// Serialisable record of how a battle ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub session: SessionId,
    pub seed: Option<u64>,
    pub outcome: SummaryOutcome,
    pub winner: Option<FighterId>,
    pub loser: Option<FighterId>,
    pub is_draw: bool,
    pub is_stalemate: bool,
    pub stalemate_reason: Option<StalemateReason>,
    pub aborted: bool,
    pub turns: Turn,
    pub fighters: Vec<FighterReport>,
    pub metrics: BattleMetrics,
    pub errors: Vec<String>,
}

impl BattleSummary {
    pub fn from_state(state: &BattleState) -> Self {
        let outcome = match &state.status {
            BattleStatus::Completed(Outcome::Victory { .. }) => SummaryOutcome::Victory,
            BattleStatus::Completed(Outcome::Draw) => SummaryOutcome::Draw,
            BattleStatus::Stalemate(_) => SummaryOutcome::Stalemate,
            BattleStatus::ErrorAborted { .. } => SummaryOutcome::Aborted,
            BattleStatus::Idle | BattleStatus::Running => SummaryOutcome::Unfinished,
        };
        let stalemate_reason = match state.status {
            BattleStatus::Stalemate(reason) => Some(reason),
            _ => None,
        };

        Self {
            session: state.session,
            seed: None,
            outcome,
            winner: state.winner().cloned(),
            loser: state.loser().cloned(),
            is_draw: state.is_draw(),
            is_stalemate: state.is_stalemate(),
            stalemate_reason,
            aborted: outcome == SummaryOutcome::Aborted,
            turns: state.turn,
            fighters: state
                .fighters_in_order()
                .map(|f| FighterReport {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    health: f.health,
                    max_health: f.max_health,
                    energy: f.energy,
                    mental_state: f.mental_state,
                    stats: f.stats.clone(),
                })
                .collect(),
            metrics: state.metrics.clone(),
            errors: state.error_log.clone(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// What a batch should run
#[derive(Debug, Clone)]
pub struct BatchSpec {
    pub left: FighterId,
    pub right: FighterId,
    pub environment: String,
    pub config: BattleConfig,
    pub seeds: Vec<u64>,
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub battles: usize,
    pub left_wins: usize,
    pub right_wins: usize,
    pub draws: usize,
    pub stalemates: usize,
    pub aborted: usize,
    pub failed_to_start: usize,
    pub average_turns: f32,
}

impl BatchReport {
    pub fn tally(spec: &BatchSpec, results: &[Result<BattleSummary>]) -> Self {
        let mut report = BatchReport {
            battles: results.len(),
            ..BatchReport::default()
        };
        let mut total_turns = 0u64;
        let mut finished = 0u64;

        for result in results {
            let Ok(summary) = result else {
                report.failed_to_start += 1;
                continue;
            };
            finished += 1;
            total_turns += summary.turns as u64;
            match summary.outcome {
                SummaryOutcome::Victory => {
                    if summary.winner.as_ref() == Some(&spec.left) {
                        report.left_wins += 1;
                    } else {
                        report.right_wins += 1;
                    }
                }
                SummaryOutcome::Draw => report.draws += 1,
                SummaryOutcome::Stalemate => report.stalemates += 1,
                SummaryOutcome::Aborted | SummaryOutcome::Unfinished => report.aborted += 1,
            }
        }

        if finished > 0 {
            report.average_turns = total_turns as f32 / finished as f32;
        }
        report
    }
}

/// Run one battle per seed in parallel
///
/// Each battle owns its state and RNG streams; only the resources are shared.
pub fn run_batch(resources: &BattleResources, spec: &BatchSpec) -> Vec<Result<BattleSummary>> {
    spec.seeds
        .par_iter()
        .map(|&seed| {
            let config = spec.config.clone().with_seed(seed);
            let mut session = BattleSession::from_roster(
                resources,
                config,
                &spec.left,
                &spec.right,
                &spec.environment,
            )?;
            Ok(session.run_to_completion()?.with_seed(seed))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::{Environment, Fighter};

    #[test]
    fn test_summary_of_idle_battle_is_unfinished() {
        let state = BattleState::new(
            Fighter::new("aang", "Aang", 100, 20),
            Fighter::new("zuko", "Zuko", 100, 20),
            Environment::new("cave", "Cave"),
        )
        .unwrap();
        let summary = BattleSummary::from_state(&state);
        assert_eq!(summary.outcome, SummaryOutcome::Unfinished);
        assert_eq!(summary.fighters.len(), 2);
        assert_eq!(summary.fighters[0].id.as_str(), "aang");
        assert!(!summary.aborted);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let mut state = BattleState::new(
            Fighter::new("aang", "Aang", 100, 20),
            Fighter::new("zuko", "Zuko", 100, 20),
            Environment::new("cave", "Cave"),
        )
        .unwrap();
        state.status = BattleStatus::Stalemate(StalemateReason::TurnLimit);
        let json = serde_json::to_string(&BattleSummary::from_state(&state)).unwrap();
        assert!(json.contains("\"outcome\":\"stalemate\""));
        assert!(json.contains("TurnLimit"));
    }

    #[test]
    fn test_tally_counts_sides() {
        let spec = BatchSpec {
            left: FighterId::new("aang"),
            right: FighterId::new("zuko"),
            environment: "cave".into(),
            config: BattleConfig::default(),
            seeds: vec![1, 2, 3],
        };
        let base = BattleState::new(
            Fighter::new("aang", "Aang", 100, 20),
            Fighter::new("zuko", "Zuko", 100, 20),
            Environment::new("cave", "Cave"),
        )
        .unwrap();

        let mut won = BattleSummary::from_state(&base);
        won.outcome = SummaryOutcome::Victory;
        won.winner = Some(FighterId::new("zuko"));
        won.turns = 10;
        let mut drawn = BattleSummary::from_state(&base);
        drawn.outcome = SummaryOutcome::Draw;
        drawn.turns = 20;

        let results = vec![
            Ok(won),
            Ok(drawn),
            Err(crate::core::error::ChronicleError::UnknownEnvironment("x".into())),
        ];
        let report = BatchReport::tally(&spec, &results);
        assert_eq!(report.battles, 3);
        assert_eq!(report.right_wins, 1);
        assert_eq!(report.draws, 1);
        assert_eq!(report.failed_to_start, 1);
        assert!((report.average_turns - 15.0).abs() < 1e-5);
    }
}
