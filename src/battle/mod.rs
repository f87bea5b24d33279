//! Battle system - one-on-one duels resolved tick by tick
//!
//! The turn loop asks each fighter's AI for a move, applies its effects to
//! a draft of the state, narrates the result and commits the tick only if
//! every step succeeded.

pub mod constants;
pub mod effects;
pub mod state;
pub mod summary;
pub mod turn_loop;

// Re-exports for convenient access
pub use effects::{apply_move, ActionOutcome};
pub use state::{
    BattleEvent, BattleMetrics, BattleState, BattleStatus, EventKind, Outcome, StalemateReason,
    Transition,
};
pub use summary::{run_batch, BatchReport, BatchSpec, BattleSummary, FighterReport, SummaryOutcome};
pub use turn_loop::{choose_beat, evaluate_terminal, BattleSession};
