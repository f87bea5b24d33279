pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, BattleConfig, ScoreWeights};
pub use error::{ChronicleError, Result};
pub use types::{EventId, FighterId, MoveId, SessionId, Turn};
