use thiserror::Error;

use crate::core::types::{FighterId, MoveId};

#[derive(Error, Debug)]
pub enum ChronicleError {
    #[error("Fighter not found: {0}")]
    UnknownFighter(FighterId),

    #[error("Move not found in move table: {0}")]
    UnknownMove(MoveId),

    #[error("Environment not found: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("{fighter} cannot pay {cost} chi with {available} remaining")]
    InsufficientEnergy {
        fighter: FighterId,
        cost: u32,
        available: u32,
    },

    #[error("Invalid battle transition: {0}")]
    InvalidTransition(String),

    #[error("AI decision failed: {0}")]
    AiFailure(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChronicleError>;
