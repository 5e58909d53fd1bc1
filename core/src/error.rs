use thiserror::Error;

use crate::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Bet amount must be a non-negative number")]
    InvalidBet,
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: Amount, available: Amount },
    #[error("Invalid tile position")]
    InvalidPosition,
    #[error("Operation not allowed: {0}")]
    StateConflict(&'static str),
    #[error("Snapshot is inconsistent with its declared mine count")]
    CorruptSnapshot,
    #[error("Payout table must be non-empty and non-decreasing")]
    InvalidPayoutTable,
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
