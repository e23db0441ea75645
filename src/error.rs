//! Errors reported by the coalition value engine.
//!
//! Clue compilation never fails: an unrecognised clue compiles to the full
//! grid. Everything else reports a [`PayoutError`] synchronously and never
//! returns a partial result.

use thiserror::Error;

use super::*;

#[derive(Debug, Error)]
pub enum PayoutError {
    /// The power-set sweep would exceed the configured bound.
    #[error("too many agents for a full coalition sweep: {count} (limit {max})")]
    TooManyAgents { count: usize, max: usize },

    #[error("grid size must be positive")]
    EmptyGrid,

    #[error("sample count must be positive")]
    InvalidSamples,

    #[error("weight count {weights} does not match agent count {agents}")]
    WeightMismatch { weights: usize, agents: usize },

    #[error("agent {agent} has weight {weight}, weights must be at least 1")]
    InvalidWeight { agent: AgentId, weight: Weight },

    /// The value source was built for a different number of agents.
    #[error("value source covers {found} agents, expected {expected}")]
    AgentCountMismatch { expected: usize, found: usize },

    /// The caller raised the cancellation flag; the partial accumulator was dropped.
    #[error("estimation cancelled after {completed} samples")]
    Cancelled { completed: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PayoutError {
    fn from(err: serde_json::Error) -> Self {
        PayoutError::Config(err.to_string())
    }
}

impl PayoutError {
    /// Returns `true` for errors caused by the caller's arguments rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, PayoutError::Io(_) | PayoutError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, PayoutError>;
