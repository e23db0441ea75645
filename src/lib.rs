//! Fair payouts for agents pooling partial clues about a hidden cell.
//!
//! Clues compile to grid regions ([`clue`]), the regions give a
//! characteristic function over every coalition ([`CoalitionValueBuilder`]),
//! and a sampled weighted Shapley value splits it among the agents
//! ([`ShapleyEstimator`]).

mod agent;
mod characteristic;
pub mod clue;
mod coalition;
mod config;
mod error;
mod game;
mod ledger;
mod region;
mod shapley;
mod types;

pub use agent::{Agent, Player};
pub use characteristic::{CharacteristicFunction, CoalitionValue, CoalitionValueBuilder, DEFAULT_MAX_AGENTS};
pub use clue::{ClueCompiler, ClueRule};
pub use coalition::{Coalition, Members, PowerSet};
pub use config::GameConfig;
pub use error::{PayoutError, Result};
pub use game::{ClueGame, Resolution};
pub use ledger::{Ledger, LedgerEntry};
pub use region::{Region, column_letter};
pub use shapley::{DEFAULT_SAMPLES, EXACT_MAX_AGENTS, ShapleyEstimator, ShapleyVector, exact_shapley};
pub use types::*;
