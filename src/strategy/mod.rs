//! Strategy module - deterministic bet sizing
//!
//! Maps betting history to the next wager for each supported system and
//! evaluates the session termination policy.

pub mod config;
pub mod engine;
pub mod state;

pub use config::{BetConfig, ConfigError, MAX_REPRESENTABLE_BET};
pub use engine::{BetDecision, StrategyEngine, StrategyKind};
pub use state::{BetOutcome, Scratch, SessionResult, SessionState, TerminationReason};
