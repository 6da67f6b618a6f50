//! Dicelab - strategy decision and simulation engine for a
//! provably-fair dice game
//!
//! Three pieces: deterministic bet-sizing strategies mapping betting
//! history to the next wager, a Monte Carlo harness replaying them over
//! many independent sessions, and a cryptographic verifier that
//! recomputes rolls from published seed material. Everything else -
//! front ends, the wagering service client, report rendering - lives
//! outside this crate and talks to it through the types re-exported
//! below.

pub mod analytics;
pub mod simulation;
pub mod strategy;
pub mod verify;

// Re-export commonly used types for convenience
pub use analytics::{Summary, expected_flat_profit, format_leaderboard, summarize};
pub use simulation::{
    CancelToken, OutcomeSource, ResultDatabase, SimConfig, SimMode, SimReport, SourceSpec,
    StrategyStats, init_parallel, run_session, run_sessions, run_sessions_parallel, run_simulation,
};
pub use strategy::{
    BetConfig, BetDecision, BetOutcome, ConfigError, MAX_REPRESENTABLE_BET, Scratch,
    SessionResult, SessionState, StrategyEngine, StrategyKind, TerminationReason,
};
pub use verify::{
    VerificationRecord, mismatch_count, roll_hundredths, roll_value, verify_history, verify_roll,
};
