//! Simulation module - Monte Carlo evaluation of betting strategies
//!
//! Replays strategies over many independent virtual sessions, serially
//! or in parallel, and collects per-session results for aggregation.

pub mod config;
pub mod db;
pub mod runner;
pub mod source;

pub use config::{SimConfig, SimMode};
pub use db::{ResultDatabase, StrategyStats};
pub use runner::{
    CancelToken, SimReport, init_parallel, run_session, run_sessions, run_sessions_parallel,
    run_simulation,
};
pub use source::{OutcomeSource, SourceSpec};
