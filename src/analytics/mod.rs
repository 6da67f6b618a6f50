//! Analytics module - distributional summaries of session results
//!
//! Consumes the immutable result collections produced by the simulation
//! runner (or live play) and computes outcome distributions.

mod summary;

pub use summary::{Summary, expected_flat_profit, format_leaderboard, summarize};
