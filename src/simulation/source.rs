//! Roll sources for simulated sessions
//!
//! Each session gets its own source instance with an independently
//! derived seed; sources are never shared between sessions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How sessions obtain their rolls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceSpec {
    /// Fresh PRNG per session, seeded from a base seed plus the session
    /// index (None = a random base seed chosen at run start)
    Seeded { base_seed: Option<u64> },
    /// Replay a recorded roll sequence (0.00..=99.99 values). The session
    /// ends when the history is exhausted.
    Replay { rolls: Vec<f64> },
}

impl SourceSpec {
    /// Resolve the base seed, drawing one from the OS if unset
    pub fn resolved_base_seed(&self) -> u64 {
        match self {
            Self::Seeded { base_seed } => base_seed.unwrap_or_else(|| rand::thread_rng().r#gen()),
            Self::Replay { .. } => 0,
        }
    }

    /// Build the source for one session
    pub fn for_session(&self, base_seed: u64, session: u64) -> OutcomeSource {
        match self {
            Self::Seeded { .. } => OutcomeSource::seeded(base_seed.wrapping_add(session)),
            Self::Replay { rolls } => OutcomeSource::replay(rolls.clone()),
        }
    }
}

/// Supplies rolls for one session
pub enum OutcomeSource {
    Seeded(StdRng),
    Replay { rolls: Vec<f64>, position: usize },
}

impl OutcomeSource {
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn replay(rolls: Vec<f64>) -> Self {
        Self::Replay { rolls, position: 0 }
    }

    /// Next roll in 0.00..=99.99, or None when a replay is exhausted
    pub fn next_roll(&mut self) -> Option<f64> {
        match self {
            Self::Seeded(rng) => Some(rng.gen_range(0..10_000) as f64 / 100.0),
            Self::Replay { rolls, position } => {
                let roll = rolls.get(*position).copied();
                *position += 1;
                roll
            }
        }
    }
}
