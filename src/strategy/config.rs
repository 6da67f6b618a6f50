//! Betting configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest wager the engine will escalate to before declaring overflow.
/// Beyond this, f64 amounts lose sub-cent precision and results stop
/// being meaningful.
pub const MAX_REPRESENTABLE_BET: f64 = 1e15;

/// Immutable per-strategy betting parameters.
///
/// Validated once via [`BetConfig::validate`] before any session starts;
/// the engine assumes a validated config thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BetConfig {
    /// Bankroll at session start
    pub starting_balance: f64,
    /// Base wager, the unit all progressions are built from
    pub base_bet: f64,
    /// Probability that a roll counts as a win (0..1 exclusive)
    pub win_chance: f64,
    /// House edge taken out of the payout (0..1), default 1%
    pub house_edge: f64,
    /// Loss-escalation factor for the Martingale family; also the
    /// win-escalation factor for Paroli
    pub increase_on_loss: f64,
    /// Multiplier applied to the base bet after a win
    pub decrease_on_win: f64,
    /// Hard cap on any single wager (None = uncapped)
    pub max_bet: Option<f64>,
    /// Stop when balance drops to or below this floor
    pub stop_loss: Option<f64>,
    /// Stop when balance rises to or above this ceiling
    pub stop_win: Option<f64>,
    /// Streak depth before a streak-driven variant resets (Paroli, Parlay)
    pub streak_depth: u32,
    /// Consecutive-loss depth at which any progression resets to base
    /// (None = chase forever)
    pub max_loss_streak: Option<u32>,
    /// Initial working line in base-bet units (Labouchere family)
    pub line: Option<Vec<f64>>,
}

impl Default for BetConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100.0,
            base_bet: 1.0,
            win_chance: 0.495,
            house_edge: 0.01,
            increase_on_loss: 2.0,
            decrease_on_win: 1.0,
            max_bet: None,
            stop_loss: None,
            stop_win: None,
            streak_depth: 3,
            max_loss_streak: None,
            line: None,
        }
    }
}

/// Configuration rejected before any session starts
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("base bet must be positive, got {0}")]
    NonPositiveBaseBet(f64),
    #[error("starting balance {0} is below the base bet {1}")]
    InsufficientBalance(f64, f64),
    #[error("win chance must be strictly between 0 and 1, got {0}")]
    WinChanceOutOfRange(f64),
    #[error("house edge must be in [0, 1), got {0}")]
    HouseEdgeOutOfRange(f64),
    #[error("{0} factor must be non-negative, got {1}")]
    NegativeFactor(&'static str, f64),
    #[error("max bet {0} is below the base bet {1}")]
    MaxBetBelowBase(f64, f64),
    #[error("stop-loss {0} must be below the starting balance {1}")]
    StopLossAboveBalance(f64, f64),
    #[error("stop-win {0} must be above the starting balance {1}")]
    StopWinBelowBalance(f64, f64),
    #[error("streak depth must be at least 1")]
    ZeroStreakDepth,
    #[error("line entries must be positive, got {0}")]
    NonPositiveLineEntry(f64),
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
}

impl BetConfig {
    /// Check all invariants. Called once by the runner before any
    /// session starts; invalid configs never reach the decision loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_bet > 0.0) {
            return Err(ConfigError::NonPositiveBaseBet(self.base_bet));
        }
        if self.starting_balance < self.base_bet {
            return Err(ConfigError::InsufficientBalance(
                self.starting_balance,
                self.base_bet,
            ));
        }
        if !(self.win_chance > 0.0 && self.win_chance < 1.0) {
            return Err(ConfigError::WinChanceOutOfRange(self.win_chance));
        }
        if !(0.0..1.0).contains(&self.house_edge) {
            return Err(ConfigError::HouseEdgeOutOfRange(self.house_edge));
        }
        if self.increase_on_loss < 0.0 {
            return Err(ConfigError::NegativeFactor(
                "increase-on-loss",
                self.increase_on_loss,
            ));
        }
        if self.decrease_on_win < 0.0 {
            return Err(ConfigError::NegativeFactor(
                "decrease-on-win",
                self.decrease_on_win,
            ));
        }
        if let Some(max_bet) = self.max_bet {
            if max_bet < self.base_bet {
                return Err(ConfigError::MaxBetBelowBase(max_bet, self.base_bet));
            }
        }
        if let Some(stop_loss) = self.stop_loss {
            if stop_loss >= self.starting_balance {
                return Err(ConfigError::StopLossAboveBalance(
                    stop_loss,
                    self.starting_balance,
                ));
            }
        }
        if let Some(stop_win) = self.stop_win {
            if stop_win <= self.starting_balance {
                return Err(ConfigError::StopWinBelowBalance(
                    stop_win,
                    self.starting_balance,
                ));
            }
        }
        if self.streak_depth == 0 {
            return Err(ConfigError::ZeroStreakDepth);
        }
        if self.max_loss_streak == Some(0) {
            return Err(ConfigError::ZeroStreakDepth);
        }
        if let Some(line) = &self.line {
            for &entry in line {
                if !(entry > 0.0) {
                    return Err(ConfigError::NonPositiveLineEntry(entry));
                }
            }
        }
        Ok(())
    }

    /// Payout multiplier implied by the win chance and house edge.
    /// A 49.5% chance at 1% edge pays 2x; a 9.9% chance pays 10x.
    pub fn payout_multiplier(&self) -> f64 {
        (1.0 - self.house_edge) / self.win_chance
    }

    /// Roll threshold in hundredths; rolls strictly below it win
    pub fn win_threshold(&self) -> f64 {
        self.win_chance * 100.0
    }

    /// Initial working line for Labouchere-family variants, in bet units
    pub fn initial_line(&self) -> Vec<f64> {
        self.line.clone().unwrap_or_else(|| vec![1.0; 4])
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        toml::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }
}
