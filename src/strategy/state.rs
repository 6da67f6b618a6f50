//! Session state and bet records

use serde::{Deserialize, Serialize};

use super::config::BetConfig;

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Balance can no longer cover any wager
    BalanceExhausted,
    /// Balance fell to or below the configured stop-loss floor
    StopLossHit,
    /// Balance rose to or above the configured stop-win ceiling
    StopWinHit,
    /// The per-session bet limit was reached
    BetLimitReached,
    /// Bet escalation left the representable range; only this session dies
    BetOverflow,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BalanceExhausted => "balance-exhausted",
            Self::StopLossHit => "stop-loss-hit",
            Self::StopWinHit => "stop-win-hit",
            Self::BetLimitReached => "bet-limit-reached",
            Self::BetOverflow => "bet-overflow",
        }
    }

    pub fn all() -> [TerminationReason; 5] {
        [
            Self::BalanceExhausted,
            Self::StopLossHit,
            Self::StopWinHit,
            Self::BetLimitReached,
            Self::BetOverflow,
        ]
    }
}

/// Strategy-specific scratch carried between bets.
///
/// Each variant family keeps its own shape; the engine resets it to the
/// right shape when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scratch {
    /// No extra state (Flat, Martingale, D'Alembert, ...)
    None,
    /// Position in a fixed sequence (Fibonacci, 1-3-2-6)
    Cursor(usize),
    /// Working line in base-bet units (Labouchere family)
    Line(Vec<f64>),
    /// Net profit of the current grind cycle, in currency (Oscar's Grind)
    CycleProfit(f64),
    /// Hollandish block: bets into the current block, block net profit,
    /// and the progression level (0 = one unit, 1 = three units, ...)
    Block { position: u8, profit: f64, level: u32 },
}

/// One resolved wager, immutable once recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetOutcome {
    /// Zero-based index of this bet within the session
    pub index: u64,
    /// Amount actually wagered (after cap and final-bet clamping)
    pub amount: f64,
    /// Roll value, 0.00..=99.99
    pub roll: f64,
    /// Threshold in hundredths the roll had to beat (roll-under wins)
    pub threshold: f64,
    /// Whether the roll won
    pub win: bool,
    /// Balance change: positive winnings or the negated stake
    pub profit: f64,
    /// Balance after this bet resolved
    pub balance_after: f64,
}

/// Mutable state owned by exactly one running strategy instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Current bankroll
    pub balance: f64,
    /// Wager decided for the next bet, before clamping
    pub current_bet: f64,
    /// Consecutive losses since the last win
    pub consecutive_losses: u32,
    /// Consecutive wins since the last loss
    pub consecutive_wins: u32,
    /// Sum of all amounts wagered so far
    pub total_wagered: f64,
    /// Balance minus starting balance
    pub net_profit: f64,
    /// Number of bets resolved so far
    pub bet_index: u64,
    /// Highest balance seen
    pub peak_balance: f64,
    /// Lowest balance seen
    pub trough_balance: f64,
    /// Strategy-specific scratch
    pub scratch: Scratch,
}

impl SessionState {
    /// Fresh state at session start
    pub fn new(config: &BetConfig) -> Self {
        Self {
            balance: config.starting_balance,
            current_bet: config.base_bet,
            consecutive_losses: 0,
            consecutive_wins: 0,
            total_wagered: 0.0,
            net_profit: 0.0,
            bet_index: 0,
            peak_balance: config.starting_balance,
            trough_balance: config.starting_balance,
            scratch: Scratch::None,
        }
    }

    /// Book-keep one resolved bet: balance, counters, peaks. Strategy
    /// scratch is updated separately by the variant's `apply`.
    pub fn record(&mut self, outcome: &BetOutcome) {
        self.balance = outcome.balance_after;
        self.total_wagered += outcome.amount;
        self.net_profit += outcome.profit;
        self.bet_index += 1;
        if outcome.win {
            self.consecutive_wins += 1;
            self.consecutive_losses = 0;
        } else {
            self.consecutive_losses += 1;
            self.consecutive_wins = 0;
        }
        if self.balance > self.peak_balance {
            self.peak_balance = self.balance;
        }
        if self.balance < self.trough_balance {
            self.trough_balance = self.balance;
        }
    }
}

/// Terminal summary of one session, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Index of the session within its batch
    pub session: u64,
    /// RNG seed the session ran with (0 for replayed history)
    pub seed: u64,
    /// Strategy name the session ran
    pub strategy: String,
    /// Bankroll at termination
    pub final_balance: f64,
    /// Highest balance seen during the session
    pub peak_balance: f64,
    /// Lowest balance seen during the session
    pub trough_balance: f64,
    /// Bets resolved before termination
    pub bets_placed: u64,
    /// Sum of all wagers
    pub total_wagered: f64,
    /// Final balance minus starting balance
    pub net_profit: f64,
    /// Why the session stopped
    pub reason: TerminationReason,
}
