//! Bet-sizing strategies and the decision engine
//!
//! Every strategy is a variant of [`StrategyKind`] behind one uniform
//! contract: `decide` maps the current session state to the next raw
//! wager, `apply` advances the progression after a resolved bet. The
//! decision depends only on the variant, the immutable config, and the
//! session's own state, so replaying the same roll sequence reproduces
//! the same bets exactly.

use serde::{Deserialize, Serialize};

use super::config::{BetConfig, ConfigError, MAX_REPRESENTABLE_BET};
use super::state::{BetOutcome, Scratch, SessionState, TerminationReason};

/// Unit ladder for the 1-3-2-6 system
const LADDER_1326: [f64; 4] = [1.0, 3.0, 2.0, 6.0];

/// Tagged strategy variant. One tag per system; `decide`/`apply` match
/// exhaustively so a new variant cannot be half-wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Always bet the base amount
    Flat,
    /// Multiply the bet on every loss, reset on a win
    Martingale,
    /// Martingale plus one base unit per loss
    GrandMartingale,
    /// Flat until the loss streak reaches `streak_depth`, then Martingale
    DelayedMartingale,
    /// Escalate on wins up to `streak_depth`, reset on a loss
    Paroli,
    /// Add one unit on a loss, remove one on a win
    DAlembert,
    /// Add one unit on a win, remove one on a loss
    ContraDAlembert,
    /// Walk the Fibonacci sequence: forward on loss, back two on win
    Fibonacci,
    /// Walk the Fibonacci sequence: forward on win, back two on loss
    ReverseFibonacci,
    /// Cancellation system over a working line; win cancels the ends
    Labouchere,
    /// Cancellation system mirrored; loss cancels the ends
    ReverseLabouchere,
    /// Grind each cycle to exactly one unit of profit
    OscarsGrind,
    /// 1-3-2-6 unit ladder on wins, reset on loss
    #[serde(rename = "1-3-2-6")]
    OneThreeTwoSix,
    /// Let the full payout ride for `streak_depth` wins
    Parlay,
    /// Bet a fixed fraction of the current balance
    Percentage,
    /// Kelly fraction of the balance when the edge is positive, else base
    Kelly,
    /// Blocks of three equal bets on the 1-3-5... ladder
    Hollandish,
}

impl StrategyKind {
    /// All variants, in display order
    pub const ALL: [StrategyKind; 17] = [
        Self::Flat,
        Self::Martingale,
        Self::GrandMartingale,
        Self::DelayedMartingale,
        Self::Paroli,
        Self::DAlembert,
        Self::ContraDAlembert,
        Self::Fibonacci,
        Self::ReverseFibonacci,
        Self::Labouchere,
        Self::ReverseLabouchere,
        Self::OscarsGrind,
        Self::OneThreeTwoSix,
        Self::Parlay,
        Self::Percentage,
        Self::Kelly,
        Self::Hollandish,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Martingale => "martingale",
            Self::GrandMartingale => "grand-martingale",
            Self::DelayedMartingale => "delayed-martingale",
            Self::Paroli => "paroli",
            Self::DAlembert => "dalembert",
            Self::ContraDAlembert => "contra-dalembert",
            Self::Fibonacci => "fibonacci",
            Self::ReverseFibonacci => "reverse-fibonacci",
            Self::Labouchere => "labouchere",
            Self::ReverseLabouchere => "reverse-labouchere",
            Self::OscarsGrind => "oscars-grind",
            Self::OneThreeTwoSix => "1-3-2-6",
            Self::Parlay => "parlay",
            Self::Percentage => "percentage",
            Self::Kelly => "kelly",
            Self::Hollandish => "hollandish",
        }
    }

    /// Parse a strategy name as used on the command line
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .find(|k| k.name() == name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))
    }

    /// Reset scratch and current bet to this variant's starting point
    pub fn init(&self, config: &BetConfig, state: &mut SessionState) {
        state.scratch = match self {
            Self::Fibonacci | Self::ReverseFibonacci | Self::OneThreeTwoSix => Scratch::Cursor(0),
            Self::Labouchere | Self::ReverseLabouchere => Scratch::Line(config.initial_line()),
            Self::OscarsGrind => Scratch::CycleProfit(0.0),
            Self::Hollandish => Scratch::Block {
                position: 0,
                profit: 0.0,
                level: 0,
            },
            _ => Scratch::None,
        };
        state.current_bet = match self {
            Self::Labouchere | Self::ReverseLabouchere => {
                line_bet(config, config.initial_line())
            }
            _ => config.base_bet,
        };
    }

    /// Next raw wager, before cap and balance clamping. Pure: reads only
    /// the config and the session's own state.
    pub fn decide(&self, config: &BetConfig, state: &SessionState) -> f64 {
        match self {
            Self::Percentage => state.balance * (config.base_bet / config.starting_balance),
            Self::Kelly => {
                let net_odds = config.payout_multiplier() - 1.0;
                let edge = config.win_chance * config.payout_multiplier() - 1.0;
                if net_odds > 0.0 && edge > 0.0 {
                    state.balance * (edge / net_odds)
                } else {
                    // Any house-edged game has a non-positive Kelly
                    // fraction; stake the base unit instead
                    config.base_bet
                }
            }
            _ => state.current_bet,
        }
    }

    /// Advance the progression after one resolved bet. `state` has
    /// already booked the outcome via [`SessionState::record`].
    pub fn apply(&self, config: &BetConfig, state: &mut SessionState, outcome: &BetOutcome) {
        let base = config.base_bet;
        let placed = outcome.amount;
        match self {
            Self::Flat | Self::Percentage | Self::Kelly => {
                state.current_bet = base;
            }
            Self::Martingale => {
                state.current_bet = if outcome.win {
                    base * config.decrease_on_win
                } else {
                    placed * config.increase_on_loss
                };
            }
            Self::GrandMartingale => {
                state.current_bet = if outcome.win {
                    base * config.decrease_on_win
                } else {
                    placed * config.increase_on_loss + base
                };
            }
            Self::DelayedMartingale => {
                state.current_bet = if outcome.win {
                    base * config.decrease_on_win
                } else if state.consecutive_losses >= config.streak_depth {
                    placed * config.increase_on_loss
                } else {
                    base
                };
            }
            Self::Paroli => {
                state.current_bet = if !outcome.win
                    || state.consecutive_wins % config.streak_depth == 0
                {
                    base
                } else {
                    placed * config.increase_on_loss
                };
            }
            Self::Parlay => {
                state.current_bet = if !outcome.win
                    || state.consecutive_wins % config.streak_depth == 0
                {
                    base
                } else {
                    placed * config.payout_multiplier()
                };
            }
            Self::DAlembert => {
                state.current_bet = if outcome.win {
                    (placed - base).max(base)
                } else {
                    placed + base
                };
            }
            Self::ContraDAlembert => {
                state.current_bet = if outcome.win {
                    placed + base
                } else {
                    (placed - base).max(base)
                };
            }
            Self::Fibonacci => {
                let cursor = match state.scratch {
                    Scratch::Cursor(c) => c,
                    _ => 0,
                };
                let cursor = if outcome.win {
                    cursor.saturating_sub(2)
                } else {
                    cursor + 1
                };
                state.scratch = Scratch::Cursor(cursor);
                state.current_bet = base * fibonacci(cursor);
            }
            Self::ReverseFibonacci => {
                let cursor = match state.scratch {
                    Scratch::Cursor(c) => c,
                    _ => 0,
                };
                let cursor = if outcome.win {
                    cursor + 1
                } else {
                    cursor.saturating_sub(2)
                };
                state.scratch = Scratch::Cursor(cursor);
                state.current_bet = base * fibonacci(cursor);
            }
            Self::Labouchere => {
                let mut line = match std::mem::replace(&mut state.scratch, Scratch::None) {
                    Scratch::Line(line) => line,
                    _ => config.initial_line(),
                };
                if outcome.win {
                    line.pop();
                    if !line.is_empty() {
                        line.remove(0);
                    }
                    if line.is_empty() {
                        line = config.initial_line();
                    }
                } else {
                    line.push(placed / base);
                }
                state.current_bet = line_bet(config, line.clone());
                state.scratch = Scratch::Line(line);
            }
            Self::ReverseLabouchere => {
                let mut line = match std::mem::replace(&mut state.scratch, Scratch::None) {
                    Scratch::Line(line) => line,
                    _ => config.initial_line(),
                };
                if outcome.win {
                    line.push(outcome.profit / base);
                } else {
                    line.pop();
                    if !line.is_empty() {
                        line.remove(0);
                    }
                    if line.is_empty() {
                        line = config.initial_line();
                    }
                }
                state.current_bet = line_bet(config, line.clone());
                state.scratch = Scratch::Line(line);
            }
            Self::OscarsGrind => {
                let profit = match state.scratch {
                    Scratch::CycleProfit(p) => p,
                    _ => 0.0,
                } + outcome.profit;
                // Cycle closes once it is one unit ahead
                if profit >= base - 1e-9 {
                    state.scratch = Scratch::CycleProfit(0.0);
                    state.current_bet = base;
                } else {
                    let planned = if outcome.win { placed + base } else { placed };
                    // Never bet more than needed to finish the cycle
                    let gain_per_unit = config.payout_multiplier() - 1.0;
                    let capped = if gain_per_unit > 0.0 {
                        planned.min((base - profit) / gain_per_unit)
                    } else {
                        planned
                    };
                    state.scratch = Scratch::CycleProfit(profit);
                    state.current_bet = capped;
                }
            }
            Self::OneThreeTwoSix => {
                let cursor = match state.scratch {
                    Scratch::Cursor(c) => c,
                    _ => 0,
                };
                let cursor = if outcome.win {
                    (cursor + 1) % LADDER_1326.len()
                } else {
                    0
                };
                state.scratch = Scratch::Cursor(cursor);
                state.current_bet = base * LADDER_1326[cursor];
            }
            Self::Hollandish => {
                let (mut position, mut profit, mut level) = match state.scratch {
                    Scratch::Block {
                        position,
                        profit,
                        level,
                    } => (position, profit, level),
                    _ => (0, 0.0, 0),
                };
                profit += outcome.profit;
                position += 1;
                if position >= 3 {
                    level = if profit > 0.0 { 0 } else { level + 1 };
                    position = 0;
                    profit = 0.0;
                }
                state.scratch = Scratch::Block {
                    position,
                    profit,
                    level,
                };
                state.current_bet = base * (2 * level + 1) as f64;
            }
        }
    }
}

/// Fibonacci number as f64: fib(0) = fib(1) = 1
fn fibonacci(index: usize) -> f64 {
    let (mut a, mut b) = (1.0_f64, 1.0_f64);
    for _ in 0..index {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

/// Labouchere stake for a working line: first + last unit, in currency
fn line_bet(config: &BetConfig, line: Vec<f64>) -> f64 {
    let units = match line.as_slice() {
        [] => 1.0,
        [only] => *only,
        [first, .., last] => first + last,
    };
    units * config.base_bet
}

/// Result of asking the engine for the next wager
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BetDecision {
    /// Wager this amount (already cap- and balance-clamped)
    Bet(f64),
    /// Escalation left the representable range; terminate the session
    Overflow,
}

/// One strategy instance driving one session.
///
/// Owns the session state exclusively; nothing here touches global or
/// cross-session data.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    pub kind: StrategyKind,
    pub config: BetConfig,
    pub state: SessionState,
}

impl StrategyEngine {
    /// Build an engine for one session. Validates the config up front so
    /// a bad configuration never reaches the decision loop.
    pub fn new(kind: StrategyKind, config: BetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut state = SessionState::new(&config);
        kind.init(&config, &mut state);
        Ok(Self {
            kind,
            config,
            state,
        })
    }

    /// Decide the next wager. The raw decision is checked for overflow,
    /// clamped to the max-bet cap, then clamped to the remaining balance
    /// ("final bet" semantics).
    pub fn next_bet(&mut self) -> BetDecision {
        let raw = self.kind.decide(&self.config, &self.state);
        if !raw.is_finite() || raw > MAX_REPRESENTABLE_BET {
            return BetDecision::Overflow;
        }
        let mut bet = raw;
        if let Some(cap) = self.config.max_bet {
            bet = bet.min(cap);
        }
        bet = bet.min(self.state.balance);
        self.state.current_bet = bet;
        BetDecision::Bet(bet)
    }

    /// Book one resolved bet and advance the progression
    pub fn apply(&mut self, outcome: &BetOutcome) {
        self.state.record(outcome);
        self.kind.apply(&self.config, &mut self.state, outcome);
        // Optional loss-streak circuit breaker: give up the chase and
        // restart the progression from scratch
        if let Some(depth) = self.config.max_loss_streak {
            if self.state.consecutive_losses >= depth {
                self.state.consecutive_losses = 0;
                self.kind.init(&self.config, &mut self.state);
            }
        }
    }

    /// Termination policy, evaluated after each `apply`. First match
    /// wins: exhausted balance, stop-loss, stop-win, bet limit.
    pub fn termination(&self, max_bets: u64) -> Option<TerminationReason> {
        if self.state.balance <= 1e-9 {
            return Some(TerminationReason::BalanceExhausted);
        }
        if let Some(floor) = self.config.stop_loss {
            if self.state.balance <= floor {
                return Some(TerminationReason::StopLossHit);
            }
        }
        if let Some(ceiling) = self.config.stop_win {
            if self.state.balance >= ceiling {
                return Some(TerminationReason::StopWinHit);
            }
        }
        if self.state.bet_index >= max_bets {
            return Some(TerminationReason::BetLimitReached);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 50% chance at zero edge pays exactly 2x, which keeps the
    /// progression arithmetic exact in tests
    fn even_config() -> BetConfig {
        BetConfig {
            starting_balance: 1_000_000.0,
            base_bet: 1.0,
            win_chance: 0.5,
            house_edge: 0.0,
            ..Default::default()
        }
    }

    /// Drive one scripted bet through the engine and return the amount placed
    fn step(engine: &mut StrategyEngine, win: bool) -> f64 {
        let bet = match engine.next_bet() {
            BetDecision::Bet(amount) => amount,
            BetDecision::Overflow => panic!("unexpected overflow"),
        };
        let profit = if win {
            bet * (engine.config.payout_multiplier() - 1.0)
        } else {
            -bet
        };
        let outcome = BetOutcome {
            index: engine.state.bet_index,
            amount: bet,
            roll: if win { 10.0 } else { 90.0 },
            threshold: engine.config.win_threshold(),
            win,
            profit,
            balance_after: engine.state.balance + profit,
        };
        engine.apply(&outcome);
        bet
    }

    fn bets_for(kind: StrategyKind, config: BetConfig, script: &[bool]) -> Vec<f64> {
        let mut engine = StrategyEngine::new(kind, config).unwrap();
        script.iter().map(|&win| step(&mut engine, win)).collect()
    }

    #[test]
    fn test_flat_never_moves() {
        let bets = bets_for(
            StrategyKind::Flat,
            even_config(),
            &[false, false, true, false, true],
        );
        assert_eq!(bets, vec![1.0; 5]);
    }

    #[test]
    fn test_martingale_doubles_until_cap() {
        let config = BetConfig {
            max_bet: Some(100.0),
            ..even_config()
        };
        let bets = bets_for(StrategyKind::Martingale, config, &[false; 9]);
        assert_eq!(bets, vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 100.0, 100.0]);
    }

    #[test]
    fn test_martingale_resets_on_win() {
        let bets = bets_for(
            StrategyKind::Martingale,
            even_config(),
            &[false, false, false, true, false],
        );
        assert_eq!(bets, vec![1.0, 2.0, 4.0, 8.0, 1.0]);
    }

    #[test]
    fn test_grand_martingale_adds_a_unit() {
        let bets = bets_for(StrategyKind::GrandMartingale, even_config(), &[false; 3]);
        assert_eq!(bets, vec![1.0, 3.0, 7.0]);
    }

    #[test]
    fn test_delayed_martingale_waits_for_streak() {
        // streak_depth = 3: flat through the first three losses
        let bets = bets_for(StrategyKind::DelayedMartingale, even_config(), &[false; 6]);
        assert_eq!(bets, vec![1.0, 1.0, 1.0, 2.0, 4.0, 8.0]);
    }

    #[test]
    fn test_paroli_escalates_wins_then_resets() {
        // Depth 3: 1, 2, 4, then back to base on the cycle boundary
        let bets = bets_for(
            StrategyKind::Paroli,
            even_config(),
            &[true, true, true, true, false, true],
        );
        assert_eq!(bets, vec![1.0, 2.0, 4.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_parlay_rides_full_payout() {
        let bets = bets_for(StrategyKind::Parlay, even_config(), &[true, true, true, true]);
        assert_eq!(bets, vec![1.0, 2.0, 4.0, 1.0]);
    }

    #[test]
    fn test_dalembert_steps() {
        let bets = bets_for(
            StrategyKind::DAlembert,
            even_config(),
            &[false, false, true, true, true],
        );
        // 1, +1, +1, then -1 per win, floored at the base unit
        assert_eq!(bets, vec![1.0, 2.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_contra_dalembert_mirrors() {
        let bets = bets_for(
            StrategyKind::ContraDAlembert,
            even_config(),
            &[true, true, false, false],
        );
        assert_eq!(bets, vec![1.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_fibonacci_cursor_advances_and_retreats() {
        let mut engine = StrategyEngine::new(StrategyKind::Fibonacci, even_config()).unwrap();
        let mut bets = Vec::new();
        for &win in &[false, false, false, false, true] {
            bets.push(step(&mut engine, win));
        }
        // Cursor 0,1,2,3,4 -> bets 1,1,2,3,5; the win retreats two steps
        assert_eq!(bets, vec![1.0, 1.0, 2.0, 3.0, 5.0]);
        assert_eq!(engine.state.scratch, Scratch::Cursor(2));

        // A second win retreats to the sequence start, not below it
        step(&mut engine, true);
        assert_eq!(engine.state.scratch, Scratch::Cursor(0));
        step(&mut engine, true);
        assert_eq!(engine.state.scratch, Scratch::Cursor(0));
    }

    #[test]
    fn test_reverse_fibonacci_advances_on_win() {
        let bets = bets_for(
            StrategyKind::ReverseFibonacci,
            even_config(),
            &[true, true, true, false],
        );
        assert_eq!(bets, vec![1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_labouchere_cancels_ends_on_win() {
        // Default line 1,1,1,1: stake is first+last = 2 units
        let mut engine = StrategyEngine::new(StrategyKind::Labouchere, even_config()).unwrap();
        assert_eq!(step(&mut engine, true), 2.0);
        assert_eq!(engine.state.scratch, Scratch::Line(vec![1.0, 1.0]));
        assert_eq!(step(&mut engine, true), 2.0);
        // Line emptied: reset to the initial line
        assert_eq!(engine.state.scratch, Scratch::Line(vec![1.0; 4]));
    }

    #[test]
    fn test_labouchere_appends_loss() {
        let mut engine = StrategyEngine::new(StrategyKind::Labouchere, even_config()).unwrap();
        assert_eq!(step(&mut engine, false), 2.0);
        assert_eq!(engine.state.scratch, Scratch::Line(vec![1.0, 1.0, 1.0, 1.0, 2.0]));
        // Next stake: 1 + 2 units
        assert_eq!(step(&mut engine, false), 3.0);
    }

    #[test]
    fn test_reverse_labouchere_cancels_on_loss() {
        let mut engine =
            StrategyEngine::new(StrategyKind::ReverseLabouchere, even_config()).unwrap();
        assert_eq!(step(&mut engine, false), 2.0);
        assert_eq!(engine.state.scratch, Scratch::Line(vec![1.0, 1.0]));
        assert_eq!(step(&mut engine, true), 2.0);
        assert_eq!(engine.state.scratch, Scratch::Line(vec![1.0, 1.0, 2.0]));
    }

    #[test]
    fn test_oscars_grind_cycle() {
        let mut engine = StrategyEngine::new(StrategyKind::OscarsGrind, even_config()).unwrap();
        // Two losses: stake stays at one unit, cycle is 2 units down
        assert_eq!(step(&mut engine, false), 1.0);
        assert_eq!(step(&mut engine, false), 1.0);
        // Win: up one unit to 2, cycle profit -1
        assert_eq!(step(&mut engine, true), 1.0);
        assert_eq!(engine.state.scratch, Scratch::CycleProfit(-1.0));
        // Win at 2 would overshoot +1 target from -1, so stake caps at 2
        assert_eq!(step(&mut engine, true), 2.0);
        // Cycle closed at +1 unit: back to base
        assert_eq!(engine.state.scratch, Scratch::CycleProfit(0.0));
        assert_eq!(engine.state.current_bet, 1.0);
    }

    #[test]
    fn test_one_three_two_six_ladder() {
        let bets = bets_for(
            StrategyKind::OneThreeTwoSix,
            even_config(),
            &[true, true, true, true, true, false, true],
        );
        assert_eq!(bets, vec![1.0, 3.0, 2.0, 6.0, 1.0, 3.0, 1.0]);
    }

    #[test]
    fn test_percentage_tracks_balance() {
        let config = BetConfig {
            starting_balance: 100.0,
            base_bet: 1.0,
            ..even_config()
        };
        let mut engine = StrategyEngine::new(StrategyKind::Percentage, config).unwrap();
        assert!((step(&mut engine, false) - 1.0).abs() < 1e-12);
        // Balance 99 -> 1% of it
        assert!((step(&mut engine, false) - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_kelly_bets_edge_fraction_of_balance() {
        // A 50% chance paying 3x carries a 0.5 edge on 2x net odds, so
        // Kelly stakes a quarter of the balance
        let config = BetConfig {
            win_chance: 0.5,
            house_edge: -0.5,
            ..even_config()
        };
        let state = SessionState::new(&config);
        assert_eq!(StrategyKind::Kelly.decide(&config, &state), 250_000.0);
    }

    #[test]
    fn test_kelly_falls_back_to_base_without_edge() {
        // Fair and house-edged games have no positive Kelly fraction
        let bets = bets_for(StrategyKind::Kelly, even_config(), &[false, true, false]);
        assert_eq!(bets, vec![1.0; 3]);

        let state = SessionState::new(&BetConfig::default());
        assert_eq!(
            StrategyKind::Kelly.decide(&BetConfig::default(), &state),
            BetConfig::default().base_bet
        );
    }

    #[test]
    fn test_hollandish_steps_after_losing_block() {
        let bets = bets_for(StrategyKind::Hollandish, even_config(), &[false; 7]);
        // Three bets at 1 unit, three at 3 units, then 5 units
        assert_eq!(bets, vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0, 5.0]);
    }

    #[test]
    fn test_hollandish_resets_after_winning_block() {
        let bets = bets_for(
            StrategyKind::Hollandish,
            even_config(),
            &[false, false, false, true, true, false, false],
        );
        // Losing block escalates to 3 units; net-winning block resets
        assert_eq!(bets, vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0, 1.0]);
    }

    #[test]
    fn test_loss_streak_reset() {
        let config = BetConfig {
            max_loss_streak: Some(3),
            ..even_config()
        };
        let bets = bets_for(StrategyKind::Martingale, config, &[false; 6]);
        // The chase restarts after three straight losses
        assert_eq!(bets, vec![1.0, 2.0, 4.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_final_bet_clamps_to_balance() {
        let config = BetConfig {
            starting_balance: 10.0,
            base_bet: 4.0,
            increase_on_loss: 2.0,
            ..even_config()
        };
        let mut engine = StrategyEngine::new(StrategyKind::Martingale, config).unwrap();
        assert_eq!(step(&mut engine, false), 4.0); // balance 6
        assert_eq!(step(&mut engine, false), 6.0); // wanted 8, clamped
        assert_eq!(engine.state.balance, 0.0);
        assert_eq!(
            engine.termination(u64::MAX),
            Some(TerminationReason::BalanceExhausted)
        );
    }

    #[test]
    fn test_overflow_signals_instead_of_failing() {
        let config = BetConfig {
            increase_on_loss: 1e200,
            ..even_config()
        };
        let mut engine = StrategyEngine::new(StrategyKind::Martingale, config).unwrap();
        step(&mut engine, false);
        // Next decision wants 1e200 times the stake
        assert_eq!(engine.next_bet(), BetDecision::Overflow);
    }

    #[test]
    fn test_termination_ordering() {
        let config = BetConfig {
            starting_balance: 100.0,
            stop_loss: Some(50.0),
            stop_win: Some(150.0),
            ..even_config()
        };
        let mut engine = StrategyEngine::new(StrategyKind::Flat, config).unwrap();
        assert_eq!(engine.termination(1000), None);
        engine.state.balance = 40.0;
        assert_eq!(engine.termination(1000), Some(TerminationReason::StopLossHit));
        engine.state.balance = 200.0;
        assert_eq!(engine.termination(1000), Some(TerminationReason::StopWinHit));
        engine.state.balance = 100.0;
        engine.state.bet_index = 1000;
        assert_eq!(
            engine.termination(1000),
            Some(TerminationReason::BetLimitReached)
        );
    }

    #[test]
    fn test_rejects_invalid_config_up_front() {
        let config = BetConfig {
            win_chance: 1.0,
            ..Default::default()
        };
        assert!(StrategyEngine::new(StrategyKind::Flat, config).is_err());
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(StrategyKind::from_name(kind.name()).unwrap(), kind);
        }
        assert!(StrategyKind::from_name("fleecing").is_err());
    }
}
