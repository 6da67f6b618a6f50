//! Distributional summaries over completed sessions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::strategy::{SessionResult, TerminationReason};

/// Distributional summary of a batch of completed sessions.
///
/// Only produced for non-empty batches; [`summarize`] returns `None` for
/// an empty one so "no data" can never be mistaken for real statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Completed sessions the summary covers
    pub sessions: usize,
    /// Mean net profit per session
    pub mean_profit: f64,
    /// Median net profit
    pub median_profit: f64,
    /// Sample variance of net profit
    pub profit_variance: f64,
    /// Fraction of sessions that finished in profit
    pub profit_probability: f64,
    /// Fraction of sessions ending with each termination reason
    pub reason_probabilities: HashMap<String, f64>,
    /// 5th percentile of final balance
    pub balance_p5: f64,
    /// Median final balance
    pub balance_p50: f64,
    /// 95th percentile of final balance
    pub balance_p95: f64,
    /// Mean bets placed before termination
    pub mean_bets: f64,
    /// Largest peak-to-trough balance drop seen in any session
    pub max_drawdown: f64,
}

/// Summarize a batch of session results in one pass (plus a sort for the
/// order statistics). Inputs are never mutated; an empty batch yields
/// `None`, the explicit no-data result.
pub fn summarize(results: &[SessionResult]) -> Option<Summary> {
    if results.is_empty() {
        return None;
    }
    let n = results.len();
    let nf = n as f64;

    let mut profits: Vec<f64> = results.iter().map(|r| r.net_profit).collect();
    let mut finals: Vec<f64> = results.iter().map(|r| r.final_balance).collect();
    profits.sort_by(|a, b| a.total_cmp(b));
    finals.sort_by(|a, b| a.total_cmp(b));

    let mean_profit = profits.iter().sum::<f64>() / nf;
    let profit_variance = if n > 1 {
        profits
            .iter()
            .map(|p| (p - mean_profit) * (p - mean_profit))
            .sum::<f64>()
            / (nf - 1.0)
    } else {
        0.0
    };

    let mut reason_counts: HashMap<TerminationReason, usize> = HashMap::new();
    for result in results {
        *reason_counts.entry(result.reason).or_insert(0) += 1;
    }
    let reason_probabilities = reason_counts
        .into_iter()
        .map(|(reason, count)| (reason.as_str().to_string(), count as f64 / nf))
        .collect();

    let max_drawdown = results
        .iter()
        .map(|r| r.peak_balance - r.trough_balance)
        .fold(0.0, f64::max);

    Some(Summary {
        sessions: n,
        mean_profit,
        median_profit: percentile(&profits, 50.0),
        profit_variance,
        profit_probability: results.iter().filter(|r| r.net_profit > 0.0).count() as f64 / nf,
        reason_probabilities,
        balance_p5: percentile(&finals, 5.0),
        balance_p50: percentile(&finals, 50.0),
        balance_p95: percentile(&finals, 95.0),
        mean_bets: results.iter().map(|r| r.bets_placed as f64).sum::<f64>() / nf,
        max_drawdown,
    })
}

/// Nearest-rank percentile over an already-sorted slice
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Theoretical mean profit of a flat strategy: each bet carries an edge
/// of `payout x chance - 1` per unit wagered.
pub fn expected_flat_profit(bets: u64, bet: f64, win_chance: f64, payout: f64) -> f64 {
    bets as f64 * (payout * win_chance - 1.0) * bet
}

impl Summary {
    /// Format as an ASCII table for terminal output
    pub fn format_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nSummary over {} sessions:\n\n", self.sessions));
        output.push_str(&format!("{:>22}: {:>12.4}\n", "mean net profit", self.mean_profit));
        output.push_str(&format!("{:>22}: {:>12.4}\n", "median net profit", self.median_profit));
        output.push_str(&format!("{:>22}: {:>12.4}\n", "profit variance", self.profit_variance));
        output.push_str(&format!(
            "{:>22}: {:>11.1}%\n",
            "ended in profit",
            self.profit_probability * 100.0
        ));
        output.push_str(&format!("{:>22}: {:>12.2}\n", "final balance p5", self.balance_p5));
        output.push_str(&format!("{:>22}: {:>12.2}\n", "final balance p50", self.balance_p50));
        output.push_str(&format!("{:>22}: {:>12.2}\n", "final balance p95", self.balance_p95));
        output.push_str(&format!("{:>22}: {:>12.1}\n", "mean bets", self.mean_bets));
        output.push_str(&format!("{:>22}: {:>12.2}\n", "max drawdown", self.max_drawdown));

        output.push_str("\nTermination reasons:\n");
        let mut reasons: Vec<_> = self.reason_probabilities.iter().collect();
        reasons.sort_by(|a, b| b.1.total_cmp(a.1));
        for (reason, probability) in reasons {
            output.push_str(&format!("{:>22}: {:>11.1}%\n", reason, probability * 100.0));
        }
        output
    }
}

/// Format a strategy comparison as an ASCII leaderboard, best mean
/// profit first
pub fn format_leaderboard(entries: &[(String, Summary)]) -> String {
    let mut ranked: Vec<_> = entries.iter().collect();
    ranked.sort_by(|a, b| b.1.mean_profit.total_cmp(&a.1.mean_profit));

    let mut output = String::new();
    output.push_str("\nStrategy comparison:\n\n");
    output.push_str(&format!(
        "{:>20} | {:>12} | {:>10} | {:>12} | {:>10}\n",
        "strategy", "mean profit", "in profit", "p5 balance", "mean bets"
    ));
    output.push_str(&format!(
        "{:-<21}+{:-<14}+{:-<12}+{:-<14}+{:-<11}\n",
        "", "", "", "", ""
    ));
    for (name, summary) in ranked {
        output.push_str(&format!(
            "{:>20} | {:>12.4} | {:>9.1}% | {:>12.2} | {:>10.1}\n",
            name,
            summary.mean_profit,
            summary.profit_probability * 100.0,
            summary.balance_p5,
            summary.mean_bets
        ));
    }
    output
}
