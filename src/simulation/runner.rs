//! Session runner
//!
//! Drives independent strategy sessions against roll sources, serially
//! or across a rayon worker pool. Sessions share no mutable state: each
//! gets its own engine and its own source instance, and workers collect
//! into their own vectors that rayon merges at the end. The aggregate
//! result set is therefore invariant to execution order and parallelism
//! degree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::analytics::{Summary, format_leaderboard, summarize};
use crate::strategy::{
    BetConfig, BetDecision, BetOutcome, ConfigError, SessionResult, StrategyEngine, StrategyKind,
    TerminationReason,
};

use super::config::{SimConfig, SimMode};
use super::db::ResultDatabase;
use super::source::{OutcomeSource, SourceSpec};

/// Cooperative stop signal shared by a batch of sessions.
///
/// Checked between bets and between sessions; a cancelled in-flight
/// session is discarded rather than reported half-finished, so summaries
/// only ever cover completed sessions.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Initialize the rayon pool with the given thread count.
/// Call once at startup; 0 leaves rayon's auto-detected default.
pub fn init_parallel(threads: usize) {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .expect("Failed to initialize Rayon thread pool");
    }
}

/// Run one session to termination.
///
/// Returns `Ok(None)` when the cancel token fires mid-session; the
/// partial session is discarded. An escalation overflow terminates the
/// session with [`TerminationReason::BetOverflow`] instead of failing
/// the batch. `outcome_log`, when given, receives every resolved bet in
/// chronological order.
pub fn run_session(
    kind: StrategyKind,
    config: &BetConfig,
    mut source: OutcomeSource,
    session: u64,
    seed: u64,
    max_bets: u64,
    cancel: &CancelToken,
    mut outcome_log: Option<&mut Vec<BetOutcome>>,
) -> Result<Option<SessionResult>, ConfigError> {
    let mut engine = StrategyEngine::new(kind, config.clone())?;
    let threshold = config.win_threshold();
    let payout = config.payout_multiplier();

    let reason = loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        if let Some(reason) = engine.termination(max_bets) {
            break reason;
        }
        let amount = match engine.next_bet() {
            BetDecision::Bet(amount) => amount,
            BetDecision::Overflow => break TerminationReason::BetOverflow,
        };
        // Replay histories end the session when they run dry
        let Some(roll) = source.next_roll() else {
            break TerminationReason::BetLimitReached;
        };
        let win = roll < threshold;
        let profit = if win { amount * (payout - 1.0) } else { -amount };
        let outcome = BetOutcome {
            index: engine.state.bet_index,
            amount,
            roll,
            threshold,
            win,
            profit,
            balance_after: engine.state.balance + profit,
        };
        engine.apply(&outcome);
        if let Some(log) = outcome_log.as_deref_mut() {
            log.push(outcome);
        }
    };

    Ok(Some(SessionResult {
        session,
        seed,
        strategy: kind.name().to_string(),
        final_balance: engine.state.balance,
        peak_balance: engine.state.peak_balance,
        trough_balance: engine.state.trough_balance,
        bets_placed: engine.state.bet_index,
        total_wagered: engine.state.total_wagered,
        net_profit: engine.state.net_profit,
        reason,
    }))
}

/// Run a batch of independent sessions sequentially.
///
/// The config is validated once before any session starts; a bad config
/// is reported exactly once. Cancelled sessions are dropped.
pub fn run_sessions(
    kind: StrategyKind,
    config: &BetConfig,
    spec: &SourceSpec,
    sessions: u64,
    max_bets: u64,
    cancel: &CancelToken,
) -> Result<Vec<SessionResult>, ConfigError> {
    config.validate()?;
    let base_seed = spec.resolved_base_seed();

    let mut results = Vec::with_capacity(sessions as usize);
    for session in 0..sessions {
        if cancel.is_cancelled() {
            break;
        }
        let source = spec.for_session(base_seed, session);
        let seed = base_seed.wrapping_add(session);
        if let Some(result) =
            run_session(kind, config, source, session, seed, max_bets, cancel, None)?
        {
            results.push(result);
        }
    }
    Ok(results)
}

/// Run a batch of independent sessions across the rayon pool.
///
/// Each worker collects its own results; rayon merges them, so the only
/// synchronization point is the final collect.
pub fn run_sessions_parallel(
    kind: StrategyKind,
    config: &BetConfig,
    spec: &SourceSpec,
    sessions: u64,
    max_bets: u64,
    cancel: &CancelToken,
) -> Result<Vec<SessionResult>, ConfigError> {
    config.validate()?;
    let base_seed = spec.resolved_base_seed();

    let results = (0..sessions)
        .into_par_iter()
        .filter_map(|session| {
            if cancel.is_cancelled() {
                return None;
            }
            let source = spec.for_session(base_seed, session);
            let seed = base_seed.wrapping_add(session);
            // Config was validated above; per-session setup cannot fail
            run_session(kind, config, source, session, seed, max_bets, cancel, None)
                .ok()
                .flatten()
        })
        .collect();
    Ok(results)
}

fn run_batch(
    kind: StrategyKind,
    config: &BetConfig,
    spec: &SourceSpec,
    sessions: u64,
    max_bets: u64,
    cancel: &CancelToken,
    parallel: bool,
) -> Result<Vec<SessionResult>, ConfigError> {
    if parallel {
        run_sessions_parallel(kind, config, spec, sessions, max_bets, cancel)
    } else {
        run_sessions(kind, config, spec, sessions, max_bets, cancel)
    }
}

/// Full report of one simulation run, serialized to the output file
#[derive(Debug, serde::Serialize)]
pub struct SimReport {
    pub strategy: String,
    pub bet_config: BetConfig,
    pub sessions: usize,
    pub summary: Option<Summary>,
    pub results: Vec<SessionResult>,
}

/// Top-level simulation entry point driven by [`SimConfig`].
///
/// Validates configuration up front (one diagnostic, nothing runs on
/// failure), executes the selected mode, prints summaries, and writes
/// the optional JSON report and SQLite database.
pub fn run_simulation(sim: &SimConfig) -> Result<(), String> {
    let bet_config = sim.bet_config()?;
    bet_config.validate().map_err(|e| e.to_string())?;
    let kind = StrategyKind::from_name(&sim.strategy).map_err(|e| e.to_string())?;

    init_parallel(sim.parallel);
    let spec = SourceSpec::Seeded {
        base_seed: sim.seed,
    };
    let cancel = CancelToken::new();
    let parallel = sim.parallel > 0;

    match sim.mode {
        SimMode::Single => {
            let base_seed = spec.resolved_base_seed();
            let mut outcomes = Vec::new();
            let result = run_session(
                kind,
                &bet_config,
                spec.for_session(base_seed, 0),
                0,
                base_seed,
                sim.max_bets,
                &cancel,
                Some(&mut outcomes),
            )
            .map_err(|e| e.to_string())?
            .expect("uncancelled session always completes");

            if !sim.quiet {
                for outcome in &outcomes {
                    println!(
                        "#{:<6} bet {:>12.2}  roll {:>6.2}  {}  balance {:>14.2}",
                        outcome.index,
                        outcome.amount,
                        outcome.roll,
                        if outcome.win { "win " } else { "loss" },
                        outcome.balance_after
                    );
                }
            }
            println!(
                "\nSession ended: {} after {} bets, net profit {:.2}",
                result.reason.as_str(),
                result.bets_placed,
                result.net_profit
            );
            write_outputs(sim, kind.name(), &bet_config, vec![result], Some(&outcomes))
        }
        SimMode::MonteCarlo { sessions } => {
            if !sim.quiet {
                println!(
                    "Running {} sessions of {} ({} bets max each)...",
                    sessions,
                    kind.name(),
                    sim.max_bets
                );
            }
            let results = run_batch(
                kind,
                &bet_config,
                &spec,
                sessions,
                sim.max_bets,
                &cancel,
                parallel,
            )
            .map_err(|e| e.to_string())?;

            match summarize(&results) {
                Some(summary) => println!("{}", summary.format_table()),
                None => println!("No completed sessions."),
            }
            write_outputs(sim, kind.name(), &bet_config, results, None)
        }
        SimMode::StrategySweep {
            sessions_per_strategy,
        } => {
            let mut entries = Vec::new();
            let mut all_results = Vec::new();
            for sweep_kind in StrategyKind::ALL {
                if !sim.quiet {
                    println!(
                        "Sweeping {} ({} sessions)...",
                        sweep_kind.name(),
                        sessions_per_strategy
                    );
                }
                let results = run_batch(
                    sweep_kind,
                    &bet_config,
                    &spec,
                    sessions_per_strategy,
                    sim.max_bets,
                    &cancel,
                    parallel,
                )
                .map_err(|e| e.to_string())?;
                if let Some(summary) = summarize(&results) {
                    entries.push((sweep_kind.name().to_string(), summary));
                }
                all_results.extend(results);
            }
            println!("{}", format_leaderboard(&entries));
            // Sweep results span every variant; label the run accordingly
            write_outputs(sim, SWEEP_LABEL, &bet_config, all_results, None)
        }
    }
}

/// Run label recorded for strategy sweeps, which span every variant
const SWEEP_LABEL: &str = "sweep";

/// Write the JSON report and database rows configured on the run.
/// `audit` carries the per-bet trail for single-session runs.
fn write_outputs(
    sim: &SimConfig,
    strategy: &str,
    bet_config: &BetConfig,
    results: Vec<SessionResult>,
    audit: Option<&[BetOutcome]>,
) -> Result<(), String> {
    if let Some(db_path) = &sim.db_path {
        let db = ResultDatabase::open(std::path::Path::new(db_path))
            .map_err(|e| format!("Failed to open {}: {}", db_path, e))?;
        let config_json = serde_json::to_string(bet_config).ok();
        let run_id = db
            .create_run(strategy, config_json.as_deref())
            .map_err(|e| format!("Failed to record run: {}", e))?;
        match audit {
            Some(outcomes) if results.len() == 1 => {
                let result_id = db
                    .insert_result(&run_id, &results[0])
                    .map_err(|e| format!("Failed to store results: {}", e))?;
                db.insert_outcomes(result_id, outcomes)
                    .map_err(|e| format!("Failed to store bet audit: {}", e))?;
            }
            _ => db
                .insert_results(&run_id, &results)
                .map_err(|e| format!("Failed to store results: {}", e))?,
        }
        if !sim.quiet {
            println!("Stored {} results in {} (run {})", results.len(), db_path, run_id);
        }
    }

    if let Some(output_file) = &sim.output_file {
        let report = SimReport {
            strategy: strategy.to_string(),
            bet_config: bet_config.clone(),
            sessions: results.len(),
            summary: summarize(&results),
            results,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        std::fs::write(output_file, json)
            .map_err(|e| format!("Failed to write {}: {}", output_file, e))?;
        if !sim.quiet {
            println!("Report written to {}", output_file);
        }
    }
    Ok(())
}
