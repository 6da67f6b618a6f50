//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::strategy::BetConfig;

/// Simulation mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum SimMode {
    /// Run a single session and print every bet
    #[default]
    Single,
    /// Run many independent sessions and summarize the distribution
    MonteCarlo { sessions: u64 },
    /// Run every strategy under the same config and rank them
    StrategySweep { sessions_per_strategy: u64 },
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation mode
    pub mode: SimMode,
    /// Strategy name (see `StrategyKind::ALL`)
    pub strategy: String,
    /// Betting parameters, used when no `bet_file` is given
    pub bet: BetConfig,
    /// Path to a TOML file with betting parameters (overrides `bet`)
    pub bet_file: Option<String>,
    /// Bet limit per session; bounds even non-converging strategies
    pub max_bets: u64,
    /// Base RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Number of parallel threads (0 = sequential)
    pub parallel: usize,
    /// Output file path for the JSON report (None = stdout summary only)
    pub output_file: Option<String>,
    /// Suppress progress output
    pub quiet: bool,
    /// Path to SQLite database for storing results
    pub db_path: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Single,
            strategy: "flat".to_string(),
            bet: BetConfig::default(),
            bet_file: None,
            max_bets: 1000,
            seed: None,
            parallel: 0, // Sequential by default
            output_file: None,
            quiet: false,
            db_path: None,
        }
    }
}

/// Template simulation settings (checked into git)
pub const SIM_SETTINGS_TEMPLATE: &str = "config/simulation_settings.template.json";
/// Local simulation settings (gitignored, user's custom settings)
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

impl SimConfig {
    /// Resolve the betting parameters, preferring the TOML file
    pub fn bet_config(&self) -> Result<BetConfig, String> {
        match &self.bet_file {
            Some(path) => BetConfig::from_file(path),
            None => Ok(self.bet.clone()),
        }
    }

    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Load configuration from default config files
    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files() -> Self {
        if let Ok(config) = Self::from_file(SIM_SETTINGS_FILE) {
            return config;
        }
        if let Ok(config) = Self::from_file(SIM_SETTINGS_TEMPLATE) {
            return config;
        }
        Self::default()
    }

    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();

        // Start with config files as base
        let mut config = Self::from_config_files();

        // Check for explicit settings file override
        let mut i = 1;
        while i < args.len() {
            if args[i] == "--settings" && i + 1 < args.len() {
                match Self::from_file(&args[i + 1]) {
                    Ok(loaded) => config = loaded,
                    Err(e) => {
                        eprintln!("Warning: {}", e);
                    }
                }
                break;
            }
            i += 1;
        }

        // Then apply command line overrides
        i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--settings" => {
                    // Already handled above
                    i += 1;
                }
                "--strategy" => {
                    if i + 1 < args.len() {
                        config.strategy = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--bet-config" => {
                    if i + 1 < args.len() {
                        config.bet_file = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--sessions" => {
                    if i + 1 < args.len() {
                        let sessions = args[i + 1].parse().unwrap_or(1000);
                        config.mode = SimMode::MonteCarlo { sessions };
                        i += 1;
                    }
                }
                "--sweep" => {
                    let sessions = if i + 1 < args.len() && !args[i + 1].starts_with('-') {
                        i += 1;
                        args[i].parse().unwrap_or(200)
                    } else {
                        200
                    };
                    config.mode = SimMode::StrategySweep {
                        sessions_per_strategy: sessions,
                    };
                }
                "--max-bets" => {
                    if i + 1 < args.len() {
                        config.max_bets = args[i + 1].parse().unwrap_or(1000);
                        i += 1;
                    }
                }
                "--base-bet" => {
                    if i + 1 < args.len() {
                        if let Ok(base_bet) = args[i + 1].parse() {
                            config.bet.base_bet = base_bet;
                        }
                        i += 1;
                    }
                }
                "--balance" => {
                    if i + 1 < args.len() {
                        if let Ok(balance) = args[i + 1].parse() {
                            config.bet.starting_balance = balance;
                        }
                        i += 1;
                    }
                }
                "--chance" => {
                    if i + 1 < args.len() {
                        if let Ok(chance) = args[i + 1].parse() {
                            config.bet.win_chance = chance;
                        }
                        i += 1;
                    }
                }
                "--stop-win" => {
                    if i + 1 < args.len() {
                        config.bet.stop_win = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--stop-loss" => {
                    if i + 1 < args.len() {
                        config.bet.stop_loss = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--max-bet" => {
                    if i + 1 < args.len() {
                        config.bet.max_bet = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--seed" => {
                    if i + 1 < args.len() {
                        config.seed = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--output" => {
                    if i + 1 < args.len() {
                        config.output_file = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--quiet" | "-q" => {
                    config.quiet = true;
                }
                "--parallel" => {
                    if i + 1 < args.len() {
                        config.parallel = args[i + 1].parse().unwrap_or(0);
                        i += 1;
                    }
                }
                "--db" => {
                    if i + 1 < args.len() {
                        config.db_path = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }

        config
    }
}

fn print_help() {
    println!(
        r#"Dicelab - strategy simulation for a provably-fair dice game

USAGE:
    cargo run --bin dicelab -- [OPTIONS]

OPTIONS:
    --settings <FILE>    Load settings from JSON file (CLI args override file settings)
    --strategy <NAME>    Strategy to run (default: flat)
    --bet-config <FILE>  Load betting parameters from a TOML file
    --sessions <N>       Monte Carlo mode: run N independent sessions
    --sweep [N]          Run every strategy N sessions each and rank them (default: 200)
    --max-bets <N>       Bet limit per session (default: 1000)
    --balance <X>        Starting balance
    --base-bet <X>       Base bet amount
    --chance <X>         Win chance, 0 < x < 1
    --max-bet <X>        Cap on any single wager
    --stop-win <X>       Stop when balance reaches X
    --stop-loss <X>      Stop when balance falls to X
    --seed <N>           Base RNG seed for reproducibility
    --output <FILE>      Write the full JSON report to FILE
    --quiet, -q          Suppress progress output
    --parallel <N>       Run sessions in parallel with N threads
    --db <FILE>          Store results in SQLite database
    --help, -h           Show this help

EXAMPLES:
    # One martingale session, every bet printed
    cargo run --bin dicelab -- --strategy martingale --balance 100 --seed 7

    # 10k-session Monte Carlo of fibonacci, 8 threads, stored to SQLite
    cargo run --bin dicelab -- --strategy fibonacci --sessions 10000 --parallel 8 --db results.db

    # Compare all strategies under one bankroll
    cargo run --bin dicelab -- --sweep 500 --balance 200 --stop-win 250 --output sweep.json

STRATEGIES:
    flat, martingale, grand-martingale, delayed-martingale, paroli,
    dalembert, contra-dalembert, fibonacci, reverse-fibonacci,
    labouchere, reverse-labouchere, oscars-grind, 1-3-2-6, parlay,
    percentage, kelly, hollandish

SETTINGS FILE FORMAT (JSON):
    {{
      "mode": {{ "MonteCarlo": {{ "sessions": 5000 }} }},
      "strategy": "martingale",
      "max_bets": 2000,
      "parallel": 8,
      "bet": {{ "starting_balance": 100.0, "base_bet": 1.0, "win_chance": 0.495 }}
    }}
"#
    );
}
