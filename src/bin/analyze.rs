//! Analytics tool - analyze stored simulation results
//!
//! Reads a SQLite results database written by the simulation CLI and
//! prints per-strategy aggregates.
//!
//! Usage:
//!   cargo run --bin analyze -- results.db
//!   cargo run --bin analyze -- results.db --strategy martingale

use std::path::PathBuf;

use dicelab::simulation::ResultDatabase;

fn main() {
    let config = AnalyzeConfig::from_args();

    if config.show_help {
        print_help();
        return;
    }

    let db = match ResultDatabase::open(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open {}: {}", config.db_path.display(), e);
            std::process::exit(1);
        }
    };

    let total = db.result_count().unwrap_or(0);
    if total == 0 {
        println!("No results found in {}", config.db_path.display());
        println!("\nTo generate results, run simulations with --db:");
        println!("  cargo run --bin dicelab -- --strategy martingale --sessions 1000 --db results.db");
        return;
    }
    println!(
        "{} session results across {} runs\n",
        total,
        db.run_count().unwrap_or(0)
    );

    let strategies = match &config.strategy {
        Some(strategy) => vec![strategy.clone()],
        None => db.strategies().unwrap_or_default(),
    };

    println!(
        "{:>20} | {:>10} | {:>10} | {:>12} | {:>10}",
        "strategy", "sessions", "in profit", "mean profit", "mean bets"
    );
    println!("{:-<21}+{:-<12}+{:-<12}+{:-<14}+{:-<11}", "", "", "", "", "");
    for strategy in &strategies {
        match db.get_strategy_stats(strategy) {
            Ok(stats) => {
                println!(
                    "{:>20} | {:>10} | {:>9.1}% | {:>12.4} | {:>10.1}",
                    stats.strategy,
                    stats.sessions,
                    stats.profit_rate() * 100.0,
                    stats.avg_profit,
                    stats.avg_bets
                );
            }
            Err(e) => eprintln!("Failed to read stats for {}: {}", strategy, e),
        }
    }
}

/// Configuration for the analyze tool
struct AnalyzeConfig {
    db_path: PathBuf,
    strategy: Option<String>,
    show_help: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("results.db"),
            strategy: None,
            show_help: false,
        }
    }
}

impl AnalyzeConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--strategy" => {
                    if i + 1 < args.len() {
                        config.strategy = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    config.show_help = true;
                }
                arg if !arg.starts_with('-') => {
                    // Positional argument: db path
                    config.db_path = PathBuf::from(arg);
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
        r#"Analytics Tool - Analyze stored simulation results

USAGE:
    cargo run --bin analyze -- [DB_PATH] [OPTIONS]

ARGUMENTS:
    DB_PATH             SQLite database path (default: results.db)

OPTIONS:
    --strategy <NAME>   Show only one strategy
    --help, -h          Show this help

EXAMPLES:
    # Aggregate every stored strategy
    cargo run --bin analyze -- results.db

    # Just martingale
    cargo run --bin analyze -- results.db --strategy martingale
"#
    );
}
