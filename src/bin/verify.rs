//! Provably-fair verification tool
//!
//! Recomputes rolls from published seed material and checks them against
//! what the service reported.
//!
//! Usage:
//!   cargo run --bin verify -- --server <SEED> --client <SEED> --nonce 5
//!   cargo run --bin verify -- --server <SEED> --client <SEED> --nonce 0 --count 10
//!   cargo run --bin verify -- --server <SEED> --client <SEED> --nonce 0 --rolls rolls.json

use dicelab::verify::{mismatch_count, roll_value, verify_history};

fn main() {
    let config = VerifyConfig::from_args();

    if config.show_help {
        print_help();
        return;
    }
    let (Some(server), Some(client)) = (&config.server_seed, &config.client_seed) else {
        eprintln!("Error: --server and --client are required (see --help)");
        std::process::exit(1);
    };

    // Audit a recorded roll history against consecutive nonces
    if let Some(path) = &config.rolls_file {
        let rolls: Vec<f64> = match std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path, e))
            .and_then(|s| {
                serde_json::from_str(&s).map_err(|e| format!("Failed to parse {}: {}", path, e))
            }) {
            Ok(rolls) => rolls,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };

        let records = verify_history(server, client, config.nonce, &rolls);
        for record in &records {
            println!(
                "nonce {:>8}  reported {:>6.2}  recomputed {:>6.2}  {}",
                record.nonce,
                record.reported as f64 / 100.0,
                record.recomputed as f64 / 100.0,
                if record.matched { "ok" } else { "MISMATCH" }
            );
        }
        let mismatches = mismatch_count(&records);
        println!("\n{} rolls verified, {} mismatches", records.len(), mismatches);
        if mismatches > 0 {
            std::process::exit(2);
        }
        return;
    }

    // Plain recomputation for a nonce range
    for nonce in config.nonce..config.nonce + config.count {
        println!("nonce {:>8}  roll {:>6.2}", nonce, roll_value(server, client, nonce));
    }
}

/// Configuration for the verify tool
struct VerifyConfig {
    server_seed: Option<String>,
    client_seed: Option<String>,
    nonce: u64,
    count: u64,
    rolls_file: Option<String>,
    show_help: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            server_seed: None,
            client_seed: None,
            nonce: 0,
            count: 1,
            rolls_file: None,
            show_help: false,
        }
    }
}

impl VerifyConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--server" => {
                    if i + 1 < args.len() {
                        config.server_seed = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--client" => {
                    if i + 1 < args.len() {
                        config.client_seed = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--nonce" => {
                    if i + 1 < args.len() {
                        config.nonce = args[i + 1].parse().unwrap_or(0);
                        i += 1;
                    }
                }
                "--count" => {
                    if i + 1 < args.len() {
                        config.count = args[i + 1].parse().unwrap_or(1);
                        i += 1;
                    }
                }
                "--rolls" => {
                    if i + 1 < args.len() {
                        config.rolls_file = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    config.show_help = true;
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
        r#"Provably-Fair Verification Tool

USAGE:
    cargo run --bin verify -- --server <SEED> --client <SEED> [OPTIONS]

OPTIONS:
    --server <SEED>     Revealed server seed (HMAC key)
    --client <SEED>     Client seed
    --nonce <N>         First nonce to verify (default: 0)
    --count <N>         Number of consecutive nonces to recompute (default: 1)
    --rolls <FILE>      JSON array of reported rolls to audit against
                        consecutive nonces starting at --nonce
    --help, -h          Show this help

EXIT CODES:
    0 - all rolls match (or plain recomputation)
    2 - at least one mismatch found

EXAMPLES:
    # Recompute one roll
    cargo run --bin verify -- --server 6f7e... --client my-seed --nonce 42

    # Audit a recorded session
    cargo run --bin verify -- --server 6f7e... --client my-seed --rolls session.json
"#
    );
}
