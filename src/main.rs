//! Dicelab simulation CLI - evaluate betting strategies before risking
//! real money
//!
//! Usage:
//!   cargo run --bin dicelab -- --help
//!   cargo run --bin dicelab -- --strategy martingale --sessions 10000 --parallel 8
//!   cargo run --bin dicelab -- --sweep 500 --balance 200

use dicelab::simulation::{SimConfig, run_simulation};

fn main() {
    let config = SimConfig::from_args();
    if let Err(e) = run_simulation(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
