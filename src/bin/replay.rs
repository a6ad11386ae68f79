// Replays a recorded JSONL run log and reports mismatches.
//
// Usage: replay [log-file]
// Defaults to the run_log path from Voyage.toml.

use std::env;
use std::process;

use env_logger::Env;
use log::error;

use blackpearl::config::Config;
use blackpearl::replay::{self, ReplayEngine};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default();
    let log_path = env::args()
        .nth(1)
        .unwrap_or_else(|| config.run_log.file_path.clone());

    let records = match replay::load_log_file(&log_path) {
        Ok(records) => records,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let engine = ReplayEngine::new(&config);
    let results = engine.replay_all(&records);
    let mismatches = replay::print_report(&results);
    if mismatches > 0 {
        process::exit(1);
    }
}
