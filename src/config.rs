// Configuration loaded from Voyage.toml.
//
// Everything tunable lives here so experiments never require a recompile:
// the backtracking depth cap, the batch-analysis knobs, and the report and
// run-log file locations.

use log::{info, warn};
use serde::Deserialize;
use std::fs;

const CONFIG_PATH: &str = "Voyage.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub analysis: AnalysisConfig,
    pub run_log: RunLogConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Maximum path length the backtracking engine will explore.
    pub backtracking_depth_cap: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Number of charts generated for the statistical comparison mode.
    pub maps_to_generate: usize,
    /// Evaluate generated charts across a worker pool.
    pub parallel: bool,
    /// Seed base; chart i uses base_seed + i, so batches are reproducible.
    pub base_seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunLogConfig {
    pub enabled: bool,
    pub file_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub input_path: String,
    pub astar_report_path: String,
    pub backtracking_report_path: String,
}

impl Config {
    /// Loads Voyage.toml, falling back to compiled-in defaults when the file
    /// is missing or malformed. Never aborts: a bad config file should not
    /// take down a run.
    pub fn load_or_default() -> Config {
        match Self::from_file(CONFIG_PATH) {
            Ok(config) => {
                info!("Loaded configuration from {}", CONFIG_PATH);
                config
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                Self::default_hardcoded()
            }
        }
    }

    pub fn from_file(path: &str) -> Result<Config, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))
    }

    /// Defaults mirroring the checked-in Voyage.toml.
    pub fn default_hardcoded() -> Config {
        Config {
            search: SearchConfig {
                backtracking_depth_cap: 25,
            },
            analysis: AnalysisConfig {
                maps_to_generate: 1000,
                parallel: true,
                base_seed: 42,
            },
            run_log: RunLogConfig {
                enabled: false,
                file_path: "runs.jsonl".to_string(),
            },
            output: OutputConfig {
                input_path: "input.txt".to_string(),
                astar_report_path: "outputAStar.txt".to_string(),
                backtracking_report_path: "outputBacktracking.txt".to_string(),
            },
        }
    }
}
