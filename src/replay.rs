// Replay of recorded runs.
//
// Reads a JSONL run log, rebuilds each chart from its recorded spawns, and
// re-executes the recorded engine. A replay matches when the outcome and the
// number of moves both agree with the record; route geometry may differ
// because equally short routes are interchangeable.

use std::fs::File;
use std::io::{BufRead, BufReader};

use log::{info, warn};

use crate::astar::AStarSearch;
use crate::backtracking::BacktrackingSearch;
use crate::config::Config;
use crate::map::GridMap;
use crate::run_logger::RunRecord;
use crate::solver::{path_edges, PathfindingEngine};
use crate::types::Scenario;

#[derive(Debug)]
pub struct ReplayResult {
    pub scenario: i32,
    pub algorithm: String,
    pub recorded_win: bool,
    pub replayed_win: bool,
    pub recorded_moves: usize,
    pub replayed_moves: usize,
}

impl ReplayResult {
    pub fn matches(&self) -> bool {
        self.recorded_win == self.replayed_win
            && (!self.recorded_win || self.recorded_moves == self.replayed_moves)
    }
}

pub struct ReplayEngine {
    depth_cap: u32,
}

impl ReplayEngine {
    pub fn new(config: &Config) -> ReplayEngine {
        ReplayEngine {
            depth_cap: config.search.backtracking_depth_cap,
        }
    }

    /// Re-executes a single recorded run.
    pub fn replay_record(&self, record: &RunRecord) -> Result<ReplayResult, String> {
        let scenario = Scenario::from_number(record.scenario)
            .ok_or_else(|| format!("Unknown scenario {}", record.scenario))?;
        let mut map = GridMap::load(&record.agents, scenario)
            .map_err(|e| format!("Failed to rebuild chart '{}': {}", record.agents, e))?;

        let mut engine: Box<dyn PathfindingEngine> = match record.algorithm.as_str() {
            "AStar" => Box::new(AStarSearch::new()),
            "Backtracking" => Box::new(BacktrackingSearch::new(self.depth_cap)),
            other => return Err(format!("Unknown algorithm '{}'", other)),
        };

        let result = engine.find_path(&mut map);

        Ok(ReplayResult {
            scenario: record.scenario,
            algorithm: record.algorithm.clone(),
            recorded_win: record.is_win(),
            replayed_win: result.is_some(),
            recorded_moves: path_edges(&record.path),
            replayed_moves: result.as_deref().map(path_edges).unwrap_or(0),
        })
    }

    /// Replays every record in the log, skipping unparseable ones.
    pub fn replay_all(&self, records: &[RunRecord]) -> Vec<ReplayResult> {
        let mut results = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match self.replay_record(record) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Skipping record {}: {}", index + 1, e),
            }
        }
        results
    }
}

/// Parses a JSONL run log. Blank lines are skipped; a malformed line is an
/// error, since a half-written log should be noticed rather than silently
/// truncated.
pub fn load_log_file(path: &str) -> Result<Vec<RunRecord>, String> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open run log '{}': {}", path, e))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Failed to read run log '{}': {}", path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RunRecord = serde_json::from_str(&line)
            .map_err(|e| format!("Malformed record on line {}: {}", index + 1, e))?;
        records.push(record);
    }
    Ok(records)
}

/// Prints the replay verdicts and a summary line.
pub fn print_report(results: &[ReplayResult]) -> usize {
    println!("═══════════════════════════════════════════");
    println!(" Replay report");
    println!("═══════════════════════════════════════════");

    let mut mismatches = 0;
    for (index, result) in results.iter().enumerate() {
        let verdict = if result.matches() {
            "ok"
        } else {
            mismatches += 1;
            "MISMATCH"
        };
        println!(
            " {:>4}. {} scenario {}: recorded {} ({} moves), replayed {} ({} moves) [{}]",
            index + 1,
            result.algorithm,
            result.scenario,
            if result.recorded_win { "Win" } else { "Loss" },
            result.recorded_moves,
            if result.replayed_win { "Win" } else { "Loss" },
            result.replayed_moves,
            verdict
        );
    }

    println!("───────────────────────────────────────────");
    println!(
        " {} replayed, {} matched, {} mismatched",
        results.len(),
        results.len() - mismatches,
        mismatches
    );
    info!(
        "Replay finished: {} of {} matched",
        results.len() - mismatches,
        results.len()
    );
    mismatches
}
