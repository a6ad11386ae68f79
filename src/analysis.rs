// Statistical comparison of the two engines.
//
// The batch mode generates charts, runs every engine under every scenario,
// and aggregates per (scenario, engine) timing series plus win/loss tallies.
// With the worker pool enabled each worker owns its chart and engines
// outright, so runs never share mutable state.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::astar::AStarSearch;
use crate::backtracking::BacktrackingSearch;
use crate::config::Config;
use crate::map::GridMap;
use crate::render;
use crate::run_logger::{RunLogger, RunRecord};
use crate::solver::{path_edges, PathfindingEngine, SearchResult};
use crate::types::{Position, Scenario};

/// Runs one search and reports the wall-clock time in milliseconds.
pub fn timed_search(
    engine: &mut dyn PathfindingEngine,
    map: &mut GridMap,
) -> (SearchResult, f64) {
    let started = Instant::now();
    let result = engine.find_path(map);
    (result, started.elapsed().as_secs_f64() * 1000.0)
}

/// Textual route form: `[x,y]` per cell, space separated.
pub fn format_path(path: &[Position]) -> String {
    path.iter()
        .map(|p| format!("[{},{}]", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs one engine on one chart and writes the outcome report: the verdict,
/// the number of moves, the route, the chart with the route overlaid, and
/// the elapsed time. A loss gets the verdict and the time only.
pub fn analyse_single_map(
    engine: &mut dyn PathfindingEngine,
    map: &mut GridMap,
    writer: &mut dyn Write,
) -> io::Result<(SearchResult, f64)> {
    let (result, elapsed_ms) = timed_search(engine, map);

    match &result {
        Some(path) => {
            writeln!(writer, "Win")?;
            writeln!(writer, "{}", path_edges(path))?;
            writeln!(writer, "{}", format_path(path))?;
            write!(writer, "{}", render::render(map, Some(path)))?;
        }
        None => writeln!(writer, "Loss")?,
    }
    writeln!(writer, "{:.5} ms", elapsed_ms)?;

    Ok((result, elapsed_ms))
}

/// Per (scenario, engine) timing series and win/loss tallies.
#[derive(Debug, Default)]
pub struct Analysis {
    samples: HashMap<(i32, String), Vec<f64>>,
    wins: HashMap<(i32, String), u32>,
    losses: HashMap<(i32, String), u32>,
}

impl Analysis {
    pub fn new() -> Analysis {
        Analysis::default()
    }

    pub fn record(&mut self, scenario: i32, algorithm: &str, elapsed_ms: f64, win: bool) {
        let key = (scenario, algorithm.to_string());
        self.samples.entry(key.clone()).or_default().push(elapsed_ms);
        let tally = if win { &mut self.wins } else { &mut self.losses };
        *tally.entry(key).or_default() += 1;
    }

    pub fn merge(mut self, other: Analysis) -> Analysis {
        for (key, series) in other.samples {
            self.samples.entry(key).or_default().extend(series);
        }
        for (key, n) in other.wins {
            *self.wins.entry(key).or_default() += n;
        }
        for (key, n) in other.losses {
            *self.losses.entry(key).or_default() += n;
        }
        self
    }

    /// Formats the statistics block for one (scenario, engine) series.
    pub fn report(&self, scenario: i32, algorithm: &str) -> String {
        let key = (scenario, algorithm.to_string());
        let empty = Vec::new();
        let series = self.samples.get(&key).unwrap_or(&empty);
        let wins = self.wins.get(&key).copied().unwrap_or(0);
        let losses = self.losses.get(&key).copied().unwrap_or(0);
        let total = wins + losses;

        if total == 0 {
            return "No samples recorded\n".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!(
            "Wins: {} ({:.2}%)\n",
            wins,
            100.0 * f64::from(wins) / f64::from(total)
        ));
        out.push_str(&format!(
            "Losses: {} ({:.2}%)\n",
            losses,
            100.0 * f64::from(losses) / f64::from(total)
        ));
        out.push_str(&format!("Mean execution time: {:.5} ms\n", mean(series)));
        out.push_str(&format!(
            "Median execution time: {:.5} ms\n",
            median(series)
        ));
        match mode(series) {
            Some(value) => {
                out.push_str(&format!("Mode execution time: {:.2} ms\n", value))
            }
            None => out.push_str("Mode execution time: no repeated sample\n"),
        }
        out.push_str(&format!(
            "Standard deviation: {:.5} ms\n",
            std_deviation(series)
        ));
        out
    }
}

pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

pub fn median(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Most frequent sample, bucketed to hundredths of a millisecond.
/// `None` when every bucket is unique, since a mode of a flat series says
/// nothing.
pub fn mode(series: &[f64]) -> Option<f64> {
    let mut counts: HashMap<i64, u32> = HashMap::new();
    for &sample in series {
        *counts.entry((sample * 100.0).round() as i64).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .max_by_key(|&(bucket, count)| (count, bucket))
        .map(|(bucket, _)| bucket as f64 / 100.0)
}

/// Sample standard deviation; zero for fewer than two samples.
pub fn std_deviation(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let mean = mean(series);
    let variance = series
        .iter()
        .map(|sample| (sample - mean).powi(2))
        .sum::<f64>()
        / (series.len() - 1) as f64;
    variance.sqrt()
}

/// Generates and evaluates the configured number of charts. Chart i is
/// seeded with base_seed + i, so a batch is reproducible regardless of how
/// work is split across the pool.
pub fn run_batch(config: &Config, logger: &RunLogger) -> Analysis {
    let count = config.analysis.maps_to_generate as u64;
    let depth_cap = config.search.backtracking_depth_cap;
    let base_seed = config.analysis.base_seed;

    let evaluate = |i: u64| -> Analysis {
        let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i));
        let mut map = GridMap::generate(Scenario::Standard, &mut rng);
        let mut analysis = Analysis::new();

        for scenario in [Scenario::Standard, Scenario::Spyglass] {
            map.set_scenario(scenario);

            let mut astar = AStarSearch::new();
            let mut backtracking = BacktrackingSearch::new(depth_cap);
            let engines: [&mut dyn PathfindingEngine; 2] = [&mut astar, &mut backtracking];

            for engine in engines {
                let (result, elapsed_ms) = timed_search(engine, &mut map);
                let record = RunRecord::new(
                    scenario.number(),
                    engine.name(),
                    map.serialize_positions(),
                    result.as_deref(),
                    elapsed_ms,
                );
                logger.log(&record);
                analysis.record(
                    scenario.number(),
                    engine.name(),
                    elapsed_ms,
                    result.is_some(),
                );
            }
        }

        analysis
    };

    let analysis = if config.analysis.parallel {
        (0..count)
            .into_par_iter()
            .map(evaluate)
            .reduce(Analysis::new, Analysis::merge)
    } else {
        (0..count).map(evaluate).fold(Analysis::new(), Analysis::merge)
    };

    info!("Analysed {} generated charts", count);
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_median_of_odd_series() {
        let series = [3.0, 1.0, 2.0];
        assert!((mean(&series) - 2.0).abs() < 1e-9);
        assert!((median(&series) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_median_of_even_series() {
        let series = [4.0, 1.0, 3.0, 2.0];
        assert!((median(&series) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_mode_requires_a_repeat() {
        assert_eq!(mode(&[1.0, 2.0, 3.0]), None);
        assert_eq!(mode(&[1.0, 2.0, 2.0, 3.0]), Some(2.0));
        // Bucketing to hundredths groups near-identical samples
        assert_eq!(mode(&[0.1234, 0.1236, 9.0]), Some(0.12));
    }

    #[test]
    fn test_std_deviation_is_sample_based() {
        let series = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sample deviation of this classic series is ~2.138
        assert!((std_deviation(&series) - 2.13809).abs() < 1e-4);
        assert_eq!(std_deviation(&[1.0]), 0.0);
    }

    #[test]
    fn test_record_and_report_tallies() {
        let mut analysis = Analysis::new();
        analysis.record(1, "AStar", 0.5, true);
        analysis.record(1, "AStar", 0.7, true);
        analysis.record(1, "AStar", 0.9, false);
        analysis.record(2, "AStar", 100.0, true);

        let report = analysis.report(1, "AStar");
        assert!(report.contains("Wins: 2 (66.67%)"));
        assert!(report.contains("Losses: 1 (33.33%)"));
        assert!(!report.contains("100.0"));
    }

    #[test]
    fn test_merge_combines_series() {
        let mut a = Analysis::new();
        a.record(1, "Backtracking", 1.0, true);
        let mut b = Analysis::new();
        b.record(1, "Backtracking", 2.0, false);

        let merged = a.merge(b);
        let report = merged.report(1, "Backtracking");
        assert!(report.contains("Wins: 1 (50.00%)"));
        assert!(report.contains("Losses: 1 (50.00%)"));
    }

    #[test]
    fn test_single_map_report_on_a_win() {
        let mut map = GridMap::load("[0,0] [0,7] [7,0] [5,0] [8,8] [0,3]", Scenario::Standard)
            .unwrap();
        let mut engine = AStarSearch::new();
        let mut out: Vec<u8> = Vec::new();

        let (result, _) = analyse_single_map(&mut engine, &mut map, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(result.is_some());
        assert!(text.starts_with("Win\n8\n"));
        assert!(text.contains("[0,0] [1,1]"));
        assert!(text.contains('*'));
        assert!(text.contains("ms"));
    }
}
