use std::fs::{self, File};
use std::io;

use env_logger::Env;
use log::{error, info};

use blackpearl::analysis;
use blackpearl::astar::AStarSearch;
use blackpearl::backtracking::BacktrackingSearch;
use blackpearl::config::Config;
use blackpearl::map::GridMap;
use blackpearl::run_logger::{RunLogger, RunRecord};
use blackpearl::solver::PathfindingEngine;
use blackpearl::types::Scenario;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load_or_default();
    let logger = RunLogger::new(config.run_log.enabled, &config.run_log.file_path);

    println!("Enter:");
    println!("1) to generate a chart and type the scenario in the console");
    println!(
        "2) to read the chart and scenario from {}",
        config.output.input_path
    );

    let mut choice = String::new();
    if io::stdin().read_line(&mut choice).is_err() {
        println!("Invalid data");
        return;
    }

    match choice.trim() {
        "1" => console_mode(&config, &logger),
        "2" => file_mode(&config, &logger),
        // Hidden mode: statistical comparison over generated charts
        "57005" => analysis_mode(&config, &logger),
        _ => println!("Invalid data"),
    }
}

fn console_mode(config: &Config, logger: &RunLogger) {
    println!("Enter the perception scenario (1 or 2):");

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        println!("Invalid data");
        return;
    }
    let Some(scenario) = line
        .trim()
        .parse::<i32>()
        .ok()
        .and_then(Scenario::from_number)
    else {
        println!("Invalid data");
        return;
    };

    let mut map = GridMap::generate(scenario, &mut rand::rng());
    println!("Generated chart: {}", map.serialize_positions());

    if let Err(e) = solve_and_report(config, logger, &mut map) {
        error!("Failed to write reports: {}", e);
        println!("Invalid data");
    }
}

fn file_mode(config: &Config, logger: &RunLogger) {
    let contents = match fs::read_to_string(&config.output.input_path) {
        Ok(contents) => contents,
        Err(e) => {
            error!("Failed to read '{}': {}", config.output.input_path, e);
            println!("Invalid data");
            return;
        }
    };

    let mut lines = contents.lines();
    let (Some(chart_line), Some(scenario_line)) = (lines.next(), lines.next()) else {
        println!("Invalid data");
        return;
    };
    let Some(scenario) = scenario_line
        .trim()
        .parse::<i32>()
        .ok()
        .and_then(Scenario::from_number)
    else {
        println!("Invalid data");
        return;
    };

    let mut map = match GridMap::load(chart_line.trim(), scenario) {
        Ok(map) => map,
        Err(e) => {
            error!("Rejected chart from '{}': {}", config.output.input_path, e);
            println!("Invalid data");
            return;
        }
    };

    if let Err(e) = solve_and_report(config, logger, &mut map) {
        error!("Failed to write reports: {}", e);
        println!("Invalid data");
    }
}

/// Runs both engines on the chart, each writing its own report file.
fn solve_and_report(config: &Config, logger: &RunLogger, map: &mut GridMap) -> io::Result<()> {
    let mut astar = AStarSearch::new();
    let mut backtracking = BacktrackingSearch::new(config.search.backtracking_depth_cap);

    run_and_write(&mut astar, map, logger, &config.output.astar_report_path)?;
    run_and_write(
        &mut backtracking,
        map,
        logger,
        &config.output.backtracking_report_path,
    )?;
    Ok(())
}

fn run_and_write(
    engine: &mut dyn PathfindingEngine,
    map: &mut GridMap,
    logger: &RunLogger,
    report_path: &str,
) -> io::Result<()> {
    let mut file = File::create(report_path)?;
    let (result, elapsed_ms) = analysis::analyse_single_map(engine, map, &mut file)?;

    logger.log(&RunRecord::new(
        map.scenario().number(),
        engine.name(),
        map.serialize_positions(),
        result.as_deref(),
        elapsed_ms,
    ));
    info!(
        "{}: {} in {:.5} ms, report written to {}",
        engine.name(),
        if result.is_some() { "Win" } else { "Loss" },
        elapsed_ms,
        report_path
    );
    Ok(())
}

fn analysis_mode(config: &Config, logger: &RunLogger) {
    info!(
        "Comparing engines over {} generated charts",
        config.analysis.maps_to_generate
    );
    let analysis = analysis::run_batch(config, logger);

    for scenario in [1, 2] {
        for algorithm in ["AStar", "Backtracking"] {
            println!();
            println!("{} with scenario {}:", algorithm, scenario);
            print!("{}", analysis.report(scenario, algorithm));
        }
    }
}
