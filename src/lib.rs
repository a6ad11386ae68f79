// Pathfinding over a 9x9 sea chart: two comparable engines (heuristic
// best-first and depth-bounded backtracking), chart generation and parsing,
// a statistics layer, and a JSONL run log with replay support.

pub mod analysis;
pub mod astar;
pub mod backtracking;
pub mod config;
pub mod map;
pub mod render;
pub mod replay;
pub mod run_logger;
pub mod solver;
pub mod types;
