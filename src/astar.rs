// Heuristic best-first search engine.
//
// Runs up to three sub-searches: Player -> Chest directly, Player -> Tortuga,
// and Tortuga -> Chest, then keeps whichever complete route has fewer cells.
// Only the Tortuga -> Chest leg carries the rum casks, so only there can a
// sub-search neutralize the Kraken mid-traversal.

use std::collections::HashSet;

use log::debug;

use crate::map::GridMap;
use crate::solver::{PathfindingEngine, SearchPhase, SearchResult};
use crate::types::{AgentKind, Position};

pub struct AStarSearch {
    kraken_passed: bool,
}

impl AStarSearch {
    pub fn new() -> Self {
        AStarSearch {
            kraken_passed: false,
        }
    }

    /// Classic best-first search between two cells.
    ///
    /// Open and closed sets live here; g/h/parent scratch lives in the cells.
    /// Selection picks the open cell with minimum g + h, ties broken by the
    /// smaller h. Neighbors are unit-cost Chebyshev steps.
    fn shortest_path(
        &mut self,
        map: &mut GridMap,
        start: Position,
        finish: Position,
        phase: SearchPhase,
    ) -> Option<Vec<Position>> {
        let mut open: Vec<Position> = vec![start];
        let mut closed: HashSet<Position> = HashSet::new();

        while !open.is_empty() {
            let mut best_index = 0;
            for i in 1..open.len() {
                let candidate = map.cell(open[i]);
                let best = map.cell(open[best_index]);
                if candidate.f_cost() < best.f_cost()
                    || (candidate.f_cost() == best.f_cost() && candidate.h < best.h)
                {
                    best_index = i;
                }
            }
            let current = open.remove(best_index);

            if current == finish {
                return Some(trace_path(map, start, finish));
            }
            closed.insert(current);

            let neighbors = map.neighbors(current);

            // First sighting of the Kraken on the rum-cask leg kills it and
            // may reopen its cell right away, unless a Rock shares it.
            if phase.can_neutralize() && !self.kraken_passed {
                for &neighbor in &neighbors {
                    if map.cell(neighbor).has_occupant(AgentKind::Kraken) {
                        map.kill_hazard(neighbor);
                        self.kraken_passed = true;
                        let cell = map.cell_mut(neighbor);
                        if !cell.has_occupant(AgentKind::Rock) && cell.danger_level == 0 {
                            cell.walkable = true;
                        }
                    }
                }
            }

            for &neighbor in &neighbors {
                if closed.contains(&neighbor) || !map.cell(neighbor).walkable {
                    continue;
                }

                let tentative = map.cell(current).g + current.chebyshev_distance(&neighbor);
                let in_open = open.contains(&neighbor);

                if tentative < map.cell(neighbor).g || !in_open {
                    let estimate = neighbor.chebyshev_distance(&finish);
                    let cell = map.cell_mut(neighbor);
                    cell.g = tentative;
                    cell.h = estimate;
                    cell.parent = Some(current);
                    if !in_open {
                        open.push(neighbor);
                    }
                }
            }
        }

        None
    }
}

impl Default for AStarSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl PathfindingEngine for AStarSearch {
    fn name(&self) -> &'static str {
        "AStar"
    }

    fn find_path(&mut self, map: &mut GridMap) -> SearchResult {
        self.kraken_passed = false;

        let start = map.position_of(AgentKind::Player);
        let finish = map.position_of(AgentKind::Chest);
        let waypoint = map.position_of(AgentKind::Tortuga);

        let direct = self.shortest_path(map, start, finish, SearchPhase::Direct);

        let mut waypoint_route: Option<(Vec<Position>, Vec<Position>)> = None;
        if let Some(first_leg) = self.shortest_path(map, start, waypoint, SearchPhase::ToWaypoint)
        {
            if let Some(second_leg) =
                self.shortest_path(map, waypoint, finish, SearchPhase::WaypointToGoal)
            {
                waypoint_route = Some((first_leg, second_leg));
            }
        }

        // Restore pristine hazard state for the next engine run, whether or
        // not anything was found.
        map.fill_cells(true);

        debug!(
            "A*: direct {:?} cells, via waypoint {:?} cells",
            direct.as_ref().map(Vec::len),
            waypoint_route.as_ref().map(|(a, b)| a.len() + b.len())
        );

        let mut route = vec![start];
        match (waypoint_route, direct) {
            (Some((first, second)), Some(direct_path)) => {
                if first.len() + second.len() < direct_path.len() {
                    route.extend(first);
                    route.extend(second);
                } else {
                    route.extend(direct_path);
                }
            }
            (Some((first, second)), None) => {
                route.extend(first);
                route.extend(second);
            }
            (None, Some(direct_path)) => route.extend(direct_path),
            (None, None) => return None,
        }

        Some(route)
    }
}

/// Follows the parent chain from the finish back to the start, then reverses.
/// The returned leg excludes `start` and includes `finish`. A missing parent
/// on a found path is a scratch-state bookkeeping bug, so it aborts loudly.
fn trace_path(map: &GridMap, start: Position, finish: Position) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = finish;

    while current != start {
        path.push(current);
        current = map.cell(current).parent.unwrap_or_else(|| {
            panic!(
                "parent chain broken at ({}, {}) while tracing a found path",
                current.x, current.y
            )
        });
    }

    path.reverse();
    path
}
