// Exhaustive depth-bounded backtracking engine.
//
// Depth-first search with a memorized best cost per cell for pruning and a
// configurable maximum path length to bound the runtime. The cap is an
// empirical cutoff, not a formal guarantee: across large numbers of generated
// charts the longest shortest path observed was 24 steps.

use log::debug;

use crate::map::GridMap;
use crate::solver::{PathfindingEngine, SearchPhase, SearchResult};
use crate::types::{AgentKind, Position};

pub struct BacktrackingSearch {
    depth_cap: u32,
    best_direct: Vec<Position>,
    best_to_waypoint: Vec<Position>,
    best_from_waypoint: Vec<Position>,
}

impl BacktrackingSearch {
    /// Empirically chosen maximum path length; see `[search]` in Voyage.toml.
    pub const DEFAULT_DEPTH_CAP: u32 = 25;

    pub fn new(depth_cap: u32) -> Self {
        BacktrackingSearch {
            depth_cap,
            best_direct: Vec::new(),
            best_to_waypoint: Vec::new(),
            best_from_waypoint: Vec::new(),
        }
    }

    /// Recursive step: try every walkable, unvisited neighbor whose memorized
    /// best cost does not already beat the current depth, with classic
    /// set-before-recurse / clear-after-return visited bracketing.
    ///
    /// Returns the best (smallest) goal depth seen so far. Reaching the goal
    /// at a new minimum reconstructs the route into the buffer matching the
    /// current phase. Kraken neutralization persists for the rest of the
    /// sub-search even after backtracking, which is why the alive flag is
    /// paired with the danger-counter check.
    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        map: &mut GridMap,
        current: Position,
        goal: Position,
        mut best: u32,
        depth: u32,
        phase: SearchPhase,
        mut kraken_alive: bool,
    ) -> u32 {
        if current == goal {
            if depth < best {
                best = depth;
                let route = trace_best_path(map, goal, depth);
                match phase {
                    SearchPhase::Direct => self.best_direct = route,
                    SearchPhase::ToWaypoint => self.best_to_waypoint = route,
                    SearchPhase::WaypointToGoal => self.best_from_waypoint = route,
                }
            }
            return best;
        }

        map.cell_mut(current).best_cost = depth;
        map.cell_mut(current).visited = true;

        let neighbors = map.neighbors(current);
        let any_open = neighbors.iter().any(|&n| {
            let cell = map.cell(n);
            cell.walkable && !cell.visited
        });

        if any_open && phase.can_neutralize() && kraken_alive {
            for &neighbor in &neighbors {
                let cell = map.cell(neighbor);
                if cell.has_occupant(AgentKind::Kraken) && cell.danger_level > 0 {
                    map.kill_hazard(neighbor);
                    kraken_alive = false;

                    let cell = map.cell_mut(neighbor);
                    if !cell.has_occupant(AgentKind::Rock) && cell.danger_level == 0 {
                        cell.walkable = true;
                    }
                }
            }
        }

        for &neighbor in &neighbors {
            let cell = map.cell(neighbor);
            if cell.walkable && !cell.visited && depth <= self.depth_cap && depth < cell.best_cost
            {
                map.cell_mut(neighbor).best_cost = depth + 1;
                best = self.search(map, neighbor, goal, best, depth + 1, phase, kraken_alive);
            }
        }

        map.cell_mut(current).visited = false;
        best
    }
}

impl PathfindingEngine for BacktrackingSearch {
    fn name(&self) -> &'static str {
        "Backtracking"
    }

    fn find_path(&mut self, map: &mut GridMap) -> SearchResult {
        self.best_direct.clear();
        self.best_to_waypoint.clear();
        self.best_from_waypoint.clear();

        let start = map.position_of(AgentKind::Player);
        let finish = map.position_of(AgentKind::Chest);
        let waypoint = map.position_of(AgentKind::Tortuga);

        // The three sub-searches are independent: each starts from cleared
        // best-cost scratch and pristine hazard state.
        map.reset_search_scratch();
        let direct_cost =
            self.search(map, start, finish, u32::MAX, 0, SearchPhase::Direct, true);

        map.reset_search_scratch();
        map.fill_cells(true);
        let to_waypoint_cost =
            self.search(map, start, waypoint, u32::MAX, 0, SearchPhase::ToWaypoint, true);

        let mut waypoint_total = u32::MAX;
        if to_waypoint_cost != u32::MAX {
            map.reset_search_scratch();
            map.fill_cells(true);
            let from_waypoint_cost = self.search(
                map,
                waypoint,
                finish,
                u32::MAX,
                0,
                SearchPhase::WaypointToGoal,
                true,
            );
            if from_waypoint_cost != u32::MAX {
                waypoint_total = to_waypoint_cost + from_waypoint_cost;
            }
        }

        // Leave the map as the next engine expects to find it.
        map.reset_search_scratch();
        map.fill_cells(true);

        debug!(
            "backtracking: direct cost {:?}, via waypoint {:?}",
            (direct_cost != u32::MAX).then_some(direct_cost),
            (waypoint_total != u32::MAX).then_some(waypoint_total)
        );

        let direct_valid = direct_cost != u32::MAX;
        let waypoint_valid = waypoint_total != u32::MAX;
        if !direct_valid && !waypoint_valid {
            return None;
        }

        let mut route = Vec::new();
        if waypoint_valid && (!direct_valid || waypoint_total < direct_cost) {
            // The waypoint cell opens the second leg, so drop its duplicate
            // from the first.
            route.extend(
                self.best_to_waypoint
                    .iter()
                    .copied()
                    .filter(|&p| p != waypoint),
            );
            route.extend(self.best_from_waypoint.iter().copied());
        } else {
            route.extend(self.best_direct.iter().copied());
        }

        Some(route)
    }
}

/// Reconstructs a route of `cost` edges ending at `goal` by stepping, at each
/// level, to a neighbor whose memorized best cost is exactly one lower.
/// The start cell sits at cost zero, so the reversed result runs start-first.
/// A missing link means the pruning bookkeeping is broken, so it aborts.
fn trace_best_path(map: &GridMap, goal: Position, cost: u32) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    let mut remaining = cost;

    while remaining > 0 {
        let next = map
            .neighbors(current)
            .into_iter()
            .find(|&n| map.cell(n).best_cost == remaining - 1)
            .unwrap_or_else(|| {
                panic!(
                    "best-cost chain broken at ({}, {}): no neighbor at cost {}",
                    current.x,
                    current.y,
                    remaining - 1
                )
            });
        path.push(next);
        current = next;
        remaining -= 1;
    }

    path.reverse();
    path
}
