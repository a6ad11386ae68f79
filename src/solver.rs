// The seam both pathfinding engines implement, plus the shared phase
// bookkeeping for the direct / to-waypoint / waypoint-to-goal sub-searches.

use crate::map::GridMap;
use crate::types::Position;

/// A resolved route: ordered positions from the Player's spawn to the Chest,
/// inclusive. `None` means no path exists; a normal outcome, not an error.
pub type SearchResult = Option<Vec<Position>>;

/// A pathfinding strategy bound to nothing: the map is borrowed exclusively
/// for the duration of one `find_path` call, which structurally enforces the
/// one-engine-at-a-time rule. An engine that mutates hazard or scratch state
/// must restore it before returning.
pub trait PathfindingEngine {
    /// Short name used in reports, run logs, and the statistics layer.
    fn name(&self) -> &'static str;

    /// Finds a shortest Player-to-Chest route, possibly via Tortuga.
    fn find_path(&mut self, map: &mut GridMap) -> SearchResult;
}

/// Which leg of the overall search a sub-search is computing. Both engines
/// walk the same sequence: a direct attempt, then optionally the two
/// waypoint legs; the phase selects the result buffer and gates the
/// Kraken-neutralization side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Direct,
    ToWaypoint,
    WaypointToGoal,
}

impl SearchPhase {
    /// Only the waypoint-to-goal leg carries the rum casks.
    pub fn can_neutralize(&self) -> bool {
        matches!(self, SearchPhase::WaypointToGoal)
    }
}

/// Number of edges in a route (cells minus one).
pub fn path_edges(path: &[Position]) -> usize {
    path.len().saturating_sub(1)
}
