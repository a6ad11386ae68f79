// Core board types: positions, perception scenarios, and the agent model.
//
// Agents are a closed set of kinds with fixed perception-offset tables,
// dispatched by exhaustive match rather than trait objects.

use serde::{Deserialize, Serialize};

/// Side length of the (fixed) square sea chart.
pub const GRID_SIZE: i32 = 9;
/// Largest valid coordinate on either axis.
pub const MAX_COORD: i32 = GRID_SIZE - 1;

/// A relative (dx, dy) offset inside a perception zone.
pub type Offset = (i32, i32);

const SELF_ONLY: [Offset; 1] = [(0, 0)];

const ORTHOGONAL: [Offset; 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

const SURROUNDING: [Offset; 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The 8 surrounding offsets plus the 4 axis offsets at distance 2.
const EXTENDED: [Offset; 12] = [
    (0, -2),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-2, 0),
    (-1, 0),
    (1, 0),
    (2, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (0, 2),
];

/// 2D coordinate on the chart
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// True if the position lies on the chart.
    pub fn in_bounds(&self) -> bool {
        self.x >= 0 && self.x <= MAX_COORD && self.y >= 0 && self.y <= MAX_COORD
    }

    /// Adds an offset without any bounds handling.
    pub fn offset_by(&self, offset: Offset) -> Position {
        Position::new(self.x + offset.0, self.y + offset.1)
    }

    /// Adds an offset and clamps each axis independently to the chart.
    /// Zone math never wraps or escapes the chart: (0,0) + (-1,-1) is (0,0).
    pub fn clamped_add(&self, offset: Offset) -> Position {
        Position::new(
            (self.x + offset.0).clamp(0, MAX_COORD),
            (self.y + offset.1).clamp(0, MAX_COORD),
        )
    }

    /// Chebyshev distance: max(|dx|, |dy|).
    /// The movement metric for 8-directional unit-cost steps.
    pub fn chebyshev_distance(&self, other: &Position) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }
}

/// The perception rule in effect for the Player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    /// Scenario 1: the Player senses the 8 surrounding cells.
    Standard,
    /// Scenario 2: the Player senses an extended radius-2 cross as well,
    /// but movement still degrades to plain 8-neighbor adjacency.
    Spyglass,
}

impl Scenario {
    /// Parses the textual scenario number from console or file input.
    pub fn from_number(n: i32) -> Option<Scenario> {
        match n {
            1 => Some(Scenario::Standard),
            2 => Some(Scenario::Spyglass),
            _ => None,
        }
    }

    pub fn number(&self) -> i32 {
        match self {
            Scenario::Standard => 1,
            Scenario::Spyglass => 2,
        }
    }
}

/// Every kind of agent that can occupy the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Jack Sparrow, the start agent.
    Player,
    DavyJones,
    Kraken,
    Rock,
    /// Dead Man's Chest, the goal agent.
    Chest,
    /// The waypoint island whose rum casks can neutralize the Kraken.
    Tortuga,
}

impl AgentKind {
    /// All kinds in canonical placement order (the order the textual map
    /// format lists them in).
    pub fn all() -> [AgentKind; 6] {
        [
            AgentKind::Player,
            AgentKind::DavyJones,
            AgentKind::Kraken,
            AgentKind::Rock,
            AgentKind::Chest,
            AgentKind::Tortuga,
        ]
    }

    /// Whether the agent projects a danger zone.
    /// The Rock blocks only its own cell and is not counted as hazardous.
    pub fn is_hazardous(&self) -> bool {
        matches!(self, AgentKind::DavyJones | AgentKind::Kraken)
    }

    /// Single-character alias used by the ASCII chart renderer.
    pub fn alias(&self) -> char {
        match self {
            AgentKind::Player => 'J',
            AgentKind::DavyJones => 'D',
            AgentKind::Kraken => 'K',
            AgentKind::Rock => 'R',
            AgentKind::Chest => 'C',
            AgentKind::Tortuga => 'T',
        }
    }

    /// The fixed perception-offset table for this kind.
    ///
    /// The scenario only changes the Player's table; every other kind
    /// keeps the same zone in both scenarios.
    pub fn perception(&self, scenario: Scenario) -> &'static [Offset] {
        match self {
            AgentKind::Player => match scenario {
                Scenario::Standard => &SURROUNDING,
                Scenario::Spyglass => &EXTENDED,
            },
            AgentKind::DavyJones => &SURROUNDING,
            AgentKind::Kraken => &ORTHOGONAL,
            AgentKind::Rock | AgentKind::Chest | AgentKind::Tortuga => &SELF_ONLY,
        }
    }
}

/// An agent kind bound to a spawn position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentPlacement {
    pub kind: AgentKind,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_add_stays_on_chart() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.clamped_add((-1, -1)), Position::new(0, 0));
        assert_eq!(corner.clamped_add((-2, 0)), Position::new(0, 0));

        let far = Position::new(8, 8);
        assert_eq!(far.clamped_add((1, 2)), Position::new(8, 8));
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.chebyshev_distance(&Position::new(8, 8)), 8);
        assert_eq!(a.chebyshev_distance(&Position::new(3, 1)), 3);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn test_player_perception_depends_on_scenario() {
        assert_eq!(AgentKind::Player.perception(Scenario::Standard).len(), 8);
        assert_eq!(AgentKind::Player.perception(Scenario::Spyglass).len(), 12);
        // No other kind is scenario sensitive
        for kind in AgentKind::all().iter().skip(1) {
            assert_eq!(
                kind.perception(Scenario::Standard),
                kind.perception(Scenario::Spyglass)
            );
        }
    }

    #[test]
    fn test_hazard_flags() {
        assert!(AgentKind::Kraken.is_hazardous());
        assert!(AgentKind::DavyJones.is_hazardous());
        assert!(!AgentKind::Rock.is_hazardous());
        assert!(!AgentKind::Player.is_hazardous());
    }
}
