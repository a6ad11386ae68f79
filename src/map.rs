// Sea chart: the 9x9 cell grid, agent placement rules, and the
// hazard-zone bookkeeping both search engines run against.
//
// A map is built once per puzzle (random generation retried until valid, or
// parsed from a textual six-pair line and rejected when invalid). Engines
// mutate per-cell scratch state and hazard counters while searching and are
// responsible for restoring pristine hazard state afterwards via
// `fill_cells(true)`.

use rand::Rng;
use thiserror::Error;

use crate::types::{AgentKind, AgentPlacement, Position, Scenario, GRID_SIZE};

/// Why a textual map could not be turned into a playable chart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The raw text does not match the six-pair `[x,y]` shape.
    #[error("malformed map input: {0}")]
    Malformed(String),
    /// The text parsed but the placement violates the spawn rules.
    #[error("invalid agent placement")]
    InvalidPlacement,
}

/// Per-cell state: walkability, overlapping-hazard counter, occupant marks,
/// and the scratch fields the two engines use while searching.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub position: Position,
    pub walkable: bool,
    /// Count of overlapping hazard contributions; walkable iff zero
    /// (except an occupied agent cell, which is blocked independently).
    pub danger_level: i32,
    pub occupants: Vec<AgentKind>,
    /// Best known path cost, memorized by the backtracking engine.
    pub best_cost: u32,
    /// Cost from the start of the current A* phase.
    pub g: u32,
    /// Heuristic estimate to the goal of the current A* phase.
    pub h: u32,
    /// Back-reference for A* path reconstruction.
    pub parent: Option<Position>,
    /// Visited flag for the backtracking engine.
    pub visited: bool,
}

impl GridCell {
    fn new(position: Position) -> Self {
        GridCell {
            position,
            walkable: true,
            danger_level: 0,
            occupants: Vec::new(),
            best_cost: u32::MAX,
            g: 0,
            h: 0,
            parent: None,
            visited: false,
        }
    }

    /// A* selection key: g + h.
    pub fn f_cost(&self) -> u32 {
        self.g + self.h
    }

    pub fn has_occupant(&self, kind: AgentKind) -> bool {
        self.occupants.contains(&kind)
    }
}

/// The 9x9 chart with its six placed agents.
pub struct GridMap {
    scenario: Scenario,
    agents: [AgentPlacement; 6],
    cells: Vec<GridCell>,
}

impl GridMap {
    /// Randomly places the agents until the placement rules hold, then
    /// computes cell walkability and danger from the perception zones.
    ///
    /// The randomness source is injected so batch runs and tests can replay
    /// a generation deterministically from a seed.
    pub fn generate<R: Rng + ?Sized>(scenario: Scenario, rng: &mut R) -> GridMap {
        let placements = loop {
            let mut random_position =
                |kind| AgentPlacement { kind, position: random_cell(rng) };

            let candidate = [
                AgentPlacement { kind: AgentKind::Player, position: Position::new(0, 0) },
                random_position(AgentKind::DavyJones),
                random_position(AgentKind::Kraken),
                random_position(AgentKind::Rock),
                random_position(AgentKind::Chest),
                random_position(AgentKind::Tortuga),
            ];

            if placement_is_valid(&candidate, scenario) {
                break candidate;
            }
        };

        let mut map = GridMap {
            scenario,
            agents: placements,
            cells: Vec::new(),
        };
        map.fill_cells(false);
        map
    }

    /// Parses six fixed-format coordinate pairs into agent positions and
    /// validates them. Unlike `generate`, a bad placement is a checked
    /// failure rather than a retry, because the input is fixed.
    pub fn load(raw: &str, scenario: Scenario) -> Result<GridMap, MapError> {
        let positions = parse_positions(raw)?;

        let mut placements = [AgentPlacement {
            kind: AgentKind::Player,
            position: Position::new(0, 0),
        }; 6];
        for (i, kind) in AgentKind::all().iter().copied().enumerate() {
            placements[i] = AgentPlacement { kind, position: positions[i] };
        }

        if !placement_is_valid(&placements, scenario) {
            return Err(MapError::InvalidPlacement);
        }

        let mut map = GridMap {
            scenario,
            agents: placements,
            cells: Vec::new(),
        };
        map.fill_cells(false);
        Ok(map)
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Switches the perception rule. Danger zones are scenario independent,
    /// so the cells stay valid; only neighbor queries change.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
    }

    pub fn agents(&self) -> &[AgentPlacement; 6] {
        &self.agents
    }

    /// Spawn position of the given agent kind.
    pub fn position_of(&self, kind: AgentKind) -> Position {
        self.agents
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.position)
            .expect("all six agent kinds are always placed")
    }

    pub fn cell(&self, position: Position) -> &GridCell {
        &self.cells[cell_index(position)]
    }

    pub fn cell_mut(&mut self, position: Position) -> &mut GridCell {
        &mut self.cells[cell_index(position)]
    }

    /// Computes cell danger and walkability from the agents' perception zones.
    ///
    /// With `refill` set, the existing cells are restored to pristine hazard
    /// state (danger 0, walkable, occupants cleared) instead of reallocating;
    /// engines call this between runs so neither observes the other's
    /// Kraken-neutralization side effect.
    pub fn fill_cells(&mut self, refill: bool) {
        if !refill {
            self.cells = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);
            for x in 0..GRID_SIZE {
                for y in 0..GRID_SIZE {
                    self.cells.push(GridCell::new(Position::new(x, y)));
                }
            }
        } else {
            for cell in &mut self.cells {
                cell.danger_level = 0;
                cell.walkable = true;
                cell.occupants.clear();
            }
        }

        let agents = self.agents;
        for agent in agents.iter() {
            if agent.kind.is_hazardous() {
                // Clamping can fold several offsets onto one edge cell;
                // each agent contributes at most one danger unit per cell.
                let mut zone: Vec<Position> = Vec::new();
                for offset in agent.kind.perception(self.scenario).iter().copied() {
                    let target = agent.position.clamped_add(offset);
                    if !zone.contains(&target) {
                        zone.push(target);
                    }
                }

                for target in zone {
                    // The hazard's own cell is handled by the occupant rule.
                    if target != agent.position {
                        let cell = self.cell_mut(target);
                        cell.walkable = false;
                        cell.danger_level += 1;
                    }
                }
            }

            let cell = self.cell_mut(agent.position);
            if !cell.has_occupant(agent.kind) {
                cell.occupants.push(agent.kind);
            }
            if agent.kind.is_hazardous() || agent.kind == AgentKind::Rock {
                cell.walkable = false;
                cell.danger_level += 1;
            }
        }
    }

    /// Traversable-candidate neighbors of `position` under the active
    /// scenario.
    ///
    /// Scenario 1 applies the Player's perception offsets; scenario 2
    /// ignores the extended perception and degrades to plain 8-neighbor
    /// movement. Both filter to the chart bounds, never clamp.
    pub fn neighbors(&self, position: Position) -> Vec<Position> {
        let offsets = match self.scenario {
            // Scenario 1 moves along the Player's own perception zone.
            Scenario::Standard => AgentKind::Player.perception(self.scenario),
            // Scenario 2's extended perception does not extend movement.
            Scenario::Spyglass => AgentKind::Player.perception(Scenario::Standard),
        };

        offsets
            .iter()
            .map(|&offset| position.offset_by(offset))
            .filter(Position::in_bounds)
            .collect()
    }

    /// Neutralizes the Kraken spotted at `position`: every cell of its zone
    /// loses one danger unit and becomes walkable again at zero, then the
    /// Kraken's own cell loses its unit. Overlapping danger from other
    /// hazards on the same cells is respected via the counters.
    ///
    /// This is the only persistent mutation within a single search run.
    pub fn kill_hazard(&mut self, position: Position) {
        for offset in AgentKind::Kraken.perception(self.scenario).iter().copied() {
            let target = position.clamped_add(offset);
            if target != position {
                let cell = self.cell_mut(target);
                cell.danger_level -= 1;
                if cell.danger_level == 0 {
                    cell.walkable = true;
                }
            }
        }
        self.cell_mut(position).danger_level -= 1;
    }

    /// Forgets every cell's memorized best cost. The backtracking engine
    /// calls this between its independent sub-searches so they do not see
    /// each other's pruning history.
    pub fn reset_search_scratch(&mut self) {
        for cell in &mut self.cells {
            cell.best_cost = u32::MAX;
        }
    }

    /// Serializes the agent positions back into the six-pair text the loader
    /// accepts, in canonical agent order.
    pub fn serialize_positions(&self) -> String {
        self.agents
            .iter()
            .map(|a| format!("[{},{}]", a.position.x, a.position.y))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn cell_index(position: Position) -> usize {
    (position.x * GRID_SIZE + position.y) as usize
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::new(rng.random_range(0..GRID_SIZE), rng.random_range(0..GRID_SIZE))
}

/// The three spawn rules:
/// 1. The Player starts at (0,0).
/// 2. No two agents share a cell, except {Rock, Kraken} and {Tortuga, Player}.
/// 3. No hazard's perception zone (raw offsets, no clamping) covers the
///    Tortuga or Chest spawn cell, checked symmetrically.
fn placement_is_valid(agents: &[AgentPlacement; 6], scenario: Scenario) -> bool {
    if agents[0].position != Position::new(0, 0) {
        return false;
    }

    for (i, first) in agents.iter().enumerate() {
        for (j, second) in agents.iter().enumerate() {
            if i == j {
                continue;
            }

            if first.position == second.position
                && !is_allowed_overlap(first.kind, second.kind)
            {
                return false;
            }

            let zone_constrained = (first.kind.is_hazardous() && is_sanctuary(second.kind))
                || (is_sanctuary(first.kind) && second.kind.is_hazardous());

            if zone_constrained {
                for offset in first.kind.perception(scenario).iter().copied() {
                    if first.position.offset_by(offset) == second.position {
                        return false;
                    }
                }
            }
        }
    }

    true
}

/// Cells whose spawn must stay clear of every danger zone.
fn is_sanctuary(kind: AgentKind) -> bool {
    matches!(kind, AgentKind::Tortuga | AgentKind::Chest)
}

fn is_allowed_overlap(a: AgentKind, b: AgentKind) -> bool {
    matches!(
        (a, b),
        (AgentKind::Rock, AgentKind::Kraken)
            | (AgentKind::Kraken, AgentKind::Rock)
            | (AgentKind::Tortuga, AgentKind::Player)
            | (AgentKind::Player, AgentKind::Tortuga)
    )
}

/// Parses a line of six `[x,y]` pairs (spaces optional) into positions in
/// canonical agent order. Coordinates must be single digits within 0..=8.
pub fn parse_positions(raw: &str) -> Result<[Position; 6], MapError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars = compact.chars().peekable();
    let mut positions = [Position::new(0, 0); 6];

    for slot in positions.iter_mut() {
        expect_char(&mut chars, '[')?;
        let x = expect_coordinate(&mut chars)?;
        expect_char(&mut chars, ',')?;
        let y = expect_coordinate(&mut chars)?;
        expect_char(&mut chars, ']')?;
        *slot = Position::new(x, y);
    }

    if chars.next().is_some() {
        return Err(MapError::Malformed(
            "trailing characters after six coordinate pairs".to_string(),
        ));
    }

    Ok(positions)
}

fn expect_char(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    expected: char,
) -> Result<(), MapError> {
    match chars.next() {
        Some(c) if c == expected => Ok(()),
        Some(c) => Err(MapError::Malformed(format!(
            "expected '{}', found '{}'",
            expected, c
        ))),
        None => Err(MapError::Malformed(format!(
            "expected '{}', found end of input",
            expected
        ))),
    }
}

fn expect_coordinate(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<i32, MapError> {
    match chars.next() {
        Some(c) if c.is_ascii_digit() => {
            let value = c.to_digit(10).unwrap() as i32;
            if value >= GRID_SIZE {
                return Err(MapError::Malformed(format!(
                    "coordinate {} is off the chart",
                    value
                )));
            }
            Ok(value)
        }
        Some(c) => Err(MapError::Malformed(format!(
            "expected a digit, found '{}'",
            c
        ))),
        None => Err(MapError::Malformed(
            "expected a digit, found end of input".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions_accepts_spaced_and_compact_forms() {
        let spaced = parse_positions("[0,0] [0,8] [7,7] [7,7] [8,8] [4,4]").unwrap();
        let compact = parse_positions("[0,0][0,8][7,7][7,7][8,8][4,4]").unwrap();
        assert_eq!(spaced, compact);
        assert_eq!(spaced[0], Position::new(0, 0));
        assert_eq!(spaced[5], Position::new(4, 4));
    }

    #[test]
    fn test_parse_positions_rejects_bad_shapes() {
        assert!(matches!(
            parse_positions("[0,0] [1,1]"),
            Err(MapError::Malformed(_))
        ));
        assert!(matches!(
            parse_positions("[0,0] [0,8] [7,7] [7,7] [8,8] [4,9]"),
            Err(MapError::Malformed(_))
        ));
        assert!(matches!(
            parse_positions("(0,0) (0,8) (7,7) (7,7) (8,8) (4,4)"),
            Err(MapError::Malformed(_))
        ));
        assert!(matches!(
            parse_positions("[0,0] [0,8] [7,7] [7,7] [8,8] [4,4] extra"),
            Err(MapError::Malformed(_))
        ));
    }

    #[test]
    fn test_load_rejects_player_away_from_origin() {
        let result = GridMap::load(
            "[1,1] [4,4] [6,6] [2,5] [8,8] [0,3]",
            Scenario::Standard,
        );
        assert_eq!(result.err(), Some(MapError::InvalidPlacement));
    }

    #[test]
    fn test_load_rejects_hazard_zone_over_chest() {
        // Davy Jones at (7,7) surrounds (8,8), where the chest spawns
        let result = GridMap::load(
            "[0,0] [7,7] [2,2] [4,0] [8,8] [0,4]",
            Scenario::Standard,
        );
        assert_eq!(result.err(), Some(MapError::InvalidPlacement));
    }

    #[test]
    fn test_load_allows_rock_on_kraken_and_tortuga_on_player() {
        let map = GridMap::load(
            "[0,0] [0,8] [7,7] [7,7] [8,8] [0,0]",
            Scenario::Standard,
        )
        .expect("rock-on-kraken and tortuga-on-player overlaps are legal");

        let kraken_cell = map.cell(Position::new(7, 7));
        assert!(kraken_cell.has_occupant(AgentKind::Kraken));
        assert!(kraken_cell.has_occupant(AgentKind::Rock));
        // Kraken and Rock each contribute one danger unit
        assert_eq!(kraken_cell.danger_level, 2);
        assert!(!kraken_cell.walkable);
    }

    #[test]
    fn test_serialize_positions_round_trips_through_load() {
        let original = GridMap::load(
            "[0,0] [0,8] [7,7] [7,7] [8,8] [4,4]",
            Scenario::Standard,
        )
        .unwrap();

        let reloaded =
            GridMap::load(&original.serialize_positions(), Scenario::Standard).unwrap();
        assert_eq!(original.agents(), reloaded.agents());
    }

    #[test]
    fn test_edge_hazard_zone_is_deduplicated_after_clamping() {
        // Davy Jones in the corner: five of his eight offsets clamp onto
        // chart cells, and the folds must not double-count danger.
        let map = GridMap::load(
            "[0,0] [8,8] [4,0] [2,6] [0,6] [6,2]",
            Scenario::Standard,
        )
        .unwrap();

        assert_eq!(map.cell(Position::new(7, 8)).danger_level, 1);
        assert_eq!(map.cell(Position::new(8, 7)).danger_level, 1);
        assert_eq!(map.cell(Position::new(7, 7)).danger_level, 1);
    }
}
