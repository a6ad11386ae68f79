// ASCII rendering of a chart for the console/file reports.
//
// Rendering is derived from the map every time, so overlaying a path and
// "clearing" it again never touches map state: clearing is simply rendering
// without the path.

use crate::map::GridMap;
use crate::types::{AgentKind, Position, GRID_SIZE};

const BACKGROUND: char = '-';
const ZONE_MARK: char = '$';
const PATH_MARK: char = '*';

/// Base chart: background, hazard-zone markers, and agent aliases.
/// Indexed `[x][y]`, matching the report's row-per-x layout.
fn base_chart(map: &GridMap) -> [[char; 9]; 9] {
    let mut chart = [[BACKGROUND; 9]; 9];

    for agent in map.agents() {
        if agent.kind != AgentKind::Player {
            for offset in agent.kind.perception(map.scenario()).iter().copied() {
                let target = agent.position.clamped_add(offset);
                let mark = &mut chart[target.x as usize][target.y as usize];
                if *mark == BACKGROUND {
                    *mark = ZONE_MARK;
                }
            }
        }

        let mark = &mut chart[agent.position.x as usize][agent.position.y as usize];
        if *mark == BACKGROUND || *mark == ZONE_MARK {
            *mark = agent.kind.alias();
        }
    }

    chart
}

/// Renders the chart with an optional path overlaid as `*` markers.
pub fn render(map: &GridMap, path: Option<&[Position]>) -> String {
    let mut chart = base_chart(map);

    if let Some(path) = path {
        for position in path {
            chart[position.x as usize][position.y as usize] = PATH_MARK;
        }
    }

    let mut out = String::new();
    out.push_str(" —————————————————————\n");
    out.push_str("|   0 1 2 3 4 5 6 7 8 |\n");
    for x in 0..GRID_SIZE as usize {
        out.push_str(&format!("| {} ", x));
        for y in 0..GRID_SIZE as usize {
            out.push(chart[x][y]);
            out.push(' ');
        }
        out.push_str("|\n");
    }
    out.push_str(" —————————————————————\n");
    out
}
