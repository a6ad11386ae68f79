//! End-to-end engine behavior: route validity, engine agreement, the
//! Tortuga detour with Kraken neutralization, and the depth cap.

use rand::rngs::StdRng;
use rand::SeedableRng;

use blackpearl::astar::AStarSearch;
use blackpearl::backtracking::BacktrackingSearch;
use blackpearl::map::GridMap;
use blackpearl::solver::{path_edges, PathfindingEngine};
use blackpearl::types::{AgentKind, Position, Scenario};

const FULL_CAP: u32 = BacktrackingSearch::DEFAULT_DEPTH_CAP;

/// Hazard-free diagonal: nothing blocks the straight run to the corner.
const DIAGONAL_CHART: &str = "[0,0] [0,7] [7,0] [5,0] [8,8] [0,3]";

/// The Kraken (sharing a Rock's cell) walls off every approach to the Chest;
/// only the rum casks from Tortuga open a route.
const BLOCKADE_CHART: &str = "[0,0] [0,8] [7,7] [7,7] [8,8] [4,4]";

/// The Kraken at (1,1) seals the Player into the corner.
const BOXED_IN_CHART: &str = "[0,0] [6,6] [1,1] [3,3] [8,0] [0,4]";

fn load(chart: &str, scenario: Scenario) -> GridMap {
    GridMap::load(chart, scenario).expect("test chart is a valid placement")
}

fn assert_route_is_traversable(map: &GridMap, path: &[Position]) {
    assert_eq!(path[0], map.position_of(AgentKind::Player));
    assert_eq!(*path.last().unwrap(), map.position_of(AgentKind::Chest));
    for step in path.windows(2) {
        assert_eq!(
            step[0].chebyshev_distance(&step[1]),
            1,
            "route steps must be adjacent: {:?} -> {:?}",
            step[0],
            step[1]
        );
    }
}

#[test]
fn test_both_engines_find_the_diagonal() {
    let mut map = load(DIAGONAL_CHART, Scenario::Standard);

    for engine in engines(FULL_CAP).iter_mut() {
        let path = engine
            .find_path(&mut map)
            .unwrap_or_else(|| panic!("{} must win on the open diagonal", engine.name()));
        assert_eq!(path_edges(&path), 8, "{} route is not shortest", engine.name());
        assert_route_is_traversable(&map, &path);
    }
}

/// The spyglass only widens perception; movement stays 8-directional, so
/// routes keep the same length.
#[test]
fn test_spyglass_does_not_change_route_length() {
    for chart in [DIAGONAL_CHART, BLOCKADE_CHART] {
        let mut standard = load(chart, Scenario::Standard);
        let mut spyglass = load(chart, Scenario::Spyglass);

        for engine in engines(FULL_CAP).iter_mut() {
            let a = engine.find_path(&mut standard);
            let b = engine.find_path(&mut spyglass);
            assert_eq!(
                a.as_deref().map(path_edges),
                b.as_deref().map(path_edges),
                "{} disagrees with itself across scenarios",
                engine.name()
            );
        }
    }
}

/// Both engines route through Tortuga, neutralize the Kraken from an
/// adjacent cell, and thread the reopened zone to the Chest.
#[test]
fn test_blockade_forces_the_tortuga_detour() {
    let mut map = load(BLOCKADE_CHART, Scenario::Standard);
    let kraken = map.position_of(AgentKind::Kraken);

    for engine in engines(FULL_CAP).iter_mut() {
        let path = engine
            .find_path(&mut map)
            .unwrap_or_else(|| panic!("{} must win via Tortuga", engine.name()));

        assert_route_is_traversable(&map, &path);
        assert_eq!(path_edges(&path), 9, "{} detour is not shortest", engine.name());
        assert!(
            path.contains(&Position::new(4, 4)),
            "{} route must pass through Tortuga",
            engine.name()
        );
        assert!(
            path.iter().any(|p| p.chebyshev_distance(&kraken) == 1),
            "{} route must come alongside the Kraken to use the casks",
            engine.name()
        );
        assert!(
            !path.contains(&kraken),
            "{} route must not enter the Rock's cell",
            engine.name()
        );
    }
}

/// An unreachable Chest is a first-class outcome, not an error or a panic.
#[test]
fn test_boxed_in_player_loses_cleanly() {
    let mut map = load(BOXED_IN_CHART, Scenario::Standard);
    for engine in engines(FULL_CAP).iter_mut() {
        assert_eq!(
            engine.find_path(&mut map),
            None,
            "{} must report no path",
            engine.name()
        );
    }
}

/// A tight depth cap turns a winnable chart into a loss; the full cap wins.
#[test]
fn test_depth_cap_bounds_the_backtracking_engine() {
    let mut map = load(DIAGONAL_CHART, Scenario::Standard);

    let mut capped = BacktrackingSearch::new(3);
    assert_eq!(
        capped.find_path(&mut map),
        None,
        "an 8-move route must not fit under a cap of 3"
    );

    let mut full = BacktrackingSearch::new(FULL_CAP);
    assert!(full.find_path(&mut map).is_some());
}

/// Over a batch of generated charts the two engines agree on winnability
/// and on route length, and neither corrupts the chart for the other.
#[test]
fn test_engines_agree_on_generated_charts() {
    for seed in 0..40 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut map = GridMap::generate(Scenario::Standard, &mut rng);

        for scenario in [Scenario::Standard, Scenario::Spyglass] {
            map.set_scenario(scenario);

            let astar_result = AStarSearch::new().find_path(&mut map);
            let backtracking_result =
                BacktrackingSearch::new(FULL_CAP).find_path(&mut map);

            assert_eq!(
                astar_result.is_some(),
                backtracking_result.is_some(),
                "seed {} scenario {:?}: engines disagree on winnability ({})",
                seed,
                scenario,
                map.serialize_positions()
            );

            if let (Some(a), Some(b)) = (&astar_result, &backtracking_result) {
                assert_eq!(
                    path_edges(a),
                    path_edges(b),
                    "seed {} scenario {:?}: route lengths differ ({})",
                    seed,
                    scenario,
                    map.serialize_positions()
                );
                assert_route_is_traversable(&map, a);
                assert_route_is_traversable(&map, b);
            }
        }
    }
}

fn engines(depth_cap: u32) -> [Box<dyn PathfindingEngine>; 2] {
    [
        Box::new(AStarSearch::new()),
        Box::new(BacktrackingSearch::new(depth_cap)),
    ]
}
