use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use boxpush_core::{CellCoord, EntitySnapshot, Event};
use boxpush_system_simulation::Simulator;
use boxpush_world::{
    layout::{self, Layout, Puzzle},
    query, World,
};

const NARROW_PUZZLE: &str = "\
########
#..O.O.#
##@.O..#
#...O..#
#.#.O..#
#...O..#
#......#
########

<^^>>>vv<v>>v<<
";

const WIDE_PUZZLE: &str = "\
#######
#...#.#
#.....#
#..OO@#
#..O..#
#.....#
#######

<vvv<<^^<<^^
";

const LARGE_PUZZLE: &str = "\
##########
#..O..O.O#
#......O.#
#.OO..O.O#
#..O@..O.#
#O#..O...#
#O..O..O.#
#.OO.O.OO#
#....O...#
##########

<vv>^<v^>v>^vv^v>v<>v^v<v<^vv<<<^><<><>>v<vvv<>^v^>^<<<><<v<<<v^vv^v>^
vvv<<^>^v^^><<>>><>^<<><^vv^^<>vvv<>><^^v>^>vv<>v<<<<v<^v>^<^^>>>^<v<v
><>vv>v^v^<>><>>>><^^>vv>v<^^^>>v^v^<^^>v^^>v^<^v>v<>>v^v^<v>v^^<^^vv<
<<v<^>>^^^^>>>v^<>vvv^><v<<<>^^^vv^<vvv>^>v<^^^^v<>^>vvvv><>>v^<<^^^^^
^><^><>>><>^^<<^^v>>><^<v>^<vv>>v>>>^v><>^v><<<<v>>v<v<v>vvv>^<><<>^><
^>><>^v<><^vvv<^^<><v<<<<<><^v<<<><<<^^<v<^^^><^>>^<v^><<<^>>^v<v^v<v^
>^>>^v>vv>^<<^v<>><<><<v<<v><>v<^vv<<<>^^v^>^^>>><<^v>>v^v><^^>>^<>vv^
<><^^>^^^<><vvvvv^v<v<<>^v<v>v<<^><<><<><<<^^<<<^<<>><<><^^^>^^<>^>v<>
^^>vv<^v^v<vv>^<><v<^v>^^^>>>^^vvv^>vvv<>>>^<^>>>>>^<<^v>^vvv<>^<><<v>
v^^>>><<^^<>>^v^<v^vv<>v^<<>^<^v^v><^<<<><<^<v><v<>vv>>v><v^<vv<>v^<<^
";

fn replay(map: &str, puzzle: &Puzzle) -> (World, Simulator, Vec<Event>) {
    let Layout { mut world, actor } = layout::parse_map(map).expect("valid map");
    let mut simulator = Simulator::new(actor, puzzle.instructions.clone());
    let mut events = Vec::new();
    let processed = simulator.run(&mut world, &mut events);
    assert_eq!(processed, puzzle.instructions.len());
    (world, simulator, events)
}

#[test]
fn narrow_puzzle_reaches_known_final_state() {
    let puzzle = layout::parse_puzzle(NARROW_PUZZLE).expect("valid puzzle");
    let (world, simulator, _) = replay(&puzzle.map, &puzzle);

    assert_eq!(simulator.actor(), CellCoord::new(4, 4));
    assert_eq!(
        layout::render(&world, Some(simulator.actor())),
        "\
########
#....OO#
##.....#
#.....O#
#.#O@..#
#...O..#
#...O..#
########"
    );
    assert_eq!(query::verify_invariants(&world), Ok(()));
}

#[test]
fn widened_puzzle_reaches_known_final_state() {
    let puzzle = layout::parse_puzzle(WIDE_PUZZLE).expect("valid puzzle");
    let widened = layout::widen(&puzzle.map).expect("widenable");
    let (world, simulator, _) = replay(&widened, &puzzle);

    assert_eq!(simulator.actor(), CellCoord::new(5, 2));
    assert_eq!(
        layout::render(&world, Some(simulator.actor())),
        "\
##############
##...[].##..##
##...@.[]...##
##....[]....##
##..........##
##..........##
##############"
    );
    assert_eq!(query::verify_invariants(&world), Ok(()));
}

#[test]
fn large_narrow_puzzle_reaches_known_final_state() {
    let puzzle = layout::parse_puzzle(LARGE_PUZZLE).expect("valid puzzle");
    assert_eq!(puzzle.instructions.len(), 700);
    let (world, simulator, _) = replay(&puzzle.map, &puzzle);

    assert_eq!(simulator.actor(), CellCoord::new(3, 4));
    assert_eq!(
        layout::render(&world, Some(simulator.actor())),
        "\
##########
#.O.O.OOO#
#........#
#OO......#
#OO@.....#
#O#.....O#
#O.....OO#
#O.....OO#
#OO....OO#
##########"
    );
    assert_eq!(query::verify_invariants(&world), Ok(()));
}

#[test]
fn large_widened_puzzle_reaches_known_final_state() {
    let puzzle = layout::parse_puzzle(LARGE_PUZZLE).expect("valid puzzle");
    let widened = layout::widen(&puzzle.map).expect("widenable");
    let (world, simulator, _) = replay(&widened, &puzzle);

    assert_eq!(simulator.actor(), CellCoord::new(4, 7));
    assert_eq!(
        layout::render(&world, Some(simulator.actor())),
        "\
####################
##[].......[].[][]##
##[]...........[].##
##[]........[][][]##
##[]......[]....[]##
##..##......[]....##
##..[]............##
##..@......[].[][]##
##......[][]..[]..##
####################"
    );
    assert_eq!(query::entity_view(&world).len(), 21);
    assert_eq!(query::verify_invariants(&world), Ok(()));
}

#[test]
fn replays_of_the_same_puzzle_are_identical() {
    let puzzle = layout::parse_puzzle(NARROW_PUZZLE).expect("valid puzzle");
    let first = ReplayOutcome::capture(&puzzle.map, &puzzle);
    let second = ReplayOutcome::capture(&puzzle.map, &puzzle);

    assert!(!first.events.is_empty());
    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    actor: CellCoord,
    entities: Vec<EntitySnapshot>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn capture(map: &str, puzzle: &Puzzle) -> Self {
        let (world, simulator, events) = replay(map, puzzle);
        Self {
            actor: simulator.actor(),
            entities: query::entity_view(&world).into_vec(),
            events,
        }
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
