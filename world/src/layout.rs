//! Text layouts: map parsing, instruction decoding, map widening and rendering.
//!
//! A map is a rectangular character grid, one character per cell:
//!
//! | Tile | Meaning |
//! | --- | --- |
//! | `.` | open terrain |
//! | `#` | obstacle |
//! | `O` | single-cell entity |
//! | `[` `]` | left and right half of a horizontal pair |
//! | `A` `V` | top and bottom half of a vertical pair |
//! | `@` | actor |
//!
//! A puzzle is a map followed by a blank line and the instruction tokens
//! `^`, `>`, `v`, `<`, which may span several lines.

use boxpush_core::{CellCoord, Direction, EntityShape};
use thiserror::Error;

use crate::{query, InvariantViolation, World, WorldBuilder};

const OPEN: char = '.';
const OBSTACLE: char = '#';
const SINGLE: char = 'O';
const PAIR_LEFT: char = '[';
const PAIR_RIGHT: char = ']';
const PAIR_TOP: char = 'A';
const PAIR_BOTTOM: char = 'V';
const ACTOR: char = '@';

/// Errors that can occur while turning text into a world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The map contained no rows or no columns.
    #[error("map is empty")]
    EmptyMap,
    /// The puzzle had no blank line separating the map from the instructions.
    #[error("puzzle has no blank line between the map and the instructions")]
    MissingInstructions,
    /// A map row differed in length from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// The map contained a character that is not a tile.
    #[error("unknown tile {tile:?} at ({column}, {row})")]
    UnknownTile {
        /// Column of the tile.
        column: u32,
        /// Row of the tile.
        row: u32,
        /// Offending character.
        tile: char,
    },
    /// One half of a pair appeared without its partner.
    #[error("pair half {tile:?} at ({column}, {row}) has no partner")]
    UnmatchedPairHalf {
        /// Column of the tile.
        column: u32,
        /// Row of the tile.
        row: u32,
        /// Offending half.
        tile: char,
    },
    /// The map contained no actor.
    #[error("map has no actor")]
    MissingActor,
    /// The map contained more than one actor.
    #[error("map has a second actor at ({column}, {row})")]
    DuplicateActor {
        /// Column of the second actor.
        column: u32,
        /// Row of the second actor.
        row: u32,
    },
    /// The instructions contained a character that is not a direction.
    #[error("unknown instruction {token:?} at position {position}")]
    UnknownInstruction {
        /// Zero-based character offset within the instruction text.
        position: usize,
        /// Offending character.
        token: char,
    },
    /// Only maps made of `.`, `#`, `O` and `@` can be widened.
    #[error("tile {tile:?} at ({column}, {row}) cannot be widened")]
    NotWidenable {
        /// Column of the tile.
        column: u32,
        /// Row of the tile.
        row: u32,
        /// Offending character.
        tile: char,
    },
    /// An obstacle lies outside the grid.
    #[error("obstacle at ({column}, {row}) lies outside the grid")]
    ObstacleOutOfBounds {
        /// Column of the obstacle.
        column: u32,
        /// Row of the obstacle.
        row: u32,
    },
    /// The grid does not fit the coordinate space.
    #[error("grid is too large")]
    GridTooLarge,
    /// The entities of the layout break occupancy rules.
    #[error(transparent)]
    Occupancy(#[from] InvariantViolation),
}

/// World and actor position produced from a map.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Terrain and entities described by the map.
    pub world: World,
    /// Cell the actor starts on.
    pub actor: CellCoord,
}

/// Map text and decoded instructions of a puzzle input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    /// Map section, one row per line.
    pub map: String,
    /// Instructions in the order they are processed.
    pub instructions: Vec<Direction>,
}

/// Splits a puzzle into its map and decoded instructions.
///
/// Leading blank lines are ignored. The instruction section may be empty, but
/// the blank line that ends the map is required.
pub fn parse_puzzle(input: &str) -> Result<Puzzle, LayoutError> {
    let normalized = input.replace("\r\n", "\n");
    let (map, instructions) = normalized
        .trim_start_matches('\n')
        .split_once("\n\n")
        .ok_or(LayoutError::MissingInstructions)?;

    Ok(Puzzle {
        map: map.trim_end().to_owned(),
        instructions: parse_instructions(instructions)?,
    })
}

/// Decodes instruction tokens, skipping whitespace and line breaks.
pub fn parse_instructions(input: &str) -> Result<Vec<Direction>, LayoutError> {
    input
        .chars()
        .enumerate()
        .filter(|(_, token)| !token.is_whitespace())
        .map(|(position, token)| {
            Direction::from_token(token)
                .ok_or(LayoutError::UnknownInstruction { position, token })
        })
        .collect()
}

/// Builds the world and actor position described by `map`.
///
/// Entities are numbered in row-major order of their top-left cell.
pub fn parse_map(map: &str) -> Result<Layout, LayoutError> {
    let grid = read_grid(map)?;
    let rows = coordinate(grid.len())?;
    let columns = coordinate(grid.first().map_or(0, Vec::len))?;

    let mut builder = WorldBuilder::new(columns, rows);
    let mut actor: Option<CellCoord> = None;

    for (row_index, line) in grid.iter().enumerate() {
        let row = coordinate(row_index)?;
        for (column_index, &tile) in line.iter().enumerate() {
            let column = coordinate(column_index)?;
            let cell = CellCoord::new(column, row);
            let unmatched = || LayoutError::UnmatchedPairHalf { column, row, tile };

            match tile {
                OPEN => {}
                OBSTACLE => builder = builder.obstacle(cell),
                SINGLE => builder = builder.entity(cell, EntityShape::Single),
                PAIR_LEFT => {
                    if line.get(column_index + 1) != Some(&PAIR_RIGHT) {
                        return Err(unmatched());
                    }
                    builder = builder.entity(cell, EntityShape::HorizontalPair);
                }
                PAIR_RIGHT => {
                    let left = column_index.checked_sub(1).and_then(|index| line.get(index));
                    if left != Some(&PAIR_LEFT) {
                        return Err(unmatched());
                    }
                }
                PAIR_TOP => {
                    let below = grid.get(row_index + 1).and_then(|next| next.get(column_index));
                    if below != Some(&PAIR_BOTTOM) {
                        return Err(unmatched());
                    }
                    builder = builder.entity(cell, EntityShape::VerticalPair);
                }
                PAIR_BOTTOM => {
                    let above = row_index
                        .checked_sub(1)
                        .and_then(|index| grid.get(index))
                        .and_then(|previous| previous.get(column_index));
                    if above != Some(&PAIR_TOP) {
                        return Err(unmatched());
                    }
                }
                ACTOR => {
                    if actor.replace(cell).is_some() {
                        return Err(LayoutError::DuplicateActor { column, row });
                    }
                }
                _ => return Err(LayoutError::UnknownTile { column, row, tile }),
            }
        }
    }

    let actor = actor.ok_or(LayoutError::MissingActor)?;
    let world = builder.build()?;
    Ok(Layout { world, actor })
}

/// Doubles every map cell horizontally.
///
/// Obstacles and open cells double in place, single-cell entities become
/// horizontal pairs, and the actor keeps the left cell with open terrain to
/// its right.
pub fn widen(map: &str) -> Result<String, LayoutError> {
    let grid = read_grid(map)?;
    let mut rows = Vec::with_capacity(grid.len());

    for (row_index, line) in grid.iter().enumerate() {
        let mut widened = String::with_capacity(line.len() * 2);
        for (column_index, &tile) in line.iter().enumerate() {
            let pair = match tile {
                OBSTACLE => [OBSTACLE, OBSTACLE],
                SINGLE => [PAIR_LEFT, PAIR_RIGHT],
                OPEN => [OPEN, OPEN],
                ACTOR => [ACTOR, OPEN],
                _ => {
                    return Err(LayoutError::NotWidenable {
                        column: coordinate(column_index)?,
                        row: coordinate(row_index)?,
                        tile,
                    })
                }
            };
            widened.extend(pair);
        }
        rows.push(widened);
    }

    Ok(rows.join("\n"))
}

/// Draws the world, and the actor when given, in the map format.
#[must_use]
pub fn render(world: &World, actor: Option<CellCoord>) -> String {
    let terrain = query::terrain(world);
    let mut rows = Vec::new();

    for row in 0..terrain.rows() {
        let mut line = String::new();
        for column in 0..terrain.columns() {
            let cell = CellCoord::new(column, row);
            line.push(tile_at(world, cell, actor));
        }
        rows.push(line);
    }

    rows.join("\n")
}

fn tile_at(world: &World, cell: CellCoord, actor: Option<CellCoord>) -> char {
    if actor == Some(cell) {
        return ACTOR;
    }
    if query::terrain(world).is_obstacle(cell) {
        return OBSTACLE;
    }

    let Some(id) = query::entity_at(world, cell) else {
        return OPEN;
    };
    let cells = query::occupied_cells(world, id).unwrap_or_default();
    let is_anchor = cells.first() == Some(&cell);
    match (cells.len(), is_anchor) {
        (1, _) => SINGLE,
        (_, true) if cells.get(1).map(CellCoord::row) == Some(cell.row()) => PAIR_LEFT,
        (_, true) => PAIR_TOP,
        (_, false) if cells.first().map(CellCoord::row) == Some(cell.row()) => PAIR_RIGHT,
        (_, false) => PAIR_BOTTOM,
    }
}

fn read_grid(map: &str) -> Result<Vec<Vec<char>>, LayoutError> {
    let grid: Vec<Vec<char>> = map
        .lines()
        .map(|line| line.trim_end_matches('\r').chars().collect())
        .collect();

    let expected = grid.first().map_or(0, Vec::len);
    if expected == 0 {
        return Err(LayoutError::EmptyMap);
    }

    for (row, line) in grid.iter().enumerate() {
        if line.len() != expected {
            return Err(LayoutError::RaggedRow {
                row: coordinate(row)?,
                expected: coordinate(expected)?,
                found: coordinate(line.len())?,
            });
        }
    }

    Ok(grid)
}

fn coordinate(value: usize) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::GridTooLarge)
}
