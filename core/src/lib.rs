#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Boxpush engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems probe the world through its
//! read-only queries, submit [`Command`] values describing desired mutations,
//! and the world executes those commands via its `apply` entry point before
//! broadcasting [`Event`] values describing what actually happened.

use serde::{Deserialize, Serialize};

/// Cardinal unit-step directions available to the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Decodes a single instruction token (`^`, `>`, `v`, `<`).
    #[must_use]
    pub const fn from_token(token: char) -> Option<Self> {
        match token {
            '^' => Some(Self::North),
            '>' => Some(Self::East),
            'v' => Some(Self::South),
            '<' => Some(Self::West),
            _ => None,
        }
    }

    /// Instruction token that encodes the direction.
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::North => '^',
            Self::East => '>',
            Self::South => 'v',
            Self::West => '<',
        }
    }

    /// Returns the cell one step away from `cell` in this direction.
    ///
    /// Yields `None` when the step would leave the unsigned coordinate space,
    /// which callers treat the same as stepping outside the grid.
    #[must_use]
    pub fn step(self, cell: CellCoord) -> Option<CellCoord> {
        let (column, row) = (cell.column(), cell.row());
        match self {
            Self::North => row.checked_sub(1).map(|row| CellCoord::new(column, row)),
            Self::East => column.checked_add(1).map(|column| CellCoord::new(column, row)),
            Self::South => row.checked_add(1).map(|row| CellCoord::new(column, row)),
            Self::West => column.checked_sub(1).map(|column| CellCoord::new(column, row)),
        }
    }
}

/// Unique identifier assigned to a pushable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Shapes a pushable entity may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityShape {
    /// Occupies exactly one cell.
    Single,
    /// Occupies its anchor cell and the cell directly east of it.
    HorizontalPair,
    /// Occupies its anchor cell and the cell directly south of it.
    VerticalPair,
}

impl EntityShape {
    /// Number of cells covered by the shape.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::HorizontalPair | Self::VerticalPair => 2,
        }
    }

    const fn trailing_direction(self) -> Option<Direction> {
        match self {
            Self::Single => None,
            Self::HorizontalPair => Some(Direction::East),
            Self::VerticalPair => Some(Direction::South),
        }
    }
}

/// Cells covered by an entity, derived from its anchor cell and shape.
///
/// The anchor is always the top-left cell of the footprint. Single-cell
/// footprints store the anchor twice so the backing array stays fixed-size;
/// [`Footprint::cells`] only exposes the cells the shape actually covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    shape: EntityShape,
    cells: [CellCoord; 2],
}

impl Footprint {
    /// Builds the footprint of `shape` anchored at `anchor`.
    ///
    /// Returns `None` when the trailing cell cannot be represented.
    #[must_use]
    pub fn anchored(anchor: CellCoord, shape: EntityShape) -> Option<Self> {
        let trailing = match shape.trailing_direction() {
            Some(direction) => direction.step(anchor)?,
            None => anchor,
        };
        Some(Self {
            shape,
            cells: [anchor, trailing],
        })
    }

    /// Shape that produced the footprint.
    #[must_use]
    pub const fn shape(&self) -> EntityShape {
        self.shape
    }

    /// Top-left cell of the footprint.
    #[must_use]
    pub const fn anchor(&self) -> CellCoord {
        self.cells[0]
    }

    /// Cells covered by the footprint, anchor first.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells[..self.shape.cell_count()]
    }

    /// Reports whether the footprint covers `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells().contains(&cell)
    }

    /// Footprint translated one step in `direction`, if representable.
    #[must_use]
    pub fn shifted(&self, direction: Direction) -> Option<Self> {
        Self::anchored(direction.step(self.anchor())?, self.shape)
    }
}

/// Owned result of a successful feasibility walk: every entity that must move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PushPlan {
    direction: Direction,
    entities: Vec<EntityId>,
}

impl PushPlan {
    /// Creates a plan moving the provided entities one step in `direction`.
    ///
    /// Identifiers are sorted and de-duplicated so each entity appears once.
    #[must_use]
    pub fn new(direction: Direction, mut entities: Vec<EntityId>) -> Self {
        entities.sort_unstable();
        entities.dedup();
        Self {
            direction,
            entities,
        }
    }

    /// Direction every entity in the plan shifts by.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Entities that move, in ascending identifier order.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Reports whether the plan moves no entity at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Read-only outcome of walking a push chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushVerdict {
    /// Every branch of the chain terminated on open terrain.
    Feasible(PushPlan),
    /// Some branch of the chain ran into terrain.
    Blocked,
}

impl PushVerdict {
    /// Reports whether the push can be committed.
    #[must_use]
    pub const fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }

    /// Converts the verdict into its plan, discarding blocked outcomes.
    #[must_use]
    pub fn into_plan(self) -> Option<PushPlan> {
        match self {
            Self::Feasible(plan) => Some(plan),
            Self::Blocked => None,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Shifts every entity in a previously validated plan by one step.
    CommitPush {
        /// Plan produced by a feasible verdict with no mutation since.
        plan: PushPlan,
    },
}

/// Reasons an actor step may leave the world untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepError {
    /// The target cell is terrain or lies outside the grid.
    Obstacle,
    /// The push chain starting at the target cell ran into terrain.
    ChainBlocked,
}

/// Events broadcast after processing commands and actor steps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that the actor moved between two cells.
    ActorMoved {
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
    },
    /// Reports that an actor step was processed as a no-op.
    ActorStepRejected {
        /// Cell the actor occupies.
        at: CellCoord,
        /// Direction of the rejected step.
        direction: Direction,
        /// Specific reason the step failed.
        reason: StepError,
    },
    /// Confirms that every entity of a push chain shifted by one step.
    EntitiesPushed {
        /// Direction of the shift.
        direction: Direction,
        /// Entities that moved, in ascending identifier order.
        entities: Vec<EntityId>,
    },
    /// Reports that the world refused a commit because it would break occupancy.
    PushRejected {
        /// Direction of the refused shift.
        direction: Direction,
        /// Entities named by the refused plan.
        entities: Vec<EntityId>,
    },
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Cells currently covered by the entity.
    pub footprint: Footprint,
}

impl EntitySnapshot {
    /// Shape of the entity.
    #[must_use]
    pub const fn shape(&self) -> EntityShape {
        self.footprint.shape()
    }

    /// Cells currently occupied by the entity, anchor first.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        self.footprint.cells()
    }
}

/// Read-only snapshot describing all entities within the world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}
