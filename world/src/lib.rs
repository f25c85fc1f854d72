#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Boxpush.
//!
//! The world owns the immutable [`Terrain`] and the entity registry. Reads go
//! through the [`query`] module; the only mutation is [`apply`], which commits
//! push plans produced by [`query::can_move`]. Worlds are plain values: clone
//! one to run an independent simulation against it.

pub mod layout;
mod push;
mod registry;
mod terrain;

use boxpush_core::{CellCoord, Command, EntityId, EntityShape, Event, Footprint};
use log::{debug, error};

pub use registry::InvariantViolation;
pub use terrain::Terrain;

use crate::{layout::LayoutError, registry::EntityRegistry};

/// Represents the authoritative Boxpush world state.
#[derive(Clone, Debug)]
pub struct World {
    terrain: Terrain,
    registry: EntityRegistry,
}

/// Incrementally describes a world before it is validated and built.
///
/// Entities receive identifiers in the order they are added, starting at zero.
#[derive(Clone, Debug)]
pub struct WorldBuilder {
    columns: u32,
    rows: u32,
    obstacles: Vec<CellCoord>,
    entities: Vec<(CellCoord, EntityShape)>,
}

impl WorldBuilder {
    /// Starts describing a world of `columns` by `rows` open cells.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            obstacles: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Adds an impassable cell.
    #[must_use]
    pub fn obstacle(mut self, cell: CellCoord) -> Self {
        self.obstacles.push(cell);
        self
    }

    /// Adds a pushable entity whose top-left cell is `anchor`.
    #[must_use]
    pub fn entity(mut self, anchor: CellCoord, shape: EntityShape) -> Self {
        self.entities.push((anchor, shape));
        self
    }

    /// Validates the description and produces the world.
    ///
    /// Fails when an obstacle or entity lies outside the bounds, when two
    /// entities overlap, or when an entity covers an obstacle.
    pub fn build(self) -> Result<World, LayoutError> {
        let mut terrain = Terrain::new(self.columns, self.rows);
        for cell in self.obstacles {
            if !terrain.place_obstacle(cell) {
                return Err(LayoutError::ObstacleOutOfBounds {
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }

        let mut registry = EntityRegistry::new(self.columns, self.rows);
        for (index, (anchor, shape)) in self.entities.into_iter().enumerate() {
            let id = EntityId::new(u32::try_from(index).map_err(|_| LayoutError::GridTooLarge)?);
            let footprint = Footprint::anchored(anchor, shape)
                .ok_or(InvariantViolation::OutOfBounds { entity: id, cell: anchor })?;
            if let Some(&cell) = footprint
                .cells()
                .iter()
                .find(|cell| terrain.is_obstacle(**cell))
            {
                return Err(InvariantViolation::ObstacleCollision { entity: id, cell }.into());
            }
            registry.insert(id, footprint)?;
        }

        Ok(World { terrain, registry })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::CommitPush { plan } => {
            if plan.is_empty() {
                return;
            }

            match push::commit(&world.terrain, &mut world.registry, &plan) {
                Ok(()) => {
                    debug_assert_eq!(query::verify_invariants(world), Ok(()));
                    debug!(
                        "pushed {} entities {:?}",
                        plan.entities().len(),
                        plan.direction()
                    );
                    out_events.push(Event::EntitiesPushed {
                        direction: plan.direction(),
                        entities: plan.entities().to_vec(),
                    });
                }
                Err(violation) => {
                    error!("refused push plan: {violation}");
                    out_events.push(Event::PushRejected {
                        direction: plan.direction(),
                        entities: plan.entities().to_vec(),
                    });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use boxpush_core::{
        CellCoord, Direction, EntityId, EntitySnapshot, EntityView, PushVerdict,
    };

    use super::{push, InvariantViolation, Terrain, World};

    /// Provides read-only access to the world's bounds and obstacles.
    #[must_use]
    pub fn terrain(world: &World) -> &Terrain {
        &world.terrain
    }

    /// Reports whether terrain prevents anything from entering `cell`.
    #[must_use]
    pub fn is_blocked(world: &World, cell: CellCoord) -> bool {
        world.terrain.is_blocked(cell)
    }

    /// Returns the entity covering `cell`, if any.
    #[must_use]
    pub fn entity_at(world: &World, cell: CellCoord) -> Option<EntityId> {
        world.registry.entity_at(cell)
    }

    /// Returns the cells currently covered by `id`.
    #[must_use]
    pub fn occupied_cells(world: &World, id: EntityId) -> Option<&[CellCoord]> {
        world.registry.occupied_cells(id)
    }

    /// Walks the push chain that a step from `start` toward `direction` would
    /// displace, without mutating anything.
    #[must_use]
    pub fn can_move(world: &World, start: CellCoord, direction: Direction) -> PushVerdict {
        push::can_move(&world.terrain, &world.registry, start, direction)
    }

    /// Captures a read-only view of every entity in identifier order.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots = world
            .registry
            .iter()
            .map(|(id, footprint)| EntitySnapshot {
                id,
                footprint: *footprint,
            })
            .collect();
        EntityView::from_snapshots(snapshots)
    }

    /// Checks that occupancy is consistent, avoids terrain, and stays in bounds.
    pub fn verify_invariants(world: &World) -> Result<(), InvariantViolation> {
        world.registry.verify()?;
        for (entity, footprint) in world.registry.iter() {
            for &cell in footprint.cells() {
                if !world.terrain.contains(cell) {
                    return Err(InvariantViolation::OutOfBounds { entity, cell });
                }
                if world.terrain.is_obstacle(cell) {
                    return Err(InvariantViolation::ObstacleCollision { entity, cell });
                }
            }
        }
        Ok(())
    }
}
