//! Authoritative entity state and the dense occupancy index.

use std::collections::BTreeMap;

use boxpush_core::{CellCoord, EntityId, EntityShape, Footprint};
use thiserror::Error;

/// Occupancy faults that must never survive a committed mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A batch referenced an entity the registry does not own.
    #[error("entity {} is not registered", .0.get())]
    UnknownEntity(EntityId),
    /// A batch tried to register the same entity twice.
    #[error("entity {} is already registered", .0.get())]
    DuplicateEntity(EntityId),
    /// A relocation would change the shape of an entity.
    #[error("entity {} would change shape from {from:?} to {to:?}", .entity.get())]
    ShapeChanged {
        /// Entity whose shape would change.
        entity: EntityId,
        /// Shape currently registered.
        from: EntityShape,
        /// Shape requested by the batch.
        to: EntityShape,
    },
    /// A cell of the entity lies outside the grid.
    #[error(
        "entity {} would leave the grid at ({}, {})",
        .entity.get(),
        .cell.column(),
        .cell.row()
    )]
    OutOfBounds {
        /// Entity that would leave the grid.
        entity: EntityId,
        /// Offending cell.
        cell: CellCoord,
    },
    /// Two entities would claim the same cell.
    #[error(
        "entities {} and {} would both occupy ({}, {})",
        .occupant.get(),
        .intruder.get(),
        .cell.column(),
        .cell.row()
    )]
    Overlap {
        /// Cell claimed twice.
        cell: CellCoord,
        /// Entity that already claims the cell.
        occupant: EntityId,
        /// Entity that tried to claim it as well.
        intruder: EntityId,
    },
    /// An entity would cover an obstacle.
    #[error(
        "entity {} would cover the obstacle at ({}, {})",
        .entity.get(),
        .cell.column(),
        .cell.row()
    )]
    ObstacleCollision {
        /// Entity overlapping terrain.
        entity: EntityId,
        /// Obstacle cell.
        cell: CellCoord,
    },
    /// The occupancy index and the entity footprints disagree.
    #[error(
        "occupancy of ({}, {}) disagrees with the footprint of entity {}",
        .cell.column(),
        .cell.row(),
        .entity.get()
    )]
    StaleOccupancy {
        /// Cell whose index entry is wrong.
        cell: CellCoord,
        /// Entity named by the index or the footprint.
        entity: EntityId,
    },
}

/// Owns every entity by identifier and indexes which entity covers each cell.
#[derive(Clone, Debug)]
pub(crate) struct EntityRegistry {
    columns: u32,
    rows: u32,
    cells: Vec<Option<EntityId>>,
    entities: BTreeMap<EntityId, Footprint>,
}

impl EntityRegistry {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
            entities: BTreeMap::new(),
        }
    }

    /// Registers a new entity. Only used while the world is being built.
    pub(crate) fn insert(
        &mut self,
        id: EntityId,
        footprint: Footprint,
    ) -> Result<(), InvariantViolation> {
        if self.entities.contains_key(&id) {
            return Err(InvariantViolation::DuplicateEntity(id));
        }

        for &cell in footprint.cells() {
            let index = self
                .index(cell)
                .ok_or(InvariantViolation::OutOfBounds { entity: id, cell })?;
            if let Some(occupant) = self.cells.get(index).copied().flatten() {
                return Err(InvariantViolation::Overlap {
                    cell,
                    occupant,
                    intruder: id,
                });
            }
        }

        self.occupy(id, &footprint);
        let _ = self.entities.insert(id, footprint);
        Ok(())
    }

    pub(crate) fn entity_at(&self, cell: CellCoord) -> Option<EntityId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn footprint(&self, id: EntityId) -> Option<Footprint> {
        self.entities.get(&id).copied()
    }

    pub(crate) fn occupied_cells(&self, id: EntityId) -> Option<&[CellCoord]> {
        self.entities.get(&id).map(Footprint::cells)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &Footprint)> {
        self.entities.iter().map(|(id, footprint)| (*id, footprint))
    }

    /// Moves every listed entity to its new footprint as one batch.
    ///
    /// The whole batch is checked before any slot changes, so a rejected batch
    /// leaves the registry untouched. Old footprints are vacated before any new
    /// footprint is written because a chain member's new cells may overlap
    /// another member's old cells.
    pub(crate) fn relocate_all(
        &mut self,
        moves: &BTreeMap<EntityId, Footprint>,
    ) -> Result<(), InvariantViolation> {
        let mut claimed: BTreeMap<CellCoord, EntityId> = BTreeMap::new();
        for (&id, next) in moves {
            let current = self
                .entities
                .get(&id)
                .ok_or(InvariantViolation::UnknownEntity(id))?;
            if current.shape() != next.shape() {
                return Err(InvariantViolation::ShapeChanged {
                    entity: id,
                    from: current.shape(),
                    to: next.shape(),
                });
            }

            for &cell in next.cells() {
                let index = self
                    .index(cell)
                    .ok_or(InvariantViolation::OutOfBounds { entity: id, cell })?;
                if let Some(occupant) = self.cells.get(index).copied().flatten() {
                    if !moves.contains_key(&occupant) {
                        return Err(InvariantViolation::Overlap {
                            cell,
                            occupant,
                            intruder: id,
                        });
                    }
                }
                if let Some(occupant) = claimed.insert(cell, id) {
                    return Err(InvariantViolation::Overlap {
                        cell,
                        occupant,
                        intruder: id,
                    });
                }
            }
        }

        for id in moves.keys() {
            if let Some(current) = self.entities.get(id).copied() {
                self.vacate(&current);
            }
        }

        for (&id, next) in moves {
            self.occupy(id, next);
            let _ = self.entities.insert(id, *next);
        }

        Ok(())
    }

    /// Checks that the index and the footprints describe the same occupancy.
    pub(crate) fn verify(&self) -> Result<(), InvariantViolation> {
        let mut covered = 0_usize;
        for (&id, footprint) in &self.entities {
            for &cell in footprint.cells() {
                if !self.contains(cell) {
                    return Err(InvariantViolation::OutOfBounds { entity: id, cell });
                }
                if self.entity_at(cell) != Some(id) {
                    return Err(InvariantViolation::StaleOccupancy { cell, entity: id });
                }
                covered += 1;
            }
        }

        let indexed = self.cells.iter().filter(|slot| slot.is_some()).count();
        if indexed != covered {
            let stray = self.cells.iter().enumerate().find_map(|(index, slot)| {
                let entity = (*slot)?;
                let cell = self.cell_at(index)?;
                let owned = self
                    .entities
                    .get(&entity)
                    .is_some_and(|footprint| footprint.contains(cell));
                (!owned).then_some((cell, entity))
            });
            if let Some((cell, entity)) = stray {
                return Err(InvariantViolation::StaleOccupancy { cell, entity });
            }
        }

        Ok(())
    }

    fn occupy(&mut self, id: EntityId, footprint: &Footprint) {
        for &cell in footprint.cells() {
            if let Some(index) = self.index(cell) {
                if let Some(slot) = self.cells.get_mut(index) {
                    *slot = Some(id);
                }
            }
        }
    }

    fn vacate(&mut self, footprint: &Footprint) {
        for &cell in footprint.cells() {
            if let Some(index) = self.index(cell) {
                if let Some(slot) = self.cells.get_mut(index) {
                    *slot = None;
                }
            }
        }
    }

    fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.columns).ok().filter(|width| *width > 0)?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}
