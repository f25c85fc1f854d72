//! Two-phase push resolution: a read-only feasibility walk followed by a
//! batch commit of the discovered chain.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use boxpush_core::{CellCoord, Direction, PushPlan, PushVerdict};
use log::trace;

use crate::{
    registry::{EntityRegistry, InvariantViolation},
    terrain::Terrain,
};

/// Discovers every entity that must move if something at `start` steps in
/// `direction`.
///
/// The walk is breadth-first over entities, keyed by identifier, so a pair
/// whose two leading cells both reach the same downstream entity enqueues it
/// once. The first shifted cell that lands on terrain blocks the whole chain.
pub(crate) fn can_move(
    terrain: &Terrain,
    registry: &EntityRegistry,
    start: CellCoord,
    direction: Direction,
) -> PushVerdict {
    let Some(target) = direction.step(start) else {
        return PushVerdict::Blocked;
    };
    if terrain.is_blocked(target) {
        return PushVerdict::Blocked;
    }

    let Some(seed) = registry.entity_at(target) else {
        return PushVerdict::Feasible(PushPlan::new(direction, Vec::new()));
    };

    let mut visited = BTreeSet::from([seed]);
    let mut frontier = VecDeque::from([seed]);

    while let Some(id) = frontier.pop_front() {
        let Some(footprint) = registry.footprint(id) else {
            return PushVerdict::Blocked;
        };

        for &cell in footprint.cells() {
            let Some(next) = direction.step(cell) else {
                trace!("entity {} would leave the coordinate space", id.get());
                return PushVerdict::Blocked;
            };
            if terrain.is_blocked(next) {
                trace!(
                    "entity {} blocked by terrain at ({}, {})",
                    id.get(),
                    next.column(),
                    next.row()
                );
                return PushVerdict::Blocked;
            }

            if let Some(neighbor) = registry.entity_at(next) {
                if visited.insert(neighbor) {
                    trace!("entity {} pushes entity {}", id.get(), neighbor.get());
                    frontier.push_back(neighbor);
                }
            }
        }
    }

    PushVerdict::Feasible(PushPlan::new(direction, visited.into_iter().collect()))
}

/// Shifts every entity of a feasible plan one step as a single batch.
pub(crate) fn commit(
    terrain: &Terrain,
    registry: &mut EntityRegistry,
    plan: &PushPlan,
) -> Result<(), InvariantViolation> {
    let direction = plan.direction();
    let mut moves = BTreeMap::new();

    for &id in plan.entities() {
        let current = registry
            .footprint(id)
            .ok_or(InvariantViolation::UnknownEntity(id))?;
        let next = current
            .shifted(direction)
            .ok_or(InvariantViolation::OutOfBounds {
                entity: id,
                cell: current.anchor(),
            })?;

        if let Some(&cell) = next.cells().iter().find(|cell| terrain.is_obstacle(**cell)) {
            return Err(InvariantViolation::ObstacleCollision { entity: id, cell });
        }

        let _ = moves.insert(id, next);
    }

    registry.relocate_all(&moves)
}
