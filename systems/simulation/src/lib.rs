#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic simulation system that walks the actor through its instructions.
//!
//! Each instruction is processed to completion before the next one is read:
//! the actor either walks onto open terrain, pushes the chain in front of it
//! after the world has validated the whole chain, or stays put.

use boxpush_core::{CellCoord, Command, Direction, Event, StepError};
use boxpush_world::{self as world, query, World};
use log::{debug, trace};

/// System that owns the actor position and the instruction cursor.
#[derive(Clone, Debug)]
pub struct Simulator {
    actor: CellCoord,
    instructions: Vec<Direction>,
    cursor: usize,
}

impl Simulator {
    /// Creates a simulator with the actor at `actor` and no instruction consumed.
    #[must_use]
    pub fn new(actor: CellCoord, instructions: Vec<Direction>) -> Self {
        Self {
            actor,
            instructions,
            cursor: 0,
        }
    }

    /// Cell the actor currently occupies.
    #[must_use]
    pub const fn actor(&self) -> CellCoord {
        self.actor
    }

    /// Instructions that have not been processed yet.
    #[must_use]
    pub fn remaining(&self) -> &[Direction] {
        self.instructions.get(self.cursor..).unwrap_or_default()
    }

    /// Reports whether every instruction has been processed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.instructions.len()
    }

    /// Processes the next instruction. Returns `false` once the sequence is exhausted.
    pub fn step(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> bool {
        let Some(&direction) = self.instructions.get(self.cursor) else {
            return false;
        };
        self.cursor += 1;
        self.advance(world, direction, out_events);
        true
    }

    /// Processes every remaining instruction and returns how many were processed.
    pub fn run(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> usize {
        let mut processed = 0;
        while self.step(world, out_events) {
            processed += 1;
        }
        debug!(
            "processed {processed} instructions, actor at ({}, {})",
            self.actor.column(),
            self.actor.row()
        );
        processed
    }

    fn advance(&mut self, world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.actor;
        let Some(target) = direction
            .step(from)
            .filter(|target| !query::is_blocked(world, *target))
        else {
            self.reject(direction, StepError::Obstacle, out_events);
            return;
        };

        if query::entity_at(world, target).is_some() {
            let Some(plan) = query::can_move(world, from, direction).into_plan() else {
                self.reject(direction, StepError::ChainBlocked, out_events);
                return;
            };
            world::apply(world, Command::CommitPush { plan }, out_events);

            if query::entity_at(world, target).is_some() {
                self.reject(direction, StepError::ChainBlocked, out_events);
                return;
            }
        }

        self.actor = target;
        trace!(
            "actor moved {:?} to ({}, {})",
            direction,
            target.column(),
            target.row()
        );
        out_events.push(Event::ActorMoved { from, to: target });
    }

    fn reject(&self, direction: Direction, reason: StepError, out_events: &mut Vec<Event>) {
        trace!("actor step {:?} rejected: {:?}", direction, reason);
        out_events.push(Event::ActorStepRejected {
            at: self.actor,
            direction,
            reason,
        });
    }
}
