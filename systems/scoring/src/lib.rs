#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic scoring system that summarises entity positions.
//!
//! Each entity is scored from its anchor cell, the top-left cell of its
//! footprint, as `row * row_weight + column * column_weight`. Reports only
//! count entities of the requested shape.

use boxpush_core::{CellCoord, EntityShape, EntityView};
use log::debug;
use serde::{Deserialize, Serialize};

/// Multipliers applied to the anchor coordinates of every scored entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight applied to the anchor row.
    pub row: u64,
    /// Weight applied to the anchor column.
    pub column: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            row: 100,
            column: 1,
        }
    }
}

impl ScoreWeights {
    /// Score contributed by an entity anchored at `anchor`.
    ///
    /// Saturates at `u64::MAX` instead of overflowing.
    #[must_use]
    pub fn cell_score(&self, anchor: CellCoord) -> u64 {
        u64::from(anchor.row())
            .saturating_mul(self.row)
            .saturating_add(u64::from(anchor.column()).saturating_mul(self.column))
    }
}

/// Summary of the entities of one shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Shape that was scored.
    pub shape: EntityShape,
    /// Number of entities of that shape.
    pub entity_count: usize,
    /// Sum of the per-entity scores.
    pub total: u64,
}

/// Pure scoring system parameterised by its weights.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scoring {
    weights: ScoreWeights,
}

impl Scoring {
    /// Creates a scoring system with the provided weights.
    #[must_use]
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Weights used by the system.
    #[must_use]
    pub const fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Scores every entity of `shape` in the view.
    ///
    /// The total saturates at `u64::MAX`.
    #[must_use]
    pub fn report(&self, view: &EntityView, shape: EntityShape) -> ScoreReport {
        let (entity_count, total) = view
            .iter()
            .filter(|snapshot| snapshot.shape() == shape)
            .fold((0, 0u64), |(count, total), snapshot| {
                (
                    count + 1,
                    total.saturating_add(self.weights.cell_score(snapshot.footprint.anchor())),
                )
            });

        debug!("scored {entity_count} {shape:?} entities: {total}");
        ScoreReport {
            shape,
            entity_count,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxpush_core::{EntityId, EntitySnapshot, Footprint};

    fn snapshot(id: u32, column: u32, row: u32, shape: EntityShape) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            footprint: Footprint::anchored(CellCoord::new(column, row), shape)
                .expect("footprint"),
        }
    }

    #[test]
    fn default_weights_match_positioning_score() {
        let weights = ScoreWeights::default();
        assert_eq!(weights.cell_score(CellCoord::new(4, 1)), 104);
        assert_eq!(weights.cell_score(CellCoord::new(0, 0)), 0);
    }

    #[test]
    fn pairs_score_from_their_left_half() {
        let view = EntityView::from_snapshots(vec![snapshot(0, 5, 1, EntityShape::HorizontalPair)]);
        let report = Scoring::default().report(&view, EntityShape::HorizontalPair);
        assert_eq!(report.total, 105);
        assert_eq!(report.entity_count, 1);
    }

    #[test]
    fn report_only_counts_requested_shape() {
        let view = EntityView::from_snapshots(vec![
            snapshot(0, 1, 1, EntityShape::Single),
            snapshot(1, 3, 2, EntityShape::HorizontalPair),
            snapshot(2, 2, 3, EntityShape::Single),
            snapshot(3, 6, 1, EntityShape::VerticalPair),
        ]);
        let scoring = Scoring::default();

        assert_eq!(
            scoring.report(&view, EntityShape::Single),
            ScoreReport {
                shape: EntityShape::Single,
                entity_count: 2,
                total: 101 + 302,
            }
        );
        assert_eq!(scoring.report(&view, EntityShape::VerticalPair).total, 106);
    }

    #[test]
    fn custom_weights_are_applied() {
        let view = EntityView::from_snapshots(vec![snapshot(0, 3, 2, EntityShape::Single)]);
        let scoring = Scoring::new(ScoreWeights { row: 10, column: 2 });
        assert_eq!(scoring.report(&view, EntityShape::Single).total, 26);
        assert_eq!(scoring.weights().row, 10);
    }

    #[test]
    fn extreme_weights_saturate_instead_of_overflowing() {
        let view = EntityView::from_snapshots(vec![
            snapshot(0, 1, 2, EntityShape::Single),
            snapshot(1, 4, 3, EntityShape::Single),
        ]);
        let scoring = Scoring::new(ScoreWeights {
            row: u64::MAX,
            column: 1,
        });

        assert_eq!(scoring.weights().cell_score(CellCoord::new(1, 2)), u64::MAX);
        assert_eq!(scoring.report(&view, EntityShape::Single).total, u64::MAX);

        let columns_only = Scoring::new(ScoreWeights {
            row: 0,
            column: u64::MAX / 2,
        });
        assert_eq!(columns_only.report(&view, EntityShape::Single).total, u64::MAX);
    }

    #[test]
    fn empty_view_scores_zero() {
        let view = EntityView::default();
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);

        let report = Scoring::default().report(&view, EntityShape::Single);
        assert_eq!(report.entity_count, 0);
        assert_eq!(report.total, 0);
    }
}
