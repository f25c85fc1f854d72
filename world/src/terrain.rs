//! Static grid bounds and the immutable obstacle set.

use boxpush_core::CellCoord;

/// Bounds and obstacles of the world, fixed once the world is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    columns: u32,
    rows: u32,
    obstacles: Vec<bool>,
}

impl Terrain {
    /// Creates open terrain spanning `columns` by `rows` cells.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            obstacles: vec![false; capacity],
        }
    }

    /// Marks `cell` as impassable. Returns `false` when the cell is out of bounds.
    pub(crate) fn place_obstacle(&mut self, cell: CellCoord) -> bool {
        match self.index(cell).and_then(|index| self.obstacles.get_mut(index)) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether `cell` lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether `cell` is an in-bounds obstacle.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.obstacles.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether terrain prevents anything from entering `cell`.
    ///
    /// Cells outside the grid are always blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        match self.index(cell) {
            Some(index) => self.obstacles.get(index).copied().unwrap_or(true),
            None => true,
        }
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
}
