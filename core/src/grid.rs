//! Walkability grid and the immutable snapshots handed to pathfinding.

use crate::{CellCoord, CellRect, GridError};

/// Authoritative walkability state over a fixed `columns x rows` grid.
///
/// Terrain obstructions and placed structures both express themselves through
/// the single walkable flag. Dimensions never change after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    walkable: Vec<bool>,
}

impl TileGrid {
    /// Creates a grid whose tiles are all walkable.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            walkable: vec![true; capacity],
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

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether every cell of the rectangle lies inside the grid.
    #[must_use]
    pub fn contains_rect(&self, rect: &CellRect) -> bool {
        let right = u64::from(rect.origin().column()) + u64::from(rect.size().width());
        let bottom = u64::from(rect.origin().row()) + u64::from(rect.size().height());
        right <= u64::from(self.columns) && bottom <= u64::from(self.rows)
    }

    /// Reports whether the tile at `cell` can currently be walked on.
    pub fn is_walkable(&self, cell: CellCoord) -> Result<bool, GridError> {
        let index = self.index(cell)?;
        Ok(self.walkable[index])
    }

    /// Updates the walkability of a single tile and returns its previous value.
    ///
    /// This is the only way walkability changes, so every higher-level edit is
    /// a sequence of individually reversible tile updates.
    pub fn set_walkable(&mut self, cell: CellCoord, walkable: bool) -> Result<bool, GridError> {
        let index = self.index(cell)?;
        let previous = self.walkable[index];
        self.walkable[index] = walkable;
        Ok(previous)
    }

    /// Number of tiles that are currently blocked.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.walkable.iter().filter(|walkable| !**walkable).count()
    }

    /// Captures an immutable copy of the current walkability.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            columns: self.columns,
            rows: self.rows,
            walkable: self.walkable.clone().into_boxed_slice(),
        }
    }

    fn index(&self, cell: CellCoord) -> Result<usize, GridError> {
        index(self.columns, self.rows, cell)
    }
}

/// Immutable copy of grid walkability taken at a single point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSnapshot {
    columns: u32,
    rows: u32,
    walkable: Box<[bool]>,
}

impl GridSnapshot {
    /// Number of columns contained in the snapshot.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the snapshot.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the snapshot bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Walkability of `cell` at the time the snapshot was taken.
    pub fn is_walkable(&self, cell: CellCoord) -> Result<bool, GridError> {
        let index = index(self.columns, self.rows, cell)?;
        Ok(self.walkable[index])
    }
}

fn index(columns: u32, rows: u32, cell: CellCoord) -> Result<usize, GridError> {
    let out_of_range = GridError::OutOfRange {
        cell,
        columns,
        rows,
    };
    if cell.column() >= columns || cell.row() >= rows {
        return Err(out_of_range);
    }

    let row = usize::try_from(cell.row()).map_err(|_| out_of_range)?;
    let column = usize::try_from(cell.column()).map_err(|_| out_of_range)?;
    let width = usize::try_from(columns).map_err(|_| out_of_range)?;
    Ok(row * width + column)
}
