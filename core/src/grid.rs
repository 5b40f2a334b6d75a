//! The tile matrix and the set of empty cells kept alongside it.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{is_tile_value, GameError, Result};

/// Largest tile a u32 cell holds. Two of these never merge.
pub const MAX_TILE: u32 = 1 << 31;

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

/// A rows x cols matrix of tile values.
///
/// Cells are stored in row-major order. Empty cells are 0, tiles hold
/// their value (2, 4, 8, ...).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimensions { rows, cols });
        }
        Ok(Grid {
            rows,
            cols,
            cells: vec![0; rows * cols],
        })
    }

    /// Build a grid from nested rows, validating shape and tile values.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        if height == 0 || cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return Err(GameError::InvalidDimensions { rows: height, cols });
        }
        let cells: Vec<u32> = rows.into_iter().flatten().collect();
        if let Some(&bad) = cells.iter().find(|&&v| v != 0 && !is_tile_value(v)) {
            return Err(GameError::InvalidTileValue(bad));
        }
        Ok(Grid {
            rows: height,
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`. Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[self.index(row, col)]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: u32) {
        let idx = self.index(row, col);
        self.cells[idx] = value;
    }

    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [u32] {
        let start = row * self.cols;
        &mut self.cells[start..start + self.cols]
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.cols).map(<[u32]>::to_vec).collect()
    }

    /// Swap rows and columns; an R x C grid becomes C x R.
    pub fn transpose(&self) -> Grid {
        let mut cells = Vec::with_capacity(self.cells.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                cells.push(self.get(row, col));
            }
        }
        Grid {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Reverse the element order of every row.
    pub fn reverse_rows(&self) -> Grid {
        let mut out = self.clone();
        for row in 0..out.rows {
            out.row_mut(row).reverse();
        }
        out
    }

    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(move |(i, _)| Position::new(i / self.cols, i % self.cols))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Sum of all tile values.
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().map(|&v| v as u64).sum()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Whether any two horizontally or vertically adjacent cells hold
    /// the same value below [`MAX_TILE`].
    pub fn has_adjacent_equal(&self) -> bool {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let v = self.get(row, col);
                if v == MAX_TILE {
                    continue;
                }
                if col + 1 < self.cols && v == self.get(row, col + 1) {
                    return true;
                }
                if row + 1 < self.rows && v == self.get(row + 1, col) {
                    return true;
                }
            }
        }
        false
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        row * self.cols + col
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{} {{", self.rows, self.cols)?;
        for row in 0..self.rows {
            for &val in self.row(row) {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "------+".repeat(self.cols));
        writeln!(f, "{border}")?;
        for row in 0..self.rows {
            write!(f, "|")?;
            for &val in self.row(row) {
                if val == 0 {
                    write!(f, "      |")?;
                } else {
                    write!(f, "{:^6}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{border}")?;
        }
        Ok(())
    }
}

/// The empty cells of a grid as an indexed set.
///
/// `slots` holds the members densely so a uniform pick is one random
/// index; `index` maps every cell of the grid to its slot (if any) so
/// insert and remove are O(1) via swap-remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyPositions {
    cols: usize,
    slots: Vec<Position>,
    index: Vec<Option<usize>>,
}

impl EmptyPositions {
    /// Every cell of a `rows` x `cols` grid, in row-major order.
    pub fn full(rows: usize, cols: usize) -> Self {
        let slots: Vec<Position> = (0..rows * cols)
            .map(|i| Position::new(i / cols, i % cols))
            .collect();
        let index = (0..slots.len()).map(Some).collect();
        EmptyPositions { cols, slots, index }
    }

    pub fn from_grid(grid: &Grid) -> Self {
        let mut set = EmptyPositions {
            cols: grid.cols(),
            slots: Vec::with_capacity(grid.empty_count()),
            index: vec![None; grid.rows() * grid.cols()],
        };
        for pos in grid.empty_positions() {
            set.insert(pos);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index[self.cell(pos)].is_some()
    }

    /// Returns false if `pos` was already present.
    pub fn insert(&mut self, pos: Position) -> bool {
        let cell = self.cell(pos);
        if self.index[cell].is_some() {
            return false;
        }
        self.index[cell] = Some(self.slots.len());
        self.slots.push(pos);
        true
    }

    /// Returns false if `pos` was not present.
    pub fn remove(&mut self, pos: Position) -> bool {
        let cell = self.cell(pos);
        let Some(slot) = self.index[cell].take() else {
            return false;
        };
        self.slots.swap_remove(slot);
        if let Some(&moved) = self.slots.get(slot) {
            let moved_cell = self.cell(moved);
            self.index[moved_cell] = Some(slot);
        }
        true
    }

    /// Uniformly pick one member without removing it.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        if self.slots.is_empty() {
            return None;
        }
        Some(self.slots[rng.gen_range(0..self.slots.len())])
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.slots.iter().copied()
    }

    /// Members sorted row-major; handy for comparisons.
    pub fn sorted(&self) -> Vec<Position> {
        let mut out = self.slots.clone();
        out.sort();
        out
    }

    /// Whether this set is exactly the complement of the non-zero
    /// cells of `grid`.
    pub fn matches(&self, grid: &Grid) -> bool {
        self.len() == grid.empty_count() && grid.empty_positions().all(|p| self.contains(p))
    }

    fn cell(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }
}
