use std::fmt;
use std::ops::Index;

use grid::*;

use super::*;

/// Set of cells of a square grid, backed by a boolean matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Membership matrix, `true` for cells in the region.
    pub cells: Grid<bool>,
}

impl Region {
    /// Builds a region from a membership matrix.
    pub fn new(cells: Grid<bool>) -> Self {
        debug_assert!(cells.rows() == cells.cols(), "The membership matrix must be square.");
        Region { cells }
    }

    /// Region with no cells.
    pub fn empty(grid_size: usize) -> Self {
        Self::new(Grid::new(grid_size, grid_size))
    }

    /// Region covering the whole grid.
    pub fn full(grid_size: usize) -> Self {
        Self::new(Grid::init(grid_size, grid_size, true))
    }

    /// Region of the cells for which `pred(row, col)` holds.
    pub fn from_fn(grid_size: usize, pred: impl Fn(usize, usize) -> bool) -> Self {
        let mut cells = Grid::new(grid_size, grid_size);
        for row in 0..grid_size {
            for col in 0..grid_size {
                cells[(row, col)] = pred(row, col);
            }
        }
        Self::new(cells)
    }

    /// Region from an explicit cell list. Cells outside the grid are ignored.
    pub fn from_cells(grid_size: usize, cells: &[Cell]) -> Self {
        let mut region = Self::empty(grid_size);
        for &(row, col) in cells {
            if row < grid_size && col < grid_size {
                region.cells[(row, col)] = true;
            }
        }
        region
    }

    /// A single full row.
    pub fn row(grid_size: usize, row: usize) -> Self {
        Self::from_fn(grid_size, |r, _| r == row)
    }

    /// A single full column.
    pub fn column(grid_size: usize, col: usize) -> Self {
        Self::from_fn(grid_size, |_, c| c == col)
    }

    /// Side length of the underlying grid.
    pub fn grid_size(&self) -> usize {
        self.cells.rows()
    }

    /// Number of cells in the underlying grid.
    pub fn total_cells(&self) -> usize {
        self.grid_size() * self.grid_size()
    }

    /// Returns `true` if `(row, col)` is in the region. Out-of-grid cells never are.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cells.get(row, col).copied().unwrap_or(false)
    }

    /// Number of cells in the region.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&v| v)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&v| v)
    }

    /// Keeps only the cells also in `other`.
    pub fn intersect_with(&mut self, other: &Region) {
        let n = self.grid_size();
        for row in 0..n {
            for col in 0..n {
                if self.cells[(row, col)] && !other.contains(row, col) {
                    self.cells[(row, col)] = false;
                }
            }
        }
    }

    /// Intersection of `regions` on a grid of side `grid_size`; the full grid when there are none.
    pub fn intersection<'a>(grid_size: usize, regions: impl IntoIterator<Item = &'a Region>) -> Region {
        let mut res = Self::full(grid_size);
        for region in regions {
            res.intersect_with(region);
        }
        res
    }

    /// Iterator over the cells of the region in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .indexed_iter()
            .filter(|&(_, &v)| v)
            .map(|(cell, _)| cell)
    }
}

impl Index<Cell> for Region {
    type Output = bool;

    fn index(&self, index: Cell) -> &Self::Output {
        &self.cells[index]
    }
}

/// Column letters across the top, 1-based row numbers down the side.
impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.grid_size();
        write!(f, "   ")?;
        for col in 0..n {
            write!(f, "{}", column_letter(col))?;
        }
        writeln!(f)?;
        for row in 0..n {
            write!(f, "{:>2} ", row + 1)?;
            for col in 0..n {
                write!(f, "{}", if self.cells[(row, col)] { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Display letter of a 0-based column (`A` for 0); columns past `Z` show as `?`.
pub fn column_letter(col: usize) -> char {
    if col < 26 { (b'A' + col as u8) as char } else { '?' }
}
