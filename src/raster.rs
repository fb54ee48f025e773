// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A flat, row-major grid of numbers.  Both the escape rasters and
//! the orbit histograms are grids; the only difference is what lives
//! in each cell.

use std::ops::{Index, IndexMut};

/// A width x height block of cells, stored row by row.  The
/// dimensions are fixed when the grid is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Continuous escape values, or normalized intensities.
pub type Raster = Grid<f64>;

/// Visit counts from the orbit sampler.
pub type OrbitHistogram = Grid<u32>;

impl<T: Copy + Default> Grid<T> {
    /// An empty grid: every cell holds the default (zero) value.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![T::default(); width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer.  Returns `None` when the
    /// buffer doesn't hold exactly width x height cells.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(Grid {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cells, row by row.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// The cells, row by row, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// One row of the grid.
    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) is outside a {}x{} grid",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }
}

/// How two cells of the same pixel combine when partial grids are
/// merged.
pub trait Accumulate: Copy {
    /// The combined value.
    fn combine(self, other: Self) -> Self;
}

impl Accumulate for f64 {
    fn combine(self, other: f64) -> f64 {
        self + other
    }
}

// Visit counts pin at the maximum rather than wrapping.
impl Accumulate for u32 {
    fn combine(self, other: u32) -> u32 {
        self.saturating_add(other)
    }
}

impl<T: Accumulate> Grid<T> {
    /// Elementwise sum of another grid of the same shape into this
    /// one.  This is the only merge a pool round ever performs, and
    /// since it is associative and commutative the order in which
    /// workers report back doesn't matter.
    pub fn accumulate(&mut self, other: &Grid<T>) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "cannot merge grids of different shapes"
        );
        for (cell, add) in self.cells.iter_mut().zip(other.cells.iter()) {
            *cell = cell.combine(*add);
        }
    }
}

impl Raster {
    /// Largest cell, or `None` for an empty raster.
    pub fn max(&self) -> Option<f64> {
        self.cells.iter().cloned().fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
    }

    /// Smallest cell, or `None` for an empty raster.
    pub fn min(&self) -> Option<f64> {
        self.cells.iter().cloned().fold(None, |acc, v| match acc {
            Some(m) if m <= v => Some(m),
            _ => Some(v),
        })
    }
}

impl OrbitHistogram {
    /// The counts as floating point, ready for normalization.
    pub fn to_raster(&self) -> Raster {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(|&c| f64::from(c)).collect(),
        }
    }

    /// Total number of recorded visits.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| u64::from(c)).sum()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        let offset = self.offset(x, y);
        &self.cells[offset]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        let offset = self.offset(x, y);
        &mut self.cells[offset]
    }
}
