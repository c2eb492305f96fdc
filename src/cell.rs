//! Coverage cells of one pixel row
//!
//! A cell accumulates, for one pixel column, how many sub-rows start
//! covering at this column (`covered_height`) and how much of the pixel
//! is left uncovered by spans starting inside it (`uncovered_area`).
//! Walking the cells left to right while summing `covered_height` gives
//! the coverage of the runs between cells.

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::math::grid_to_int_frac;
use crate::SAMPLES_X;
use crate::SAMPLES_Y;

/// Arena index of the head sentinel
pub const CELL_HEAD: usize = 0;
/// Arena index of the tail sentinel
pub const CELL_TAIL: usize = 1;

const NO_CELL: usize = usize::MAX;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Cell {
    pub next: usize,
    pub x: i32,
    pub uncovered_area: i32,
    pub covered_height: i32,
}

impl Cell {
    fn at(x: i32, next: usize) -> Self {
        Self { next, x, uncovered_area: 0, covered_height: 0 }
    }
    /// Nothing accumulated
    pub fn is_empty(&self) -> bool {
        self.covered_height == 0 && self.uncovered_area == 0
    }
}

/// Sparse, x-ordered list of the cells of one pixel row
///
/// Lookups must use non-decreasing x between calls to
/// [`rewind`](#method.rewind). Columns left of the list's range collapse
/// into the head sentinel, columns right of it into the tail sentinel.
#[derive(Debug)]
pub struct CellList {
    cursor: usize,
    cells: SmallVec<[Cell; 256]>,
    x1: i32,
    x2: i32,
    size: usize,
}

impl CellList {
    /// Cell list for pixel columns `[x1, x2)`
    pub fn new(x1: i32, x2: i32) -> Result<Self> {
        let size = (x2 - x1).max(0) as usize + 1;
        let mut cells = SmallVec::new();
        cells.try_reserve_exact(size + 2).map_err(|_| Error::OutOfMemory)?;
        cells.push(Cell::at(i32::min_value(), CELL_TAIL));
        cells.push(Cell::at(i32::max_value(), NO_CELL));
        Ok(Self { cursor: CELL_HEAD, cells, x1, x2, size })
    }

    /// Restart lookups from the left
    pub fn rewind(&mut self) {
        self.cursor = CELL_HEAD;
    }

    /// Drop all cells, ready for the next row
    pub fn reset(&mut self) {
        self.rewind();
        self.cells.truncate(2);
        let head = &mut self.cells[CELL_HEAD];
        head.next = CELL_TAIL;
        head.covered_height = 0;
        head.uncovered_area = 0;
    }

    /// Number of allocated cells, sentinels excluded
    pub fn len(&self) -> usize {
        self.cells.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coverage height carried in from the left of the list's range
    pub fn head_covered_height(&self) -> i32 {
        self.cells[CELL_HEAD].covered_height
    }

    /// Index of the cell for column `x`, allocating it if needed
    pub fn find(&mut self, x: i32) -> usize {
        if x >= self.x2 {
            return CELL_TAIL;
        }
        if x < self.x1 {
            return CELL_HEAD;
        }
        let mut tail = self.cursor;
        assert!(self.cells[tail].x <= x,
                "cell lookup out of order: {} after {}", x, self.cells[tail].x);
        if self.cells[tail].x == x {
            return tail;
        }
        tail = match self.look_ahead(tail, x) {
            Some(t) => t,
            None => {
                let mut t = tail;
                while self.cells[self.cells[t].next].x <= x {
                    t = self.cells[t].next;
                }
                t
            }
        };
        if self.cells[tail].x != x {
            tail = self.alloc(tail, x);
        }
        self.cursor = tail;
        tail
    }

    /// Last cell at or left of `x` when it lies within three hops of `from`
    fn look_ahead(&self, from: usize, x: i32) -> Option<usize> {
        let a = self.cells[from].next;
        if self.cells[a].x > x {
            return Some(from);
        }
        let b = self.cells[a].next;
        if self.cells[b].x > x {
            return Some(a);
        }
        let c = self.cells[b].next;
        if self.cells[c].x > x {
            return Some(b);
        }
        None
    }

    fn alloc(&mut self, after: usize, x: i32) -> usize {
        assert!(self.len() < self.size, "cell list capacity {} exceeded", self.size);
        let id = self.cells.len();
        let next = self.cells[after].next;
        self.cells.push(Cell::at(x, next));
        self.cells[after].next = id;
        id
    }

    /// Add a sub-row span covering grid columns `[x1, x2)`
    pub fn add_subspan(&mut self, x1: i32, x2: i32) {
        if x1 == x2 {
            return;
        }
        self.add(x1, x2, 1);
    }

    /// Add a span covering grid columns `[x1, x2)` on every sub-row
    pub fn add_span(&mut self, x1: i32, x2: i32) {
        self.add(x1, x2, SAMPLES_Y);
    }

    fn add(&mut self, x1: i32, x2: i32, rows: i32) {
        let (ix1, fx1) = grid_to_int_frac(x1, SAMPLES_X);
        let (ix2, fx2) = grid_to_int_frac(x2, SAMPLES_X);
        let c = self.find(ix1);
        if ix1 != ix2 {
            let cell = &mut self.cells[c];
            cell.uncovered_area += 2 * fx1 * rows;
            cell.covered_height += rows;
            let c = self.find(ix2);
            let cell = &mut self.cells[c];
            cell.uncovered_area -= 2 * fx2 * rows;
            cell.covered_height -= rows;
        } else {
            self.cells[c].uncovered_area += 2 * (fx1 - fx2) * rows;
        }
    }

    /// Cells in increasing x, sentinels excluded
    pub fn iter(&self) -> CellIter<'_> {
        CellIter { cells: &self.cells, cur: self.cells[CELL_HEAD].next }
    }
}

/// Iterator over the cells of a [`CellList`](struct.CellList.html)
pub struct CellIter<'a> {
    cells: &'a [Cell],
    cur: usize,
}

impl<'a> Iterator for CellIter<'a> {
    type Item = &'a Cell;
    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == CELL_TAIL {
            return None;
        }
        let c = &self.cells[self.cur];
        self.cur = c.next;
        Some(c)
    }
}
