//! Polygon edges

use crate::math::QuoRem;

/// Link value marking the end of a list
pub const NIL: usize = usize::MAX;

/// Arena index of the active list head sentinel
pub const HEAD: usize = 0;
/// Arena index of the active list tail sentinel
pub const TAIL: usize = 1;

/// Edge of a polygon, walked downwards one grid row at a time
///
/// Edges live in an arena owned by the polygon and are linked by index.
/// The same `next` / `prev` fields serve the y-bucket lists, the
/// sub-row buckets and the active list.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub next: usize,
    pub prev: usize,
    /// +1 for downward, -1 for upward edges
    pub dir: i32,
    /// Grid rows remaining before the edge ends
    pub height_left: i32,
    /// Current grid column, `x` rounded to nearest
    pub cell: i32,
    /// First grid row covered
    pub ytop: i32,
    /// Exact grid x at the current sub-row centre, over `dy`
    pub x: QuoRem,
    /// Change of `x` per grid row, over `dy`
    pub dxdy: QuoRem,
    /// Denominator of `x` and `dxdy`, 0 for vertical edges
    pub dy: i64,
}

impl Edge {
    /// Sentinel edge with the given cell, never removed and never advanced
    pub fn sentinel(cell: i32) -> Self {
        Self {
            next: NIL,
            prev: NIL,
            dir: 0,
            height_left: i32::max_value(),
            cell,
            ytop: 0,
            x: QuoRem { quo: i64::from(cell), rem: 0 },
            dxdy: QuoRem::default(),
            dy: 0,
        }
    }
    /// Nearest grid column of `x`
    pub fn to_cell(&self) -> i32 {
        self.x.round(self.dy) as i32
    }
    /// Step `x` down one grid row and recompute the cell
    pub fn advance(&mut self) -> i32 {
        self.x.advance(&self.dxdy, self.dy);
        debug_assert!(self.x.rem >= 0 && self.x.rem < self.dy);
        self.cell = self.to_cell();
        self.cell
    }
    /// Exact opposite of `other`: same geometry, opposite direction
    ///
    /// Such a pair contributes nothing to the winding number.
    pub fn cancels(&self, other: &Edge) -> bool {
        self.dir == -other.dir &&
            self.ytop == other.ytop &&
            self.height_left == other.height_left &&
            self.cell == other.cell &&
            self.x == other.x &&
            self.dxdy == other.dxdy
    }
}
