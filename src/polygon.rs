//! Polygon edge table
//!
//! Edges are bucketed by the pixel row they start in. Within a bucket the
//! most recently added edge comes first.

use log::trace;
use smallvec::SmallVec;

use crate::edge::{Edge, HEAD, NIL, TAIL};
use crate::error::{Error, Result};
use crate::fixed::{LineFixed, PointFixed, Trapezoid};
use crate::math::{fixed_to_grid_x, fixed_to_grid_y, QuoRem};
use crate::SAMPLES_X;
use crate::SAMPLES_Y;

/// Terminal bucket entry, distinct from an empty bucket (`NIL`)
pub const BUCKET_END: usize = usize::MAX - 1;

/// Number of arena slots taken by the active list sentinels
const SENTINELS: usize = 2;

/// Edge table of a polygon clipped to the grid rows `[ymin, ymax)`
#[derive(Debug)]
pub struct Polygon {
    /// Edge arena, the first two entries are the active list sentinels
    pub edges: SmallVec<[Edge; 32]>,
    /// First edge of each pixel row, followed by `BUCKET_END`
    pub y_buckets: SmallVec<[usize; 64]>,
    pub ymin: i32,
    pub ymax: i32,
    capacity: usize,
}

fn bucket_index(y: i32, ymin: i32) -> usize {
    ((y - ymin) / SAMPLES_Y) as usize
}

impl Polygon {
    /// Empty polygon with room for `num_edges` edges
    ///
    /// Fails when the row range is too tall for the bucket arithmetic or
    /// when storage cannot be reserved.
    pub fn new(num_edges: usize, ymin: i32, ymax: i32) -> Result<Self> {
        let span = i64::from(ymax) - i64::from(ymin);
        if span > i64::from(i32::max_value() - SAMPLES_Y) {
            return Err(Error::ExtentTooLarge(span));
        }
        let num_buckets = if ymax > ymin {
            bucket_index(ymax - 1, ymin) + 1
        } else {
            0
        };

        let mut edges = SmallVec::new();
        edges.try_reserve_exact(num_edges + SENTINELS)
            .map_err(|_| Error::OutOfMemory)?;
        edges.push(Edge::sentinel(i32::min_value()));
        edges.push(Edge::sentinel(i32::max_value()));

        let mut y_buckets = SmallVec::new();
        y_buckets.try_reserve_exact(num_buckets + 1)
            .map_err(|_| Error::OutOfMemory)?;
        y_buckets.resize(num_buckets, NIL);
        y_buckets.push(BUCKET_END);

        let mut p = Self { edges, y_buckets, ymin, ymax, capacity: num_edges };
        p.reset_active();
        Ok(p)
    }

    /// Link the sentinels into an empty active list
    pub fn reset_active(&mut self) {
        self.edges[HEAD] = Edge::sentinel(i32::min_value());
        self.edges[TAIL] = Edge::sentinel(i32::max_value());
        self.edges[HEAD].next = TAIL;
        self.edges[TAIL].prev = HEAD;
    }

    /// Number of edges in the table
    pub fn num_edges(&self) -> usize {
        self.edges.len() - SENTINELS
    }

    /// Edge by arena index
    pub fn edge(&self, i: usize) -> &Edge {
        &self.edges[i]
    }

    /// Number of pixel rows covered by the buckets
    pub fn num_buckets(&self) -> usize {
        self.y_buckets.len() - 1
    }

    /// Edges starting in pixel row `row`, most recently added first
    pub fn bucket(&self, row: usize) -> BucketIter<'_> {
        BucketIter { edges: &self.edges, cur: self.y_buckets[row] }
    }

    /// Clip `[top, bottom)` to the table, empty ranges give `None`
    fn clip_rows(&self, top: i32, bottom: i32, dy: i32) -> Option<(i32, i32)> {
        let ytop = (fixed_to_grid_y(top) + dy).max(self.ymin);
        let ybot = (fixed_to_grid_y(bottom) + dy).min(self.ymax);
        if ybot <= ytop {
            None
        } else {
            Some((ytop, ybot))
        }
    }

    /// Add one side of a trapezoid
    ///
    /// The side is clipped to the trapezoid's top and bottom and to the
    /// table. `dir` is +1 for the left and -1 for the right side. `dx` and
    /// `dy` are offsets in grid units.
    pub fn add_edge(&mut self, t: &Trapezoid, line: &LineFixed, dir: i32, dx: i32, dy: i32) {
        debug_assert!(t.bottom > t.top);
        debug_assert!(line.p2.y > line.p1.y);
        let (ytop, ybot) = match self.clip_rows(t.top, t.bottom, dy) {
            Some(v) => v,
            None => return,
        };
        let e = new_edge(&line.p1, &line.p2, dir, ytop, ybot, dx, dy);
        self.insert(e);
    }

    /// Add a line between two points, in either direction
    ///
    /// Horizontal lines are ignored. A line that exactly cancels the
    /// previously added one removes it instead, which drops the degenerate
    /// triangles found in triangle strips.
    pub fn add_line(&mut self, p1: &PointFixed, p2: &PointFixed, dx: i32, dy: i32) {
        if p1.y == p2.y {
            return;
        }
        let (p1, p2, dir) = if p2.y < p1.y { (p2, p1, -1) } else { (p1, p2, 1) };
        let (ytop, ybot) = match self.clip_rows(p1.y, p2.y, dy) {
            Some(v) => v,
            None => return,
        };
        let e = new_edge(p1, p2, dir, ytop, ybot, dx, dy);

        if self.num_edges() > 0 {
            let last = self.edges.len() - 1;
            if e.cancels(&self.edges[last]) {
                trace!("drop cancelling line at row {}", e.ytop);
                let ix = bucket_index(e.ytop, self.ymin);
                self.y_buckets[ix] = self.edges[last].next;
                self.edges.pop();
                return;
            }
        }
        self.insert(e);
    }

    fn insert(&mut self, mut e: Edge) {
        assert!(self.num_edges() < self.capacity,
                "polygon edge capacity {} exceeded", self.capacity);
        debug_assert!(e.ytop < self.ymax);
        let ix = bucket_index(e.ytop, self.ymin);
        let id = self.edges.len();
        e.next = self.y_buckets[ix];
        e.prev = NIL;
        self.y_buckets[ix] = id;
        self.edges.push(e);
    }
}

/// Build an edge from `p1` down to `p2` covering grid rows `[ytop, ybot)`
///
/// The x position is evaluated at the centre of sub-row `ytop` using exact
/// 64-bit rational arithmetic. Vertical edges get a fixed cell and zero
/// slope.
fn new_edge(p1: &PointFixed, p2: &PointFixed, dir: i32, ytop: i32, ybot: i32,
            dx: i32, dy: i32) -> Edge {
    let mut e = Edge {
        next: NIL,
        prev: NIL,
        dir,
        height_left: ybot - ytop,
        cell: 0,
        ytop,
        x: QuoRem::default(),
        dxdy: QuoRem::default(),
        dy: 0,
    };
    if fixed_to_grid_x(p1.x) == fixed_to_grid_x(p2.x) {
        e.cell = fixed_to_grid_x(p1.x) + dx;
        return e;
    }

    let ex = (i64::from(p2.x) - i64::from(p1.x)) * i64::from(SAMPLES_X);
    let ey = (i64::from(p2.y) - i64::from(p1.y)) * i64::from(SAMPLES_Y) * (2 << 16);
    debug_assert!(ey > 0);
    e.dxdy = QuoRem::floor_div(ex * (2 << 16), ey);

    // Long lines overflow 64 bits here, the quotient itself fits
    let mut tmp = (2 * (i64::from(ytop) - i64::from(dy)) + 1) << 16;
    tmp -= i64::from(p1.y) * i64::from(SAMPLES_Y) * 2;
    e.x = QuoRem::floor_div_wide(i128::from(tmp) * i128::from(ex), ey);

    let tmp = i64::from(p1.x) * i64::from(SAMPLES_X);
    e.x.quo += (tmp >> 16) + i64::from(dx);
    let frac = tmp & 0xffff;
    if frac != 0 {
        e.x.rem += ((i128::from(frac) * i128::from(ey)) >> 16) as i64;
        if e.x.rem >= ey {
            e.x.quo += 1;
            e.x.rem -= ey;
        }
    }
    debug_assert!(e.x.rem >= 0 && e.x.rem < ey);

    e.dy = ey;
    e.cell = e.to_cell();
    trace!("edge {}.{} + {}.{} / {} -> cell {}",
           e.x.quo, e.x.rem, e.dxdy.quo, e.dxdy.rem, ey, e.cell);
    e
}

/// Iterator over the edges of one y-bucket
pub struct BucketIter<'a> {
    edges: &'a [Edge],
    cur: usize,
}

impl<'a> Iterator for BucketIter<'a> {
    type Item = &'a Edge;
    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == NIL || self.cur == BUCKET_END {
            return None;
        }
        let e = &self.edges[self.cur];
        self.cur = e.next;
        Some(e)
    }
}
