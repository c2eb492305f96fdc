//! Scan converter
//!
//! Rows are walked top to bottom. A row with no edges is skipped, a row
//! whose active edges are all vertical and long enough is stepped in one
//! go (and repeated downwards while nothing changes), any other row is
//! sampled `SAMPLES_Y` times.

use log::trace;

use crate::active::{ActiveList, SubRowBuckets};
use crate::buffer::RowsMut;
use crate::cell::CellList;
use crate::clip::Rectangle;
use crate::edge::NIL;
use crate::error::Result;
use crate::fixed::{PointFixed, Trap, Trapezoid};
use crate::polygon::Polygon;
use crate::SpanSink;
use crate::SAMPLES_X;
use crate::SAMPLES_Y;

/// Trapezoid and polygon rasterizer for one target area
///
/// Built per call (or per worker row range), filled with geometry and
/// rendered once.
///
///     use tor::{Tor, Trapezoid, Rectangle, GRID_AREA};
///     let mut tor = Tor::new(&Rectangle::new(0, 0, 4, 2), 2).unwrap();
///     tor.add_trapezoid(&Trapezoid::rect(0, 0, 4, 2), 0, 0);
///     let mut spans = vec![];
///     tor.render(&mut |r: &Rectangle<i32>, c: i32| spans.push((*r, c)), false);
///     assert!(spans.iter().all(|&(_, c)| c == GRID_AREA));
///     let rows: i32 = spans.iter().map(|(r, _)| r.height()).sum();
///     assert_eq!(rows, 2);
///
#[derive(Debug)]
pub struct Tor {
    polygon: Polygon,
    coverages: CellList,
    extents: Rectangle<i32>,
}

impl Tor {
    /// Rasterizer for the pixels inside `extents`, with room for
    /// `num_edges` edges
    pub fn new(extents: &Rectangle<i32>, num_edges: usize) -> Result<Self> {
        trace!("tor {:?} edges {}", extents, num_edges);
        let coverages = CellList::new(extents.x1, extents.x2)?;
        let polygon = Polygon::new(num_edges,
                                   extents.y1 * SAMPLES_Y,
                                   extents.y2 * SAMPLES_Y)?;
        Ok(Self { polygon, coverages, extents: *extents })
    }

    pub fn extents(&self) -> &Rectangle<i32> {
        &self.extents
    }

    /// Number of edges added so far
    pub fn num_edges(&self) -> usize {
        self.polygon.num_edges()
    }

    /// Add a trapezoid, invalid ones are skipped
    ///
    /// `dx` and `dy` translate the geometry and are given in grid units,
    /// pixel offsets times `SAMPLES_X` and `SAMPLES_Y`.
    pub fn add_trapezoid(&mut self, t: &Trapezoid, dx: i32, dy: i32) {
        if !t.is_valid() {
            trace!("skipping invalid trapezoid {:?}", t);
            return;
        }
        self.polygon.add_edge(t, &t.left, 1, dx, dy);
        self.polygon.add_edge(t, &t.right, -1, dx, dy);
    }

    /// Add a single polygon edge
    pub fn add_line(&mut self, p1: &PointFixed, p2: &PointFixed, dx: i32, dy: i32) {
        self.polygon.add_line(p1, p2, dx, dy);
    }

    /// Add the outline of a triangle strip
    ///
    /// The strip's boundary alternates between a clockwise and a
    /// counter-clockwise side, closed by an edge between their last points.
    /// Needs two edges of capacity per point. Strips of fewer than three
    /// points are ignored.
    pub fn add_tristrip(&mut self, points: &[PointFixed], dx: i32, dy: i32) {
        let count = points.len();
        if count < 3 {
            return;
        }
        let (mut cw, mut ccw) = (0, 1);
        self.add_line(&points[ccw], &points[cw], dx, dy);
        let mut n = 2;
        loop {
            self.add_line(&points[cw], &points[n], dx, dy);
            cw = n;
            n += 1;
            if n == count {
                break;
            }
            self.add_line(&points[n], &points[ccw], dx, dy);
            ccw = n;
            n += 1;
            if n == count {
                break;
            }
        }
        self.add_line(&points[cw], &points[ccw], dx, dy);
    }

    /// Add a trapezoid given by its top and bottom spans
    pub fn add_trap(&mut self, t: &Trap, dx: i32, dy: i32) {
        let l = t.left();
        let r = t.right();
        self.add_line(&l.p1, &l.p2, dx, dy);
        self.add_line(&r.p1, &r.p2, dx, dy);
    }

    /// Rasterize and emit spans in row order, left to right
    ///
    /// With `unbounded` set, uncovered parts of the extents are emitted
    /// too, with zero coverage.
    pub fn render<S: SpanSink + ?Sized>(&mut self, sink: &mut S, unbounded: bool) {
        let h = self.extents.height();
        let mut buckets: SubRowBuckets = [NIL; SAMPLES_Y as usize];
        let mut i = 0;
        while i < h {
            let mut j = i + 1;
            let mut do_full_step = 0;
            let Polygon { edges, y_buckets, .. } = &mut self.polygon;
            let mut active = ActiveList::new(edges);

            if y_buckets[i as usize] == NIL {
                if active.is_empty() {
                    while y_buckets[j as usize] == NIL {
                        j += 1;
                    }
                    trace!("skipping rows {} -> {}", i, j);
                    if unbounded {
                        let mut r = self.extents;
                        r.y1 += i;
                        r.y2 = self.extents.y1 + j;
                        sink.span(&r, 0);
                    }
                    i = j;
                    continue;
                }
                do_full_step = active.can_full_step();
            }

            if do_full_step != 0 {
                active.nonzero_row(&mut self.coverages);
                while y_buckets[j as usize] == NIL && do_full_step >= 2 * SAMPLES_Y {
                    do_full_step -= SAMPLES_Y;
                    j += 1;
                }
                debug_assert!(j > i && j <= h);
                if j != i + 1 {
                    active.step_edges(j - (i + 1));
                }
                trace!("full step {} -> {}", i, j);
            } else {
                let ymin = (i + self.extents.y1) * SAMPLES_Y;
                active.fill_buckets(y_buckets[i as usize], ymin, &mut buckets);
                for b in buckets.iter_mut() {
                    if *b != NIL {
                        active.merge_edges(*b);
                        *b = NIL;
                    }
                    active.nonzero_subrow(&mut self.coverages);
                }
            }

            self.blt(sink, i, j - i, unbounded);
            self.coverages.reset();
            i = j;
        }
    }

    /// Turn the accumulated cells into spans for rows `[y, y + height)`
    fn blt<S: SpanSink + ?Sized>(&self, sink: &mut S, y: i32, height: i32, unbounded: bool) {
        let mut r = Rectangle {
            x1: self.extents.x1,
            y1: y + self.extents.y1,
            x2: self.extents.x1,
            y2: y + self.extents.y1 + height,
        };
        debug_assert!(r.y2 <= self.extents.y2);

        let mut cover = self.coverages.head_covered_height() * SAMPLES_X * 2;
        debug_assert!(cover >= 0);
        for cell in self.coverages.iter() {
            let x = cell.x;
            debug_assert!(x >= self.extents.x1 && x < self.extents.x2);
            if !cell.is_empty() {
                r.x2 = x;
                if r.x2 > r.x1 && (unbounded || cover != 0) {
                    sink.span(&r, cover);
                }
                r.x1 = r.x2;
                cover += cell.covered_height * SAMPLES_X * 2;
            }
            if cell.uncovered_area != 0 {
                let area = cover - cell.uncovered_area;
                r.x2 = x + 1;
                if unbounded || area != 0 {
                    sink.span(&r, area);
                }
                r.x1 = r.x2;
            }
        }

        r.x2 = self.extents.x2;
        if r.x2 > r.x1 && (unbounded || cover != 0) {
            sink.span(&r, cover);
        }
    }

    /// Accumulate coverage straight into 8-bit rows
    ///
    /// The extents must start at column 0 and be no wider than the rows.
    /// Every row of the extents is written, empty rows with zeros, and a
    /// pixel covered on every sample reaches exactly 255.
    pub fn render_inplace(&mut self, rows: &mut RowsMut<'_>) {
        debug_assert_eq!(self.extents.x1, 0);
        let width = self.extents.x2;
        let w = width as usize;
        let h = self.extents.height();
        let y0 = self.extents.y1;
        let mut buckets: SubRowBuckets = [NIL; SAMPLES_Y as usize];
        let mut i = 0;
        while i < h {
            let mut j = i + 1;
            let mut do_full_step = 0;
            let Polygon { edges, y_buckets, .. } = &mut self.polygon;
            let mut active = ActiveList::new(edges);

            if y_buckets[i as usize] == NIL {
                if active.is_empty() {
                    while y_buckets[j as usize] == NIL {
                        j += 1;
                    }
                    for y in i..j {
                        rows.row_mut(y0 + y)[..w].iter_mut().for_each(|p| *p = 0);
                    }
                    i = j;
                    continue;
                }
                do_full_step = active.can_full_step();
            }

            if do_full_step != 0 {
                let row = &mut rows.row_mut(y0 + i)[..w];
                row.iter_mut().for_each(|p| *p = 0);
                active.inplace_row(row, width);
                while y_buckets[j as usize] == NIL && do_full_step >= 2 * SAMPLES_Y {
                    do_full_step -= SAMPLES_Y;
                    rows.copy_row(y0 + i, y0 + j, w);
                    j += 1;
                }
                if j != i + 1 {
                    active.step_edges(j - (i + 1));
                }
            } else {
                let ymin = (i + y0) * SAMPLES_Y;
                active.fill_buckets(y_buckets[i as usize], ymin, &mut buckets);
                let row = &mut rows.row_mut(y0 + i)[..w];
                row.iter_mut().for_each(|p| *p = 0);
                for b in buckets.iter_mut() {
                    if *b != NIL {
                        active.merge_edges(*b);
                        *b = NIL;
                    }
                    active.inplace_subrow(row, width);
                }
            }
            i = j;
        }
    }
}
