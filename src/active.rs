//! Active edge list
//!
//! The edges crossing the current scan line, kept sorted by their cell
//! between two permanent sentinels. New edges arrive in per sub-row
//! batches which are sorted, cleaned of cancelling pairs and merged in
//! one linear pass.

use crate::cell::CellList;
use crate::edge::{Edge, HEAD, NIL, TAIL};
use crate::math::grid_to_int_frac;
use crate::polygon::BUCKET_END;
use crate::SAMPLES_X;
use crate::SAMPLES_Y;

/// Sub-row buckets of one pixel row
pub type SubRowBuckets = [usize; SAMPLES_Y as usize];

/// View of the active list stored in a polygon's edge arena
pub struct ActiveList<'a> {
    edges: &'a mut [Edge],
}

impl<'a> ActiveList<'a> {
    /// Wrap an edge arena whose first two entries are the sentinels
    pub fn new(edges: &'a mut [Edge]) -> Self {
        debug_assert!(edges.len() >= 2);
        Self { edges }
    }

    /// No edges between the sentinels
    pub fn is_empty(&self) -> bool {
        self.edges[HEAD].next == TAIL
    }

    /// Edges in list order
    pub fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        let edges = &*self.edges;
        let mut cur = edges[HEAD].next;
        std::iter::from_fn(move || {
            if cur == TAIL {
                return None;
            }
            let e = &edges[cur];
            cur = e.next;
            Some(e)
        })
    }

    /// Rows the whole list can advance without sub-sampling
    ///
    /// Only lists made entirely of vertical edges, none ending within the
    /// next pixel row, qualify. Returns the smallest remaining height, or 0.
    pub fn can_full_step(&self) -> i32 {
        debug_assert!(!self.is_empty());
        let mut min_height = i32::max_value();
        for e in self.iter() {
            debug_assert!(e.height_left > 0);
            if e.dy != 0 {
                return 0;
            }
            if e.height_left < min_height {
                min_height = e.height_left;
                if min_height < SAMPLES_Y {
                    return 0;
                }
            }
        }
        min_height
    }

    /// Distribute a pixel row bucket over the sub-rows it starts on
    ///
    /// `ymin` is the first grid row of the pixel row.
    pub fn fill_buckets(&mut self, mut edge: usize, ymin: i32, buckets: &mut SubRowBuckets) {
        while edge != NIL && edge != BUCKET_END {
            let next = self.edges[edge].next;
            let b = &mut buckets[(self.edges[edge].ytop - ymin) as usize];
            self.edges[edge].next = *b;
            self.edges[edge].prev = NIL;
            *b = edge;
            edge = next;
        }
    }

    /// Merge an unsorted batch of new edges into the list
    pub fn merge_edges(&mut self, batch: usize) {
        if batch == NIL {
            return;
        }
        let (sorted, rest) = self.sort(batch, u32::max_value());
        debug_assert_eq!(rest, NIL);
        let filtered = self.filter(sorted);
        self.merge_sorted(filtered);
    }

    /// Merge two `next`-linked sorted lists, ties taken from `a` first
    fn merge_lists(&mut self, mut a: usize, mut b: usize) -> usize {
        let mut head = NIL;
        let mut tail = NIL;
        while a != NIL && b != NIL {
            let take = if self.edges[a].cell <= self.edges[b].cell {
                let t = a;
                a = self.edges[a].next;
                t
            } else {
                let t = b;
                b = self.edges[b].next;
                t
            };
            if tail == NIL {
                head = take;
            } else {
                self.edges[tail].next = take;
            }
            tail = take;
        }
        let rest = if a != NIL { a } else { b };
        if tail == NIL {
            return rest;
        }
        self.edges[tail].next = rest;
        head
    }

    /// Bottom-up merge sort of a `next`-linked list
    ///
    /// Sorts up to `2^(level+1)` leading edges, returning the sorted head
    /// and the unsorted remainder.
    fn sort(&mut self, list: usize, level: u32) -> (usize, usize) {
        let other = self.edges[list].next;
        if other == NIL {
            return (list, NIL);
        }
        let mut remaining = self.edges[other].next;
        let mut head;
        if self.edges[list].cell <= self.edges[other].cell {
            head = list;
            self.edges[other].next = NIL;
        } else {
            head = other;
            self.edges[other].next = list;
            self.edges[list].next = NIL;
        }
        let mut i = 0;
        while i < level && remaining != NIL {
            let (sorted, rest) = self.sort(remaining, i);
            head = self.merge_lists(head, sorted);
            remaining = rest;
            i += 1;
        }
        (head, remaining)
    }

    /// Drop adjacent pairs of edges that cancel each other
    fn filter(&mut self, list: usize) -> usize {
        let mut head = NIL;
        let mut tail = NIL;
        let mut e = list;
        while e != NIL {
            let n = self.edges[e].next;
            if n != NIL && self.edges[e].cancels(&self.edges[n]) {
                e = self.edges[n].next;
                continue;
            }
            if tail == NIL {
                head = e;
            } else {
                self.edges[tail].next = e;
            }
            tail = e;
            e = n;
        }
        if tail != NIL {
            self.edges[tail].next = NIL;
        }
        head
    }

    /// Splice a sorted `next`-linked list into the active list
    fn merge_sorted(&mut self, mut b: usize) {
        let mut prev = HEAD;
        let mut a = self.edges[HEAD].next;
        while b != NIL {
            let next_b = self.edges[b].next;
            let x = self.edges[b].cell;
            while a != TAIL && self.edges[a].cell <= x {
                prev = a;
                a = self.edges[a].next;
            }
            self.edges[prev].next = b;
            self.edges[b].prev = prev;
            self.edges[b].next = a;
            self.edges[a].prev = b;
            prev = b;
            b = next_b;
        }
    }

    fn unlink(&mut self, e: usize) {
        let (prev, next) = (self.edges[e].prev, self.edges[e].next);
        self.edges[prev].next = next;
        self.edges[next].prev = prev;
    }

    /// Move `e` back to its sorted position among the edges before it
    fn relocate(&mut self, e: usize) {
        self.unlink(e);
        let cell = self.edges[e].cell;
        let mut pos = self.edges[e].prev;
        while cell < self.edges[pos].cell {
            pos = self.edges[pos].prev;
        }
        let after = self.edges[pos].next;
        self.edges[e].prev = pos;
        self.edges[e].next = after;
        self.edges[pos].next = e;
        self.edges[after].prev = e;
    }

    /// Advance `e` one sub-row, dropping it when it ends
    ///
    /// `prev_x` is the cell of the last edge already advanced on this
    /// sub-row. An edge that crossed it is moved back into order.
    fn step_subrow(&mut self, e: usize, prev_x: &mut i32) {
        let edge = &mut self.edges[e];
        debug_assert!(edge.height_left > 0);
        edge.height_left -= 1;
        if edge.height_left == 0 {
            self.unlink(e);
            return;
        }
        if edge.dy != 0 {
            edge.advance();
        }
        let cell = edge.cell;
        if cell < *prev_x {
            self.relocate(e);
        } else {
            *prev_x = cell;
        }
    }

    /// Advance `e` a whole pixel row, dropping it when it ends
    fn step_row(&mut self, e: usize) {
        let edge = &mut self.edges[e];
        edge.height_left -= SAMPLES_Y;
        debug_assert!(edge.height_left >= 0);
        if edge.height_left == 0 {
            self.unlink(e);
        }
    }

    /// Accumulate one sub-row of non-zero winding coverage and advance
    ///
    /// Spans that touch are merged into one.
    pub fn nonzero_subrow(&mut self, cells: &mut CellList) {
        let mut edge = self.edges[HEAD].next;
        let mut prev_x = i32::min_value();
        let mut winding = 0;
        let mut xstart = self.edges[edge].cell;

        cells.rewind();
        while edge != TAIL {
            let next = self.edges[edge].next;
            winding += self.edges[edge].dir;
            let cell = self.edges[edge].cell;
            if winding == 0 && self.edges[next].cell != cell {
                cells.add_subspan(xstart, cell);
                xstart = self.edges[next].cell;
            }
            self.step_subrow(edge, &mut prev_x);
            edge = next;
        }
    }

    /// Accumulate a full pixel row of coverage from vertical edges
    pub fn nonzero_row(&mut self, cells: &mut CellList) {
        let mut left = self.edges[HEAD].next;
        while left != TAIL {
            let mut winding = self.edges[left].dir;
            self.step_row(left);
            let mut right = self.edges[left].next;
            loop {
                debug_assert!(right != TAIL, "unbalanced winding");
                if right == TAIL {
                    return;
                }
                self.step_row(right);
                winding += self.edges[right].dir;
                if winding == 0 {
                    break;
                }
                right = self.edges[right].next;
            }
            cells.add_span(self.edges[left].cell, self.edges[right].cell);
            left = self.edges[right].next;
        }
    }

    /// Advance every edge by `count` pixel rows
    pub fn step_edges(&mut self, count: i32) {
        let count = count * SAMPLES_Y;
        let mut e = self.edges[HEAD].next;
        while e != TAIL {
            let next = self.edges[e].next;
            self.edges[e].height_left -= count;
            debug_assert!(self.edges[e].height_left >= 0);
            if self.edges[e].height_left == 0 {
                self.unlink(e);
            }
            e = next;
        }
    }

    /// Full pixel row of coverage written straight into an 8-bit row
    ///
    /// Only spans separated by a gap close, touching spans are merged.
    pub fn inplace_row(&mut self, row: &mut [u8], width: i32) {
        let mut left = self.edges[HEAD].next;
        while left != TAIL {
            let mut winding = self.edges[left].dir;
            self.step_row(left);
            let mut right = self.edges[left].next;
            loop {
                debug_assert!(right != TAIL, "unbalanced winding");
                if right == TAIL {
                    return;
                }
                self.step_row(right);
                winding += self.edges[right].dir;
                let next = self.edges[right].next;
                if winding == 0 && self.edges[right].cell != self.edges[next].cell {
                    break;
                }
                right = next;
            }

            let (mut lix, lfx) = clamp_cell(self.edges[left].cell, width);
            let (rix, rfx) = clamp_cell(self.edges[right].cell, width);
            if lix == rix {
                if rfx != lfx {
                    let p = &mut row[lix as usize];
                    *p = p.wrapping_add(((rfx - lfx) * SAMPLES_Y) as u8);
                }
            } else {
                let p = &mut row[lix as usize];
                if lfx == 0 {
                    *p = 0xff;
                } else {
                    *p = p.wrapping_add((255 - lfx * SAMPLES_Y) as u8);
                }
                if rfx != 0 {
                    let p = &mut row[rix as usize];
                    *p = p.wrapping_add((rfx * SAMPLES_Y) as u8);
                }
                lix += 1;
                if rix > lix {
                    for p in &mut row[lix as usize..rix as usize] {
                        *p = 0xff;
                    }
                }
            }
            left = self.edges[right].next;
        }
    }

    /// One sub-row of coverage added straight into an 8-bit row
    ///
    /// Each full pixel gains `SAMPLES_X`, so a pixel covered on every
    /// sub-row reaches exactly 255.
    pub fn inplace_subrow(&mut self, row: &mut [u8], width: i32) {
        let mut edge = self.edges[HEAD].next;
        let mut prev_x = i32::min_value();
        while edge != TAIL {
            let mut next = self.edges[edge].next;
            let mut winding = self.edges[edge].dir;
            let (mut lix, lfx) = clamp_cell(self.edges[edge].cell, width);
            self.step_subrow(edge, &mut prev_x);
            edge = next;

            loop {
                debug_assert!(edge != TAIL, "unbalanced winding");
                if edge == TAIL {
                    return;
                }
                next = self.edges[edge].next;
                winding += self.edges[edge].dir;
                if winding == 0 && self.edges[edge].cell != self.edges[next].cell {
                    break;
                }
                self.step_subrow(edge, &mut prev_x);
                edge = next;
            }

            let (rix, rfx) = clamp_cell(self.edges[edge].cell, width);
            self.step_subrow(edge, &mut prev_x);
            edge = next;

            if lix == rix {
                if rfx != lfx {
                    let p = &mut row[lix as usize];
                    *p = p.wrapping_add((rfx - lfx) as u8);
                }
            } else {
                let p = &mut row[lix as usize];
                *p = p.wrapping_add((SAMPLES_X - lfx) as u8);
                if rfx != 0 {
                    let p = &mut row[rix as usize];
                    *p = p.wrapping_add(rfx as u8);
                }
                lix += 1;
                while lix < rix {
                    let p = &mut row[lix as usize];
                    *p = p.wrapping_add(SAMPLES_X as u8);
                    lix += 1;
                }
            }
        }
    }
}

/// Pixel and grid fraction of a cell, clamped to `[0, width]`
fn clamp_cell(cell: i32, width: i32) -> (i32, i32) {
    if cell < 0 {
        (0, 0)
    } else if cell >= width * SAMPLES_X {
        (width, 0)
    } else {
        grid_to_int_frac(cell, SAMPLES_X)
    }
}
