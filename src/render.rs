//! Span sinks
//!
//! Consumers of the `(box, coverage)` spans produced by
//! [`Tor::render`](../raster/struct.Tor.html#method.render). Each sink is
//! one strategy for getting coverage onto the destination: through a
//! compositing backend, batched per worker thread, clipped against a
//! region, or written into an 8-bit mask.

use log::trace;
use smallvec::SmallVec;

use crate::buffer::RowsMut;
use crate::clip::{find_clip_box_for_y, for_each_clipped, Rectangle};
use crate::composite::{CompositeSpans, Damage, OpacityBox};
use crate::math::{area_to_float, to_alpha};
use crate::SpanSink;

/// Spans sent one by one to a compositing backend
///
/// With damage attached, every span is also recorded, shifted by the
/// destination offset.
pub struct DirectSpan<'a, O: CompositeSpans + ?Sized> {
    op: &'a O,
    damage: Option<(&'a mut Damage, i32, i32)>,
}

impl<'a, O: CompositeSpans + ?Sized> DirectSpan<'a, O> {
    pub fn new(op: &'a O) -> Self {
        Self { op, damage: None }
    }
    /// Also record spans in `damage`, offset by (dx, dy)
    pub fn with_damage(op: &'a O, damage: &'a mut Damage, dx: i32, dy: i32) -> Self {
        Self { op, damage: Some((damage, dx, dy)) }
    }
}

impl<'a, O: CompositeSpans + ?Sized> SpanSink for DirectSpan<'a, O> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        self.op.composite_box(r, area_to_float(coverage));
        if let Some((damage, dx, dy)) = self.damage.as_mut() {
            damage.add_translated(r, *dx, *dy);
        }
    }
}

/// Spans split against a complex clip and sent as one batch per span
pub struct RegionSpan<'a, O: CompositeSpans + ?Sized> {
    op: &'a O,
    clip: &'a [Rectangle<i32>],
    damage: Option<(&'a mut Damage, i32, i32)>,
    pieces: SmallVec<[Rectangle<i32>; 16]>,
}

impl<'a, O: CompositeSpans + ?Sized> RegionSpan<'a, O> {
    pub fn new(op: &'a O, clip: &'a [Rectangle<i32>]) -> Self {
        Self { op, clip, damage: None, pieces: SmallVec::new() }
    }
    /// Also record spans in `damage`, offset by (dx, dy)
    pub fn with_damage(op: &'a O, clip: &'a [Rectangle<i32>],
                       damage: &'a mut Damage, dx: i32, dy: i32) -> Self {
        Self { op, clip, damage: Some((damage, dx, dy)), pieces: SmallVec::new() }
    }
}

impl<'a, O: CompositeSpans + ?Sized> SpanSink for RegionSpan<'a, O> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        let pieces = &mut self.pieces;
        pieces.clear();
        for_each_clipped(self.clip, r, |p| pieces.push(*p));
        if pieces.is_empty() {
            return;
        }
        self.op.composite_boxes(pieces, area_to_float(coverage));
        if let Some((damage, dx, dy)) = self.damage.as_mut() {
            for p in pieces.iter() {
                damage.add_translated(p, *dx, *dy);
            }
        }
    }
}

/// Clips spans against a set of y-banded boxes before passing them on
pub struct ClippedSpan<'a, S: SpanSink> {
    inner: S,
    clip: &'a [Rectangle<i32>],
}

impl<'a, S: SpanSink> ClippedSpan<'a, S> {
    pub fn new(inner: S, clip: &'a [Rectangle<i32>]) -> Self {
        Self { inner, clip }
    }
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<'a, S: SpanSink> SpanSink for ClippedSpan<'a, S> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        let inner = &mut self.inner;
        for_each_clipped(self.clip, r, |p| inner.span(p, coverage));
    }
}

/// Capacity of one worker's box batch
pub const SPAN_THREAD_MAX_BOXES: usize = 8192 / std::mem::size_of::<OpacityBox>();

/// Per worker batch of boxes, flushed through
/// [`CompositeSpans::thread_boxes`](../composite/trait.CompositeSpans.html#method.thread_boxes)
///
/// Spans must arrive in row order, which [`Tor::render`] guarantees. An
/// unclipped span that continues the previous box one row down, with the
/// same columns and opacity, extends that box instead of starting a new
/// one. With a clip, the search for the first clip box only moves
/// forward.
///
/// [`Tor::render`]: ../raster/struct.Tor.html#method.render
pub struct ThreadBoxes<'a, O: CompositeSpans + ?Sized> {
    op: &'a O,
    clip: Option<&'a [Rectangle<i32>]>,
    clip_start: usize,
    boxes: Vec<OpacityBox>,
    last_y1: i32,
}

impl<'a, O: CompositeSpans + ?Sized> ThreadBoxes<'a, O> {
    pub fn new(op: &'a O) -> Self {
        Self {
            op,
            clip: None,
            clip_start: 0,
            boxes: Vec::with_capacity(SPAN_THREAD_MAX_BOXES),
            last_y1: i32::min_value(),
        }
    }
    /// Batch that clips every span against `clip` first
    pub fn clipped(op: &'a O, clip: &'a [Rectangle<i32>]) -> Self {
        Self { clip: Some(clip), .. Self::new(op) }
    }
    /// Boxes waiting to be flushed
    pub fn pending(&self) -> &[OpacityBox] {
        &self.boxes
    }
    fn add_box(&mut self, r: &Rectangle<i32>, alpha: f32) {
        if self.boxes.len() == SPAN_THREAD_MAX_BOXES {
            self.flush();
        }
        self.boxes.push(OpacityBox { bounds: *r, alpha });
    }
    /// Send the pending boxes to the backend
    pub fn flush(&mut self) {
        if self.boxes.is_empty() {
            return;
        }
        trace!("flushing {} boxes", self.boxes.len());
        self.op.thread_boxes(&self.boxes);
        self.boxes.clear();
    }
}

impl<'a, O: CompositeSpans + ?Sized> SpanSink for ThreadBoxes<'a, O> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        debug_assert!(r.y1 >= self.last_y1, "spans out of row order");
        self.last_y1 = r.y1;
        let alpha = area_to_float(coverage);

        if let Some(clip) = self.clip {
            self.clip_start += find_clip_box_for_y(&clip[self.clip_start..], r.y1);
            for c in &clip[self.clip_start..] {
                if r.y2 <= c.y1 {
                    break;
                }
                if let Some(piece) = r.intersect(c) {
                    self.add_box(&piece, alpha);
                }
            }
            return;
        }

        if let Some(last) = self.boxes.last_mut() {
            if last.bounds.x1 == r.x1 && last.bounds.x2 == r.x2 &&
                last.bounds.y2 == r.y1 && last.alpha == alpha {
                last.bounds.y2 = r.y2;
                return;
            }
        }
        self.add_box(r, alpha);
    }
}

/// Coverage written as 8-bit alpha into a mask
///
/// Span coordinates are mask pixel coordinates.
pub struct MaskSpan<'a, 'b> {
    rows: &'a mut RowsMut<'b>,
}

impl<'a, 'b> MaskSpan<'a, 'b> {
    pub fn new(rows: &'a mut RowsMut<'b>) -> Self {
        Self { rows }
    }
}

impl<'a, 'b> SpanSink for MaskSpan<'a, 'b> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        let a = to_alpha(coverage);
        if r.width() == 1 {
            for y in r.y1..r.y2 {
                self.rows.row_mut(y)[r.x1 as usize] = a;
            }
            return;
        }
        for y in r.y1..r.y2 {
            for p in self.rows.pixels_mut(y, r.x1, r.x2) {
                *p = a;
            }
        }
    }
}
