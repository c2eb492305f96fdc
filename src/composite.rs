//! Compositing backend contract
//!
//! The rasterizer does not know how boxes become pixels. It hands them to
//! a [`CompositeSpans`](trait.CompositeSpans.html) implementation, which
//! may be a GPU command stream or a software compositor.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::clip::Rectangle;

/// Render compositing operators
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    Clear,
    Src,
    Dst,
    Over,
    OverReverse,
    In,
    InReverse,
    Out,
    OutReverse,
    Atop,
    AtopReverse,
    Xor,
    Add,
    Saturate,
}

impl Operator {
    /// Leaves the destination untouched where the mask is zero
    ///
    /// Unbounded operators have to be fed zero coverage spans for the
    /// uncovered parts of the operation extents.
    pub fn is_bounded(self) -> bool {
        match self {
            Operator::Over | Operator::OutReverse | Operator::Add => true,
            _ => false,
        }
    }
}

/// Box together with its opacity
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OpacityBox {
    pub bounds: Rectangle<i32>,
    pub alpha: f32,
}

/// Spans compositing capability of a backend
///
/// Methods take `&self` so that worker threads can share one backend.
/// Opacities are in `[0, 1]`.
pub trait CompositeSpans: Sync {
    /// Prepare to composite with `op` inside `extents`
    ///
    /// Returning false declines the operation before any span is sent.
    fn begin(&self, op: Operator, extents: &Rectangle<i32>) -> bool {
        let _ = (op, extents);
        true
    }
    /// Composite one box
    fn composite_box(&self, r: &Rectangle<i32>, opacity: f32);
    /// Composite several boxes with the same opacity
    fn composite_boxes(&self, boxes: &[Rectangle<i32>], opacity: f32) {
        for r in boxes {
            self.composite_box(r, opacity);
        }
    }
    /// Composite a batch of boxes from a worker thread
    ///
    /// Called concurrently from several workers. Boxes from one worker
    /// arrive in row order; there is no order between workers.
    fn thread_boxes(&self, boxes: &[OpacityBox]) {
        for b in boxes {
            self.composite_box(&b.bounds, b.alpha);
        }
    }
    /// Whether [`thread_boxes`](#method.thread_boxes) is safe to call
    /// from worker threads
    fn has_thread_boxes(&self) -> bool {
        false
    }
    /// All boxes of the operation have been sent
    fn done(&self) {}
}

/// Destination damage accumulator
///
/// Collects every region written, in destination pixmap coordinates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Damage {
    boxes: Vec<Rectangle<i32>>,
    extents: Option<Rectangle<i32>>,
}

impl Damage {
    pub fn new() -> Self {
        Self::default()
    }
    /// Record `r`, ignoring empty boxes
    pub fn add_box(&mut self, r: &Rectangle<i32>) {
        if r.is_empty() {
            return;
        }
        self.extents = Some(match self.extents {
            Some(e) => e.union(r),
            None => *r,
        });
        self.boxes.push(*r);
    }
    /// Record `r` shifted by (dx, dy)
    pub fn add_translated(&mut self, r: &Rectangle<i32>, dx: i32, dy: i32) {
        self.add_box(&r.translate(dx, dy));
    }
    pub fn boxes(&self) -> &[Rectangle<i32>] {
        &self.boxes
    }
    /// Bounds of everything damaged so far
    pub fn extents(&self) -> Option<Rectangle<i32>> {
        self.extents
    }
    /// Total damaged area, overlaps counted twice
    pub fn area(&self) -> i64 {
        self.boxes.iter()
            .map(|b| i64::from(b.width()) * i64::from(b.height()))
            .sum()
    }
}

/// Count of compositing operations in flight
///
/// Shared buffers must not be reused while operations are active;
/// [`wait_idle`](#method.wait_idle) blocks until the count drops to zero.
#[derive(Debug, Default)]
pub struct ActiveOps {
    active: Mutex<usize>,
    idle: Condvar,
}

impl ActiveOps {
    pub fn new() -> Self {
        Self::default()
    }
    fn lock(&self) -> MutexGuard<'_, usize> {
        // A panicking worker leaves the count consistent, keep going
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
    /// Register an operation, released when the guard drops
    pub fn acquire(&self) -> ActiveGuard<'_> {
        *self.lock() += 1;
        ActiveGuard { ops: self }
    }
    fn release(&self) {
        let mut active = self.lock();
        debug_assert!(*active > 0);
        *active -= 1;
        if *active == 0 {
            self.idle.notify_all();
        }
    }
    /// Number of operations in flight
    pub fn active(&self) -> usize {
        *self.lock()
    }
    /// Block until no operation is active
    ///
    /// Returns whether anything was in flight when called.
    pub fn wait_idle(&self) -> bool {
        let mut active = self.lock();
        let was_active = *active > 0;
        while *active > 0 {
            active = self.idle.wait(active).unwrap_or_else(|e| e.into_inner());
        }
        was_active
    }
}

/// Registration of one in-flight operation
#[derive(Debug)]
pub struct ActiveGuard<'a> {
    ops: &'a ActiveOps,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.ops.release();
    }
}

/// Backend that records boxes instead of drawing them
///
/// Useful for inspecting rasterizer output. Worker batches are accepted
/// concurrently; [`take`](#method.take) waits for in-flight batches.
///
///     use tor::{BoxRecorder, CompositeSpans, Rectangle};
///     let rec = BoxRecorder::new();
///     rec.composite_box(&Rectangle::new(0, 0, 2, 1), 0.5);
///     let boxes = rec.take();
///     assert_eq!(boxes.len(), 1);
///     assert_eq!(boxes[0].alpha, 0.5);
///
#[derive(Debug, Default)]
pub struct BoxRecorder {
    boxes: Mutex<Vec<OpacityBox>>,
    operator: Mutex<Option<Operator>>,
    ops: ActiveOps,
    threaded: bool,
    done: Mutex<usize>,
}

impl BoxRecorder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Recorder accepting worker batches
    pub fn threaded() -> Self {
        Self { threaded: true, .. Self::default() }
    }
    fn boxes(&self) -> MutexGuard<'_, Vec<OpacityBox>> {
        self.boxes.lock().unwrap_or_else(|e| e.into_inner())
    }
    /// Operator of the last [`begin`](trait.CompositeSpans.html#method.begin)
    pub fn operator(&self) -> Option<Operator> {
        *self.operator.lock().unwrap_or_else(|e| e.into_inner())
    }
    /// Number of finished operations
    pub fn finished(&self) -> usize {
        *self.done.lock().unwrap_or_else(|e| e.into_inner())
    }
    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<OpacityBox> {
        self.ops.wait_idle();
        std::mem::replace(&mut *self.boxes(), Vec::new())
    }
}

impl CompositeSpans for BoxRecorder {
    fn begin(&self, op: Operator, _extents: &Rectangle<i32>) -> bool {
        *self.operator.lock().unwrap_or_else(|e| e.into_inner()) = Some(op);
        true
    }
    fn composite_box(&self, r: &Rectangle<i32>, opacity: f32) {
        self.boxes().push(OpacityBox { bounds: *r, alpha: opacity });
    }
    fn thread_boxes(&self, boxes: &[OpacityBox]) {
        let _active = self.ops.acquire();
        self.boxes().extend_from_slice(boxes);
    }
    fn has_thread_boxes(&self) -> bool {
        self.threaded
    }
    fn done(&self) {
        *self.done.lock().unwrap_or_else(|e| e.into_inner()) += 1;
    }
}
