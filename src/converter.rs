//! Rasterization entry points
//!
//! A [`Rasterizer`](struct.Rasterizer.html) turns a batch of trapezoids,
//! a triangle strip or a set of xTraps into spans for a compositing
//! backend, into an 8-bit mask, or blends them straight into a pixel
//! buffer. Requests it cannot serve come back as an
//! [`Error`](../error/enum.Error.html) so that the caller can take a
//! general purpose path instead.

use log::{debug, trace};

use crate::buffer::RenderingBuffer;
use crate::clip::{ClipRegion, Rectangle};
use crate::color::alpha;
use crate::composite::{CompositeSpans, Damage, Operator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fixed::{fixed_integer_floor, points_bounds, trapezoids_bounds};
use crate::fixed::{PointFixed, Trap, Trapezoid};
use crate::pixfmt::{blend_pixel, image_pixel, Format, Image32Span, InplaceOp, InplaceSpan};
use crate::pixfmt::{Lerp32Span, Pixfmt, Solid32Span};
use crate::raster::Tor;
use crate::render::{ClippedSpan, DirectSpan, MaskSpan, RegionSpan, ThreadBoxes};
use crate::threads::{partition_rows, use_threads, Workers};
use crate::SAMPLES_X;
use crate::SAMPLES_Y;

/// Per call parameters shared by all entry points
///
/// Geometry is given in drawable coordinates; adding `origin` gives target
/// coordinates, in which `clip` is expressed.
///
///     use tor::{ClipRegion, Operator, Params, Rectangle};
///     let clip = ClipRegion::rect(Rectangle::new(0, 0, 64, 64));
///     let p = Params::new(Operator::Over, &clip).origin(8, 8).clear(0);
///     assert!(p.mask_format);
///     assert_eq!(p.clear, Some(0));
///
#[derive(Debug, Copy, Clone)]
pub struct Params<'a> {
    /// Compositing operator
    pub operator: Operator,
    /// Destination clip, target coordinates
    pub clip: &'a ClipRegion,
    /// Drawable origin in target coordinates
    pub origin: (i32, i32),
    /// Shapes are combined into one mask before compositing
    ///
    /// Without a mask format every trapezoid of an in-place request is
    /// rendered on its own.
    pub mask_format: bool,
    /// Destination is known to be filled with this pixel value
    pub clear: Option<u32>,
    /// Translation from target coordinates to damage coordinates
    pub damage_offset: (i32, i32),
}

impl<'a> Params<'a> {
    pub fn new(operator: Operator, clip: &'a ClipRegion) -> Self {
        Self {
            operator,
            clip,
            origin: (0, 0),
            mask_format: true,
            clear: None,
            damage_offset: (0, 0),
        }
    }
    pub fn origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }
    pub fn mask_format(mut self, mask_format: bool) -> Self {
        self.mask_format = mask_format;
        self
    }
    pub fn clear(mut self, color: u32) -> Self {
        self.clear = Some(color);
        self
    }
    pub fn damage_offset(mut self, dx: i32, dy: i32) -> Self {
        self.damage_offset = (dx, dy);
        self
    }
    fn was_clear(&self) -> bool {
        self.clear.is_some()
    }
    /// Geometry offset in grid units
    fn grid_offset(&self) -> (i32, i32) {
        (self.origin.0 * SAMPLES_X, self.origin.1 * SAMPLES_Y)
    }
    /// Clip restricted to `bounds`, given in drawable coordinates
    fn region(&self, bounds: &Rectangle<i32>) -> Option<ClipRegion> {
        let b = bounds.translate(self.origin.0, self.origin.1);
        let region = self.clip.intersect_rect(&b);
        if region.is_empty() {
            None
        } else {
            Some(region)
        }
    }
}

/// Source of an in-place operation
#[derive(Debug, Copy, Clone)]
pub enum Source<'a> {
    /// Premultiplied a8r8g8b8 color
    Solid(u32),
    /// Image whose pixel `(0, 0)` lands on target pixel `(x, y)`
    Image { image: &'a Pixfmt, x: i32, y: i32 },
}

impl<'a> Source<'a> {
    /// Premultiplied a8r8g8b8 source value at target pixel `(x, y)`
    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        match *self {
            Source::Solid(color) => color,
            Source::Image { image, x: ix, y: iy } => image_pixel(image, x - ix, y - iy),
        }
    }
}

/// 8-bit coverage mask placed at `(x, y)` in target coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub buffer: RenderingBuffer,
    pub x: i32,
    pub y: i32,
}

impl Mask {
    pub fn width(&self) -> usize {
        self.buffer.width
    }
    pub fn height(&self) -> usize {
        self.buffer.height
    }
    /// Mask value at mask pixel `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.buffer.row(y)[x]
    }
    /// Area covered by the mask, target coordinates
    pub fn bounds(&self) -> Rectangle<i32> {
        self.buffer.bounds().translate(self.x, self.y)
    }
}

/// Composite `mask` onto `dst` within `clip` with a software blend
fn composite_mask(dst: &mut Pixfmt, source: &Source<'_>, op: Operator, mask: &Mask,
                  clip: &ClipRegion) -> Result<()> {
    let region = clip.intersect_rect(&mask.bounds());
    if region.is_empty() {
        return Ok(());
    }
    dst.rbuf().check_bounds(region.extents())?;
    let format = dst.format();
    trace!("composite mask {:?} onto {:?} with {:?}", region.extents(), format, op);
    for b in region.boxes() {
        for y in b.y1 .. b.y2 {
            for x in b.x1 .. b.x2 {
                let m = mask.get((x - mask.x) as usize, (y - mask.y) as usize);
                let (px, py) = (x as usize, y as usize);
                let d = match format {
                    Format::A8 => dst.get((px, py)) << 24,
                    _ => dst.get((px, py)),
                };
                let v = blend_pixel(op, source.pixel(x, y), m, d);
                dst.copy_pixel(px, py, match format {
                    Format::A8 => v >> 24,
                    Format::A8r8g8b8 => v,
                    Format::X8r8g8b8 => v | 0xff00_0000,
                });
            }
        }
    }
    Ok(())
}

/// Add the trapezoids touching drawable rows `[y1, y2)`
fn add_trapezoids(tor: &mut Tor, traps: &[Trapezoid], y1: i32, y2: i32, dx: i32, dy: i32) {
    for t in traps.iter().filter(|t| t.overlaps_rows(y1, y2)) {
        tor.add_trapezoid(t, dx, dy);
    }
}

/// Render through the backend from the calling thread
fn render_direct<O>(tor: &mut Tor, op: &O, clip: &ClipRegion, damage: Option<&mut Damage>,
                    offset: (i32, i32), unbounded: bool)
    where O: CompositeSpans + ?Sized
{
    let (dx, dy) = offset;
    match (clip.is_complex(), damage) {
        (true, Some(damage)) => {
            tor.render(&mut RegionSpan::with_damage(op, clip.boxes(), damage, dx, dy), unbounded)
        }
        (true, None) => tor.render(&mut RegionSpan::new(op, clip.boxes()), unbounded),
        (false, Some(damage)) => {
            tor.render(&mut DirectSpan::with_damage(op, damage, dx, dy), unbounded)
        }
        (false, None) => tor.render(&mut DirectSpan::new(op), unbounded),
    }
}

/// Render a worker band into a private box batch
fn render_thread_boxes<O>(tor: &mut Tor, op: &O, clip: &ClipRegion, unbounded: bool)
    where O: CompositeSpans + ?Sized
{
    let mut boxes = if clip.is_complex() {
        ThreadBoxes::clipped(op, clip.boxes())
    } else {
        ThreadBoxes::new(op)
    };
    tor.render(&mut boxes, unbounded);
    boxes.flush();
}

/// Scan converter with its configuration and worker threads
///
///     use tor::{BoxRecorder, ClipRegion, Operator, Params, Rasterizer,
///               Rectangle, Trapezoid};
///     let ras = Rasterizer::single_threaded();
///     let clip = ClipRegion::rect(Rectangle::new(0, 0, 100, 100));
///     let rec = BoxRecorder::new();
///     let traps = [Trapezoid::rect(0, 0, 40, 40)];
///     ras.trapezoid_span_converter(&rec, &Params::new(Operator::Over, &clip),
///                                  &traps, None).unwrap();
///     let area: i32 = rec.take().iter()
///         .map(|b| b.bounds.width() * b.bounds.height())
///         .sum();
///     assert_eq!(area, 1600);
///
#[derive(Debug)]
pub struct Rasterizer {
    config: Config,
    workers: Workers,
}

impl Rasterizer {
    /// Rasterizer with a worker pool sized by `config.max_threads`
    pub fn new(config: Config) -> Result<Self> {
        let workers = Workers::new(config.max_threads)?;
        Ok(Self { config, workers })
    }
    /// Rasterizer doing all work on the calling thread
    pub fn single_threaded() -> Self {
        Self { config: Config::single_threaded(), workers: Workers::single_threaded() }
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn workers(&self) -> &Workers {
        &self.workers
    }

    fn threads(&self, width: i32, height: i32, threshold: i32) -> usize {
        use_threads(width, height, threshold, self.config.max_threads)
    }

    /// Rectilinear masks are cheap enough for the calling thread
    fn mask_threads(&self, traps: &[Trapezoid], width: i32, height: i32) -> usize {
        if traps.iter().all(|t| t.is_rectilinear()) {
            1
        } else {
            self.threads(width, height, self.config.mask_thread_threshold)
        }
    }

    /// Composite trapezoids through a span compositing backend
    ///
    /// The backend is started with [`begin`] using the effective
    /// operator: on a clear destination `Add` and `Over` become `Src`, and
    /// `In` has nothing to do. [`done`] is called once spans are sent.
    ///
    /// Shapes smaller than `Config::min_span_extents` in both directions
    /// are declined with `Error::ExtentsTooSmall`.
    ///
    /// [`begin`]: ../composite/trait.CompositeSpans.html#method.begin
    /// [`done`]: ../composite/trait.CompositeSpans.html#method.done
    pub fn trapezoid_span_converter<O>(&self, op: &O, params: &Params<'_>,
                                       traps: &[Trapezoid],
                                       damage: Option<&mut Damage>) -> Result<()>
        where O: CompositeSpans + ?Sized
    {
        let bounds = match trapezoids_bounds(traps) {
            Some(b) => b,
            None => return Ok(()),
        };
        let min = self.config.min_span_extents;
        if bounds.width() < min && bounds.height() < min {
            debug!("span converter: extents too small {}x{}", bounds.width(), bounds.height());
            return Err(Error::ExtentsTooSmall { width: bounds.width(), height: bounds.height() });
        }
        let clip = match params.region(&bounds) {
            Some(c) => c,
            None => {
                debug!("span converter: trapezoids do not intersect the clip");
                return Ok(());
            }
        };
        let extents = *clip.extents();

        let was_clear = params.was_clear();
        let mut operator = params.operator;
        match operator {
            Operator::Add | Operator::Over if was_clear => operator = Operator::Src,
            Operator::In if was_clear => return Ok(()),
            _ => {}
        }
        if !op.begin(operator, &extents) {
            debug!("span converter: backend declined {:?}", operator);
            return Err(Error::SpansDeclined(operator));
        }
        let unbounded = !was_clear && params.mask_format && !operator.is_bounded();
        let (dx, dy) = params.grid_offset();
        let oy = params.origin.1;

        let rectilinear = traps.iter().all(|t| t.is_rectilinear());
        let mut num_threads = 1;
        if !rectilinear && op.has_thread_boxes() && damage.is_none() {
            num_threads = self.threads(extents.width(), extents.height(),
                                       self.config.span_thread_threshold);
        }
        debug!("span converter: {} trapezoids, extents {:?}, op {:?}, unbounded {}, {} threads",
               traps.len(), extents, operator, unbounded, num_threads);

        let result = if num_threads == 1 {
            Tor::new(&extents, 2 * traps.len()).map(|mut tor| {
                add_trapezoids(&mut tor, traps, extents.y1 - oy, extents.y2 - oy, dx, dy);
                render_direct(&mut tor, op, &clip, damage, params.damage_offset, unbounded);
            })
        } else {
            self.workers.run(partition_rows(&extents, num_threads), |band| {
                trace!("span band {} -> {}", band.y1, band.y2);
                let mut tor = Tor::new(&band, 2 * traps.len())?;
                add_trapezoids(&mut tor, traps, band.y1 - oy, band.y2 - oy, dx, dy);
                render_thread_boxes(&mut tor, op, &clip, unbounded);
                Ok(())
            })
        };
        op.done();
        result
    }

    /// Composite a triangle strip through a span compositing backend
    ///
    /// The strip is rasterized as one polygon, its outline walked along
    /// both sides. Strips of fewer than three points draw nothing.
    pub fn tristrip_span_converter<O>(&self, op: &O, params: &Params<'_>,
                                      points: &[PointFixed],
                                      damage: Option<&mut Damage>) -> Result<()>
        where O: CompositeSpans + ?Sized
    {
        if points.len() < 3 {
            return Ok(());
        }
        let bounds = match points_bounds(points) {
            Some(b) => b,
            None => return Ok(()),
        };
        let clip = match params.region(&bounds) {
            Some(c) => c,
            None => {
                debug!("tristrip converter: triangles do not intersect the clip");
                return Ok(());
            }
        };
        let extents = *clip.extents();
        let operator = params.operator;
        if !op.begin(operator, &extents) {
            return Err(Error::SpansDeclined(operator));
        }
        let unbounded = !params.was_clear() && params.mask_format && !operator.is_bounded();
        let (dx, dy) = params.grid_offset();

        let mut num_threads = 1;
        if op.has_thread_boxes() && damage.is_none() {
            num_threads = self.threads(extents.width(), extents.height(),
                                       self.config.tristrip_thread_threshold);
        }
        debug!("tristrip converter: {} points, extents {:?}, {} threads",
               points.len(), extents, num_threads);

        let result = if num_threads == 1 {
            Tor::new(&extents, 2 * points.len()).map(|mut tor| {
                tor.add_tristrip(points, dx, dy);
                render_direct(&mut tor, op, &clip, damage, params.damage_offset, unbounded);
            })
        } else {
            self.workers.run(partition_rows(&extents, num_threads), |band| {
                let mut tor = Tor::new(&band, 2 * points.len())?;
                tor.add_tristrip(points, dx, dy);
                render_thread_boxes(&mut tor, op, &clip, unbounded);
                Ok(())
            })
        };
        op.done();
        result
    }

    /// Add xTraps onto the destination through a span compositing backend
    ///
    /// Always composites with `Add`, over the whole clip; the operator of
    /// `params` is not used.
    pub fn trap_span_converter<O>(&self, op: &O, params: &Params<'_>, traps: &[Trap],
                                  damage: Option<&mut Damage>) -> Result<()>
        where O: CompositeSpans + ?Sized
    {
        let clip = params.clip;
        if clip.is_empty() {
            return Ok(());
        }
        let extents = *clip.extents();
        if !op.begin(Operator::Add, &extents) {
            return Err(Error::SpansDeclined(Operator::Add));
        }
        let (dx, dy) = params.grid_offset();
        let oy = params.origin.1;
        debug!("trap converter: {} traps, extents {:?}", traps.len(), extents);

        let result = Tor::new(&extents, 2 * traps.len()).map(|mut tor| {
            for t in traps {
                if fixed_integer_floor(t.top.y) + oy >= extents.y2 ||
                    fixed_integer_floor(t.bot.y) + oy < extents.y1 {
                    continue;
                }
                tor.add_trap(t, dx, dy);
            }
            render_direct(&mut tor, op, clip, damage, params.damage_offset, false);
        });
        op.done();
        result
    }

    /// Render trapezoids into a new 8-bit coverage mask
    ///
    /// The mask covers the trapezoids' bounds within the clip extents.
    /// Returns `None` when there is nothing to draw. All trapezoids go
    /// into the one mask whatever `params.mask_format` says.
    ///
    ///     use tor::{ClipRegion, Operator, Params, Rasterizer, Rectangle, Trapezoid};
    ///     let ras = Rasterizer::single_threaded();
    ///     let clip = ClipRegion::rect(Rectangle::new(0, 0, 16, 16));
    ///     let params = Params::new(Operator::Over, &clip);
    ///     let mask = ras.trapezoid_mask(&params, &[Trapezoid::rect(2, 2, 6, 4)])
    ///         .unwrap().unwrap();
    ///     assert_eq!((mask.x, mask.y, mask.width(), mask.height()), (2, 2, 4, 2));
    ///     assert_eq!(mask.get(3, 1), 255);
    ///
    pub fn trapezoid_mask(&self, params: &Params<'_>,
                          traps: &[Trapezoid]) -> Result<Option<Mask>> {
        let bounds = match trapezoids_bounds(traps) {
            Some(b) => b,
            None => return Ok(None),
        };
        let extents = match bounds.translate(params.origin.0, params.origin.1)
            .intersect(params.clip.extents()) {
            Some(e) => e,
            None => return Ok(None),
        };
        let (width, height) = (extents.width(), extents.height());
        let dx = (params.origin.0 - extents.x1) * SAMPLES_X;
        let dy = (params.origin.1 - extents.y1) * SAMPLES_Y;
        let dy_rows = extents.y1 - params.origin.1;

        let mut buffer = RenderingBuffer::new(width as usize, height as usize, 1);
        let area = Rectangle::new(0, 0, width, height);
        let num_threads = self.mask_threads(traps, width, height);
        let inplace = width <= self.config.inplace_mask_width;
        debug!("mask converter: {} trapezoids, mask {}x{} at ({}, {}), inplace {}, {} threads",
               traps.len(), width, height, extents.x1, extents.y1, inplace, num_threads);

        let bands = partition_rows(&area, num_threads);
        let ranges: Vec<_> = bands.iter().map(|b| (b.y1, b.y2)).collect();
        let tasks: Vec<_> = bands.into_iter().zip(buffer.split_rows(&ranges)).collect();
        self.workers.run(tasks, |(band, mut rows)| {
            let mut tor = Tor::new(&band, 2 * traps.len())?;
            add_trapezoids(&mut tor, traps, band.y1 + dy_rows, band.y2 + dy_rows, dx, dy);
            if inplace {
                tor.render_inplace(&mut rows);
            } else {
                tor.render(&mut MaskSpan::new(&mut rows), true);
            }
            Ok(())
        })?;

        Ok(Some(Mask { buffer, x: extents.x1, y: extents.y1 }))
    }

    /// Render trapezoids into masks and hand each one to `composite`
    ///
    /// With a mask format the trapezoids share one mask. Without one,
    /// every trapezoid is rendered into a mask of its own, so overlaps
    /// are composited more than once. Nothing is handed over when there
    /// is nothing to draw. The first error stops the remaining work.
    ///
    ///     use tor::{ClipRegion, Operator, Params, Rasterizer, Rectangle, Trapezoid};
    ///     let ras = Rasterizer::single_threaded();
    ///     let clip = ClipRegion::rect(Rectangle::new(0, 0, 16, 16));
    ///     let params = Params::new(Operator::Over, &clip).mask_format(false);
    ///     let traps = [Trapezoid::rect(0, 0, 4, 4), Trapezoid::rect(2, 2, 8, 8)];
    ///     let mut n = 0;
    ///     ras.trapezoid_mask_converter(&params, &traps, |_| { n += 1; Ok(()) }).unwrap();
    ///     assert_eq!(n, 2);
    ///
    pub fn trapezoid_mask_converter<F>(&self, params: &Params<'_>, traps: &[Trapezoid],
                                       mut composite: F) -> Result<()>
        where F: FnMut(&Mask) -> Result<()>
    {
        if !params.mask_format && traps.len() > 1 {
            debug!("mask converter: individual rasterisation of {} trapezoids", traps.len());
            for t in traps {
                if let Some(mask) = self.trapezoid_mask(params, std::slice::from_ref(t))? {
                    composite(&mask)?;
                }
            }
            return Ok(());
        }
        match self.trapezoid_mask(params, traps)? {
            Some(mask) => composite(&mask),
            None => Ok(()),
        }
    }

    /// Composite trapezoids onto `dst` through a rendered mask
    ///
    /// Slower than [`trapezoid_span_inplace`] but takes every operator,
    /// source and destination format. The mask is blended in software
    /// within the clip. The target region of each mask must lie inside
    /// `dst`, otherwise `Error::OutOfBounds` is returned.
    ///
    /// [`trapezoid_span_inplace`]: #method.trapezoid_span_inplace
    pub fn trapezoid_span_fallback(&self, dst: &mut Pixfmt, source: &Source<'_>,
                                   params: &Params<'_>, traps: &[Trapezoid]) -> Result<()> {
        debug!("fallback: {} trapezoids, op {:?} onto {:?}",
               traps.len(), params.operator, dst.format());
        let clip = params.clip;
        self.trapezoid_mask_converter(params, traps, |mask| {
            composite_mask(dst, source, params.operator, mask, clip)
        })
    }

    /// Blend trapezoids directly into `dst`
    ///
    /// The target region must lie inside `dst`, otherwise nothing is
    /// touched and `Error::OutOfBounds` is returned.
    ///
    /// a8 destinations take a solid source with `Src`, `In` or `Add`.
    /// 32-bit destinations take a solid source with `Src`, `Over`, `Add`
    /// or `OutReverse`, or an image source with `Over`, `Add` or
    /// `OutReverse` (`Src` too on a clear destination). Anything else is
    /// declined.
    pub fn trapezoid_span_inplace(&self, dst: &mut Pixfmt, source: &Source<'_>,
                                  params: &Params<'_>, traps: &[Trapezoid]) -> Result<()> {
        if !params.mask_format && traps.len() > 1 {
            debug!("inplace: individual rasterisation of {} trapezoids", traps.len());
            let mut params = *params;
            for t in traps {
                self.trapezoid_span_inplace(dst, source, &params, std::slice::from_ref(t))?;
                params.clear = None;
            }
            return Ok(());
        }
        match dst.format() {
            Format::A8 => self.inplace_a8(dst, source, params, traps),
            Format::A8r8g8b8 | Format::X8r8g8b8 => self.inplace_32(dst, source, params, traps),
        }
    }

    /// Target region of an in-place request, checked against `dst`
    fn inplace_region(&self, dst: &Pixfmt, params: &Params<'_>,
                      traps: &[Trapezoid]) -> Result<Option<ClipRegion>> {
        let region = match trapezoids_bounds(traps).and_then(|b| params.region(&b)) {
            Some(r) => r,
            None => return Ok(None),
        };
        dst.rbuf().check_bounds(region.extents())?;
        Ok(Some(region))
    }

    fn inplace_a8(&self, dst: &mut Pixfmt, source: &Source<'_>, params: &Params<'_>,
                  traps: &[Trapezoid]) -> Result<()> {
        let color = match *source {
            Source::Solid(color) => color,
            Source::Image { .. } => {
                debug!("inplace: a8 destination requires a solid source");
                return Err(Error::NonSolidSource);
            }
        };
        let mut operator = params.operator;
        let mut unbounded = false;
        match operator {
            Operator::Add => {
                if params.clear == Some(0) {
                    unbounded = true;
                    operator = Operator::Src;
                }
                if alpha(color) == 0 {
                    return Ok(());
                }
            }
            Operator::In => {
                match params.clear {
                    Some(0) => return Ok(()),
                    Some(0xff) => operator = Operator::Src,
                    _ => {}
                }
                unbounded = true;
            }
            Operator::Src => unbounded = true,
            op => {
                debug!("inplace: cannot perform {:?} in place on a8", op);
                return Err(Error::UnsupportedOperator { op, format: Format::A8 });
            }
        }
        let clip = match self.inplace_region(dst, params, traps)? {
            Some(c) => c,
            None => return Ok(()),
        };
        let extents = *clip.extents();
        let blend = match operator {
            Operator::Src => InplaceOp::Src,
            Operator::In => InplaceOp::In,
            _ => InplaceOp::Add,
        };
        let opacity = alpha(color);
        let (dx, dy) = params.grid_offset();
        let oy = params.origin.1;

        let rectilinear = traps.iter().all(|t| t.is_rectilinear());
        let num_threads = if rectilinear {
            1
        } else {
            self.threads(extents.width(), extents.height(), self.config.inplace_thread_threshold)
        };
        debug!("inplace a8: extents {:?}, op {:?}, opacity {}, unbounded {}, {} threads",
               extents, blend, opacity, unbounded, num_threads);

        let bands = partition_rows(&extents, num_threads);
        let ranges: Vec<_> = bands.iter().map(|b| (b.y1, b.y2)).collect();
        let tasks: Vec<_> = bands.into_iter().zip(dst.rbuf_mut().split_rows(&ranges)).collect();
        self.workers.run(tasks, |(band, mut rows)| {
            let mut tor = Tor::new(&band, 2 * traps.len())?;
            add_trapezoids(&mut tor, traps, band.y1 - oy, band.y2 - oy, dx, dy);
            let span = InplaceSpan::new(&mut rows, blend, opacity);
            tor.render(&mut ClippedSpan::new(span, clip.boxes()), unbounded);
            Ok(())
        })
    }

    fn inplace_32(&self, dst: &mut Pixfmt, source: &Source<'_>, params: &Params<'_>,
                  traps: &[Trapezoid]) -> Result<()> {
        let format = dst.format();
        let mut operator = params.operator;
        let mut lerp = false;
        if let Source::Solid(color) = *source {
            if operator == Operator::Over && (alpha(color) == 0xff || params.was_clear()) {
                operator = Operator::Src;
            }
            lerp = operator == Operator::Src;
        }
        if !lerp {
            match operator {
                Operator::Over | Operator::Add | Operator::OutReverse => {}
                Operator::Src if params.was_clear() => {}
                op => {
                    debug!("inplace: cannot perform {:?} in place on {:?}", op, format);
                    return Err(Error::UnsupportedOperator { op, format });
                }
            }
        }
        let clip = match self.inplace_region(dst, params, traps)? {
            Some(c) => c,
            None => return Ok(()),
        };
        let extents = *clip.extents();
        let (dx, dy) = params.grid_offset();
        let oy = params.origin.1;
        let opaque_dst = format == Format::X8r8g8b8;

        let rectilinear = traps.iter().all(|t| t.is_rectilinear());
        let solid = match source {
            Source::Solid(_) => true,
            Source::Image { .. } => false,
        };
        let num_threads = if rectilinear || !solid {
            1
        } else {
            self.threads(4 * extents.width(), extents.height(), self.config.inplace_thread_threshold)
        };
        debug!("inplace {:?}: extents {:?}, op {:?}, lerp {}, {} threads",
               format, extents, operator, lerp, num_threads);

        let bands = partition_rows(&extents, num_threads);
        let ranges: Vec<_> = bands.iter().map(|b| (b.y1, b.y2)).collect();
        let tasks: Vec<_> = bands.into_iter().zip(dst.rbuf_mut().split_rows(&ranges)).collect();
        self.workers.run(tasks, |(band, mut rows)| {
            let mut tor = Tor::new(&band, 2 * traps.len())?;
            add_trapezoids(&mut tor, traps, band.y1 - oy, band.y2 - oy, dx, dy);
            let boxes = clip.boxes();
            match *source {
                Source::Solid(color) if lerp => {
                    let span = Lerp32Span::new(&mut rows, color);
                    tor.render(&mut ClippedSpan::new(span, boxes), false);
                }
                Source::Solid(color) => {
                    let span = Solid32Span::new(&mut rows, operator, color, opaque_dst);
                    tor.render(&mut ClippedSpan::new(span, boxes), false);
                }
                Source::Image { image, x, y } => {
                    let span = Image32Span::new(&mut rows, operator, image, x, y);
                    tor.render(&mut ClippedSpan::new(span, boxes), false);
                }
            }
            Ok(())
        })
    }
}
