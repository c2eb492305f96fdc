//! Pixel Format
//!
//! Destination surfaces and the span sinks that blend coverage straight
//! into their memory.

use crate::buffer::{RenderingBuffer, RowsMut};
use crate::clip::Rectangle;
use crate::color::alpha;
use crate::composite::Operator;
use crate::math::{add_4x8, coverage_opacity, lerp8x4, mul_4x8_8, mul_8_8, to_alpha};
use crate::SpanSink;
use crate::GRID_AREA;

/// Pixel layout of a surface
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    /// 8-bit alpha only
    A8,
    /// 32-bit premultiplied ARGB, native endian
    A8r8g8b8,
    /// 32-bit RGB, the top byte is ignored on read and set on write
    X8r8g8b8,
}

impl Format {
    /// Bytes per pixel
    pub fn bpp(self) -> usize {
        match self {
            Format::A8 => 1,
            Format::A8r8g8b8 | Format::X8r8g8b8 => 4,
        }
    }
    pub fn has_alpha(self) -> bool {
        self != Format::X8r8g8b8
    }
}

/// Pixel Format Wrapper around raw pixel component data
#[derive(Debug, Clone, PartialEq)]
pub struct Pixfmt {
    rbuf: RenderingBuffer,
    format: Format,
}

impl Pixfmt {
    /// Create new zeroed surface of width * height pixels
    ///
    ///     use tor::{Pixfmt, Format};
    ///     let pix = Pixfmt::new(4, 2, Format::A8r8g8b8);
    ///     assert_eq!(pix.size(), 32);
    ///     assert_eq!(pix.get((3, 1)), 0);
    ///
    pub fn new(width: usize, height: usize, format: Format) -> Self {
        if width == 0 || height == 0 {
            panic!("Cannot create pixfmt with 0 width or height");
        }
        Self { rbuf: RenderingBuffer::new(width, height, format.bpp()), format }
    }
    /// Wrap an existing buffer
    pub fn from_buffer(rbuf: RenderingBuffer, format: Format) -> Self {
        assert_eq!(rbuf.bpp, format.bpp(), "buffer does not match {:?}", format);
        Self { rbuf, format }
    }
    /// Size of Rendering Buffer in bytes
    pub fn size(&self) -> usize {
        self.rbuf.len()
    }
    pub fn width(&self) -> usize {
        self.rbuf.width
    }
    pub fn height(&self) -> usize {
        self.rbuf.height
    }
    pub fn format(&self) -> Format {
        self.format
    }
    pub fn rbuf(&self) -> &RenderingBuffer {
        &self.rbuf
    }
    pub fn rbuf_mut(&mut self) -> &mut RenderingBuffer {
        &mut self.rbuf
    }
    pub fn into_buffer(self) -> RenderingBuffer {
        self.rbuf
    }
    /// Pixel value at (x, y)
    ///
    /// a8 values are returned in the low byte, x8r8g8b8 values with a
    /// full alpha byte.
    pub fn get(&self, (x, y): (usize, usize)) -> u32 {
        let row = self.rbuf.row(y);
        match self.format {
            Format::A8 => u32::from(row[x]),
            Format::A8r8g8b8 => read_32(&row[x * 4 .. x * 4 + 4]),
            Format::X8r8g8b8 => read_32(&row[x * 4 .. x * 4 + 4]) | 0xff00_0000,
        }
    }
    /// Set every pixel to `v`
    pub fn fill(&mut self, v: u32) {
        match self.format {
            Format::A8 => self.rbuf.fill(v as u8),
            _ => {
                let bytes = v.to_ne_bytes();
                for px in self.rbuf.data.chunks_exact_mut(4) {
                    px.copy_from_slice(&bytes);
                }
            }
        }
    }
    /// Set one pixel
    pub fn copy_pixel(&mut self, x: usize, y: usize, v: u32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let bpp = self.format.bpp();
        let i = y * self.rbuf.stride + x * bpp;
        match self.format {
            Format::A8 => self.rbuf.data[i] = v as u8,
            _ => write_32(&mut self.rbuf.data[i .. i + 4], v),
        }
    }
}

fn read_32(b: &[u8]) -> u32 {
    u32::from_ne_bytes([b[0], b[1], b[2], b[3]])
}

fn write_32(b: &mut [u8], v: u32) {
    b.copy_from_slice(&v.to_ne_bytes());
}

/// Blend applied by an [`InplaceSpan`](struct.InplaceSpan.html)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InplaceOp {
    /// Replace with the coverage
    Src,
    /// Multiply by the coverage
    In,
    /// Add the coverage, saturating
    Add,
}

/// Coverage blended into an a8 surface
///
/// Coverage is scaled by a constant opacity first.
pub struct InplaceSpan<'a, 'b> {
    rows: &'a mut RowsMut<'b>,
    op: InplaceOp,
    opacity: u8,
}

impl<'a, 'b> InplaceSpan<'a, 'b> {
    pub fn new(rows: &'a mut RowsMut<'b>, op: InplaceOp, opacity: u8) -> Self {
        Self { rows, op, opacity }
    }

    fn fill(&mut self, r: &Rectangle<i32>, v: u8) {
        if r.width() == 1 {
            for y in r.y1..r.y2 {
                self.rows.row_mut(y)[r.x1 as usize] = v;
            }
            return;
        }
        for y in r.y1..r.y2 {
            for p in self.rows.pixels_mut(y, r.x1, r.x2) {
                *p = v;
            }
        }
    }

    fn each<F: Fn(u8) -> u8>(&mut self, r: &Rectangle<i32>, f: F) {
        for y in r.y1..r.y2 {
            for p in self.rows.pixels_mut(y, r.x1, r.x2) {
                *p = f(*p);
            }
        }
    }
}

impl<'a, 'b> SpanSink for InplaceSpan<'a, 'b> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        match self.op {
            InplaceOp::Src => {
                let v = coverage_opacity(coverage, self.opacity);
                self.fill(r, v);
            }
            InplaceOp::In => {
                if coverage == 0 || self.opacity == 0 {
                    self.fill(r, 0);
                    return;
                }
                let c = coverage_opacity(coverage, self.opacity);
                if c == 0xff {
                    return;
                }
                self.each(r, |p| mul_8_8(p, c));
            }
            InplaceOp::Add => {
                if coverage == 0 {
                    return;
                }
                let c = coverage_opacity(coverage, self.opacity);
                if c == 0xff {
                    self.fill(r, 0xff);
                    return;
                }
                self.each(r, |p| p.saturating_add(c));
            }
        }
    }
}

/// Coverage used to interpolate 32-bit pixels towards a solid color
///
/// Full coverage writes the color, zero coverage leaves the pixel.
pub struct Lerp32Span<'a, 'b> {
    rows: &'a mut RowsMut<'b>,
    color: u32,
}

impl<'a, 'b> Lerp32Span<'a, 'b> {
    pub fn new(rows: &'a mut RowsMut<'b>, color: u32) -> Self {
        Self { rows, color }
    }
}

impl<'a, 'b> SpanSink for Lerp32Span<'a, 'b> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        if coverage == 0 {
            return;
        }
        let color = self.color;
        if coverage == GRID_AREA {
            let bytes = color.to_ne_bytes();
            for y in r.y1..r.y2 {
                for px in self.rows.pixels_mut(y, r.x1, r.x2).chunks_exact_mut(4) {
                    px.copy_from_slice(&bytes);
                }
            }
            return;
        }
        let a = to_alpha(coverage);
        for y in r.y1..r.y2 {
            for px in self.rows.pixels_mut(y, r.x1, r.x2).chunks_exact_mut(4) {
                let d = read_32(px);
                write_32(px, lerp8x4(color, a, d));
            }
        }
    }
}

/// Premultiplied source pixel combined with the destination by an operator
///
/// Only `Over`, `Add` and `OutReverse` have a meaning here; anything
/// else is treated as `Src`.
pub fn composite_pixel(op: Operator, src: u32, dst: u32) -> u32 {
    match op {
        Operator::Over => add_4x8(src, mul_4x8_8(dst, !alpha(src))),
        Operator::Add => add_4x8(src, dst),
        Operator::OutReverse => mul_4x8_8(dst, !alpha(src)),
        _ => src,
    }
}

/// Porter-Duff combination of a source, scaled by `mask`, with `dst`
///
/// Both pixels are premultiplied a8r8g8b8. Every operator is supported.
///
///     use tor::{blend_pixel, Operator};
///     assert_eq!(blend_pixel(Operator::In, 0xff00_00ff, 255, 0x8000_0000), 0x8000_0080);
///     assert_eq!(blend_pixel(Operator::Src, 0xff00_00ff, 0, 0x8000_0000), 0);
///
pub fn blend_pixel(op: Operator, src: u32, mask: u8, dst: u32) -> u32 {
    let src = if mask == 0xff { src } else { mul_4x8_8(src, mask) };
    let (sa, da) = (alpha(src), alpha(dst));
    let (fa, fb) = match op {
        Operator::Clear => (0, 0),
        Operator::Src => (0xff, 0),
        Operator::Dst => (0, 0xff),
        Operator::Over => (0xff, !sa),
        Operator::OverReverse => (!da, 0xff),
        Operator::In => (da, 0),
        Operator::InReverse => (0, sa),
        Operator::Out => (!da, 0),
        Operator::OutReverse => (0, !sa),
        Operator::Atop => (da, !sa),
        Operator::AtopReverse => (!da, sa),
        Operator::Xor => (!da, !sa),
        Operator::Add => (0xff, 0xff),
        Operator::Saturate => (saturate_factor(sa, da), 0xff),
    };
    add_4x8(mul_4x8_8(src, fa), mul_4x8_8(dst, fb))
}

/// Fraction of the source that still fits in the destination
fn saturate_factor(sa: u8, da: u8) -> u8 {
    if sa <= !da {
        0xff
    } else {
        (u32::from(!da) * 255 / u32::from(sa)) as u8
    }
}

/// Solid color scaled by coverage and composited onto 32-bit pixels
pub struct Solid32Span<'a, 'b> {
    rows: &'a mut RowsMut<'b>,
    op: Operator,
    color: u32,
    opaque_dst: bool,
}

impl<'a, 'b> Solid32Span<'a, 'b> {
    /// `opaque_dst` forces the alpha byte of written pixels to 0xff, for
    /// x8r8g8b8 destinations
    pub fn new(rows: &'a mut RowsMut<'b>, op: Operator, color: u32, opaque_dst: bool) -> Self {
        Self { rows, op, color, opaque_dst }
    }
}

impl<'a, 'b> SpanSink for Solid32Span<'a, 'b> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        if coverage == 0 {
            return;
        }
        let src = if coverage == GRID_AREA {
            self.color
        } else {
            mul_4x8_8(self.color, to_alpha(coverage))
        };
        let keep = if self.opaque_dst { 0xff00_0000 } else { 0 };
        for y in r.y1..r.y2 {
            for px in self.rows.pixels_mut(y, r.x1, r.x2).chunks_exact_mut(4) {
                let d = read_32(px) | keep;
                write_32(px, composite_pixel(self.op, src, d) | keep);
            }
        }
    }
}

/// Source image scaled by coverage and composited onto 32-bit pixels
///
/// Source pixel `(0, 0)` lands on target pixel `(x, y)`; target pixels
/// outside the source see a transparent source.
pub struct Image32Span<'a, 'b> {
    rows: &'a mut RowsMut<'b>,
    op: Operator,
    src: &'a Pixfmt,
    x: i32,
    y: i32,
}

impl<'a, 'b> Image32Span<'a, 'b> {
    pub fn new(rows: &'a mut RowsMut<'b>, op: Operator, src: &'a Pixfmt, x: i32, y: i32) -> Self {
        Self { rows, op, src, x, y }
    }
}

/// Pixel `(x, y)` of `src` as premultiplied a8r8g8b8
///
/// a8 images give their value as alpha; pixels outside are transparent.
pub fn image_pixel(src: &Pixfmt, x: i32, y: i32) -> u32 {
    if x < 0 || y < 0 || x as usize >= src.width() || y as usize >= src.height() {
        return 0;
    }
    let p = src.get((x as usize, y as usize));
    match src.format() {
        Format::A8 => p << 24,
        _ => p,
    }
}

impl<'a, 'b> SpanSink for Image32Span<'a, 'b> {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        if coverage == 0 {
            return;
        }
        let a = to_alpha(coverage);
        for y in r.y1..r.y2 {
            for x in r.x1..r.x2 {
                let mut s = image_pixel(self.src, x - self.x, y - self.y);
                if coverage != GRID_AREA {
                    s = mul_4x8_8(s, a);
                }
                let px = self.rows.pixels_mut(y, x, x + 1);
                let d = read_32(px);
                write_32(px, composite_pixel(self.op, s, d));
            }
        }
    }
}
