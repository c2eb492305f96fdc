//! Rendering buffer

use crate::clip::Rectangle;
use crate::error::{Error, Result};

/// Rendering Buffer
///
/// Data is stored as row-major order (C-format), rows `stride` bytes apart
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderingBuffer {
    /// Pixel / Component level data of Image
    pub data: Vec<u8>,
    /// Image Width in pixels
    pub width: usize,
    /// Image Height in pixels
    pub height: usize,
    /// Bytes per pixel
    pub bpp: usize,
    /// Bytes per row
    pub stride: usize,
}

impl RenderingBuffer {
    /// Create a new buffer of width, height, and bpp
    ///
    /// Data for the Image is allocated and zeroed, rows are tightly packed
    pub fn new(width: usize, height: usize, bpp: usize) -> Self {
        let stride = width * bpp;
        RenderingBuffer { width, height, bpp, stride, data: vec![0u8; stride * height] }
    }
    /// Size of underlying Rendering Buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Bytes of row `i`
    pub fn row(&self, i: usize) -> &[u8] {
        debug_assert!(i < self.height);
        let start = i * self.stride;
        &self.data[start .. start + self.width * self.bpp]
    }
    /// Fill every byte with `v`
    pub fn fill(&mut self, v: u8) {
        self.data.iter_mut().for_each(|p| *p = v);
    }
    /// Pixel rectangle of the whole buffer
    pub fn bounds(&self) -> Rectangle<i32> {
        Rectangle::new(0, 0, self.width as i32, self.height as i32)
    }
    /// Fail unless `r` lies inside the buffer
    pub fn check_bounds(&self, r: &Rectangle<i32>) -> Result<()> {
        if self.bounds().contains(r) {
            Ok(())
        } else {
            Err(Error::OutOfBounds { region: *r, width: self.width, height: self.height })
        }
    }
    /// Mutable view of all rows
    pub fn rows_mut(&mut self) -> RowsMut<'_> {
        RowsMut { data: &mut self.data, stride: self.stride, bpp: self.bpp, y1: 0 }
    }
    /// Disjoint mutable views of consecutive row ranges
    ///
    /// `ranges` must be sorted, non-overlapping and inside the buffer. Each
    /// view is addressed with buffer row numbers.
    ///
    ///     use tor::RenderingBuffer;
    ///     let mut buf = RenderingBuffer::new(4, 6, 1);
    ///     let views = buf.split_rows(&[(0, 2), (2, 6)]);
    ///     assert_eq!(views.len(), 2);
    ///     assert_eq!(views[1].first_row(), 2);
    ///
    pub fn split_rows(&mut self, ranges: &[(i32, i32)]) -> Vec<RowsMut<'_>> {
        let stride = self.stride;
        let bpp = self.bpp;
        let height = self.height;
        let mut rest: &mut [u8] = &mut self.data;
        let mut at = 0;
        let mut out = Vec::with_capacity(ranges.len());
        for &(y1, y2) in ranges {
            assert!(y1 >= at && y2 >= y1, "row ranges out of order");
            assert!(y2 as usize <= height, "row range {}..{} outside {} rows", y1, y2, height);
            let skip = (y1 - at) as usize * stride;
            let take = ((y2 - y1) as usize * stride).min(rest.len() - skip);
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (view, tail) = tail.split_at_mut(take);
            out.push(RowsMut { data: view, stride, bpp, y1 });
            rest = tail;
            at = y2;
        }
        out
    }
}

/// Mutable view over a range of buffer rows
///
/// Rows are addressed by their buffer row number, so views handed to
/// different workers can be used with the same coordinates.
#[derive(Debug)]
pub struct RowsMut<'a> {
    data: &'a mut [u8],
    stride: usize,
    bpp: usize,
    y1: i32,
}

impl<'a> RowsMut<'a> {
    /// Buffer row number of the first row in the view
    pub fn first_row(&self) -> i32 {
        self.y1
    }
    pub fn stride(&self) -> usize {
        self.stride
    }
    pub fn bpp(&self) -> usize {
        self.bpp
    }
    /// Bytes from the start of row `y` to the end of the view
    pub fn row_mut(&mut self, y: i32) -> &mut [u8] {
        debug_assert!(y >= self.y1);
        let start = (y - self.y1) as usize * self.stride;
        &mut self.data[start..]
    }
    /// Bytes of pixels `[x1, x2)` on row `y`
    pub fn pixels_mut(&mut self, y: i32, x1: i32, x2: i32) -> &mut [u8] {
        let bpp = self.bpp;
        let row = self.row_mut(y);
        &mut row[x1 as usize * bpp .. x2 as usize * bpp]
    }
    /// Copy the first `len` bytes of row `src` to row `dst`
    pub fn copy_row(&mut self, src: i32, dst: i32, len: usize) {
        let s = (src - self.y1) as usize * self.stride;
        let d = (dst - self.y1) as usize * self.stride;
        self.data.copy_within(s .. s + len, d);
    }
}
