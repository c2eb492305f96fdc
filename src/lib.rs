
/// How does this work
///    tor = Tor::new( extents, num_edges )
///  Geometry
///    add_trapezoid, add_tristrip, add_trap
///     Polygon::add_edge / add_line
///       clip to [ymin, ymax), grid units, exact slope
///       bucket by starting pixel row
///  Render
///   render(sink, unbounded)
///     empty rows      -- skipped in one go
///     full step rows  -- active edges all vertical
///       nonzero_row()
///       step_edges()
///     other rows      -- SAMPLES_Y sub-rows
///       fill_buckets()
///       merge_edges()
///       nonzero_subrow()
///     Output: Cells with X, Uncovered Area, and Covered Height
///    blt()
///     SpanSink::span( box, coverage )
///       DirectSpan / RegionSpan / ThreadBoxes -> CompositeSpans
///       MaskSpan / InplaceSpan / Lerp32Span / Solid32Span -> pixels
///    masks -- MaskSpan rows, composited by blend_pixel in the fallback
///  Threads
///   Rasterizer -- partition rows, one Tor per worker

pub mod error;
pub mod config;
pub mod math;
pub mod fixed;
pub mod clip;
pub mod edge;
pub mod polygon;
pub mod active;
pub mod cell;
pub mod raster;
pub mod buffer;
pub mod color;
pub mod composite;
pub mod render;
pub mod pixfmt;
pub mod threads;
pub mod converter;
pub mod dump;

pub use error::*;
pub use config::*;
pub use math::*;
pub use fixed::*;
pub use clip::*;
pub use raster::*;
pub use buffer::*;
pub use color::*;
pub use composite::*;
pub use render::*;
pub use pixfmt::*;
pub use threads::*;
pub use converter::*;
pub use dump::*;

/// Horizontal samples per pixel
pub const SAMPLES_X: i32 = 17;
/// Vertical samples per pixel
pub const SAMPLES_Y: i32 = 15;
/// Coverage of a fully covered pixel
///
/// Areas are accumulated in half samples, hence the factor of two.
pub const GRID_AREA: i32 = 2 * SAMPLES_X * SAMPLES_Y;

/// Consumer of coverage spans
///
/// `r` is in target pixel coordinates, `coverage` in `[0, GRID_AREA]`.
pub trait SpanSink {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32);
}

impl<F> SpanSink for F where F: FnMut(&Rectangle<i32>, i32) {
    fn span(&mut self, r: &Rectangle<i32>, coverage: i32) {
        self(r, coverage)
    }
}
