//! Error types

use crate::clip::Rectangle;
use crate::composite::Operator;
use crate::pixfmt::Format;

use thiserror::Error;

/// Reasons a rasterization request was not carried out
///
/// None of these are fatal. Every variant tells the caller to fall back to
/// a slower, general purpose path for the same request.
#[derive(Debug, Error)]
pub enum Error {
    /// Vertical extent does not fit the sub-row bucket arithmetic
    #[error("vertical extent of {0} sub-rows cannot be bucketed")]
    ExtentTooLarge(i64),
    /// Edge, bucket or cell storage could not be allocated
    #[error("out of memory reserving rasterizer storage")]
    OutOfMemory,
    /// Span compositing is not worth it for tiny shapes
    #[error("extents {width}x{height} are too small for span compositing")]
    ExtentsTooSmall { width: i32, height: i32 },
    /// No in-place path for this operator on this destination
    #[error("operator {op:?} has no in-place path for {format:?}")]
    UnsupportedOperator { op: Operator, format: Format },
    /// The compositing backend declined the operation
    #[error("backend cannot composite spans with {0:?}")]
    SpansDeclined(Operator),
    /// In-place compositing needs a solid source
    #[error("in-place compositing requires a solid source")]
    NonSolidSource,
    /// Target region is not inside the destination buffer
    #[error("region {region:?} lies outside the {width}x{height} destination")]
    OutOfBounds { region: Rectangle<i32>, width: usize, height: usize },
    /// Worker threads could not be started
    #[error("cannot start worker threads")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
