//! Rasterizer tunables

/// Thresholds and limits used when choosing a rasterization strategy
///
/// The thread thresholds are the minimum number of rows (scaled for
/// narrow shapes) each worker should get before another worker is added,
/// see [`use_threads`](../threads/fn.use_threads.html).
///
///     use tor::Config;
///     let c = Config::default().max_threads(2);
///     assert_eq!(c.max_threads, 2);
///     assert_eq!(c.span_thread_threshold, 8);
///
///     let c = Config::single_threaded();
///     assert_eq!(c.max_threads, 0);
///
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Upper bound on worker threads, 0 disables threading
    pub max_threads: usize,
    /// Thread threshold for the span (compositing backend) converters
    pub span_thread_threshold: i32,
    /// Thread threshold for the mask converter
    pub mask_thread_threshold: i32,
    /// Thread threshold for the in-place converters
    pub inplace_thread_threshold: i32,
    /// Thread threshold for triangle strips
    pub tristrip_thread_threshold: i32,
    /// Widest mask accumulated directly as 8-bit rows
    pub inplace_mask_width: i32,
    /// Span compositing is declined when both dimensions are below this
    pub min_span_extents: i32,
}

impl Default for Config {
    fn default() -> Self {
        let max_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            max_threads,
            span_thread_threshold: 8,
            mask_thread_threshold: 4,
            inplace_thread_threshold: 4,
            tristrip_thread_threshold: 16,
            inplace_mask_width: 128,
            min_span_extents: 32,
        }
    }
}

impl Config {
    /// Default configuration without worker threads
    pub fn single_threaded() -> Self {
        Self { max_threads: 0, .. Self::default() }
    }
    /// Set the maximum number of worker threads
    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = n;
        self
    }
    /// Set the minimum extents for span compositing
    pub fn min_span_extents(mut self, n: i32) -> Self {
        self.min_span_extents = n;
        self
    }
}
