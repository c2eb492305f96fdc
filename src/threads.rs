//! Worker threads
//!
//! Large shapes are split into horizontal bands, each rasterized by its
//! own [`Tor`](../raster/struct.Tor.html) on a pool thread.

use log::{debug, trace};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::clip::Rectangle;
use crate::error::{Error, Result};

/// Number of workers worth using for a `width` x `height` area
///
/// Each worker should get at least `threshold` rows. Narrow areas count
/// as proportionally fewer rows. The result is in `[1, max_threads]`.
///
///     use tor::use_threads;
///     assert_eq!(use_threads(256, 256, 8, 0), 1);
///     assert_eq!(use_threads(256, 256, 8, 4), 4);
///     assert_eq!(use_threads(256, 8, 8, 4), 3);
///
pub fn use_threads(width: i32, height: i32, threshold: i32, max_threads: usize) -> usize {
    let max = max_threads.min(i32::max_value() as usize) as i64;
    if max <= 0 || width <= 0 || height <= 0 || threshold <= 0 {
        return 1;
    }
    let mut height = i64::from(height);
    if width < 128 {
        height /= i64::from(128 / width);
    }
    let n = height * max / i64::from(threshold) - 1;
    if n <= 0 {
        return 1;
    }
    n.min(max).min(height) as usize
}

/// Split `extents` into at most `n` contiguous row bands
///
/// All bands but the last are `ceil(height / n)` rows tall, the last takes
/// what remains. Slots that would be left without rows are dropped.
///
///     use tor::{partition_rows, Rectangle};
///     let bands = partition_rows(&Rectangle::new(0, 0, 10, 10), 4);
///     let rows: Vec<_> = bands.iter().map(|b| (b.y1, b.y2)).collect();
///     assert_eq!(rows, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
///
pub fn partition_rows(extents: &Rectangle<i32>, n: usize) -> Vec<Rectangle<i32>> {
    let height = extents.height();
    let mut n = n.max(1).min(height.max(1) as usize) as i32;
    if n == 1 || height <= 0 {
        return vec![*extents];
    }
    let h = (height + n - 1) / n;
    while n > 1 && (n - 1) * h >= height {
        n -= 1;
    }
    let mut bands = Vec::with_capacity(n as usize);
    let mut y = extents.y1;
    for _ in 1..n {
        bands.push(Rectangle { y1: y, y2: y + h, ..*extents });
        y += h;
    }
    debug_assert!(y < extents.y2);
    bands.push(Rectangle { y1: y, ..*extents });
    bands
}

/// Pool of worker threads
///
/// Without a pool every task runs on the calling thread.
#[derive(Debug)]
pub struct Workers {
    pool: Option<ThreadPool>,
}

impl Workers {
    /// Pool of `max_threads` workers, none when `max_threads <= 1`
    pub fn new(max_threads: usize) -> Result<Self> {
        if max_threads <= 1 {
            return Ok(Self::single_threaded());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .thread_name(|i| format!("tor-{}", i))
            .build()
            .map_err(Error::ThreadPool)?;
        debug!("workers: {} threads", max_threads);
        Ok(Self { pool: Some(pool) })
    }
    /// Run everything on the calling thread
    pub fn single_threaded() -> Self {
        Self { pool: None }
    }
    /// Threads tasks may run on
    pub fn num_threads(&self) -> usize {
        self.pool.as_ref().map(|p| p.current_num_threads()).unwrap_or(1)
    }
    /// Run `f` once per task and wait for all of them
    ///
    /// Every task runs even if another fails; the first error is returned.
    pub fn run<T, F>(&self, tasks: Vec<T>, f: F) -> Result<()>
        where T: Send, F: Fn(T) -> Result<()> + Sync
    {
        match &self.pool {
            Some(pool) if tasks.len() > 1 => {
                trace!("running {} tasks on the pool", tasks.len());
                let results: Vec<Result<()>> = pool.install(|| {
                    tasks.into_par_iter().map(&f).collect()
                });
                results.into_iter().collect()
            }
            _ => tasks.into_iter().map(f).collect::<Vec<_>>().into_iter().collect(),
        }
    }
}

impl Default for Workers {
    fn default() -> Self {
        Self::single_threaded()
    }
}
