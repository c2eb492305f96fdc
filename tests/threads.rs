extern crate tor;

use std::sync::atomic::{AtomicUsize, Ordering};

use tor::{partition_rows, use_threads, BoxRecorder, ClipRegion, Config, Error, Format};
use tor::{LineFixed, Operator, Params, Pixfmt, PointFixed, Rasterizer, Rectangle, Source};
use tor::{Trapezoid, Workers};

/// Rasterizers with more than one worker
fn threaded() -> Vec<Rasterizer> {
    [2, 4].iter().map(|&n| Rasterizer::new(Config::default().max_threads(n)).unwrap()).collect()
}

/// Slanted trapezoid, never rectilinear
fn slanted(x1: i32, y1: i32, x2: i32, y2: i32) -> Trapezoid {
    let w = x2 - x1;
    Trapezoid {
        top: tor::int_to_fixed(y1),
        bottom: tor::int_to_fixed(y2),
        left: LineFixed::new(PointFixed::from_int(x1 + w / 4, y1), PointFixed::from_int(x1, y2)),
        right: LineFixed::new(PointFixed::from_int(x2 - w / 3, y1), PointFixed::from_int(x2, y2)),
    }
}

/// Per pixel opacity of recorded boxes
fn opacity_map(rec: &BoxRecorder, width: usize, height: usize) -> Vec<f32> {
    let mut map = vec![0.0; width * height];
    for b in rec.take() {
        for y in b.bounds.y1 .. b.bounds.y2 {
            for x in b.bounds.x1 .. b.bounds.x2 {
                map[y as usize * width + x as usize] += b.alpha;
            }
        }
    }
    map
}

#[test]
fn thread_counts() {
    assert_eq!(use_threads(0, 100, 8, 4), 1);
    assert_eq!(use_threads(100, 0, 8, 4), 1);
    assert_eq!(use_threads(1000, 4, 64, 16), 1);
    assert_eq!(use_threads(1000, 1000, 8, 16), 16);
    // Narrow shapes count as fewer rows
    assert!(use_threads(16, 64, 8, 16) < use_threads(128, 64, 8, 16));
}

#[test]
fn partitions_cover_extents() {
    for height in 1 .. 40 {
        for n in 1 .. 12 {
            let extents = Rectangle::new(3, 5, 9, 5 + height);
            let bands = partition_rows(&extents, n);
            assert!(!bands.is_empty() && bands.len() <= n, "h {} n {}", height, n);
            assert_eq!(bands[0].y1, extents.y1);
            assert_eq!(bands[bands.len() - 1].y2, extents.y2);
            for w in bands.windows(2) {
                assert_eq!(w[0].y2, w[1].y1);
            }
            for b in &bands {
                assert!(b.height() > 0, "h {} n {}: empty band", height, n);
                assert_eq!((b.x1, b.x2), (extents.x1, extents.x2));
            }
        }
    }
}

#[test]
fn partition_drops_empty_slots() {
    let bands = partition_rows(&Rectangle::new(0, 0, 4, 10), 8);
    let rows: Vec<_> = bands.iter().map(|b| (b.y1, b.y2)).collect();
    assert_eq!(rows, vec![(0, 2), (2, 4), (4, 6), (6, 8), (8, 10)]);
}

#[test]
fn workers_run_every_task() {
    let workers = Workers::new(4).unwrap();
    assert_eq!(workers.num_threads(), 4);
    let count = AtomicUsize::new(0);
    let res = workers.run((0 .. 8).collect(), |i: i32| {
        count.fetch_add(1, Ordering::SeqCst);
        if i == 3 { Err(Error::OutOfMemory) } else { Ok(()) }
    });
    assert!(matches!(res, Err(Error::OutOfMemory)));
    assert_eq!(count.load(Ordering::SeqCst), 8);
}

#[test]
fn single_threaded_workers() {
    let workers = Workers::new(1).unwrap();
    assert_eq!(workers.num_threads(), 1);
    let count = AtomicUsize::new(0);
    workers.run(vec![(); 3], |_| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn threaded_spans_match_single() {
    let clip = ClipRegion::rect(Rectangle::new(0, 0, 200, 200));
    let params = Params::new(Operator::Over, &clip);
    let traps = [slanted(10, 5, 190, 195), slanted(40, 60, 120, 100)];

    let single = BoxRecorder::threaded();
    Rasterizer::single_threaded()
        .trapezoid_span_converter(&single, &params, &traps, None).unwrap();
    assert_eq!(single.finished(), 1);
    let want = opacity_map(&single, 200, 200);
    for ras in threaded() {
        let many = BoxRecorder::threaded();
        ras.trapezoid_span_converter(&many, &params, &traps, None).unwrap();
        assert_eq!(many.finished(), 1);
        assert_eq!(want, opacity_map(&many, 200, 200), "{} threads", ras.config().max_threads);
    }
}

#[test]
fn threaded_masks_match_single() {
    let clip = ClipRegion::rect(Rectangle::new(0, 0, 400, 200));
    let params = Params::new(Operator::Over, &clip).origin(3, 2);
    // Narrow masks accumulate in place, wide ones go through spans
    for traps in &[[slanted(0, 0, 100, 150)], [slanted(0, 0, 300, 150)]] {
        let a = Rasterizer::single_threaded().trapezoid_mask(&params, traps).unwrap();
        assert!(a.is_some());
        for ras in threaded() {
            assert_eq!(a, ras.trapezoid_mask(&params, traps).unwrap());
        }
    }
}

#[test]
fn threaded_inplace_matches_single() {
    let clip = ClipRegion::rect(Rectangle::new(0, 0, 160, 160));
    let traps = [slanted(4, 4, 150, 156)];
    for &(format, op, color) in &[(Format::A8, Operator::Src, 0xc000_0000),
                                  (Format::A8, Operator::Add, 0x4000_0000),
                                  (Format::A8r8g8b8, Operator::Over, 0x8040_2010)] {
        let params = Params::new(op, &clip);
        let mut a = Pixfmt::new(160, 160, format);
        a.fill(0x3030_3030);
        let fresh = a.clone();
        Rasterizer::single_threaded()
            .trapezoid_span_inplace(&mut a, &Source::Solid(color), &params, &traps).unwrap();
        for ras in threaded() {
            let mut b = fresh.clone();
            ras.trapezoid_span_inplace(&mut b, &Source::Solid(color), &params, &traps).unwrap();
            assert!(a == b, "{:?} {:?} differs with {} threads",
                    format, op, ras.config().max_threads);
        }
    }
}
