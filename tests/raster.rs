extern crate tor;

use tor::{Rectangle, Tor, Trapezoid, Trap, SpanFix, PointFixed, LineFixed};
use tor::{RenderingBuffer, GRID_AREA, SAMPLES_X, SAMPLES_Y, int_to_fixed, to_alpha};

/// Coverage of every pixel of `extents`, None where no span was emitted
fn coverage_map(ras: &mut Tor, unbounded: bool) -> Vec<Vec<Option<i32>>> {
    let e = *ras.extents();
    let mut map = vec![vec![None; e.width() as usize]; e.height() as usize];
    ras.render(&mut |r: &Rectangle<i32>, c: i32| {
        for y in r.y1 .. r.y2 {
            for x in r.x1 .. r.x2 {
                let cell = &mut map[(y - e.y1) as usize][(x - e.x1) as usize];
                assert!(cell.is_none(), "pixel ({}, {}) emitted twice", x, y);
                *cell = Some(c);
            }
        }
    }, unbounded);
    map
}

fn trapezoid(top: f64, bottom: f64, left: [(f64, f64); 2], right: [(f64, f64); 2]) -> Trapezoid {
    let p = |(x, y): (f64, f64)| PointFixed::new(tor::double_to_fixed(x), tor::double_to_fixed(y));
    Trapezoid {
        top: tor::double_to_fixed(top),
        bottom: tor::double_to_fixed(bottom),
        left: LineFixed::new(p(left[0]), p(left[1])),
        right: LineFixed::new(p(right[0]), p(right[1])),
    }
}

#[test]
fn rectangle_full_coverage() {
    let mut tor = Tor::new(&Rectangle::new(0, 0, 8, 8), 2).unwrap();
    tor.add_trapezoid(&Trapezoid::rect(2, 2, 6, 5), 0, 0);
    let map = coverage_map(&mut tor, false);
    for (y, row) in map.iter().enumerate() {
        for (x, c) in row.iter().enumerate() {
            let inside = x >= 2 && x < 6 && y >= 2 && y < 5;
            if inside {
                assert_eq!(*c, Some(GRID_AREA), "({}, {})", x, y);
            } else {
                assert_eq!(*c, None, "({}, {})", x, y);
            }
        }
    }
}

#[test]
fn half_pixel_edge() {
    let t = trapezoid(0.0, 1.0, [(0.5, 0.0), (0.5, 1.0)], [(2.0, 0.0), (2.0, 1.0)]);
    let mut tor = Tor::new(&Rectangle::new(0, 0, 4, 1), 2).unwrap();
    tor.add_trapezoid(&t, 0, 0);
    let map = coverage_map(&mut tor, false);
    // 0.5 lands on grid column 9 of 17
    assert_eq!(map[0][0], Some(GRID_AREA - 2 * 9 * 15));
    assert_eq!(map[0][1], Some(GRID_AREA));
    assert_eq!(map[0][2], None);
    assert_eq!(to_alpha(GRID_AREA - 2 * 9 * 15), 120);
}

#[test]
fn area_matches_geometry() {
    let t = trapezoid(0.0, 10.0, [(0.0, 0.0), (5.0, 10.0)], [(20.0, 0.0), (20.0, 10.0)]);
    let mut tor = Tor::new(&Rectangle::new(0, 0, 24, 10), 2).unwrap();
    tor.add_trapezoid(&t, 0, 0);
    let mut area = 0.0;
    tor.render(&mut |r: &Rectangle<i32>, c: i32| {
        area += f64::from(r.width() * r.height()) * f64::from(c) / f64::from(GRID_AREA);
    }, false);
    assert!((area - 175.0).abs() < 0.5, "area {}", area);
}

#[test]
fn unbounded_covers_extents() {
    let mut tor = Tor::new(&Rectangle::new(0, 0, 6, 4), 2).unwrap();
    tor.add_trapezoid(&Trapezoid::rect(1, 1, 3, 2), 0, 0);
    let map = coverage_map(&mut tor, true);
    for (y, row) in map.iter().enumerate() {
        for (x, c) in row.iter().enumerate() {
            let want = if y == 1 && x >= 1 && x < 3 { GRID_AREA } else { 0 };
            assert_eq!(*c, Some(want), "({}, {})", x, y);
        }
    }
}

#[test]
fn empty_shape_emits_nothing() {
    let mut tor = Tor::new(&Rectangle::new(0, 0, 6, 4), 2).unwrap();
    let mut n = 0;
    tor.render(&mut |_: &Rectangle<i32>, _: i32| n += 1, false);
    assert_eq!(n, 0);
}

#[test]
fn invalid_trapezoid_is_skipped() {
    let mut tor = Tor::new(&Rectangle::new(0, 0, 6, 4), 2).unwrap();
    let mut t = Trapezoid::rect(0, 0, 4, 4);
    t.bottom = t.top;
    tor.add_trapezoid(&t, 0, 0);
    assert_eq!(tor.num_edges(), 0);
}

#[test]
fn offset_moves_geometry() {
    let mut tor = Tor::new(&Rectangle::new(0, 0, 8, 8), 2).unwrap();
    tor.add_trapezoid(&Trapezoid::rect(0, 0, 2, 2), 3 * SAMPLES_X, 4 * SAMPLES_Y);
    let map = coverage_map(&mut tor, false);
    assert_eq!(map[4][3], Some(GRID_AREA));
    assert_eq!(map[5][4], Some(GRID_AREA));
    assert_eq!(map[0][0], None);
    assert_eq!(map[6][3], None);
}

#[test]
fn geometry_outside_extents_is_clipped() {
    let mut tor = Tor::new(&Rectangle::new(2, 2, 6, 6), 2).unwrap();
    tor.add_trapezoid(&Trapezoid::rect(0, 0, 8, 8), 0, 0);
    let map = coverage_map(&mut tor, false);
    assert!(map.iter().flatten().all(|c| *c == Some(GRID_AREA)));
}

#[test]
fn tristrip_square() {
    let points = [PointFixed::from_int(0, 0), PointFixed::from_int(4, 0),
                  PointFixed::from_int(0, 4), PointFixed::from_int(4, 4)];
    let mut tor = Tor::new(&Rectangle::new(0, 0, 4, 4), 2 * points.len()).unwrap();
    tor.add_tristrip(&points, 0, 0);
    assert_eq!(tor.num_edges(), 2);
    let map = coverage_map(&mut tor, false);
    assert!(map.iter().flatten().all(|c| *c == Some(GRID_AREA)));
}

#[test]
fn short_tristrip_is_ignored() {
    let points = [PointFixed::from_int(0, 0), PointFixed::from_int(4, 4)];
    let mut tor = Tor::new(&Rectangle::new(0, 0, 4, 4), 4).unwrap();
    tor.add_tristrip(&points, 0, 0);
    assert_eq!(tor.num_edges(), 0);
}

#[test]
fn trap_matches_trapezoid() {
    let trap = Trap {
        top: SpanFix { l: 0, r: int_to_fixed(4), y: 0 },
        bot: SpanFix { l: 0, r: int_to_fixed(4), y: int_to_fixed(2) },
    };
    let mut a = Tor::new(&Rectangle::new(0, 0, 6, 3), 2).unwrap();
    a.add_trap(&trap, 0, 0);
    let mut b = Tor::new(&Rectangle::new(0, 0, 6, 3), 2).unwrap();
    b.add_trapezoid(&Trapezoid::rect(0, 0, 4, 2), 0, 0);
    assert_eq!(coverage_map(&mut a, true), coverage_map(&mut b, true));
}

#[test]
fn inplace_matches_spans() {
    let t = trapezoid(0.0, 8.0, [(0.0, 0.0), (6.0, 8.0)], [(12.0, 0.0), (14.0, 8.0)]);
    let extents = Rectangle::new(0, 0, 16, 8);

    let mut tor = Tor::new(&extents, 2).unwrap();
    tor.add_trapezoid(&t, 0, 0);
    let map = coverage_map(&mut tor, true);

    let mut buf = RenderingBuffer::new(16, 8, 1);
    buf.fill(0x55);
    let mut tor = Tor::new(&extents, 2).unwrap();
    tor.add_trapezoid(&t, 0, 0);
    tor.render_inplace(&mut buf.rows_mut());

    for y in 0 .. 8 {
        for x in 0 .. 16 {
            let want = map[y][x].map(to_alpha).unwrap_or(0);
            assert_eq!(buf.row(y)[x], want, "({}, {})", x, y);
        }
    }
}

#[test]
fn inplace_vertical_edges_reach_full_alpha() {
    let mut buf = RenderingBuffer::new(8, 6, 1);
    let mut tor = Tor::new(&Rectangle::new(0, 0, 8, 6), 2).unwrap();
    tor.add_trapezoid(&Trapezoid::rect(1, 1, 7, 5), 0, 0);
    tor.render_inplace(&mut buf.rows_mut());
    for y in 0 .. 6 {
        for x in 0 .. 8 {
            let inside = x >= 1 && x < 7 && y >= 1 && y < 5;
            assert_eq!(buf.row(y)[x], if inside { 255 } else { 0 }, "({}, {})", x, y);
        }
    }
}

#[test]
fn winding_is_nonzero() {
    // Two overlapping rectangles count once
    let mut tor = Tor::new(&Rectangle::new(0, 0, 8, 2), 4).unwrap();
    tor.add_trapezoid(&Trapezoid::rect(0, 0, 5, 2), 0, 0);
    tor.add_trapezoid(&Trapezoid::rect(3, 0, 8, 2), 0, 0);
    let map = coverage_map(&mut tor, false);
    assert!(map.iter().flatten().all(|c| *c == Some(GRID_AREA)));
}

#[test]
fn too_tall_extents_fail() {
    let h = i32::max_value() / SAMPLES_Y;
    let r = Rectangle::new(0, -h, 4, h);
    match Tor::new(&r, 2) {
        Err(tor::Error::ExtentTooLarge(_)) => {}
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn long_edge_area() {
    let t = Trapezoid {
        top: 0,
        bottom: int_to_fixed(1),
        left: LineFixed::new(PointFixed::from_int(0, -32000), PointFixed::from_int(32000, 32000)),
        right: LineFixed::new(PointFixed::from_int(32000, 0), PointFixed::from_int(32000, 1)),
    };
    let mut tor = Tor::new(&Rectangle::new(15990, 0, 32001, 1), 2).unwrap();
    tor.add_trapezoid(&t, 0, 0);
    let mut area = 0.0;
    tor.render(&mut |r: &Rectangle<i32>, c: i32| {
        area += f64::from(r.width() * r.height()) * f64::from(c) / f64::from(GRID_AREA);
    }, false);
    assert!((area - 15999.75).abs() < 0.25, "area {}", area);
}
