//! Geometry input in 16.16 fixed point

use crate::clip::Rectangle;

/// 16.16 fixed point value
pub type Fixed = i32;

/// One in 16.16 fixed point
pub const FIXED_ONE: Fixed = 1 << 16;

/// Convert an integer to fixed point
pub fn int_to_fixed(i: i32) -> Fixed {
    i << 16
}

/// Convert a float to fixed point, truncating
pub fn double_to_fixed(d: f64) -> Fixed {
    (d * f64::from(FIXED_ONE)) as Fixed
}

/// Largest integer not greater than `f`
pub fn fixed_integer_floor(f: Fixed) -> i32 {
    f >> 16
}

/// Smallest integer not less than `f`
pub fn fixed_integer_ceil(f: Fixed) -> i32 {
    ((i64::from(f) + 0xffff) >> 16) as i32
}

/// Point in fixed point coordinates
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PointFixed {
    pub x: Fixed,
    pub y: Fixed,
}

impl PointFixed {
    pub fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }
    /// Point from integer coordinates
    pub fn from_int(x: i32, y: i32) -> Self {
        Self { x: int_to_fixed(x), y: int_to_fixed(y) }
    }
}

/// Line between two points, used as a trapezoid side
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LineFixed {
    pub p1: PointFixed,
    pub p2: PointFixed,
}

impl LineFixed {
    pub fn new(p1: PointFixed, p2: PointFixed) -> Self {
        Self { p1, p2 }
    }
    /// Horizontal position of the line at `y`
    ///
    /// The division rounds down, or up if `ceil` is set.
    ///
    ///     use tor::{LineFixed, PointFixed, int_to_fixed};
    ///     let l = LineFixed::new(PointFixed::from_int(0, 0), PointFixed::from_int(4, 8));
    ///     assert_eq!(l.x_for_y(int_to_fixed(2), false), int_to_fixed(1));
    ///
    pub fn x_for_y(&self, y: Fixed, ceil: bool) -> Fixed {
        if y == self.p1.y {
            return self.p1.x;
        }
        if y == self.p2.y {
            return self.p2.x;
        }
        let dx = i64::from(self.p2.x) - i64::from(self.p1.x);
        let ey = i64::from(self.p2.y) - i64::from(self.p1.y);
        let mut ex = (i64::from(y) - i64::from(self.p1.y)) * dx;
        if ceil {
            ex += ey - 1;
        }
        (i64::from(self.p1.x) + ex.div_euclid(ey)) as Fixed
    }
}

/// Trapezoid with horizontal top and bottom and two arbitrary sides
///
/// The sides are infinite lines through their end points, clipped to
/// `[top, bottom)`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Trapezoid {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: LineFixed,
    pub right: LineFixed,
}

impl Trapezoid {
    /// Axis aligned rectangle in integer coordinates
    ///
    ///     use tor::Trapezoid;
    ///     let t = Trapezoid::rect(0, 0, 4, 2);
    ///     assert!(t.is_valid());
    ///
    pub fn rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            top: int_to_fixed(y1),
            bottom: int_to_fixed(y2),
            left: LineFixed::new(PointFixed::from_int(x1, y1), PointFixed::from_int(x1, y2)),
            right: LineFixed::new(PointFixed::from_int(x2, y1), PointFixed::from_int(x2, y2)),
        }
    }
    /// Non empty and both sides pointing downwards
    pub fn is_valid(&self) -> bool {
        self.bottom > self.top &&
            self.left.p2.y > self.left.p1.y &&
            self.right.p2.y > self.right.p1.y
    }
    /// Whether the vertical span `[top, bottom)` touches pixel rows `[y1, y2)`
    pub fn overlaps_rows(&self, y1: i32, y2: i32) -> bool {
        !(fixed_integer_floor(self.top) >= y2 || fixed_integer_ceil(self.bottom) <= y1)
    }
    /// Both sides vertical and on pixel boundaries, with integer top and bottom
    pub fn is_rectilinear(&self) -> bool {
        let aligned = |v: Fixed| v & 0xffff == 0;
        self.left.p1.x == self.left.p2.x &&
            self.right.p1.x == self.right.p2.x &&
            aligned(self.left.p1.x) && aligned(self.right.p1.x) &&
            aligned(self.top) && aligned(self.bottom)
    }
}

/// Span of a trapezoid at one y
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SpanFix {
    pub l: Fixed,
    pub r: Fixed,
    pub y: Fixed,
}

/// Trapezoid given by its top and bottom spans
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Trap {
    pub top: SpanFix,
    pub bot: SpanFix,
}

impl Trap {
    /// Left side as a line
    pub fn left(&self) -> LineFixed {
        LineFixed::new(PointFixed::new(self.top.l, self.top.y),
                       PointFixed::new(self.bot.l, self.bot.y))
    }
    /// Right side as a line, from bottom to top
    pub fn right(&self) -> LineFixed {
        LineFixed::new(PointFixed::new(self.bot.r, self.bot.y),
                       PointFixed::new(self.top.r, self.top.y))
    }
}

/// Integer bounds of all valid trapezoids
///
/// Returns `None` when there is nothing to draw.
///
///     use tor::{trapezoids_bounds, Trapezoid};
///     let b = trapezoids_bounds(&[Trapezoid::rect(1, 2, 5, 6)]).unwrap();
///     assert_eq!((b.x1, b.y1, b.x2, b.y2), (1, 2, 5, 6));
///
pub fn trapezoids_bounds(traps: &[Trapezoid]) -> Option<Rectangle<i32>> {
    let mut x1 = Fixed::max_value();
    let mut x2 = Fixed::min_value();
    let mut y1 = Fixed::max_value();
    let mut y2 = Fixed::min_value();
    for t in traps.iter().filter(|t| t.is_valid()) {
        y1 = y1.min(t.top);
        y2 = y2.max(t.bottom);
        let l = t.left.x_for_y(t.top, false).min(t.left.x_for_y(t.bottom, false));
        let r = t.right.x_for_y(t.top, true).max(t.right.x_for_y(t.bottom, true));
        x1 = x1.min(l);
        x2 = x2.max(r);
    }
    if x1 >= x2 || y1 >= y2 {
        return None;
    }
    Some(Rectangle::new(fixed_integer_floor(x1), fixed_integer_floor(y1),
                        fixed_integer_ceil(x2), fixed_integer_ceil(y2)))
}

/// Integer bounds of a set of points
pub fn points_bounds(points: &[PointFixed]) -> Option<Rectangle<i32>> {
    let first = points.first()?;
    let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        x1 = x1.min(p.x);
        x2 = x2.max(p.x);
        y1 = y1.min(p.y);
        y2 = y2.max(p.y);
    }
    let b = Rectangle::new(fixed_integer_floor(x1), fixed_integer_floor(y1),
                           fixed_integer_ceil(x2), fixed_integer_ceil(y2));
    if b.is_empty() {
        None
    } else {
        Some(b)
    }
}

/// Integer bounds of a set of xTraps
pub fn traps_bounds(traps: &[Trap]) -> Option<Rectangle<i32>> {
    let mut b: Option<Rectangle<i32>> = None;
    for t in traps.iter().filter(|t| t.bot.y > t.top.y) {
        let r = Rectangle::new(fixed_integer_floor(t.top.l.min(t.bot.l)),
                               fixed_integer_floor(t.top.y),
                               fixed_integer_ceil(t.top.r.max(t.bot.r)),
                               fixed_integer_ceil(t.bot.y));
        b = Some(match b {
            Some(b) => b.union(&r),
            None => r,
        });
    }
    b.filter(|b| !b.is_empty())
}
