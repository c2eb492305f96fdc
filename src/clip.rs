//! Rectangles and clip regions

/// Rectangle
///
/// For integer rectangles the maximum edges are exclusive, a box
/// `(0, 0, 4, 2)` covers 4 x 2 pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rectangle<T: std::cmp::PartialOrd + Copy> {
    /// Minimum x value
    pub x1: T,
    /// Minimum y value
    pub y1: T,
    /// Maximum x value
    pub x2: T,
    /// Maximum y value
    pub y2: T,
}

impl<T> Rectangle<T> where T: std::cmp::PartialOrd + Copy {
    /// Create a new Rectangle
    ///
    /// Values are sorted before storing
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        Self { x1, y1, x2, y2 }
    }
    /// Expand if the point (x,y) is outside
    pub fn expand(&mut self, x: T, y: T) {
        if x < self.x1 { self.x1 = x; }
        if x > self.x2 { self.x2 = x; }
        if y < self.y1 { self.y1 = y; }
        if y > self.y2 { self.y2 = y; }
    }
    /// Expand if the rectangle is outside
    pub fn expand_rect(&mut self, r: &Rectangle<T>) {
        self.expand(r.x1, r.y1);
        self.expand(r.x2, r.y2);
    }
    /// Smallest rectangle containing both
    pub fn union(&self, r: &Rectangle<T>) -> Self {
        let mut out = *self;
        out.expand_rect(r);
        out
    }
}

impl Rectangle<i32> {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
    /// No pixels inside
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }
    /// Shift by (dx, dy)
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self { x1: self.x1 + dx, y1: self.y1 + dy, x2: self.x2 + dx, y2: self.y2 + dy }
    }
    /// Overlap of two rectangles, `None` if they do not overlap
    ///
    ///     use tor::Rectangle;
    ///     let a = Rectangle::new(0, 0, 4, 4);
    ///     let b = Rectangle::new(2, 1, 8, 3);
    ///     assert_eq!(a.intersect(&b), Some(Rectangle::new(2, 1, 4, 3)));
    ///     assert_eq!(a.intersect(&Rectangle::new(4, 0, 5, 4)), None);
    ///
    pub fn intersect(&self, r: &Rectangle<i32>) -> Option<Self> {
        let out = Self {
            x1: self.x1.max(r.x1),
            y1: self.y1.max(r.y1),
            x2: self.x2.min(r.x2),
            y2: self.y2.min(r.y2),
        };
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
    /// Whether `r` lies entirely inside
    pub fn contains(&self, r: &Rectangle<i32>) -> bool {
        r.x1 >= self.x1 && r.x2 <= self.x2 && r.y1 >= self.y1 && r.y2 <= self.y2
    }
}

/// Clip region made of y-banded, non-overlapping boxes
///
/// Boxes are stored top to bottom, left to right within a band, so the
/// bottom edges never decrease. A region with a single box is "simple"
/// and only its extents are used.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRegion {
    extents: Rectangle<i32>,
    boxes: Vec<Rectangle<i32>>,
}

impl ClipRegion {
    /// Region made of a single rectangle
    pub fn rect(r: Rectangle<i32>) -> Self {
        Self { extents: r, boxes: vec![r] }
    }
    /// Region from y-banded boxes
    ///
    /// Empty boxes are dropped and the boxes are sorted into band order.
    ///
    ///     use tor::{ClipRegion, Rectangle};
    ///     let r = ClipRegion::from_boxes(vec![Rectangle::new(0, 4, 8, 8),
    ///                                         Rectangle::new(0, 0, 2, 4)]);
    ///     assert!(r.is_complex());
    ///     assert_eq!(r.extents(), &Rectangle::new(0, 0, 8, 8));
    ///
    pub fn from_boxes(mut boxes: Vec<Rectangle<i32>>) -> Self {
        boxes.retain(|b| !b.is_empty());
        boxes.sort_by_key(|b| (b.y1, b.x1));
        let extents = match boxes.first() {
            Some(first) => boxes.iter().fold(*first, |e, b| e.union(b)),
            None => Rectangle::default(),
        };
        debug_assert!(boxes.windows(2).all(|w| w[0].y2 <= w[1].y2),
                      "clip boxes are not y-banded");
        Self { extents, boxes }
    }
    pub fn extents(&self) -> &Rectangle<i32> {
        &self.extents
    }
    pub fn boxes(&self) -> &[Rectangle<i32>] {
        &self.boxes
    }
    /// More than one box, spans have to be split against the boxes
    pub fn is_complex(&self) -> bool {
        self.boxes.len() > 1
    }
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
    /// Restrict the region to `r`
    pub fn intersect_rect(&self, r: &Rectangle<i32>) -> Self {
        let boxes = self.boxes.iter().filter_map(|b| b.intersect(r)).collect();
        Self::from_boxes(boxes)
    }
}

/// Index of the first box whose bottom edge lies below `y`
///
/// Boxes before the returned index cannot intersect anything at or below
/// row `y`.
pub fn find_clip_box_for_y(boxes: &[Rectangle<i32>], y: i32) -> usize {
    boxes.partition_point(|b| b.y2 <= y)
}

/// Call `f` with every non empty intersection of `r` and the clip boxes
pub fn for_each_clipped<F>(boxes: &[Rectangle<i32>], r: &Rectangle<i32>, mut f: F)
    where F: FnMut(&Rectangle<i32>)
{
    let start = find_clip_box_for_y(boxes, r.y1);
    for c in &boxes[start..] {
        if c.y1 >= r.y2 {
            break;
        }
        if let Some(piece) = r.intersect(c) {
            f(&piece);
        }
    }
}
