extern crate tor;

use tor::{BoxRecorder, ClippedSpan, Damage, DirectSpan, MaskSpan, RegionSpan, ThreadBoxes};
use tor::{Rectangle, RenderingBuffer, SpanSink, GRID_AREA, SPAN_THREAD_MAX_BOXES};

#[test]
fn thread_boxes_coalesce_rows() {
    let rec = BoxRecorder::threaded();
    let mut boxes = ThreadBoxes::new(&rec);
    boxes.span(&Rectangle::new(0, 0, 4, 1), GRID_AREA);
    boxes.span(&Rectangle::new(0, 1, 4, 2), GRID_AREA);
    boxes.span(&Rectangle::new(0, 2, 4, 4), GRID_AREA);
    // Different opacity starts a new box
    boxes.span(&Rectangle::new(0, 4, 4, 5), GRID_AREA / 2);
    // Different columns too
    boxes.span(&Rectangle::new(1, 5, 4, 6), GRID_AREA / 2);
    assert_eq!(boxes.pending().len(), 3);
    assert_eq!(boxes.pending()[0].bounds, Rectangle::new(0, 0, 4, 4));
    assert_eq!(boxes.pending()[0].alpha, 1.0);
    assert_eq!(boxes.pending()[1].alpha, 0.5);
    boxes.flush();
    assert!(boxes.pending().is_empty());
    assert_eq!(rec.take().len(), 3);
}

#[test]
fn thread_boxes_flush_when_full() {
    let rec = BoxRecorder::threaded();
    let mut boxes = ThreadBoxes::new(&rec);
    for i in 0 .. SPAN_THREAD_MAX_BOXES as i32 + 1 {
        let x = (i % 2) * 4;
        boxes.span(&Rectangle::new(x, i, x + 2, i + 1), GRID_AREA);
    }
    assert_eq!(boxes.pending().len(), 1);
    assert_eq!(rec.take().len(), SPAN_THREAD_MAX_BOXES);
    boxes.flush();
    assert_eq!(rec.take().len(), 1);
}

#[test]
fn thread_boxes_clip() {
    let clip = [Rectangle::new(0, 0, 2, 2), Rectangle::new(4, 0, 6, 2),
                Rectangle::new(0, 2, 8, 4)];
    let rec = BoxRecorder::threaded();
    let mut boxes = ThreadBoxes::clipped(&rec, &clip);
    boxes.span(&Rectangle::new(1, 0, 8, 1), GRID_AREA);
    boxes.span(&Rectangle::new(1, 3, 3, 4), GRID_AREA);
    boxes.flush();
    let got: Vec<_> = rec.take().iter().map(|b| b.bounds).collect();
    assert_eq!(got, vec![Rectangle::new(1, 0, 2, 1),
                         Rectangle::new(4, 0, 6, 1),
                         Rectangle::new(1, 3, 3, 4)]);
}

#[test]
fn clipped_span_forwards_pieces() {
    let clip = [Rectangle::new(0, 0, 3, 2), Rectangle::new(5, 0, 9, 2)];
    let mut pieces = vec![];
    {
        let mut span = ClippedSpan::new(|r: &Rectangle<i32>, c: i32| pieces.push((*r, c)), &clip);
        span.span(&Rectangle::new(2, 1, 7, 3), 100);
        span.span(&Rectangle::new(3, 0, 5, 1), 100);
    }
    assert_eq!(pieces, vec![(Rectangle::new(2, 1, 3, 2), 100),
                            (Rectangle::new(5, 1, 7, 2), 100)]);
}

#[test]
fn direct_span_damage() {
    let rec = BoxRecorder::new();
    let mut damage = Damage::new();
    {
        let mut span = DirectSpan::with_damage(&rec, &mut damage, 10, 20);
        span.span(&Rectangle::new(0, 0, 4, 2), GRID_AREA);
        span.span(&Rectangle::new(4, 0, 5, 2), 255);
    }
    let boxes = rec.take();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].bounds, Rectangle::new(0, 0, 4, 2));
    assert_eq!(boxes[1].alpha, 0.5);
    assert_eq!(damage.boxes().len(), 2);
    assert_eq!(damage.extents(), Some(Rectangle::new(10, 20, 15, 22)));
    assert_eq!(damage.area(), 10);
}

#[test]
fn region_span_splits_against_clip() {
    let clip = [Rectangle::new(0, 0, 2, 4), Rectangle::new(4, 0, 6, 4)];
    let rec = BoxRecorder::new();
    let mut damage = Damage::new();
    {
        let mut span = RegionSpan::with_damage(&rec, &clip, &mut damage, 1, 1);
        span.span(&Rectangle::new(1, 1, 5, 2), GRID_AREA);
        span.span(&Rectangle::new(2, 2, 4, 3), GRID_AREA);
    }
    let got: Vec<_> = rec.take().iter().map(|b| b.bounds).collect();
    assert_eq!(got, vec![Rectangle::new(1, 1, 2, 2), Rectangle::new(4, 1, 5, 2)]);
    assert_eq!(damage.boxes(), &[Rectangle::new(2, 2, 3, 3), Rectangle::new(5, 2, 6, 3)]);
}

#[test]
fn mask_span_writes_alpha() {
    let mut buf = RenderingBuffer::new(4, 2, 1);
    {
        let mut rows = buf.rows_mut();
        let mut span = MaskSpan::new(&mut rows);
        span.span(&Rectangle::new(1, 0, 3, 2), GRID_AREA);
        span.span(&Rectangle::new(0, 0, 1, 2), 240);
        span.span(&Rectangle::new(3, 1, 4, 2), 0);
    }
    assert_eq!(buf.row(0), &[120, 255, 255, 0]);
    assert_eq!(buf.row(1), &[120, 255, 255, 0]);
}

#[test]
fn damage_ignores_empty_boxes() {
    let mut damage = Damage::new();
    damage.add_box(&Rectangle::new(3, 3, 3, 5));
    assert!(damage.boxes().is_empty());
    assert_eq!(damage.extents(), None);
}
