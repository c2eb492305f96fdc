extern crate tor;

use tor::{ClipRegion, Error, Format, InplaceOp, InplaceSpan, Lerp32Span, Operator, Params};
use tor::{Pixfmt, Rasterizer, Rectangle, RenderingBuffer, Solid32Span, Source, SpanSink};
use tor::{Trapezoid, GRID_AREA};

fn clip() -> ClipRegion {
    ClipRegion::rect(Rectangle::new(0, 0, 100, 100))
}

fn a8(width: usize, height: usize, v: u8) -> Pixfmt {
    let mut p = Pixfmt::new(width, height, Format::A8);
    p.fill(u32::from(v));
    p
}

/// Pixels of row `y` as u32 values
fn row(p: &Pixfmt, y: usize) -> Vec<u32> {
    (0 .. p.width()).map(|x| p.get((x, y))).collect()
}

#[test]
fn a8_span_operators() {
    let mut buf = RenderingBuffer::new(4, 1, 1);
    buf.fill(200);
    {
        let mut rows = buf.rows_mut();
        let mut span = InplaceSpan::new(&mut rows, InplaceOp::In, 255);
        span.span(&Rectangle::new(0, 0, 1, 1), 255);
        span.span(&Rectangle::new(1, 0, 2, 1), GRID_AREA);
        span.span(&Rectangle::new(2, 0, 3, 1), 0);
    }
    assert_eq!(buf.row(0), &[100, 200, 0, 200]);

    buf.fill(10);
    {
        let mut rows = buf.rows_mut();
        let mut span = InplaceSpan::new(&mut rows, InplaceOp::Src, 128);
        span.span(&Rectangle::new(0, 0, 2, 1), GRID_AREA);
        span.span(&Rectangle::new(2, 0, 3, 1), 0);
    }
    assert_eq!(buf.row(0), &[128, 128, 0, 10]);

    {
        let mut rows = buf.rows_mut();
        let mut span = InplaceSpan::new(&mut rows, InplaceOp::Add, 255);
        span.span(&Rectangle::new(0, 0, 4, 1), 255);
    }
    assert_eq!(buf.row(0), &[255, 255, 128, 138]);
}

#[test]
fn lerp_span() {
    let mut buf = RenderingBuffer::new(2, 1, 4);
    {
        let mut rows = buf.rows_mut();
        let mut span = Lerp32Span::new(&mut rows, 0xff00_ff00);
        span.span(&Rectangle::new(0, 0, 1, 1), 255);
        span.span(&Rectangle::new(1, 0, 2, 1), GRID_AREA);
    }
    let p = Pixfmt::from_buffer(buf, Format::A8r8g8b8);
    assert_eq!(row(&p, 0), vec![0x8000_8000, 0xff00_ff00]);
}

#[test]
fn solid_span_over() {
    let mut p = Pixfmt::new(2, 1, Format::A8r8g8b8);
    p.fill(0xff00_00ff);
    {
        let mut rows = p.rbuf_mut().rows_mut();
        let mut span = Solid32Span::new(&mut rows, Operator::Over, 0x8080_0000, false);
        span.span(&Rectangle::new(0, 0, 1, 1), GRID_AREA);
    }
    assert_eq!(row(&p, 0), vec![0xff80_007f, 0xff00_00ff]);
}

#[test]
fn a8_src() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let mut dst = a8(8, 8, 0x33);
    let params = Params::new(Operator::Src, &clip);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0xff00_0000), &params,
                               &[Trapezoid::rect(2, 2, 6, 4)]).unwrap();
    for y in 0 .. 8 {
        for x in 0 .. 8 {
            let inside = x >= 2 && x < 6 && y >= 2 && y < 4;
            assert_eq!(dst.get((x, y)), if inside { 0xff } else { 0x33 }, "({}, {})", x, y);
        }
    }
}

#[test]
fn a8_in() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let traps = [Trapezoid::rect(0, 0, 4, 4)];

    let mut dst = a8(4, 4, 200);
    let params = Params::new(Operator::In, &clip);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 3), vec![100; 4]);

    // In onto a clear destination changes nothing
    let mut dst = a8(4, 4, 0);
    let params = Params::new(Operator::In, &clip).clear(0);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0; 4]);

    // In onto an opaque destination is a copy
    let mut dst = a8(4, 4, 0xff);
    let params = Params::new(Operator::In, &clip).clear(0xff);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0x80; 4]);
}

#[test]
fn a8_add() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let traps = [Trapezoid::rect(0, 0, 2, 1)];

    let mut dst = a8(3, 1, 0x10);
    let params = Params::new(Operator::Add, &clip);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0x90, 0x90, 0x10]);

    // Transparent sources add nothing
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x00ff_ffff), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0x90, 0x90, 0x10]);
}

#[test]
fn a8_declines() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let traps = [Trapezoid::rect(0, 0, 2, 2)];
    let mut dst = a8(4, 4, 0);

    let params = Params::new(Operator::Over, &clip);
    match ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0xff00_0000), &params, &traps) {
        Err(Error::UnsupportedOperator { op: Operator::Over, format: Format::A8 }) => {}
        other => panic!("unexpected {:?}", other),
    }

    let image = Pixfmt::new(2, 2, Format::A8);
    let params = Params::new(Operator::Src, &clip);
    let source = Source::Image { image: &image, x: 0, y: 0 };
    match ras.trapezoid_span_inplace(&mut dst, &source, &params, &traps) {
        Err(Error::NonSolidSource) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn region_outside_destination() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let mut dst = a8(8, 8, 7);
    let params = Params::new(Operator::Src, &clip);
    match ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0xff00_0000), &params,
                                     &[Trapezoid::rect(4, 4, 12, 12)]) {
        Err(Error::OutOfBounds { width: 8, height: 8, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(dst.rbuf().data.iter().all(|&p| p == 7));
}

#[test]
fn individual_rasterisation() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let traps = [Trapezoid::rect(0, 0, 4, 1), Trapezoid::rect(2, 0, 6, 1)];

    let mut dst = a8(6, 1, 0);
    let params = Params::new(Operator::Add, &clip).mask_format(false);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0x80, 0x80, 0xff, 0xff, 0x80, 0x80]);

    let mut dst = a8(6, 1, 0);
    let params = Params::new(Operator::Add, &clip);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0x80; 6]);
}

#[test]
fn argb_solid() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let traps = [Trapezoid::rect(1, 0, 3, 1)];

    // Opaque Over is a plain fill
    let mut dst = Pixfmt::new(4, 1, Format::A8r8g8b8);
    dst.fill(0xff00_00ff);
    let params = Params::new(Operator::Over, &clip);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0xffff_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0xff00_00ff, 0xffff_0000, 0xffff_0000, 0xff00_00ff]);

    // Translucent Over blends
    let mut dst = Pixfmt::new(4, 1, Format::A8r8g8b8);
    dst.fill(0xff00_00ff);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8080_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0xff00_00ff, 0xff80_007f, 0xff80_007f, 0xff00_00ff]);

    // Over onto a clear destination is a copy
    let mut dst = Pixfmt::new(4, 1, Format::A8r8g8b8);
    let params = Params::new(Operator::Over, &clip).clear(0);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8080_0000), &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0, 0x8080_0000, 0x8080_0000, 0]);

    let params = Params::new(Operator::In, &clip);
    match ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8080_0000), &params, &traps) {
        Err(Error::UnsupportedOperator { op: Operator::In, format: Format::A8r8g8b8 }) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn xrgb_keeps_alpha() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let mut dst = Pixfmt::new(2, 1, Format::X8r8g8b8);
    dst.fill(0x0000_0010);
    let params = Params::new(Operator::Add, &clip);
    ras.trapezoid_span_inplace(&mut dst, &Source::Solid(0x8000_0010), &params,
                               &[Trapezoid::rect(0, 0, 1, 1)]).unwrap();
    assert_eq!(row(&dst, 0), vec![0xff00_0020, 0xff00_0010]);
}

#[test]
fn argb_image() {
    let ras = Rasterizer::single_threaded();
    let clip = clip();
    let mut image = Pixfmt::new(2, 2, Format::A8r8g8b8);
    image.fill(0xff00_ff00);
    let source = Source::Image { image: &image, x: 1, y: 0 };
    let traps = [Trapezoid::rect(0, 0, 4, 1)];

    let mut dst = Pixfmt::new(4, 1, Format::A8r8g8b8);
    dst.fill(0xff00_00ff);
    let params = Params::new(Operator::Over, &clip);
    ras.trapezoid_span_inplace(&mut dst, &source, &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0xff00_00ff, 0xff00_ff00, 0xff00_ff00, 0xff00_00ff]);

    // Src needs a clear destination
    let params = Params::new(Operator::Src, &clip);
    assert!(ras.trapezoid_span_inplace(&mut dst, &source, &params, &traps).is_err());
    let params = params.clear(0);
    ras.trapezoid_span_inplace(&mut dst, &source, &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0, 0xff00_ff00, 0xff00_ff00, 0]);

    // a8 images are used as alpha
    let mut alpha = Pixfmt::new(4, 1, Format::A8);
    alpha.fill(0x40);
    let source = Source::Image { image: &alpha, x: 0, y: 0 };
    let mut dst = Pixfmt::new(4, 1, Format::A8r8g8b8);
    let params = Params::new(Operator::Add, &clip);
    ras.trapezoid_span_inplace(&mut dst, &source, &params, &traps).unwrap();
    assert_eq!(row(&dst, 0), vec![0x4000_0000; 4]);
}
