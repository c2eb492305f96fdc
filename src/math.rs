//! Fixed point and grid arithmetic

use crate::GRID_AREA;
use crate::SAMPLES_X;
use crate::SAMPLES_Y;

/// Rational value stored as a quotient and a remainder
///
/// The denominator is kept alongside by the owner (an edge's `dy`).
/// After every operation the remainder satisfies `0 <= rem < dy`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct QuoRem {
    pub quo: i64,
    pub rem: i64,
}

impl QuoRem {
    /// Divide `num` by `den`, rounding the quotient towards negative infinity
    ///
    ///     use tor::QuoRem;
    ///     let q = QuoRem::floor_div(-7, 2);
    ///     assert_eq!(q, QuoRem { quo: -4, rem: 1 });
    ///
    pub fn floor_div(num: i64, den: i64) -> Self {
        let mut quo = num / den;
        let mut rem = num % den;
        if (rem ^ den) < 0 && rem != 0 {
            quo -= 1;
            rem += den;
        }
        QuoRem { quo, rem }
    }
    /// `floor_div` of a 128-bit numerator whose quotient fits in 64 bits
    pub fn floor_div_wide(num: i128, den: i64) -> Self {
        let den = i128::from(den);
        let mut quo = num / den;
        let mut rem = num % den;
        if (rem ^ den) < 0 && rem != 0 {
            quo -= 1;
            rem += den;
        }
        debug_assert!(quo >= i128::from(i64::min_value()) && quo <= i128::from(i64::max_value()));
        QuoRem { quo: quo as i64, rem: rem as i64 }
    }
    /// Add `step` and renormalize the remainder into `[0, den)`
    ///
    /// `step.rem` must already be in `[0, den)`, so a single correction
    /// is enough.
    pub fn advance(&mut self, step: &QuoRem, den: i64) {
        self.quo += step.quo;
        self.rem += step.rem;
        if self.rem < 0 {
            self.quo -= 1;
            self.rem += den;
        } else if self.rem >= den {
            self.quo += 1;
            self.rem -= den;
        }
    }
    /// Round to the nearest integer, ties going down
    pub fn round(&self, den: i64) -> i64 {
        self.quo + (self.rem > den / 2) as i64
    }
}

/// Split a grid coordinate into an integer pixel and a grid fraction
///
/// The fraction is always in `[0, m)`, also for negative coordinates.
///
///     use tor::grid_to_int_frac;
///     assert_eq!(grid_to_int_frac(35, 17), (2, 1));
///     assert_eq!(grid_to_int_frac(-1, 17), (-1, 16));
///
pub fn grid_to_int_frac(t: i32, m: i32) -> (i32, i32) {
    let mut i = t / m;
    let mut f = t % m;
    if f < 0 {
        i -= 1;
        f += m;
    }
    (i, f)
}

/// Convert a 16.16 fixed point x coordinate to the nearest grid column
pub fn fixed_to_grid_x(v: i32) -> i32 {
    ((i64::from(v) * i64::from(SAMPLES_X) + (1 << 15)) >> 16) as i32
}

/// Convert a 16.16 fixed point y coordinate to the nearest grid row
pub fn fixed_to_grid_y(v: i32) -> i32 {
    ((i64::from(v) * i64::from(SAMPLES_Y) + (1 << 15)) >> 16) as i32
}

/// Coverage as a fraction in `[0, 1]`
pub fn area_to_float(c: i32) -> f32 {
    c as f32 / GRID_AREA as f32
}

/// Coverage as an 8-bit alpha value
///
///     use tor::{to_alpha, GRID_AREA};
///     assert_eq!(to_alpha(GRID_AREA), 255);
///     assert_eq!(to_alpha(0), 0);
///
pub fn to_alpha(c: i32) -> u8 {
    ((c + 1) >> 1) as u8
}

/// Multiply two u8 values using fixed point math
///
/// The result is `a * b / 255` correctly rounded.
pub fn mul_8_8(a: u8, b: u8) -> u8 {
    let base_shift = 8;
    let base_msb = 1 << (base_shift - 1);
    let (a, b) = (u32::from(a), u32::from(b));
    let t: u32 = a * b + base_msb;
    (((t >> base_shift) + t) >> base_shift) as u8
}

/// Coverage combined with a constant opacity, as an 8-bit alpha
pub fn coverage_opacity(coverage: i32, opacity: u8) -> u8 {
    let c = to_alpha(coverage);
    if opacity == 255 {
        c
    } else {
        mul_8_8(c, opacity)
    }
}

/// Scale all four channels of a packed pixel by `a`
pub fn mul_4x8_8(color: u32, a: u8) -> u32 {
    let mut out = 0;
    for shift in (0..32).step_by(8) {
        let c = (color >> shift) as u8;
        out |= u32::from(mul_8_8(c, a)) << shift;
    }
    out
}

/// Interpolate each channel between `dst` and `src` by `a`
///
/// `a == 255` yields `src`, `a == 0` yields `dst`.
pub fn lerp8x4(src: u32, a: u8, dst: u32) -> u32 {
    let mut out = 0;
    for shift in (0..32).step_by(8) {
        let s = mul_8_8((src >> shift) as u8, a);
        let d = mul_8_8((dst >> shift) as u8, !a);
        out |= u32::from(s.saturating_add(d)) << shift;
    }
    out
}

/// Saturating per channel addition of two packed pixels
pub fn add_4x8(a: u32, b: u32) -> u32 {
    let mut out = 0;
    for shift in (0..32).step_by(8) {
        let v = ((a >> shift) as u8).saturating_add((b >> shift) as u8);
        out |= u32::from(v) << shift;
    }
    out
}
