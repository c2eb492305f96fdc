//! Colors

use crate::math::mul_8_8;

/// Convert an f64 [0,1] component to a u8 [0,255] component
pub fn cu8(v: f64) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

/// Color as Red, Green, Blue, and Alpha, not premultiplied
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba8 {
    /// White Color (255,255,255,255)
    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
    /// Black Color (0,0,0,255)
    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
    /// Fully transparent
    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
    /// Create new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba8 { r, g, b, a }
    }
    /// Create from [0,1] components
    pub fn from_f64(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::new(cu8(r), cu8(g), cu8(b), cu8(a))
    }
    /// Premultiplied a8r8g8b8 pixel value
    ///
    ///     use tor::Rgba8;
    ///     assert_eq!(Rgba8::new(255, 0, 0, 255).to_argb32(), 0xffff0000);
    ///     assert_eq!(Rgba8::new(255, 255, 255, 0).to_argb32(), 0);
    ///
    pub fn to_argb32(&self) -> u32 {
        let pre = |c: u8| u32::from(mul_8_8(c, self.a));
        u32::from(self.a) << 24 | pre(self.r) << 16 | pre(self.g) << 8 | pre(self.b)
    }
    /// Color from a premultiplied a8r8g8b8 pixel value
    pub fn from_argb32(p: u32) -> Self {
        let a = alpha(p);
        let un = |c: u32| -> u8 {
            let c = (c & 0xff) as u8;
            if a == 0 {
                0
            } else {
                ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
            }
        };
        Self::new(un(p >> 16), un(p >> 8), un(p), a)
    }
    /// Alpha only value, as stored in an a8 surface
    pub fn to_a8(&self) -> u8 {
        self.a
    }
}

/// Alpha channel of an a8r8g8b8 pixel
pub fn alpha(p: u32) -> u8 {
    (p >> 24) as u8
}
