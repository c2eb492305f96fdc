//! Writing of masks and surfaces as PNG files, for inspection

use std::path::Path;

use crate::buffer::RenderingBuffer;
use crate::color::Rgba8;
use crate::converter::Mask;
use crate::pixfmt::{Format, Pixfmt};

/// Write an 8-bit buffer as a grayscale image
pub fn write_gray<P: AsRef<Path>>(buf: &RenderingBuffer, filename: P) -> Result<(), std::io::Error> {
    let mut data = Vec::with_capacity(buf.width * buf.height);
    for y in 0 .. buf.height {
        data.extend_from_slice(buf.row(y));
    }
    image::save_buffer(filename, &data, buf.width as u32, buf.height as u32, image::Gray(8))
}

/// Read an image back as 8-bit gray values, with its width and height
pub fn read_gray<P: AsRef<Path>>(filename: P) -> Result<(Vec<u8>, usize, usize), image::ImageError> {
    let img = image::open(filename)?.to_luma();
    let (w, h) = img.dimensions();
    Ok((img.into_raw(), w as usize, h as usize))
}

impl Mask {
    /// Write the mask as a grayscale image
    pub fn to_file<P: AsRef<Path>>(&self, filename: P) -> Result<(), std::io::Error> {
        write_gray(&self.buffer, filename)
    }
}

impl Pixfmt {
    /// Write the surface as an image
    ///
    /// a8 surfaces become grayscale, 32-bit surfaces are unpremultiplied
    /// into RGBA.
    pub fn to_file<P: AsRef<Path>>(&self, filename: P) -> Result<(), std::io::Error> {
        if self.format() == Format::A8 {
            return write_gray(self.rbuf(), filename);
        }
        let mut data = Vec::with_capacity(self.width() * self.height() * 4);
        for y in 0 .. self.height() {
            for x in 0 .. self.width() {
                let c = Rgba8::from_argb32(self.get((x, y)));
                data.extend_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
        image::save_buffer(filename, &data, self.width() as u32, self.height() as u32,
                           image::RGBA(8))
    }
}
