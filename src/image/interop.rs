//! Adapter between the `image` crate's RGBA buffers and the pixel contract.
//!
//! Available when the `image-interop` feature is enabled.

use crate::image::{Argb, ArgbImage, PixelBuffer};
use crate::util::{RectifyError, RectifyResult};
use ::image::{Rgba, RgbaImage};

impl PixelBuffer for RgbaImage {
    fn width(&self) -> usize {
        ::image::ImageBuffer::width(self) as usize
    }

    fn height(&self) -> usize {
        ::image::ImageBuffer::height(self) as usize
    }

    fn pixel(&self, x: usize, y: usize) -> u32 {
        let [r, g, b, a] = self.get_pixel(x as u32, y as u32).0;
        Argb::new(a, r, g, b).to_packed()
    }

    fn set_pixel(&mut self, x: usize, y: usize, value: u32) {
        let c = Argb::from_packed(value);
        self.put_pixel(x as u32, y as u32, Rgba([c.r, c.g, c.b, c.a]));
    }

    fn allocate_like(&self, width: usize, height: usize) -> Self {
        RgbaImage::new(width as u32, height as u32)
    }
}

/// Copies an RGBA image into an owned ARGB buffer.
pub fn argb_from_rgba(img: &RgbaImage) -> RectifyResult<ArgbImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            Argb::new(a, r, g, b).to_packed()
        })
        .collect();
    ArgbImage::from_vec(data, width, height)
}

/// Copies an ARGB buffer into an RGBA image.
pub fn rgba_from_argb(img: &ArgbImage) -> RectifyResult<RgbaImage> {
    let width = u32::try_from(img.width()).map_err(|_| RectifyError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| RectifyError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let mut raw = Vec::with_capacity(img.as_slice().len() * 4);
    for &value in img.as_slice() {
        let c = Argb::from_packed(value);
        raw.extend_from_slice(&[c.r, c.g, c.b, c.a]);
    }
    RgbaImage::from_raw(width, height, raw).ok_or(RectifyError::BufferTooSmall {
        needed: img.width() * img.height() * 4,
        got: img.as_slice().len() * 4,
    })
}
