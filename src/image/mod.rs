//! Pixel-buffer contract and the owned ARGB buffer used by the engine.
//!
//! `PixelBuffer` is the boundary to whatever image container the caller
//! loads and saves. Pixels cross it packed as `0xAARRGGBB`; everything inside
//! the crate works on [`Argb`] values.

use crate::util::{RectifyError, RectifyResult};

pub mod color;
#[cfg(feature = "image-interop")]
pub mod interop;

pub use color::Argb;

/// Addressable 2D pixel grid with packed ARGB access.
///
/// `pixel` and `set_pixel` may panic for coordinates outside
/// `width() x height()`.
pub trait PixelBuffer {
    /// Width in pixels.
    fn width(&self) -> usize;

    /// Height in pixels.
    fn height(&self) -> usize;

    /// Reads the packed ARGB value at `(x, y)`.
    fn pixel(&self, x: usize, y: usize) -> u32;

    /// Writes the packed ARGB value at `(x, y)`.
    fn set_pixel(&mut self, x: usize, y: usize, value: u32);

    /// Allocates a new buffer of the same pixel format with the given size.
    fn allocate_like(&self, width: usize, height: usize) -> Self
    where
        Self: Sized;
}

/// Owned, contiguous, packed ARGB image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgbImage {
    data: Vec<u32>,
    width: usize,
    height: usize,
}

impl ArgbImage {
    /// Allocates a transparent-black image.
    pub fn new(width: usize, height: usize) -> RectifyResult<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            data: vec![0; len],
            width,
            height,
        })
    }

    /// Wraps a packed ARGB buffer of exactly `width * height` pixels.
    pub fn from_vec(data: Vec<u32>, width: usize, height: usize) -> RectifyResult<Self> {
        let needed = pixel_count(width, height)?;
        if data.len() < needed {
            return Err(RectifyError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(RectifyError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> Argb,
    ) -> RectifyResult<Self> {
        let mut img = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                img.data[y * width + x] = f(x, y).to_packed();
            }
        }
        Ok(img)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the colour at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Argb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied().map(Argb::from_packed)
    }

    /// Returns the packed pixels of row `y`.
    pub fn row(&self, y: usize) -> Option<&[u32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns the whole packed buffer in row-major order.
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Copies this image into a freshly allocated buffer shaped like `like`.
    pub fn export_like<B: PixelBuffer>(&self, like: &B) -> B {
        let mut out = like.allocate_like(self.width, self.height);
        for y in 0..self.height {
            let row = &self.data[y * self.width..(y + 1) * self.width];
            for (x, &value) in row.iter().enumerate() {
                out.set_pixel(x, y, value);
            }
        }
        out
    }
}

impl PixelBuffer for ArgbImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel(&self, x: usize, y: usize) -> u32 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y * self.width + x]
    }

    fn set_pixel(&mut self, x: usize, y: usize, value: u32) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y * self.width + x] = value;
    }

    fn allocate_like(&self, width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }
}

fn pixel_count(width: usize, height: usize) -> RectifyResult<usize> {
    width
        .checked_mul(height)
        .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<u32>())
        .ok_or(RectifyError::InvalidDimensions { width, height })
}
