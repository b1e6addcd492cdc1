//! Structured ARGB colour and two-point channel interpolation.

/// A colour with four named 8-bit channels.
///
/// Packed form is `0xAARRGGBB`; packing happens only at the pixel-buffer
/// boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    /// Creates a colour from its channels.
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Opaque colour from red, green and blue.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(0xFF, r, g, b)
    }

    /// Unpacks a `0xAARRGGBB` value.
    #[inline]
    pub const fn from_packed(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Packs into `0xAARRGGBB`.
    #[inline]
    pub const fn to_packed(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Colour at step `i` of `delta` between `self` and `end`.
    ///
    /// Each colour channel is `(start * (delta - i) + end * i) / delta` with
    /// integer truncation. Alpha is taken from `self` unchanged. `delta` must
    /// be non-zero and `i < delta`.
    #[inline]
    pub fn lerp(self, end: Argb, i: u32, delta: u32) -> Argb {
        debug_assert!(delta > 0 && i < delta);
        Argb {
            a: self.a,
            r: lerp_channel(self.r, end.r, i, delta),
            g: lerp_channel(self.g, end.g, i, delta),
            b: lerp_channel(self.b, end.b, i, delta),
        }
    }
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Self::from_packed(value)
    }
}

impl From<Argb> for u32 {
    fn from(value: Argb) -> Self {
        value.to_packed()
    }
}

#[inline]
fn lerp_channel(start: u8, end: u8, i: u32, delta: u32) -> u8 {
    let (start, end, i, delta) = (
        u64::from(start),
        u64::from(end),
        u64::from(i),
        u64::from(delta),
    );
    ((start * (delta - i) + end * i) / delta) as u8
}
