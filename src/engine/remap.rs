//! Horizontal stretch kernel for a single image row.
//!
//! The row is widened outward from its centre in two passes, first toward
//! the right edge and then toward the left. Each source column advances a
//! real-valued target position by its stretch factor; the destination pixels
//! between the previous and the new (truncated) position are filled by
//! interpolating from the previous source colour to the current one.

use crate::image::{Argb, PixelBuffer};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
}

/// Stretches `src` into `dst` using one factor per source column.
///
/// Both passes start at destination column `dst.len() / 2`. Steps whose
/// pixel gap is zero or negative write nothing, and positions outside `dst`
/// are skipped, so non-finite factors leave parts of the row untouched
/// instead of panicking.
///
/// # Panics
///
/// Panics if `factors` is shorter than `src`.
pub fn stretch_line(src: &[Argb], factors: &[f64], dst: &mut [u32]) {
    assert!(
        factors.len() >= src.len(),
        "need one stretch factor per source column"
    );
    if src.is_empty() {
        return;
    }
    let centre = src.len() / 2;
    let origin = (dst.len() / 2) as i64;

    let mut column = origin;
    let mut target = origin as f64;
    let mut start = src[centre];
    for (&end, &factor) in src[centre..].iter().zip(&factors[centre..]) {
        target += factor;
        let delta = (target as i64).saturating_sub(column);
        fill_span(dst, column, Direction::Right, delta, start, end);
        column = column.saturating_add(delta.max(0));
        start = end;
    }

    let mut column = origin;
    let mut target = origin as f64;
    let mut start = src[centre];
    for (&end, &factor) in src[..centre].iter().zip(&factors[..centre]).rev() {
        target -= factor;
        let delta = column.saturating_sub(target as i64);
        fill_span(dst, column, Direction::Left, delta, start, end);
        column = column.saturating_sub(delta.max(0));
        start = end;
    }
}

/// Reads row `y` of `source` into `scratch` and stretches it into `dst`.
pub fn remap_row<S: PixelBuffer + ?Sized>(
    source: &S,
    y: usize,
    factors: &[f64],
    scratch: &mut Vec<Argb>,
    dst: &mut [u32],
) {
    scratch.clear();
    scratch.extend((0..source.width()).map(|x| Argb::from_packed(source.pixel(x, y))));
    stretch_line(scratch, factors, dst);
}

// Writes step `i` of `delta` at `first + i` (right) or `first - i` (left),
// for every `i` that lands inside `dst`.
fn fill_span(dst: &mut [u32], first: i64, dir: Direction, delta: i64, start: Argb, end: Argb) {
    if delta <= 0 {
        return;
    }
    let delta = delta.min(i64::from(u32::MAX));
    let len = dst.len() as i64;
    let (lo, hi) = match dir {
        Direction::Right => (
            first.saturating_neg().max(0),
            len.saturating_sub(first).min(delta),
        ),
        Direction::Left => (
            first.saturating_sub(len).saturating_add(1).max(0),
            first.saturating_add(1).min(delta),
        ),
    };
    for i in lo..hi {
        let x = match dir {
            Direction::Right => first + i,
            Direction::Left => first - i,
        };
        dst[x as usize] = start.lerp(end, i as u32, delta as u32).to_packed();
    }
}
