//! Integer helpers for progress accounting.

/// Whole percent of `done` over `total`, rounded down and capped at 100.
///
/// A zero `total` counts as finished.
pub(crate) fn percent_floor(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as u128;
    ((done * 100) / total as u128) as u8
}
