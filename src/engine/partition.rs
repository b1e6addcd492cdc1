//! Row partitioning across a fixed worker count.

use std::ops::Range;

/// Half-open row range `[start, end)` handled by one worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowPartition {
    pub start: usize,
    pub end: usize,
}

impl RowPartition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Splits `height` rows into exactly `workers.max(1)` contiguous partitions.
///
/// Every partition but the last holds `ceil(height / workers)` rows; ranges
/// are clipped at `height`, so trailing partitions may be empty when rows run
/// out early.
pub fn partition_rows(height: usize, workers: usize) -> Vec<RowPartition> {
    let workers = workers.max(1);
    let chunk = height.div_ceil(workers);
    (0..workers)
        .map(|idx| RowPartition {
            start: idx.saturating_mul(chunk).min(height),
            end: (idx + 1).saturating_mul(chunk).min(height),
        })
        .collect()
}
