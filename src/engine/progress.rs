//! Row-completion progress aggregation.

use crate::util::math::percent_floor;

/// Receives progress from a rectification run.
///
/// `on_progress` sees each whole percent at most once, in increasing order;
/// `on_complete` fires once, right after 100 is reported.
pub trait ProgressObserver {
    fn on_progress(&mut self, percent: u8);

    fn on_complete(&mut self) {}
}

/// Observer that ignores every notification.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&mut self, _percent: u8) {}
}

/// What one completed row changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// New whole percent, if it differs from the last reported value.
    pub percent: Option<u8>,
    /// Set exactly once, when the run first reaches 100 percent.
    pub completed: bool,
}

/// Counts completed rows and deduplicates percent values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressTracker {
    total_rows: usize,
    rows_completed: usize,
    last_percent: u8,
    completed: bool,
}

impl ProgressTracker {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            rows_completed: 0,
            last_percent: 0,
            completed: false,
        }
    }

    /// Records one finished row. Rows beyond the total are ignored.
    pub fn record_row(&mut self) -> ProgressUpdate {
        if self.rows_completed < self.total_rows {
            self.rows_completed += 1;
        }
        self.refresh()
    }

    /// Reports completion for a run with nothing to do.
    pub fn finish_empty(&mut self) -> ProgressUpdate {
        if self.total_rows == 0 {
            self.refresh()
        } else {
            ProgressUpdate::default()
        }
    }

    pub fn rows_completed(&self) -> usize {
        self.rows_completed
    }

    /// Last reported whole percent.
    pub fn percent(&self) -> u8 {
        self.last_percent
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    fn refresh(&mut self) -> ProgressUpdate {
        let percent = percent_floor(self.rows_completed, self.total_rows);
        let mut update = ProgressUpdate::default();
        if percent != self.last_percent {
            self.last_percent = percent;
            update.percent = Some(percent);
        }
        if percent == 100 && !self.completed {
            self.completed = true;
            update.completed = true;
        }
        update
    }
}

pub(crate) fn notify<O: ProgressObserver + ?Sized>(observer: &mut O, update: ProgressUpdate) {
    if let Some(percent) = update.percent {
        observer.on_progress(percent);
    }
    if update.completed {
        observer.on_complete();
    }
}
