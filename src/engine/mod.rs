//! Parallel rectification engine.
//!
//! The engine splits the image rows into one contiguous partition per
//! worker of a fixed rayon pool. Workers write disjoint row ranges of the
//! destination and send one message per finished row; the calling thread
//! owns the progress counter and forwards deduplicated percentages to the
//! observer.
//!
//! Lifecycle: `prepare` (from any state) moves to `Prepared`; `run` passes
//! through `Running` and returns to `Prepared`, so it may be repeated without
//! re-preparing while the source and profile are unchanged. How a run ended is
//! reported by [`RunOutcome`].

mod partition;
mod progress;
mod remap;

pub use partition::{partition_rows, RowPartition};
pub use progress::{NullObserver, ProgressObserver, ProgressTracker, ProgressUpdate};
pub use remap::{remap_row, stretch_line};

use crate::geometry::{GeometryDefaults, GeometryModel, PhysicalParams, StretchProfile};
use crate::image::{ArgbImage, PixelBuffer};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{RectifyError, RectifyResult};
use progress::notify;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

/// Worker pool configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker count; `None` uses the available parallelism.
    pub threads: Option<usize>,
}

impl EngineConfig {
    /// Worker count after defaults and clamping to at least one.
    pub fn resolved_threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Lifecycle state of a [`RectifyEngine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Unconfigured,
    Prepared,
    Running,
}

/// How a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled { rows_completed: usize },
}

/// Cooperative stop signal, checked by workers between rows.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Row-parallel horizontal rectifier.
pub struct RectifyEngine {
    pool: rayon::ThreadPool,
    threads: usize,
    state: EngineState,
    source_width: usize,
    source_height: usize,
    profile: Option<Arc<StretchProfile>>,
    partitions: Vec<RowPartition>,
    tracker: ProgressTracker,
    destination: ArgbImage,
    cancel: CancelToken,
}

impl RectifyEngine {
    /// Builds the worker pool.
    pub fn new(config: EngineConfig) -> RectifyResult<Self> {
        let threads = config.resolved_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("bowtie-worker-{idx}"))
            .build()
            .map_err(|err| RectifyError::ThreadPool {
                reason: err.to_string(),
            })?;
        Ok(Self {
            pool,
            threads,
            state: EngineState::Unconfigured,
            source_width: 0,
            source_height: 0,
            profile: None,
            partitions: Vec::new(),
            tracker: ProgressTracker::new(0),
            destination: ArgbImage::default(),
            cancel: CancelToken::new(),
        })
    }

    /// Resets counters, reallocates the destination and recomputes the
    /// partitions for `source` and `profile`.
    ///
    /// `profile` must have been computed for `source.width()` columns.
    pub fn prepare<S: PixelBuffer + ?Sized>(
        &mut self,
        source: &S,
        profile: Arc<StretchProfile>,
    ) -> RectifyResult<()> {
        let width = source.width();
        let height = source.height();
        if profile.source_width() != width {
            return Err(RectifyError::DimensionMismatch {
                expected_width: profile.source_width(),
                expected_height: height,
                width,
                height,
            });
        }

        self.destination = ArgbImage::new(profile.rectified_width(), height)?;
        self.partitions = partition_rows(height, self.threads);
        self.tracker = ProgressTracker::new(height);
        self.source_width = width;
        self.source_height = height;
        self.profile = Some(profile);
        self.state = EngineState::Prepared;

        trace_event!(
            "rectify_prepare",
            width = width,
            height = height,
            rectified_width = self.destination.width(),
            partitions = self.partitions.len()
        );
        Ok(())
    }

    /// Rectifies `source` into the destination buffer, reporting progress to
    /// `observer` from the calling thread.
    ///
    /// Fails with `NotPrepared` before the first `prepare`, and with
    /// `DimensionMismatch` if `source` is not the size it was prepared for.
    pub fn run<S, O>(&mut self, source: &S, observer: &mut O) -> RectifyResult<RunOutcome>
    where
        S: PixelBuffer + Sync + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        if self.state != EngineState::Prepared {
            return Err(RectifyError::NotPrepared);
        }
        let profile = self.profile.clone().ok_or(RectifyError::NotPrepared)?;
        if source.width() != self.source_width || source.height() != self.source_height {
            return Err(RectifyError::DimensionMismatch {
                expected_width: self.source_width,
                expected_height: self.source_height,
                width: source.width(),
                height: source.height(),
            });
        }

        let rectified_width = self.destination.width();
        let _guard = trace_span!(
            "rectify_run",
            height = self.source_height,
            rectified_width = rectified_width,
            threads = self.threads
        )
        .entered();

        self.state = EngineState::Running;
        self.cancel.reset();
        self.tracker = ProgressTracker::new(self.source_height);
        self.destination.as_mut_slice().fill(0);
        notify(observer, self.tracker.finish_empty());

        let factors = profile.factors();
        let partitions = &self.partitions;
        let cancel = &self.cancel;
        let tracker = &mut self.tracker;
        let mut rest = self.destination.as_mut_slice();
        let (tx, rx) = mpsc::channel::<()>();

        self.pool.in_place_scope(|scope| {
            for &part in partitions {
                let (rows, tail) =
                    std::mem::take(&mut rest).split_at_mut(part.len() * rectified_width);
                rest = tail;
                let tx = tx.clone();
                scope.spawn(move |_| {
                    rectify_partition(source, factors, part, rows, rectified_width, cancel, &tx)
                });
            }
            drop(tx);
            for () in rx.iter() {
                notify(observer, tracker.record_row());
            }
        });

        self.state = EngineState::Prepared;
        let rows_completed = self.tracker.rows_completed();
        let outcome = if self.tracker.is_complete() {
            RunOutcome::Completed
        } else {
            RunOutcome::Cancelled { rows_completed }
        };
        let cancelled = outcome != RunOutcome::Completed;
        trace_event!(
            "rectify_done",
            rows_completed = rows_completed,
            cancelled = cancelled
        );
        Ok(outcome)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Worker count of the pool.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Row partitions from the last `prepare`, one per worker.
    pub fn partitions(&self) -> &[RowPartition] {
        &self.partitions
    }

    pub fn rows_completed(&self) -> usize {
        self.tracker.rows_completed()
    }

    /// Last whole percent reported to the observer.
    pub fn progress(&self) -> u8 {
        self.tracker.percent()
    }

    pub fn rectified_width(&self) -> usize {
        self.destination.width()
    }

    /// Destination image; fully written only after a completed run.
    pub fn destination(&self) -> &ArgbImage {
        &self.destination
    }

    /// Moves the destination out; the engine must be prepared again.
    pub fn take_destination(&mut self) -> ArgbImage {
        self.state = EngineState::Unconfigured;
        self.profile = None;
        std::mem::take(&mut self.destination)
    }

    /// Handle that stops the current run after each worker's current row.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

fn rectify_partition<S: PixelBuffer + Sync + ?Sized>(
    source: &S,
    factors: &[f64],
    part: RowPartition,
    rows: &mut [u32],
    rectified_width: usize,
    cancel: &CancelToken,
    done: &Sender<()>,
) {
    let mut scratch = Vec::with_capacity(source.width());
    for (offset, y) in part.rows().enumerate() {
        if cancel.is_cancelled() {
            trace_debug!("partition_cancelled", start = part.start, row = y);
            return;
        }
        let start = offset * rectified_width;
        remap_row(
            source,
            y,
            factors,
            &mut scratch,
            &mut rows[start..start + rectified_width],
        );
        if done.send(()).is_err() {
            return;
        }
    }
    trace_debug!("partition_done", start = part.start, end = part.end);
}

/// One-shot rectification of `source` with `params` on a default pool.
///
/// The result is allocated through [`PixelBuffer::allocate_like`], so it has
/// the pixel format of `source`.
pub fn rectify<S: PixelBuffer + Sync>(source: &S, params: PhysicalParams) -> RectifyResult<S> {
    let mut model = GeometryModel::with_defaults(GeometryDefaults {
        image_width: source.width(),
        ..GeometryDefaults::default()
    });
    model.configure(params.radius_km, params.altitude_km, params.swath_km);
    let mut engine = RectifyEngine::new(EngineConfig::default())?;
    engine.prepare(source, model.profile())?;
    engine.run(source, &mut NullObserver)?;
    Ok(engine.destination().export_like(source))
}
