use bowtie::lowlevel::{partition_rows, stretch_line};
use bowtie::{
    rectify, Argb, ArgbImage, CancelToken, EngineConfig, EngineState, GeometryModel,
    NullObserver, PhysicalParams, PixelBuffer, ProgressObserver, RectifyEngine, RunOutcome,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Recorder {
    percents: Vec<u8>,
    completions: usize,
    percent_at_completion: Option<u8>,
}

impl ProgressObserver for Recorder {
    fn on_progress(&mut self, percent: u8) {
        self.percents.push(percent);
    }

    fn on_complete(&mut self) {
        self.completions += 1;
        self.percent_at_completion = self.percents.last().copied();
    }
}

fn random_image(width: usize, height: usize, seed: u64) -> ArgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    ArgbImage::from_fn(width, height, |_, _| Argb::from_packed(rng.random::<u32>())).unwrap()
}

fn engine(threads: usize) -> RectifyEngine {
    RectifyEngine::new(EngineConfig {
        threads: Some(threads),
    })
    .unwrap()
}

fn sequential(src: &ArgbImage, model: &GeometryModel) -> Vec<u32> {
    let width = model.rectified_width();
    let profile = model.profile();
    let mut out = vec![0u32; width * src.height()];
    for y in 0..src.height() {
        let row: Vec<Argb> = src
            .row(y)
            .unwrap()
            .iter()
            .map(|&v| Argb::from_packed(v))
            .collect();
        stretch_line(&row, profile.factors(), &mut out[y * width..(y + 1) * width]);
    }
    out
}

#[test]
fn parallel_run_matches_sequential_kernel() {
    let src = random_image(301, 97, 7);
    let model = GeometryModel::new(src.width());
    let expected = sequential(&src, &model);

    for threads in [1, 3, 8] {
        let mut engine = engine(threads);
        engine.prepare(&src, model.profile()).unwrap();
        let outcome = engine.run(&src, &mut NullObserver).unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(engine.destination().width(), model.rectified_width());
        assert_eq!(engine.destination().as_slice(), expected.as_slice());
    }
}

#[test]
fn progress_is_strictly_increasing_and_completes_once() {
    let src = random_image(64, 250, 11);
    let model = GeometryModel::new(64);
    let mut engine = engine(4);
    engine.prepare(&src, model.profile()).unwrap();

    let mut recorder = Recorder::default();
    engine.run(&src, &mut recorder).unwrap();

    assert_eq!(recorder.percents, (1..=100).collect::<Vec<u8>>());
    assert_eq!(recorder.completions, 1);
    assert_eq!(recorder.percent_at_completion, Some(100));
    assert_eq!(engine.rows_completed(), 250);
    assert_eq!(engine.progress(), 100);
    assert_eq!(engine.state(), EngineState::Prepared);
}

#[test]
fn fewer_rows_than_workers_still_completes() {
    let src = random_image(20, 3, 5);
    let model = GeometryModel::new(20);
    let mut engine = engine(8);
    engine.prepare(&src, model.profile()).unwrap();
    assert_eq!(engine.partitions().len(), 8);
    assert_eq!(engine.partitions().iter().filter(|p| p.is_empty()).count(), 5);

    let mut recorder = Recorder::default();
    engine.run(&src, &mut recorder).unwrap();
    assert_eq!(recorder.percents, vec![33, 66, 100]);
    assert_eq!(recorder.completions, 1);
    assert_eq!(engine.destination().as_slice(), sequential(&src, &model).as_slice());
}

#[test]
fn empty_image_completes_immediately() {
    let src = ArgbImage::new(10, 0).unwrap();
    let model = GeometryModel::new(10);
    let mut engine = engine(2);
    engine.prepare(&src, model.profile()).unwrap();

    let mut recorder = Recorder::default();
    let outcome = engine.run(&src, &mut recorder).unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(recorder.percents, vec![100]);
    assert_eq!(recorder.completions, 1);
}

#[test]
fn prepare_is_idempotent() {
    let src = random_image(50, 41, 3);
    let model = GeometryModel::new(50);
    let mut engine = engine(6);

    engine.prepare(&src, model.profile()).unwrap();
    let partitions = engine.partitions().to_vec();
    let destination = engine.destination().clone();

    engine.prepare(&src, model.profile()).unwrap();
    assert_eq!(engine.partitions(), partitions.as_slice());
    assert_eq!(engine.destination(), &destination);
    assert_eq!(engine.rows_completed(), 0);
    assert_eq!(engine.progress(), 0);
    assert_eq!(engine.state(), EngineState::Prepared);
}

#[test]
fn reprepare_after_parameter_change_resizes_destination() {
    let src = random_image(120, 10, 21);
    let mut model = GeometryModel::new(120);
    let mut engine = engine(2);
    engine.prepare(&src, model.profile()).unwrap();
    engine.run(&src, &mut NullObserver).unwrap();
    let narrow = engine.rectified_width();

    model.set_swath_km(4000);
    engine.prepare(&src, model.profile()).unwrap();
    assert_eq!(engine.rows_completed(), 0);
    assert!(engine.rectified_width() > narrow);
    engine.run(&src, &mut NullObserver).unwrap();
    assert_eq!(engine.destination().as_slice(), sequential(&src, &model).as_slice());
}

#[test]
fn partitions_tile_rows_for_random_shapes() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let height = rng.random_range(0..5000);
        let workers = rng.random_range(1..65);
        let parts = partition_rows(height, workers);
        assert_eq!(parts.len(), workers);
        let mut next = 0;
        for part in &parts {
            assert_eq!(part.start, next);
            assert!(part.end >= part.start);
            next = part.end;
        }
        assert_eq!(next, height);
    }
}

#[test]
fn one_shot_rectify_matches_engine() {
    let src = random_image(90, 12, 99);
    let out = rectify(&src, PhysicalParams::default()).unwrap();
    let model = GeometryModel::new(90);
    assert_eq!(out.width(), model.rectified_width());
    assert_eq!(out.height(), 12);
    assert_eq!(out.as_slice(), sequential(&src, &model).as_slice());
}

#[test]
fn export_keeps_source_buffer_type() {
    let src = random_image(30, 4, 1);
    let model = GeometryModel::new(30);
    let mut engine = engine(2);
    engine.prepare(&src, model.profile()).unwrap();
    engine.run(&src, &mut NullObserver).unwrap();
    let exported: ArgbImage = engine.destination().export_like(&src);
    assert_eq!(PixelBuffer::width(&exported), model.rectified_width());
    assert_eq!(&exported, engine.destination());
}

/// Source whose rows from `gate_row` on block until the gate opens.
///
/// With a single worker and `gate_row == 1`, row 0 is the only row that can
/// finish before the observer sees progress.
struct GatedSource {
    inner: ArgbImage,
    gate_row: usize,
    open: AtomicBool,
}

impl PixelBuffer for GatedSource {
    fn width(&self) -> usize {
        self.inner.width()
    }

    fn height(&self) -> usize {
        self.inner.height()
    }

    fn pixel(&self, x: usize, y: usize) -> u32 {
        if y >= self.gate_row && x == 0 {
            while !self.open.load(Ordering::Acquire) {
                std::thread::yield_now();
            }
        }
        self.inner.pixel(x, y)
    }

    fn set_pixel(&mut self, x: usize, y: usize, value: u32) {
        self.inner.set_pixel(x, y, value);
    }

    fn allocate_like(&self, width: usize, height: usize) -> Self {
        Self {
            inner: self.inner.allocate_like(width, height),
            gate_row: self.gate_row,
            open: AtomicBool::new(true),
        }
    }
}

/// Cancels first, then opens the gate, so at most the row already blocked on
/// the gate completes after the stop.
struct CancelOnFirstProgress<'a> {
    token: CancelToken,
    gate: &'a AtomicBool,
    completions: usize,
}

impl ProgressObserver for CancelOnFirstProgress<'_> {
    fn on_progress(&mut self, _percent: u8) {
        self.token.cancel();
        self.gate.store(true, Ordering::Release);
    }

    fn on_complete(&mut self) {
        self.completions += 1;
    }
}

#[test]
fn cancellation_stops_between_rows_and_allows_rerun() {
    let source = GatedSource {
        inner: random_image(32, 100, 8),
        gate_row: 1,
        open: AtomicBool::new(false),
    };
    let model = GeometryModel::new(32);
    let mut engine = engine(1);
    engine.prepare(&source, model.profile()).unwrap();

    let mut observer = CancelOnFirstProgress {
        token: engine.cancel_token(),
        gate: &source.open,
        completions: 0,
    };
    let outcome = engine.run(&source, &mut observer).unwrap();
    match outcome {
        // Row 1 finishes only if the worker was already waiting on the gate.
        RunOutcome::Cancelled { rows_completed } => {
            assert!((1..=2).contains(&rows_completed), "{rows_completed}")
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert_eq!(observer.completions, 0);
    assert!(engine.progress() < 100);
    assert_eq!(engine.state(), EngineState::Prepared);

    let mut recorder = Recorder::default();
    assert_eq!(
        engine.run(&source, &mut recorder).unwrap(),
        RunOutcome::Completed
    );
    assert_eq!(recorder.completions, 1);
    assert_eq!(
        engine.destination().as_slice(),
        sequential(&source.inner, &model).as_slice()
    );
}

#[test]
fn one_shot_rectify_allocates_in_source_format() {
    let source = GatedSource {
        inner: random_image(48, 6, 21),
        gate_row: usize::MAX,
        open: AtomicBool::new(true),
    };
    let out: GatedSource = rectify(&source, PhysicalParams::default()).unwrap();
    let model = GeometryModel::new(48);
    assert_eq!(out.width(), model.rectified_width());
    assert_eq!(out.height(), 6);
    assert_eq!(
        out.inner.as_slice(),
        sequential(&source.inner, &model).as_slice()
    );
}
