//! Bowtie rectifies the panoramic "bow-tie" distortion of wide-swath
//! scanner imagery.
//!
//! A [`GeometryModel`] turns body radius, sensor altitude and swath width
//! into a per-column [`StretchProfile`]. A [`RectifyEngine`] then widens every
//! row of a source image by that profile on a fixed rayon pool, reporting
//! row progress to a [`ProgressObserver`].
//!
//! ```no_run
//! use bowtie::{ArgbImage, EngineConfig, GeometryModel, NullObserver, RectifyEngine};
//!
//! # fn main() -> bowtie::RectifyResult<()> {
//! let source = ArgbImage::new(1568, 1200)?;
//! let model = GeometryModel::new(source.width());
//! let mut engine = RectifyEngine::new(EngineConfig::default())?;
//! engine.prepare(&source, model.profile())?;
//! engine.run(&source, &mut NullObserver)?;
//! assert_eq!(engine.destination().width(), model.rectified_width());
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod geometry;
pub mod image;
pub mod lowlevel;
mod trace;
pub mod util;

pub use engine::{
    rectify, CancelToken, EngineConfig, EngineState, NullObserver, ProgressObserver,
    RectifyEngine, RunOutcome,
};
pub use geometry::{GeometryDefaults, GeometryModel, PhysicalParams, StretchProfile};
pub use image::{Argb, ArgbImage, PixelBuffer};
pub use util::{RectifyError, RectifyResult};

#[cfg(feature = "image-interop")]
pub use image::interop::{argb_from_rgba, rgba_from_argb};
