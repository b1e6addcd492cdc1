//! Per-column stretch factors for a wide-swath scan.
//!
//! A [`GeometryModel`] owns the physical parameters and the current
//! [`StretchProfile`]. Any parameter or width change rebuilds the profile in
//! full and swaps it in as a new `Arc`, so a profile handed out earlier is
//! never modified.

mod view;

pub use view::ScanGeometry;

use crate::trace::trace_event;
use crate::util::{RectifyError, RectifyResult};
use std::sync::Arc;

/// Immutable default configuration, fixed at model construction.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryDefaults {
    /// Reference body radius in kilometres.
    pub radius_km: f64,
    /// Sensor altitude above the body surface in kilometres.
    pub altitude_km: f64,
    /// Total ground swath of one scan line in kilometres.
    pub swath_km: u32,
    /// Image width used until the caller supplies one.
    pub image_width: usize,
}

impl Default for GeometryDefaults {
    fn default() -> Self {
        Self {
            radius_km: 6371.0,
            altitude_km: 822.5,
            swath_km: 2800,
            image_width: 1568,
        }
    }
}

impl GeometryDefaults {
    /// Physical parameters equal to these defaults.
    pub fn params(&self) -> PhysicalParams {
        PhysicalParams {
            radius_km: self.radius_km,
            altitude_km: self.altitude_km,
            swath_km: self.swath_km,
        }
    }
}

/// Current physical parameters of the scan.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalParams {
    pub radius_km: f64,
    pub altitude_km: f64,
    pub swath_km: u32,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        GeometryDefaults::default().params()
    }
}

impl PhysicalParams {
    /// Checks the parameters are finite, strictly positive, and keep the swath
    /// edges inside the sensor's horizon.
    pub fn validate(&self) -> RectifyResult<()> {
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(RectifyError::DegenerateGeometry {
                reason: "radius must be finite and positive",
            });
        }
        if !(self.altitude_km.is_finite() && self.altitude_km > 0.0) {
            return Err(RectifyError::DegenerateGeometry {
                reason: "altitude must be finite and positive",
            });
        }
        if self.swath_km == 0 {
            return Err(RectifyError::DegenerateGeometry {
                reason: "swath must be positive",
            });
        }
        if self.half_swath_arc() >= self.scan_geometry().horizon_arc() {
            return Err(RectifyError::DegenerateGeometry {
                reason: "swath extends past the visible horizon",
            });
        }
        Ok(())
    }

    /// Scan geometry for these parameters.
    pub fn scan_geometry(&self) -> ScanGeometry {
        ScanGeometry::new(self.radius_km, self.altitude_km)
    }

    /// Arc from nadir to either swath edge, in radians.
    pub fn half_swath_arc(&self) -> f64 {
        f64::from(self.swath_km) / self.radius_km / 2.0
    }
}

/// Stretch factors for every column boundary of one image width.
#[derive(Clone, Debug, PartialEq)]
pub struct StretchProfile {
    factors: Vec<f64>,
    rectified_width: usize,
    source_width: usize,
}

impl StretchProfile {
    /// Computes the profile for `source_width` columns.
    ///
    /// Degenerate parameters are not rejected: their NaN factors are kept and
    /// the rectified width falls back to `source_width`.
    pub fn compute(params: &PhysicalParams, source_width: usize) -> Self {
        let geo = params.scan_geometry();
        let edge_view = geo.view_angle_for_arc(params.half_swath_arc());
        let factors: Vec<f64> = (0..=source_width)
            .map(|column| geo.stretch_at_arc(geo.column_arc(edge_view, source_width, column)))
            .collect();
        let sum: f64 = factors.iter().sum();
        let rectified_width = if sum.is_finite() && sum >= 0.0 {
            sum.ceil() as usize
        } else {
            source_width
        };
        Self {
            factors,
            rectified_width,
            source_width,
        }
    }

    /// One factor per column index `0..=source_width`.
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// Output width: the factor sum rounded up.
    pub fn rectified_width(&self) -> usize {
        self.rectified_width
    }

    /// Width of the source image this profile was built for.
    pub fn source_width(&self) -> usize {
        self.source_width
    }

    pub fn sum(&self) -> f64 {
        self.factors.iter().sum()
    }

    /// True when every factor is finite.
    pub fn is_finite(&self) -> bool {
        self.factors.iter().all(|f| f.is_finite())
    }
}

/// Owner of the physical parameters and the current stretch profile.
#[derive(Clone, Debug)]
pub struct GeometryModel {
    defaults: GeometryDefaults,
    params: PhysicalParams,
    image_width: usize,
    profile: Arc<StretchProfile>,
}

impl Default for GeometryModel {
    fn default() -> Self {
        Self::with_defaults(GeometryDefaults::default())
    }
}

impl GeometryModel {
    /// Model with default parameters for an image `image_width` columns wide.
    pub fn new(image_width: usize) -> Self {
        Self::with_defaults(GeometryDefaults {
            image_width,
            ..GeometryDefaults::default()
        })
    }

    /// Model whose current values start at `defaults`.
    pub fn with_defaults(defaults: GeometryDefaults) -> Self {
        let params = defaults.params();
        let image_width = defaults.image_width;
        let profile = Arc::new(StretchProfile::compute(&params, image_width));
        Self {
            defaults,
            params,
            image_width,
            profile,
        }
    }

    /// Replaces all three physical parameters and recomputes.
    ///
    /// Implausible values are accepted; see [`configure_checked`](Self::configure_checked).
    pub fn configure(&mut self, radius_km: f64, altitude_km: f64, swath_km: u32) {
        self.params = PhysicalParams {
            radius_km,
            altitude_km,
            swath_km,
        };
        self.recompute();
    }

    /// Like [`configure`](Self::configure) but rejects parameters that are not
    /// positive or yield non-finite factors. On error the model is unchanged.
    pub fn configure_checked(
        &mut self,
        radius_km: f64,
        altitude_km: f64,
        swath_km: u32,
    ) -> RectifyResult<()> {
        let params = PhysicalParams {
            radius_km,
            altitude_km,
            swath_km,
        };
        params.validate()?;
        let profile = StretchProfile::compute(&params, self.image_width);
        if !profile.is_finite() {
            return Err(RectifyError::DegenerateGeometry {
                reason: "stretch factors are not finite",
            });
        }
        self.params = params;
        self.install(profile);
        Ok(())
    }

    pub fn set_radius_km(&mut self, radius_km: f64) {
        self.params.radius_km = radius_km;
        self.recompute();
    }

    pub fn set_altitude_km(&mut self, altitude_km: f64) {
        self.params.altitude_km = altitude_km;
        self.recompute();
    }

    pub fn set_swath_km(&mut self, swath_km: u32) {
        self.params.swath_km = swath_km;
        self.recompute();
    }

    /// Sets the source image width; unchanged widths keep the current profile.
    pub fn set_image_width(&mut self, image_width: usize) {
        if self.image_width == image_width {
            return;
        }
        self.image_width = image_width;
        self.recompute();
    }

    /// Restores the parameters to the construction defaults.
    pub fn reset(&mut self) {
        self.params = self.defaults.params();
        self.recompute();
    }

    /// Owned copy of the current stretch factors.
    pub fn vector(&self) -> Vec<f64> {
        self.profile.factors.clone()
    }

    /// Shared handle to the current profile.
    pub fn profile(&self) -> Arc<StretchProfile> {
        Arc::clone(&self.profile)
    }

    pub fn rectified_width(&self) -> usize {
        self.profile.rectified_width
    }

    pub fn image_width(&self) -> usize {
        self.image_width
    }

    pub fn params(&self) -> PhysicalParams {
        self.params
    }

    pub fn defaults(&self) -> &GeometryDefaults {
        &self.defaults
    }

    pub fn radius_km(&self) -> f64 {
        self.params.radius_km
    }

    pub fn altitude_km(&self) -> f64 {
        self.params.altitude_km
    }

    pub fn swath_km(&self) -> u32 {
        self.params.swath_km
    }

    pub fn default_radius_km(&self) -> f64 {
        self.defaults.radius_km
    }

    pub fn default_altitude_km(&self) -> f64 {
        self.defaults.altitude_km
    }

    pub fn default_swath_km(&self) -> u32 {
        self.defaults.swath_km
    }

    fn recompute(&mut self) {
        let profile = StretchProfile::compute(&self.params, self.image_width);
        self.install(profile);
    }

    fn install(&mut self, profile: StretchProfile) {
        trace_event!(
            "stretch_profile",
            source_width = profile.source_width,
            rectified_width = profile.rectified_width,
            finite = profile.is_finite()
        );
        self.profile = Arc::new(profile);
    }
}
