//! Closed-form scan geometry for a sensor at constant altitude above a
//! spherical body.
//!
//! Two angles appear throughout. The *arc* is the angle at the body centre
//! between nadir and a ground point; the *view angle* is the angle at the
//! sensor between nadir and its line of sight to that point.

/// Body radius and sensor altitude, both in the same length unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScanGeometry {
    radius: f64,
    altitude: f64,
    orbit_radius: f64,
}

impl ScanGeometry {
    /// The orbit radius is always `radius + altitude`, so changing either
    /// parameter moves the sensor. Outputs for non-default radius or altitude
    /// therefore differ from tools that keep the orbit fixed at the defaults.
    pub fn new(radius: f64, altitude: f64) -> Self {
        Self {
            radius,
            altitude,
            orbit_radius: radius + altitude,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Distance from the body centre to the sensor.
    pub fn orbit_radius(&self) -> f64 {
        self.orbit_radius
    }

    /// Arc from nadir to the horizon as seen from the sensor.
    pub fn horizon_arc(&self) -> f64 {
        (self.radius / self.orbit_radius).acos()
    }

    /// Sensor view angle that sees the ground point at `arc` from nadir.
    pub fn view_angle_for_arc(&self, arc: f64) -> f64 {
        (self.radius * arc.sin() / self.slant_height(arc)).atan()
    }

    /// Inverse of [`view_angle_for_arc`](Self::view_angle_for_arc): the arc
    /// seen at `view_angle`, taking the near intersection with the body.
    ///
    /// Returns NaN once the line of sight misses the body.
    pub fn arc_for_view_angle(&self, view_angle: f64) -> f64 {
        let r2 = self.radius.powi(2);
        let t2 = view_angle.tan().powi(2);
        let disc = (r2 + t2 * (r2 - self.orbit_radius.powi(2))).sqrt();
        ((t2 * self.orbit_radius + disc) / (self.radius * (t2 + 1.0))).acos()
    }

    /// Local ground-to-image magnification at `arc`.
    ///
    /// This is d(arc)/d(view angle) normalised by `radius / altitude`, so it
    /// is exactly 1 at nadir and grows toward the swath edges.
    pub fn stretch_at_arc(&self, arc: f64) -> f64 {
        let (sin, cos) = arc.sin_cos();
        let h = self.slant_height(arc);
        let ratio = self.radius * sin / h;
        let norm = self.radius / self.altitude;
        let tan_term = 1.0 + ratio.powi(2);
        let arc_term = h.powi(2) / (self.radius * cos * h - self.radius.powi(2) * sin.powi(2));
        norm * tan_term * arc_term
    }

    /// Arc under source column `column` of an image `width` columns wide,
    /// where the image edges sit at view angle `edge_view_angle`.
    ///
    /// The view angle is taken as linear in the distance from the centre
    /// column.
    pub fn column_arc(&self, edge_view_angle: f64, width: usize, column: usize) -> f64 {
        let half = width as f64 / 2.0;
        let weight = if width == 0 {
            0.0
        } else {
            (column as f64 - half).abs() / half
        };
        self.arc_for_view_angle(edge_view_angle * weight)
    }

    // Sensor height above the tangent plane through the ground point.
    fn slant_height(&self, arc: f64) -> f64 {
        self.altitude + self.radius * (1.0 - arc.cos())
    }
}
