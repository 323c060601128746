//! The cycloidal disc boundary curve.

use cycloid_math::Point2;

use crate::geometry::DriveGeometry;

/// Point on the cycloidal disc boundary at curve parameter `theta`.
///
/// Envelope of a pin of radius `r_minor` rolling around a rotor of radius
/// `r_major` with `n` pins and eccentricity `e`:
///
/// ```text
/// psi = atan2(sin((1-n)θ), r_major/(e·n) - cos((1-n)θ))
/// x   =  r_major·cos θ - r_minor·cos(θ+psi) - e·cos(nθ)
/// y   = -r_major·sin θ + r_minor·sin(θ+psi) + e·sin(nθ)
/// ```
///
/// When the atan2 denominator is exactly zero the result is still finite,
/// but `psi` jumps there; [`DriveGeometry`] rejects the geometry for which
/// that can happen at θ = 0.
#[inline]
pub fn cycloid_point(theta: f64, r_major: f64, r_minor: f64, e: f64, n: f64) -> Point2 {
    let phase = (1.0 - n) * theta;
    let psi = phase.sin().atan2(r_major / (e * n) - phase.cos());
    let x = r_major * theta.cos() - r_minor * (theta + psi).cos() - e * (n * theta).cos();
    let y = -r_major * theta.sin() + r_minor * (theta + psi).sin() + e * (n * theta).sin();
    Point2::new(x, y)
}

/// Evaluate the disc boundary of `geometry` at `theta`.
pub fn evaluate_curve(theta: f64, geometry: &DriveGeometry) -> Point2 {
    CycloidalCurve::new(geometry).point(theta)
}

/// The disc boundary curve bound to one drive geometry.
#[derive(Debug, Clone, Copy)]
pub struct CycloidalCurve {
    r_major: f64,
    r_minor: f64,
    e: f64,
    n: f64,
}

impl CycloidalCurve {
    /// Bind the curve to a drive.
    pub fn new(geometry: &DriveGeometry) -> Self {
        Self {
            r_major: geometry.major_radius(),
            r_minor: geometry.pin_radius(),
            e: geometry.eccentricity(),
            n: geometry.pin_count() as f64,
        }
    }

    /// Point at curve parameter `theta` (radians).
    #[inline]
    pub fn point(&self, theta: f64) -> Point2 {
        cycloid_point(theta, self.r_major, self.r_minor, self.e, self.n)
    }
}
