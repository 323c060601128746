//! Drive geometry and its derivation from nominal dimensions.

use std::f64::consts::PI;

use cycloid_math::Transform2;
use serde::{Deserialize, Serialize};

use crate::{ProfileError, Result};

/// Validated geometry of a cycloidal drive.
///
/// Immutable once built. All lengths share one unit; the profile
/// generator never converts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveGeometry {
    major_radius: f64,
    pin_count: u32,
    pin_radius: f64,
    eccentricity: f64,
}

impl DriveGeometry {
    /// Create drive geometry from its four defining parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidGeometry`] if:
    /// - `pin_count < 2` (the rotor would have no lobes)
    /// - any length is non-positive or not finite
    /// - `eccentricity * pin_count == major_radius` (the curve's phase
    ///   denominator collapses)
    pub fn new(
        major_radius: f64,
        pin_count: u32,
        pin_radius: f64,
        eccentricity: f64,
    ) -> Result<Self> {
        let invalid = |reason| ProfileError::InvalidGeometry {
            reason,
            major_radius,
            pin_count,
            pin_radius,
            eccentricity,
        };

        if pin_count < 2 {
            return Err(invalid("pin_count must be at least 2"));
        }
        if !(major_radius.is_finite() && major_radius > 0.0) {
            return Err(invalid("major_radius must be positive"));
        }
        if !(pin_radius.is_finite() && pin_radius > 0.0) {
            return Err(invalid("pin_radius must be positive"));
        }
        if !(eccentricity.is_finite() && eccentricity > 0.0) {
            return Err(invalid("eccentricity must be positive"));
        }
        if eccentricity * pin_count as f64 == major_radius {
            return Err(invalid("eccentricity * pin_count must differ from major_radius"));
        }

        Ok(Self {
            major_radius,
            pin_count,
            pin_radius,
            eccentricity,
        })
    }

    /// Radius of the rotor disc.
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Number of ring-gear pins.
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// Radius of each ring-gear pin.
    pub fn pin_radius(&self) -> f64 {
        self.pin_radius
    }

    /// Camshaft offset from the drive axis.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Number of rotor lobes (`pin_count - 1`).
    pub fn lobe_count(&self) -> u32 {
        self.pin_count - 1
    }

    /// Curve parameter span of one lobe (`2π / lobe_count`).
    pub fn full_lobe_angle(&self) -> f64 {
        2.0 * PI / self.lobe_count() as f64
    }

    /// Output reduction ratio, `(pins - lobes) / lobes`.
    pub fn reduction_ratio(&self) -> f64 {
        let lobes = self.lobe_count() as f64;
        (self.pin_count as f64 - lobes) / lobes
    }
}

/// Nominal drive dimensions chosen by the designer.
///
/// Pin radius and eccentricity follow the usual proportions: the pin
/// circumference share quartered, and a fixed fraction of that radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveSpec {
    /// Nominal rotor diameter.
    pub rotor_diameter: f64,
    /// Number of ring-gear pins.
    pub pin_count: u32,
    /// Eccentricity as a fraction of the pin radius.
    pub eccentricity_ratio: f64,
}

impl Default for DriveSpec {
    fn default() -> Self {
        Self {
            rotor_diameter: 5.1,
            pin_count: 40,
            eccentricity_ratio: 0.5,
        }
    }
}

impl DriveSpec {
    /// Dimensions with the given diameter and pin count and the default
    /// eccentricity ratio.
    pub fn new(rotor_diameter: f64, pin_count: u32) -> Self {
        Self {
            rotor_diameter,
            pin_count,
            ..Default::default()
        }
    }

    /// Rotor radius.
    pub fn major_radius(&self) -> f64 {
        self.rotor_diameter / 2.0
    }

    /// Pin radius, `major_radius * π / pin_count / 4`.
    pub fn pin_radius(&self) -> f64 {
        self.major_radius() * PI / self.pin_count as f64 / 4.0
    }

    /// Eccentricity, `eccentricity_ratio * pin_radius`.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_ratio * self.pin_radius()
    }

    /// Diameter of the circle the rotor's output holes sit on.
    ///
    /// Midway between the rotor rim and the bearing bore, pulled in by one
    /// and a half pin radii.
    pub fn output_circle_diameter(&self, bearing_hole_diameter: f64) -> f64 {
        (self.rotor_diameter + bearing_hole_diameter) / 2.0 - 1.5 * self.pin_radius()
    }

    /// Derive and validate the drive geometry.
    pub fn geometry(&self) -> Result<DriveGeometry> {
        DriveGeometry::new(
            self.major_radius(),
            self.pin_count,
            self.pin_radius(),
            self.eccentricity(),
        )
    }
}

/// Placement of one of the two opposing rotors in a drive.
///
/// The second rotor is turned half a lobe and driven from the opposite
/// side of the cam so the pair stays balanced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorPlacement {
    /// Rotation about the drive axis, in radians.
    pub angle: f64,
    /// Offset along X from the drive axis.
    pub offset: f64,
    /// Height of the rotor's base plane along the drive axis.
    pub z_offset: f64,
}

impl RotorPlacement {
    /// Placement of the first rotor.
    pub fn primary(geometry: &DriveGeometry) -> Self {
        Self {
            angle: 0.0,
            offset: geometry.eccentricity(),
            z_offset: 0.0,
        }
    }

    /// Placement of the second, phase-inverted rotor, stacked `z_offset`
    /// above the first.
    pub fn inverted(geometry: &DriveGeometry, z_offset: f64) -> Self {
        Self {
            angle: PI / geometry.lobe_count() as f64,
            offset: -geometry.eccentricity(),
            z_offset,
        }
    }

    /// In-plane transform: rotate about the drive axis, then shift by the
    /// offset. `z_offset` is applied separately.
    pub fn transform(&self) -> Transform2 {
        Transform2::translation(self.offset, 0.0).then(&Transform2::rotation(self.angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cycloid_math::Point2;

    fn reference_geometry() -> DriveGeometry {
        DriveSpec::default().geometry().unwrap()
    }

    #[test]
    fn test_reference_derivation() {
        let g = reference_geometry();
        assert_relative_eq!(g.major_radius(), 2.55);
        assert_eq!(g.pin_count(), 40);
        assert_eq!(g.lobe_count(), 39);
        assert_relative_eq!(g.pin_radius(), 2.55 * PI / 40.0 / 4.0);
        assert_relative_eq!(g.eccentricity(), 0.5 * g.pin_radius());
        assert!((g.pin_radius() - 0.0501).abs() < 1e-4);
    }

    #[test]
    fn test_reduction_ratio() {
        let g = reference_geometry();
        assert_relative_eq!(g.reduction_ratio(), 1.0 / 39.0);
        assert_relative_eq!(g.full_lobe_angle(), 2.0 * PI / 39.0);
    }

    #[test]
    fn test_single_pin_rejected() {
        let result = DriveGeometry::new(2.55, 1, 0.05, 0.025);
        assert!(matches!(result, Err(ProfileError::InvalidGeometry { pin_count: 1, .. })));

        let result = DriveSpec::new(5.1, 1).geometry();
        assert!(matches!(result, Err(ProfileError::InvalidGeometry { .. })));

        let result = DriveSpec::new(5.1, 0).geometry();
        assert!(matches!(result, Err(ProfileError::InvalidGeometry { pin_count: 0, .. })));
    }

    #[test]
    fn test_non_positive_lengths_rejected() {
        assert!(DriveGeometry::new(0.0, 10, 0.1, 0.05).is_err());
        assert!(DriveGeometry::new(10.0, 10, -0.1, 0.05).is_err());
        assert!(DriveGeometry::new(10.0, 10, 0.1, 0.0).is_err());
        assert!(DriveGeometry::new(f64::NAN, 10, 0.1, 0.05).is_err());
        assert!(DriveGeometry::new(10.0, 10, f64::INFINITY, 0.05).is_err());
    }

    #[test]
    fn test_singular_eccentricity_rejected() {
        // e * n == R exactly
        let result = DriveGeometry::new(10.0, 10, 0.5, 1.0);
        match result {
            Err(ProfileError::InvalidGeometry {
                major_radius,
                eccentricity,
                ..
            }) => {
                assert_eq!(major_radius, 10.0);
                assert_eq!(eccentricity, 1.0);
            }
            other => panic!("expected InvalidGeometry, got {other:?}"),
        }
    }

    #[test]
    fn test_error_reports_values() {
        let err = DriveGeometry::new(2.55, 1, 0.05, 0.025).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("pin_count=1"));
        assert!(msg.contains("major_radius=2.55"));
    }

    #[test]
    fn test_primary_placement() {
        let g = reference_geometry();
        let p = RotorPlacement::primary(&g).transform().apply_point(&Point2::origin());
        assert_relative_eq!(p.x, g.eccentricity());
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_inverted_placement() {
        let g = reference_geometry();
        let placement = RotorPlacement::inverted(&g, 0.6);
        assert_relative_eq!(placement.angle, PI / 39.0);
        assert_relative_eq!(placement.z_offset, 0.6);
        assert_eq!(RotorPlacement::primary(&g).z_offset, 0.0);

        // Rotation happens about the drive axis before the offset
        let t = placement.transform();
        let p = t.apply_point(&Point2::new(1.0, 0.0));
        assert_relative_eq!(p.x, placement.angle.cos() - g.eccentricity(), epsilon = 1e-12);
        assert_relative_eq!(p.y, placement.angle.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_output_circle_between_rim_and_bore() {
        let spec = DriveSpec::default();
        let diameter = spec.output_circle_diameter(2.406);
        assert_relative_eq!(diameter, (5.1 + 2.406) / 2.0 - 1.5 * spec.pin_radius());
        assert!((diameter - 3.6779).abs() < 1e-4);
        assert!(diameter > 2.406 && diameter < 5.1);
    }
}
