//! Chord tolerance band and sampler settings.

use crate::{ProfileError, Result};

/// Allowed chord length between consecutive profile points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingTolerance {
    min_dist: f64,
    max_dist: f64,
}

impl SamplingTolerance {
    /// Create a tolerance band.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidTolerance`] unless
    /// `0 < min_dist < max_dist` and both are finite.
    pub fn new(min_dist: f64, max_dist: f64) -> Result<Self> {
        let valid = min_dist.is_finite()
            && max_dist.is_finite()
            && min_dist > 0.0
            && max_dist > 0.0
            && min_dist < max_dist;
        if !valid {
            return Err(ProfileError::InvalidTolerance { min_dist, max_dist });
        }
        Ok(Self { min_dist, max_dist })
    }

    /// Conventional band for a pin radius: `max = pin_radius / 4`,
    /// `min = max / 2`.
    pub fn from_pin_radius(pin_radius: f64) -> Result<Self> {
        Self::from_factors(pin_radius, 0.25, 0.5)
    }

    /// Band scaled from a pin radius: `max = max_factor * pin_radius`,
    /// `min = min_ratio * max`.
    pub fn from_factors(pin_radius: f64, max_factor: f64, min_ratio: f64) -> Result<Self> {
        let max_dist = max_factor * pin_radius;
        Self::new(min_ratio * max_dist, max_dist)
    }

    /// Minimum chord length.
    pub fn min_dist(&self) -> f64 {
        self.min_dist
    }

    /// Maximum chord length.
    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    /// Whether `chord` lies inside `[min_dist, max_dist]`.
    pub fn contains(&self, chord: f64) -> bool {
        chord >= self.min_dist && chord <= self.max_dist
    }
}

/// Everything the adaptive sampler needs besides the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    /// Chord band every committed step must satisfy.
    pub tolerance: SamplingTolerance,
    /// Corrections allowed per step search before giving up.
    pub max_step_iterations: u32,
}

impl SamplerSettings {
    /// Default iteration cap for the inner step search.
    pub const DEFAULT_MAX_STEP_ITERATIONS: u32 = 100;

    /// Settings with the default iteration cap.
    pub fn new(tolerance: SamplingTolerance) -> Self {
        Self {
            tolerance,
            max_step_iterations: Self::DEFAULT_MAX_STEP_ITERATIONS,
        }
    }

    /// Replace the iteration cap.
    pub fn with_max_step_iterations(mut self, cap: u32) -> Self {
        self.max_step_iterations = cap;
        self
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_step_iterations == 0 {
            return Err(ProfileError::InvalidSettings(
                "max_step_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_bounds_rejected() {
        let result = SamplingTolerance::new(0.01, 0.01);
        assert_eq!(
            result,
            Err(ProfileError::InvalidTolerance {
                min_dist: 0.01,
                max_dist: 0.01
            })
        );
    }

    #[test]
    fn test_inverted_and_non_positive_rejected() {
        assert!(SamplingTolerance::new(0.02, 0.01).is_err());
        assert!(SamplingTolerance::new(0.0, 0.01).is_err());
        assert!(SamplingTolerance::new(-0.01, 0.01).is_err());
        assert!(SamplingTolerance::new(0.01, f64::INFINITY).is_err());
        assert!(SamplingTolerance::new(f64::NAN, 0.01).is_err());
    }

    #[test]
    fn test_from_pin_radius() {
        let tol = SamplingTolerance::from_pin_radius(0.08).unwrap();
        assert_relative_eq!(tol.max_dist(), 0.02);
        assert_relative_eq!(tol.min_dist(), 0.01);
        assert!(tol.contains(0.015));
        assert!(tol.contains(0.02));
        assert!(!tol.contains(0.021));
        assert!(!tol.contains(0.009));
    }

    #[test]
    fn test_from_factors_rejects_full_ratio() {
        assert!(SamplingTolerance::from_factors(0.08, 0.25, 1.0).is_err());
    }

    #[test]
    fn test_settings_cap() {
        let tol = SamplingTolerance::new(0.1, 0.2).unwrap();
        let settings = SamplerSettings::new(tol);
        assert_eq!(settings.max_step_iterations, 100);
        assert!(settings.validate().is_ok());
        assert!(settings.with_max_step_iterations(0).validate().is_err());
    }
}
