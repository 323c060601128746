#![warn(missing_docs)]

//! Cycloidal-disc lobe profile generation.
//!
//! Computes the tooth profile of a cycloidal drive rotor as an adaptively
//! sampled polyline: the chord between consecutive points stays inside a
//! `[min_dist, max_dist]` band so point density follows local curvature.
//! The polyline seeds a fitted spline in an external modeling kernel.
//!
//! # Example
//!
//! ```
//! use cycloid_profile::{sample_half_lobe, DriveSpec, SamplerSettings, SamplingTolerance};
//!
//! let geometry = DriveSpec::new(5.1, 40).geometry().unwrap();
//! let tolerance = SamplingTolerance::from_pin_radius(geometry.pin_radius()).unwrap();
//! let settings = SamplerSettings::new(tolerance);
//!
//! let profile = sample_half_lobe(&geometry, &settings, geometry.lobe_count()).unwrap();
//! assert!(profile.len() >= 3);
//! ```

pub mod config;
mod curve;
mod geometry;
pub mod kernel;
mod profile;
mod sampler;
mod tolerance;

pub use config::{ProfileConfig, SamplingSection};
pub use curve::{cycloid_point, evaluate_curve, CycloidalCurve};
pub use geometry::{DriveGeometry, DriveSpec, RotorPlacement};
pub use kernel::{
    build_rotor, EdgeFillet, FeatureOperation, ModelingKernel, OutputHoles, RotorBuild,
    RotorOptions,
};
pub use profile::{LobeProfile, SampledPoint};
pub use sampler::{sample_batch, sample_half_lobe, AdaptiveSampler, StepDirection, StepSearch};
pub use tolerance::{SamplerSettings, SamplingTolerance};

pub use cycloid_math::Point2;

use thiserror::Error;

/// Errors from profile generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// Drive geometry cannot produce a well-defined cycloidal curve.
    #[error(
        "invalid geometry ({reason}): major_radius={major_radius}, pin_count={pin_count}, \
         pin_radius={pin_radius}, eccentricity={eccentricity}"
    )]
    InvalidGeometry {
        /// Which constraint was violated.
        reason: &'static str,
        /// Rotor disc radius.
        major_radius: f64,
        /// Number of ring-gear pins.
        pin_count: u32,
        /// Ring-gear pin radius.
        pin_radius: f64,
        /// Camshaft offset.
        eccentricity: f64,
    },

    /// The chord tolerance band is empty or non-positive.
    #[error("invalid tolerance: min_dist={min_dist}, max_dist={max_dist}")]
    InvalidTolerance {
        /// Lower chord bound.
        min_dist: f64,
        /// Upper chord bound.
        max_dist: f64,
    },

    /// The inner step-size search hit its iteration cap.
    #[error(
        "step search did not converge at theta={theta:.6} after {iterations} iterations: \
         step={step:.6e}, chord={chord:.6e}, band=[{min_dist:.6e}, {max_dist:.6e}]"
    )]
    StepSearchDidNotConverge {
        /// Curve parameter the search started from.
        theta: f64,
        /// Last attempted parameter step.
        step: f64,
        /// Chord length produced by the last attempted step.
        chord: f64,
        /// Lower chord bound.
        min_dist: f64,
        /// Upper chord bound.
        max_dist: f64,
        /// Corrections performed before giving up.
        iterations: u32,
    },

    /// Sampler settings are unusable.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// The modeling kernel rejected an operation.
    #[error("kernel operation failed: {0}")]
    Kernel(String),
}

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
