//! TOML configuration for profile generation.
//!
//! ```toml
//! [drive]
//! rotor_diameter = 5.1
//! pin_count = 40
//! eccentricity_ratio = 0.5
//!
//! [sampling]
//! max_dist_factor = 0.25
//! min_dist_ratio = 0.5
//! max_step_iterations = 100
//! ```
//!
//! Every key is optional; missing keys take the values shown.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{DriveGeometry, DriveSpec};
use crate::tolerance::{SamplerSettings, SamplingTolerance};
use crate::{ProfileError, Result};

/// Chord band and search limits, relative to the drive's pin radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingSection {
    /// `max_dist = max_dist_factor * pin_radius`.
    pub max_dist_factor: f64,
    /// `min_dist = min_dist_ratio * max_dist`.
    pub min_dist_ratio: f64,
    /// Step-search iteration cap.
    pub max_step_iterations: u32,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            max_dist_factor: 0.25,
            min_dist_ratio: 0.5,
            max_step_iterations: SamplerSettings::DEFAULT_MAX_STEP_ITERATIONS,
        }
    }
}

/// Complete profile configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Nominal drive dimensions.
    pub drive: DriveSpec,
    /// Sampling band.
    pub sampling: SamplingSection,
}

impl ProfileConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ProfileError::Config(format!("invalid TOML config: {e}")))
    }

    /// Load a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProfileError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ProfileError::Config(format!("failed to serialize config: {e}")))
    }

    /// Derive the validated geometry and sampler settings.
    pub fn resolve(&self) -> Result<(DriveGeometry, SamplerSettings)> {
        let geometry = self.drive.geometry()?;
        let tolerance = SamplingTolerance::from_factors(
            geometry.pin_radius(),
            self.sampling.max_dist_factor,
            self.sampling.min_dist_ratio,
        )?;
        let settings = SamplerSettings::new(tolerance)
            .with_max_step_iterations(self.sampling.max_step_iterations);
        settings.validate()?;
        Ok((geometry, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_defaults_resolve_to_reference_drive() {
        let (geometry, settings) = ProfileConfig::default().resolve().unwrap();
        assert_eq!(geometry.pin_count(), 40);
        assert_relative_eq!(geometry.major_radius(), 2.55);
        assert_relative_eq!(settings.tolerance.max_dist(), 0.25 * geometry.pin_radius());
        assert_relative_eq!(settings.tolerance.min_dist(), 0.125 * geometry.pin_radius());
        assert_eq!(settings.max_step_iterations, 100);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config = ProfileConfig::from_toml_str(
            r#"
            [drive]
            pin_count = 20

            [sampling]
            max_step_iterations = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.drive.pin_count, 20);
        assert_relative_eq!(config.drive.rotor_diameter, 5.1);
        assert_relative_eq!(config.sampling.max_dist_factor, 0.25);
        assert_eq!(config.sampling.max_step_iterations, 50);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ProfileConfig::from_toml_str("").unwrap(), ProfileConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ProfileConfig::from_toml_str("[drive]\npins = 12\n");
        assert!(matches!(result, Err(ProfileError::Config(_))));
    }

    #[test]
    fn test_invalid_values_surface_domain_errors() {
        let config = ProfileConfig::from_toml_str("[drive]\npin_count = 1\n").unwrap();
        assert!(matches!(config.resolve(), Err(ProfileError::InvalidGeometry { .. })));

        let config = ProfileConfig::from_toml_str("[sampling]\nmin_dist_ratio = 1.0\n").unwrap();
        assert!(matches!(config.resolve(), Err(ProfileError::InvalidTolerance { .. })));

        let config = ProfileConfig::from_toml_str("[sampling]\nmax_step_iterations = 0\n").unwrap();
        assert!(matches!(config.resolve(), Err(ProfileError::InvalidSettings(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ProfileConfig::default();
        config.drive.pin_count = 24;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("pin_count = 24"));
        assert_eq!(ProfileConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[drive]\nrotor_diameter = 60.0\npin_count = 12").unwrap();
        let config = ProfileConfig::load(file.path()).unwrap();
        assert_relative_eq!(config.drive.rotor_diameter, 60.0);
        assert_eq!(config.drive.pin_count, 12);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = ProfileConfig::load(Path::new("/nonexistent/cycloid.toml"));
        match result {
            Err(ProfileError::Config(msg)) => assert!(msg.contains("/nonexistent/cycloid.toml")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
