//! Adaptive chord-bounded sampling of the lobe curve.
//!
//! The sampler walks the curve parameter from 0 to one full lobe angle. At
//! each step it searches for a parameter increment whose chord from the
//! current point lands in `[min_dist, max_dist]`, so flat stretches get few
//! points and tight bends get many.
//!
//! The step search is a damped bisection over the increment: it shrinks or
//! grows the step by a correction `ddt` that is halved whenever the search
//! reverses direction. The correction never grows, which bounds the search
//! on smooth curves; an explicit iteration cap bounds it everywhere else.

use std::f64::consts::PI;

use cycloid_math::{chord_length, Point2};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::curve::CycloidalCurve;
use crate::geometry::DriveGeometry;
use crate::profile::{LobeProfile, SampledPoint};
use crate::tolerance::{SamplerSettings, SamplingTolerance};
use crate::{ProfileError, Result};

/// Direction of the most recent step correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// The chord was too long; the step shrank.
    Shrink,
    /// The chord was too short; the step grew.
    Grow,
}

/// State of the damped step-size search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSearch {
    /// Current parameter step.
    pub dt: f64,
    /// Current correction applied to `dt`.
    pub ddt: f64,
    /// Direction of the previous correction in this search.
    pub last: Option<StepDirection>,
}

impl StepSearch {
    /// Start a search from step `dt`.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            ddt: dt / 2.0,
            last: None,
        }
    }

    /// Reset the correction for a new search, keeping the current step.
    pub fn restart(&mut self) {
        self.ddt = self.dt / 2.0;
        self.last = None;
    }

    /// Apply one correction for a chord outside the band.
    ///
    /// A too-long chord shrinks the step by at most half, so `dt` stays
    /// positive. A chord already inside the band (or NaN) leaves the state
    /// untouched.
    pub fn correct(&mut self, chord: f64, tolerance: &SamplingTolerance) {
        if chord > tolerance.max_dist() {
            if self.last == Some(StepDirection::Grow) {
                self.ddt /= 2.0;
            }
            self.last = Some(StepDirection::Shrink);
            if self.ddt > self.dt / 2.0 {
                self.ddt = self.dt / 2.0;
            }
            self.dt -= self.ddt;
        } else if chord < tolerance.min_dist() {
            if self.last == Some(StepDirection::Shrink) {
                self.ddt /= 2.0;
            }
            self.last = Some(StepDirection::Grow);
            self.dt += self.ddt;
        }
    }
}

/// Chord-bounded sampler for one lobe of a drive's disc profile.
#[derive(Debug, Clone)]
pub struct AdaptiveSampler {
    curve: CycloidalCurve,
    tolerance: SamplingTolerance,
    max_step_iterations: u32,
    initial_step: f64,
    lobe_count: u32,
    full_angle: f64,
}

impl AdaptiveSampler {
    /// Create a sampler for `lobe_count` lobes of `geometry`.
    ///
    /// The initial step guess is `π / pin_count`.
    pub fn new(
        geometry: &DriveGeometry,
        settings: &SamplerSettings,
        lobe_count: u32,
    ) -> Result<Self> {
        settings.validate()?;
        if lobe_count == 0 {
            return Err(ProfileError::InvalidSettings(
                "lobe_count must be at least 1".into(),
            ));
        }
        Ok(Self {
            curve: CycloidalCurve::new(geometry),
            tolerance: settings.tolerance,
            max_step_iterations: settings.max_step_iterations,
            initial_step: PI / geometry.pin_count() as f64,
            lobe_count,
            full_angle: 2.0 * PI / lobe_count as f64,
        })
    }

    /// Curve parameter at which the profile ends.
    pub fn full_angle(&self) -> f64 {
        self.full_angle
    }

    /// Sample the lobe.
    ///
    /// Keeps stepping while the current point is more than `max_dist` from
    /// the endpoint or has not yet passed half the lobe, and while it has
    /// not reached the full lobe angle. The exact endpoint is appended last
    /// whatever its chord.
    pub fn sample(&self) -> Result<LobeProfile> {
        let max_dist = self.tolerance.max_dist();
        let half_angle = self.full_angle / 2.0;
        let start = self.curve.point(0.0);
        let end = self.curve.point(self.full_angle);

        let mut samples = vec![SampledPoint {
            theta: 0.0,
            point: start,
        }];
        let mut ct = 0.0;
        let mut cur = start;
        let mut search = StepSearch::new(self.initial_step);

        while (chord_length(&cur, &end) > max_dist || ct < half_angle) && ct < self.full_angle {
            let (theta, next) = self.search_step(ct, &cur, &mut search)?;
            if theta >= self.full_angle {
                // The closing point owns the full angle.
                trace!(theta, "step reached lobe end, closing");
                break;
            }
            trace!(theta, dt = search.dt, x = next.x, y = next.y, "committed step");
            ct = theta;
            cur = next;
            samples.push(SampledPoint { theta, point: cur });
        }

        samples.push(SampledPoint {
            theta: self.full_angle,
            point: end,
        });
        debug!(
            points = samples.len(),
            closing_chord = chord_length(&cur, &end),
            "sampled lobe profile"
        );
        Ok(LobeProfile::from_samples(samples, self.lobe_count))
    }

    /// Find a step from `ct` whose chord from `cur` lies in the band.
    fn search_step(&self, ct: f64, cur: &Point2, search: &mut StepSearch) -> Result<(f64, Point2)> {
        search.restart();
        let mut theta = ct + search.dt;
        let mut next = self.curve.point(theta);
        let mut chord = chord_length(cur, &next);
        let mut iterations = 0;

        while !self.tolerance.contains(chord) {
            if iterations == self.max_step_iterations {
                return Err(ProfileError::StepSearchDidNotConverge {
                    theta: ct,
                    step: search.dt,
                    chord,
                    min_dist: self.tolerance.min_dist(),
                    max_dist: self.tolerance.max_dist(),
                    iterations,
                });
            }
            iterations += 1;
            search.correct(chord, &self.tolerance);
            theta = ct + search.dt;
            next = self.curve.point(theta);
            chord = chord_length(cur, &next);
        }

        Ok((theta, next))
    }
}

/// Sample one lobe of `geometry`'s disc profile.
///
/// The first point is the curve at θ = 0 and the last is the curve at
/// θ = `2π / lobe_count`.
pub fn sample_half_lobe(
    geometry: &DriveGeometry,
    settings: &SamplerSettings,
    lobe_count: u32,
) -> Result<LobeProfile> {
    AdaptiveSampler::new(geometry, settings, lobe_count)?.sample()
}

/// Sample many independent drives in parallel.
///
/// Results come back in input order, one per job.
pub fn sample_batch(jobs: &[(DriveGeometry, SamplerSettings)]) -> Vec<Result<LobeProfile>> {
    jobs.par_iter()
        .map(|(geometry, settings)| sample_half_lobe(geometry, settings, geometry.lobe_count()))
        .collect()
}
