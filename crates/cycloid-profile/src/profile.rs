//! Sampled lobe profiles and the outlines built from them.

use cycloid_math::{chord_length, Point2, Transform2};

/// One sample of the disc boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledPoint {
    /// Curve parameter the point was evaluated at.
    pub theta: f64,
    /// Point on the curve.
    pub point: Point2,
}

/// Adaptively sampled polyline of one rotor lobe.
///
/// Starts at θ = 0, ends exactly at θ = `2π / lobe_count`, with θ strictly
/// increasing. Every chord except the last lies in the sampler's tolerance
/// band; the last chord closes onto the exact endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LobeProfile {
    samples: Vec<SampledPoint>,
    lobe_count: u32,
}

impl LobeProfile {
    pub(crate) fn from_samples(samples: Vec<SampledPoint>, lobe_count: u32) -> Self {
        debug_assert!(samples.len() >= 2);
        debug_assert!(lobe_count >= 1);
        Self {
            samples,
            lobe_count,
        }
    }

    /// Number of lobes the profile was sampled for.
    pub fn lobe_count(&self) -> u32 {
        self.lobe_count
    }

    /// Curve parameter span of the lobe (`2π / lobe_count`).
    pub fn full_angle(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.lobe_count as f64
    }

    /// All samples in order.
    pub fn samples(&self) -> &[SampledPoint] {
        &self.samples
    }

    /// Points in order.
    pub fn points(&self) -> Vec<Point2> {
        self.samples.iter().map(|s| s.point).collect()
    }

    /// Curve parameters in order.
    pub fn parameters(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.theta).collect()
    }

    /// First point (θ = 0).
    pub fn start(&self) -> Point2 {
        self.samples[0].point
    }

    /// Last point (θ = full lobe angle).
    pub fn end(&self) -> Point2 {
        self.samples[self.samples.len() - 1].point
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a profile has at least its two endpoints.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Chord length of each consecutive pair.
    pub fn chord_lengths(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .map(|w| chord_length(&w[0].point, &w[1].point))
            .collect()
    }

    /// Total polyline length.
    pub fn polyline_length(&self) -> f64 {
        self.chord_lengths().iter().sum()
    }

    /// Closed pie-slice region: drive axis, then the curve, then back.
    ///
    /// The first vertex is the origin; the closing edge from the curve end
    /// back to the origin is implied.
    pub fn closed_region(&self) -> Vec<Point2> {
        let mut region = Vec::with_capacity(self.samples.len() + 1);
        region.push(Point2::origin());
        region.extend(self.samples.iter().map(|s| s.point));
        region
    }

    /// Full rotor outline from one rotated copy of this lobe per lobe.
    ///
    /// Copy `k` is turned by `-k` lobe angles, matching the curve's own
    /// clockwise advance. Each copy's end coincides with the next copy's
    /// start, so shared points are emitted once and the outline is implicitly
    /// closed: `lobe_count * (len - 1)` vertices.
    pub fn rotor_outline(&self) -> Vec<Point2> {
        let lobe_angle = self.full_angle();
        let per_lobe = self.samples.len() - 1;
        let mut outline = Vec::with_capacity(per_lobe * self.lobe_count as usize);
        for k in 0..self.lobe_count {
            let rotate = Transform2::rotation(-(k as f64) * lobe_angle);
            outline.extend(
                self.samples[..per_lobe]
                    .iter()
                    .map(|s| rotate.apply_point(&s.point)),
            );
        }
        outline
    }
}
