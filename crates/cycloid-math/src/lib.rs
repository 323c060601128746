#![warn(missing_docs)]

//! Math types for cycloidal drive profiles.
//!
//! Thin wrappers around nalgebra providing the planar types the profile
//! generator works in.

use nalgebra::{Matrix3, Vector3};

/// A point in the sketch plane.
pub type Point2 = nalgebra::Point2<f64>;

/// Straight-line (chordal) distance between two points.
#[inline]
pub fn chord_length(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// A 3x3 homogeneous transform of the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform2 {
    /// The underlying 3x3 matrix.
    pub matrix: Matrix3<f64>,
}

impl Transform2 {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Translation by `(dx, dy)`.
    pub fn translation(dx: f64, dy: f64) -> Self {
        let mut m = Matrix3::identity();
        m[(0, 2)] = dx;
        m[(1, 2)] = dy;
        Self { matrix: m }
    }

    /// Counter-clockwise rotation about the origin by `angle` radians.
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix3::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The result applies `other` first, then `self`.
    pub fn then(&self, other: &Transform2) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point2) -> Point2 {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v.x, v.y)
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}
