//! Seam to the solid modeling kernel that turns profiles into rotor bodies.
//!
//! The profile generator never builds solids itself. A [`ModelingKernel`]
//! implementation supplies spline fitting, region closing, extrusion,
//! patterning, booleans and fillets; [`build_rotor`] sequences them for one
//! rotor disc.

use std::f64::consts::FRAC_PI_2;

use cycloid_math::Point2;
use tracing::{debug, info, warn};

use crate::geometry::{DriveGeometry, DriveSpec, RotorPlacement};
use crate::profile::LobeProfile;
use crate::sampler::sample_half_lobe;
use crate::tolerance::SamplerSettings;
use crate::{ProfileError, Result};

/// How a new feature interacts with existing bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOperation {
    /// Create a separate body.
    NewBody,
    /// Union into the target body.
    Join,
    /// Subtract from the target body.
    Cut,
}

/// Operations the profile generator consumes from a modeling kernel.
///
/// Bodies produced by [`extrude`](ModelingKernel::extrude) and
/// [`circular_pattern`](ModelingKernel::circular_pattern) are standalone;
/// they only affect other bodies through
/// [`combine`](ModelingKernel::combine).
pub trait ModelingKernel {
    /// Fitted planar curve.
    type Curve;
    /// Closed planar region.
    type Region;
    /// Solid body.
    type Body;
    /// Kernel failure.
    type Error: std::fmt::Display;

    /// Fit an interpolating curve through ordered points.
    fn fit_spline(&mut self, points: &[Point2]) -> std::result::Result<Self::Curve, Self::Error>;

    /// Close a region with straight segments from `apex` to both curve ends.
    fn close_region(
        &mut self,
        curve: &Self::Curve,
        apex: Point2,
    ) -> std::result::Result<Self::Region, Self::Error>;

    /// Disc region of `radius` around `center`.
    fn circle_region(
        &mut self,
        center: Point2,
        radius: f64,
    ) -> std::result::Result<Self::Region, Self::Error>;

    /// Extrude a region by a signed distance.
    ///
    /// `operation` tags the body with its intended use; a `Cut` body is a
    /// tool to be subtracted with [`combine`](ModelingKernel::combine).
    fn extrude(
        &mut self,
        region: &Self::Region,
        distance: f64,
        operation: FeatureOperation,
    ) -> std::result::Result<Self::Body, Self::Error>;

    /// Replicate a body `count` times about the drive axis.
    ///
    /// Returns the new copies, not the seed body.
    fn circular_pattern(
        &mut self,
        body: &Self::Body,
        count: u32,
        symmetric: bool,
    ) -> std::result::Result<Vec<Self::Body>, Self::Error>;

    /// Boolean-combine `tool` into `target`.
    fn combine(
        &mut self,
        target: &Self::Body,
        tool: &Self::Body,
        operation: FeatureOperation,
    ) -> std::result::Result<(), Self::Error>;

    /// Fillet every edge of `body` whose length satisfies `select`.
    ///
    /// Returns the number of edges filleted.
    fn fillet_edges(
        &mut self,
        body: &Self::Body,
        radius: f64,
        select: &dyn Fn(f64) -> bool,
    ) -> std::result::Result<usize, Self::Error>;
}

/// Round the edges of a given length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFillet {
    /// Length of the edges to round.
    pub edge_length: f64,
    /// Allowed deviation from `edge_length`.
    pub length_tolerance: f64,
    /// Fillet radius.
    pub radius: f64,
}

impl EdgeFillet {
    /// Whether an edge of `length` is selected.
    pub fn selects(&self, length: f64) -> bool {
        (length - self.edge_length).abs() < self.length_tolerance
    }
}

/// Ring of holes the output pins run in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputHoles {
    /// Number of holes, evenly spaced.
    pub count: u32,
    /// Diameter of each hole.
    pub hole_diameter: f64,
    /// Diameter of the circle the hole centers lie on.
    pub circle_diameter: f64,
}

impl OutputHoles {
    /// Hole count of the reference layout.
    pub const DEFAULT_COUNT: u32 = 8;
    /// Hole diameter of the reference layout.
    pub const DEFAULT_HOLE_DIAMETER: f64 = 0.708;

    /// Reference hole layout on the output circle of `spec`.
    pub fn for_drive(spec: &DriveSpec, bearing_hole_diameter: f64) -> Self {
        Self {
            count: Self::DEFAULT_COUNT,
            hole_diameter: Self::DEFAULT_HOLE_DIAMETER,
            circle_diameter: spec.output_circle_diameter(bearing_hole_diameter),
        }
    }

    /// Center of the first hole on a rotor that will be turned by `phase`.
    ///
    /// The hole sits on the +Y axis once the rotor is placed.
    pub fn first_center(&self, phase: f64) -> Point2 {
        let (sin, cos) = (FRAC_PI_2 - phase).sin_cos();
        let radius = self.circle_diameter / 2.0;
        Point2::new(radius * cos, radius * sin)
    }
}

/// Parameters of one rotor disc body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorOptions {
    /// Extrusion thickness.
    pub thickness: f64,
    /// Axial gap between the two stacked rotors.
    pub spacing: f64,
    /// Rotation the rotor will be placed with; see [`RotorPlacement`].
    pub phase: f64,
    /// Central bearing bore, if any.
    pub bearing_hole_diameter: Option<f64>,
    /// Output pin holes, if any.
    pub output_holes: Option<OutputHoles>,
    /// Optional edge rounding applied after the lobes are joined.
    pub edge_fillet: Option<EdgeFillet>,
}

impl Default for RotorOptions {
    fn default() -> Self {
        Self {
            thickness: 0.5,
            spacing: 0.1,
            phase: 0.0,
            bearing_hole_diameter: None,
            output_holes: None,
            edge_fillet: None,
        }
    }
}

impl RotorOptions {
    /// Bearing bore of the reference drive.
    pub const DEFAULT_BEARING_HOLE_DIAMETER: f64 = 2.406;

    /// Reference rotor for `spec`: bearing bore and output holes included.
    pub fn for_drive(spec: &DriveSpec) -> Self {
        let bore = Self::DEFAULT_BEARING_HOLE_DIAMETER;
        Self {
            bearing_hole_diameter: Some(bore),
            output_holes: Some(OutputHoles::for_drive(spec, bore)),
            ..Default::default()
        }
    }

    /// Match the hole phase to `placement`.
    pub fn with_placement(mut self, placement: &RotorPlacement) -> Self {
        self.phase = placement.angle;
        self
    }

    /// Height of the second rotor's base plane above the first.
    pub fn stack_offset(&self) -> f64 {
        self.thickness + self.spacing
    }

    /// Check that every dimension is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.thickness) {
            return Err(ProfileError::InvalidSettings(format!(
                "rotor thickness must be positive, got {}",
                self.thickness
            )));
        }
        if let Some(diameter) = self.bearing_hole_diameter {
            if !positive(diameter) {
                return Err(ProfileError::InvalidSettings(format!(
                    "bearing hole diameter must be positive, got {diameter}"
                )));
            }
        }
        if let Some(holes) = &self.output_holes {
            if holes.count == 0 {
                return Err(ProfileError::InvalidSettings(
                    "output hole count must be at least 1".into(),
                ));
            }
            if !positive(holes.hole_diameter) || !positive(holes.circle_diameter) {
                return Err(ProfileError::InvalidSettings(format!(
                    "output hole diameters must be positive, got {} on {}",
                    holes.hole_diameter, holes.circle_diameter
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of [`build_rotor`].
#[derive(Debug)]
pub struct RotorBuild<B> {
    /// The rotor body, seed lobe with the pattern copies joined in.
    pub body: B,
    /// The sampled lobe the body was built from.
    pub lobe: LobeProfile,
    /// Pattern copies the kernel refused to join.
    pub failed_joins: usize,
    /// Holes cut through the body, bore included.
    pub cut_holes: usize,
    /// Edges rounded by the optional fillet.
    pub filleted_edges: usize,
}

fn kernel_error(operation: &str, err: impl std::fmt::Display) -> ProfileError {
    ProfileError::Kernel(format!("{operation}: {err}"))
}

/// Extrude a disc at `center` into a cut tool as thick as the rotor.
fn hole_tool<K: ModelingKernel>(
    kernel: &mut K,
    center: Point2,
    diameter: f64,
    thickness: f64,
) -> Result<K::Body> {
    let region = kernel
        .circle_region(center, diameter / 2.0)
        .map_err(|e| kernel_error("hole region", e))?;
    kernel
        .extrude(&region, thickness, FeatureOperation::Cut)
        .map_err(|e| kernel_error("extrude hole", e))
}

/// Build one rotor disc from the drive geometry.
///
/// Samples a lobe, fits a spline through it, closes it against the drive
/// axis, extrudes it, patterns it `lobe_count` times and joins the copies
/// into the seed body. Then cuts the bearing bore and the output holes,
/// patterning the first output hole around the axis, and applies the
/// optional fillet.
///
/// # Errors
///
/// Invalid options and sampling errors are reported before the kernel is
/// touched. Failures of fitting, closing, extrusion, patterning, cutting or
/// filleting propagate. A failed join of a single pattern copy does not
/// abort the build: it is logged as a warning and counted in
/// [`RotorBuild::failed_joins`].
pub fn build_rotor<K: ModelingKernel>(
    kernel: &mut K,
    geometry: &DriveGeometry,
    settings: &SamplerSettings,
    options: &RotorOptions,
) -> Result<RotorBuild<K::Body>> {
    options.validate()?;
    let lobe_count = geometry.lobe_count();
    let lobe = sample_half_lobe(geometry, settings, lobe_count)?;
    debug!(points = lobe.len(), "fitting lobe spline");

    let curve = kernel
        .fit_spline(&lobe.points())
        .map_err(|e| kernel_error("fit spline", e))?;
    let region = kernel
        .close_region(&curve, Point2::origin())
        .map_err(|e| kernel_error("close region", e))?;
    let body = kernel
        .extrude(&region, options.thickness, FeatureOperation::NewBody)
        .map_err(|e| kernel_error("extrude", e))?;
    let copies = kernel
        .circular_pattern(&body, lobe_count, true)
        .map_err(|e| kernel_error("circular pattern", e))?;

    let mut failed_joins = 0;
    for (index, copy) in copies.iter().enumerate() {
        if let Err(err) = kernel.combine(&body, copy, FeatureOperation::Join) {
            warn!(index, error = %err, "failed to join lobe copy into rotor");
            failed_joins += 1;
        }
    }

    let mut cut_holes = 0;
    if let Some(diameter) = options.bearing_hole_diameter {
        let bore = hole_tool(kernel, Point2::origin(), diameter, options.thickness)?;
        kernel
            .combine(&body, &bore, FeatureOperation::Cut)
            .map_err(|e| kernel_error("cut bearing hole", e))?;
        cut_holes += 1;
    }

    if let Some(holes) = &options.output_holes {
        let center = holes.first_center(options.phase);
        let first = hole_tool(kernel, center, holes.hole_diameter, options.thickness)?;
        let others = kernel
            .circular_pattern(&first, holes.count, true)
            .map_err(|e| kernel_error("output hole pattern", e))?;
        for tool in std::iter::once(&first).chain(&others) {
            kernel
                .combine(&body, tool, FeatureOperation::Cut)
                .map_err(|e| kernel_error("cut output hole", e))?;
            cut_holes += 1;
        }
    }

    let filleted_edges = match &options.edge_fillet {
        Some(fillet) => kernel
            .fillet_edges(&body, fillet.radius, &|length: f64| fillet.selects(length))
            .map_err(|e| kernel_error("fillet", e))?,
        None => 0,
    };

    info!(
        lobes = lobe_count,
        copies = copies.len(),
        failed_joins,
        cut_holes,
        filleted_edges,
        "built rotor"
    );

    Ok(RotorBuild {
        body,
        lobe,
        failed_joins,
        cut_holes,
        filleted_edges,
    })
}
