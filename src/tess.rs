// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Public tessellator API: contour loading, options and the run itself.

mod output;

pub use self::output::{Polygons, Tessellation, Triangles};

use log::{debug, error};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::error::{TessError, TessResult};
use crate::mesh::{EdgeId, Mesh};
use crate::scalar::{Real, Scalar};
use crate::sweep;
use crate::vector::{Point, RotateDirection};

/// Which winding numbers count as inside.
///
/// Contours are oriented: a counter-clockwise contour adds one to the
/// winding number of the points it encloses, a clockwise one subtracts one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl FillRule {
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::EvenOdd => winding & 1 != 0,
            FillRule::NonZero => winding != 0,
            FillRule::Positive => winding > 0,
            FillRule::Negative => winding < 0,
            FillRule::AbsGeqTwo => winding >= 2 || winding <= -2,
        }
    }
}

/// The shape of the emitted polygons.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum OutputKind {
    Triangles,
    /// The monotone regions left by the sweep, untriangulated.
    MonotonePolygons,
    /// Triangles merged into convex polygons of at most `max_vertices`
    /// corners.
    ConvexPolygons { max_vertices: usize },
    /// Only the loops separating inside from outside. Outer loops run
    /// counter-clockwise and holes clockwise.
    BoundaryContours,
}

/// An axis-aligned box in input coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Bounds { min, max }
    }

    fn is_valid(&self) -> bool {
        let limit = Real::MAX_COORD;
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.x.abs() <= limit
            && self.min.y.abs() <= limit
            && self.max.x.abs() <= limit
            && self.max.y.abs() <= limit
    }
}

/// Parameters for the tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct TessOptions {
    /// Default value: `NonZero`.
    pub fill_rule: FillRule,

    /// Default value: `Triangles`.
    pub output: OutputKind,

    /// Load every contour with the opposite orientation.
    ///
    /// Default value: `false`.
    pub reverse_contours: bool,

    /// A box known to contain all the input. It only ever enlarges the
    /// region the sweep covers.
    ///
    /// Default value: `None`.
    pub bounds: Option<Bounds>,
}

impl TessOptions {
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::NonZero;
    pub const DEFAULT_OUTPUT: OutputKind = OutputKind::Triangles;

    pub const DEFAULT: Self = TessOptions {
        fill_rule: Self::DEFAULT_FILL_RULE,
        output: Self::DEFAULT_OUTPUT,
        reverse_contours: false,
        bounds: None,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::EvenOdd)
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::NonZero)
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    #[inline]
    pub const fn with_output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }

    #[inline]
    pub const fn with_reverse_contours(mut self, reverse: bool) -> Self {
        self.reverse_contours = reverse;
        self
    }

    #[inline]
    pub const fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl Default for TessOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tessellates closed polygonal contours into non-overlapping polygons.
///
/// ```
/// use sweep_tess::{point, Tessellator};
///
/// let mut tess = Tessellator::new();
/// tess.add_contour(&[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)])
///     .unwrap();
/// let output = tess.tessellate().unwrap();
/// assert_eq!(output.triangles().count(), 2);
/// ```
#[derive(Default)]
pub struct Tessellator {
    options: TessOptions,
    mesh: Mesh,
    /// Bounds of the loaded points in the sweep frame.
    extent: Option<(Point, Point)>,
    /// Number of input points seen so far, across all contours.
    input_count: u32,
    contour_count: usize,
}

impl Tessellator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TessOptions) -> Self {
        Tessellator {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &TessOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TessOptions) {
        self.options = options;
    }

    /// Number of contours passed to `add_contour` since the last run,
    /// including skipped degenerate ones.
    pub fn contour_count(&self) -> usize {
        self.contour_count
    }

    /// Drops every loaded contour.
    pub fn clear(&mut self) {
        self.mesh.clear();
        self.extent = None;
        self.input_count = 0;
        self.contour_count = 0;
    }

    /// Adds a closed contour; the last point connects back to the first.
    ///
    /// Every point is validated before anything is loaded, so on error the
    /// tessellator is unchanged. Consecutive duplicate points are collapsed,
    /// and a contour with fewer than three distinct points is skipped. Each
    /// point takes the next input index whether or not it ends up in the
    /// mesh.
    pub fn add_contour(&mut self, points: &[Point]) -> TessResult<()> {
        let contour = self.contour_count;
        validate(contour, points)?;

        let base = self.input_count;
        self.input_count = u32::try_from(points.len())
            .ok()
            .and_then(|n| base.checked_add(n))
            .ok_or(TessError::TooManyPoints { contour })?;
        self.contour_count += 1;

        let mut kept: Vec<(u32, Point)> = Vec::with_capacity(points.len());
        for (i, &p) in points.iter().enumerate() {
            if kept.last().map_or(true, |&(_, last)| last != p) {
                kept.push((base + i as u32, p));
            }
        }
        while kept.len() > 1 && kept.first().map(|k| k.1) == kept.last().map(|k| k.1) {
            kept.pop();
        }
        if kept.len() < points.len() {
            debug!(
                "contour {}: collapsed {} duplicate points",
                contour,
                points.len() - kept.len()
            );
        }
        if kept.len() < 3 {
            debug!("contour {}: fewer than three distinct points, skipped", contour);
            return Ok(());
        }

        let (forward, backward) = if self.options.reverse_contours { (-1, 1) } else { (1, -1) };
        let mut e: Option<EdgeId> = None;
        for (input, p) in kept {
            let p = p.rotated(RotateDirection::Clockwise);
            let edge = match e {
                None => {
                    // A single self-loop; later points split it.
                    let edge = self.mesh.make_edge()?;
                    self.mesh.splice(edge, edge.mirror())?;
                    edge
                }
                Some(prev) => {
                    self.mesh.split_edge(prev)?;
                    self.mesh.lnext(prev)
                }
            };
            let v = self.mesh.org(edge);
            self.mesh[v].position = p;
            self.mesh[v].input = Some(input);
            self.mesh[edge].winding = forward;
            self.mesh[edge.mirror()].winding = backward;
            e = Some(edge);
            self.extent = Some(match self.extent {
                None => (p, p),
                Some((min, max)) => (
                    Point::new(min_of(min.x, p.x), min_of(min.y, p.y)),
                    Point::new(max_of(max.x, p.x), max_of(max.y, p.y)),
                ),
            });
        }
        Ok(())
    }

    /// Runs the tessellation over every contour added since the last run.
    ///
    /// The loaded contours are consumed whatever the outcome; a failed run
    /// produces no output.
    pub fn tessellate(&mut self) -> TessResult<Tessellation> {
        let options = self.options;
        let mut mesh = core::mem::take(&mut self.mesh);
        let extent = self.extent.take();
        let contours = self.contour_count;
        self.input_count = 0;
        self.contour_count = 0;

        let hint = match options.bounds {
            Some(bounds) if !bounds.is_valid() => {
                error!("rejecting bounds hint {:?}", bounds);
                return Err(TessError::InvalidBounds);
            }
            Some(bounds) => Some(sweep_frame(bounds)),
            None => None,
        };

        let Some((mut min, mut max)) = extent else {
            debug!("nothing to tessellate");
            return Ok(Tessellation::default());
        };
        if let Some((hint_min, hint_max)) = hint {
            min = Point::new(min_of(min.x, hint_min.x), min_of(min.y, hint_min.y));
            max = Point::new(max_of(max.x, hint_max.x), max_of(max.y, hint_max.y));
        }

        debug!(
            "tessellating {} contours, {} vertices, {:?} / {:?}",
            contours,
            mesh.vertex_count(),
            options.fill_rule,
            options.output
        );

        sweep::compute_interior(&mut mesh, options.fill_rule, min, max)?;

        match options.output {
            OutputKind::Triangles => mesh.tessellate_interior()?,
            OutputKind::MonotonePolygons => {}
            OutputKind::ConvexPolygons { max_vertices } => {
                mesh.tessellate_interior()?;
                if max_vertices > 3 {
                    mesh.merge_convex_faces(max_vertices)?;
                }
            }
            OutputKind::BoundaryContours => mesh.set_winding_number(1, true)?,
        }

        let output = Tessellation::from_mesh(&mesh, options.output);
        debug!(
            "emitted {} polygons over {} vertices",
            output.polygon_count(),
            output.vertices().len()
        );
        Ok(output)
    }
}

fn validate(contour: usize, points: &[Point]) -> TessResult<()> {
    let limit = Real::MAX_COORD;
    for (index, p) in points.iter().enumerate() {
        if !p.is_finite() {
            error!("contour {}: point {} is not finite", contour, index);
            return Err(TessError::NonFiniteCoordinate {
                contour,
                index,
                x: p.x.to_f64(),
                y: p.y.to_f64(),
            });
        }
        if p.x.abs() > limit || p.y.abs() > limit {
            error!("contour {}: point {} is out of range", contour, index);
            return Err(TessError::CoordinateOutOfRange {
                contour,
                index,
                x: p.x.to_f64(),
                y: p.y.to_f64(),
                limit: limit.to_f64(),
            });
        }
    }
    Ok(())
}

/// `bounds` as a (min, max) pair in the sweep frame.
fn sweep_frame(bounds: Bounds) -> (Point, Point) {
    let a = bounds.min.rotated(RotateDirection::Clockwise);
    let b = bounds.max.rotated(RotateDirection::Clockwise);
    (
        Point::new(min_of(a.x, b.x), min_of(a.y, b.y)),
        Point::new(max_of(a.x, b.x), max_of(a.y, b.y)),
    )
}

#[inline]
fn min_of(a: Real, b: Real) -> Real {
    if b < a { b } else { a }
}

#[inline]
fn max_of(a: Real, b: Real) -> Real {
    if b > a { b } else { a }
}
