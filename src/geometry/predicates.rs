//! Geometric predicates for planar subdivision maintenance.
//!
//! This module contains the two predicates everything else is built on:
//! triangle orientation and the in-circle test. Both classify their input
//! into a three-way enum with an explicit `DEGENERATE`/`BOUNDARY` band so
//! callers can treat near-ties conservatively instead of flipping or
//! splitting on noise.

use crate::geometry::point::Point;

/// Base relative tolerance for classifying a determinant as degenerate.
///
/// The effective threshold scales with the magnitude of the operands, so the
/// degenerate band stays proportionally narrow for both unit-sized and
/// kilometer-sized coordinates.
pub const DEGENERACY_TOLERANCE: f64 = 1e-12;

/// Represents the position of a point relative to a circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    /// The point is outside the circumcircle
    OUTSIDE,
    /// The point is on the circumcircle (within numerical tolerance)
    BOUNDARY,
    /// The point is inside the circumcircle
    INSIDE,
}

impl std::fmt::Display for InCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The triple turns clockwise (determinant < 0)
    NEGATIVE,
    /// The triple is collinear (determinant ≈ 0)
    DEGENERATE,
    /// The triple turns counterclockwise (determinant > 0)
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive when the triple turns counterclockwise.
#[must_use]
#[inline]
pub fn double_triangle_area(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Determine the orientation of the point triple `(a, b, c)`.
///
/// The sign of the 2×2 determinant of the edge vectors classifies the triple;
/// determinants within a magnitude-scaled band around zero are reported as
/// `DEGENERATE` rather than forced to either side.
///
/// # Examples
///
/// ```
/// use subdivision::geometry::point::Point;
/// use subdivision::geometry::predicates::{orientation, Orientation};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// assert_eq!(orientation(a, b, Point::new(0.0, 1.0)), Orientation::POSITIVE);
/// assert_eq!(orientation(a, b, Point::new(2.0, 0.0)), Orientation::DEGENERATE);
/// assert_eq!(orientation(a, b, Point::new(0.0, -1.0)), Orientation::NEGATIVE);
/// ```
#[must_use]
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let det = double_triangle_area(a, b, c);
    let scale = (b - a).norm() * (c - a).norm();
    let tolerance = DEGENERACY_TOLERANCE * scale.max(1.0);

    if det > tolerance {
        Orientation::POSITIVE
    } else if det < -tolerance {
        Orientation::NEGATIVE
    } else {
        Orientation::DEGENERATE
    }
}

/// Whether the triple `(a, b, c)` turns strictly counterclockwise.
#[must_use]
#[inline]
pub fn ccw(a: Point, b: Point, c: Point) -> bool {
    orientation(a, b, c) == Orientation::POSITIVE
}

/// Classify point `d` against the circumcircle of the triangle `(a, b, c)`.
///
/// The triangle must be counterclockwise; the classification flips sign for
/// clockwise triangles. The test evaluates the 3×3 determinant
///
/// ```text
/// | aₓ-dₓ  aᵧ-dᵧ  |a-d|² |
/// | bₓ-dₓ  bᵧ-dᵧ  |b-d|² |
/// | cₓ-dₓ  cᵧ-dᵧ  |c-d|² |
/// ```
///
/// which is positive exactly when `d` lies inside the circumcircle. Values
/// within a magnitude-scaled band around zero are reported as `BOUNDARY` so
/// that exactly cocircular configurations (regular grids in particular) do
/// not trigger flips.
#[must_use]
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> InCircle {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;

    let ad2 = ad.norm_squared();
    let bd2 = bd.norm_squared();
    let cd2 = cd.norm_squared();

    let det = ad.x * (bd.y * cd2 - cd.y * bd2) - ad.y * (bd.x * cd2 - cd.x * bd2)
        + ad2 * (bd.x * cd.y - cd.x * bd.y);

    let scale = ad2.max(bd2).max(cd2);
    let tolerance = DEGENERACY_TOLERANCE * (scale * scale).max(1.0);

    if det > tolerance {
        InCircle::INSIDE
    } else if det < -tolerance {
        InCircle::OUTSIDE
    } else {
        InCircle::BOUNDARY
    }
}
