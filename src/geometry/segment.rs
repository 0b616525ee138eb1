//! Line segments and rays.
//!
//! [`LineSegment`] carries the projection and perp-dot intersection helpers
//! the walkers and the constraint inserter use; [`Ray`] is the query type for
//! [`Mesh::shoot`](crate::core::mesh::Mesh#method.shoot).

use serde::{Deserialize, Serialize};

use crate::geometry::point::Point;

/// A directed line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
}

impl LineSegment {
    /// Creates a segment from its endpoints.
    #[must_use]
    #[inline]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Displacement vector from start to end.
    #[must_use]
    #[inline]
    pub fn direction(&self) -> Point {
        self.end - self.start
    }

    /// Segment length.
    #[must_use]
    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.start + self.direction() * 0.5
    }

    /// Point at parameter `t` along the segment (`t = 0` is the start,
    /// `t = 1` the end; values outside `[0, 1]` extrapolate).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        self.start + self.direction() * t
    }

    /// Parameter of the orthogonal projection of `p` onto the supporting
    /// line, unclamped. Returns `0.0` for a degenerate segment.
    #[must_use]
    pub fn project_parameter(&self, p: Point) -> f64 {
        let d = self.direction();
        let len2 = d.norm_squared();
        if len2 > 0.0 {
            (p - self.start).dot(d) / len2
        } else {
            0.0
        }
    }

    /// Perpendicular distance from `p` to the supporting line.
    ///
    /// For a degenerate segment this is the distance to the start point.
    #[must_use]
    pub fn distance_to_line(&self, p: Point) -> f64 {
        let d = self.direction();
        let len = d.norm();
        if len > 0.0 {
            (d.cross(p - self.start) / len).abs()
        } else {
            self.start.distance_to(p)
        }
    }

    /// Distance from `p` to the segment itself (projection clamped to the
    /// endpoints).
    #[must_use]
    pub fn distance_to_point(&self, p: Point) -> f64 {
        let t = self.project_parameter(p).clamp(0.0, 1.0);
        self.point_at(t).distance_to(p)
    }

    /// Intersection parameters of the two supporting lines.
    ///
    /// Returns `(t, u)` such that `self.point_at(t) == other.point_at(u)`,
    /// or `None` when the lines are parallel within tolerance. Callers
    /// restrict `t` and `u` to the ranges they care about.
    #[must_use]
    pub fn intersection_parameters(&self, other: &Self) -> Option<(f64, f64)> {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);

        let scale = r.norm() * s.norm();
        if denom.abs() <= f64::EPSILON * 64.0 * scale.max(1.0) {
            return None;
        }

        let q = other.start - self.start;
        let t = q.cross(s) / denom;
        let u = q.cross(r) / denom;
        Some((t, u))
    }

    /// Intersection point of the two supporting lines, if they are not
    /// parallel.
    #[must_use]
    pub fn intersection_point(&self, other: &Self) -> Option<Point> {
        self.intersection_parameters(other)
            .map(|(t, _)| self.point_at(t))
    }
}

impl std::fmt::Display for LineSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// A ray: an origin and a direction of unbounded extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Ray origin.
    pub origin: Point,
    /// Ray direction; need not be normalized.
    pub direction: Point,
}

impl Ray {
    /// Creates a ray from an origin and a direction.
    #[must_use]
    #[inline]
    pub const fn new(origin: Point, direction: Point) -> Self {
        Self { origin, direction }
    }
}
