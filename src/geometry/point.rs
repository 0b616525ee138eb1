//! 2D point and vector arithmetic.
//!
//! [`Point`] doubles as a position and a displacement vector; the predicates
//! and walk routines lean on the vector operators defined here rather than
//! spelling out coordinate arithmetic inline.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A point (or displacement vector) in the Euclidean plane.
///
/// Coordinates are `f64`; equality is exact bitwise-value equality, which is
/// appropriate because coordinates are only ever copied between records, never
/// recomputed. Proximity questions go through [`Point::distance_to`] and the
/// mesh tolerances instead.
///
/// # Examples
///
/// ```
/// use subdivision::geometry::point::Point;
///
/// let a = Point::new(1.0, 2.0);
/// let b = Point::new(4.0, 6.0);
/// assert_eq!((b - a).norm(), 5.0);
/// assert_eq!(a + (b - a), b);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors.
    #[must_use]
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (the z component of the 3D cross product).
    ///
    /// Positive when `other` lies counterclockwise of `self`.
    #[must_use]
    #[inline]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Squared Euclidean norm.
    #[must_use]
    #[inline]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean norm.
    #[must_use]
    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    #[inline]
    pub fn distance_to(self, other: Self) -> f64 {
        (other - self).norm()
    }

    /// Unit vector in the same direction.
    ///
    /// Returns the zero vector unchanged rather than dividing by zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n > 0.0 {
            Self::new(self.x / n, self.y / n)
        } else {
            self
        }
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_operators() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, -2.0);

        assert_eq!(a + b, Point::new(4.0, 2.0));
        assert_eq!(a - b, Point::new(2.0, 6.0));
        assert_eq!(a * 2.0, Point::new(6.0, 8.0));
        assert_eq!(-a, Point::new(-3.0, -4.0));
    }

    #[test]
    fn test_dot_and_cross() {
        let e_x = Point::new(1.0, 0.0);
        let e_y = Point::new(0.0, 1.0);

        assert_eq!(e_x.dot(e_y), 0.0);
        assert_eq!(e_x.cross(e_y), 1.0);
        assert_eq!(e_y.cross(e_x), -1.0);
    }

    #[test]
    fn test_norm_and_distance() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.norm(), 5.0);
        assert_eq!(a.norm_squared(), 25.0);
        assert_eq!(Point::new(0.0, 0.0).distance_to(a), 5.0);
    }

    #[test]
    fn test_normalized_handles_zero() {
        let z = Point::new(0.0, 0.0);
        assert_eq!(z.normalized(), z);

        let n = Point::new(0.0, -7.0).normalized();
        assert!((n.norm() - 1.0).abs() < 1e-15);
        assert_eq!(n, Point::new(0.0, -1.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Point::new(1.5, -2.0).to_string(), "(1.5, -2)");
    }
}
