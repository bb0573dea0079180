//! 2D affine transforms.
//!
//! [`Matrix`] follows the SVG `matrix(a, b, c, d, e, f)` layout:
//!
//! ```text
//! | a c e |
//! | b d f |
//! | 0 0 1 |
//! ```

use super::{Bounds, Point};

/// A 2D affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

/// The components of an affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub rotation: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` about the origin.
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` about `center`.
    pub fn rotate_about(degrees: f32, center: Point) -> Self {
        Self::translate(center.x(), center.y())
            .multiply(&Self::rotate(degrees))
            .multiply(&Self::translate(-center.x(), -center.y()))
    }

    pub fn skew_x(degrees: f32) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f32) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    pub fn components(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Returns `self × other`; applying the result equals applying `other` first.
    pub fn multiply(&self, other: &Matrix) -> Self {
        Self {
            a: self.a.mul_add(other.a, self.c * other.b),
            b: self.b.mul_add(other.a, self.d * other.b),
            c: self.a.mul_add(other.c, self.c * other.d),
            d: self.b.mul_add(other.c, self.d * other.d),
            e: self.a.mul_add(other.e, self.c * other.f) + self.e,
            f: self.b.mul_add(other.e, self.d * other.f) + self.f,
        }
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a.mul_add(self.d, -(self.b * self.c));
        if det.abs() < f32::EPSILON {
            return None;
        }
        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: self.c.mul_add(self.f, -(self.d * self.e)) / det,
            f: self.b.mul_add(self.e, -(self.a * self.f)) / det,
        })
    }

    pub fn transform_point(&self, p: Point) -> Point {
        let delta = self.delta_transform_point(p);
        Point::new(delta.x() + self.e, delta.y() + self.f)
    }

    /// Applies only the linear part of the transform (no translation).
    pub fn delta_transform_point(&self, p: Point) -> Point {
        Point::new(
            p.x().mul_add(self.a, p.y() * self.c),
            p.x().mul_add(self.b, p.y() * self.d),
        )
    }

    /// Axis-aligned bounds of the transformed rectangle.
    pub fn transform_bounds(&self, bounds: Bounds) -> Bounds {
        Bounds::from_points(bounds.corners().map(|c| self.transform_point(c))).unwrap_or(bounds)
    }

    /// Splits the transform into translation, scale, skew and rotation.
    ///
    /// The unit vectors are pushed through the linear part and their angles
    /// give the skews; the rotation equals the x skew.
    pub fn decompose(&self) -> Decomposition {
        let px = self.delta_transform_point(Point::new(0.0, 1.0));
        let py = self.delta_transform_point(Point::new(1.0, 0.0));
        let skew_x = px.y().atan2(px.x()).to_degrees() - 90.0;
        let skew_y = py.y().atan2(py.x()).to_degrees();

        Decomposition {
            translate_x: self.e,
            translate_y: self.f,
            scale_x: self.a.hypot(self.b),
            scale_y: self.c.hypot(self.d),
            skew_x,
            skew_y,
            rotation: skew_x,
        }
    }
}
