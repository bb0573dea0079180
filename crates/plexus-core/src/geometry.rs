//! Geometric primitives for the diagram scene.
//!
//! This module provides the geometry kernel used by Plexus to resolve where
//! links attach to elements, how paths are drawn and sampled, and how
//! rotated or scaled shapes project into the shared paper frame.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in paper space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle defined by minimum and maximum coordinates
//! - [`Side`] - One of the four sides of a rectangle
//! - [`Line`](line::Line) - A line segment with segment-segment intersection
//! - [`Ellipse`](ellipse::Ellipse) - An axis-aligned ellipse
//! - [`Matrix`](matrix::Matrix) - A 2D affine transform with decomposition
//! - [`PathData`](path::PathData) - Vector paths with length and sampling
//! - [`bezier`] - Smooth cubic splines through ordered knots
//!
//! # Coordinate System
//!
//! Plexus uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Angles are expressed in degrees. A positive rotation turns the +X axis
//! toward +Y, which is clockwise on screen (the SVG `rotate()` convention).

pub mod bezier;
pub mod ellipse;
pub mod line;
pub mod matrix;
pub mod path;
pub mod transform;

use serde::{Deserialize, Serialize};

pub use ellipse::Ellipse;
pub use line::Line;
pub use matrix::{Decomposition, Matrix};
pub use path::{PathData, Sample, Segment};

/// A 2D point representing a position in paper coordinate space.
///
/// # Examples
///
/// ```
/// # use plexus_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Moves the point by the given deltas.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Squared Euclidean distance, for comparisons that do not need the root.
    pub fn squared_distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Manhattan (taxicab) distance to another point.
    pub fn manhattan_distance(self, other: Point) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Rotates the point about `origin` by `degrees` (clockwise on screen).
    ///
    /// # Examples
    ///
    /// ```
    /// # use plexus_core::geometry::Point;
    /// let p = Point::new(10.0, 0.0).rotate(Point::default(), 90.0);
    /// assert!((p.x() - 0.0).abs() < 1e-4);
    /// assert!((p.y() - 10.0).abs() < 1e-4);
    /// ```
    pub fn rotate(self, origin: Point, degrees: f32) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let d = self.sub_point(origin);
        Self {
            x: origin.x + d.x.mul_add(cos, -d.y * sin),
            y: origin.y + d.x.mul_add(sin, d.y * cos),
        }
    }

    /// Converts the point into polar coordinates `(radius, degrees)` about `origin`.
    pub fn to_polar(self, origin: Point) -> (f32, f32) {
        let d = self.sub_point(origin);
        (d.hypot(), normalize_angle(d.y.atan2(d.x).to_degrees()))
    }

    /// Creates a point from polar coordinates about `origin`.
    pub fn from_polar(radius: f32, degrees: f32, origin: Point) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: radius.mul_add(cos, origin.x),
            y: radius.mul_add(sin, origin.y),
        }
    }

    /// Angle in degrees of the vector from `other` to this point, in `[0, 360)`.
    pub fn theta(self, other: Point) -> f32 {
        self.to_polar(other).1
    }

    /// Moves the point toward `reference` by `distance`.
    ///
    /// A negative distance moves away from the reference. When both points
    /// coincide the point is returned unchanged.
    pub fn move_toward(self, reference: Point, distance: f32) -> Self {
        let d = reference.sub_point(self);
        let length = d.hypot();
        if length < f32::EPSILON {
            return self;
        }
        self.add_point(d.scale(distance / length))
    }

    /// Snaps both coordinates to the nearest multiple of `grid`.
    ///
    /// A grid size of 1 or less leaves the point unchanged.
    pub fn snap_to_grid(self, grid: f32) -> Self {
        Self {
            x: snap_to_grid(self.x, grid),
            y: snap_to_grid(self.y, grid),
        }
    }

    /// Rounds both coordinates to `precision` decimal places.
    pub fn round(self, precision: u32) -> Self {
        let factor = 10f32.powi(precision as i32);
        Self {
            x: (self.x * factor).round() / factor,
            y: (self.y * factor).round() / factor,
        }
    }

    /// Clamps the point into the given bounds.
    pub fn adhere_to(self, bounds: Bounds) -> Self {
        Self {
            x: self.x.clamp(bounds.min_x, bounds.max_x),
            y: self.y.clamp(bounds.min_y, bounds.max_y),
        }
    }
}

/// Snaps a scalar to the nearest multiple of `grid`.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 1.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Multiplies both dimension by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Returns a size with negative extents clamped to zero.
    pub fn non_negative(self) -> Self {
        Self {
            width: self.width.max(0.0),
            height: self.height.max(0.0),
        }
    }
}

/// One side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and extents.
    ///
    /// Negative extents are normalized so that `min <= max` always holds.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self::from_corners(
            Point::new(center.x - half_width, center.y - half_height),
            Point::new(center.x + half_width, center.y + half_height),
        )
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self::new(top_left.x, top_left.y, size.width, size.height)
    }

    /// Creates the smallest bounds containing both corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Creates the smallest bounds containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_corners(first, first), |acc, p| {
            acc.merge(&Self::from_corners(p, p))
        }))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Returns the bottom-right corner as a Point
    pub fn max_point(self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    /// The four corners in clockwise order starting at the top-left.
    pub fn corners(self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Grows the bounds by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Self {
        Self::from_corners(
            Point::new(self.min_x - amount, self.min_y - amount),
            Point::new(self.max_x + amount, self.max_y + amount),
        )
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Returns true if `other` lies entirely inside these bounds.
    pub fn contains_bounds(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Returns true if the two bounds overlap (touching edges count).
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// The overlapping region of two bounds, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// The side closest to the point.
    ///
    /// Ties resolve in the order left, right, top, bottom.
    pub fn side_nearest_to_point(&self, p: Point) -> Side {
        let candidates = [
            (Side::Right, self.max_x - p.x),
            (Side::Top, p.y - self.min_y),
            (Side::Bottom, self.max_y - p.y),
        ];
        candidates
            .into_iter()
            .fold((Side::Left, p.x - self.min_x), |closest, candidate| {
                if candidate.1 < closest.1 {
                    candidate
                } else {
                    closest
                }
            })
            .0
    }

    /// The point on the boundary nearest to `p`.
    ///
    /// Points inside are projected onto their nearest side; points outside are
    /// clamped onto the rectangle.
    pub fn point_nearest_to_point(&self, p: Point) -> Point {
        if self.contains_point(p) {
            return match self.side_nearest_to_point(p) {
                Side::Left => Point::new(self.min_x, p.y),
                Side::Right => Point::new(self.max_x, p.y),
                Side::Top => Point::new(p.x, self.min_y),
                Side::Bottom => Point::new(p.x, self.max_y),
            };
        }
        p.adhere_to(*self)
    }

    /// Intersection of the ray from the center toward `p` with the boundary.
    ///
    /// When `angle` is non-zero the rectangle is treated as rotated by that
    /// many degrees about its center: `p` is rotated into the local frame,
    /// intersected, and the result rotated back. Returns `None` when `p` lies
    /// inside the rectangle (including its center).
    ///
    /// # Examples
    ///
    /// ```
    /// # use plexus_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::new(0.0, 0.0, 100.0, 60.0);
    /// let spot = bounds
    ///     .intersection_with_line_from_center_to_point(Point::new(200.0, 30.0), 0.0)
    ///     .unwrap();
    /// assert_eq!(spot, Point::new(100.0, 30.0));
    /// ```
    pub fn intersection_with_line_from_center_to_point(&self, p: Point, angle: f32) -> Option<Point> {
        let center = self.center();
        let local = p.rotate(center, -angle);
        let connector = Line::new(center, local);
        let [top_left, top_right, bottom_right, bottom_left] = self.corners();
        let sides = [
            Line::new(top_left, top_right),
            Line::new(top_right, bottom_right),
            Line::new(bottom_right, bottom_left),
            Line::new(bottom_left, top_left),
        ];
        sides
            .iter()
            .rev()
            .find_map(|side| side.intersection(&connector))
            .map(|spot| spot.rotate(center, angle))
    }

    /// Axis-aligned bounds of this rectangle rotated by `angle` degrees about its center.
    pub fn bbox_of_rotated(&self, angle: f32) -> Self {
        if angle == 0.0 {
            return *self;
        }
        let center = self.center();
        Self::from_points(self.corners().map(|c| c.rotate(center, angle))).unwrap_or(*self)
    }
}

/// Per-side spacing added around bounds, such as the export padding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}

impl Bounds {
    /// Grows the bounds outwards by `insets`.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left,
            min_y: self.min_y - insets.top,
            max_x: self.max_x + insets.right,
            max_y: self.max_y + insets.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_default() {
        let point = Point::default();
        assert_eq!(point.x(), 0.0);
        assert_eq!(point.y(), 0.0);
        assert!(point.is_zero());
    }

    #[test]
    fn test_point_distances() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_approx_eq!(f32, a.distance(b), 5.0);
        assert_approx_eq!(f32, a.squared_distance(b), 25.0);
        assert_approx_eq!(f32, a.manhattan_distance(b), 7.0);
    }

    #[test]
    fn test_point_rotate_quarter_turns() {
        let origin = Point::new(10.0, 10.0);
        let p = Point::new(20.0, 10.0);

        let quarter = p.rotate(origin, 90.0);
        assert_approx_eq!(f32, quarter.x(), 10.0, epsilon = 1e-4);
        assert_approx_eq!(f32, quarter.y(), 20.0, epsilon = 1e-4);

        let back = quarter.rotate(origin, -90.0);
        assert_approx_eq!(f32, back.x(), 20.0, epsilon = 1e-4);
        assert_approx_eq!(f32, back.y(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_point_polar_roundtrip() {
        let origin = Point::new(5.0, 5.0);
        let p = Point::new(5.0, 15.0);
        let (radius, angle) = p.to_polar(origin);
        assert_approx_eq!(f32, radius, 10.0);
        assert_approx_eq!(f32, angle, 90.0);

        let back = Point::from_polar(radius, angle, origin);
        assert_approx_eq!(f32, back.x(), 5.0, epsilon = 1e-4);
        assert_approx_eq!(f32, back.y(), 15.0, epsilon = 1e-4);
    }

    #[test]
    fn test_point_move_toward() {
        let p = Point::new(0.0, 0.0).move_toward(Point::new(10.0, 0.0), 4.0);
        assert_eq!(p, Point::new(4.0, 0.0));

        let same = Point::new(3.0, 3.0).move_toward(Point::new(3.0, 3.0), 4.0);
        assert_eq!(same, Point::new(3.0, 3.0));
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(14.0, 10.0), 10.0);
        assert_eq!(snap_to_grid(15.0, 10.0), 20.0);
        assert_eq!(snap_to_grid(14.3, 1.0), 14.3);
        assert_eq!(Point::new(7.0, 12.0).snap_to_grid(5.0), Point::new(5.0, 10.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(370.0), 10.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(360.0), 0.0);
    }

    #[test]
    fn test_bounds_new_normalizes() {
        let bounds = Bounds::new(10.0, 10.0, -4.0, -6.0);
        assert_eq!(bounds.min_x(), 6.0);
        assert_eq!(bounds.min_y(), 4.0);
        assert_eq!(bounds.width(), 4.0);
        assert_eq!(bounds.height(), 6.0);
    }

    #[test]
    fn test_bounds_contains() {
        let outer = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let inner = Bounds::new(10.0, 10.0, 20.0, 20.0);
        assert!(outer.contains_point(Point::new(100.0, 0.0)));
        assert!(!outer.contains_point(Point::new(100.1, 0.0)));
        assert!(outer.contains_bounds(&inner));
        assert!(!inner.contains_bounds(&outer));
    }

    #[test]
    fn test_bounds_intersection() {
        let a = Bounds::new(0.0, 0.0, 50.0, 50.0);
        let b = Bounds::new(25.0, 25.0, 50.0, 50.0);
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, Bounds::new(25.0, 25.0, 25.0, 25.0));

        let c = Bounds::new(60.0, 60.0, 5.0, 5.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_side_nearest_to_point() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 60.0);
        assert_eq!(bounds.side_nearest_to_point(Point::new(5.0, 30.0)), Side::Left);
        assert_eq!(bounds.side_nearest_to_point(Point::new(200.0, 30.0)), Side::Right);
        assert_eq!(bounds.side_nearest_to_point(Point::new(50.0, -10.0)), Side::Top);
        assert_eq!(bounds.side_nearest_to_point(Point::new(50.0, 58.0)), Side::Bottom);
    }

    #[test]
    fn test_point_nearest_to_point() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 60.0);
        assert_eq!(
            bounds.point_nearest_to_point(Point::new(90.0, 30.0)),
            Point::new(100.0, 30.0)
        );
        assert_eq!(
            bounds.point_nearest_to_point(Point::new(150.0, -20.0)),
            Point::new(100.0, 0.0)
        );
    }

    #[test]
    fn test_intersection_right_edge_midpoint() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 60.0);
        let spot = bounds
            .intersection_with_line_from_center_to_point(Point::new(200.0, 30.0), 0.0)
            .unwrap();
        assert_eq!(spot, Point::new(100.0, 30.0));
    }

    #[test]
    fn test_intersection_inside_is_none() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 60.0);
        assert!(
            bounds
                .intersection_with_line_from_center_to_point(bounds.center(), 0.0)
                .is_none()
        );
        assert!(
            bounds
                .intersection_with_line_from_center_to_point(Point::new(60.0, 30.0), 0.0)
                .is_none()
        );
    }

    #[test]
    fn test_intersection_rotated_square() {
        // A square rotated by 45 degrees reaches its corner along the x axis.
        let bounds = Bounds::new(-10.0, -10.0, 20.0, 20.0);
        let spot = bounds
            .intersection_with_line_from_center_to_point(Point::new(100.0, 0.0), 45.0)
            .unwrap();
        assert_approx_eq!(f32, spot.x(), 200f32.sqrt(), epsilon = 1e-3);
        assert_approx_eq!(f32, spot.y(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bbox_of_rotated() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 20.0);
        let rotated = bounds.bbox_of_rotated(90.0);
        assert_approx_eq!(f32, rotated.width(), 20.0, epsilon = 1e-3);
        assert_approx_eq!(f32, rotated.height(), 100.0, epsilon = 1e-3);
        assert_approx_eq!(f32, rotated.center().x(), 50.0, epsilon = 1e-3);
        assert_approx_eq!(f32, rotated.center().y(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bounds_inflate_and_padding() {
        let bounds = Bounds::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(bounds.inflate(5.0), Bounds::new(5.0, 5.0, 20.0, 20.0));
        assert_eq!(
            bounds.add_padding(Insets::new(1.0, 2.0, 3.0, 4.0)),
            Bounds::new(6.0, 9.0, 16.0, 14.0)
        );
    }

    #[test]
    fn test_bounds_from_points() {
        assert!(Bounds::from_points(Vec::new()).is_none());
        let bounds =
            Bounds::from_points([Point::new(3.0, 9.0), Point::new(-1.0, 2.0), Point::new(5.0, 4.0)])
                .unwrap();
        assert_eq!(bounds, Bounds::new(-1.0, 2.0, 6.0, 7.0));
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new(x, y, w, h))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Intersecting a rotated rectangle equals un-rotating the query,
    /// intersecting the upright rectangle and rotating the result back.
    fn check_rotated_intersection_symmetry(
        bounds: Bounds,
        target: Point,
        angle: f32,
    ) -> Result<(), TestCaseError> {
        let center = bounds.center();
        prop_assume!(target.distance(center) > bounds.width().hypot(bounds.height()));

        let rotated = bounds.intersection_with_line_from_center_to_point(target, angle);
        let manual = bounds
            .intersection_with_line_from_center_to_point(target.rotate(center, -angle), 0.0)
            .map(|p| p.rotate(center, angle));

        match (rotated, manual) {
            (Some(a), Some(b)) => {
                prop_assert!(approx_eq!(f32, a.x(), b.x(), epsilon = 1e-2));
                prop_assert!(approx_eq!(f32, a.y(), b.y(), epsilon = 1e-2));
            }
            (a, b) => prop_assert_eq!(a.is_some(), b.is_some()),
        }
        Ok(())
    }

    /// The intersection of an upright rectangle always lies on its boundary.
    fn check_intersection_on_boundary(bounds: Bounds, target: Point) -> Result<(), TestCaseError> {
        prop_assume!(!bounds.contains_point(target));
        if let Some(spot) = bounds.intersection_with_line_from_center_to_point(target, 0.0) {
            let eps = 1e-2;
            let on_vertical = approx_eq!(f32, spot.x(), bounds.min_x(), epsilon = eps)
                || approx_eq!(f32, spot.x(), bounds.max_x(), epsilon = eps);
            let on_horizontal = approx_eq!(f32, spot.y(), bounds.min_y(), epsilon = eps)
                || approx_eq!(f32, spot.y(), bounds.max_y(), epsilon = eps);
            prop_assert!(on_vertical || on_horizontal);
            prop_assert!(bounds.inflate(eps).contains_point(spot));
        }
        Ok(())
    }

    fn check_bounds_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        prop_assert!(merged.contains_bounds(&b1));
        prop_assert!(merged.contains_bounds(&b2));
        Ok(())
    }

    fn check_rotate_roundtrip(p: Point, origin: Point, angle: f32) -> Result<(), TestCaseError> {
        let back = p.rotate(origin, angle).rotate(origin, -angle);
        prop_assert!(approx_eq!(f32, back.x(), p.x(), epsilon = 1e-1));
        prop_assert!(approx_eq!(f32, back.y(), p.y(), epsilon = 1e-1));
        Ok(())
    }

    proptest! {
        #[test]
        fn rotated_intersection_symmetry(
            bounds in bounds_strategy(),
            target in point_strategy(),
            angle in -360.0f32..360.0,
        ) {
            check_rotated_intersection_symmetry(bounds, target, angle)?;
        }

        #[test]
        fn intersection_on_boundary(bounds in bounds_strategy(), target in point_strategy()) {
            check_intersection_on_boundary(bounds, target)?;
        }

        #[test]
        fn bounds_merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_bounds_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn rotate_roundtrip(p in point_strategy(), origin in point_strategy(), angle in -720.0f32..720.0) {
            check_rotate_roundtrip(p, origin, angle)?;
        }
    }
}
