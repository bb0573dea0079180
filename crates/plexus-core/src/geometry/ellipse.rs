//! Axis-aligned ellipses.

use super::{Bounds, Point};

/// An ellipse described by its center and two radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    center: Point,
    rx: f32,
    ry: f32,
}

impl Ellipse {
    pub fn new(center: Point, rx: f32, ry: f32) -> Self {
        Self {
            center,
            rx: rx.abs(),
            ry: ry.abs(),
        }
    }

    /// The ellipse inscribed in the given bounds.
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self::new(bounds.center(), bounds.width() / 2.0, bounds.height() / 2.0)
    }

    pub fn center(self) -> Point {
        self.center
    }

    pub fn rx(self) -> f32 {
        self.rx
    }

    pub fn ry(self) -> f32 {
        self.ry
    }

    pub fn bounds(self) -> Bounds {
        Bounds::new(
            self.center.x() - self.rx,
            self.center.y() - self.ry,
            self.rx * 2.0,
            self.ry * 2.0,
        )
    }

    pub fn contains_point(self, p: Point) -> bool {
        if self.rx == 0.0 || self.ry == 0.0 {
            return false;
        }
        let d = p.sub_point(self.center);
        let nx = d.x() / self.rx;
        let ny = d.y() / self.ry;
        nx.mul_add(nx, ny * ny) <= 1.0
    }

    /// Intersection of the ray from the center toward `p` with the ellipse.
    ///
    /// Solved directly from the ellipse equation. With a non-zero `angle` the
    /// ellipse is treated as rotated about its center by that many degrees.
    /// A vertical ray falls back to the nearest point of the bounding box,
    /// which for an ellipse is the top or bottom vertex.
    pub fn intersection_with_line_from_center_to_point(self, p: Point, angle: f32) -> Point {
        let local = p.rotate(self.center, -angle);
        let dx = local.x() - self.center.x();
        let dy = local.y() - self.center.y();

        let spot = if dx.abs() < f32::EPSILON {
            if dy.abs() < f32::EPSILON {
                self.center
            } else {
                Point::new(self.center.x(), self.center.y() + self.ry.copysign(dy))
            }
        } else if self.rx == 0.0 || self.ry == 0.0 {
            self.center
        } else {
            let m = dy / dx;
            let x = (1.0 / (1.0 / (self.rx * self.rx) + (m * m) / (self.ry * self.ry)))
                .sqrt()
                .copysign(dx);
            Point::new(self.center.x() + x, self.center.y() + m * x)
        };

        spot.rotate(self.center, angle)
    }
}
