//! Line segments.

use super::Point;

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    start: Point,
    end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn start(self) -> Point {
        self.start
    }

    pub fn end(self) -> Point {
        self.end
    }

    pub fn length(self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn midpoint(self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Point at parameter `t` in `[0, 1]` along the segment.
    pub fn point_at(self, t: f32) -> Point {
        let d = self.end.sub_point(self.start);
        self.start.add_point(d.scale(t))
    }

    /// The point of the segment closest to `p`.
    pub fn closest_point(self, p: Point) -> Point {
        let d = self.end.sub_point(self.start);
        let length_sq = d.x().mul_add(d.x(), d.y() * d.y());
        if length_sq <= f32::EPSILON {
            return self.start;
        }
        let v = p.sub_point(self.start);
        let t = (v.x().mul_add(d.x(), v.y() * d.y()) / length_sq).clamp(0.0, 1.0);
        self.point_at(t)
    }

    /// Intersection point of two segments.
    ///
    /// Uses the determinant sign tests: parallel segments (zero determinant)
    /// and segments whose parameters fall outside `[0, 1]` do not intersect.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let dir1 = self.end.sub_point(self.start);
        let dir2 = other.end.sub_point(other.start);
        let det = dir1.x().mul_add(dir2.y(), -(dir1.y() * dir2.x()));
        let delta = other.start.sub_point(self.start);
        let alpha = delta.x().mul_add(dir2.y(), -(delta.y() * dir2.x()));
        let beta = delta.x().mul_add(dir1.y(), -(delta.y() * dir1.x()));

        if det == 0.0 || alpha * det < 0.0 || beta * det < 0.0 {
            return None;
        }
        if det > 0.0 {
            if alpha > det || beta > det {
                return None;
            }
        } else if alpha < det || beta < det {
            return None;
        }

        Some(Point::new(
            self.start.x() + alpha * dir1.x() / det,
            self.start.y() + alpha * dir1.y() / det,
        ))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_crossing_segments() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Line::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        let p = a.intersection(&b).unwrap();
        assert_approx_eq!(f32, p.x(), 5.0);
        assert_approx_eq!(f32, p.y(), 5.0);
    }

    #[test]
    fn test_parallel_segments() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let b = Line::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_non_overlapping_segments() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        let b = Line::new(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_touching_endpoint() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(5.0, 0.0));
        let b = Line::new(Point::new(5.0, -5.0), Point::new(5.0, 5.0));
        assert_eq!(a.intersection(&b), Some(Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_closest_point() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(line.closest_point(Point::new(4.0, 7.0)), Point::new(4.0, 0.0));
        assert_eq!(line.closest_point(Point::new(-4.0, 7.0)), Point::new(0.0, 0.0));
        assert_eq!(line.closest_point(Point::new(14.0, 7.0)), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_point_at_and_length() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(0.0, 20.0));
        assert_approx_eq!(f32, line.length(), 20.0);
        assert_eq!(line.point_at(0.25), Point::new(0.0, 5.0));
        assert_eq!(line.midpoint(), Point::new(0.0, 10.0));
    }
}
