//! Smooth cubic splines through ordered knots.
//!
//! Control points are found by solving the tridiagonal system that makes the
//! first and second derivatives continuous at every inner knot.

use super::{PathData, Point, Segment};

/// Control points of a smooth curve through `knots`.
///
/// Returns one `(first, second)` control-point pair per consecutive knot
/// pair. Fewer than two knots produce no segments.
pub fn control_points(knots: &[Point]) -> Vec<(Point, Point)> {
    let n = match knots.len() {
        0 | 1 => return Vec::new(),
        len => len - 1,
    };

    if n == 1 {
        // Straight line: P1 = (2P0 + P3) / 3, P2 = 2P1 - P0
        let first = Point::new(
            (2.0 * knots[0].x() + knots[1].x()) / 3.0,
            (2.0 * knots[0].y() + knots[1].y()) / 3.0,
        );
        let second = Point::new(
            2.0 * first.x() - knots[0].x(),
            2.0 * first.y() - knots[0].y(),
        );
        return vec![(first, second)];
    }

    let rhs_x = right_hand_side(knots, n, Point::x);
    let rhs_y = right_hand_side(knots, n, Point::y);
    let xs = first_control_points(&rhs_x);
    let ys = first_control_points(&rhs_y);

    (0..n)
        .map(|i| {
            let first = Point::new(xs[i], ys[i]);
            let second = if i < n - 1 {
                Point::new(
                    2.0 * knots[i + 1].x() - xs[i + 1],
                    2.0 * knots[i + 1].y() - ys[i + 1],
                )
            } else {
                Point::new((knots[n].x() + xs[n - 1]) / 2.0, (knots[n].y() + ys[n - 1]) / 2.0)
            };
            (first, second)
        })
        .collect()
}

/// A path of cubic curves passing through every knot.
pub fn curve_through_points(knots: &[Point]) -> PathData {
    let Some(first) = knots.first() else {
        return PathData::default();
    };

    let mut segments = vec![Segment::MoveTo(*first)];
    segments.extend(
        control_points(knots)
            .into_iter()
            .zip(knots.iter().skip(1))
            .map(|((c1, c2), end)| Segment::CurveTo(c1, c2, *end)),
    );
    PathData::new(segments)
}

fn right_hand_side(knots: &[Point], n: usize, axis: fn(Point) -> f32) -> Vec<f32> {
    (0..n)
        .map(|i| {
            if i == 0 {
                axis(knots[0]) + 2.0 * axis(knots[1])
            } else if i == n - 1 {
                (8.0 * axis(knots[n - 1]) + axis(knots[n])) / 2.0
            } else {
                4.0 * axis(knots[i]) + 2.0 * axis(knots[i + 1])
            }
        })
        .collect()
}

/// Thomas algorithm for the tridiagonal system of first control points.
fn first_control_points(rhs: &[f32]) -> Vec<f32> {
    let n = rhs.len();
    let mut x = vec![0.0; n];
    let mut tmp = vec![0.0; n];
    let mut b = 2.0;
    x[0] = rhs[0] / b;

    for i in 1..n {
        tmp[i] = 1.0 / b;
        b = if i < n - 1 { 4.0 } else { 3.5 } - tmp[i];
        x[i] = (rhs[i] - x[i - 1]) / b;
    }
    for i in 1..n {
        x[n - i - 1] -= tmp[n - i] * x[n - i];
    }
    x
}
