//! Label placement along a link path.

use plexus_core::geometry::{PathData, Point, Sample};

use crate::model::{LabelOffset, LabelPosition};

/// Resolves a label distance against a path of `length`.
///
/// Values in `(0, 1]` are fractions of the length, negative values count back
/// from the end, anything else is absolute. The result is clamped onto the
/// path.
pub fn resolve_distance(distance: f32, length: f32) -> f32 {
    let resolved = if distance > 0.0 && distance <= 1.0 {
        distance * length
    } else if distance < 0.0 {
        length + distance
    } else {
        distance
    };
    resolved.clamp(0.0, length.max(0.0))
}

/// Where a label sits on `path`, or `None` for an empty path.
pub fn label_point(path: &PathData, samples: &[Sample], position: &LabelPosition) -> Option<Point> {
    let distance = resolve_distance(position.distance, path.length());
    let point = path.point_at_length(distance)?;
    Some(match position.offset {
        None => point,
        Some(LabelOffset::Point { x, y }) => point.offset(x, y),
        Some(LabelOffset::Perpendicular(offset)) => match normal_at(samples, point) {
            Some(normal) => point.add_point(normal.scale(offset)),
            None => point,
        },
    })
}

/// The unit normal of the sampled path nearest to `point`.
fn normal_at(samples: &[Sample], point: Point) -> Option<Point> {
    let nearest = samples
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.point
                .squared_distance(point)
                .total_cmp(&b.point.squared_distance(point))
        })
        .map(|(index, _)| index)?;

    let tangent = match (samples.get(nearest), samples.get(nearest + 1)) {
        (Some(here), Some(next)) => next.point.sub_point(here.point),
        (Some(here), None) if nearest > 0 => here.point.sub_point(samples[nearest - 1].point),
        _ => return None,
    };
    let length = tangent.hypot();
    if length < f32::EPSILON {
        return None;
    }
    let unit = tangent.scale(1.0 / length);
    Some(Point::new(-unit.y(), unit.x()))
}
