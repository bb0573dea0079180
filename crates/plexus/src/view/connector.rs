//! Connectors turn a link's end points and route into path data.

use serde_json::Value;

use plexus_core::geometry::{PathData, Point, Segment, bezier};

/// Builds the drawn path of a link.
pub trait Connector {
    fn connect(&self, source: Point, target: Point, route: &[Point], args: &Value) -> PathData;
}

/// Straight segments through every route point.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalConnector;

impl Connector for NormalConnector {
    fn connect(&self, source: Point, target: Point, route: &[Point], _args: &Value) -> PathData {
        PathData::from_polyline(&through(source, target, route))
    }
}

/// A cubic curve; with a route, a smooth spline through all points.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothConnector;

impl Connector for SmoothConnector {
    fn connect(&self, source: Point, target: Point, route: &[Point], _args: &Value) -> PathData {
        if !route.is_empty() {
            return bezier::curve_through_points(&through(source, target, route));
        }
        let mid_x = (source.x() + target.x()) / 2.0;
        PathData::new(vec![
            Segment::MoveTo(source),
            Segment::CurveTo(
                Point::new(mid_x, source.y()),
                Point::new(mid_x, target.y()),
                target,
            ),
        ])
    }
}

/// Straight segments with rounded corners at route points.
///
/// The corner radius comes from `args.radius` and defaults to 10; it is
/// capped at half of each adjacent segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundedConnector;

const DEFAULT_RADIUS: f32 = 10.0;

impl Connector for RoundedConnector {
    fn connect(&self, source: Point, target: Point, route: &[Point], args: &Value) -> PathData {
        let radius = args
            .get("radius")
            .and_then(Value::as_f64)
            .map_or(DEFAULT_RADIUS, |r| r as f32);

        let points = through(source, target, route);
        let mut path = PathData::new(vec![Segment::MoveTo(source)]);
        for window in points.windows(3) {
            let [previous, corner, next] = [window[0], window[1], window[2]];
            let start = corner.move_toward(previous, radius.min(corner.distance(previous) / 2.0));
            let end = corner.move_toward(next, radius.min(corner.distance(next) / 2.0));
            let control = |p: Point| p.add_point(corner.scale(2.0)).scale(1.0 / 3.0);
            path.push(Segment::LineTo(start));
            path.push(Segment::CurveTo(control(start), control(end), end));
        }
        path.push(Segment::LineTo(target));
        path
    }
}

fn through(source: Point, target: Point, route: &[Point]) -> Vec<Point> {
    let mut points = Vec::with_capacity(route.len() + 2);
    points.push(source);
    points.extend_from_slice(route);
    points.push(target);
    points
}
