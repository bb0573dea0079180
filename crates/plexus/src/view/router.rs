//! Routers turn a link's vertices into the route its connector draws through.

use serde_json::Value;

use plexus_core::geometry::{Bounds, Point};

/// What a router knows about the link it routes.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub source_bbox: Bounds,
    pub target_bbox: Bounds,
    pub args: &'a Value,
}

/// Computes the route points between the two end shapes.
///
/// The returned points exclude the end points themselves.
pub trait Router {
    fn route(&self, vertices: &[Point], ctx: &RouteContext<'_>) -> Vec<Point>;
}

/// The vertices, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalRouter;

impl Router for NormalRouter {
    fn route(&self, vertices: &[Point], _ctx: &RouteContext<'_>) -> Vec<Point> {
        vertices.to_vec()
    }
}

/// Axis-aligned segments with an elbow between every pair of points that do
/// not already share an axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrthogonalRouter;

impl Router for OrthogonalRouter {
    fn route(&self, vertices: &[Point], ctx: &RouteContext<'_>) -> Vec<Point> {
        let mut points = Vec::with_capacity(vertices.len() + 2);
        points.push(ctx.source_bbox.center());
        points.extend_from_slice(vertices);
        points.push(ctx.target_bbox.center());

        let mut route = Vec::new();
        for (index, pair) in points.windows(2).enumerate() {
            let (previous, next) = (pair[0], pair[1]);
            if index > 0 {
                route.push(previous);
            }
            if previous.x() == next.x() || previous.y() == next.y() {
                continue;
            }
            let elbow = Point::new(next.x(), previous.y());
            let blocked = |p: Point| {
                ctx.source_bbox.contains_point(p) || ctx.target_bbox.contains_point(p)
            };
            if blocked(elbow) {
                route.push(Point::new(previous.x(), next.y()));
            } else {
                route.push(elbow);
            }
        }
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(source: Bounds, target: Bounds) -> RouteContext<'static> {
        RouteContext {
            source_bbox: source,
            target_bbox: target,
            args: &Value::Null,
        }
    }

    #[test]
    fn test_normal_returns_vertices() {
        let vertices = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let route = NormalRouter.route(
            &vertices,
            &ctx(Bounds::default(), Bounds::default()),
        );
        assert_eq!(route, vertices.to_vec());
    }

    #[test]
    fn test_orthogonal_aligned_ends_need_no_elbow() {
        let route = OrthogonalRouter.route(
            &[],
            &ctx(
                Bounds::new(0.0, 0.0, 20.0, 20.0),
                Bounds::new(100.0, 0.0, 20.0, 20.0),
            ),
        );
        assert!(route.is_empty());
    }

    #[test]
    fn test_orthogonal_inserts_elbow() {
        let route = OrthogonalRouter.route(
            &[],
            &ctx(
                Bounds::new(0.0, 0.0, 20.0, 20.0),
                Bounds::new(100.0, 100.0, 20.0, 20.0),
            ),
        );
        assert_eq!(route, vec![Point::new(110.0, 10.0)]);
    }

    #[test]
    fn test_orthogonal_elbow_avoids_end_shapes() {
        // The default elbow (110, 10) would land inside the wide target.
        let route = OrthogonalRouter.route(
            &[],
            &ctx(
                Bounds::new(0.0, 0.0, 20.0, 20.0),
                Bounds::new(40.0, 0.0, 140.0, 200.0),
            ),
        );
        assert_eq!(route, vec![Point::new(10.0, 100.0)]);
    }

    #[test]
    fn test_orthogonal_keeps_vertices() {
        let vertex = Point::new(60.0, 60.0);
        let route = OrthogonalRouter.route(
            &[vertex],
            &ctx(
                Bounds::new(0.0, 0.0, 20.0, 20.0),
                Bounds::new(100.0, 100.0, 20.0, 20.0),
            ),
        );
        assert_eq!(
            route,
            vec![
                Point::new(60.0, 10.0),
                vertex,
                Point::new(110.0, 60.0),
            ]
        );
    }
}
