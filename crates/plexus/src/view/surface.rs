//! Magnet and marker geometry, and the connection-point algorithm.
//!
//! A [`Surface`] answers what a rendering backend would: the shape of an
//! element's sub-part and the size of a link's arrowheads. The default
//! [`TemplateSurface`] derives both from attributes and shape templates.

use std::str::FromStr;

use log::trace;
use serde_json::{Map, Value};

use plexus_core::geometry::{Bounds, Ellipse, Matrix, PathData, Point, Side, Size, transform};

use super::element_view::ElementView;
use crate::{
    model::{Cell, LinkEnd, patch},
    registry::{Outline, ShapeTemplate},
};

/// Drawn boundary of a magnet.
#[derive(Debug, Clone, PartialEq)]
pub enum MagnetOutline {
    Rect,
    Ellipse,
    /// Absolute path in the unrotated frame.
    Path(PathData),
}

/// The part of an element a link end attaches to.
///
/// `bounds` is unrotated; the shape is rotated by `angle` degrees about
/// `pivot`, the center of the owning element.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnetShape {
    pub bounds: Bounds,
    pub pivot: Point,
    pub angle: f32,
    pub outline: MagnetOutline,
}

impl MagnetShape {
    /// A zero-size shape standing for a free point.
    pub fn point(p: Point) -> Self {
        Self {
            bounds: Bounds::new_from_top_left(p, Size::default()),
            pivot: p,
            angle: 0.0,
            outline: MagnetOutline::Rect,
        }
    }

    /// The whole box of an element view.
    pub fn element(view: &ElementView) -> Self {
        Self {
            bounds: view.bbox(),
            pivot: view.center(),
            angle: view.angle(),
            outline: MagnetOutline::Rect,
        }
    }

    pub fn is_point(&self) -> bool {
        self.bounds.width() == 0.0 && self.bounds.height() == 0.0
    }

    pub fn center(&self) -> Point {
        self.bounds.center().rotate(self.pivot, self.angle)
    }

    /// Axis-aligned box around the rotated shape.
    pub fn aabb(&self) -> Bounds {
        if self.angle == 0.0 {
            return self.bounds;
        }
        let rotation = Matrix::rotate_about(self.angle, self.pivot);
        match &self.outline {
            MagnetOutline::Path(path) => path
                .transform(&rotation)
                .bounds()
                .unwrap_or_else(|| rotation.transform_bounds(self.bounds)),
            MagnetOutline::Rect | MagnetOutline::Ellipse => rotation.transform_bounds(self.bounds),
        }
    }

    pub fn contains_point(&self, p: Point) -> bool {
        let local = p.rotate(self.pivot, -self.angle);
        match self.outline {
            MagnetOutline::Ellipse => Ellipse::from_bounds(self.bounds).contains_point(local),
            MagnetOutline::Rect | MagnetOutline::Path(_) => self.bounds.contains_point(local),
        }
    }

    /// Where the ray from the shape's center toward `reference` leaves the
    /// outline. Falls back to the center.
    pub fn boundary_point(&self, reference: Point, sample_interval: f32) -> Point {
        let local = reference.rotate(self.pivot, -self.angle);
        let center = self.bounds.center();
        let spot = match &self.outline {
            MagnetOutline::Rect => self
                .bounds
                .intersection_with_line_from_center_to_point(local, 0.0)
                .unwrap_or(center),
            MagnetOutline::Ellipse => {
                let ellipse = Ellipse::from_bounds(self.bounds);
                if ellipse.contains_point(local) {
                    center
                } else {
                    ellipse.intersection_with_line_from_center_to_point(local, 0.0)
                }
            }
            MagnetOutline::Path(path) => nearest_path_sample(path, center, local, sample_interval),
        };
        spot.rotate(self.pivot, self.angle)
    }
}

/// The path sample minimizing `d(center) + 1.1 × d(reference)`.
///
/// Scores within one unit of each other are tied; the tie goes to the sample
/// closer to the reference.
fn nearest_path_sample(path: &PathData, center: Point, reference: Point, interval: f32) -> Point {
    let mut best: Option<(Point, f32, f32)> = None;
    for sample in path.sample(interval) {
        let to_reference = sample.point.distance(reference);
        let score = sample.point.distance(center) + 1.1 * to_reference;
        let better = match best {
            None => true,
            Some((_, best_score, best_reference)) => {
                score < best_score - 1.0
                    || ((score - best_score).abs() <= 1.0 && to_reference < best_reference)
            }
        };
        if better {
            best = Some((sample.point, score, to_reference));
        }
    }
    best.map_or(center, |(point, _, _)| point)
}

/// Where a link end attaches to `shape` given the `reference` it points at.
///
/// References inside the shape's box attach at its center. In
/// perpendicular mode a reference level with the box attaches straight
/// across: the horizontal test runs before the vertical one.
pub fn connection_point(
    shape: &MagnetShape,
    reference: Point,
    perpendicular: bool,
    sample_interval: f32,
) -> Point {
    let center = shape.center();
    let aabb = shape.aabb();
    if shape.is_point() || aabb.contains_point(reference) {
        return center;
    }
    if perpendicular {
        let horizontal = reference.y() >= aabb.min_y() && reference.y() <= aabb.max_y();
        let vertical = reference.x() >= aabb.min_x() && reference.x() <= aabb.max_x();
        if horizontal {
            return match aabb.side_nearest_to_point(reference) {
                Side::Left => Point::new(aabb.min_x(), reference.y()),
                Side::Right => Point::new(aabb.max_x(), reference.y()),
                Side::Top | Side::Bottom => center,
            };
        }
        if vertical {
            return match aabb.side_nearest_to_point(reference) {
                Side::Top => Point::new(reference.x(), aabb.min_y()),
                Side::Bottom => Point::new(reference.x(), aabb.max_y()),
                Side::Left | Side::Right => center,
            };
        }
        return aabb
            .intersection_with_line_from_center_to_point(reference, 0.0)
            .unwrap_or(center);
    }
    shape.boundary_point(reference, sample_interval)
}

/// Arrowhead size at one end of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGeometry {
    pub width: f32,
    pub scale_x: f32,
}

impl MarkerGeometry {
    /// How far the connection point moves back to make room for the marker.
    pub fn inset(&self) -> f32 {
        self.width / 2.0 * self.scale_x
    }
}

/// What a rendering backend knows about drawn shapes.
pub trait Surface {
    /// The shape of the sub-part `selector` of an element, or of the whole
    /// element when `selector` is `None`.
    fn magnet_shape(
        &self,
        element: &Cell,
        view: &ElementView,
        template: &ShapeTemplate,
        selector: Option<&str>,
    ) -> Option<MagnetShape>;

    /// The marker drawn at `end` of a link, if any.
    fn marker(&self, link: &Cell, template: &ShapeTemplate, end: LinkEnd) -> Option<MarkerGeometry>;
}

/// Derives geometry from attributes layered over template defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSurface;

impl TemplateSurface {
    fn outline_shape(&self, element: &Cell, view: &ElementView, template: &ShapeTemplate) -> MagnetShape {
        let bbox = view.bbox();
        let fit = |path: &PathData| {
            path.transform(
                &Matrix::translate(bbox.min_x(), bbox.min_y())
                    .multiply(&Matrix::scale(bbox.width(), bbox.height())),
            )
        };
        let outline = match template.outline() {
            Outline::Rect => MagnetOutline::Rect,
            Outline::Ellipse => MagnetOutline::Ellipse,
            Outline::Path(unit) => match body_path(element, template) {
                Some(drawn) => MagnetOutline::Path(fit_to(&drawn, bbox)),
                None => MagnetOutline::Path(fit(unit)),
            },
            Outline::Diamond => match template.outline().unit_path() {
                Some(unit) => MagnetOutline::Path(fit(&unit)),
                None => MagnetOutline::Rect,
            },
        };
        MagnetShape {
            bounds: bbox,
            pivot: view.center(),
            angle: view.angle(),
            outline,
        }
    }
}

impl Surface for TemplateSurface {
    fn magnet_shape(
        &self,
        element: &Cell,
        view: &ElementView,
        template: &ShapeTemplate,
        selector: Option<&str>,
    ) -> Option<MagnetShape> {
        let Some(selector) = selector else {
            return Some(self.outline_shape(element, view, template));
        };
        let attrs = merged_attrs(element, template, selector)?;
        let bbox = view.bbox();
        let origin = Point::new(
            bbox.min_x() + relative(number(&attrs, "ref-x"), bbox.width()),
            bbox.min_y() + relative(number(&attrs, "ref-y"), bbox.height()),
        );
        let shape = |bounds: Bounds, outline: MagnetOutline| MagnetShape {
            bounds,
            pivot: view.center(),
            angle: view.angle(),
            outline,
        };

        if let Some(path) = attrs
            .get("d")
            .and_then(Value::as_str)
            .and_then(|d| PathData::from_str(d).ok())
        {
            let path = path.transform(&Matrix::translate(origin.x(), origin.y()));
            let bounds = path.bounds()?;
            return Some(shape(bounds, MagnetOutline::Path(path)));
        }

        let center = origin.offset(
            number(&attrs, "cx").unwrap_or_default(),
            number(&attrs, "cy").unwrap_or_default(),
        );
        if let Some(r) = number(&attrs, "r") {
            return Some(shape(Ellipse::new(center, r, r).bounds(), MagnetOutline::Ellipse));
        }
        if let (Some(rx), Some(ry)) = (number(&attrs, "rx"), number(&attrs, "ry")) {
            return Some(shape(Ellipse::new(center, rx, ry).bounds(), MagnetOutline::Ellipse));
        }
        if let (Some(width), Some(height)) = (number(&attrs, "width"), number(&attrs, "height")) {
            let top_left = origin.offset(
                number(&attrs, "x").unwrap_or_default(),
                number(&attrs, "y").unwrap_or_default(),
            );
            return Some(shape(
                Bounds::new_from_top_left(top_left, Size::new(width, height)),
                MagnetOutline::Rect,
            ));
        }

        trace!(cell = element.id().to_string(), selector; "Magnet has no own geometry, using outline");
        Some(self.outline_shape(element, view, template))
    }

    fn marker(&self, link: &Cell, template: &ShapeTemplate, end: LinkEnd) -> Option<MarkerGeometry> {
        let selector = match end {
            LinkEnd::Source => ".marker-source",
            LinkEnd::Target => ".marker-target",
        };
        let attrs = merged_attrs(link, template, selector)?;
        let path = PathData::from_str(attrs.get("d")?.as_str()?).ok()?;
        let width = path.bounds()?.width();
        let scale_x = attrs
            .get("transform")
            .and_then(Value::as_str)
            .map_or(1.0, |t| transform::parse_transform_or_identity(t).decompose().scale_x);
        Some(MarkerGeometry { width, scale_x })
    }
}

/// The attributes of `selector`, the cell's own layered over the
/// template's. `None` when neither defines the selector.
fn merged_attrs(cell: &Cell, template: &ShapeTemplate, selector: &str) -> Option<Map<String, Value>> {
    let defaults = template.attrs().get(selector).cloned();
    let own = cell.attrs().get(selector).cloned();
    let merged = match (defaults, own) {
        (None, None) => return None,
        (Some(mut defaults), Some(own)) => {
            patch::deep_merge(&mut defaults, own);
            defaults
        }
        (Some(value), None) | (None, Some(value)) => value,
    };
    match merged {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// A numeric attribute; numeric strings are accepted.
fn number(attrs: &Map<String, Value>, key: &str) -> Option<f32> {
    match attrs.get(key)? {
        Value::Number(n) => n.as_f64().map(|n| n as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `ref-x`/`ref-y` values in `[0, 1]` are fractions of the extent.
fn relative(value: Option<f32>, extent: f32) -> f32 {
    match value {
        Some(v) if (0.0..=1.0).contains(&v) => v * extent,
        Some(v) => v,
        None => 0.0,
    }
}

/// The `d` attribute of the template body, if the element draws one.
fn body_path(element: &Cell, template: &ShapeTemplate) -> Option<PathData> {
    let attrs = merged_attrs(element, template, template.body())?;
    PathData::from_str(attrs.get("d")?.as_str()?).ok()
}

/// Scales `path` so that its bounds fill `bbox`.
fn fit_to(path: &PathData, bbox: Bounds) -> PathData {
    let Some(own) = path.bounds() else {
        return path.clone();
    };
    let sx = if own.width() > 0.0 { bbox.width() / own.width() } else { 1.0 };
    let sy = if own.height() > 0.0 { bbox.height() / own.height() } else { 1.0 };
    path.transform(
        &Matrix::translate(bbox.min_x(), bbox.min_y())
            .multiply(&Matrix::scale(sx, sy))
            .multiply(&Matrix::translate(-own.min_x(), -own.min_y())),
    )
}
