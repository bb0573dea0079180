//! Hit-testing the paper.
//!
//! Views are visited from the top of the stack down: higher `z` first,
//! links above elements at equal `z`, later cells above earlier ones.

use std::collections::HashMap;

use serde_json::Value;

use plexus_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::{
    model::{Cell, LinkEnd, Port, PortsCapable},
    view::{ElementView, LinkView, MagnetShape, Paper, RenderContext},
};

/// Side of the square resize handle.
pub const HANDLE_SIZE: f32 = 10.0;

/// Radius around a label point that grabs the label.
pub const LABEL_RADIUS: f32 = 10.0;

/// What lies under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    ResizeHandle(Id),
    Magnet {
        element: Id,
        selector: String,
        port: Option<Id>,
        /// Whether links may be drawn out of it.
        magnet: bool,
    },
    Element(Id),
    Arrowhead { link: Id, end: LinkEnd },
    Label { link: Id, index: usize },
    Link(Id),
}

impl Hit {
    /// The cell the hit belongs to.
    pub fn cell(&self) -> Id {
        match self {
            Self::ResizeHandle(id) | Self::Element(id) | Self::Link(id) => *id,
            Self::Magnet { element, .. } => *element,
            Self::Arrowhead { link, .. } | Self::Label { link, .. } => *link,
        }
    }
}

/// A named magnet of an element with its resolved shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnetCandidate {
    pub selector: String,
    pub port: Option<Id>,
    pub magnet: bool,
    pub shape: MagnetShape,
}

enum Layer<'a> {
    Element(&'a ElementView),
    Link(&'a LinkView),
}

/// The topmost thing at `p` (paper-local coordinates).
pub fn hit_test(ctx: &RenderContext<'_>, paper: &Paper, p: Point) -> Option<Hit> {
    let tolerance = paper.config().hit_tolerance();
    stack(ctx, paper).into_iter().find_map(|layer| match layer {
        Layer::Element(view) => hit_element(ctx, view, p),
        Layer::Link(view) => hit_link(ctx, view, p, tolerance),
    })
}

/// The topmost element whose body contains `p`, skipping `exclude`.
pub fn element_at(ctx: &RenderContext<'_>, paper: &Paper, p: Point, exclude: Option<Id>) -> Option<Id> {
    stack(ctx, paper).into_iter().find_map(|layer| match layer {
        Layer::Element(view) if Some(view.id()) != exclude && view.contains_point(p) => Some(view.id()),
        _ => None,
    })
}

/// Every attribute sub-part of `element` that can take a link end.
///
/// Sub-parts qualify when they hold `magnet: true` or a port.
pub fn magnets(ctx: &RenderContext<'_>, paper: &Paper, element: Id) -> Vec<MagnetCandidate> {
    let (Some(cell), Some(view)) = (ctx.graph.get_cell(element), paper.element_view(element)) else {
        return Vec::new();
    };
    let template = ctx.shapes.template_for(cell);
    cell.attrs()
        .iter()
        .filter_map(|(selector, sub)| {
            let sub = sub.as_object()?;
            let magnet = sub.get("magnet") == Some(&Value::Bool(true));
            let port = port_for(cell, selector);
            if !magnet && port.is_none() {
                return None;
            }
            let shape = ctx.surface.magnet_shape(cell, view, &template, Some(selector))?;
            Some(MagnetCandidate {
                selector: selector.clone(),
                port,
                magnet,
                shape,
            })
        })
        .collect()
}

fn port_for(cell: &Cell, selector: &str) -> Option<Id> {
    cell.ports()
        .into_iter()
        .find(|port| port.selector() == selector)
        .map(Port::id)
}

fn stack<'a>(ctx: &RenderContext<'_>, paper: &'a Paper) -> Vec<Layer<'a>> {
    let order: HashMap<Id, usize> = ctx
        .graph
        .cells()
        .enumerate()
        .map(|(index, cell)| (cell.id(), index))
        .collect();
    let rank = |id: Id| order.get(&id).copied().unwrap_or(0);

    let mut layers: Vec<(i64, bool, usize, Layer<'a>)> = paper
        .element_views()
        .map(|view| (view.z(), false, rank(view.id()), Layer::Element(view)))
        .chain(
            paper
                .link_views()
                .map(|view| (view.z(), true, rank(view.id()), Layer::Link(view))),
        )
        .collect();
    layers.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| b.2.cmp(&a.2))
    });
    layers.into_iter().map(|(.., layer)| layer).collect()
}

fn hit_element(ctx: &RenderContext<'_>, view: &ElementView, p: Point) -> Option<Hit> {
    let id = view.id();
    if ctx.graph.is_selected(id) {
        let corner = view
            .bbox()
            .max_point()
            .rotate(view.center(), view.angle());
        if Bounds::new_from_center(corner, Size::new(HANDLE_SIZE, HANDLE_SIZE)).contains_point(p) {
            return Some(Hit::ResizeHandle(id));
        }
    }

    let cell = ctx.graph.get_cell(id)?;
    let template = ctx.shapes.template_for(cell);
    for (selector, sub) in cell.attrs() {
        let Some(sub) = sub.as_object() else {
            continue;
        };
        let magnet = sub.get("magnet") == Some(&Value::Bool(true));
        let port = port_for(cell, selector);
        if !magnet && port.is_none() {
            continue;
        }
        let hit = ctx
            .surface
            .magnet_shape(cell, view, &template, Some(selector))
            .is_some_and(|shape| shape.contains_point(p));
        if hit {
            return Some(Hit::Magnet {
                element: id,
                selector: selector.clone(),
                port,
                magnet,
            });
        }
    }

    view.contains_point(p).then_some(Hit::Element(id))
}

fn hit_link(ctx: &RenderContext<'_>, view: &LinkView, p: Point, tolerance: f32) -> Option<Hit> {
    let id = view.id();
    for end in [LinkEnd::Source, LinkEnd::Target] {
        if view.end_point(end).distance(p) <= tolerance {
            return Some(Hit::Arrowhead { link: id, end });
        }
    }

    let labels = ctx
        .graph
        .get_cell(id)
        .and_then(Cell::as_link)
        .map_or(0, |link| link.labels().len());
    if let Some(index) = view
        .label_points()
        .iter()
        .take(labels)
        .position(|point| point.distance(p) <= LABEL_RADIUS)
    {
        return Some(Hit::Label { link: id, index });
    }

    view.distance_to_point(p)
        .is_some_and(|distance| distance <= tolerance)
        .then_some(Hit::Link(id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Scene, config::PaperConfig, model::Endpoint};

    fn rect(name: &str, x: f32, y: f32) -> Cell {
        Cell::element("basic.Rect")
            .with_id(Id::new(name))
            .with_position(x, y)
            .with_size(100.0, 60.0)
    }

    fn hit(scene: &Scene, x: f32, y: f32) -> Option<Hit> {
        hit_test(&scene.render_context(), scene.paper(), Point::new(x, y))
    }

    #[test]
    fn test_element_body_and_blank() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();

        assert_eq!(hit(&scene, 50.0, 30.0), Some(Hit::Element(Id::new("a"))));
        assert_eq!(hit(&scene, 500.0, 500.0), None);
    }

    #[test]
    fn test_higher_z_wins() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0).with_z(2)).unwrap();
        scene.add_cell(rect("b", 50.0, 0.0).with_z(1)).unwrap();

        assert_eq!(hit(&scene, 75.0, 30.0), Some(Hit::Element(Id::new("a"))));
    }

    #[test]
    fn test_later_cell_wins_at_equal_z() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        scene.add_cell(rect("b", 50.0, 0.0)).unwrap();

        assert_eq!(hit(&scene, 75.0, 30.0), Some(Hit::Element(Id::new("b"))));
    }

    #[test]
    fn test_resize_handle_only_when_selected() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();

        assert_eq!(hit(&scene, 99.0, 59.0), Some(Hit::Element(Id::new("a"))));
        scene.focus(Id::new("a")).unwrap();
        assert_eq!(hit(&scene, 99.0, 59.0), Some(Hit::ResizeHandle(Id::new("a"))));
    }

    #[test]
    fn test_magnet_before_body() {
        let mut scene = Scene::default();
        let cell = rect("a", 0.0, 0.0).with_attrs(json!({
            ".out": { "magnet": true, "ref-x": 1.0, "ref-y": 0.5, "r": 5 },
        }));
        scene.add_cell(cell).unwrap();

        assert_eq!(
            hit(&scene, 99.0, 30.0),
            Some(Hit::Magnet {
                element: Id::new("a"),
                selector: ".out".to_string(),
                port: None,
                magnet: true,
            })
        );
        assert_eq!(hit(&scene, 50.0, 30.0), Some(Hit::Element(Id::new("a"))));
    }

    #[test]
    fn test_link_parts() {
        let mut scene = Scene::default();
        let link = Cell::link(
            Endpoint::point(Point::new(0.0, 0.0)),
            Endpoint::point(Point::new(100.0, 0.0)),
        )
        .with_id(Id::new("l"))
        .with_label(crate::model::Label::text(0.5, "mid"));
        scene.add_cell(link).unwrap();

        assert_eq!(
            hit(&scene, 1.0, 1.0),
            Some(Hit::Arrowhead {
                link: Id::new("l"),
                end: LinkEnd::Source,
            })
        );
        assert_eq!(
            hit(&scene, 50.0, 3.0),
            Some(Hit::Label {
                link: Id::new("l"),
                index: 0,
            })
        );
        assert_eq!(hit(&scene, 25.0, 2.0), Some(Hit::Link(Id::new("l"))));
        assert_eq!(hit(&scene, 25.0, 40.0), None);
    }

    #[test]
    fn test_link_above_element_at_equal_z() {
        let mut scene = Scene::new(PaperConfig::default());
        let link = Cell::link(
            Endpoint::point(Point::new(0.0, 30.0)),
            Endpoint::point(Point::new(100.0, 30.0)),
        )
        .with_id(Id::new("l"));
        scene.add_cell(link).unwrap();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();

        assert_eq!(hit(&scene, 50.0, 30.0), Some(Hit::Link(Id::new("l"))));
        assert_eq!(hit(&scene, 50.0, 50.0), Some(Hit::Element(Id::new("a"))));
    }

    #[test]
    fn test_element_at_skips_excluded() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        scene.add_cell(rect("b", 0.0, 0.0)).unwrap();
        let ctx = scene.render_context();

        assert_eq!(
            element_at(&ctx, scene.paper(), Point::new(10.0, 10.0), None),
            Some(Id::new("b"))
        );
        assert_eq!(
            element_at(&ctx, scene.paper(), Point::new(10.0, 10.0), Some(Id::new("b"))),
            Some(Id::new("a"))
        );
    }
}
