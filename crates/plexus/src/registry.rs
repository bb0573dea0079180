//! Shape templates and named connection strategies.
//!
//! Both registries are built once (usually through `Default`) and handed to
//! the scene; nothing here is global.

use std::fmt;

use indexmap::IndexMap;
use log::warn;
use serde_json::{Map, Value, json};

use plexus_core::geometry::{PathData, Point, Segment};

use crate::{
    error::{PlexusError, StrategyKind},
    model::{Cell, CellKind},
    view::{
        connector::{Connector, NormalConnector, RoundedConnector, SmoothConnector},
        router::{NormalRouter, OrthogonalRouter, Router},
    },
};

/// Which view a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Element,
    Link,
}

/// The drawn boundary of a whole element.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Rect,
    Ellipse,
    Diamond,
    /// A path in unit coordinates, scaled to the element's box.
    Path(PathData),
}

impl Outline {
    /// The outline as a path over the unit square, for outlines that are
    /// not rectangles or ellipses.
    pub fn unit_path(&self) -> Option<PathData> {
        match self {
            Self::Rect | Self::Ellipse => None,
            Self::Diamond => Some(PathData::from_polyline(&[
                Point::new(0.5, 0.0),
                Point::new(1.0, 0.5),
                Point::new(0.5, 1.0),
                Point::new(0.0, 0.5),
                Point::new(0.5, 0.0),
            ])),
            Self::Path(path) => Some(path.clone()),
        }
    }
}

/// What an element's `position` refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    TopLeft,
    /// The center of the box; used by circular shapes.
    Center,
}

/// Defaults and drawing instructions for one cell type.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTemplate {
    kind: ViewKind,
    attrs: Map<String, Value>,
    markup: String,
    body: String,
    outline: Outline,
    anchor: Anchor,
}

impl ShapeTemplate {
    pub fn element(body: impl Into<String>, outline: Outline) -> Self {
        let body = body.into();
        let markup = format!(r#"<g class="rotatable"><g class="scalable"><{body}/></g><text/></g>"#);
        Self {
            kind: ViewKind::Element,
            attrs: Map::new(),
            markup,
            body,
            outline,
            anchor: Anchor::TopLeft,
        }
    }

    pub fn link() -> Self {
        Self {
            kind: ViewKind::Link,
            attrs: Map::new(),
            markup: concat!(
                r#"<path class="connection"/>"#,
                r#"<path class="marker-source"/>"#,
                r#"<path class="marker-target"/>"#,
                r#"<path class="connection-wrap"/>"#,
                r#"<g class="labels"/>"#,
                r#"<g class="marker-vertices"/>"#,
                r#"<g class="marker-arrowheads"/>"#,
            )
            .to_string(),
            body: ".connection".to_string(),
            outline: Outline::Rect,
            anchor: Anchor::TopLeft,
        }
    }

    /// Default attributes, merged beneath a cell's own attributes.
    pub fn with_attrs(mut self, attrs: Value) -> Self {
        if let Value::Object(map) = attrs {
            self.attrs = map;
        }
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Attribute selector of the main drawn part.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }
}

/// True when an element of `markup` carries `class` in its class list.
pub fn markup_has_class(markup: &str, class: &str) -> bool {
    markup.split("class=\"").skip(1).any(|rest| {
        rest.split('"')
            .next()
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    })
}

/// Templates keyed by cell type.
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    templates: IndexMap<String, ShapeTemplate>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        let stroke = json!({ "fill": "#ffffff", "stroke": "#000000" });
        let label = json!({ "font-size": 14, "text-anchor": "middle", "fill": "#000000" });

        registry.register(
            "basic.Rect",
            ShapeTemplate::element("rect", Outline::Rect)
                .with_attrs(json!({ "rect": stroke.clone(), "text": label.clone() })),
        );
        registry.register(
            "basic.Circle",
            ShapeTemplate::element("circle", Outline::Ellipse)
                .with_anchor(Anchor::Center)
                .with_attrs(json!({ "circle": stroke.clone(), "text": label.clone() })),
        );
        registry.register(
            "basic.Ellipse",
            ShapeTemplate::element("ellipse", Outline::Ellipse)
                .with_attrs(json!({ "ellipse": stroke.clone(), "text": label.clone() })),
        );
        registry.register(
            "basic.Path",
            ShapeTemplate::element(
                "path",
                Outline::Path(PathData::new(vec![
                    Segment::MoveTo(Point::new(0.0, 0.0)),
                    Segment::LineTo(Point::new(1.0, 0.0)),
                    Segment::LineTo(Point::new(1.0, 1.0)),
                    Segment::LineTo(Point::new(0.0, 1.0)),
                    Segment::Close,
                ])),
            )
            .with_attrs(json!({ "path": stroke.clone(), "text": label.clone() })),
        );
        registry.register(
            "basic.Diamond",
            ShapeTemplate::element("polygon", Outline::Diamond)
                .with_attrs(json!({ "polygon": stroke.clone(), "text": label.clone() })),
        );

        let devs = |fill: &str| {
            ShapeTemplate::element(".body", Outline::Rect)
                .with_markup(concat!(
                    r#"<g class="rotatable"><g class="scalable"><rect class="body"/></g>"#,
                    r#"<text class="label"/><g class="inPorts"/><g class="outPorts"/></g>"#,
                ))
                .with_attrs(json!({
                    ".body": { "fill": fill, "stroke": "#000000" },
                    ".label": { "text": "Model", "ref-x": 0.5, "ref-y": 10 },
                }))
        };
        registry.register("devs.Model", devs("#ffffff"));
        registry.register("devs.Atomic", devs("salmon"));
        registry.register("devs.Coupled", devs("seagreen"));

        registry.register(
            "link",
            ShapeTemplate::link().with_attrs(json!({
                ".connection": { "stroke": "#000000", "stroke-width": 1, "fill": "none" },
            })),
        );
        registry.register(
            "devs.Link",
            ShapeTemplate::link().with_attrs(json!({
                ".connection": { "stroke": "#000000", "stroke-width": 2, "fill": "none" },
                ".marker-target": { "d": "M 10 0 L 0 5 L 10 10 z", "fill": "#000000" },
            })),
        );
        registry
    }
}

impl ShapeRegistry {
    /// A registry without templates.
    pub fn empty() -> Self {
        Self {
            templates: IndexMap::new(),
        }
    }

    /// Registers (or replaces) the template for `cell_type`.
    pub fn register(&mut self, cell_type: impl Into<String>, template: ShapeTemplate) {
        self.templates.insert(cell_type.into(), template);
    }

    /// Looks up a template, walking from the full dotted type to shorter
    /// prefixes (`devs.Atomic.Custom`, `devs.Atomic`, `devs`).
    pub fn lookup(&self, cell_type: &str) -> Option<&ShapeTemplate> {
        let mut current = cell_type;
        loop {
            if let Some(template) = self.templates.get(current) {
                return Some(template);
            }
            let (prefix, _) = current.rsplit_once('.')?;
            current = prefix;
        }
    }

    pub fn view_kind(&self, cell_type: &str) -> Option<ViewKind> {
        self.lookup(cell_type).map(ShapeTemplate::kind)
    }

    /// The template to render `cell` with.
    ///
    /// Falls back to a plain rectangle or plain link when the type is not
    /// registered for the cell's kind.
    pub fn template_for(&self, cell: &Cell) -> ShapeTemplate {
        let wanted = match cell.kind() {
            CellKind::Element(_) => ViewKind::Element,
            CellKind::Link(_) => ViewKind::Link,
        };
        if let Some(template) = self
            .lookup(cell.cell_type())
            .filter(|template| template.kind() == wanted)
        {
            return template.clone();
        }
        warn!(cell_type = cell.cell_type(); "No template registered, using fallback");
        match wanted {
            ViewKind::Element => ShapeTemplate::element("rect", Outline::Rect),
            ViewKind::Link => ShapeTemplate::link(),
        }
    }
}

/// Connectors and routers by name.
pub struct StrategyRegistry {
    connectors: IndexMap<String, Box<dyn Connector>>,
    routers: IndexMap<String, Box<dyn Router>>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("connectors", &self.connectors.keys().collect::<Vec<_>>())
            .field("routers", &self.routers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_connector("normal", NormalConnector);
        registry.register_connector("smooth", SmoothConnector);
        registry.register_connector("rounded", RoundedConnector);
        registry.register_router("normal", NormalRouter);
        registry.register_router("orthogonal", OrthogonalRouter);
        registry
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            connectors: IndexMap::new(),
            routers: IndexMap::new(),
        }
    }

    pub fn register_connector(&mut self, name: impl Into<String>, connector: impl Connector + 'static) {
        self.connectors.insert(name.into(), Box::new(connector));
    }

    pub fn register_router(&mut self, name: impl Into<String>, router: impl Router + 'static) {
        self.routers.insert(name.into(), Box::new(router));
    }

    pub fn connector(&self, name: &str) -> Result<&dyn Connector, PlexusError> {
        self.connectors
            .get(name)
            .map(|connector| connector.as_ref())
            .ok_or_else(|| PlexusError::UnknownStrategy {
                kind: StrategyKind::Connector,
                name: name.to_string(),
            })
    }

    pub fn router(&self, name: &str) -> Result<&dyn Router, PlexusError> {
        self.routers
            .get(name)
            .map(|router| router.as_ref())
            .ok_or_else(|| PlexusError::UnknownStrategy {
                kind: StrategyKind::Router,
                name: name.to_string(),
            })
    }
}
