//! Edges: endpoints, vertices, labels and strategy references.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use plexus_core::{geometry::Point, identifier::Id};

/// One end of a link: a free point or a reference to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Cell {
        id: Id,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<Id>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Point {
        x: f32,
        y: f32,
    },
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Point { x: 0.0, y: 0.0 }
    }
}

impl Endpoint {
    pub fn point(p: Point) -> Self {
        Self::Point { x: p.x(), y: p.y() }
    }

    pub fn cell(id: Id) -> Self {
        Self::Cell {
            id,
            port: None,
            selector: None,
        }
    }

    pub fn port(id: Id, port: Id) -> Self {
        Self::Cell {
            id,
            port: Some(port),
            selector: None,
        }
    }

    pub fn selector(id: Id, selector: impl Into<String>) -> Self {
        Self::Cell {
            id,
            port: None,
            selector: Some(selector.into()),
        }
    }

    /// The referenced element, if any.
    pub fn cell_id(&self) -> Option<Id> {
        match self {
            Self::Cell { id, .. } => Some(*id),
            Self::Point { .. } => None,
        }
    }

    /// The free point, if the endpoint is not attached.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point { x, y } => Some(Point::new(*x, *y)),
            Self::Cell { .. } => None,
        }
    }
}

/// Which end of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkEnd {
    Source,
    Target,
}

impl LinkEnd {
    pub fn opposite(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }

    /// The property key of this end.
    pub fn key(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// How far a label is moved away from its anchor on the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelOffset {
    /// Distance along the path normal.
    Perpendicular(f32),
    /// Plain displacement.
    Point { x: f32, y: f32 },
}

/// Where a label sits on its link.
///
/// A `distance` in `(0, 1]` is a fraction of the path length, a larger one
/// an absolute arc length, and a negative one is measured from the end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LabelPositionRepr")]
pub struct LabelPosition {
    pub distance: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<LabelOffset>,
}

impl Default for LabelPosition {
    fn default() -> Self {
        Self {
            distance: 0.5,
            offset: None,
        }
    }
}

impl LabelPosition {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: LabelOffset) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelPositionRepr {
    Distance(f32),
    Full {
        distance: f32,
        #[serde(default)]
        offset: Option<LabelOffset>,
    },
}

impl From<LabelPositionRepr> for LabelPosition {
    fn from(repr: LabelPositionRepr) -> Self {
        match repr {
            LabelPositionRepr::Distance(distance) => Self::new(distance),
            LabelPositionRepr::Full { distance, offset } => Self { distance, offset },
        }
    }
}

/// A text label attached to a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub position: LabelPosition,
    #[serde(default)]
    pub attrs: Map<String, Value>,
}

impl Label {
    pub fn new(position: LabelPosition) -> Self {
        Self {
            position,
            attrs: Map::new(),
        }
    }

    /// A label showing `text` at `distance`.
    pub fn text(distance: f32, text: &str) -> Self {
        let mut attrs = Map::new();
        attrs.insert("text".to_string(), serde_json::json!({ "text": text }));
        Self {
            position: LabelPosition::new(distance),
            attrs,
        }
    }

    /// The label text, read from `attrs.text.text`.
    pub fn text_content(&self) -> Option<&str> {
        self.attrs.get("text")?.get("text")?.as_str()
    }
}

/// A named connector or router with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrategyRefRepr")]
pub struct StrategyRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl StrategyRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Value::Null,
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrategyRefRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        args: Value,
    },
}

impl From<StrategyRefRepr> for StrategyRef {
    fn from(repr: StrategyRefRepr) -> Self {
        match repr {
            StrategyRefRepr::Name(name) => Self::new(name),
            StrategyRefRepr::Full { name, args } => Self { name, args },
        }
    }
}

/// Link-specific state of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkData {
    pub(crate) source: Endpoint,
    pub(crate) target: Endpoint,
    pub(crate) vertices: Vec<Point>,
    pub(crate) labels: Vec<Label>,
    pub(crate) connector: Option<StrategyRef>,
    pub(crate) router: Option<StrategyRef>,
    pub(crate) smooth: bool,
}

impl LinkData {
    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    pub fn end(&self, end: LinkEnd) -> &Endpoint {
        match end {
            LinkEnd::Source => &self.source,
            LinkEnd::Target => &self.target,
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn connector(&self) -> Option<&StrategyRef> {
        self.connector.as_ref()
    }

    pub fn router(&self) -> Option<&StrategyRef> {
        self.router.as_ref()
    }

    /// Shorthand for the `smooth` connector.
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// True when both ends reference the same element.
    pub fn is_loop(&self) -> bool {
        matches!(
            (self.source.cell_id(), self.target.cell_id()),
            (Some(a), Some(b)) if a == b
        )
    }
}
