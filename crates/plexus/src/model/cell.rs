//! The cell record and its path-addressed property access.

use log::trace;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use plexus_core::{
    geometry::{Point, Size, normalize_angle},
    identifier::Id,
};

use super::{
    MutationOptions,
    element::ElementData,
    link::{Endpoint, Label, LabelPosition, LinkData, LinkEnd, StrategyRef},
    patch::{self, Patch, Segment},
    ports::{PortIndex, PortsCapable},
};
use crate::error::PlexusError;

/// Top-level keys that only the graph may change.
const READ_ONLY_KEYS: [&str; 4] = ["id", "parent", "embeds", "selected"];

/// What a cell is.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Element(ElementData),
    Link(LinkData),
}

/// A committed property change.
///
/// `top` is the first path segment, `path` the full path that was written
/// and `value` the value written there. `previous` holds the whole
/// top-level value before the write.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub top: String,
    pub path: String,
    pub value: Value,
    pub previous: Value,
}

/// A node or an edge of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    id: Id,
    cell_type: String,
    attrs: Map<String, Value>,
    pub(crate) parent: Option<Id>,
    pub(crate) embeds: Vec<Id>,
    z: i64,
    props: Map<String, Value>,
    pub(crate) kind: CellKind,
}

impl Cell {
    /// A new element of the given type, at the origin with a 1×1 size.
    pub fn element(cell_type: impl Into<String>) -> Self {
        Self::from_kind(cell_type.into(), CellKind::Element(ElementData::default()))
    }

    /// A new link of type `link`.
    pub fn link(source: Endpoint, target: Endpoint) -> Self {
        Self::from_kind(
            "link".to_string(),
            CellKind::Link(LinkData {
                source,
                target,
                ..LinkData::default()
            }),
        )
    }

    fn from_kind(cell_type: String, kind: CellKind) -> Self {
        Self {
            id: Id::generate(),
            cell_type,
            attrs: Map::new(),
            parent: None,
            embeds: Vec::new(),
            z: 0,
            props: Map::new(),
            kind,
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_type(mut self, cell_type: impl Into<String>) -> Self {
        self.cell_type = cell_type.into();
        self
    }

    /// Merges the entries of `attrs` over the current attributes.
    ///
    /// Values that are not JSON objects are ignored.
    pub fn with_attrs(mut self, attrs: Value) -> Self {
        if let Value::Object(map) = attrs {
            let mut merged = Value::Object(std::mem::take(&mut self.attrs));
            patch::deep_merge(&mut merged, Value::Object(map));
            if let Value::Object(map) = merged {
                self.attrs = map;
            }
            self.refresh_ports();
        }
        self
    }

    pub fn with_z(mut self, z: i64) -> Self {
        self.z = z;
        self
    }

    /// Sets a custom property.
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        if let CellKind::Element(element) = &mut self.kind {
            element.position = Point::new(x, y);
        }
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        if let CellKind::Element(element) = &mut self.kind {
            element.size = Size::new(width, height).non_negative();
        }
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        if let CellKind::Element(element) = &mut self.kind {
            element.angle = normalize_angle(angle);
        }
        self
    }

    pub fn with_vertices(mut self, vertices: Vec<Point>) -> Self {
        if let CellKind::Link(link) = &mut self.kind {
            link.vertices = vertices;
        }
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        if let CellKind::Link(link) = &mut self.kind {
            link.labels.push(label);
        }
        self
    }

    pub fn with_connector(mut self, connector: StrategyRef) -> Self {
        if let CellKind::Link(link) = &mut self.kind {
            link.connector = Some(connector);
        }
        self
    }

    pub fn with_router(mut self, router: StrategyRef) -> Self {
        if let CellKind::Link(link) = &mut self.kind {
            link.router = Some(router);
        }
        self
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        if let CellKind::Link(link) = &mut self.kind {
            link.smooth = smooth;
        }
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub fn cell_type(&self) -> &str {
        &self.cell_type
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Ids of directly embedded cells, in embedding order.
    pub fn embeds(&self) -> &[Id] {
        &self.embeds
    }

    pub fn z(&self) -> i64 {
        self.z
    }

    /// Custom properties that are not part of the typed cell record.
    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, CellKind::Element(_))
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, CellKind::Link(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            CellKind::Element(element) => Some(element),
            CellKind::Link(_) => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkData> {
        match &self.kind {
            CellKind::Link(link) => Some(link),
            CellKind::Element(_) => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            CellKind::Element(element) => Some(element),
            CellKind::Link(_) => None,
        }
    }

    pub(crate) fn as_link_mut(&mut self) -> Option<&mut LinkData> {
        match &mut self.kind {
            CellKind::Link(link) => Some(link),
            CellKind::Element(_) => None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.as_element().map(ElementData::position)
    }

    pub fn size(&self) -> Option<Size> {
        self.as_element().map(ElementData::size)
    }

    pub fn angle(&self) -> Option<f32> {
        self.as_element().map(ElementData::angle)
    }

    /// True when `parent` is the direct parent of this cell.
    pub fn is_child_of(&self, parent: Id) -> bool {
        self.parent == Some(parent)
    }

    /// A copy with a fresh id, no parent, no embedded cells and no
    /// selection.
    pub fn clone_shallow(&self) -> Self {
        let mut clone = self.clone();
        clone.id = Id::generate();
        clone.parent = None;
        clone.embeds.clear();
        if let Some(element) = clone.as_element_mut() {
            element.selected = false;
        }
        clone
    }

    /// Reads the value at a `/`-delimited path.
    pub fn prop(&self, path: &str) -> Option<Value> {
        let segments = patch::segments(path);
        let (Segment::Key(top), rest) = segments.split_first()? else {
            return None;
        };
        let value = self.top_value(top)?;
        patch::get(&value, rest).cloned()
    }

    /// Writes `value` at a `/`-delimited path.
    ///
    /// The new value is merged into a copy of the current top-level value,
    /// which is then assigned in one step. Returns `None` when the write
    /// left the cell unchanged.
    pub fn set_prop(
        &mut self,
        path: &str,
        value: Value,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        let segments = patch::segments(path);
        let Some((Segment::Key(top), rest)) = segments.split_first() else {
            return Err(PlexusError::invalid_property(
                path,
                "path must start with a property name",
            ));
        };
        let top = *top;
        if READ_ONLY_KEYS.contains(&top) {
            return Err(PlexusError::invalid_property(path, "property is read-only"));
        }

        let previous = self.top_value(top).unwrap_or(Value::Null);
        let next = if rest.is_empty() {
            value.clone()
        } else {
            let mut next = previous.clone();
            if opts.rewrite {
                patch::unset(&mut next, rest);
            }
            Patch::along(rest, value.clone()).merge_into(&mut next);
            next
        };
        if next == previous {
            return Ok(None);
        }

        self.assign(top, next)?;
        if self.top_value(top).unwrap_or(Value::Null) == previous {
            return Ok(None);
        }
        trace!(cell = self.id.to_string(), path; "Property changed");
        Ok(Some(Change {
            top: top.to_string(),
            path: path.to_string(),
            value,
            previous,
        }))
    }

    /// Removes the value at a `/`-delimited path.
    ///
    /// A single-segment path clears a custom property or resets a typed one
    /// to its empty value.
    pub fn unset_prop(
        &mut self,
        path: &str,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        let segments = patch::segments(path);
        let Some((Segment::Key(top), rest)) = segments.split_first() else {
            return Err(PlexusError::invalid_property(
                path,
                "path must start with a property name",
            ));
        };
        if rest.is_empty() {
            return self.set_prop(path, Value::Null, opts);
        }
        let top = *top;
        if READ_ONLY_KEYS.contains(&top) {
            return Err(PlexusError::invalid_property(path, "property is read-only"));
        }

        let previous = self.top_value(top).unwrap_or(Value::Null);
        let mut next = previous.clone();
        if !patch::unset(&mut next, rest) {
            return Ok(None);
        }
        self.assign(top, next)?;
        Ok(Some(Change {
            top: top.to_string(),
            path: path.to_string(),
            value: Value::Null,
            previous,
        }))
    }

    /// Reads an attribute, `path` being relative to `attrs`.
    pub fn attr(&self, path: &str) -> Option<Value> {
        self.prop(&attrs_path(path))
    }

    pub fn set_attr(
        &mut self,
        path: &str,
        value: Value,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.set_prop(&attrs_path(path), value, opts)
    }

    pub fn remove_attr(
        &mut self,
        path: &str,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.unset_prop(&attrs_path(path), opts)
    }

    /// Moves an element by `(dx, dy)`. Links move their vertices and free
    /// endpoints.
    pub fn translate(
        &mut self,
        dx: f32,
        dy: f32,
        opts: MutationOptions,
    ) -> Result<Vec<Change>, PlexusError> {
        if dx == 0.0 && dy == 0.0 {
            return Ok(Vec::new());
        }
        let mut changes = Vec::new();
        match &self.kind {
            CellKind::Element(element) => {
                let position = element.position.offset(dx, dy);
                changes.extend(self.set_prop("position", to_json(&position)?, opts)?);
            }
            CellKind::Link(link) => {
                let vertices: Vec<Point> = link.vertices.iter().map(|v| v.offset(dx, dy)).collect();
                let ends: Vec<(LinkEnd, Point)> = [LinkEnd::Source, LinkEnd::Target]
                    .into_iter()
                    .filter_map(|end| Some((end, link.end(end).as_point()?.offset(dx, dy))))
                    .collect();
                if !vertices.is_empty() {
                    changes.extend(self.set_prop("vertices", to_json(&vertices)?, opts)?);
                }
                for (end, point) in ends {
                    changes.extend(self.set_end(end, Endpoint::point(point), opts)?);
                }
            }
        }
        Ok(changes)
    }

    pub fn resize(
        &mut self,
        width: f32,
        height: f32,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.require_element("size")?;
        self.set_prop("size", to_json(&Size::new(width, height))?, opts)
    }

    /// Rotates an element by `degrees`, or to `degrees` when `absolute`.
    pub fn rotate(
        &mut self,
        degrees: f32,
        absolute: bool,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        let current = self.require_element("angle")?.angle;
        let angle = if absolute { degrees } else { current + degrees };
        self.set_prop("angle", to_json(&normalize_angle(angle))?, opts)
    }

    pub fn set_source(
        &mut self,
        endpoint: Endpoint,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.set_end(LinkEnd::Source, endpoint, opts)
    }

    pub fn set_target(
        &mut self,
        endpoint: Endpoint,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.set_end(LinkEnd::Target, endpoint, opts)
    }

    pub fn set_end(
        &mut self,
        end: LinkEnd,
        endpoint: Endpoint,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.require_link(end.key())?;
        self.set_prop(end.key(), to_json(&endpoint)?, opts)
    }

    pub fn set_vertices(
        &mut self,
        vertices: Vec<Point>,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.require_link("vertices")?;
        self.set_prop("vertices", to_json(&vertices)?, opts)
    }

    pub fn add_label(
        &mut self,
        label: Label,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        let index = self.require_link("labels")?.labels.len();
        self.set_prop(&format!("labels/{index}"), to_json(&label)?, opts)
    }

    /// Replaces the position of an existing label.
    pub fn set_label_position(
        &mut self,
        index: usize,
        position: LabelPosition,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        let path = format!("labels/{index}/position");
        if index >= self.require_link("labels")?.labels.len() {
            return Err(PlexusError::invalid_property(path, "no such label"));
        }
        let opts = MutationOptions {
            rewrite: true,
            ..opts
        };
        self.set_prop(&path, to_json(&position)?, opts)
    }

    /// Detaches one end from its element, leaving it at `at`.
    pub fn disconnect(
        &mut self,
        end: LinkEnd,
        at: Point,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        if self.require_link(end.key())?.end(end).cell_id().is_none() {
            return Ok(None);
        }
        self.set_end(end, Endpoint::point(at), opts)
    }

    fn require_element(&self, path: &str) -> Result<&ElementData, PlexusError> {
        self.as_element()
            .ok_or_else(|| PlexusError::invalid_property(path, "cell is not an element"))
    }

    fn require_link(&self, path: &str) -> Result<&LinkData, PlexusError> {
        self.as_link()
            .ok_or_else(|| PlexusError::invalid_property(path, "cell is not a link"))
    }

    /// The whole top-level value stored under `key`.
    fn top_value(&self, key: &str) -> Option<Value> {
        match key {
            "id" => return Some(Value::String(self.id.to_string())),
            "type" => return Some(Value::String(self.cell_type.clone())),
            "attrs" => return Some(Value::Object(self.attrs.clone())),
            "parent" => return self.parent.map(|id| Value::String(id.to_string())),
            "embeds" => return serde_json::to_value(&self.embeds).ok(),
            "z" => return Some(Value::from(self.z)),
            _ => {}
        }
        let typed = match (&self.kind, key) {
            (CellKind::Element(element), "position") => serde_json::to_value(element.position),
            (CellKind::Element(element), "size") => serde_json::to_value(element.size),
            (CellKind::Element(element), "angle") => serde_json::to_value(element.angle),
            (CellKind::Element(element), "selected") => serde_json::to_value(element.selected),
            (CellKind::Link(link), "source") => serde_json::to_value(&link.source),
            (CellKind::Link(link), "target") => serde_json::to_value(&link.target),
            (CellKind::Link(link), "vertices") => serde_json::to_value(&link.vertices),
            (CellKind::Link(link), "labels") => serde_json::to_value(&link.labels),
            (CellKind::Link(link), "connector") => serde_json::to_value(&link.connector),
            (CellKind::Link(link), "router") => serde_json::to_value(&link.router),
            (CellKind::Link(link), "smooth") => serde_json::to_value(link.smooth),
            _ => return self.props.get(key).cloned(),
        };
        typed.ok()
    }

    /// Assigns a whole top-level value. Nothing changes when the value does
    /// not fit the typed property.
    fn assign(&mut self, key: &str, value: Value) -> Result<(), PlexusError> {
        match key {
            "type" => {
                self.cell_type = typed(key, value)?;
                return Ok(());
            }
            "attrs" => {
                self.attrs = match value {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    _ => {
                        return Err(PlexusError::invalid_property(
                            key,
                            "attributes must be an object",
                        ));
                    }
                };
                self.refresh_ports();
                return Ok(());
            }
            "z" => {
                self.z = typed(key, value)?;
                return Ok(());
            }
            _ => {}
        }
        match (&mut self.kind, key) {
            (CellKind::Element(element), "position") => element.position = typed(key, value)?,
            (CellKind::Element(element), "size") => {
                element.size = typed::<Size>(key, value)?.non_negative();
            }
            (CellKind::Element(element), "angle") => {
                element.angle = normalize_angle(typed(key, value)?);
            }
            (CellKind::Link(link), "source") => link.source = typed(key, value)?,
            (CellKind::Link(link), "target") => link.target = typed(key, value)?,
            (CellKind::Link(link), "vertices") => link.vertices = typed(key, value)?,
            (CellKind::Link(link), "labels") => link.labels = typed(key, value)?,
            (CellKind::Link(link), "connector") => link.connector = typed(key, value)?,
            (CellKind::Link(link), "router") => link.router = typed(key, value)?,
            (CellKind::Link(link), "smooth") => {
                link.smooth = typed::<Option<bool>>(key, value)?.unwrap_or_default();
            }
            _ => {
                if value.is_null() {
                    self.props.shift_remove(key);
                } else {
                    self.props.insert(key.to_string(), value);
                }
            }
        }
        Ok(())
    }

    fn refresh_ports(&mut self) {
        let ports = PortIndex::from_attrs(&self.attrs);
        if let Some(element) = self.as_element_mut() {
            element.ports = ports;
        }
    }
}

impl PortsCapable for Cell {
    fn port_index(&self) -> Option<&PortIndex> {
        self.as_element().map(ElementData::port_index)
    }
}

fn attrs_path(path: &str) -> String {
    format!("attrs{}{}", patch::DELIMITER, path)
}

fn typed<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, PlexusError> {
    serde_json::from_value(value).map_err(|err| PlexusError::invalid_property(key, err.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, PlexusError> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use serde_json::json;

    use super::*;

    fn rect() -> Cell {
        Cell::element("basic.Rect")
            .with_id(Id::new("r"))
            .with_position(10.0, 20.0)
            .with_size(100.0, 60.0)
            .with_attrs(json!({ "rect": { "fill": "red", "stroke": "black" } }))
    }

    #[test]
    fn test_prop_reads_typed_and_nested_values() {
        let cell = rect();
        assert_eq!(cell.prop("id"), Some(json!("r")));
        assert_eq!(cell.prop("position/x"), Some(json!(10.0)));
        assert_eq!(cell.prop("attrs/rect/fill"), Some(json!("red")));
        assert_eq!(cell.attr("rect/stroke"), Some(json!("black")));
        assert_eq!(cell.prop("missing"), None);
        assert_eq!(cell.prop(""), None);
    }

    #[test]
    fn test_set_nested_attr_merges_siblings() {
        let mut cell = rect();
        let change = cell
            .set_attr("rect/fill", json!("blue"), MutationOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(change.top, "attrs");
        assert_eq!(change.path, "attrs/rect/fill");
        assert_eq!(change.value, json!("blue"));
        assert_eq!(change.previous, json!({ "rect": { "fill": "red", "stroke": "black" } }));
        assert_eq!(cell.attr("rect"), Some(json!({ "fill": "blue", "stroke": "black" })));
    }

    #[test]
    fn test_rewrite_drops_stale_nested_keys() {
        let mut cell = rect();
        cell.set_attr("rect", json!({ "fill": "green" }), MutationOptions::rewrite())
            .unwrap();
        assert_eq!(cell.attr("rect"), Some(json!({ "fill": "green" })));
    }

    #[test]
    fn test_unchanged_write_reports_nothing() {
        let mut cell = rect();
        let change = cell
            .set_attr("rect/fill", json!("red"), MutationOptions::default())
            .unwrap();
        assert!(change.is_none());
    }

    #[test]
    fn test_typed_property_rejects_bad_values() {
        let mut cell = rect();
        let err = cell
            .set_prop("position", json!("nowhere"), MutationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlexusError::InvalidProperty { .. }));
        assert_eq!(cell.position(), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_read_only_properties() {
        let mut cell = rect();
        for key in ["id", "parent", "embeds", "selected"] {
            let err = cell
                .set_prop(key, json!("x"), MutationOptions::default())
                .unwrap_err();
            assert!(matches!(err, PlexusError::InvalidProperty { .. }), "{key}");
        }
    }

    #[test]
    fn test_custom_props() {
        let mut cell = rect();
        cell.set_prop("meta/owner/name", json!("ada"), MutationOptions::default())
            .unwrap();
        assert_eq!(cell.props().get("meta"), Some(&json!({ "owner": { "name": "ada" } })));

        cell.unset_prop("meta", MutationOptions::default()).unwrap();
        assert!(cell.props().is_empty());
    }

    #[test]
    fn test_remove_attr() {
        let mut cell = rect();
        let change = cell
            .remove_attr("rect/stroke", MutationOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(change.top, "attrs");
        assert_eq!(cell.attr("rect"), Some(json!({ "fill": "red" })));
        assert!(
            cell.remove_attr("rect/stroke", MutationOptions::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_ports_follow_attrs() {
        let mut cell = rect();
        assert!(cell.ports().is_empty());

        cell.set_attr(".in", json!({ "port": "in" }), MutationOptions::default())
            .unwrap();
        assert!(cell.has_port(Id::new("in")));

        cell.remove_attr(".in", MutationOptions::default()).unwrap();
        assert!(!cell.has_port(Id::new("in")));
    }

    #[test]
    fn test_element_operations() {
        let mut cell = rect();
        cell.translate(5.0, -5.0, MutationOptions::default()).unwrap();
        assert_eq!(cell.position(), Some(Point::new(15.0, 15.0)));

        cell.resize(-3.0, 40.0, MutationOptions::default()).unwrap();
        assert_eq!(cell.size(), Some(Size::new(0.0, 40.0)));

        cell.rotate(300.0, true, MutationOptions::default()).unwrap();
        cell.rotate(90.0, false, MutationOptions::default()).unwrap();
        assert_approx_eq!(f32, cell.angle().unwrap(), 30.0);
    }

    #[test]
    fn test_rotate_full_turn_is_no_change() {
        let mut cell = rect();
        let change = cell.rotate(360.0, false, MutationOptions::default()).unwrap();
        assert!(change.is_none());
    }

    #[test]
    fn test_link_operations() {
        let a = Id::new("a");
        let mut link = Cell::link(Endpoint::cell(a), Endpoint::point(Point::new(50.0, 0.0)));

        link.set_vertices(vec![Point::new(10.0, 10.0)], MutationOptions::default())
            .unwrap();
        link.add_label(Label::text(0.5, "x"), MutationOptions::default())
            .unwrap();
        link.set_label_position(0, LabelPosition::new(20.0), MutationOptions::default())
            .unwrap();
        assert_eq!(link.as_link().unwrap().labels()[0].position, LabelPosition::new(20.0));
        assert_eq!(link.as_link().unwrap().labels()[0].text_content(), Some("x"));

        link.translate(1.0, 1.0, MutationOptions::default()).unwrap();
        let data = link.as_link().unwrap();
        assert_eq!(data.vertices(), &[Point::new(11.0, 11.0)]);
        assert_eq!(data.target().as_point(), Some(Point::new(51.0, 1.0)));
        assert_eq!(data.source().cell_id(), Some(a));

        link.disconnect(LinkEnd::Source, Point::new(3.0, 4.0), MutationOptions::default())
            .unwrap();
        assert_eq!(
            link.as_link().unwrap().source().as_point(),
            Some(Point::new(3.0, 4.0))
        );
    }

    #[test]
    fn test_label_position_out_of_range() {
        let mut link = Cell::link(Endpoint::default(), Endpoint::default());
        let err = link
            .set_label_position(2, LabelPosition::new(0.5), MutationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlexusError::InvalidProperty { .. }));
    }

    #[test]
    fn test_element_ops_on_link_fail() {
        let mut link = Cell::link(Endpoint::default(), Endpoint::default());
        assert!(link.resize(1.0, 1.0, MutationOptions::default()).is_err());
        assert!(
            rect()
                .set_vertices(Vec::new(), MutationOptions::default())
                .is_err()
        );
    }

    #[test]
    fn test_clone_shallow() {
        let mut cell = rect();
        cell.parent = Some(Id::new("p"));
        cell.embeds.push(Id::new("c"));

        let clone = cell.clone_shallow();
        assert_ne!(clone.id(), cell.id());
        assert_eq!(clone.parent(), None);
        assert!(clone.embeds().is_empty());
        assert_eq!(clone.attrs(), cell.attrs());
        assert!(cell.is_child_of(Id::new("p")));
    }
}
