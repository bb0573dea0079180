//! Ports derived from element attributes.
//!
//! Any attribute sub-object holding a `port` key contributes one port. The
//! port id is `port.id` when `port` is an object, or the value itself when
//! it is a string or a number.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use plexus_core::identifier::Id;

/// A named, addressable magnet of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    id: Id,
    selector: String,
    definition: Value,
}

impl Port {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Attribute selector of the sub-part carrying the port.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The raw `port` value.
    pub fn definition(&self) -> &Value {
        &self.definition
    }
}

/// Ports of one element keyed by id, in attribute order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortIndex {
    ports: IndexMap<Id, Port>,
}

impl PortIndex {
    /// Derives the port index from an attribute tree.
    pub fn from_attrs(attrs: &Map<String, Value>) -> Self {
        let ports = attrs
            .iter()
            .filter_map(|(selector, sub)| {
                let definition = sub.as_object()?.get("port")?;
                let id = match definition {
                    Value::Object(map) => port_id(map.get("id")?)?,
                    other => port_id(other)?,
                };
                Some((
                    id,
                    Port {
                        id,
                        selector: selector.clone(),
                        definition: definition.clone(),
                    },
                ))
            })
            .collect();
        Self { ports }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    pub fn get(&self, id: Id) -> Option<&Port> {
        self.ports.get(&id)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

fn port_id(value: &Value) -> Option<Id> {
    match value {
        Value::String(s) => Some(Id::new(s)),
        Value::Number(n) => Some(Id::new(&n.to_string())),
        _ => None,
    }
}

/// Shared port queries for anything that carries a [`PortIndex`].
pub trait PortsCapable {
    /// The underlying index, or `None` for cells without ports.
    fn port_index(&self) -> Option<&PortIndex>;

    fn ports(&self) -> Vec<&Port> {
        self.port_index()
            .map(|index| index.iter().collect())
            .unwrap_or_default()
    }

    fn port(&self, id: Id) -> Option<&Port> {
        self.port_index()?.get(id)
    }

    fn port_selector(&self, id: Id) -> Option<&str> {
        self.port(id).map(Port::selector)
    }

    fn has_port(&self, id: Id) -> bool {
        self.port(id).is_some()
    }
}

impl PortsCapable for PortIndex {
    fn port_index(&self) -> Option<&PortIndex> {
        Some(self)
    }
}
