//! Serializable graph snapshots.
//!
//! A snapshot is a flat list of cell records. Records with a `source` or a
//! `target` are links; every other record is an element. Keys that are not
//! part of the record become custom properties.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use plexus_core::{
    geometry::{Point, Size},
    identifier::Id,
};

use super::{Event, Graph};
use crate::{
    error::PlexusError,
    model::{Cell, CellKind, Endpoint, Label, MutationOptions, StrategyRef},
};

/// One serialized cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    #[serde(default)]
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<StrategyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<StrategyRef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub smooth: bool,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl CellRecord {
    pub fn is_link(&self) -> bool {
        self.source.is_some() || self.target.is_some()
    }

    /// Builds the cell. Records without an id get a generated one.
    pub fn into_cell(self) -> Cell {
        let mut cell = if self.is_link() {
            let mut link = Cell::link(
                self.source.unwrap_or_default(),
                self.target.unwrap_or_default(),
            )
            .with_type(self.cell_type)
            .with_vertices(self.vertices)
            .with_smooth(self.smooth);
            for label in self.labels {
                link = link.with_label(label);
            }
            if let Some(connector) = self.connector {
                link = link.with_connector(connector);
            }
            if let Some(router) = self.router {
                link = link.with_router(router);
            }
            link
        } else {
            let position = self.position.unwrap_or_default();
            let size = self.size.unwrap_or(Size::new(1.0, 1.0));
            Cell::element(self.cell_type)
                .with_position(position.x(), position.y())
                .with_size(size.width(), size.height())
                .with_angle(self.angle.unwrap_or_default())
        };
        if let Some(id) = self.id {
            cell = cell.with_id(id);
        }
        cell = cell
            .with_attrs(Value::Object(self.attrs))
            .with_z(self.z.unwrap_or_default());
        for (key, value) in self.props {
            cell = cell.with_prop(key, value);
        }
        cell.parent = self.parent;
        cell.embeds = self.embeds;
        cell
    }

    pub fn from_cell(cell: &Cell) -> Self {
        let mut record = Self {
            id: Some(cell.id()),
            cell_type: cell.cell_type().to_string(),
            attrs: cell.attrs().clone(),
            parent: cell.parent(),
            embeds: cell.embeds().to_vec(),
            z: Some(cell.z()),
            props: cell.props().clone(),
            ..Self::default()
        };
        match cell.kind() {
            CellKind::Element(element) => {
                record.position = Some(element.position());
                record.size = Some(element.size());
                record.angle = Some(element.angle());
            }
            CellKind::Link(link) => {
                record.source = Some(link.source().clone());
                record.target = Some(link.target().clone());
                record.vertices = link.vertices().to_vec();
                record.labels = link.labels().to_vec();
                record.connector = link.connector().cloned();
                record.router = link.router().cloned();
                record.smooth = link.is_smooth();
            }
        }
        record
    }
}

/// Every cell of a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub cells: Vec<CellRecord>,
}

impl GraphSnapshot {
    pub fn from_json(source: &str) -> Result<Self, PlexusError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String, PlexusError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Graph {
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            cells: self.cells().map(CellRecord::from_cell).collect(),
        }
    }

    /// Replaces the graph content with a snapshot. Elements are added before
    /// links; observers get a single `Reset`.
    pub fn from_snapshot(
        &mut self,
        snapshot: GraphSnapshot,
        opts: MutationOptions,
    ) -> Result<(), PlexusError> {
        self.replace_cells(snapshot.cells.into_iter().map(CellRecord::into_cell), opts)
    }

    /// Replaces the graph content with `cells`, elements first, announcing
    /// the whole change as one `Reset`.
    pub fn replace_cells(
        &mut self,
        cells: impl IntoIterator<Item = Cell>,
        opts: MutationOptions,
    ) -> Result<(), PlexusError> {
        let silent = MutationOptions {
            silent: true,
            ..opts
        };
        self.clear(silent)?;
        let (links, elements): (Vec<Cell>, Vec<Cell>) = cells.into_iter().partition(Cell::is_link);
        for cell in elements.into_iter().chain(links) {
            self.add_cell(cell, silent)?;
        }
        self.emit(Event::reset(), opts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::LinkEnd;

    fn sample() -> Value {
        json!({
            "cells": [
                {
                    "id": "l",
                    "type": "link",
                    "source": { "id": "a" },
                    "target": { "id": "b", "port": "in" },
                    "vertices": [{ "x": 50.0, "y": 10.0 }],
                    "labels": [{ "position": 0.5, "attrs": { "text": { "text": "go" } } }],
                    "connector": "rounded"
                },
                {
                    "id": "a",
                    "type": "basic.Rect",
                    "position": { "x": 0.0, "y": 0.0 },
                    "size": { "width": 100.0, "height": 60.0 },
                    "attrs": { "rect": { "fill": "white" } },
                    "embeds": ["b"],
                    "owner": "ada"
                },
                {
                    "id": "b",
                    "type": "basic.Circle",
                    "position": { "x": 10.0, "y": 10.0 },
                    "size": { "width": 20.0, "height": 20.0 },
                    "parent": "a",
                    "z": 2
                }
            ]
        })
    }

    #[test]
    fn test_from_snapshot_adds_elements_first() {
        let snapshot: GraphSnapshot = serde_json::from_value(sample()).unwrap();
        let mut graph = Graph::new();
        graph
            .from_snapshot(snapshot, MutationOptions::default())
            .unwrap();

        let order: Vec<String> = graph.cells().map(|cell| cell.id().to_string()).collect();
        assert_eq!(order, vec!["a", "b", "l"]);
        assert_eq!(graph.incoming(Id::new("b")), vec![Id::new("l")]);
        assert!(graph.is_embedded_in(Id::new("b"), Id::new("a"), false));

        let a = graph.cell(Id::new("a")).unwrap();
        assert_eq!(a.props().get("owner"), Some(&json!("ada")));
        assert_eq!(a.size(), Some(Size::new(100.0, 60.0)));

        let link = graph.cell(Id::new("l")).unwrap().as_link().unwrap();
        assert_eq!(link.connector(), Some(&StrategyRef::new("rounded")));
        assert_eq!(link.labels()[0].text_content(), Some("go"));
        assert_eq!(
            link.end(LinkEnd::Target),
            &Endpoint::port(Id::new("b"), Id::new("in"))
        );
    }

    #[test]
    fn test_round_trip_through_graph() {
        let snapshot: GraphSnapshot = serde_json::from_value(sample()).unwrap();
        let mut graph = Graph::new();
        graph
            .from_snapshot(snapshot, MutationOptions::default())
            .unwrap();

        let exported = graph.to_snapshot();
        let mut reloaded = Graph::new();
        reloaded
            .from_snapshot(exported.clone(), MutationOptions::default())
            .unwrap();

        assert_eq!(reloaded.to_snapshot(), exported);
    }

    #[test]
    fn test_missing_id_is_generated() {
        let record: CellRecord = serde_json::from_value(json!({ "type": "basic.Rect" })).unwrap();
        let first = record.clone().into_cell();
        let second = record.into_cell();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.size(), Some(Size::new(1.0, 1.0)));
    }

    #[test]
    fn test_json_helpers() {
        let snapshot = GraphSnapshot::from_json(&sample().to_string()).unwrap();
        assert_eq!(snapshot.cells.len(), 3);
        assert!(snapshot.to_json().unwrap().contains("\"basic.Circle\""));
        assert!(GraphSnapshot::from_json("{ not json").is_err());
    }
}
