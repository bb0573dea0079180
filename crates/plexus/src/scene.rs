//! The scene: a graph, its paper and the registries that render it.
//!
//! Every mutation made through [`Scene`] runs in three steps. The graph
//! holds its events while the mutation runs, the paper recomputes the
//! affected views from the queued events, and only then are the events
//! delivered to listeners. Listeners therefore always observe up-to-date
//! geometry.

use log::{debug, info, warn};
use serde_json::Value;

use plexus_core::{
    geometry::{Point, Size},
    identifier::Id,
};

use crate::{
    config::PaperConfig,
    error::PlexusError,
    graph::{CellRecord, Event, Graph, GraphSnapshot, ListenerId},
    interaction::{Viewport, reparent},
    model::{Cell, Endpoint, Label, LabelPosition, LinkEnd, MutationOptions, patch},
    registry::{ShapeRegistry, StrategyRegistry},
    view::{Paper, RenderContext, Surface, TemplateSurface, UpdatePass},
};

/// A graph together with the geometry of its views.
pub struct Scene {
    graph: Graph,
    paper: Paper,
    shapes: ShapeRegistry,
    surface: Box<dyn Surface>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(PaperConfig::default())
    }
}

impl Scene {
    /// A scene with the default shape and strategy registries.
    pub fn new(config: PaperConfig) -> Self {
        Self::with_registries(config, ShapeRegistry::default(), StrategyRegistry::default())
    }

    pub fn with_registries(config: PaperConfig, shapes: ShapeRegistry, strategies: StrategyRegistry) -> Self {
        Self {
            graph: Graph::new(),
            paper: Paper::new(config, strategies),
            shapes,
            surface: Box::new(TemplateSurface),
        }
    }

    /// Replaces the surface magnets and markers are measured with.
    pub fn with_surface(mut self, surface: impl Surface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn paper(&self) -> &Paper {
        &self.paper
    }

    pub fn config(&self) -> &PaperConfig {
        self.paper.config()
    }

    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    /// Connectors and routers can be registered after construction; links
    /// pick them up on their next update.
    pub fn strategies_mut(&mut self) -> &mut StrategyRegistry {
        self.paper.strategies_mut()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.paper.set_viewport(viewport);
    }

    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            graph: &self.graph,
            shapes: &self.shapes,
            surface: self.surface.as_ref(),
        }
    }

    /// Runs `mutation` on the graph, updates the views, then notifies
    /// listeners.
    ///
    /// A failing mutation or view update cancels the whole operation: the
    /// graph is rolled back, the queued events are dropped and the views
    /// are recomputed from the restored graph.
    pub fn mutate<T>(
        &mut self,
        mutation: impl FnOnce(&mut Graph) -> Result<T, PlexusError>,
    ) -> Result<T, PlexusError> {
        let checkpoint = self.graph.checkpoint();
        self.graph.hold_events();
        let value = match mutation(&mut self.graph) {
            Ok(value) => value,
            Err(err) => {
                let dropped = self.graph.rollback(checkpoint);
                debug!(err:err, dropped = dropped; "Mutation rolled back");
                return Err(err);
            }
        };
        let events: Vec<Event> = self
            .graph
            .queued_events()
            .iter()
            .map(|queued| queued.event.clone())
            .collect();
        if !events.is_empty() {
            let ctx = RenderContext {
                graph: &self.graph,
                shapes: &self.shapes,
                surface: self.surface.as_ref(),
            };
            if let Err(err) = self.paper.apply(&ctx, &events) {
                let dropped = self.graph.rollback(checkpoint);
                warn!(err:err, dropped = dropped; "View update failed, mutation rolled back");
                if let Err(restore_err) = self.render_all() {
                    warn!(err:err = restore_err; "Views could not be restored");
                }
                return Err(err);
            }
        }
        self.graph.release_events();
        Ok(value)
    }

    /// Recomputes every view.
    pub fn render_all(&mut self) -> Result<UpdatePass, PlexusError> {
        let ctx = RenderContext {
            graph: &self.graph,
            shapes: &self.shapes,
            surface: self.surface.as_ref(),
        };
        self.paper.render_all(&ctx)
    }

    pub fn on(&mut self, key: impl Into<String>, listener: impl FnMut(&Event) + 'static) -> ListenerId {
        self.graph.on(key, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.graph.off(id)
    }

    /// Adds a cell, with the attributes of its template underneath its own.
    pub fn add_cell(&mut self, cell: Cell) -> Result<Id, PlexusError> {
        let cell = self.with_template_attrs(cell);
        self.mutate(|graph| graph.add_cell(cell, MutationOptions::default()))
    }

    /// Removes a cell with its embedded cells and connected links.
    pub fn remove_cell(&mut self, id: Id) -> Result<Vec<Id>, PlexusError> {
        self.mutate(|graph| graph.remove_cell(id, MutationOptions::default()))
    }

    pub fn clear(&mut self) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.clear(MutationOptions::default()))
    }

    /// Replaces the whole graph with `snapshot`.
    pub fn load_snapshot(&mut self, snapshot: GraphSnapshot) -> Result<(), PlexusError> {
        let cells: Vec<Cell> = snapshot
            .cells
            .into_iter()
            .map(CellRecord::into_cell)
            .map(|cell| self.with_template_attrs(cell))
            .collect();
        let count = cells.len();
        self.mutate(|graph| graph.replace_cells(cells, MutationOptions::default()))?;
        info!(cells = count; "Snapshot loaded");
        Ok(())
    }

    pub fn to_snapshot(&self) -> GraphSnapshot {
        self.graph.to_snapshot()
    }

    pub fn set_prop(&mut self, id: Id, path: &str, value: Value) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.set_prop(id, path, value, MutationOptions::default()))?;
        Ok(())
    }

    pub fn set_attr(&mut self, id: Id, path: &str, value: Value) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.set_attr(id, path, value, MutationOptions::default()))?;
        Ok(())
    }

    pub fn translate(&mut self, id: Id, dx: f32, dy: f32) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.translate(id, dx, dy, MutationOptions::default()))?;
        Ok(())
    }

    pub fn resize(&mut self, id: Id, size: Size) -> Result<(), PlexusError> {
        self.mutate(|graph| {
            graph.resize(id, size.width(), size.height(), MutationOptions::default())
        })?;
        Ok(())
    }

    pub fn rotate(&mut self, id: Id, degrees: f32, absolute: bool) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.rotate(id, degrees, absolute, MutationOptions::default()))?;
        Ok(())
    }

    pub fn set_source(&mut self, id: Id, endpoint: Endpoint) -> Result<(), PlexusError> {
        self.set_end(id, LinkEnd::Source, endpoint)
    }

    pub fn set_target(&mut self, id: Id, endpoint: Endpoint) -> Result<(), PlexusError> {
        self.set_end(id, LinkEnd::Target, endpoint)
    }

    pub fn set_end(&mut self, id: Id, end: LinkEnd, endpoint: Endpoint) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.set_end(id, end, endpoint, MutationOptions::default()))?;
        Ok(())
    }

    pub fn set_vertices(&mut self, id: Id, vertices: Vec<Point>) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.set_vertices(id, vertices, MutationOptions::default()))?;
        Ok(())
    }

    pub fn add_label(&mut self, id: Id, label: Label) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.add_label(id, label, MutationOptions::default()))?;
        Ok(())
    }

    pub fn set_label_position(&mut self, id: Id, index: usize, position: LabelPosition) -> Result<(), PlexusError> {
        self.mutate(|graph| {
            graph.set_label_position(id, index, position, MutationOptions::default())
        })?;
        Ok(())
    }

    /// Embeds `child` into `parent`, keeping it where it is on the paper.
    pub fn embed(&mut self, parent: Id, child: Id) -> Result<(), PlexusError> {
        self.mutate(|graph| reparent::embed_in_place(graph, parent, child, MutationOptions::default()))
    }

    /// Lifts `child` out of `parent`, keeping it where it is on the paper.
    pub fn unembed(&mut self, parent: Id, child: Id) -> Result<(), PlexusError> {
        self.mutate(|graph| reparent::unembed_in_place(graph, parent, child, MutationOptions::default()))
    }

    /// Embeds `id` into the element it was dropped onto, or lifts it to the
    /// top level. Returns the new parent.
    pub fn reparent_on_drop(&mut self, id: Id) -> Result<Option<Id>, PlexusError> {
        let target = reparent::find_drop_target(&self.graph, &self.paper, id);
        let changed = self.mutate(|graph| reparent::reparent(graph, id, target, MutationOptions::default()))?;
        if changed {
            debug!(cell = id.to_string(); "Reparented on drop");
        }
        Ok(target)
    }

    pub fn focus(&mut self, id: Id) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.focus(id, MutationOptions::default()))
    }

    pub fn update_selection(&mut self, ids: impl IntoIterator<Item = Id>) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.update_selection(ids, MutationOptions::default()))
    }

    pub fn cancel_selection(&mut self, except: Option<Id>) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.cancel_selection(except, MutationOptions::default()))
    }

    pub fn to_front(&mut self, id: Id) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.to_front(id, MutationOptions::default()))?;
        Ok(())
    }

    pub fn to_back(&mut self, id: Id) -> Result<(), PlexusError> {
        self.mutate(|graph| graph.to_back(id, MutationOptions::default()))?;
        Ok(())
    }

    fn with_template_attrs(&self, cell: Cell) -> Cell {
        let Some(template) = self.shapes.lookup(cell.cell_type()) else {
            return cell;
        };
        let mut merged = Value::Object(template.attrs().clone());
        patch::deep_merge(&mut merged, Value::Object(cell.attrs().clone()));
        cell.with_attrs(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use float_cmp::assert_approx_eq;
    use serde_json::json;

    use super::*;
    use crate::graph::EventKind;

    fn rect(name: &str, x: f32, y: f32) -> Cell {
        Cell::element("basic.Rect")
            .with_id(Id::new(name))
            .with_position(x, y)
            .with_size(100.0, 60.0)
    }

    #[test]
    fn test_template_attrs_underneath() {
        let mut scene = Scene::default();
        let id = scene
            .add_cell(rect("a", 0.0, 0.0).with_attrs(json!({ "rect": { "fill": "red" } })))
            .unwrap();

        let cell = scene.graph().cell(id).unwrap();
        assert_eq!(cell.attr("rect/fill"), Some(json!("red")));
        assert_eq!(cell.attr("rect/stroke"), Some(json!("#000000")));
    }

    #[test]
    fn test_listeners_see_updated_geometry() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        scene.on("change:position", move |event| sink.borrow_mut().extend(event.cell));

        scene.translate(Id::new("a"), 10.0, 5.0).unwrap();

        assert_eq!(*seen.borrow(), vec![Id::new("a")]);
        let view = scene.paper().element_view(Id::new("a")).unwrap();
        assert_eq!(view.origin(), Point::new(10.0, 5.0));
    }

    #[test]
    fn test_silent_mutation_updates_views_without_notifying() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        scene.on("all", move |_| *sink.borrow_mut() += 1);

        scene
            .mutate(|graph| graph.translate(Id::new("a"), 20.0, 0.0, MutationOptions::silent()))
            .unwrap();

        assert_eq!(*count.borrow(), 0);
        assert_eq!(
            scene.paper().element_view(Id::new("a")).unwrap().origin(),
            Point::new(20.0, 0.0)
        );
    }

    #[test]
    fn test_embed_keeps_absolute_position() {
        let mut scene = Scene::default();
        scene.add_cell(rect("parent", 100.0, 100.0).with_size(300.0, 300.0)).unwrap();
        scene.add_cell(rect("child", 150.0, 120.0)).unwrap();

        scene.embed(Id::new("parent"), Id::new("child")).unwrap();

        let child = scene.graph().cell(Id::new("child")).unwrap();
        assert_eq!(child.position(), Some(Point::new(50.0, 20.0)));
        assert_eq!(
            scene.paper().element_view(Id::new("child")).unwrap().origin(),
            Point::new(150.0, 120.0)
        );

        scene.unembed(Id::new("parent"), Id::new("child")).unwrap();
        let child = scene.graph().cell(Id::new("child")).unwrap();
        assert_eq!(child.position(), Some(Point::new(150.0, 120.0)));
        assert_eq!(child.parent(), None);
    }

    #[test]
    fn test_embed_into_circle_carries_radius() {
        let mut scene = Scene::default();
        let circle = Cell::element("basic.Circle")
            .with_id(Id::new("c"))
            .with_position(100.0, 100.0)
            .with_size(80.0, 80.0);
        scene.add_cell(circle).unwrap();
        scene.add_cell(rect("r", 70.0, 70.0).with_size(10.0, 10.0)).unwrap();

        scene.embed(Id::new("c"), Id::new("r")).unwrap();

        let view = scene.paper().element_view(Id::new("r")).unwrap();
        assert_eq!(view.bbox().min_point(), Point::new(70.0, 70.0));
        let child = scene.graph().cell(Id::new("r")).unwrap();
        assert_eq!(child.position(), Some(Point::new(-30.0, -30.0)));
    }

    #[test]
    fn test_load_snapshot_resets_views() {
        let mut scene = Scene::default();
        scene.add_cell(rect("old", 0.0, 0.0)).unwrap();
        let resets = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&resets);
        scene.on("all", move |event| {
            if event.kind == EventKind::Reset {
                *sink.borrow_mut() += 1;
            }
        });
        let snapshot = GraphSnapshot::from_json(
            r#"{ "cells": [
                { "id": "l", "type": "link", "source": { "id": "a" }, "target": { "id": "b" } },
                { "id": "a", "type": "basic.Rect", "position": { "x": 0, "y": 0 }, "size": { "width": 100, "height": 60 } },
                { "id": "b", "type": "basic.Rect", "position": { "x": 300, "y": 0 }, "size": { "width": 100, "height": 60 } }
            ] }"#,
        )
        .unwrap();

        scene.load_snapshot(snapshot).unwrap();

        assert_eq!(*resets.borrow(), 1);
        assert!(scene.paper().element_view(Id::new("old")).is_none());
        let link = scene.paper().link_view(Id::new("l")).unwrap();
        assert_approx_eq!(f32, link.source_point().x(), 100.0, epsilon = 0.01);
        assert_approx_eq!(f32, link.target_point().x(), 300.0, epsilon = 0.01);
    }

    #[test]
    fn test_failed_mutation_stops_holding_events() {
        let mut scene = Scene::default();
        let result = scene.set_prop(Id::new("missing"), "position", json!({ "x": 1, "y": 1 }));
        assert!(matches!(result, Err(PlexusError::UnknownCell(_))));

        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        scene.on("add", move |_| *sink.borrow_mut() += 1);
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        assert_eq!(*count.borrow(), 1);
    }
}
