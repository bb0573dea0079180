//! The cell set, its adjacency index, embedding and selection.
//!
//! Every mutation goes through [`Graph`] so that the adjacency index always
//! matches the current link endpoints. Mutations queue or deliver
//! [`Event`]s; holding events lets a caller recompute geometry before
//! observers are notified.

mod adjacency;
pub mod events;
mod selection;
pub mod snapshot;

pub use events::{Event, EventBus, EventKind, Listener, ListenerId};
pub use snapshot::{CellRecord, GraphSnapshot};

use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde_json::Value;

use plexus_core::{geometry::Point, identifier::Id};

use crate::{
    error::PlexusError,
    model::{Cell, Change, Endpoint, Label, LabelPosition, LinkEnd, MutationOptions},
};
use adjacency::{Adjacency, EdgeEnds};

/// Which links [`Graph::connected_links`] returns.
///
/// With neither `inbound` nor `outbound` set, both directions are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkQuery {
    pub inbound: bool,
    pub outbound: bool,
    /// Include links of embedded descendants.
    pub deep: bool,
}

impl LinkQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn inbound() -> Self {
        Self {
            inbound: true,
            ..Self::default()
        }
    }

    pub fn outbound() -> Self {
        Self {
            outbound: true,
            ..Self::default()
        }
    }

    pub fn deep(mut self) -> Self {
        self.deep = true;
        self
    }
}

/// How [`Graph::embedded_cells`] walks the embedding tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddedQuery {
    pub deep: bool,
    /// Breadth-first instead of depth-first (pre-order) when `deep`.
    pub breadth_first: bool,
}

/// An event waiting for [`Graph::release_events`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueuedEvent {
    pub event: Event,
    pub silent: bool,
}

/// The cell state a graph can be rolled back to.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    cells: IndexMap<Id, Cell>,
    adjacency: Adjacency,
    selection: Vec<Id>,
}

/// The scene graph.
#[derive(Debug, Default)]
pub struct Graph {
    cells: IndexMap<Id, Cell>,
    adjacency: Adjacency,
    selection: Vec<Id>,
    bus: EventBus,
    pending: Vec<QueuedEvent>,
    hold: bool,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn get_cell(&self, id: Id) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Like [`Graph::get_cell`], failing with `UnknownCell`.
    pub fn cell(&self, id: Id) -> Result<&Cell, PlexusError> {
        self.cells.get(&id).ok_or(PlexusError::UnknownCell(id))
    }

    /// All cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().filter(|cell| cell.is_element())
    }

    pub fn links(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().filter(|cell| cell.is_link())
    }

    /// Adds a cell and indexes it.
    pub fn add_cell(&mut self, cell: Cell, opts: MutationOptions) -> Result<Id, PlexusError> {
        let id = cell.id();
        if self.cells.contains_key(&id) {
            return Err(PlexusError::DuplicateCell(id));
        }
        match cell.as_link() {
            Some(link) => self.adjacency.set_edge(
                id,
                EdgeEnds {
                    source: link.source().cell_id(),
                    target: link.target().cell_id(),
                },
            ),
            None => self.adjacency.add_node(id),
        }
        self.cells.insert(id, cell);
        debug!(cell = id.to_string(); "Cell added");
        self.emit(Event::new(EventKind::Add, id), opts);
        Ok(id)
    }

    /// Adds cells in order, stopping at the first failure.
    pub fn add_cells(
        &mut self,
        cells: impl IntoIterator<Item = Cell>,
        opts: MutationOptions,
    ) -> Result<Vec<Id>, PlexusError> {
        cells
            .into_iter()
            .map(|cell| self.add_cell(cell, opts))
            .collect()
    }

    /// Removes a cell, its embedded descendants and the links attached to
    /// any removed element. Returns the removed ids in removal order.
    pub fn remove_cell(&mut self, id: Id, opts: MutationOptions) -> Result<Vec<Id>, PlexusError> {
        let mut removed = Vec::new();
        self.remove_recursive(id, false, opts, &mut removed)?;
        Ok(removed)
    }

    /// Removes a cell and its embedded descendants, turning the ends of
    /// attached links into free points at the origin instead of removing
    /// the links.
    pub fn remove_cell_keep_links(
        &mut self,
        id: Id,
        opts: MutationOptions,
    ) -> Result<Vec<Id>, PlexusError> {
        let mut removed = Vec::new();
        self.remove_recursive(id, true, opts, &mut removed)?;
        Ok(removed)
    }

    fn remove_recursive(
        &mut self,
        id: Id,
        disconnect_links: bool,
        opts: MutationOptions,
        removed: &mut Vec<Id>,
    ) -> Result<(), PlexusError> {
        let cell = self.cell(id)?;
        let parent = cell.parent();
        let children = cell.embeds().to_vec();
        let is_element = cell.is_element();

        if let Some(parent) = parent.filter(|parent| self.contains(*parent)) {
            self.unembed(parent, id, opts)?;
        }
        for child in children {
            if self.contains(child) {
                self.remove_recursive(child, disconnect_links, opts, removed)?;
            }
        }
        if is_element {
            let links = self.connected_links(id, LinkQuery::all());
            for link in links {
                if !self.contains(link) {
                    continue;
                }
                if disconnect_links {
                    self.disconnect_from(link, id, opts)?;
                } else {
                    self.remove_recursive(link, disconnect_links, opts, removed)?;
                }
            }
        }

        self.selection.retain(|selected| *selected != id);
        if is_element {
            self.adjacency.remove_node(id);
        } else {
            self.adjacency.remove_edge(id);
        }
        self.cells.shift_remove(&id);
        removed.push(id);
        debug!(cell = id.to_string(); "Cell removed");
        self.emit(Event::new(EventKind::Remove, id), opts);
        Ok(())
    }

    /// Turns every end of `link` that references `element` into a free
    /// point at the origin.
    fn disconnect_from(
        &mut self,
        link: Id,
        element: Id,
        opts: MutationOptions,
    ) -> Result<(), PlexusError> {
        for end in [LinkEnd::Source, LinkEnd::Target] {
            let attached = self
                .cell(link)?
                .as_link()
                .is_some_and(|data| data.end(end).cell_id() == Some(element));
            if attached {
                self.disconnect(link, end, Point::default(), opts)?;
            }
        }
        Ok(())
    }

    /// Removes every cell, links first, then emits one `Reset`.
    pub fn clear(&mut self, opts: MutationOptions) -> Result<(), PlexusError> {
        let silent = MutationOptions {
            silent: true,
            ..opts
        };
        let links: Vec<Id> = self.links().map(Cell::id).collect();
        let elements: Vec<Id> = self.elements().map(Cell::id).collect();
        for id in links.into_iter().chain(elements) {
            if self.contains(id) {
                self.remove_cell(id, silent)?;
            }
        }
        self.adjacency.clear();
        self.selection.clear();
        self.emit(Event::reset(), opts);
        Ok(())
    }

    /// Runs `mutation` on one cell, re-indexes its endpoints and emits one
    /// change event per committed change.
    fn mutate<F>(
        &mut self,
        id: Id,
        opts: MutationOptions,
        mutation: F,
    ) -> Result<Vec<Change>, PlexusError>
    where
        F: FnOnce(&mut Cell) -> Result<Vec<Change>, PlexusError>,
    {
        let cell = self.cells.get_mut(&id).ok_or(PlexusError::UnknownCell(id))?;
        let changes = mutation(cell)?;
        let reconnected = changes.iter().any(|c| c.top == "source" || c.top == "target");
        if let Some(link) = cell.as_link().filter(|_| reconnected) {
            self.adjacency.set_edge(
                id,
                EdgeEnds {
                    source: link.source().cell_id(),
                    target: link.target().cell_id(),
                },
            );
        }
        for change in &changes {
            self.emit(Event::change(id, change.clone()), opts);
        }
        Ok(changes)
    }

    fn mutate_one<F>(
        &mut self,
        id: Id,
        opts: MutationOptions,
        mutation: F,
    ) -> Result<Option<Change>, PlexusError>
    where
        F: FnOnce(&mut Cell) -> Result<Option<Change>, PlexusError>,
    {
        let mut changes = self.mutate(id, opts, |cell| Ok(mutation(cell)?.into_iter().collect()))?;
        Ok(changes.pop())
    }

    pub fn set_prop(
        &mut self,
        id: Id,
        path: &str,
        value: Value,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.set_prop(path, value, opts))
    }

    pub fn unset_prop(
        &mut self,
        id: Id,
        path: &str,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.unset_prop(path, opts))
    }

    pub fn set_attr(
        &mut self,
        id: Id,
        path: &str,
        value: Value,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.set_attr(path, value, opts))
    }

    pub fn remove_attr(
        &mut self,
        id: Id,
        path: &str,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.remove_attr(path, opts))
    }

    pub fn translate(
        &mut self,
        id: Id,
        dx: f32,
        dy: f32,
        opts: MutationOptions,
    ) -> Result<Vec<Change>, PlexusError> {
        self.mutate(id, opts, |cell| cell.translate(dx, dy, opts))
    }

    pub fn resize(
        &mut self,
        id: Id,
        width: f32,
        height: f32,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.resize(width, height, opts))
    }

    pub fn rotate(
        &mut self,
        id: Id,
        degrees: f32,
        absolute: bool,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.rotate(degrees, absolute, opts))
    }

    pub fn set_source(
        &mut self,
        id: Id,
        endpoint: Endpoint,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.set_end(id, LinkEnd::Source, endpoint, opts)
    }

    pub fn set_target(
        &mut self,
        id: Id,
        endpoint: Endpoint,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.set_end(id, LinkEnd::Target, endpoint, opts)
    }

    pub fn set_end(
        &mut self,
        id: Id,
        end: LinkEnd,
        endpoint: Endpoint,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.set_end(end, endpoint, opts))
    }

    pub fn set_vertices(
        &mut self,
        id: Id,
        vertices: Vec<Point>,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.set_vertices(vertices, opts))
    }

    pub fn add_label(
        &mut self,
        id: Id,
        label: Label,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.add_label(label, opts))
    }

    pub fn set_label_position(
        &mut self,
        id: Id,
        index: usize,
        position: LabelPosition,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.set_label_position(index, position, opts))
    }

    /// Detaches one end of a link, leaving it at `at`.
    pub fn disconnect(
        &mut self,
        id: Id,
        end: LinkEnd,
        at: Point,
        opts: MutationOptions,
    ) -> Result<Option<Change>, PlexusError> {
        self.mutate_one(id, opts, |cell| cell.disconnect(end, at, opts))
    }

    /// Embeds `child` into `parent`, moving it out of any previous parent.
    ///
    /// Only the relation changes; positions are left as they are.
    pub fn embed(&mut self, parent: Id, child: Id, opts: MutationOptions) -> Result<(), PlexusError> {
        if parent == child {
            return Err(PlexusError::invalid_embedding(
                parent,
                child,
                "a cell cannot embed itself",
            ));
        }
        if !self.cell(parent)?.is_element() {
            return Err(PlexusError::invalid_embedding(
                parent,
                child,
                "only elements can embed cells",
            ));
        }
        let previous = self.cell(child)?.parent();
        if previous == Some(parent) {
            return Ok(());
        }
        if self.ancestors(parent).contains(&child) {
            return Err(PlexusError::invalid_embedding(
                parent,
                child,
                "embedding would create a cycle",
            ));
        }
        if let Some(previous) = previous {
            self.unembed(previous, child, opts)?;
        }

        self.update_embeds(parent, opts, |embeds| embeds.push(child))?;
        self.set_parent(child, Some(parent), opts)?;
        debug!(parent = parent.to_string(), child = child.to_string(); "Cell embedded");
        Ok(())
    }

    /// Detaches `child` from `parent`.
    pub fn unembed(&mut self, parent: Id, child: Id, opts: MutationOptions) -> Result<(), PlexusError> {
        if !self.cell(child)?.is_child_of(parent) {
            return Err(PlexusError::invalid_embedding(
                parent,
                child,
                "cell is not embedded in this parent",
            ));
        }
        self.update_embeds(parent, opts, |embeds| embeds.retain(|id| *id != child))?;
        self.set_parent(child, None, opts)?;
        debug!(parent = parent.to_string(), child = child.to_string(); "Cell unembedded");
        Ok(())
    }

    fn update_embeds(
        &mut self,
        parent: Id,
        opts: MutationOptions,
        update: impl FnOnce(&mut Vec<Id>),
    ) -> Result<(), PlexusError> {
        let cell = self.cells.get_mut(&parent).ok_or(PlexusError::UnknownCell(parent))?;
        let previous = serde_json::to_value(&cell.embeds)?;
        update(&mut cell.embeds);
        let value = serde_json::to_value(&cell.embeds)?;
        let change = Change {
            top: "embeds".to_string(),
            path: "embeds".to_string(),
            value,
            previous,
        };
        self.emit(Event::change(parent, change), opts);
        Ok(())
    }

    fn set_parent(&mut self, child: Id, parent: Option<Id>, opts: MutationOptions) -> Result<(), PlexusError> {
        let cell = self.cells.get_mut(&child).ok_or(PlexusError::UnknownCell(child))?;
        let previous = serde_json::to_value(cell.parent)?;
        cell.parent = parent;
        let change = Change {
            top: "parent".to_string(),
            path: "parent".to_string(),
            value: serde_json::to_value(parent)?,
            previous,
        };
        self.emit(Event::change(child, change), opts);
        Ok(())
    }

    /// True when `child` is embedded in `ancestor`, directly or (with
    /// `deep`) through intermediate parents.
    pub fn is_embedded_in(&self, child: Id, ancestor: Id, deep: bool) -> bool {
        if deep {
            self.ancestors(child).contains(&ancestor)
        } else {
            self.get_cell(child)
                .is_some_and(|cell| cell.is_child_of(ancestor))
        }
    }

    /// Parent chain of a cell, nearest first.
    pub fn ancestors(&self, id: Id) -> Vec<Id> {
        let mut ancestors = Vec::new();
        let mut current = self.get_cell(id).and_then(Cell::parent);
        while let Some(parent) = current {
            if ancestors.contains(&parent) || ancestors.len() > self.cells.len() {
                break;
            }
            ancestors.push(parent);
            current = self.get_cell(parent).and_then(Cell::parent);
        }
        ancestors
    }

    /// Ids embedded in `id`, directly or throughout the subtree.
    pub fn embedded_cells(&self, id: Id, query: EmbeddedQuery) -> Vec<Id> {
        let direct = |id: Id| {
            self.get_cell(id)
                .map(|cell| cell.embeds().to_vec())
                .unwrap_or_default()
        };
        if !query.deep {
            return direct(id);
        }

        let mut result = Vec::new();
        let mut seen = IndexSet::new();
        seen.insert(id);
        if query.breadth_first {
            let mut queue: VecDeque<Id> = direct(id).into();
            while let Some(next) = queue.pop_front() {
                if seen.insert(next) {
                    result.push(next);
                    queue.extend(direct(next));
                }
            }
        } else {
            let mut stack: Vec<Id> = direct(id);
            stack.reverse();
            while let Some(next) = stack.pop() {
                if seen.insert(next) {
                    result.push(next);
                    stack.extend(direct(next).into_iter().rev());
                }
            }
        }
        result
    }

    /// Deep copy of a cell and its embedded subtree with fresh ids.
    ///
    /// Embedding and link endpoints inside the subtree are remapped to the
    /// new ids; references leaving the subtree are kept, except the root's
    /// parent which is cleared. The result is ordered parents first.
    pub fn clone_subtree(&self, id: Id) -> Result<Vec<Cell>, PlexusError> {
        self.cell(id)?;
        let mut ids = vec![id];
        ids.extend(self.embedded_cells(
            id,
            EmbeddedQuery {
                deep: true,
                breadth_first: true,
            },
        ));
        let mapping: HashMap<Id, Id> = ids.iter().map(|old| (*old, Id::generate())).collect();
        let remap = |old: Id| mapping.get(&old).copied().unwrap_or(old);

        ids.iter()
            .map(|old| {
                let mut clone = self.cell(*old)?.clone_shallow();
                clone.set_id(remap(*old));
                let original = self.cell(*old)?;
                clone.parent = original
                    .parent()
                    .filter(|_| *old != id)
                    .map(remap);
                clone.embeds = original.embeds().iter().copied().map(remap).collect();
                if let Some(link) = clone.as_link_mut() {
                    for endpoint in [&mut link.source, &mut link.target] {
                        if let Endpoint::Cell { id: target, .. } = endpoint {
                            *target = remap(*target);
                        }
                    }
                }
                Ok(clone)
            })
            .collect()
    }

    /// Links attached to `id` (and, with `deep`, to its embedded
    /// descendants), without duplicates.
    pub fn connected_links(&self, id: Id, query: LinkQuery) -> Vec<Id> {
        let (inbound, outbound) = if query.inbound || query.outbound {
            (query.inbound, query.outbound)
        } else {
            (true, true)
        };
        let mut nodes = vec![id];
        if query.deep {
            nodes.extend(self.embedded_cells(
                id,
                EmbeddedQuery {
                    deep: true,
                    breadth_first: false,
                },
            ));
        }

        let mut links = IndexSet::new();
        for node in nodes {
            if outbound {
                links.extend(self.adjacency.outgoing(node));
            }
            if inbound {
                links.extend(self.adjacency.incoming(node));
            }
        }
        links.into_iter().collect()
    }

    /// Links whose source references `id`.
    pub fn outgoing(&self, id: Id) -> Vec<Id> {
        self.adjacency.outgoing(id).collect()
    }

    /// Links whose target references `id`.
    pub fn incoming(&self, id: Id) -> Vec<Id> {
        self.adjacency.incoming(id).collect()
    }

    /// Elements at the far end of `id`'s links.
    pub fn neighbors(&self, id: Id) -> Vec<Id> {
        self.adjacency.neighbors(id)
    }

    /// Elements with no incoming links.
    pub fn sources(&self) -> Vec<Id> {
        self.adjacency.sources().collect()
    }

    /// Elements with no outgoing links.
    pub fn sinks(&self) -> Vec<Id> {
        self.adjacency.sinks().collect()
    }

    pub fn max_z(&self) -> i64 {
        self.cells.values().map(Cell::z).max().unwrap_or(0)
    }

    pub fn min_z(&self) -> i64 {
        self.cells.values().map(Cell::z).min().unwrap_or(0)
    }

    /// Raises a cell above every other cell.
    pub fn to_front(&mut self, id: Id, opts: MutationOptions) -> Result<Option<Change>, PlexusError> {
        let z = self.cell(id)?.z();
        let top = self.max_z();
        let alone = self.cells.values().filter(|cell| cell.z() == top).count() == 1;
        if z == top && alone {
            return Ok(None);
        }
        self.set_prop(id, "z", Value::from(top + 1), opts)
    }

    /// Lowers a cell below every other cell.
    pub fn to_back(&mut self, id: Id, opts: MutationOptions) -> Result<Option<Change>, PlexusError> {
        let z = self.cell(id)?.z();
        let bottom = self.min_z();
        let alone = self.cells.values().filter(|cell| cell.z() == bottom).count() == 1;
        if z == bottom && alone {
            return Ok(None);
        }
        self.set_prop(id, "z", Value::from(bottom - 1), opts)
    }

    /// Subscribes to events; see [`EventKind::matches`] for keys.
    pub fn on(&mut self, key: impl Into<String>, listener: impl FnMut(&Event) + 'static) -> ListenerId {
        self.bus.on(key, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.bus.off(id)
    }

    /// Queues events instead of delivering them until
    /// [`Graph::release_events`].
    pub fn hold_events(&mut self) {
        self.hold = true;
    }

    /// Stops holding and delivers every queued non-silent event. Returns the
    /// number of delivered events.
    pub fn release_events(&mut self) -> usize {
        self.hold = false;
        let pending = std::mem::take(&mut self.pending);
        let mut delivered = 0;
        for queued in pending.into_iter().filter(|queued| !queued.silent) {
            self.bus.emit(&queued.event);
            delivered += 1;
        }
        delivered
    }

    /// Captures the cells, the index and the selection. Listeners and
    /// queued events are not part of a checkpoint.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cells: self.cells.clone(),
            adjacency: self.adjacency.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Restores `checkpoint`, stops holding and drops the queued events
    /// without delivering them. Returns the number of dropped events.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) -> usize {
        let Checkpoint {
            cells,
            adjacency,
            selection,
        } = checkpoint;
        self.cells = cells;
        self.adjacency = adjacency;
        self.selection = selection;
        self.hold = false;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Events queued while holding, silent ones included.
    pub(crate) fn queued_events(&self) -> &[QueuedEvent] {
        &self.pending
    }

    fn emit(&mut self, event: Event, opts: MutationOptions) {
        if self.hold {
            self.pending.push(QueuedEvent {
                event,
                silent: opts.silent,
            });
        } else if !opts.silent {
            self.bus.emit(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use serde_json::json;

    use super::*;

    fn element(name: &str) -> Cell {
        Cell::element("basic.Rect")
            .with_id(Id::new(name))
            .with_size(10.0, 10.0)
    }

    fn link(name: &str, source: &str, target: &str) -> Cell {
        Cell::link(Endpoint::cell(Id::new(source)), Endpoint::cell(Id::new(target)))
            .with_id(Id::new(name))
    }

    fn graph_with(cells: Vec<Cell>) -> Graph {
        let mut graph = Graph::new();
        graph.add_cells(cells, MutationOptions::default()).unwrap();
        graph
    }

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    fn recorder(graph: &mut Graph, key: &str) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        graph.on(key, move |event: &Event| {
            let cell = event.cell.map(|id| id.to_string()).unwrap_or_default();
            sink.borrow_mut().push(format!("{}:{cell}", event.kind));
        });
        log
    }

    #[test]
    fn test_add_and_query() {
        let graph = graph_with(vec![element("a"), element("b"), link("l", "a", "b")]);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.elements().count(), 2);
        assert_eq!(graph.links().count(), 1);
        assert_eq!(graph.outgoing(Id::new("a")), ids(&["l"]));
        assert_eq!(graph.incoming(Id::new("b")), ids(&["l"]));
        assert_eq!(graph.neighbors(Id::new("a")), ids(&["b"]));
        assert_eq!(graph.sources(), ids(&["a"]));
        assert_eq!(graph.sinks(), ids(&["b"]));
    }

    #[test]
    fn test_duplicate_cell() {
        let mut graph = graph_with(vec![element("a")]);
        let err = graph
            .add_cell(element("a"), MutationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlexusError::DuplicateCell(_)));
    }

    #[test]
    fn test_unknown_cell() {
        let mut graph = Graph::new();
        let err = graph
            .translate(Id::new("ghost"), 1.0, 1.0, MutationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlexusError::UnknownCell(_)));
    }

    #[test]
    fn test_reconnect_updates_adjacency() {
        let mut graph = graph_with(vec![
            element("a"),
            element("b"),
            element("c"),
            link("l", "a", "b"),
        ]);
        graph
            .set_target(Id::new("l"), Endpoint::cell(Id::new("c")), MutationOptions::default())
            .unwrap();

        assert!(graph.incoming(Id::new("b")).is_empty());
        assert_eq!(graph.incoming(Id::new("c")), ids(&["l"]));
    }

    #[test]
    fn test_remove_element_removes_links_and_descendants() {
        let mut graph = graph_with(vec![
            element("parent"),
            element("child"),
            element("other"),
            link("l", "child", "other"),
        ]);
        graph
            .embed(Id::new("parent"), Id::new("child"), MutationOptions::default())
            .unwrap();

        let removed = graph
            .remove_cell(Id::new("parent"), MutationOptions::default())
            .unwrap();

        assert_eq!(removed, ids(&["l", "child", "parent"]));
        assert_eq!(graph.len(), 1);
        assert!(graph.incoming(Id::new("other")).is_empty());
    }

    #[test]
    fn test_remove_keep_links_disconnects() {
        let mut graph = graph_with(vec![element("a"), element("b"), link("l", "a", "b")]);
        graph
            .remove_cell_keep_links(Id::new("a"), MutationOptions::default())
            .unwrap();

        let link = graph.cell(Id::new("l")).unwrap().as_link().unwrap();
        assert_eq!(link.source().as_point(), Some(Point::default()));
        assert!(graph.outgoing(Id::new("a")).is_empty());
        assert_eq!(graph.incoming(Id::new("b")), ids(&["l"]));
    }

    #[test]
    fn test_remove_child_updates_parent_embeds() {
        let mut graph = graph_with(vec![element("p"), element("c")]);
        graph
            .embed(Id::new("p"), Id::new("c"), MutationOptions::default())
            .unwrap();
        graph.remove_cell(Id::new("c"), MutationOptions::default()).unwrap();

        assert!(graph.cell(Id::new("p")).unwrap().embeds().is_empty());
    }

    #[test]
    fn test_embed_rules() {
        let mut graph = graph_with(vec![element("a"), element("b"), element("c")]);
        let opts = MutationOptions::default();
        graph.embed(Id::new("a"), Id::new("b"), opts).unwrap();
        graph.embed(Id::new("b"), Id::new("c"), opts).unwrap();

        assert!(matches!(
            graph.embed(Id::new("a"), Id::new("a"), opts),
            Err(PlexusError::InvalidEmbedding { .. })
        ));
        assert!(matches!(
            graph.embed(Id::new("c"), Id::new("a"), opts),
            Err(PlexusError::InvalidEmbedding { .. })
        ));
        assert!(graph.is_embedded_in(Id::new("c"), Id::new("a"), true));
        assert!(!graph.is_embedded_in(Id::new("c"), Id::new("a"), false));
        assert_eq!(graph.ancestors(Id::new("c")), ids(&["b", "a"]));
    }

    #[test]
    fn test_reembed_moves_child() {
        let mut graph = graph_with(vec![element("a"), element("b"), element("c")]);
        let opts = MutationOptions::default();
        graph.embed(Id::new("a"), Id::new("c"), opts).unwrap();
        graph.embed(Id::new("b"), Id::new("c"), opts).unwrap();

        assert!(graph.cell(Id::new("a")).unwrap().embeds().is_empty());
        assert_eq!(graph.cell(Id::new("b")).unwrap().embeds(), ids(&["c"]).as_slice());
        assert_eq!(graph.cell(Id::new("c")).unwrap().parent(), Some(Id::new("b")));
    }

    #[test]
    fn test_unembed_requires_relation() {
        let mut graph = graph_with(vec![element("a"), element("b")]);
        assert!(matches!(
            graph.unembed(Id::new("a"), Id::new("b"), MutationOptions::default()),
            Err(PlexusError::InvalidEmbedding { .. })
        ));
    }

    #[test]
    fn test_embedded_cells_order() {
        let mut graph = graph_with(vec![
            element("root"),
            element("a"),
            element("b"),
            element("a1"),
        ]);
        let opts = MutationOptions::default();
        graph.embed(Id::new("root"), Id::new("a"), opts).unwrap();
        graph.embed(Id::new("root"), Id::new("b"), opts).unwrap();
        graph.embed(Id::new("a"), Id::new("a1"), opts).unwrap();

        let root = Id::new("root");
        assert_eq!(graph.embedded_cells(root, EmbeddedQuery::default()), ids(&["a", "b"]));
        assert_eq!(
            graph.embedded_cells(
                root,
                EmbeddedQuery {
                    deep: true,
                    breadth_first: false
                }
            ),
            ids(&["a", "a1", "b"])
        );
        assert_eq!(
            graph.embedded_cells(
                root,
                EmbeddedQuery {
                    deep: true,
                    breadth_first: true
                }
            ),
            ids(&["a", "b", "a1"])
        );
    }

    #[test]
    fn test_connected_links_deep() {
        let mut graph = graph_with(vec![
            element("p"),
            element("c"),
            element("x"),
            link("inner", "c", "x"),
            link("outer", "x", "p"),
            link("both", "p", "c"),
        ]);
        graph
            .embed(Id::new("p"), Id::new("c"), MutationOptions::default())
            .unwrap();

        let p = Id::new("p");
        assert_eq!(graph.connected_links(p, LinkQuery::all()), ids(&["both", "outer"]));
        assert_eq!(graph.connected_links(p, LinkQuery::inbound()), ids(&["outer"]));
        assert_eq!(
            graph.connected_links(p, LinkQuery::all().deep()),
            ids(&["both", "outer", "inner"])
        );
    }

    #[test]
    fn test_clone_subtree() {
        let mut graph = graph_with(vec![
            element("p"),
            element("c"),
            element("outside"),
            link("l", "c", "outside"),
        ]);
        let opts = MutationOptions::default();
        graph.embed(Id::new("p"), Id::new("c"), opts).unwrap();
        graph.embed(Id::new("p"), Id::new("l"), opts).unwrap();

        let clones = graph.clone_subtree(Id::new("p")).unwrap();
        assert_eq!(clones.len(), 3);

        let root = &clones[0];
        assert_ne!(root.id(), Id::new("p"));
        assert_eq!(root.parent(), None);
        assert_eq!(root.embeds(), &[clones[1].id(), clones[2].id()]);

        let child = &clones[1];
        assert_eq!(child.parent(), Some(root.id()));

        let link = clones[2].as_link().unwrap();
        assert_eq!(link.source().cell_id(), Some(child.id()));
        assert_eq!(link.target().cell_id(), Some(Id::new("outside")));
    }

    #[test]
    fn test_change_events() {
        let mut graph = graph_with(vec![element("a")]);
        let all = recorder(&mut graph, "change");
        let position = recorder(&mut graph, "change:position");

        graph
            .translate(Id::new("a"), 5.0, 0.0, MutationOptions::default())
            .unwrap();
        graph
            .set_attr(Id::new("a"), "rect/fill", json!("red"), MutationOptions::default())
            .unwrap();
        graph
            .translate(Id::new("a"), 5.0, 0.0, MutationOptions::silent())
            .unwrap();

        assert_eq!(*all.borrow(), vec!["change:position:a", "change:attrs:a"]);
        assert_eq!(*position.borrow(), vec!["change:position:a"]);
    }

    #[test]
    fn test_hold_and_release() {
        let mut graph = Graph::new();
        let log = recorder(&mut graph, "all");

        graph.hold_events();
        graph.add_cell(element("a"), MutationOptions::default()).unwrap();
        graph.add_cell(element("b"), MutationOptions::silent()).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(graph.queued_events().len(), 2);

        assert_eq!(graph.release_events(), 1);
        assert_eq!(*log.borrow(), vec!["add:a"]);
        assert!(graph.queued_events().is_empty());
    }

    #[test]
    fn test_rollback_restores_cells_and_drops_events() {
        let mut graph = graph_with(vec![element("a"), element("b")]);
        let log = recorder(&mut graph, "all");
        let checkpoint = graph.checkpoint();

        graph.hold_events();
        graph.add_cell(link("l", "a", "b"), MutationOptions::default()).unwrap();
        graph
            .translate(Id::new("a"), 10.0, 0.0, MutationOptions::default())
            .unwrap();
        assert_eq!(graph.rollback(checkpoint), 2);

        assert!(!graph.contains(Id::new("l")));
        assert!(graph.outgoing(Id::new("a")).is_empty());
        assert_eq!(graph.cell(Id::new("a")).unwrap().position(), Some(Point::new(0.0, 0.0)));
        assert_eq!(graph.release_events(), 0);
        assert!(log.borrow().is_empty());

        graph.translate(Id::new("a"), 1.0, 0.0, MutationOptions::default()).unwrap();
        assert_eq!(*log.borrow(), vec!["change:position:a"]);
    }

    #[test]
    fn test_clear_removes_links_first() {
        let mut graph = graph_with(vec![element("a"), element("b"), link("l", "a", "b")]);
        let log = recorder(&mut graph, "all");
        graph.clear(MutationOptions::default()).unwrap();

        assert!(graph.is_empty());
        assert_eq!(*log.borrow(), vec!["reset:"]);
    }

    #[test]
    fn test_z_order() {
        let mut graph = graph_with(vec![
            element("a").with_z(1),
            element("b").with_z(2),
            element("c").with_z(3),
        ]);
        let opts = MutationOptions::default();

        assert_eq!(graph.to_front(Id::new("c"), opts).unwrap(), None);
        graph.to_front(Id::new("a"), opts).unwrap();
        assert_eq!(graph.cell(Id::new("a")).unwrap().z(), 4);
        graph.to_back(Id::new("c"), opts).unwrap();
        assert_eq!(graph.cell(Id::new("c")).unwrap().z(), 1);
        assert_eq!(graph.min_z(), 1);
        assert_eq!(graph.max_z(), 4);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    const NODES: [&str; 4] = ["n0", "n1", "n2", "n3"];
    const LINKS: [&str; 4] = ["l0", "l1", "l2", "l3"];

    #[derive(Debug, Clone)]
    enum Op {
        AddLink(usize, usize, usize),
        RemoveLink(usize),
        Reconnect(usize, bool, usize),
        Detach(usize, bool),
        RemoveNode(usize),
        AddNode(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4usize, 0..4usize, 0..4usize).prop_map(|(l, s, t)| Op::AddLink(l, s, t)),
            (0..4usize).prop_map(Op::RemoveLink),
            (0..4usize, any::<bool>(), 0..4usize).prop_map(|(l, e, n)| Op::Reconnect(l, e, n)),
            (0..4usize, any::<bool>()).prop_map(|(l, e)| Op::Detach(l, e)),
            (0..4usize).prop_map(Op::RemoveNode),
            (0..4usize).prop_map(Op::AddNode),
        ]
    }

    fn end(source: bool) -> LinkEnd {
        if source { LinkEnd::Source } else { LinkEnd::Target }
    }

    fn apply(graph: &mut Graph, op: Op) {
        let opts = MutationOptions::default();
        // Operations on missing cells fail; those failures are part of the
        // sequence and must leave the index consistent too.
        let _ = match op {
            Op::AddLink(l, s, t) => graph
                .add_cell(
                    Cell::link(
                        Endpoint::cell(Id::new(NODES[s])),
                        Endpoint::cell(Id::new(NODES[t])),
                    )
                    .with_id(Id::new(LINKS[l])),
                    opts,
                )
                .map(|_| ()),
            Op::RemoveLink(l) => graph.remove_cell(Id::new(LINKS[l]), opts).map(|_| ()),
            Op::Reconnect(l, source, n) => graph
                .set_end(Id::new(LINKS[l]), end(source), Endpoint::cell(Id::new(NODES[n])), opts)
                .map(|_| ()),
            Op::Detach(l, source) => graph
                .disconnect(Id::new(LINKS[l]), end(source), Point::new(1.0, 1.0), opts)
                .map(|_| ()),
            Op::RemoveNode(n) => graph.remove_cell(Id::new(NODES[n]), opts).map(|_| ()),
            Op::AddNode(n) => graph
                .add_cell(Cell::element("basic.Rect").with_id(Id::new(NODES[n])), opts)
                .map(|_| ()),
        };
    }

    fn check_adjacency_consistent(ops: Vec<Op>) -> Result<(), TestCaseError> {
        let mut graph = Graph::new();
        for name in NODES {
            graph
                .add_cell(
                    Cell::element("basic.Rect").with_id(Id::new(name)),
                    MutationOptions::default(),
                )
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
        for op in ops {
            apply(&mut graph, op);

            for node in NODES.map(Id::new) {
                let expected_out: Vec<Id> = graph
                    .links()
                    .filter(|l| l.as_link().and_then(|d| d.source().cell_id()) == Some(node))
                    .map(Cell::id)
                    .collect();
                let expected_in: Vec<Id> = graph
                    .links()
                    .filter(|l| l.as_link().and_then(|d| d.target().cell_id()) == Some(node))
                    .map(Cell::id)
                    .collect();
                let mut actual_out = graph.outgoing(node);
                let mut actual_in = graph.incoming(node);
                let mut expected_out = expected_out;
                let mut expected_in = expected_in;
                for list in [&mut actual_out, &mut actual_in, &mut expected_out, &mut expected_in] {
                    list.sort_by_key(|id| id.to_string());
                }
                prop_assert_eq!(actual_out, expected_out);
                prop_assert_eq!(actual_in, expected_in);
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn adjacency_matches_endpoints(ops in prop::collection::vec(op(), 1..30)) {
            check_adjacency_consistent(ops)?;
        }
    }
}
