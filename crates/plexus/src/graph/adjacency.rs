//! Node/edge index over the cell set.
//!
//! Nodes are element ids and edges are link ids. Each edge remembers the
//! element ids its endpoints reference (a free point has none), and every
//! node keeps the ordered sets of its incoming and outgoing edges. Edges may
//! reference ids that are not (or no longer) nodes.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use plexus_core::identifier::Id;

/// The element ids referenced by a link's source and target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EdgeEnds {
    pub source: Option<Id>,
    pub target: Option<Id>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Adjacency {
    nodes: IndexSet<Id>,
    edges: IndexMap<Id, EdgeEnds>,
    incoming: HashMap<Id, IndexSet<Id>>,
    outgoing: HashMap<Id, IndexSet<Id>>,
}

impl Adjacency {
    pub(crate) fn add_node(&mut self, id: Id) {
        self.nodes.insert(id);
    }

    /// Removes a node. Edges that reference it keep their ends.
    pub(crate) fn remove_node(&mut self, id: Id) {
        self.nodes.shift_remove(&id);
    }

    /// Inserts or reconnects an edge.
    pub(crate) fn set_edge(&mut self, id: Id, ends: EdgeEnds) {
        if let Some(previous) = self.edges.get(&id).copied() {
            if previous == ends {
                return;
            }
            self.detach(id, previous);
        }
        if let Some(source) = ends.source {
            self.outgoing.entry(source).or_default().insert(id);
        }
        if let Some(target) = ends.target {
            self.incoming.entry(target).or_default().insert(id);
        }
        self.edges.insert(id, ends);
    }

    pub(crate) fn remove_edge(&mut self, id: Id) {
        if let Some(ends) = self.edges.shift_remove(&id) {
            self.detach(id, ends);
        }
    }

    fn detach(&mut self, id: Id, ends: EdgeEnds) {
        if let Some(source) = ends.source {
            remove_from(&mut self.outgoing, source, id);
        }
        if let Some(target) = ends.target {
            remove_from(&mut self.incoming, target, id);
        }
    }

    /// Links whose source references `node`, in connection order.
    pub(crate) fn outgoing(&self, node: Id) -> impl Iterator<Item = Id> + '_ {
        self.outgoing.get(&node).into_iter().flatten().copied()
    }

    /// Links whose target references `node`, in connection order.
    pub(crate) fn incoming(&self, node: Id) -> impl Iterator<Item = Id> + '_ {
        self.incoming.get(&node).into_iter().flatten().copied()
    }

    /// Nodes at the far end of `node`'s links, deduplicated. A loop makes a
    /// node its own neighbor.
    pub(crate) fn neighbors(&self, node: Id) -> Vec<Id> {
        let far = self
            .outgoing(node)
            .filter_map(|edge| self.edges.get(&edge)?.target)
            .chain(
                self.incoming(node)
                    .filter_map(|edge| self.edges.get(&edge)?.source),
            );
        far.collect::<IndexSet<Id>>().into_iter().collect()
    }

    /// Nodes without incoming edges.
    pub(crate) fn sources(&self) -> impl Iterator<Item = Id> + '_ {
        self.nodes
            .iter()
            .copied()
            .filter(|node| self.incoming(*node).next().is_none())
    }

    /// Nodes without outgoing edges.
    pub(crate) fn sinks(&self) -> impl Iterator<Item = Id> + '_ {
        self.nodes
            .iter()
            .copied()
            .filter(|node| self.outgoing(*node).next().is_none())
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.incoming.clear();
        self.outgoing.clear();
    }
}

fn remove_from(map: &mut HashMap<Id, IndexSet<Id>>, node: Id, edge: Id) {
    if let Some(set) = map.get_mut(&node) {
        set.shift_remove(&edge);
        if set.is_empty() {
            map.remove(&node);
        }
    }
}
