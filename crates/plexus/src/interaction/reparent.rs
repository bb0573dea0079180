//! Reparenting dropped elements.
//!
//! Positions are relative to the parent's anchor, so moving an element in
//! or out of a parent rewrites its position to keep it in place on the
//! paper.

use std::collections::HashSet;

use log::debug;
use serde_json::Value;

use plexus_core::{geometry::Point, identifier::Id};

use crate::{
    error::PlexusError,
    graph::{EmbeddedQuery, Graph},
    model::MutationOptions,
    view::{Paper, element_view::absolute_position},
};

/// The element `dragged` should be embedded into after a drop.
///
/// Candidates are top-level elements outside the dragged subtree whose box
/// contains the dragged box; the one with the smallest horizontal offset
/// from the dragged element wins.
pub fn find_drop_target(graph: &Graph, paper: &Paper, dragged: Id) -> Option<Id> {
    let dragged_bbox = paper.element_view(dragged)?.rotated_bbox();
    let mut subtree: HashSet<Id> = graph
        .embedded_cells(
            dragged,
            EmbeddedQuery {
                deep: true,
                breadth_first: false,
            },
        )
        .into_iter()
        .collect();
    subtree.insert(dragged);

    graph
        .elements()
        .filter(|cell| cell.parent().is_none() && !subtree.contains(&cell.id()))
        .filter_map(|cell| paper.element_view(cell.id()))
        .filter(|view| view.rotated_bbox().contains_bounds(&dragged_bbox))
        .map(|view| (view.id(), (view.rotated_bbox().min_x() - dragged_bbox.min_x()).abs()))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id)
}

/// Embeds `child` into `parent` without moving it on the paper.
pub fn embed_in_place(
    graph: &mut Graph,
    parent: Id,
    child: Id,
    opts: MutationOptions,
) -> Result<(), PlexusError> {
    let absolute = graph
        .get_cell(child)
        .filter(|cell| cell.is_element())
        .map(|cell| absolute_position(graph, cell));
    graph.embed(parent, child, opts)?;
    if let Some(absolute) = absolute {
        let anchor = absolute_position(graph, graph.cell(parent)?);
        set_position(graph, child, absolute.sub_point(anchor), opts)?;
    }
    Ok(())
}

/// Detaches `child` from `parent` without moving it on the paper.
pub fn unembed_in_place(
    graph: &mut Graph,
    parent: Id,
    child: Id,
    opts: MutationOptions,
) -> Result<(), PlexusError> {
    let absolute = graph
        .get_cell(child)
        .filter(|cell| cell.is_element())
        .map(|cell| absolute_position(graph, cell));
    graph.unembed(parent, child, opts)?;
    if let Some(absolute) = absolute {
        set_position(graph, child, absolute, opts)?;
    }
    Ok(())
}

/// Moves `dragged` under `target`, or to the top level when `target` is
/// `None`. Returns whether the parent changed.
pub fn reparent(
    graph: &mut Graph,
    dragged: Id,
    target: Option<Id>,
    opts: MutationOptions,
) -> Result<bool, PlexusError> {
    let current = graph.cell(dragged)?.parent();
    match (target, current) {
        (Some(target), Some(current)) if target == current => Ok(false),
        (Some(target), _) => {
            embed_in_place(graph, target, dragged, opts)?;
            debug!(parent = target.to_string(), child = dragged.to_string(); "Dropped into parent");
            Ok(true)
        }
        (None, Some(current)) => {
            unembed_in_place(graph, current, dragged, opts)?;
            debug!(parent = current.to_string(), child = dragged.to_string(); "Dropped out of parent");
            Ok(true)
        }
        (None, None) => Ok(false),
    }
}

fn set_position(
    graph: &mut Graph,
    id: Id,
    position: Point,
    opts: MutationOptions,
) -> Result<(), PlexusError> {
    let value: Value = serde_json::to_value(position)?;
    graph.set_prop(id, "position", value, opts)?;
    Ok(())
}
