//! Selection management.
//!
//! Every update is diffed against the current selection: cells leaving it
//! get exactly one `Unfocus`, cells entering it exactly one `Focus`, and
//! cells that stay get nothing.

use indexmap::IndexSet;
use log::trace;

use plexus_core::identifier::Id;

use super::{Event, EventKind, Graph};
use crate::{error::PlexusError, model::MutationOptions};

impl Graph {
    /// Selected cell ids in selection order.
    pub fn selection(&self) -> &[Id] {
        &self.selection
    }

    pub fn is_selected(&self, id: Id) -> bool {
        self.selection.contains(&id)
    }

    /// Makes `id` the only selected cell.
    pub fn focus(&mut self, id: Id, opts: MutationOptions) -> Result<(), PlexusError> {
        self.update_selection(vec![id], opts)
    }

    /// Removes `id` from the selection.
    pub fn unfocus(&mut self, id: Id, opts: MutationOptions) -> Result<(), PlexusError> {
        let remaining: Vec<Id> = self
            .selection
            .iter()
            .copied()
            .filter(|selected| *selected != id)
            .collect();
        self.update_selection(remaining, opts)
    }

    /// Clears the selection, keeping `except` selected when it already is.
    pub fn cancel_selection(&mut self, except: Option<Id>, opts: MutationOptions) -> Result<(), PlexusError> {
        let kept: Vec<Id> = except
            .filter(|id| self.selection.contains(id))
            .into_iter()
            .collect();
        self.update_selection(kept, opts)
    }

    /// Replaces the selection with `ids`.
    pub fn update_selection(
        &mut self,
        ids: impl IntoIterator<Item = Id>,
        opts: MutationOptions,
    ) -> Result<(), PlexusError> {
        let next: IndexSet<Id> = ids.into_iter().collect();
        if let Some(unknown) = next.iter().find(|id| !self.contains(**id)) {
            return Err(PlexusError::UnknownCell(*unknown));
        }
        let previous: IndexSet<Id> = self.selection.iter().copied().collect();

        let removed: Vec<Id> = previous.difference(&next).copied().collect();
        let added: Vec<Id> = next.difference(&previous).copied().collect();
        self.selection = next.into_iter().collect();

        for id in removed {
            self.set_selected(id, false);
            self.emit(Event::new(EventKind::Unfocus, id), opts);
        }
        for id in added {
            self.set_selected(id, true);
            self.emit(Event::new(EventKind::Focus, id), opts);
        }
        trace!(size = self.selection.len(); "Selection updated");
        Ok(())
    }

    fn set_selected(&mut self, id: Id, selected: bool) {
        if let Some(element) = self.cells.get_mut(&id).and_then(|cell| cell.as_element_mut()) {
            element.selected = selected;
        }
    }
}
