//! View geometry for every cell of a graph.
//!
//! The [`Paper`] keeps one [`ElementView`] per element and one [`LinkView`]
//! per link, and brings them up to date from the events a mutation queued.
//! Each call to [`Paper::apply`] is one update pass: elements are
//! recomputed first, then every affected link at most once.

pub mod connector;
pub mod element_view;
pub mod label;
pub mod link_view;
pub mod router;
pub mod surface;

pub use element_view::ElementView;
pub use link_view::LinkView;
pub use surface::{MagnetOutline, MagnetShape, MarkerGeometry, Surface, TemplateSurface};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use plexus_core::{geometry::Point, identifier::Id};

use crate::{
    config::PaperConfig,
    error::PlexusError,
    graph::{EmbeddedQuery, Event, EventKind, Graph, LinkQuery},
    interaction::Viewport,
    model::{Cell, LinkEnd},
    registry::{ShapeRegistry, StrategyRegistry, markup_has_class},
};
use link_view::LinkContext;

/// Element properties whose change moves or reshapes the element.
const ELEMENT_GEOMETRY: [&str; 6] = ["position", "size", "angle", "attrs", "parent", "type"];

/// Identifies one run of [`Paper::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdatePass(u64);

impl UpdatePass {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What views are computed from.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub graph: &'a Graph,
    pub shapes: &'a ShapeRegistry,
    pub surface: &'a dyn Surface,
}

/// The geometry cache of a graph.
#[derive(Debug, Default)]
pub struct Paper {
    config: PaperConfig,
    viewport: Viewport,
    strategies: StrategyRegistry,
    elements: IndexMap<Id, ElementView>,
    links: IndexMap<Id, LinkView>,
    next_pass: u64,
}

impl Paper {
    pub fn new(config: PaperConfig, strategies: StrategyRegistry) -> Self {
        Self {
            config,
            strategies,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PaperConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    pub fn strategies_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.strategies
    }

    pub fn element_view(&self, id: Id) -> Option<&ElementView> {
        self.elements.get(&id)
    }

    pub fn link_view(&self, id: Id) -> Option<&LinkView> {
        self.links.get(&id)
    }

    pub fn element_views(&self) -> impl Iterator<Item = &ElementView> {
        self.elements.values()
    }

    pub fn link_views(&self) -> impl Iterator<Item = &LinkView> {
        self.links.values()
    }

    /// Converts a pointer position into paper-local coordinates.
    pub fn client_to_local(&self, p: Point) -> Point {
        self.viewport.client_to_local(p)
    }

    pub fn local_to_client(&self, p: Point) -> Point {
        self.viewport.local_to_client(p)
    }

    /// Brings the views up to date with `events` in a new update pass.
    ///
    /// A `Reset` among the events rebuilds every view. Otherwise elements
    /// that were added or changed geometry are recomputed together with
    /// everything embedded in them; their connected links get the touching
    /// ends marked dirty. Each affected link is then updated once, however
    /// many of its ends moved.
    ///
    /// # Errors
    ///
    /// Fails with `Construction` when a link's markup lacks a `.connection`
    /// element and with `UnknownStrategy` when a link names an unregistered
    /// router or connector. The other affected links are still updated;
    /// the first error is returned.
    pub fn apply(&mut self, ctx: &RenderContext<'_>, events: &[Event]) -> Result<UpdatePass, PlexusError> {
        let pass = self.begin_pass();
        if events.iter().any(|event| event.kind == EventKind::Reset) {
            self.rebuild(ctx, pass)?;
            return Ok(pass);
        }

        let graph = ctx.graph;
        let mut elements: IndexSet<Id> = IndexSet::new();
        let mut links: IndexSet<Id> = IndexSet::new();
        for event in events {
            let Some(id) = event.cell else {
                continue;
            };
            match &event.kind {
                EventKind::Add => match graph.get_cell(id) {
                    Some(cell) if cell.is_link() => {
                        links.insert(id);
                    }
                    Some(_) => {
                        elements.insert(id);
                    }
                    None => {}
                },
                EventKind::Remove => {
                    self.elements.shift_remove(&id);
                    self.links.shift_remove(&id);
                    elements.shift_remove(&id);
                    links.shift_remove(&id);
                }
                EventKind::Change(field) if field == "z" => self.restack(graph, id),
                EventKind::Change(field) => match graph.get_cell(id) {
                    Some(cell) if cell.is_link() => {
                        links.insert(id);
                    }
                    Some(_) if ELEMENT_GEOMETRY.contains(&field.as_str()) => {
                        elements.insert(id);
                    }
                    _ => {}
                },
                EventKind::Focus | EventKind::Unfocus | EventKind::Reset => {}
            }
        }

        let roots: Vec<Id> = elements.iter().copied().collect();
        for root in roots {
            let descendants = graph.embedded_cells(
                root,
                EmbeddedQuery {
                    deep: true,
                    breadth_first: false,
                },
            );
            for id in descendants {
                match graph.get_cell(id) {
                    Some(cell) if cell.is_link() => {
                        links.insert(id);
                    }
                    Some(_) => {
                        elements.insert(id);
                    }
                    None => {}
                }
            }
        }

        let mut first_error = None;
        let mut requests = Vec::new();
        for id in &elements {
            let Some(cell) = graph.get_cell(*id) else {
                continue;
            };
            let template = ctx.shapes.template_for(cell);
            if let Some(view) = ElementView::compute(graph, cell, &template) {
                self.elements.insert(*id, view);
            }
            for link_id in graph.connected_links(*id, LinkQuery::all()) {
                let Some(link_cell) = graph.get_cell(link_id) else {
                    continue;
                };
                let Some(link) = link_cell.as_link() else {
                    continue;
                };
                let view = match self.ensure_link_view(ctx, link_cell) {
                    Ok(view) => view,
                    Err(err) => {
                        first_error.get_or_insert(err);
                        continue;
                    }
                };
                for end in [LinkEnd::Source, LinkEnd::Target] {
                    if link.end(end).cell_id() == Some(*id) {
                        view.mark_dirty(end);
                    }
                }
                requests.push(link_id);
            }
        }
        for id in &links {
            let Some(cell) = graph.get_cell(*id) else {
                continue;
            };
            let view = match self.ensure_link_view(ctx, cell) {
                Ok(view) => view,
                Err(err) => {
                    first_error.get_or_insert(err);
                    continue;
                }
            };
            view.mark_dirty(LinkEnd::Source);
            view.mark_dirty(LinkEnd::Target);
            requests.push(*id);
        }

        let mut updated = 0;
        for id in requests {
            match self.update_link(ctx, id, pass) {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        trace!(
            pass = pass.0,
            elements = elements.len(),
            links = updated;
            "Update pass finished"
        );
        first_error.map_or(Ok(pass), Err)
    }

    /// Recomputes every view from scratch.
    pub fn render_all(&mut self, ctx: &RenderContext<'_>) -> Result<UpdatePass, PlexusError> {
        let pass = self.begin_pass();
        self.rebuild(ctx, pass)?;
        Ok(pass)
    }

    fn begin_pass(&mut self) -> UpdatePass {
        self.next_pass += 1;
        UpdatePass(self.next_pass)
    }

    fn rebuild(&mut self, ctx: &RenderContext<'_>, pass: UpdatePass) -> Result<(), PlexusError> {
        self.elements.clear();
        self.links.clear();
        for cell in ctx.graph.elements() {
            let template = ctx.shapes.template_for(cell);
            if let Some(view) = ElementView::compute(ctx.graph, cell, &template) {
                self.elements.insert(cell.id(), view);
            }
        }
        let mut first_error = None;
        let links: Vec<&Cell> = ctx.graph.links().collect();
        for cell in &links {
            if let Err(err) = self.ensure_link_view(ctx, cell) {
                first_error.get_or_insert(err);
            }
        }
        for cell in &links {
            if let Err(err) = self.update_link(ctx, cell.id(), pass) {
                first_error.get_or_insert(err);
            }
        }
        debug!(
            elements = self.elements.len(),
            links = self.links.len();
            "Views rebuilt"
        );
        first_error.map_or(Ok(()), Err)
    }

    /// The view of a link, created on first use.
    fn ensure_link_view(&mut self, ctx: &RenderContext<'_>, cell: &Cell) -> Result<&mut LinkView, PlexusError> {
        let template = ctx.shapes.template_for(cell);
        let own_markup = cell.prop("markup");
        let markup = own_markup
            .as_ref()
            .and_then(|value| value.as_str())
            .unwrap_or(template.markup());
        if !markup_has_class(markup, "connection") {
            return Err(PlexusError::Construction {
                cell: cell.id(),
                reason: "link markup has no `.connection` element".to_string(),
            });
        }
        Ok(self
            .links
            .entry(cell.id())
            .or_insert_with(|| LinkView::new(cell.id(), cell.z())))
    }

    fn update_link(&mut self, ctx: &RenderContext<'_>, id: Id, pass: UpdatePass) -> Result<bool, PlexusError> {
        let Some(cell) = ctx.graph.get_cell(id) else {
            return Ok(false);
        };
        let Self {
            config,
            strategies,
            elements,
            links,
            ..
        } = self;
        let Some(view) = links.get_mut(&id) else {
            return Ok(false);
        };
        let link_ctx = LinkContext {
            render: ctx,
            elements,
            strategies,
            config,
        };
        view.update(&link_ctx, cell, pass)
    }

    fn restack(&mut self, graph: &Graph, id: Id) {
        let Some(z) = graph.get_cell(id).map(Cell::z) else {
            return;
        };
        if let Some(view) = self.elements.get_mut(&id) {
            view.set_z(z);
        }
        if let Some(view) = self.links.get_mut(&id) {
            view.set_z(z);
        }
    }
}
