//! Pointer input turned into scene mutations.
//!
//! [`Interaction`] is a small state machine fed with pointer positions in
//! client coordinates. It hit-tests the paper on press, mutates the scene
//! while the pointer moves and commits on release.

pub mod hit;
pub mod lasso;
pub mod reparent;
pub mod viewport;

pub use hit::{Hit, MagnetCandidate, element_at, hit_test};
pub use viewport::Viewport;

use log::{debug, trace};

use plexus_core::{
    geometry::{Point, Size, snap_to_grid},
    identifier::Id,
};

use crate::{
    error::PlexusError,
    graph::Graph,
    model::{Cell, Endpoint, LabelPosition, LinkEnd},
    scene::Scene,
};

/// What the pointer is currently doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    DraggingElement {
        id: Id,
        /// Pointer position the last applied delta was measured from.
        last: Point,
        moved: bool,
    },
    DraggingLinkEndpoint {
        link: Id,
        end: LinkEnd,
        /// The end as it was when the gesture started.
        original: Endpoint,
        /// The magnet the end currently snaps to.
        snapped: Option<Endpoint>,
        moved: bool,
    },
    ResizingElement {
        id: Id,
    },
    LassoSelecting {
        origin: Point,
        current: Point,
    },
    MovingLabel {
        link: Id,
        index: usize,
    },
}

/// Decides whether a link end may attach to `endpoint`.
pub trait ConnectionValidator {
    fn validate(&self, graph: &Graph, link: Id, end: LinkEnd, endpoint: &Endpoint) -> bool;
}

/// Accepts any existing element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementsOnly;

impl ConnectionValidator for ElementsOnly {
    fn validate(&self, graph: &Graph, _link: Id, _end: LinkEnd, endpoint: &Endpoint) -> bool {
        endpoint
            .cell_id()
            .and_then(|id| graph.get_cell(id))
            .is_some_and(Cell::is_element)
    }
}

/// The pointer state machine.
pub struct Interaction {
    state: InputState,
    validator: Box<dyn ConnectionValidator>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(ElementsOnly)
    }
}

impl Interaction {
    pub fn new(validator: impl ConnectionValidator + 'static) -> Self {
        Self {
            state: InputState::Idle,
            validator: Box::new(validator),
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Abandons the current gesture. Mutations already applied stay.
    pub fn cancel(&mut self) {
        trace!(state:? = self.state; "Gesture cancelled");
        self.state = InputState::Idle;
    }

    pub fn on_pointer_down(&mut self, scene: &mut Scene, client: Point) -> Result<(), PlexusError> {
        let p = scene.paper().client_to_local(client);
        let hit = hit_test(&scene.render_context(), scene.paper(), p);
        trace!(x = p.x(), y = p.y(), hit:? = hit; "Pointer down");

        self.state = match hit {
            Some(Hit::ResizeHandle(id)) => InputState::ResizingElement { id },
            Some(Hit::Magnet {
                element,
                selector,
                port,
                magnet: true,
            }) if scene.config().link_from_magnets() => {
                let source = match port {
                    Some(port) => Endpoint::port(element, port),
                    None => Endpoint::selector(element, selector),
                };
                let link = scene.add_cell(Cell::link(source, Endpoint::point(p)))?;
                debug!(link = link.to_string(), element = element.to_string(); "Link started from magnet");
                InputState::DraggingLinkEndpoint {
                    link,
                    end: LinkEnd::Target,
                    original: Endpoint::point(p),
                    snapped: None,
                    moved: false,
                }
            }
            Some(Hit::Magnet { element: id, .. }) | Some(Hit::Element(id)) => {
                if !scene.graph().is_selected(id) {
                    scene.focus(id)?;
                }
                InputState::DraggingElement {
                    id,
                    last: p,
                    moved: false,
                }
            }
            Some(Hit::Arrowhead { link, end }) => {
                let original = scene
                    .graph()
                    .get_cell(link)
                    .and_then(Cell::as_link)
                    .map(|data| data.end(end).clone())
                    .unwrap_or_default();
                InputState::DraggingLinkEndpoint {
                    link,
                    end,
                    original,
                    snapped: None,
                    moved: false,
                }
            }
            Some(Hit::Label { link, index }) => InputState::MovingLabel { link, index },
            Some(Hit::Link(_)) => InputState::Idle,
            None => {
                scene.cancel_selection(None)?;
                InputState::LassoSelecting { origin: p, current: p }
            }
        };
        trace!(state:? = self.state; "State entered");
        Ok(())
    }

    pub fn on_pointer_move(&mut self, scene: &mut Scene, client: Point) -> Result<(), PlexusError> {
        let p = scene.paper().client_to_local(client);
        let Self { state, validator } = self;
        match state {
            InputState::Idle => {}
            InputState::DraggingElement { id, last, moved } => {
                let grid = scene.config().grid_size();
                let dx = snap_to_grid(p.x() - last.x(), grid);
                let dy = snap_to_grid(p.y() - last.y(), grid);
                if dx == 0.0 && dy == 0.0 {
                    return Ok(());
                }
                let targets = drag_targets(scene.graph(), *id);
                scene.mutate(|graph| {
                    for target in &targets {
                        graph.translate(*target, dx, dy, Default::default())?;
                    }
                    Ok(())
                })?;
                *last = last.offset(dx, dy);
                *moved = true;
                trace!(cell = id.to_string(), dx = dx, dy = dy; "Dragged");
            }
            InputState::DraggingLinkEndpoint {
                link,
                end,
                snapped,
                moved,
                ..
            } => {
                let found = snap_target(validator.as_ref(), scene, *link, *end, p);
                let endpoint = found.clone().unwrap_or_else(|| Endpoint::point(p));
                scene.set_end(*link, *end, endpoint)?;
                *snapped = found;
                *moved = true;
            }
            InputState::ResizingElement { id } => {
                let Some(view) = scene.paper().element_view(*id) else {
                    return Ok(());
                };
                let corner = p.snap_to_grid(scene.config().grid_size());
                let extent = corner.sub_point(view.bbox().min_point());
                let size = Size::new(extent.x().max(1.0), extent.y().max(1.0));
                scene.resize(*id, size)?;
            }
            InputState::LassoSelecting { current, .. } => {
                *current = p;
            }
            InputState::MovingLabel { link, index } => {
                let Some(position) = label_position_at(scene, *link, *index, p) else {
                    return Ok(());
                };
                scene.set_label_position(*link, *index, position)?;
            }
        }
        Ok(())
    }

    pub fn on_pointer_up(&mut self, scene: &mut Scene, client: Point) -> Result<(), PlexusError> {
        let p = scene.paper().client_to_local(client);
        let state = std::mem::take(&mut self.state);
        match state {
            InputState::DraggingElement { id, moved: true, .. } if scene.config().embedding_mode() => {
                scene.reparent_on_drop(id)?;
            }
            InputState::DraggingLinkEndpoint {
                link,
                original,
                moved: false,
                ..
            } if original.cell_id().is_some() => {
                trace!(link = link.to_string(); "Link end released in place");
            }
            InputState::DraggingLinkEndpoint {
                link,
                end,
                snapped: None,
                ..
            } => self.commit_free_end(scene, link, end, p)?,
            InputState::DraggingLinkEndpoint {
                link,
                snapped: Some(endpoint),
                ..
            } => {
                debug!(link = link.to_string(), cell:? = endpoint.cell_id(); "Link connected");
            }
            InputState::LassoSelecting { origin, .. } => {
                let selected = lasso::elements_in(scene.paper(), origin, p);
                debug!(count = selected.len(); "Lasso selection");
                scene.update_selection(selected)?;
            }
            InputState::ResizingElement { id } => {
                debug!(cell = id.to_string(); "Resized");
            }
            InputState::MovingLabel { link, index } => {
                debug!(link = link.to_string(), index = index; "Label moved");
            }
            InputState::DraggingElement { .. } | InputState::Idle => {}
        }
        trace!("State entered Idle");
        Ok(())
    }

    /// Releases a link end that is not snapped: it attaches to the element
    /// under the pointer, stays pinned, or the link goes away.
    fn commit_free_end(&self, scene: &mut Scene, link: Id, end: LinkEnd, p: Point) -> Result<(), PlexusError> {
        let under = element_at(&scene.render_context(), scene.paper(), p, None)
            .map(Endpoint::cell)
            .filter(|endpoint| self.validator.validate(scene.graph(), link, end, endpoint));
        match under {
            Some(endpoint) => {
                debug!(link = link.to_string(), cell:? = endpoint.cell_id(); "Link connected");
                scene.set_end(link, end, endpoint)
            }
            None if scene.config().link_pinning() => {
                debug!(link = link.to_string(), x = p.x(), y = p.y(); "Link end pinned");
                Ok(())
            }
            None => {
                debug!(link = link.to_string(); "Unconnected link removed");
                scene.remove_cell(link).map(|_| ())
            }
        }
    }
}

/// The nearest valid magnet within the snapping radius of `p`.
fn snap_target(
    validator: &dyn ConnectionValidator,
    scene: &Scene,
    link: Id,
    end: LinkEnd,
    p: Point,
) -> Option<Endpoint> {
    let radius = scene.config().snap_links_radius();
    if radius <= 0.0 {
        return None;
    }
    let ctx = scene.render_context();
    let paper = scene.paper();
    let mut best: Option<(f32, Endpoint)> = None;
    for view in paper.element_views() {
        if !view.bbox().inflate(radius).contains_point(p) {
            continue;
        }
        let element = view.id();
        let whole = std::iter::once((Endpoint::cell(element), view.bbox().center()));
        let magnets = hit::magnets(&ctx, paper, element).into_iter().map(|candidate| {
            let endpoint = match candidate.port {
                Some(port) => Endpoint::port(element, port),
                None => Endpoint::selector(element, candidate.selector),
            };
            (endpoint, candidate.shape.aabb().center())
        });
        for (endpoint, center) in whole.chain(magnets) {
            let distance = center.distance(p);
            let closer = best.as_ref().is_none_or(|(d, _)| distance < *d);
            if distance < radius
                && closer
                && validator.validate(scene.graph(), link, end, &endpoint)
            {
                best = Some((distance, endpoint));
            }
        }
    }
    best.map(|(_, endpoint)| endpoint)
}

/// Cells moved by dragging `id`: the whole selection when `id` is part of
/// a multi-selection, minus cells whose ancestor already moves them.
fn drag_targets(graph: &Graph, id: Id) -> Vec<Id> {
    let selection = graph.selection();
    if selection.len() < 2 || !selection.contains(&id) {
        return vec![id];
    }
    selection
        .iter()
        .copied()
        .filter(|selected| graph.get_cell(*selected).is_some_and(Cell::is_element))
        .filter(|selected| {
            !graph
                .ancestors(*selected)
                .iter()
                .any(|ancestor| selection.contains(ancestor))
        })
        .collect()
}

/// The label position whose anchor is the path sample nearest to `p`.
fn label_position_at(scene: &Scene, link: Id, index: usize, p: Point) -> Option<LabelPosition> {
    let view = scene.paper().link_view(link)?;
    let current = scene
        .graph()
        .get_cell(link)?
        .as_link()?
        .labels()
        .get(index)?
        .position;
    let nearest = view
        .samples()
        .iter()
        .min_by(|a, b| a.point.distance(p).total_cmp(&b.point.distance(p)))?;
    let length = view.path().length();
    let fractional = current.distance > 0.0 && current.distance <= 1.0;
    let distance = if fractional && length > 0.0 {
        nearest.distance / length
    } else {
        nearest.distance
    };
    Some(LabelPosition { distance, ..current })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{config::PaperConfig, model::Label};

    fn rect(name: &str, x: f32, y: f32) -> Cell {
        Cell::element("basic.Rect")
            .with_id(Id::new(name))
            .with_position(x, y)
            .with_size(100.0, 60.0)
    }

    fn drag(interaction: &mut Interaction, scene: &mut Scene, from: Point, to: Point) {
        interaction.on_pointer_down(scene, from).unwrap();
        interaction.on_pointer_move(scene, to).unwrap();
        interaction.on_pointer_up(scene, to).unwrap();
    }

    #[test]
    fn test_drag_element_focuses_and_moves() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        let mut interaction = Interaction::default();

        drag(&mut interaction, &mut scene, Point::new(10.0, 10.0), Point::new(30.0, 15.0));

        assert!(scene.graph().is_selected(Id::new("a")));
        let cell = scene.graph().cell(Id::new("a")).unwrap();
        assert_eq!(cell.position(), Some(Point::new(20.0, 5.0)));
        assert_eq!(interaction.state(), &InputState::Idle);
    }

    #[test]
    fn test_drag_snaps_to_grid() {
        let mut scene = Scene::new(PaperConfig::default().with_grid_size(10.0));
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        let mut interaction = Interaction::default();

        interaction.on_pointer_down(&mut scene, Point::new(10.0, 10.0)).unwrap();
        interaction.on_pointer_move(&mut scene, Point::new(13.0, 17.0)).unwrap();
        assert_eq!(
            scene.graph().cell(Id::new("a")).unwrap().position(),
            Some(Point::new(0.0, 10.0))
        );
        interaction.on_pointer_move(&mut scene, Point::new(26.0, 21.0)).unwrap();
        assert_eq!(
            scene.graph().cell(Id::new("a")).unwrap().position(),
            Some(Point::new(20.0, 10.0))
        );
    }

    #[test]
    fn test_drag_moves_multi_selection() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        scene.add_cell(rect("b", 200.0, 0.0)).unwrap();
        scene.update_selection([Id::new("a"), Id::new("b")]).unwrap();
        let mut interaction = Interaction::default();

        drag(&mut interaction, &mut scene, Point::new(10.0, 10.0), Point::new(20.0, 30.0));

        assert_eq!(
            scene.graph().cell(Id::new("b")).unwrap().position(),
            Some(Point::new(210.0, 20.0))
        );
        assert_eq!(scene.graph().selection().len(), 2);
    }

    #[test]
    fn test_blank_press_starts_lasso_and_clears_selection() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        scene.focus(Id::new("a")).unwrap();
        let mut interaction = Interaction::default();

        interaction.on_pointer_down(&mut scene, Point::new(500.0, 500.0)).unwrap();

        assert!(scene.graph().selection().is_empty());
        assert!(matches!(interaction.state(), InputState::LassoSelecting { .. }));
        interaction.cancel();
        assert_eq!(interaction.state(), &InputState::Idle);
    }

    #[test]
    fn test_resize_handle() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        scene.focus(Id::new("a")).unwrap();
        let mut interaction = Interaction::default();

        drag(&mut interaction, &mut scene, Point::new(100.0, 60.0), Point::new(150.0, -20.0));

        let size = scene.graph().cell(Id::new("a")).unwrap().size().unwrap();
        assert_eq!(size, Size::new(150.0, 1.0));
    }

    #[test]
    fn test_magnet_starts_link() {
        let mut scene = Scene::default();
        let source = rect("a", 0.0, 0.0).with_attrs(json!({
            ".out": { "magnet": true, "ref-x": 1.0, "ref-y": 0.5, "r": 5, "port": "out" },
        }));
        scene.add_cell(source).unwrap();
        scene.add_cell(rect("b", 300.0, 0.0)).unwrap();
        let mut interaction = Interaction::default();

        drag(&mut interaction, &mut scene, Point::new(100.0, 30.0), Point::new(350.0, 30.0));

        let link = scene.graph().links().next().unwrap();
        let data = link.as_link().unwrap();
        assert_eq!(data.source(), &Endpoint::port(Id::new("a"), Id::new("out")));
        assert_eq!(data.target(), &Endpoint::cell(Id::new("b")));
    }

    #[test]
    fn test_snapping_to_nearest_magnet() {
        let config = PaperConfig::default().with_snap_links_radius(30.0);
        let mut scene = Scene::new(config);
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        let target = rect("b", 300.0, 0.0).with_attrs(json!({
            ".in": { "ref-x": 0.0, "ref-y": 0.5, "r": 5, "port": "in" },
        }));
        scene.add_cell(target).unwrap();
        let link = Cell::link(Endpoint::cell(Id::new("a")), Endpoint::point(Point::new(200.0, 30.0)))
            .with_id(Id::new("l"));
        scene.add_cell(link).unwrap();
        let mut interaction = Interaction::default();

        interaction.on_pointer_down(&mut scene, Point::new(200.0, 30.0)).unwrap();
        interaction.on_pointer_move(&mut scene, Point::new(290.0, 32.0)).unwrap();

        assert_eq!(
            interaction.state(),
            &InputState::DraggingLinkEndpoint {
                link: Id::new("l"),
                end: LinkEnd::Target,
                original: Endpoint::point(Point::new(200.0, 30.0)),
                snapped: Some(Endpoint::port(Id::new("b"), Id::new("in"))),
                moved: true,
            }
        );
        interaction.on_pointer_up(&mut scene, Point::new(290.0, 32.0)).unwrap();
        let cell = scene.graph().cell(Id::new("l")).unwrap();
        assert_eq!(
            cell.as_link().unwrap().target(),
            &Endpoint::port(Id::new("b"), Id::new("in"))
        );
    }

    #[test]
    fn test_pinned_end_stays_free() {
        let mut scene = Scene::default();
        scene.add_cell(rect("a", 0.0, 0.0)).unwrap();
        let link = Cell::link(Endpoint::cell(Id::new("a")), Endpoint::point(Point::new(200.0, 30.0)))
            .with_id(Id::new("l"));
        scene.add_cell(link).unwrap();
        let mut interaction = Interaction::default();

        drag(&mut interaction, &mut scene, Point::new(200.0, 30.0), Point::new(400.0, 400.0));

        let cell = scene.graph().cell(Id::new("l")).unwrap();
        assert_eq!(
            cell.as_link().unwrap().target(),
            &Endpoint::point(Point::new(400.0, 400.0))
        );
    }

    #[test]
    fn test_moving_label_keeps_fraction() {
        let mut scene = Scene::default();
        let link = Cell::link(
            Endpoint::point(Point::new(0.0, 0.0)),
            Endpoint::point(Point::new(100.0, 0.0)),
        )
        .with_id(Id::new("l"))
        .with_label(Label::text(0.5, "x"));
        scene.add_cell(link).unwrap();
        let mut interaction = Interaction::default();

        drag(&mut interaction, &mut scene, Point::new(50.0, 2.0), Point::new(75.0, 4.0));

        let cell = scene.graph().cell(Id::new("l")).unwrap();
        let position = cell.as_link().unwrap().labels()[0].position;
        assert!((position.distance - 0.75).abs() < 0.05);
    }
}
