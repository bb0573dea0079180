//! Cached geometry of one link and the per-link update.

use indexmap::IndexMap;
use log::{trace, warn};
use serde_json::Value;

use plexus_core::{
    geometry::{Bounds, PathData, Point, Sample},
    identifier::Id,
};

use super::{
    RenderContext, UpdatePass,
    element_view::ElementView,
    label,
    router::RouteContext,
    surface::{MagnetShape, connection_point},
};
use crate::{
    config::PaperConfig,
    error::PlexusError,
    model::{Cell, Endpoint, LinkEnd, PortsCapable, StrategyRef},
    registry::StrategyRegistry,
};

/// Everything a link update reads.
pub(crate) struct LinkContext<'a> {
    pub render: &'a RenderContext<'a>,
    pub elements: &'a IndexMap<Id, ElementView>,
    pub strategies: &'a StrategyRegistry,
    pub config: &'a PaperConfig,
}

/// Connection geometry of a link, in paper-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    id: Id,
    z: i64,
    source_shape: MagnetShape,
    target_shape: MagnetShape,
    source_point: Point,
    target_point: Point,
    source_marker_point: Point,
    target_marker_point: Point,
    route: Vec<Point>,
    path: PathData,
    samples: Vec<Sample>,
    label_points: Vec<Point>,
    last_pass: Option<UpdatePass>,
    update_count: u64,
    source_dirty: bool,
    target_dirty: bool,
}

impl LinkView {
    pub(crate) fn new(id: Id, z: i64) -> Self {
        Self {
            id,
            z,
            source_shape: MagnetShape::point(Point::default()),
            target_shape: MagnetShape::point(Point::default()),
            source_point: Point::default(),
            target_point: Point::default(),
            source_marker_point: Point::default(),
            target_marker_point: Point::default(),
            route: Vec::new(),
            path: PathData::default(),
            samples: Vec::new(),
            label_points: Vec::new(),
            last_pass: None,
            update_count: 0,
            source_dirty: true,
            target_dirty: true,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn z(&self) -> i64 {
        self.z
    }

    pub(crate) fn set_z(&mut self, z: i64) {
        self.z = z;
    }

    pub fn source_shape(&self) -> &MagnetShape {
        &self.source_shape
    }

    pub fn target_shape(&self) -> &MagnetShape {
        &self.target_shape
    }

    pub fn source_bbox(&self) -> Bounds {
        self.source_shape.aabb()
    }

    pub fn target_bbox(&self) -> Bounds {
        self.target_shape.aabb()
    }

    /// Where the link touches its source magnet.
    pub fn source_point(&self) -> Point {
        self.source_point
    }

    pub fn target_point(&self) -> Point {
        self.target_point
    }

    /// The attachment point at `end`.
    pub fn end_point(&self, end: LinkEnd) -> Point {
        match end {
            LinkEnd::Source => self.source_point,
            LinkEnd::Target => self.target_point,
        }
    }

    /// Start of the drawn path, moved back to make room for a marker.
    pub fn source_marker_point(&self) -> Point {
        self.source_marker_point
    }

    pub fn target_marker_point(&self) -> Point {
        self.target_marker_point
    }

    pub fn route(&self) -> &[Point] {
        &self.route
    }

    pub fn path(&self) -> &PathData {
        &self.path
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn label_points(&self) -> &[Point] {
        &self.label_points
    }

    pub fn last_pass(&self) -> Option<UpdatePass> {
        self.last_pass
    }

    /// Number of full updates since the view was created.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Shortest distance from `p` to the sampled path.
    pub fn distance_to_point(&self, p: Point) -> Option<f32> {
        self.samples
            .iter()
            .map(|sample| sample.point.distance(p))
            .reduce(f32::min)
    }

    pub(crate) fn mark_dirty(&mut self, end: LinkEnd) {
        match end {
            LinkEnd::Source => self.source_dirty = true,
            LinkEnd::Target => self.target_dirty = true,
        }
    }

    /// Recomputes the whole connection once per pass.
    ///
    /// Returns `false` when the link was already updated in `pass`.
    pub(crate) fn update(
        &mut self,
        ctx: &LinkContext<'_>,
        cell: &Cell,
        pass: UpdatePass,
    ) -> Result<bool, PlexusError> {
        if self.last_pass == Some(pass) {
            return Ok(false);
        }
        let Some(link) = cell.as_link() else {
            return Ok(false);
        };
        self.last_pass = Some(pass);
        self.update_count += 1;

        if self.source_dirty {
            self.source_shape = end_shape(ctx, self.id, link.source());
            self.source_dirty = false;
        }
        if self.target_dirty {
            self.target_shape = end_shape(ctx, self.id, link.target());
            self.target_dirty = false;
        }

        let (router_name, router_args) = strategy(link.router(), ctx.config.default_router());
        let router = ctx.strategies.router(router_name)?;
        self.route = router.route(
            link.vertices(),
            &RouteContext {
                source_bbox: self.source_shape.aabb(),
                target_bbox: self.target_shape.aabb(),
                args: router_args,
            },
        );

        let perpendicular = !link.vertices().is_empty()
            && (ctx.config.perpendicular_links()
                || cell.prop("perpendicular") == Some(Value::Bool(true)));
        let interval = ctx.config.sample_interval();

        let source_reference = match self.route.first() {
            Some(first) => *first,
            None if self.target_shape.is_point() => self.target_shape.center(),
            None => self
                .target_shape
                .aabb()
                .intersection_with_line_from_center_to_point(self.source_shape.center(), 0.0)
                .unwrap_or_else(|| self.target_shape.center()),
        };
        self.source_point =
            connection_point(&self.source_shape, source_reference, perpendicular, interval);
        let target_reference = self.route.last().copied().unwrap_or(self.source_point);
        self.target_point =
            connection_point(&self.target_shape, target_reference, perpendicular, interval);

        let template = ctx.render.shapes.template_for(cell);
        let surface = ctx.render.surface;
        let toward_target = self.route.first().copied().unwrap_or(self.target_point);
        let toward_source = self.route.last().copied().unwrap_or(self.source_point);
        self.source_marker_point = match surface.marker(cell, &template, LinkEnd::Source) {
            Some(marker) => self.source_point.move_toward(toward_target, marker.inset()),
            None => self.source_point,
        };
        self.target_marker_point = match surface.marker(cell, &template, LinkEnd::Target) {
            Some(marker) => self.target_point.move_toward(toward_source, marker.inset()),
            None => self.target_point,
        };

        let fallback = if link.is_smooth() {
            "smooth"
        } else {
            ctx.config.default_connector()
        };
        let (connector_name, connector_args) = strategy(link.connector(), fallback);
        let connector = ctx.strategies.connector(connector_name)?;
        self.path = connector.connect(
            self.source_marker_point,
            self.target_marker_point,
            &self.route,
            connector_args,
        );
        self.samples = self.path.sample(interval);
        self.label_points = link
            .labels()
            .iter()
            .map(|l| label::label_point(&self.path, &self.samples, &l.position).unwrap_or(self.source_point))
            .collect();

        trace!(
            link = self.id.to_string(),
            pass = pass.0,
            router = router_name,
            connector = connector_name;
            "Link updated"
        );
        Ok(true)
    }
}

static NO_ARGS: Value = Value::Null;

fn strategy<'a>(reference: Option<&'a StrategyRef>, fallback: &'a str) -> (&'a str, &'a Value) {
    match reference {
        Some(reference) => (reference.name.as_str(), &reference.args),
        None => (fallback, &NO_ARGS),
    }
}

/// The magnet a link end attaches to.
///
/// Ports resolve to their selector; a dangling element reference degrades
/// to a zero-size box at the origin.
fn end_shape(ctx: &LinkContext<'_>, link: Id, endpoint: &Endpoint) -> MagnetShape {
    let (id, port, selector) = match endpoint {
        Endpoint::Point { x, y } => return MagnetShape::point(Point::new(*x, *y)),
        Endpoint::Cell { id, port, selector } => (*id, *port, selector.as_deref()),
    };
    let (Some(element), Some(view)) = (ctx.render.graph.get_cell(id), ctx.elements.get(&id)) else {
        warn!(link = link.to_string(), cell = id.to_string(); "Link end references a missing element");
        return MagnetShape::point(Point::default());
    };
    let template = ctx.render.shapes.template_for(element);
    let magnet = port
        .and_then(|port| element.port_selector(port))
        .or(selector);
    let surface = ctx.render.surface;
    surface
        .magnet_shape(element, view, &template, magnet)
        .or_else(|| surface.magnet_shape(element, view, &template, None))
        .unwrap_or_else(|| MagnetShape::element(view))
}
