//! Cached geometry of one element.

use plexus_core::{
    geometry::{Bounds, Matrix, Point},
    identifier::Id,
};

use crate::{
    graph::Graph,
    model::Cell,
    registry::{Anchor, ShapeTemplate},
};

/// Absolute geometry of an element, in paper-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementView {
    id: Id,
    anchor_offset: Point,
    origin: Point,
    bbox: Bounds,
    angle: f32,
    rotated_bbox: Bounds,
    z: i64,
}

impl ElementView {
    /// Computes the view of `cell`, or `None` when it is not an element.
    pub(crate) fn compute(graph: &Graph, cell: &Cell, template: &ShapeTemplate) -> Option<Self> {
        let element = cell.as_element()?;
        let size = element.size();
        let anchor_offset = match template.anchor() {
            Anchor::TopLeft => Point::default(),
            Anchor::Center => Point::new(size.width() / 2.0, size.height() / 2.0),
        };
        let origin = absolute_position(graph, cell);
        let bbox = Bounds::new_from_top_left(origin.sub_point(anchor_offset), size);
        let angle = element.angle();
        Some(Self {
            id: cell.id(),
            anchor_offset,
            origin,
            bbox,
            angle,
            rotated_bbox: bbox.bbox_of_rotated(angle),
            z: cell.z(),
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Absolute position of the element's anchor.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Offset from the top-left corner to the anchor.
    pub fn anchor_offset(&self) -> Point {
        self.anchor_offset
    }

    /// The unrotated absolute box.
    pub fn bbox(&self) -> Bounds {
        self.bbox
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// The axis-aligned box around the rotated element.
    pub fn rotated_bbox(&self) -> Bounds {
        self.rotated_bbox
    }

    pub fn center(&self) -> Point {
        self.bbox.center()
    }

    pub fn z(&self) -> i64 {
        self.z
    }

    pub(crate) fn set_z(&mut self, z: i64) {
        self.z = z;
    }

    /// Rotation of the element about its center.
    pub fn matrix(&self) -> Matrix {
        Matrix::rotate_about(self.angle, self.bbox.center())
    }

    /// Whether `p` lies on the rotated element.
    pub fn contains_point(&self, p: Point) -> bool {
        self.bbox
            .contains_point(p.rotate(self.bbox.center(), -self.angle))
    }
}

/// Sum of the positions along the embedding chain of `cell`.
pub fn absolute_position(graph: &Graph, cell: &Cell) -> Point {
    let own = cell.position().unwrap_or_default();
    graph
        .ancestors(cell.id())
        .into_iter()
        .filter_map(|id| graph.get_cell(id).and_then(Cell::position))
        .fold(own, Point::add_point)
}
