//! Positioned, sized nodes.

use plexus_core::geometry::{Point, Size};

use super::ports::PortIndex;

/// Element-specific state of a cell.
///
/// `position` is relative to the parent element's origin when the element is
/// embedded and absolute otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub(crate) position: Point,
    pub(crate) size: Size,
    pub(crate) angle: f32,
    pub(crate) selected: bool,
    pub(crate) ports: PortIndex,
}

impl Default for ElementData {
    fn default() -> Self {
        Self {
            position: Point::default(),
            size: Size::new(1.0, 1.0),
            angle: 0.0,
            selected: false,
            ports: PortIndex::default(),
        }
    }
}

impl ElementData {
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Rotation in degrees, normalized into `[0, 360)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn port_index(&self) -> &PortIndex {
        &self.ports
    }
}
