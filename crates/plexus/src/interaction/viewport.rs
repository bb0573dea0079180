//! Client ↔ paper-local coordinate mapping.

use plexus_core::geometry::{Matrix, Point};

/// Uniform scale followed by a translation.
///
/// `client = local × scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    translate: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Point::default(),
        }
    }
}

impl Viewport {
    /// Non-positive scales fall back to 1.
    pub fn new(scale: f32, translate: Point) -> Self {
        Self {
            scale: if scale > 0.0 { scale } else { 1.0 },
            translate,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn matrix(&self) -> Matrix {
        Matrix::translate(self.translate.x(), self.translate.y())
            .multiply(&Matrix::scale(self.scale, self.scale))
    }

    pub fn client_to_local(&self, p: Point) -> Point {
        p.sub_point(self.translate).scale(1.0 / self.scale)
    }

    pub fn local_to_client(&self, p: Point) -> Point {
        p.scale(self.scale).add_point(self.translate)
    }
}
