//! Rubber-band selection.

use plexus_core::{
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::view::Paper;

/// Elements whose absolute position lies inside the rectangle spanned by
/// `origin` and `current`, in paper order. Links are never selected.
pub fn elements_in(paper: &Paper, origin: Point, current: Point) -> Vec<Id> {
    let area = Bounds::from_corners(origin, current);
    paper
        .element_views()
        .filter(|view| area.contains_point(view.origin()))
        .map(|view| view.id())
        .collect()
}
