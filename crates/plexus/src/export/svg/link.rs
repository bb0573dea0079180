//! SVG rendering for links.

use std::str::FromStr;

use svg::node::element as svg_element;

use plexus_core::geometry::{PathData, Point};

use super::{Svg, number, paint, selector_attrs};
use crate::{
    model::{Cell, LinkEnd},
    view::LinkView,
};

impl Svg {
    /// Renders one link: the connection path, its end markers and its text
    /// labels.
    pub(super) fn render_link(&self, cell: &Cell, view: &LinkView) -> svg_element::Group {
        let mut group = svg_element::Group::new()
            .set("id", cell.id().to_string())
            .set("class", "link");

        let connection = selector_attrs(cell.attrs(), ".connection");
        let mut path = svg_element::Path::new()
            .set("class", "connection")
            .set("d", view.path().to_string())
            .set("fill", "none")
            .set(
                "stroke",
                paint(&connection, "stroke").unwrap_or_else(|| "#000000".to_string()),
            );
        if let Some(width) = number(&connection, "stroke-width") {
            path = path.set("stroke-width", width);
        }
        group = group.add(path);

        for end in [LinkEnd::Source, LinkEnd::Target] {
            if let Some(marker) = self.render_marker(cell, view, end) {
                group = group.add(marker);
            }
        }

        let labels = cell.as_link().map(|link| link.labels()).unwrap_or_default();
        for (label, point) in labels.iter().zip(view.label_points()) {
            let Some(text) = label.text_content() else {
                continue;
            };
            group = group.add(
                svg_element::Text::new(text)
                    .set("class", "label")
                    .set("x", point.x())
                    .set("y", point.y())
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle"),
            );
        }

        group
    }

    /// The marker path at `end`, with its tip on the attachment point and
    /// its body pointing back along the link.
    fn render_marker(&self, cell: &Cell, view: &LinkView, end: LinkEnd) -> Option<svg_element::Path> {
        let selector = match end {
            LinkEnd::Source => ".marker-source",
            LinkEnd::Target => ".marker-target",
        };
        let attrs = selector_attrs(cell.attrs(), selector);
        let d = attrs.get("d")?.as_str()?;
        let height = PathData::from_str(d).ok()?.bounds()?.height();

        let (tip, toward) = match end {
            LinkEnd::Source => (
                view.source_point(),
                view.route().first().copied().unwrap_or(view.target_point()),
            ),
            LinkEnd::Target => (
                view.target_point(),
                view.route().last().copied().unwrap_or(view.source_point()),
            ),
        };
        let angle = heading(tip, toward);

        let mut marker = svg_element::Path::new()
            .set("class", selector.trim_start_matches('.'))
            .set("d", d)
            .set(
                "transform",
                format!(
                    "translate({}, {}) rotate({}) translate(0, {})",
                    tip.x(),
                    tip.y(),
                    angle,
                    -height / 2.0
                ),
            )
            .set(
                "fill",
                paint(&attrs, "fill").unwrap_or_else(|| "#000000".to_string()),
            );
        if let Some(stroke) = paint(&attrs, "stroke") {
            marker = marker.set("stroke", stroke);
        }
        Some(marker)
    }
}

/// Direction from `from` to `to` in degrees, clockwise from +X.
fn heading(from: Point, to: Point) -> f32 {
    let delta = to.sub_point(from);
    delta.y().atan2(delta.x()).to_degrees()
}
