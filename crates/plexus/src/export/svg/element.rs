//! SVG rendering for elements.

use svg::node::{self, element as svg_element};

use super::{Svg, number, paint, selector_attrs};
use crate::{
    model::Cell,
    registry::ShapeTemplate,
    view::{ElementView, MagnetOutline, MagnetShape},
};

/// Selectors whose `text` is drawn as the element caption.
const CAPTION_SELECTORS: [&str; 2] = ["text", ".label"];

impl Svg {
    /// Renders one element: its outline painted with the body attributes,
    /// then its caption, rotated about the element center.
    pub(super) fn render_element(
        &self,
        cell: &Cell,
        view: &ElementView,
        template: &ShapeTemplate,
        shape: Option<MagnetShape>,
    ) -> svg_element::Group {
        let mut group = svg_element::Group::new()
            .set("id", cell.id().to_string())
            .set("class", cell.cell_type().replace('.', " "));
        if view.angle() != 0.0 {
            let center = view.center();
            group = group.set(
                "transform",
                format!("rotate({}, {}, {})", view.angle(), center.x(), center.y()),
            );
        }

        let body = selector_attrs(cell.attrs(), template.body());
        let bbox = view.bbox();
        let outline = shape.map_or(MagnetOutline::Rect, |shape| shape.outline);
        let mut painted: Vec<(&str, node::Value)> = vec![(
            "fill",
            paint(&body, "fill").unwrap_or_else(|| "none".to_string()).into(),
        )];
        if let Some(stroke) = paint(&body, "stroke") {
            painted.push(("stroke", stroke.into()));
        }
        if let Some(width) = number(&body, "stroke-width") {
            painted.push(("stroke-width", width.into()));
        }

        group = match outline {
            MagnetOutline::Rect => {
                let rect = svg_element::Rectangle::new()
                    .set("x", bbox.min_x())
                    .set("y", bbox.min_y())
                    .set("width", bbox.width())
                    .set("height", bbox.height());
                group.add(painted.iter().fold(rect, |e, (k, v)| e.set(*k, v.clone())))
            }
            MagnetOutline::Ellipse => {
                let center = bbox.center();
                let ellipse = svg_element::Ellipse::new()
                    .set("cx", center.x())
                    .set("cy", center.y())
                    .set("rx", bbox.width() / 2.0)
                    .set("ry", bbox.height() / 2.0);
                group.add(painted.iter().fold(ellipse, |e, (k, v)| e.set(*k, v.clone())))
            }
            MagnetOutline::Path(path) => {
                let path = svg_element::Path::new().set("d", path.to_string());
                group.add(painted.iter().fold(path, |e, (k, v)| e.set(*k, v.clone())))
            }
        };

        let caption = CAPTION_SELECTORS.iter().find_map(|selector| {
            let attrs = selector_attrs(cell.attrs(), selector);
            let text = attrs.get("text")?.as_str()?.to_string();
            Some((attrs, text))
        });
        if let Some((attrs, text)) = caption {
            let center = bbox.center();
            let mut label = svg_element::Text::new(text)
                .set("x", center.x())
                .set("y", center.y())
                .set("text-anchor", "middle")
                .set("dominant-baseline", "middle");
            if let Some(size) = number(&attrs, "font-size") {
                label = label.set("font-size", size);
            }
            if let Some(fill) = paint(&attrs, "fill") {
                label = label.set("fill", fill);
            }
            group = group.add(label);
        }

        group
    }
}
