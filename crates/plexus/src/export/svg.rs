//! SVG export of a scene's views.

mod element;
mod link;

use std::{fs::File, io::Write};

use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use svg::{Document, node::element as svg_element};

use plexus_core::geometry::{Bounds, Insets, Point, Size};

use crate::{color::Color, config::StyleConfig, export, scene::Scene};

/// Builder for [`Svg`] exporters.
#[derive(Debug, Default)]
pub struct SvgBuilder {
    file_name: Option<String>,
    style: StyleConfig,
}

impl SvgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target file of [`export::Exporter::export_scene`].
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_style(mut self, style: &StyleConfig) -> Self {
        self.style = style.clone();
        self
    }

    /// # Errors
    ///
    /// Returns [`export::Error::Render`] when the configured background
    /// color does not parse.
    pub fn build(self) -> Result<Svg, export::Error> {
        let background = self.style.background_color().map_err(export::Error::Render)?;
        Ok(Svg {
            file_name: self.file_name,
            background,
            padding: Insets::uniform(self.style.padding().max(0.0)),
        })
    }
}

/// Renders scenes into SVG documents.
#[derive(Debug)]
pub struct Svg {
    file_name: Option<String>,
    background: Option<Color>,
    padding: Insets,
}

impl Svg {
    /// Renders every element and link of `scene`, bottom of the stack
    /// first.
    pub fn render_scene(&self, scene: &Scene) -> Document {
        let content_bounds = self.calculate_scene_bounds(scene);
        let canvas = self.calculate_canvas_bounds(content_bounds);
        let svg_size = canvas.to_size();
        let offset = Point::default().sub_point(canvas.min_point());

        let doc = Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", svg_size.width(), svg_size.height()),
            )
            .set("width", svg_size.width())
            .set("height", svg_size.height());
        let doc = self.add_background(doc, svg_size);

        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!("translate({}, {})", offset.x(), offset.y()),
        );

        let paper = scene.paper();
        let graph = scene.graph();
        let mut drawn = 0;
        for cell in stacking_order(scene) {
            let template = scene.shapes().template_for(cell);
            if let Some(view) = paper.element_view(cell.id()) {
                let shape = scene.surface().magnet_shape(cell, view, &template, None);
                main_group = main_group.add(self.render_element(cell, view, &template, shape));
                drawn += 1;
            } else if let Some(view) = paper.link_view(cell.id()) {
                main_group = main_group.add(self.render_link(cell, view));
                drawn += 1;
            }
        }
        debug!(cells = drawn, total = graph.len(); "Scene rendered to SVG");

        doc.add(main_group)
    }

    /// Renders `scene` into SVG text.
    pub fn render_to_string(&self, scene: &Scene) -> String {
        self.render_scene(scene).to_string()
    }

    /// Union of every element box and link path on the paper.
    fn calculate_scene_bounds(&self, scene: &Scene) -> Bounds {
        let paper = scene.paper();
        let elements = paper.element_views().map(|view| view.rotated_bbox());
        let links = paper.link_views().filter_map(|view| view.path().bounds());
        elements
            .chain(links)
            .reduce(|combined, bounds| combined.merge(&bounds))
            .unwrap_or_default()
    }

    /// Content bounds grown by the configured padding on every side.
    fn calculate_canvas_bounds(&self, content_bounds: Bounds) -> Bounds {
        let canvas = content_bounds.add_padding(self.padding);

        debug!(width = canvas.width(), height = canvas.height(); "Final SVG dimensions");

        canvas
    }

    fn add_background(&self, doc: Document, size: Size) -> Document {
        let Some(color) = &self.background else {
            return doc;
        };
        let background = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", size.width())
            .set("height", size.height())
            .set("fill", color);
        doc.add(background)
    }

    /// Writes an SVG document to the configured file.
    pub fn write_document(&self, doc: Document) -> Result<(), export::Error> {
        let Some(file_name) = &self.file_name else {
            return Err(export::Error::Render("no output file configured".to_string()));
        };
        info!(file_name = file_name.as_str(); "Creating SVG file");
        let f = match File::create(file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = file_name.as_str(), err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name = file_name.as_str(), err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl export::Exporter for Svg {
    fn export_scene(&mut self, scene: &Scene) -> Result<(), export::Error> {
        let doc = self.render_scene(scene);
        debug!("SVG document rendered");

        self.write_document(doc)
    }
}

/// Cells from the bottom of the stack up: lower `z` first, elements below
/// links at equal `z`, earlier cells below later ones.
fn stacking_order(scene: &Scene) -> Vec<&crate::model::Cell> {
    let mut cells: Vec<_> = scene.graph().cells().enumerate().collect();
    cells.sort_by_key(|(index, cell)| (cell.z(), cell.is_link(), *index));
    cells.into_iter().map(|(_, cell)| cell).collect()
}

/// A color attribute as written, dropped with a warning when it does not
/// parse.
fn paint(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    let value = attrs.get(key)?.as_str()?;
    if value == "none" {
        return None;
    }
    match Color::new(value) {
        Ok(_) => Some(value.to_string()),
        Err(err) => {
            warn!(key = key, err = err.as_str(); "Ignoring invalid color");
            None
        }
    }
}

/// A numeric attribute; numeric strings are accepted.
fn number(attrs: &Map<String, Value>, key: &str) -> Option<f32> {
    match attrs.get(key)? {
        Value::Number(n) => n.as_f64().map(|n| n as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The attributes of one selector, or an empty map.
fn selector_attrs(attrs: &Map<String, Value>, selector: &str) -> Map<String, Value> {
    attrs
        .get(selector)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use plexus_core::identifier::Id;

    use super::*;
    use crate::model::{Cell, Endpoint, Label};

    fn scene() -> Scene {
        let mut scene = Scene::default();
        scene
            .add_cell(
                Cell::element("basic.Rect")
                    .with_id(Id::new("a"))
                    .with_size(100.0, 60.0)
                    .with_attrs(json!({ "rect": { "fill": "salmon" }, "text": { "text": "A" } })),
            )
            .unwrap();
        scene
            .add_cell(
                Cell::element("basic.Circle")
                    .with_id(Id::new("b"))
                    .with_position(300.0, 30.0)
                    .with_size(60.0, 60.0),
            )
            .unwrap();
        scene
            .add_cell(
                Cell::link(Endpoint::cell(Id::new("a")), Endpoint::cell(Id::new("b")))
                    .with_id(Id::new("l"))
                    .with_label(Label::text(0.5, "calls")),
            )
            .unwrap();
        scene
    }

    #[test]
    fn test_render_scene_contains_every_view() {
        let svg = SvgBuilder::new().build().unwrap();
        let output = svg.render_to_string(&scene());

        assert!(output.contains("<rect"));
        assert!(output.contains("<ellipse"));
        assert!(output.contains("<path"));
        assert!(output.contains("calls"));
        assert_eq!(output.matches("<text").count(), 2);
        assert!(output.contains("salmon"));
    }

    #[test]
    fn test_dimensions_include_padding() {
        let style: StyleConfig = serde_json::from_value(json!({ "padding": 10.0 })).unwrap();
        let svg = SvgBuilder::new().with_style(&style).build().unwrap();
        let bounds = svg.calculate_scene_bounds(&scene());
        assert_eq!(bounds.min_point(), Point::new(0.0, 0.0));
        assert_eq!(bounds.max_point(), Point::new(330.0, 60.0));

        let canvas = svg.calculate_canvas_bounds(bounds);
        assert_eq!(canvas.min_point(), Point::new(-10.0, -10.0));
        assert_eq!(canvas.to_size(), Size::new(350.0, 80.0));
        let output = svg.render_to_string(&scene());
        assert!(output.contains("translate(10, 10)"));
        assert!(output.contains("viewBox=\"0 0 350 80\""));
    }

    #[test]
    fn test_invalid_background_fails_build() {
        let style: StyleConfig =
            serde_json::from_value(json!({ "background_color": "not-a-color" })).unwrap();
        assert!(matches!(
            SvgBuilder::new().with_style(&style).build(),
            Err(export::Error::Render(_))
        ));
    }

    #[test]
    fn test_invalid_fill_is_skipped() {
        let attrs = json!({ "fill": "nope", "stroke": "red" });
        let attrs = attrs.as_object().unwrap();
        assert!(paint(attrs, "fill").is_none());
        assert!(paint(attrs, "stroke").is_some());
        assert!(paint(attrs, "missing").is_none());
    }

    #[test]
    fn test_write_without_file_name() {
        let svg = SvgBuilder::new().build().unwrap();
        let doc = svg.render_scene(&scene());
        assert!(matches!(svg.write_document(doc), Err(export::Error::Render(_))));
    }
}
