//! Plexus CLI library
//!
//! This module contains the core CLI logic: it loads a graph snapshot,
//! lays it out on a paper and exports the result as SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use plexus::{
    PlexusError, Scene,
    export::{Exporter, svg::SvgBuilder},
    graph::GraphSnapshot,
};

/// Run the Plexus CLI application
///
/// This function loads the input snapshot into a scene, computes every
/// view and writes the resulting SVG to the output file.
///
/// # Errors
///
/// Returns `PlexusError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Snapshot parsing errors
/// - View construction errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), PlexusError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing snapshot"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let snapshot = GraphSnapshot::from_json(&source)?;

    let mut scene = Scene::new(app_config.paper().clone());
    scene.load_snapshot(snapshot)?;
    let pass = scene.render_all()?;
    info!(pass = pass.id(); "Scene laid out");

    let mut svg = SvgBuilder::new()
        .with_file_name(&args.output)
        .with_style(app_config.style())
        .build()?;
    svg.export_scene(&scene)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
