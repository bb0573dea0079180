//! Configuration types for Plexus scenes.
//!
//! This module provides configuration structures that control how the paper
//! resolves geometry and interaction, and how exported snapshots are styled.
//! All types implement [`serde::Deserialize`] for loading from TOML.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining paper and style settings.
//! - [`PaperConfig`] - Grid, linking, embedding and sampling behavior.
//! - [`StyleConfig`] - Visual options for exported SVG.
//!
//! # Example
//!
//! ```
//! # use plexus::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.paper().default_connector(), "smooth");
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use crate::color::Color;

/// Top-level application configuration combining paper and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Paper configuration section.
    #[serde(default)]
    paper: PaperConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified paper and style configurations.
    pub fn new(paper: PaperConfig, style: StyleConfig) -> Self {
        Self { paper, style }
    }

    /// Returns the paper configuration.
    pub fn paper(&self) -> &PaperConfig {
        &self.paper
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Behavior of the paper: grid, link attachment, embedding and sampling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    width: f32,
    height: f32,
    /// Grid size used to snap drags; 1 or less disables snapping.
    grid_size: f32,
    /// Attach links with vertices at axis-aligned points.
    perpendicular_links: bool,
    /// Allow link ends to stay at free points when dropped on blank paper.
    link_pinning: bool,
    /// Radius for snapping dragged link ends to magnets; 0 disables snapping.
    snap_links_radius: f32,
    /// Reparent dropped elements into the element underneath.
    embedding_mode: bool,
    /// Pressing on a `magnet: true` sub-part starts a new link.
    link_from_magnets: bool,
    /// Arc-length spacing of path samples.
    sample_interval: f32,
    default_connector: String,
    default_router: String,
    /// Pointer distance within which links and handles are hit.
    hit_tolerance: f32,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            grid_size: 1.0,
            perpendicular_links: false,
            link_pinning: true,
            snap_links_radius: 0.0,
            embedding_mode: false,
            link_from_magnets: true,
            sample_interval: 5.0,
            default_connector: "smooth".to_string(),
            default_router: "normal".to_string(),
            hit_tolerance: 5.0,
        }
    }
}

impl PaperConfig {
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    pub fn perpendicular_links(&self) -> bool {
        self.perpendicular_links
    }

    pub fn link_pinning(&self) -> bool {
        self.link_pinning
    }

    pub fn snap_links_radius(&self) -> f32 {
        self.snap_links_radius
    }

    pub fn embedding_mode(&self) -> bool {
        self.embedding_mode
    }

    pub fn link_from_magnets(&self) -> bool {
        self.link_from_magnets
    }

    pub fn sample_interval(&self) -> f32 {
        self.sample_interval
    }

    pub fn default_connector(&self) -> &str {
        &self.default_connector
    }

    pub fn default_router(&self) -> &str {
        &self.default_router
    }

    pub fn hit_tolerance(&self) -> f32 {
        self.hit_tolerance
    }

    pub fn with_grid_size(mut self, grid_size: f32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_perpendicular_links(mut self, enabled: bool) -> Self {
        self.perpendicular_links = enabled;
        self
    }

    pub fn with_link_pinning(mut self, enabled: bool) -> Self {
        self.link_pinning = enabled;
        self
    }

    pub fn with_snap_links_radius(mut self, radius: f32) -> Self {
        self.snap_links_radius = radius;
        self
    }

    pub fn with_embedding_mode(mut self, enabled: bool) -> Self {
        self.embedding_mode = enabled;
        self
    }

    pub fn with_sample_interval(mut self, interval: f32) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_default_connector(mut self, name: impl Into<String>) -> Self {
        self.default_connector = name.into();
        self
    }

    pub fn with_default_router(mut self, name: impl Into<String>) -> Self {
        self.default_router = name.into();
        self
    }
}

/// Visual styling configuration for exported scenes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background [`Color`] for exported documents, as a color string.
    background_color: Option<String>,

    /// Margin around the scene content in exported documents.
    padding: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            padding: 20.0,
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }
}
