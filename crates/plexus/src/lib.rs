//! Plexus - A scene graph and connection-geometry engine for diagram editors.
//!
//! A [`Scene`] owns the cell graph, the paper holding the geometry of every
//! view, and the registries that say how each cell type is drawn and how
//! links are routed and connected. Every mutation made through the scene is
//! followed by exactly one update pass over the affected views before
//! listeners are notified.
//!
//! # Examples
//!
//! ```rust
//! use plexus::{
//!     Scene,
//!     identifier::Id,
//!     model::{Cell, Endpoint},
//! };
//!
//! let mut scene = Scene::default();
//! let a = scene
//!     .add_cell(Cell::element("basic.Rect").with_size(100.0, 60.0))
//!     .expect("Failed to add element");
//! let b = scene
//!     .add_cell(
//!         Cell::element("basic.Rect")
//!             .with_position(300.0, 0.0)
//!             .with_size(100.0, 60.0),
//!     )
//!     .expect("Failed to add element");
//! let link = scene
//!     .add_cell(Cell::link(Endpoint::cell(a), Endpoint::cell(b)))
//!     .expect("Failed to add link");
//!
//! let view = scene.paper().link_view(link).expect("Link has a view");
//! assert!((view.source_point().x() - 100.0).abs() < 0.01);
//! # let _: Id = link;
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod interaction;
pub mod model;
pub mod registry;
pub mod scene;
pub mod view;

pub use plexus_core::{geometry, identifier};

pub use error::PlexusError;
pub use scene::Scene;
