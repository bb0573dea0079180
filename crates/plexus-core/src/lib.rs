//! Plexus Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Plexus diagram
//! engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, bounds, lines, ellipses, affine transforms and
//!   vector paths ([`geometry`] module)
//! - **Errors**: Failures while parsing path data or transform lists
//!   ([`error::GeometryError`])

pub mod error;
pub mod geometry;
pub mod identifier;
