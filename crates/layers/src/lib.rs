//! Capability handlers and the registry that dispatches to them.
//!
//! A capability draws caller data into a layer group on the render surface.
//! The built-ins are `bubbles`, `legend`, `arc`, `labels` and `graticule`;
//! [`registry::register`] adds more.

pub mod arc;
pub mod bubbles;
pub mod context;
pub mod engine;
pub mod error;
pub mod geography;
pub mod graticule;
pub mod labels;
pub mod layer;
pub mod legend;
pub mod registry;
pub mod symbology;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RenderContext;
pub use engine::{Cartographer, GeometryEngine};
pub use error::LayerError;
pub use layer::*;
pub use registry::{Capability, Handler, Registry};
