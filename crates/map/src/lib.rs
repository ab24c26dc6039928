//! Choropleth maps with pluggable overlay layers.
//!
//! A [`Datamap`] draws the regions of one topology object onto an svg
//! [`scene::Surface`], colors them from per-region data, and dispatches
//! capability calls (`bubbles`, `arc`, `labels`, `legend`, `graticule` and
//! anything added with [`Datamap::register_capability`]) into layer groups.

pub mod choropleth;
pub mod datamap;
pub mod defaults;
pub mod error;
pub mod interaction;
pub mod projection;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use datamap::{Datamap, Invocation, LayerCallback};
pub use defaults::default_options;
pub use error::MapError;
