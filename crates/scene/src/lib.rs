//! Retained-mode render surface.
//!
//! A [`Surface`] is a tree of SVG/HTML element nodes. Layers append and
//! update nodes, bind data to them with keyed joins, schedule transitions,
//! and finally serialize the tree with [`svg::to_svg`].

pub mod error;
pub mod join;
pub mod node;
pub mod surface;
pub mod svg;
pub mod transition;

pub use error::SurfaceError;
pub use join::{Join, JoinKey};
pub use node::{Node, NodeId};
pub use surface::{NodeMut, Surface};
pub use transition::{SettleReport, Transition};
