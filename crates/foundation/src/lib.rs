//! Small primitives shared by every crate: generational handles, screen
//! bounds and the spherical math behind projections and great arcs.

pub mod bounds;
pub mod handles;
pub mod math;

pub use bounds::*;
pub use handles::*;
