pub mod data;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod topology;

pub use data::*;
pub use error::*;
pub use geometry::*;
pub use loader::*;
pub use topology::*;
