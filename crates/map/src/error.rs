use std::fmt;

use formats::{DataError, LoadError, TopologyError};
use layers::LayerError;
use scene::SurfaceError;

#[derive(Debug)]
pub enum MapError {
    /// `projection` names no supported projection.
    UnknownProjection(String),
    /// No capability is registered under this name.
    UnknownCapability(String),
    /// Per-call options were neither an object nor a callback.
    InvalidOptions { capability: String },
    /// `zoom_to` was given a region that isn't drawn.
    UnknownRegion(String),
    /// `Datamap::load` needs `geographyConfig.dataUrl`.
    MissingTopology,
    Topology(TopologyError),
    Data(DataError),
    Load(LoadError),
    Layer(LayerError),
    Surface(SurfaceError),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::UnknownProjection(name) => write!(f, "unknown projection {name:?}"),
            MapError::UnknownCapability(name) => write!(f, "no capability named {name:?}"),
            MapError::InvalidOptions { capability } => {
                write!(f, "{capability}: options must be an object or a callback")
            }
            MapError::UnknownRegion(id) => write!(f, "no region {id:?} on the map"),
            MapError::MissingTopology => {
                write!(f, "geographyConfig.dataUrl is required to load a map")
            }
            MapError::Topology(err) => write!(f, "{err}"),
            MapError::Data(err) => write!(f, "{err}"),
            MapError::Load(err) => write!(f, "{err}"),
            MapError::Layer(err) => write!(f, "{err}"),
            MapError::Surface(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Topology(err) => Some(err),
            MapError::Data(err) => Some(err),
            MapError::Load(err) => Some(err),
            MapError::Layer(err) => Some(err),
            MapError::Surface(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopologyError> for MapError {
    fn from(err: TopologyError) -> Self {
        MapError::Topology(err)
    }
}

impl From<DataError> for MapError {
    fn from(err: DataError) -> Self {
        MapError::Data(err)
    }
}

impl From<LoadError> for MapError {
    fn from(err: LoadError) -> Self {
        MapError::Load(err)
    }
}

impl From<LayerError> for MapError {
    fn from(err: LayerError) -> Self {
        MapError::Layer(err)
    }
}

impl From<SurfaceError> for MapError {
    fn from(err: SurfaceError) -> Self {
        MapError::Surface(err)
    }
}
