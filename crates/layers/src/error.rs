use std::fmt;

use scene::SurfaceError;

#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    /// An array-only capability was handed something else. Carries the
    /// data's description (`"bubbles"`, `"arcs"`).
    NotAnArray(&'static str),
    /// A datum was well-typed but unusable, e.g. an arc with no origin.
    InvalidDatum(String),
    Surface(SurfaceError),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerError::NotAnArray(what) => write!(f, "{what} must be an array"),
            LayerError::InvalidDatum(msg) => write!(f, "invalid datum: {msg}"),
            LayerError::Surface(err) => write!(f, "render surface: {err}"),
        }
    }
}

impl std::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayerError::Surface(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SurfaceError> for LayerError {
    fn from(err: SurfaceError) -> Self {
        LayerError::Surface(err)
    }
}
