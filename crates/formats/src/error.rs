use std::fmt;

#[derive(Debug)]
pub enum TopologyError {
    Parse(serde_json::Error),
    /// The payload's `type` was not `"Topology"`.
    NotATopology { found: String },
    /// `objects` has no entry with the requested name.
    MissingObject { name: String },
    /// A geometry referenced an arc index past the end of `arcs`.
    ArcOutOfRange { index: i64, arcs: usize },
    /// A geometry object's `type` is unknown or its body is malformed.
    InvalidGeometry(String),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::Parse(err) => write!(f, "topology parse error: {err}"),
            TopologyError::NotATopology { found } => {
                write!(f, "expected a Topology payload, found type {found:?}")
            }
            TopologyError::MissingObject { name } => {
                write!(f, "topology has no object named {name:?}")
            }
            TopologyError::ArcOutOfRange { index, arcs } => {
                write!(f, "arc index {index} out of range ({arcs} arcs)")
            }
            TopologyError::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
        }
    }
}

impl std::error::Error for TopologyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TopologyError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Parse(err)
    }
}

#[derive(Debug)]
pub enum DataError {
    Json(serde_json::Error),
    Csv(csv::Error),
    /// JSON data must be an object keyed by region id.
    NotAnObject,
    UnknownDataType(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Json(err) => write!(f, "data JSON error: {err}"),
            DataError::Csv(err) => write!(f, "data CSV error: {err}"),
            DataError::NotAnObject => write!(f, "data must be an object keyed by region id"),
            DataError::UnknownDataType(name) => {
                write!(f, "unknown data type {name:?} (expected \"json\" or \"csv\")")
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Json(err) => Some(err),
            DataError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Json(err)
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err)
    }
}

#[derive(Debug)]
pub enum LoadError {
    Io { source: String, err: std::io::Error },
    Http { source: String, err: reqwest::Error },
    Topology(TopologyError),
    Data(DataError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { source, err } => write!(f, "read {source}: {err}"),
            LoadError::Http { source, err } => write!(f, "fetch {source}: {err}"),
            LoadError::Topology(err) => write!(f, "{err}"),
            LoadError::Data(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { err, .. } => Some(err),
            LoadError::Http { err, .. } => Some(err),
            LoadError::Topology(err) => Some(err),
            LoadError::Data(err) => Some(err),
        }
    }
}

impl From<TopologyError> for LoadError {
    fn from(err: TopologyError) -> Self {
        LoadError::Topology(err)
    }
}

impl From<DataError> for LoadError {
    fn from(err: DataError) -> Self {
        LoadError::Data(err)
    }
}
