use std::fmt;

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The handle refers to a removed node (or a slot since reused).
    StaleNode(NodeId),
    /// The root node can't be removed or re-parented.
    RootRemoval,
    /// `insert_before` was given a sibling that isn't a child of the parent.
    NotAChild { parent: NodeId, child: NodeId },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::StaleNode(id) => write!(f, "stale node handle {}", id.0),
            SurfaceError::RootRemoval => write!(f, "the root node can't be removed"),
            SurfaceError::NotAChild { parent, child } => {
                write!(f, "node {} is not a child of {}", child.0, parent.0)
            }
        }
    }
}

impl std::error::Error for SurfaceError {}
