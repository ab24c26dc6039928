//! Keyed data joins (enter / update / exit).

use std::collections::HashMap;

use options::Value;

use crate::error::SurfaceError;
use crate::node::NodeId;
use crate::surface::Surface;

/// How data items are matched against already-bound nodes.
pub enum JoinKey<'a> {
    /// By position in the data array.
    Index,
    /// By a string computed from `(datum, index)`.
    Key(&'a dyn Fn(&Value, usize) -> String),
}

/// Result of [`Surface::join`].
///
/// `enter` nodes are freshly appended, carrying the class and datum;
/// `update` nodes were re-bound to their new datum; `exit` nodes matched no
/// datum and are left in place for the caller to transition out or remove.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Join {
    pub enter: Vec<(NodeId, Value)>,
    pub update: Vec<(NodeId, Value)>,
    pub exit: Vec<NodeId>,
}

impl Surface {
    /// Binds `data` to the `tag.class` children of `parent`.
    pub fn join(
        &mut self,
        parent: NodeId,
        tag: &str,
        class: &str,
        data: &[Value],
        key: JoinKey<'_>,
    ) -> Result<Join, SurfaceError> {
        if !self.contains(parent) {
            return Err(SurfaceError::StaleNode(parent));
        }

        let existing: Vec<NodeId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|id| {
                self.node(*id)
                    .is_some_and(|n| n.tag == tag && n.has_class(class))
            })
            .collect();

        let key_of = |datum: &Value, i: usize| match &key {
            JoinKey::Index => i.to_string(),
            JoinKey::Key(f) => f(datum, i),
        };

        let mut by_key: HashMap<String, NodeId> = HashMap::new();
        let mut exit = Vec::new();
        for (i, id) in existing.iter().enumerate() {
            let k = match &key {
                JoinKey::Index => i.to_string(),
                JoinKey::Key(_) => self
                    .node(*id)
                    .and_then(|n| n.key.clone())
                    .unwrap_or_default(),
            };
            if by_key.contains_key(&k) {
                exit.push(*id);
            } else {
                by_key.insert(k, *id);
            }
        }

        let mut join = Join::default();
        for (i, datum) in data.iter().enumerate() {
            let k = key_of(datum, i);
            match by_key.remove(&k) {
                Some(id) => {
                    let node = self.node_mut(id).ok_or(SurfaceError::StaleNode(id))?;
                    node.datum = Some(datum.clone());
                    node.key = Some(k);
                    join.update.push((id, datum.clone()));
                }
                None => {
                    let id = self.append(parent, tag)?;
                    self.edit(id)?.class(class).datum(datum.clone());
                    if let Some(node) = self.node_mut(id) {
                        node.key = Some(k);
                    }
                    join.enter.push((id, datum.clone()));
                }
            }
        }

        // Leftovers keep document order.
        exit.extend(existing.into_iter().filter(|id| by_key.values().any(|v| v == id)));
        join.exit = exit;
        Ok(join)
    }
}
