//! Fire-and-forget transitions with supersession.
//!
//! Scheduling a transition on a node bumps that node's transition
//! generation. [`Surface::settle`] applies pending transitions to their end
//! state, skipping any whose generation is no longer the node's current one:
//! a later transition on the same node always wins.

use tracing::debug;

use crate::error::SurfaceError;
use crate::node::NodeId;
use crate::surface::Surface;

/// Target state reached at the end of a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub delay_ms: u32,
    pub duration_ms: u32,
    pub attrs: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    /// Remove the node once the transition ends.
    pub remove: bool,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, ms: u32) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn duration(mut self, ms: u32) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn style(mut self, name: &str, value: impl Into<String>) -> Self {
        self.styles.push((name.to_string(), value.into()));
        self
    }

    pub fn remove(mut self) -> Self {
        self.remove = true;
        self
    }

    /// Milliseconds from scheduling until the end state is reached.
    pub fn end_ms(&self) -> u64 {
        u64::from(self.delay_ms) + u64::from(self.duration_ms)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Pending {
    node: NodeId,
    generation: u64,
    transition: Transition,
}

/// Outcome of [`Surface::settle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub applied: usize,
    /// Dropped because a newer transition was scheduled on the same node.
    pub superseded: usize,
    /// Dropped because the node was removed in the meantime.
    pub orphaned: usize,
}

impl Surface {
    /// Schedules `transition` on `node`, superseding any pending one.
    /// Returns the node's new transition generation.
    pub fn transition(
        &mut self,
        node: NodeId,
        transition: Transition,
    ) -> Result<u64, SurfaceError> {
        let n = self.node_mut(node).ok_or(SurfaceError::StaleNode(node))?;
        n.transition_generation += 1;
        let generation = n.transition_generation;
        self.pending.push(Pending {
            node,
            generation,
            transition,
        });
        Ok(generation)
    }

    pub fn pending_transitions(&self) -> usize {
        self.pending.len()
    }

    /// Runs every pending transition to its end state, in the order they
    /// would finish.
    pub fn settle(&mut self) -> SettleReport {
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by_key(|p| p.transition.end_ms());

        let mut report = SettleReport::default();
        for p in pending {
            let Some(node) = self.node_mut(p.node) else {
                report.orphaned += 1;
                continue;
            };
            if node.transition_generation != p.generation {
                report.superseded += 1;
                continue;
            }
            for (k, v) in p.transition.attrs {
                node.set_attr(&k, v);
            }
            for (k, v) in p.transition.styles {
                node.set_style(&k, v);
            }
            if p.transition.remove {
                // The node is known live here, so removal can't fail.
                let _ = self.remove(p.node);
            }
            report.applied += 1;
        }
        debug!(
            applied = report.applied,
            superseded = report.superseded,
            orphaned = report.orphaned,
            "transitions settled"
        );
        report
    }
}
