use foundation::handles::Handle;
use options::Value;
use tracing::trace;

use crate::error::SurfaceError;
use crate::node::{Node, NodeId};
use crate::transition::Pending;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed element tree with a fixed root.
#[derive(Debug)]
pub struct Surface {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    pub(crate) pending: Vec<Pending>,
}

impl Surface {
    pub fn new(root_tag: &str) -> Self {
        let root = NodeId(Handle::new(0, 0));
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(root_tag, None)),
            }],
            free: Vec::new(),
            root,
            pending: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.0.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.0.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn live(&self, id: NodeId) -> Result<&Node, SurfaceError> {
        self.node(id).ok_or(SurfaceError::StaleNode(id))
    }

    /// Chainable editor for a live node.
    pub fn edit(&mut self, id: NodeId) -> Result<NodeMut<'_>, SurfaceError> {
        let node = self.node_mut(id).ok_or(SurfaceError::StaleNode(id))?;
        Ok(NodeMut { node })
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Appends a new `tag` element as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, SurfaceError> {
        self.insert_before(parent, tag, None)
    }

    /// Inserts a new `tag` element before `before` (or last when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        tag: &str,
        before: Option<NodeId>,
    ) -> Result<NodeId, SurfaceError> {
        let position = {
            let p = self.live(parent)?;
            match before {
                Some(sibling) => Some(
                    p.children
                        .iter()
                        .position(|c| *c == sibling)
                        .ok_or(SurfaceError::NotAChild {
                            parent,
                            child: sibling,
                        })?,
                ),
                None => None,
            }
        };

        let id = self.allocate(Node::new(tag, Some(parent)));
        let p = self.node_mut(parent).ok_or(SurfaceError::StaleNode(parent))?;
        match position {
            Some(i) => p.children.insert(i, id),
            None => p.children.push(id),
        }
        trace!(node = %id.0, tag, "node created");
        Ok(id)
    }

    /// Removes `id` and its whole subtree. Handles to removed nodes go stale.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SurfaceError> {
        if id == self.root {
            return Err(SurfaceError::RootRemoval);
        }
        let parent = self.live(id)?.parent;
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        for doomed in self.descendants(id) {
            self.release(doomed);
        }
        Ok(())
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.node(next) else {
                continue;
            };
            out.push(next);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `scope` (excluding `scope`) carrying `class`.
    pub fn select_all(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|id| self.node(*id).is_some_and(|n| n.has_class(class)))
            .collect()
    }

    /// Every node in the tree carrying `class`, root included.
    pub fn select_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|n| n.has_class(class)))
            .collect()
    }

    /// First descendant of the root carrying every class in `classes`.
    pub fn select_first(&self, classes: &[&str]) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|id| {
            self.node(*id)
                .is_some_and(|n| classes.iter().all(|c| n.has_class(c)))
        })
    }

    /// Records an event listener as an inert `data-on-<event>` attribute.
    pub fn on(&mut self, id: NodeId, event: &str, handler: &str) -> Result<(), SurfaceError> {
        self.edit(id)?.attr(&format!("data-on-{event}"), handler);
        Ok(())
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId(Handle::new(index, slot.generation))
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId(Handle::new(index, 0))
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index() as usize)
            && slot.generation == id.0.generation()
            && slot.node.take().is_some()
        {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index());
        }
    }
}

/// Chainable node editor returned by [`Surface::edit`].
pub struct NodeMut<'a> {
    node: &'a mut Node,
}

impl NodeMut<'_> {
    pub fn attr(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.node.set_attr(name, value.into());
        self
    }

    /// Sets an attribute from an option value; non-scalar values remove it.
    pub fn attr_value(&mut self, name: &str, value: &Value) -> &mut Self {
        match value.to_attr_string() {
            Some(v) => self.node.set_attr(name, v),
            None => self.node.attrs.retain(|(k, _)| k != name),
        }
        self
    }

    pub fn style(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.node.set_style(name, value.into());
        self
    }

    /// Sets a style from an option value; non-scalar values remove it.
    pub fn style_value(&mut self, name: &str, value: &Value) -> &mut Self {
        match value.to_attr_string() {
            Some(v) => self.node.set_style(name, v),
            None => self.node.styles.retain(|(k, _)| k != name),
        }
        self
    }

    pub fn class(&mut self, class: &str) -> &mut Self {
        self.node.add_class(class);
        self
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.node.text = Some(text.into());
        self
    }

    pub fn datum(&mut self, datum: Value) -> &mut Self {
        self.node.datum = Some(datum);
        self
    }

    pub fn listener_options(&mut self, options: Value) -> &mut Self {
        self.node.listener_options = Some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Surface;
    use crate::error::SurfaceError;
    use options::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_and_edit() {
        let mut s = Surface::new("svg");
        let g = s.append(s.root(), "g").expect("append");
        s.edit(g)
            .expect("live")
            .class("datamaps-subunits")
            .attr("transform", "scale(1)")
            .style("fill", "#ABDDA4");

        let node = s.node(g).expect("node");
        assert!(node.has_class("datamaps-subunits"));
        assert_eq!(node.attr("transform"), Some("scale(1)"));
        assert_eq!(node.style("fill"), Some("#ABDDA4"));
        assert_eq!(s.parent(g), Some(s.root()));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn insert_before_orders_children() {
        let mut s = Surface::new("svg");
        let a = s.append(s.root(), "g").expect("a");
        let b = s.insert_before(s.root(), "path", Some(a)).expect("b");
        assert_eq!(s.children(s.root()), &[b, a]);
    }

    #[test]
    fn insert_before_foreign_sibling_fails() {
        let mut s = Surface::new("svg");
        let a = s.append(s.root(), "g").expect("a");
        let inner = s.append(a, "path").expect("inner");
        let err = s.insert_before(s.root(), "g", Some(inner)).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::NotAChild {
                parent: s.root(),
                child: inner
            }
        );
    }

    #[test]
    fn remove_frees_subtree_and_stales_handles() {
        let mut s = Surface::new("svg");
        let g = s.append(s.root(), "g").expect("g");
        let c = s.append(g, "circle").expect("c");
        s.remove(g).expect("remove");

        assert!(!s.contains(g));
        assert!(!s.contains(c));
        assert!(s.children(s.root()).is_empty());
        assert_eq!(s.edit(c).err(), Some(SurfaceError::StaleNode(c)));

        // Slot reuse hands out a new generation.
        let again = s.append(s.root(), "g").expect("again");
        assert_ne!(again, g);
        assert_ne!(again, c);
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut s = Surface::new("svg");
        assert_eq!(s.remove(s.root()), Err(SurfaceError::RootRemoval));
    }

    #[test]
    fn select_all_walks_descendants_in_order() {
        let mut s = Surface::new("svg");
        let g = s.append(s.root(), "g").expect("g");
        let a = s.append(g, "circle").expect("a");
        let b = s.append(g, "circle").expect("b");
        s.edit(a).expect("a").class("datamaps-bubble");
        s.edit(b).expect("b").class("datamaps-bubble other");

        assert_eq!(s.select_all(s.root(), "datamaps-bubble"), vec![a, b]);
        assert_eq!(s.select_first(&["datamaps-bubble", "other"]), Some(b));
    }

    #[test]
    fn select_by_class_includes_the_root() {
        let mut s = Surface::new("svg");
        let root = s.root();
        s.edit(root).expect("root").class("datamap");
        let g = s.append(root, "g").expect("g");
        let inner = s.append(g, "g").expect("inner");
        s.edit(inner).expect("inner").class("datamap");
        assert_eq!(s.select_by_class("datamap"), vec![root, inner]);
        assert!(s.select_by_class("missing").is_empty());
    }

    #[test]
    fn value_setters_drop_non_scalars() {
        let mut s = Surface::new("svg");
        let c = s.append(s.root(), "circle").expect("c");
        s.edit(c)
            .expect("c")
            .attr_value("r", &Value::from(5))
            .style_value("fill", &Value::from("#fff"));
        s.edit(c).expect("c").attr_value("r", &Value::Null);

        let node = s.node(c).expect("node");
        assert_eq!(node.attr("r"), None);
        assert_eq!(node.style("fill"), Some("#fff"));
    }

    #[test]
    fn listeners_are_recorded_as_attributes() {
        let mut s = Surface::new("svg");
        let c = s.append(s.root(), "path").expect("c");
        s.on(c, "mouseover", "highlight").expect("on");
        assert_eq!(
            s.node(c).and_then(|n| n.attr("data-on-mouseover")),
            Some("highlight")
        );
    }
}
