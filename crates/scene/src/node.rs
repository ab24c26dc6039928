use foundation::handles::Handle;
use options::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub Handle);

impl NodeId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// One element in the surface tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub text: Option<String>,
    /// Datum bound by the last join that touched this node.
    pub datum: Option<Value>,
    /// Join key the datum was bound under.
    pub key: Option<String>,
    /// Options in force when the node's listeners were attached.
    pub listener_options: Option<Value>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Bumped by every scheduled transition; older pending ones are stale.
    pub(crate) transition_generation: u64,
}

impl Node {
    pub(crate) fn new(tag: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
            styles: Vec::new(),
            text: None,
            datum: None,
            key: None,
            listener_options: None,
            parent,
            children: Vec::new(),
            transition_generation: 0,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        lookup(&self.attrs, name)
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        lookup(&self.styles, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: String) {
        upsert(&mut self.attrs, name, value);
    }

    pub(crate) fn set_style(&mut self, name: &str, value: String) {
        upsert(&mut self.styles, name, value);
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        for c in class.split_whitespace() {
            if !self.has_class(c) {
                self.classes.push(c.to_string());
            }
        }
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn upsert(pairs: &mut Vec<(String, String)>, name: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == name) {
        Some((_, v)) => *v = value,
        None => pairs.push((name.to_string(), value)),
    }
}
