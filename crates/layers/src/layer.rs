use std::fmt;

use options::Config;
use scene::NodeId;

/// Group node a capability draws into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub NodeId);

impl LayerHandle {
    pub fn node(self) -> NodeId {
        self.0
    }
}

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedLayer {
    pub handle: LayerHandle,
    /// Options resolved by the invocation that created the layer.
    pub options: Config,
}

/// Per-instance cache: capability name to its current layer.
///
/// Replacing an entry forgets the old layer without removing it from the
/// surface; its elements stay drawn.
#[derive(Debug, Clone, Default)]
pub struct LayerCache {
    entries: Vec<(String, CachedLayer)>,
}

impl LayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CachedLayer> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, l)| l)
    }

    pub fn insert(&mut self, name: &str, layer: CachedLayer) -> Option<CachedLayer> {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, layer)),
            None => {
                self.entries.push((name.to_string(), layer));
                None
            }
        }
    }

    pub fn handles(&self) -> impl Iterator<Item = LayerHandle> + '_ {
        self.entries.iter().map(|(_, l)| l.handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
