//! Capability registry.
//!
//! A capability is a named handler that draws `data` into a layer. The
//! process-wide table behind [`global`] is shared by every map instance and
//! only ever grows: registering a name that is already present keeps the
//! first handler and ignores the new one.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use options::{Config, Value};
use parking_lot::RwLock;
use tracing::debug;

use crate::context::RenderContext;
use crate::error::LayerError;
use crate::layer::LayerHandle;

pub type Handler = Arc<
    dyn Fn(&mut RenderContext<'_>, LayerHandle, &Value, &Config) -> Result<(), LayerError>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct Capability {
    pub name: String,
    /// Instance option holding this capability's defaults, `<name>Config`.
    pub defaults_key: String,
    pub handler: Handler,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("defaults_key", &self.defaults_key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    capabilities: Vec<Capability>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `bubbles`, `legend`, `arc`, `labels` and
    /// `graticule`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("bubbles", crate::bubbles::handle_bubbles);
        registry.register("legend", crate::legend::handle_legend);
        registry.register("arc", crate::arc::handle_arcs);
        registry.register("labels", crate::labels::handle_labels);
        registry.register("graticule", crate::graticule::handle_graticule);
        registry
    }

    /// Registers `handler` under `name`. Returns `false`, leaving the
    /// existing handler in place, when `name` is already taken.
    pub fn register<F>(&mut self, name: &str, handler: F) -> bool
    where
        F: Fn(&mut RenderContext<'_>, LayerHandle, &Value, &Config) -> Result<(), LayerError>
            + Send
            + Sync
            + 'static,
    {
        self.register_handler(name, Arc::new(handler))
    }

    pub fn register_handler(&mut self, name: &str, handler: Handler) -> bool {
        if self.contains(name) {
            debug!(capability = name, "already registered; keeping the first handler");
            return false;
        }
        self.capabilities.push(Capability {
            name: name.to_string(),
            defaults_key: format!("{name}Config"),
            handler,
        });
        debug!(capability = name, "capability registered");
        true
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

static GLOBAL: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::with_builtins()));

/// The process-wide registry, populated with the built-ins on first use.
pub fn global() -> &'static RwLock<Registry> {
    &GLOBAL
}

/// Registers into the process-wide registry.
pub fn register<F>(name: &str, handler: F) -> bool
where
    F: Fn(&mut RenderContext<'_>, LayerHandle, &Value, &Config) -> Result<(), LayerError>
        + Send
        + Sync
        + 'static,
{
    GLOBAL.write().register(name, handler)
}

/// Copy of a process-wide registration. The lock is released before the
/// caller dispatches, so handlers may register further capabilities.
pub fn lookup(name: &str) -> Option<Capability> {
    GLOBAL.read().get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::{Registry, global, lookup, register};
    use crate::context::RenderContext;
    use crate::error::LayerError;
    use crate::layer::LayerHandle;
    use crate::testing::Fixture;
    use options::{Config, Value};
    use pretty_assertions::assert_eq;

    fn noop(
        _: &mut RenderContext<'_>,
        _: LayerHandle,
        _: &Value,
        _: &Config,
    ) -> Result<(), LayerError> {
        Ok(())
    }

    fn failing(
        _: &mut RenderContext<'_>,
        _: LayerHandle,
        _: &Value,
        _: &Config,
    ) -> Result<(), LayerError> {
        Err(LayerError::InvalidDatum("second handler".into()))
    }

    #[test]
    fn builtins_are_registered_in_order() {
        let registry = Registry::with_builtins();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["bubbles", "legend", "arc", "labels", "graticule"]
        );
        assert_eq!(
            registry.get("arc").map(|c| c.defaults_key.as_str()),
            Some("arcConfig")
        );
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = Registry::new();
        assert!(registry.register("x", noop));
        assert!(!registry.register("x", failing));
        assert_eq!(registry.len(), 1);

        let mut fixture = Fixture::new();
        let layer = fixture.layer("x");
        let handler = registry.get("x").expect("x").handler.clone();
        assert_eq!(
            handler(&mut fixture.ctx(), layer, &Value::Null, &Config::new()),
            Ok(())
        );
    }

    #[test]
    fn global_registry_is_shared_and_append_only() {
        assert!(global().read().contains("bubbles"));
        assert!(register("registry-test-capability", noop));
        assert!(!register("registry-test-capability", failing));
        assert!(!register("bubbles", noop));
        assert!(lookup("registry-test-capability").is_some());
        assert!(lookup("never-registered").is_none());
    }
}
