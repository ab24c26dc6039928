//! The map instance: one svg surface, its regions and its capability layers.

use std::fmt;
use std::sync::Arc;

use formats::{DataType, FeatureCollection, Topology, load_data, load_topology};
use foundation::math::{LonLat, ProjectionKind};
use layers::engine::coord;
use layers::geography::draw_subunits;
use layers::registry;
use layers::{
    CachedLayer, Cartographer, GeometryEngine, LayerCache, LayerError, LayerHandle,
    RenderContext,
};
use options::{Callback, Config, Value, merge, merge_deep};
use scene::{NodeId, SettleReport, Surface};
use tracing::{debug, info};

use crate::defaults::{DEFAULT_ASPECT_RATIO, DEFAULT_WIDTH, default_options};
use crate::error::MapError;
use crate::projection::{projection_for, sphere_outline};

/// Typed completion hook; receives the handle of the layer that was drawn.
pub type LayerCallback = Arc<dyn Fn(LayerHandle) + Send + Sync>;

/// Optional arguments of a capability call.
///
/// `options` may be an object, which is resolved against the capability's
/// `<name>Config` defaults, or a callback, which then stands in for
/// `callback`.
#[derive(Clone, Default)]
pub struct Invocation {
    pub options: Option<Value>,
    pub callback: Option<Callback>,
    pub on_layer: Option<LayerCallback>,
    pub force_new_layer: bool,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("options", &self.options)
            .field("callback", &self.callback)
            .field("on_layer", &self.on_layer.as_ref().map(|_| "<fn>"))
            .field("force_new_layer", &self.force_new_layer)
            .finish()
    }
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: impl Into<Value>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Called once the handler returns, with the layer handle's text.
    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Called after `callback` with the drawn layer's handle.
    pub fn on_layer(mut self, on_layer: impl Fn(LayerHandle) + Send + Sync + 'static) -> Self {
        self.on_layer = Some(Arc::new(on_layer));
        self
    }

    pub fn force_new_layer(mut self) -> Self {
        self.force_new_layer = true;
        self
    }
}

pub struct Datamap {
    pub(crate) options: Config,
    pub(crate) surface: Surface,
    pub(crate) engine: Cartographer,
    pub(crate) features: FeatureCollection,
    pub(crate) fills: Config,
    pub(crate) filters: Config,
    /// Choropleth data keyed by region id.
    pub(crate) data: Config,
    pub(crate) subunits: NodeId,
    pub(crate) layers: LayerCache,
}

impl Datamap {
    /// Merges `options` over the defaults, decodes the `scope` object of
    /// `topology` and draws its regions.
    pub fn new(options: Config, topology: &Topology) -> Result<Self, MapError> {
        let mut options = options;
        merge_deep(&mut options, &[Some(&default_options())]);

        let responsive = options.get_bool("responsive").unwrap_or(false);
        let width = options.get_f64("width").unwrap_or(DEFAULT_WIDTH);
        let aspect_ratio = options
            .get_f64("aspectRatio")
            .unwrap_or(DEFAULT_ASPECT_RATIO);
        let height = match options.get_f64("height") {
            Some(h) if !responsive => h,
            _ => width * aspect_ratio,
        };
        options.set("width", width);
        options.set("height", height);

        let scope = options.get_str("scope").unwrap_or("world").to_string();
        let geo = options
            .get_object("geographyConfig")
            .cloned()
            .unwrap_or_default();
        let mut hidden = Vec::new();
        if geo.get_bool("hideAntarctica").unwrap_or(false) {
            hidden.push("ATA");
        }
        if geo.get_bool("hideHawaiiAndAlaska").unwrap_or(false) {
            hidden.extend(["HI", "AK"]);
        }
        let features = topology.feature(&scope)?.without_ids(&hidden);
        let projection = projection_for(&options, &features, width, height)?;

        let mut surface = Surface::new("svg");
        let root = surface.root();
        {
            let mut svg = surface.edit(root)?;
            svg.class("datamap").style("overflow", "hidden");
            if responsive {
                svg.attr("width", "100%")
                    .attr("height", "100%")
                    .attr("viewBox", format!("0 0 {} {}", coord(width), coord(height)))
                    .attr("data-width", coord(width))
                    .style("position", "absolute");
            } else {
                svg.attr("width", coord(width))
                    .attr("height", coord(height));
            }
        }
        if projection.kind == ProjectionKind::Orthographic {
            let defs = surface.append(root, "defs")?;
            let sphere = surface.append(defs, "path")?;
            surface
                .edit(sphere)?
                .attr("id", "sphere")
                .attr("d", sphere_outline(&projection));
            for class in ["stroke", "fill"] {
                let node = surface.append(root, "use")?;
                surface
                    .edit(node)?
                    .class(class)
                    .attr("xlink:href", "#sphere");
            }
        }
        let first = surface.children(root).first().copied();
        let subunits = surface.insert_before(root, "g", first)?;
        surface.edit(subunits)?.class("datamaps-subunits");

        let mut map = Self {
            fills: options.get_object("fills").cloned().unwrap_or_default(),
            filters: options.get_object("filters").cloned().unwrap_or_default(),
            data: options.get_object("data").cloned().unwrap_or_default(),
            options,
            surface,
            engine: Cartographer::new(projection),
            features,
            subunits,
            layers: LayerCache::new(),
        };

        let drawn = draw_subunits(&mut map.context(), &geo)?;
        if responsive {
            for region in map.surface.select_all(subunits, "datamaps-subunit") {
                map.surface
                    .edit(region)?
                    .style("vector-effect", "non-scaling-stroke");
            }
        }
        info!(scope = %scope, regions = drawn, width, height, "map drawn");

        if let Some(done) = map.options.get_callback("done") {
            let summary = Config::new()
                .with("scope", scope.as_str())
                .with("regions", drawn as f64)
                .with("width", width)
                .with("height", height);
            done.call(&summary.into(), &Value::Null);
        }
        Ok(map)
    }

    /// Fetches the topology at `geographyConfig.dataUrl`, draws the map and
    /// then applies the choropleth data at `dataUrl`, if any.
    pub async fn load(options: Config) -> Result<Self, MapError> {
        let mut resolved = options.clone();
        merge_deep(&mut resolved, &[Some(&default_options())]);
        let Some(topology_url) = resolved
            .get_object("geographyConfig")
            .and_then(|g| g.get_str("dataUrl"))
        else {
            return Err(MapError::MissingTopology);
        };
        let topology = load_topology(topology_url).await?;

        let data = match resolved.get_str("dataUrl") {
            Some(url) => {
                let kind = DataType::from_name(resolved.get_str("dataType").unwrap_or("json"))?;
                Some(load_data(url, kind).await?)
            }
            None => None,
        };

        let mut map = Self::new(options, &topology)?;
        if let Some(data) = data {
            map.update_choropleth(&data, false)?;
        }
        Ok(map)
    }

    pub(crate) fn context(&mut self) -> RenderContext<'_> {
        RenderContext {
            surface: &mut self.surface,
            engine: &self.engine,
            fills: &self.fills,
            filters: &self.filters,
            data: &self.data,
            features: &self.features,
            subunits: self.subunits,
        }
    }

    /// Calls the capability registered as `name`.
    ///
    /// Options are the call's own over `<name>Config`. Without
    /// `force_new_layer` the capability's previous layer is reused, and so
    /// are the last resolved options when the call brings none. A handler error
    /// leaves the surface and the layer cache as they were.
    pub fn invoke(
        &mut self,
        name: &str,
        data: &Value,
        invocation: Invocation,
    ) -> Result<LayerHandle, MapError> {
        let capability = registry::lookup(name)
            .ok_or_else(|| MapError::UnknownCapability(name.to_string()))?;
        let Invocation {
            options,
            mut callback,
            on_layer,
            force_new_layer,
        } = invocation;

        let explicit = match options {
            None | Some(Value::Null) => None,
            Some(Value::Callback(cb)) => {
                callback = Some(cb);
                None
            }
            Some(Value::Object(options)) => Some(options),
            Some(_) => {
                return Err(MapError::InvalidOptions {
                    capability: name.to_string(),
                });
            }
        };
        let defaults = self.options.get_object(&capability.defaults_key).cloned();
        let resolve = |options: Option<Config>| {
            let mut options = options.unwrap_or_default();
            merge(&mut options, &[defaults.as_ref()]);
            options
        };

        let cached = self
            .layers
            .get(name)
            .filter(|_| !force_new_layer)
            .cloned();
        let restyled = explicit.is_some();
        let (layer, options, fresh) = match cached {
            Some(cached) => {
                let options = match explicit {
                    Some(options) => resolve(Some(options)),
                    None => cached.options,
                };
                (cached.handle, options, false)
            }
            None => (self.add_layer(name)?, resolve(explicit), true),
        };

        let handler = capability.handler;
        if let Err(err) = handler(&mut self.context(), layer, data, &options) {
            if fresh {
                self.surface.remove(layer.node())?;
            }
            debug!(capability = name, error = %err, "capability failed");
            return Err(err.into());
        }
        if fresh || restyled {
            self.layers.insert(name, CachedLayer { handle: layer, options });
        }
        debug!(capability = name, %layer, fresh, "capability invoked");

        if let Some(callback) = callback {
            callback.call(&Value::from(layer.to_string()), &Value::Null);
        }
        if let Some(on_layer) = on_layer {
            on_layer(layer);
        }
        Ok(layer)
    }

    fn add_layer(&mut self, name: &str) -> Result<LayerHandle, MapError> {
        let root = self.surface.root();
        let node = self.surface.append(root, "g")?;
        self.surface.edit(node)?.class(name);
        Ok(LayerHandle(node))
    }

    pub fn bubbles(&mut self, data: &Value, invocation: Invocation) -> Result<LayerHandle, MapError> {
        self.invoke("bubbles", data, invocation)
    }

    pub fn arc(&mut self, data: &Value, invocation: Invocation) -> Result<LayerHandle, MapError> {
        self.invoke("arc", data, invocation)
    }

    pub fn labels(&mut self, data: &Value, invocation: Invocation) -> Result<LayerHandle, MapError> {
        self.invoke("labels", data, invocation)
    }

    pub fn legend(&mut self, data: &Value, invocation: Invocation) -> Result<LayerHandle, MapError> {
        self.invoke("legend", data, invocation)
    }

    pub fn graticule(&mut self, invocation: Invocation) -> Result<LayerHandle, MapError> {
        self.invoke("graticule", &Value::Null, invocation)
    }

    /// Adds a capability to the process-wide registry shared by every map.
    /// Returns `false` when `name` was already taken.
    pub fn register_capability<F>(name: &str, handler: F) -> bool
    where
        F: Fn(&mut RenderContext<'_>, LayerHandle, &Value, &Config) -> Result<(), LayerError>
            + Send
            + Sync
            + 'static,
    {
        registry::register(name, handler)
    }

    /// Screen position of a geographic point, `None` when it isn't visible.
    pub fn lat_lng_to_xy(&self, lat: f64, lng: f64) -> Option<[f64; 2]> {
        self.engine.project(LonLat::new(lng, lat))
    }

    /// Layer currently cached for `name`.
    pub fn layer(&self, name: &str) -> Option<LayerHandle> {
        self.layers.get(name).map(|l| l.handle)
    }

    /// Applies every pending transition.
    pub fn settle(&mut self) -> SettleReport {
        self.surface.settle()
    }

    pub fn to_svg(&self) -> String {
        scene::svg::to_svg(&self.surface)
    }

    pub fn options(&self) -> &Config {
        &self.options
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn data(&self) -> &Config {
        &self.data
    }

    pub fn subunits(&self) -> NodeId {
        self.subunits
    }

    pub fn width(&self) -> f64 {
        self.options.get_f64("width").unwrap_or(DEFAULT_WIDTH)
    }

    pub fn height(&self) -> f64 {
        self.options
            .get_f64("height")
            .unwrap_or(self.width() * DEFAULT_ASPECT_RATIO)
    }
}
