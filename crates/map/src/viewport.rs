//! Resizing and zooming.

use std::iter;

use layers::engine::coord;
use layers::{GeometryEngine, LayerHandle};
use options::format_number;
use scene::NodeId;
use tracing::debug;

use crate::datamap::Datamap;
use crate::error::MapError;

/// Share of the viewport a zoomed-to region fills.
const ZOOM_TO_FILL: f64 = 0.9;

impl Datamap {
    /// Scales every group to a container now `new_width` pixels wide.
    /// Only responsive maps resize; the others keep their fixed size.
    pub fn resize(&mut self, new_width: f64) -> Result<(), MapError> {
        if !self.options.get_bool("responsive").unwrap_or(false) {
            return Ok(());
        }
        let old_width = self.width();
        if !(new_width.is_finite() && old_width > 0.0) {
            return Ok(());
        }
        let transform = format!("scale({})", format_number(new_width / old_width));
        let root = self.surface.root();
        let groups: Vec<NodeId> = self
            .surface
            .descendants(root)
            .into_iter()
            .filter(|id| self.surface.node(*id).is_some_and(|n| n.tag == "g"))
            .collect();
        for group in groups {
            self.surface
                .edit(group)?
                .attr("transform", transform.as_str());
        }
        debug!(new_width, old_width, "resized");
        Ok(())
    }

    /// Zooms the regions and every cached layer. `scale` is clamped to
    /// `zoomScale`; the clamped scale is returned.
    pub fn zoom(&mut self, scale: f64, translate: [f64; 2]) -> Result<f64, MapError> {
        let scale = self.clamp_zoom(scale);
        let transform = format!(
            "translate({},{})scale({})",
            coord(translate[0]),
            coord(translate[1]),
            format_number(scale)
        );
        let groups: Vec<NodeId> = iter::once(self.subunits)
            .chain(self.layers.handles().map(LayerHandle::node))
            .collect();
        for group in groups {
            self.surface
                .edit(group)?
                .attr("transform", transform.as_str());
        }
        debug!(scale, ?translate, "zoomed");
        Ok(scale)
    }

    /// Zooms so region `id` fills most of the viewport.
    pub fn zoom_to(&mut self, id: &str) -> Result<f64, MapError> {
        let bounds = self
            .features
            .get(id)
            .and_then(|f| self.engine.bounds(&f.geometry))
            .ok_or_else(|| MapError::UnknownRegion(id.to_string()))?;
        let (width, height) = (self.width(), self.height());
        let fit = ZOOM_TO_FILL / (bounds.width() / width).max(bounds.height() / height);
        let scale = self.clamp_zoom(fit);
        let [cx, cy] = bounds.center();
        self.zoom(
            scale,
            [width / 2.0 - scale * cx, height / 2.0 - scale * cy],
        )
    }

    fn clamp_zoom(&self, scale: f64) -> f64 {
        let [lo, hi] = self.options.get_pair("zoomScale").unwrap_or([1.0, 10.0]);
        if scale.is_nan() {
            return lo;
        }
        scale.max(lo).min(hi)
    }
}
