//! Hover state for regions, bubbles and arcs.
//!
//! Elements drawn with hover enabled carry `data-on-mouseover="hover"` and
//! `data-on-mouseout="unhover"`; a host forwards those events to
//! [`Datamap::hover`] and [`Datamap::unhover`].

use layers::symbology::val;
use options::{Config, Value};
use scene::{NodeId, SurfaceError};
use tracing::debug;

use crate::datamap::Datamap;
use crate::error::MapError;

const PREVIOUS: &str = "data-previousAttributes";

/// Highlight options and the styles they replace.
const HIGHLIGHTS: [(&str, &str); 5] = [
    ("highlightFillColor", "fill"),
    ("highlightBorderColor", "stroke"),
    ("highlightBorderWidth", "stroke-width"),
    ("highlightBorderOpacity", "stroke-opacity"),
    ("highlightFillOpacity", "fill-opacity"),
];

impl Datamap {
    /// Puts `node` in its hover state and returns its popup markup, if
    /// popups are enabled for it. Highlighted styles are remembered so
    /// [`Datamap::unhover`] can restore them.
    pub fn hover(&mut self, node: NodeId) -> Result<Option<String>, MapError> {
        let Some((options, datum, data)) = self.hover_target(node)? else {
            return Ok(None);
        };

        if options.get_bool("highlightOnHover").unwrap_or(false) {
            let el = self.surface.node(node).ok_or(SurfaceError::StaleNode(node))?;
            let remembered = el.attr(PREVIOUS).is_some();
            let previous: Config = HIGHLIGHTS
                .iter()
                .map(|(_, style)| (*style, Value::from(el.style(style))))
                .collect();

            let mut el = self.surface.edit(node)?;
            if !remembered {
                el.attr(PREVIOUS, Value::from(previous).to_json_string());
            }
            for (option, style) in HIGHLIGHTS {
                let value = val(
                    data.field(option),
                    options.get(option).unwrap_or(&Value::Null),
                    &datum,
                );
                if !value.is_loose_null() {
                    el.style_value(style, &value);
                }
            }
        }

        if !options.get_bool("popupOnHover").unwrap_or(false) {
            return Ok(None);
        }
        let popup = options
            .get_callback("popupTemplate")
            .and_then(|template| template.call(&datum, &data).to_attr_string());
        debug!(node = %node.0, popup = popup.is_some(), "hover");
        Ok(popup)
    }

    /// Restores the styles [`Datamap::hover`] replaced.
    pub fn unhover(&mut self, node: NodeId) -> Result<(), MapError> {
        let el = self.surface.node(node).ok_or(SurfaceError::StaleNode(node))?;
        let Some(previous) = el
            .attr(PREVIOUS)
            .and_then(|text| serde_json::from_str(text).ok())
            .and_then(Config::from_json)
        else {
            return Ok(());
        };

        let mut el = self.surface.edit(node)?;
        for (style, value) in previous.iter() {
            el.style_value(style, value);
        }
        el.attr_value(PREVIOUS, &Value::Null);
        Ok(())
    }

    /// The options, datum and data that drive `node`'s hover state.
    fn hover_target(&self, node: NodeId) -> Result<Option<(Config, Value, Value)>, MapError> {
        let el = self.surface.node(node).ok_or(SurfaceError::StaleNode(node))?;
        let datum = el.datum.clone().unwrap_or_default();

        if el.has_class("datamaps-subunit") {
            let options = self
                .options
                .get_object("geographyConfig")
                .cloned()
                .unwrap_or_default();
            let data = datum
                .field("id")
                .as_str()
                .and_then(|id| self.data.get(id))
                .cloned()
                .unwrap_or_default();
            return Ok(Some((options, datum, data)));
        }

        if let Some(Value::Object(options)) = &el.listener_options {
            return Ok(Some((options.clone(), datum.clone(), datum)));
        }
        let capability = if el.has_class("datamaps-bubble") {
            "bubbles"
        } else if el.has_class("datamaps-arc") {
            "arc"
        } else {
            return Ok(None);
        };
        let options = match self.layers.get(capability) {
            Some(layer) => layer.options.clone(),
            None => self
                .options
                .get_object(&format!("{capability}Config"))
                .cloned()
                .unwrap_or_default(),
        };
        Ok(Some((options, datum.clone(), datum)))
    }
}
