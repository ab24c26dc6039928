//! Recoloring regions after construction.

use layers::symbology::update_fill;
use options::{Config, Value, merge_value};
use scene::Transition;
use tracing::{debug, warn};

use crate::datamap::Datamap;
use crate::error::MapError;

impl Datamap {
    /// Recolors the regions named in `data`.
    ///
    /// An entry is either a color string or an object, colored by its
    /// `color`, `fillColor` or `fillKey`. Object entries are also merged over
    /// the region's stored data and written to `data-info`. With `reset`,
    /// every region first goes back to `defaultFill` and loses its data.
    pub fn update_choropleth(&mut self, data: &Config, reset: bool) -> Result<(), MapError> {
        let regions = self.surface.select_all(self.subunits, "datamaps-subunit");
        if reset {
            let default_fill = self.fills.get_str("defaultFill").map(str::to_string);
            for region in &regions {
                self.surface.edit(*region)?.attr("data-info", "{}");
                if let Some(fill) = &default_fill {
                    self.surface
                        .transition(*region, Transition::new().style("fill", fill.as_str()))?;
                }
            }
            self.data = Config::new();
        }

        let mut updated = 0;
        for (id, entry) in data.iter() {
            if id.is_empty() {
                continue;
            }
            let targets: Vec<_> = regions
                .iter()
                .copied()
                .filter(|r| self.surface.node(*r).is_some_and(|n| n.has_class(id)))
                .collect();

            if matches!(entry, Value::Object(_)) {
                let mut merged = entry.clone();
                merge_value(&mut merged, self.data.get(id).unwrap_or(&Value::Null));
                let info = merged.to_json_string();
                self.data.set(id, merged);
                for region in &targets {
                    self.surface.edit(*region)?.attr("data-info", info.as_str());
                }
            }

            let Some(fill) = update_fill(&self.fills, entry) else {
                warn!(region = id, "choropleth entry resolves to no color");
                continue;
            };
            for region in &targets {
                self.surface
                    .transition(*region, Transition::new().style("fill", fill.as_str()))?;
            }
            updated += targets.len();
        }
        debug!(updated, reset, "choropleth updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::map;
    use options::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn region<'m>(map: &'m crate::Datamap, id: &str) -> &'m scene::Node {
        let node = map.surface().select_all(map.subunits(), id)[0];
        map.surface().node(node).expect("region")
    }

    fn data(v: serde_json::Value) -> Config {
        Config::from_json(v).expect("data")
    }

    #[test]
    fn initial_data_colors_regions() {
        let map = map(json!({
            "fills": {"high": "#CC4731"},
            "data": {"AAA": {"fillKey": "high", "votes": 3}}
        }));
        assert_eq!(region(&map, "AAA").style("fill"), Some("#CC4731"));
        assert_eq!(region(&map, "BBB").style("fill"), Some("#ABDDA4"));
        assert_eq!(
            region(&map, "AAA").attr("data-info"),
            Some(r#"{"fillKey":"high","votes":3}"#)
        );
    }

    #[test]
    fn updates_merge_and_recolor() {
        let mut map = map(json!({
            "fills": {"high": "#CC4731", "low": "#2C7BB6"},
            "data": {"AAA": {"fillKey": "high", "votes": 3}}
        }));
        map.update_choropleth(
            &data(json!({"AAA": {"fillKey": "low"}, "BBB": "#000000"})),
            false,
        )
        .expect("updated");
        map.settle();

        assert_eq!(region(&map, "AAA").style("fill"), Some("#2C7BB6"));
        assert_eq!(
            region(&map, "AAA").attr("data-info"),
            Some(r#"{"fillKey":"low","votes":3}"#)
        );
        assert_eq!(region(&map, "BBB").style("fill"), Some("#000000"));
        // Bare colors don't touch stored data.
        assert_eq!(region(&map, "BBB").attr("data-info"), None);
        assert_eq!(
            map.data().get("AAA").map(|v| v.to_json()),
            Some(json!({"fillKey": "low", "votes": 3}))
        );
    }

    #[test]
    fn reset_repaints_everything_first() {
        let mut map = map(json!({
            "fills": {"high": "#CC4731"},
            "data": {"AAA": {"fillKey": "high"}, "BBB": {"fillKey": "high"}}
        }));
        map.update_choropleth(&data(json!({"BBB": {"fillColor": "#111111"}})), true)
            .expect("updated");
        let report = map.settle();

        assert_eq!(region(&map, "AAA").style("fill"), Some("#ABDDA4"));
        assert_eq!(region(&map, "AAA").attr("data-info"), Some("{}"));
        assert_eq!(region(&map, "BBB").style("fill"), Some("#111111"));
        assert_eq!(
            region(&map, "BBB").attr("data-info"),
            Some(r##"{"fillColor":"#111111"}"##)
        );
        // BBB's reset transition was superseded by its update.
        assert_eq!(report.superseded, 1);
    }
}
