//! Shared fixtures: a small world of two square regions plus Antarctica.

use formats::Topology;
use options::Config;
use serde_json::json;

use crate::datamap::Datamap;

pub(crate) fn world_json() -> serde_json::Value {
    json!({
        "type": "Topology",
        "objects": {
            "world": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": "AAA", "properties": {"name": "Alpha"}, "arcs": [[0]]},
                    {"type": "Polygon", "id": "BBB", "properties": {"name": "Beta"}, "arcs": [[1]]},
                    {"type": "Polygon", "id": "ATA", "properties": {"name": "Antarctica"}, "arcs": [[2]]}
                ]
            }
        },
        "arcs": [
            [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
            [[20, 0], [30, 0], [30, 10], [20, 10], [20, 0]],
            [[0, -80], [10, -80], [10, -70], [0, -70], [0, -80]]
        ]
    })
}

pub(crate) fn topology() -> Topology {
    Topology::from_json(world_json()).expect("topology")
}

pub(crate) fn options_with(json: serde_json::Value) -> Config {
    Config::from_json(json).expect("options object")
}

pub(crate) fn map(json: serde_json::Value) -> Datamap {
    Datamap::new(options_with(json), &topology()).expect("map")
}
