//! Async payload loading.
//!
//! A source is either an `http(s)://` URL, fetched with reqwest, or a local
//! file path read with tokio.

use tracing::debug;

use crate::data::{DataType, parse_data};
use crate::error::LoadError;
use crate::topology::Topology;
use options::Config;

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Raw bytes of `source`. Non-success HTTP statuses are errors.
pub async fn load_bytes(source: &str) -> Result<Vec<u8>, LoadError> {
    if is_remote(source) {
        let http = |err| LoadError::Http {
            source: source.to_string(),
            err,
        };
        let resp = reqwest::Client::new()
            .get(source)
            .send()
            .await
            .map_err(http)?
            .error_for_status()
            .map_err(http)?;
        let bytes = resp.bytes().await.map_err(http)?;
        debug!(source, bytes = bytes.len(), "fetched");
        return Ok(bytes.to_vec());
    }

    let bytes = tokio::fs::read(source).await.map_err(|err| LoadError::Io {
        source: source.to_string(),
        err,
    })?;
    debug!(source, bytes = bytes.len(), "read");
    Ok(bytes)
}

pub async fn load_topology(source: &str) -> Result<Topology, LoadError> {
    let bytes = load_bytes(source).await?;
    Ok(Topology::from_slice(&bytes)?)
}

pub async fn load_data(source: &str, kind: DataType) -> Result<Config, LoadError> {
    let bytes = load_bytes(source).await?;
    Ok(parse_data(&bytes, kind)?)
}

#[cfg(test)]
mod tests {
    use super::{is_remote, load_data, load_topology};
    use crate::data::DataType;
    use crate::error::LoadError;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("formats-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write");
        path
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.com/world.topo.json"));
        assert!(!is_remote("data/world.topo.json"));
    }

    #[tokio::test]
    async fn loads_topology_from_disk() {
        let path = temp_file(
            "tiny.topo.json",
            r#"{"type":"Topology","objects":{"world":{"type":"GeometryCollection","geometries":[
                {"type":"Point","id":"X","coordinates":[1,2]}]}},"arcs":[]}"#,
        );
        let topo = load_topology(path.to_str().expect("utf8")).await.expect("topology");
        let fc = topo.feature("world").expect("world");
        assert_eq!(fc.features.len(), 1);
    }

    #[tokio::test]
    async fn loads_csv_data_from_disk() {
        let path = temp_file("votes.csv", "id,fillKey\nNY,blue\n");
        let data = load_data(path.to_str().expect("utf8"), DataType::Csv)
            .await
            .expect("data");
        assert_eq!(
            data.get_object("NY").and_then(|r| r.get_str("fillKey")),
            Some("blue")
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = load_topology("/definitely/not/here.topo.json")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
