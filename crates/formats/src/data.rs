//! Choropleth data payloads.
//!
//! Data maps a region id to its datum: `{"USA": {"fillKey": "high"}, ...}`.
//! CSV payloads are one row per region with an `id` column and are re-keyed
//! into the same shape.

use options::{Config, Value};
use tracing::{debug, warn};

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    Json,
    Csv,
}

impl DataType {
    pub fn from_name(name: &str) -> Result<Self, DataError> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(DataType::Json),
            "csv" => Ok(DataType::Csv),
            _ => Err(DataError::UnknownDataType(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Json => "json",
            DataType::Csv => "csv",
        }
    }
}

/// Parses a data payload into region-keyed data.
pub fn parse_data(bytes: &[u8], kind: DataType) -> Result<Config, DataError> {
    let data = match kind {
        DataType::Json => parse_json(bytes)?,
        DataType::Csv => parse_csv(bytes)?,
    };
    debug!(kind = kind.name(), regions = data.len(), "data parsed");
    Ok(data)
}

fn parse_json(bytes: &[u8]) -> Result<Config, DataError> {
    let json: serde_json::Value = serde_json::from_slice(bytes)?;
    Config::from_json(json).ok_or(DataError::NotAnObject)
}

fn parse_csv(bytes: &[u8]) -> Result<Config, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut data = Config::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let mut row = Config::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.set(header, cell_value(header, cell));
        }
        let Some(id) = row.get_str("id").filter(|id| !id.is_empty()).map(str::to_string) else {
            warn!(row = line + 1, "csv row has no id; skipped");
            continue;
        };
        data.set(id, row);
    }
    Ok(data)
}

/// Numeric cells become numbers; the id column always stays a string.
fn cell_value(header: &str, cell: &str) -> Value {
    if header != "id"
        && let Ok(n) = cell.parse::<f64>()
        && n.is_finite()
    {
        return Value::Number(n);
    }
    Value::from(cell)
}
