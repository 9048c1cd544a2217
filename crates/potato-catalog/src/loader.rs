//! Input file parsing: JSON (array or one object per line), JSON Lines and
//! delimited text with a header row.

use std::path::Path;

use potato_core::errors::ConfigError;
use serde_json::{Map, Value};

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    JsonLines,
    Csv,
    Tsv,
}

impl InputFormat {
    /// Infer from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            other => Err(ConfigError::UnsupportedFormat {
                format: if other.is_empty() {
                    path.display().to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }

    /// Field separator of the tabular formats.
    pub fn delimiter(self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Json | Self::JsonLines => None,
        }
    }
}

/// Read every record of an input file.
pub fn read_records(path: &Path) -> Result<Vec<Map<String, Value>>, ConfigError> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_records(&content, format)
}

/// Parse records from a string. A `.json` file holding a single array is
/// accepted as well as one object per line.
pub fn parse_records(
    content: &str,
    format: InputFormat,
) -> Result<Vec<Map<String, Value>>, ConfigError> {
    if let Some(delimiter) = format.delimiter() {
        return parse_delimited(content, delimiter);
    }
    if format == InputFormat::Json {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(content) {
            return items.into_iter().map(into_object).collect();
        }
    }
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            serde_json::from_str::<Value>(line)
                .map_err(|e| ConfigError::Parse {
                    message: e.to_string(),
                })
                .and_then(into_object)
        })
        .collect()
}

/// Every cell is kept as a string, ids included. Empty cells are left out
/// of the record.
fn parse_delimited(
    content: &str,
    delimiter: u8,
) -> Result<Vec<Map<String, Value>>, ConfigError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(content.as_bytes());
    let headers = reader.headers().map_err(csv_err)?.clone();
    reader
        .records()
        .map(|row| -> Result<Map<String, Value>, ConfigError> {
            let row = row.map_err(csv_err)?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(column, cell)| (column.to_string(), Value::String(cell.to_string())))
                .collect())
        })
        .collect()
}

fn csv_err(e: csv::Error) -> ConfigError {
    ConfigError::Parse {
        message: e.to_string(),
    }
}

fn into_object(v: Value) -> Result<Map<String, Value>, ConfigError> {
    match v {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::Parse {
            message: format!("expected a JSON object, found {other}"),
        }),
    }
}

/// Read the id field; numbers are stringified.
pub fn record_id(record: &Map<String, Value>, id_key: &str) -> Result<String, ConfigError> {
    match record.get(id_key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ConfigError::MissingField {
            field: id_key.to_string(),
        }),
    }
}
