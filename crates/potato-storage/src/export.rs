//! Annotation export as JSON Lines, a JSON array or a delimited table.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use potato_core::errors::{ConfigError, PotatoResult, StorageError};
use potato_core::models::{BehaviorData, LabelAnnotation, SpanAnnotation};
use potato_session::UserAnnotationState;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    JsonLines,
    Csv,
    Tsv,
}

impl ExportFormat {
    /// `json`, `jsonl`, `csv` or `tsv`, case-insensitive.
    pub fn parse(format: &str) -> Result<Self, ConfigError> {
        match format.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            other => Err(ConfigError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonLines => "jsonl",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

/// One (annotator, instance) answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRecord<'a> {
    pub user_id: &'a str,
    pub instance_id: &'a str,
    pub label_annotations: Option<&'a LabelAnnotation>,
    pub span_annotations: &'a [SpanAnnotation],
    pub behavioral_data: Option<&'a BehaviorData>,
}

/// Answered instances of each user, in queue order.
pub fn records<'a>(states: &'a [UserAnnotationState]) -> Vec<AnnotationRecord<'a>> {
    let mut out = Vec::new();
    for state in states {
        let answered = state.answered_ids();
        for id in state.queue().ids() {
            if !answered.contains(id.as_str()) {
                continue;
            }
            out.push(AnnotationRecord {
                user_id: &state.user_id,
                instance_id: id,
                label_annotations: state.labels(id),
                span_annotations: state.spans(id).unwrap_or(&[]),
                behavioral_data: state.behavior(id),
            });
        }
    }
    out
}

/// Serialize every answer to `writer`. Returns the record count.
pub fn write_annotations<W: Write>(
    writer: &mut W,
    states: &[UserAnnotationState],
    format: ExportFormat,
) -> PotatoResult<usize> {
    let records = records(states);
    match format {
        ExportFormat::JsonLines => {
            for record in &records {
                serde_json::to_writer(&mut *writer, record)?;
                writer.write_all(b"\n").map_err(io_err)?;
            }
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &records)?;
            writer.write_all(b"\n").map_err(io_err)?;
        }
        ExportFormat::Csv => write_table(&mut *writer, &records, b',')?,
        ExportFormat::Tsv => write_table(&mut *writer, &records, b'\t')?,
    }
    writer.flush().map_err(io_err)?;
    Ok(records.len())
}

/// One row per answer. Columns are `user`, `instance_id`, one
/// `schema:::label` column per label seen in any answer, one
/// `span_annotation:::label` column (a JSON list) per span label seen, and
/// `behavioral_data` as JSON. Cells with no value stay empty.
fn write_table<W: Write>(
    writer: W,
    records: &[AnnotationRecord<'_>],
    delimiter: u8,
) -> PotatoResult<()> {
    let label_columns: BTreeSet<(&str, &str)> = records
        .iter()
        .filter_map(|r| r.label_annotations)
        .flat_map(|labels| {
            labels.iter().flat_map(|(schema, answers)| {
                answers.keys().map(move |label| (schema.as_str(), label.as_str()))
            })
        })
        .collect();
    let span_columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.span_annotations.iter().map(|s| s.label.as_str()))
        .collect();

    let mut table = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    let mut header = vec!["user".to_string(), "instance_id".to_string()];
    header.extend(label_columns.iter().map(|(schema, label)| format!("{schema}:::{label}")));
    header.extend(span_columns.iter().map(|label| format!("span_annotation:::{label}")));
    header.push("behavioral_data".to_string());
    table.write_record(&header).map_err(csv_err)?;

    for record in records {
        let mut row = vec![record.user_id.to_string(), record.instance_id.to_string()];
        row.extend(label_columns.iter().map(|(schema, label)| {
            record
                .label_annotations
                .and_then(|labels| labels.schema(schema))
                .and_then(|answers| answers.get(*label))
                .cloned()
                .unwrap_or_default()
        }));
        for label in &span_columns {
            let spans: Vec<&SpanAnnotation> = record
                .span_annotations
                .iter()
                .filter(|s| s.label == *label)
                .collect();
            row.push(if spans.is_empty() {
                String::new()
            } else {
                serde_json::to_string(&spans)?
            });
        }
        row.push(match record.behavioral_data {
            Some(behavior) if !behavior.is_empty() => serde_json::to_string(behavior)?,
            _ => String::new(),
        });
        table.write_record(&row).map_err(csv_err)?;
    }
    table.flush().map_err(io_err)?;
    Ok(())
}

/// Write every answer to `path`.
pub fn export_annotations(
    path: &Path,
    states: &[UserAnnotationState],
    format: ExportFormat,
) -> PotatoResult<usize> {
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let count = write_annotations(&mut writer, states, format)?;
    info!(path = %path.display(), records = count, format = format.extension(), "annotations exported");
    Ok(count)
}

fn csv_err(e: csv::Error) -> StorageError {
    StorageError::Io {
        message: e.to_string(),
    }
}

fn io_err(e: std::io::Error) -> StorageError {
    StorageError::Io {
        message: e.to_string(),
    }
}
