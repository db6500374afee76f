// src/job.rs - Segment job files (JSON array or TOML [[segments]])
use std::path::Path;

use extruplan_shared::{Segment, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Unsupported segment file format: '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),
    #[error("Invalid segment #{index}: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFormat {
    Json,
    Toml,
}

impl JobFormat {
    pub fn from_path(path: &Path) -> Result<Self, JobError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(JobFormat::Json),
            "toml" => Ok(JobFormat::Toml),
            _ => Err(JobError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

// Unvalidated entries, so a bad value can be reported with its position.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct SegmentRecord {
    length: f64,
    feed_rate: f64,
    extrusion: f64,
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            length: segment.length(),
            feed_rate: segment.feed_rate(),
            extrusion: segment.extrusion(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlJob {
    #[serde(default)]
    segments: Vec<SegmentRecord>,
}

fn validate(records: Vec<SegmentRecord>) -> Result<Vec<Segment>, JobError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, r)| {
            Segment::new(r.length, r.feed_rate, r.extrusion)
                .map_err(|source| JobError::Invalid { index, source })
        })
        .collect()
}

pub fn parse_segments(contents: &str, format: JobFormat) -> Result<Vec<Segment>, JobError> {
    let records = match format {
        JobFormat::Json => serde_json::from_str::<Vec<SegmentRecord>>(contents)?,
        JobFormat::Toml => toml::from_str::<TomlJob>(contents)?.segments,
    };
    validate(records)
}

pub fn render_segments(segments: &[Segment], format: JobFormat) -> Result<String, JobError> {
    let records: Vec<SegmentRecord> = segments.iter().map(SegmentRecord::from).collect();
    Ok(match format {
        JobFormat::Json => serde_json::to_string_pretty(&records)?,
        JobFormat::Toml => toml::to_string(&TomlJob { segments: records })?,
    })
}

pub fn load_segments(path: impl AsRef<Path>) -> Result<Vec<Segment>, JobError> {
    let path = path.as_ref();
    let format = JobFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)?;
    let segments = parse_segments(&contents, format)?;
    tracing::info!("Loaded {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

pub fn save_segments(path: impl AsRef<Path>, segments: &[Segment]) -> Result<(), JobError> {
    let path = path.as_ref();
    let format = JobFormat::from_path(path)?;
    std::fs::write(path, render_segments(segments, format)?)?;
    tracing::info!("Wrote {} segments to {}", segments.len(), path.display());
    Ok(())
}
