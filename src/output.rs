//! Output formatting and persistence for classified station snapshots.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::PollutantKind;
use crate::view::StationRow;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One classified reading, as written to the snapshot CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub timestamp: DateTime<Utc>,
    pub station_id: String,
    pub station_name: String,
    pub pollutant: PollutantKind,
    /// Empty in the CSV when the station had no reading.
    pub value: Option<f64>,
    pub category: String,
    pub color: String,
}

impl StationSnapshot {
    pub fn from_row(row: &StationRow<'_>, kind: PollutantKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            station_id: row.station.id.clone(),
            station_name: row.station.name.clone(),
            pollutant: kind,
            value: row.value,
            category: row.label.to_string(),
            color: row.color.to_string(),
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends snapshot rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, snapshots: &[StationSnapshot]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = snapshots.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for snapshot in snapshots {
        writer.serialize(snapshot)?;
    }
    writer.flush()?;

    Ok(())
}
