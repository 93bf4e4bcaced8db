//! Output formatting and persistence for zone summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;
use tracing::debug;

use crate::error::Result;
use crate::summary::ZoneSummary;

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &ZoneSummary) {
    debug!("{:#?}", summary);
}

/// Renders a summary as pretty-printed JSON.
pub fn to_json(summary: &ZoneSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Appends a [`ZoneSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: impl AsRef<Path>, summary: &ZoneSummary) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
