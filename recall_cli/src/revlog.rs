//! Append-only CSV review history.
//!
//! One row per graded answer, written by the orchestrator after the
//! engine's field updates have been applied. The engine itself never sees
//! this file.

use recall_core::{Card, Grade, Result};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the review log
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    reviewed_at: String,
    card_id: String,
    grade: &'static str,
    lifecycle: String,
    interval: i64,
    ease_factor: i64,
}

/// Append one review record, creating the file (with headers) if needed
pub fn append(path: &Path, card_id: Uuid, grade: Grade, card_after: &Card) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // Write headers only when the file is empty
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    let row = CsvRow {
        reviewed_at: chrono::Utc::now().to_rfc3339(),
        card_id: card_id.to_string(),
        grade: grade.as_str(),
        lifecycle: format!("{:?}", card_after.lifecycle).to_lowercase(),
        interval: card_after.interval,
        ease_factor: card_after.ease_factor,
    };
    writer.serialize(row).map_err(|e| {
        recall_core::Error::Other(format!("Failed to write review log: {}", e))
    })?;
    writer
        .flush()
        .map_err(recall_core::Error::Io)?;

    tracing::debug!("Appended review of {} to {:?}", card_id, path);
    Ok(())
}
