//! Append-only CSV export of saved sessions.
//!
//! The file mirrors what was written to the database and is never read back.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::debug;
use wattlog_model::ExportRow;

pub const EXPORT_HEADER: [&str; 5] = [
    "Date",
    "Time",
    "Device",
    "Hours On (h)",
    "Consumption (kWh)",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ExportWriter {
    path: PathBuf,
}

impl ExportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `rows`, writing the header first if the file is new.
    /// Returns the number of data rows written.
    pub fn append(&self, rows: &[ExportRow]) -> Result<usize, ExportError> {
        let write_header = !self.path.is_file();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ExportError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if write_header {
            writer.write_record(EXPORT_HEADER)?;
        }
        for row in rows {
            writer.write_record(row.fields())?;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            rows = rows.len(),
            header = write_header,
            "Appended export rows"
        );
        Ok(rows.len())
    }
}
