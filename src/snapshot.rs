//! Snapshot file I/O.
//!
//! The snapshot is a JSON array of lot records written with 4-space
//! indentation. It is read once before a run and replaced once after it.

use crate::state::LotRecord;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SNAPSHOT_PATH: &str = "data/simulated_data.json";

const INDENT: &[u8] = b"    ";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse snapshot {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write snapshot {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load the previous snapshot. A missing file is a first run and yields `None`.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Option<Vec<LotRecord>>, SnapshotError> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No previous snapshot found");
            return Ok(None);
        }
        Err(source) => {
            return Err(SnapshotError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let records: Vec<LotRecord> =
        serde_json::from_str(&contents).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    for record in inconsistent_records(&records) {
        warn!(
            lot_id = %record.lot_id,
            available_spots = record.available_spots,
            counted = record.counted_available(),
            "Previous snapshot summary disagrees with its spot list"
        );
    }
    Ok(Some(records))
}

/// Records whose `available_spots` does not match their `parking_status`.
pub fn inconsistent_records(records: &[LotRecord]) -> impl Iterator<Item = &LotRecord> {
    records
        .iter()
        .filter(|record| record.available_spots as usize != record.counted_available())
}

pub fn encode_snapshot(records: &[LotRecord]) -> Result<Vec<u8>, SnapshotError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Replace the snapshot at `path`, creating the parent directory if needed.
pub fn write_snapshot(path: impl AsRef<Path>, records: &[LotRecord]) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let encoded = encode_snapshot(records)?;
    let write_error = |source: std::io::Error| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, encoded).map_err(write_error)?;
    debug!(path = %path.display(), lots = records.len(), "Snapshot written");
    Ok(())
}
