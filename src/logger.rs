//! Sighting recording: database appends plus the readable journal.
//!
//! Every nearby known device from one scan is written to two places with the
//! same timestamp: the sighting database (machine history, keyed per device)
//! and a plain-text journal meant for eyeballing or checking into version
//! control.

use chrono::Utc;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mac_address::MacAddress;
use crate::store::{SightingStore, StoreError};

/// Timestamp layout shared by the database and the journal. Always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC wall-clock time formatted for recording.
pub fn current_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Database key for one device: `{friendly name}_{address}`.
pub fn sighting_key(name: &str, address: MacAddress) -> String {
    format!("{name}_{address}")
}

/// Journal line for one sighting: `{timestamp} - {friendly name} ({address})`.
pub fn readable_line(timestamp: &str, name: &str, address: MacAddress) -> String {
    format!("{timestamp} - {name} ({address})")
}

/// Errors from recording sightings.
#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The readable journal could not be opened or written
    #[error("failed to write journal {path}: {source}")]
    Journal {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn append_journal(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let mut journal = OpenOptions::new().append(true).create(true).open(path)?;
    for line in lines {
        writeln!(journal, "{line}")?;
    }
    Ok(())
}

/// Record one scan's nearby known devices in both sinks.
///
/// All devices in `nearby` share the single `timestamp`, so one scan shows up
/// as one moment in time. An empty map is a no-op and touches neither file.
pub fn record_sightings(
    db_path: &Path,
    journal_path: &Path,
    nearby: &BTreeMap<String, MacAddress>,
    timestamp: &str,
) -> Result<(), LogError> {
    if nearby.is_empty() {
        return Ok(());
    }

    // Store handle stays scoped to the appends so the snapshot step later in
    // the cycle reopens a settled database.
    {
        let store = SightingStore::open(db_path)?;
        for (name, address) in nearby {
            store.append(&sighting_key(name, *address), timestamp)?;
        }
    }

    let lines: Vec<String> = nearby
        .iter()
        .map(|(name, address)| readable_line(timestamp, name, *address))
        .collect();
    append_journal(journal_path, &lines).map_err(|source| LogError::Journal {
        path: journal_path.to_path_buf(),
        source,
    })?;

    Ok(())
}
