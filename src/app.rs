//! Core application runner (business logic) for `presence-log`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit codes
//! so the scan cycle can be tested deterministically with an injected discovery
//! backend and an in-memory output stream.

use crate::classify::classify_pass;
use crate::logger::{self, LogError};
use crate::registry::{DeviceRegistry, TableEntry};
use crate::scanner::{DiscoveredDevice, ScanError};
use crate::store::{SightingStore, StoreError};
use clap::Parser;
use std::future::Future;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Width of the separator banner around each scan cycle.
const BANNER_WIDTH: usize = 40;

/// Configuration for the scan cycle loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Add a device to the known table.
    /// Format: --known 08:8B:C8:5E:54:76=Pixel 9
    #[arg(long = "known", value_parser = crate::registry::parse_entry, value_name = "ENTRY")]
    pub known: Vec<TableEntry>,

    /// Add a label to the tagged table.
    /// Format: --tagged 1C:13:38:0D:32:7E=Bluetooth Speaker
    #[arg(long = "tagged", value_parser = crate::registry::parse_entry, value_name = "ENTRY")]
    pub tagged: Vec<TableEntry>,

    /// Start from empty tables instead of the built-in device lists
    #[arg(long)]
    pub no_builtin: bool,

    /// Pause between scan cycles.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    /// Without suffix, value is interpreted as seconds.
    #[arg(long, default_value = "15s", value_parser = crate::duration::parse_duration)]
    pub interval: Duration,

    /// How long one discovery pass listens for advertisements.
    #[arg(long, default_value = "5s", value_parser = crate::duration::parse_duration)]
    pub scan_window: Duration,

    /// Path of the sighting database.
    #[arg(long = "db", default_value = "device_log.db")]
    pub db_path: PathBuf,

    /// Path of the human-readable sighting journal.
    #[arg(long, default_value = "device_log_readable.txt")]
    pub log_file: PathBuf,
}

impl Options {
    /// Build the lookup tables this run will classify against.
    ///
    /// Starts from the built-in tables unless `--no-builtin` was given, then
    /// layers the CLI entries on top so they can override built-in names.
    pub fn registry(&self) -> DeviceRegistry {
        let mut registry = if self.no_builtin {
            DeviceRegistry::empty()
        } else {
            DeviceRegistry::builtin()
        };
        registry.add_known(&self.known);
        registry.add_tagged(&self.tagged);
        registry
    }
}

/// Errors returned by the scan cycle loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Discovery abstraction to enable deterministic unit tests without Bluetooth hardware.
pub trait Discovery: Send + Sync {
    fn discover(
        &self,
        window: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DiscoveredDevice>, ScanError>> + Send + '_>>;
}

/// Real discovery implementation that delegates to the compiled-in backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDiscovery;

impl Discovery for SystemDiscovery {
    fn discover(
        &self,
        window: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DiscoveredDevice>, ScanError>> + Send + '_>> {
        Box::pin(async move { crate::scanner::discover(window).await })
    }
}

fn write_banner(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(BANNER_WIDTH))
}

/// Run scan cycles until `cancel` fires, writing console output to `out`.
///
/// Each cycle runs one discovery pass, classifies the results, records nearby
/// known devices, sleeps for the configured interval, and then dumps the full
/// sighting history. Cancellation is honored between cycles and during the
/// sleep; a cycle that already started runs to its sleep before stopping.
pub async fn run_with_io(
    options: Options,
    discovery: &dyn Discovery,
    cancel: CancellationToken,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    let registry = options.registry();
    tracing::info!(
        known = registry.known_len(),
        tagged = registry.tagged_len(),
        "starting scan cycles"
    );

    while !cancel.is_cancelled() {
        write_banner(out)?;
        writeln!(out, "Starting Bluetooth scan...")?;
        writeln!(out, "Scanning for Bluetooth devices...\n")?;

        let devices = discovery.discover(options.scan_window).await?;
        let nearby = classify_pass(&registry, &devices, out)?;

        if nearby.is_empty() {
            writeln!(out, "No known devices detected.\n")?;
        } else {
            let timestamp = logger::current_timestamp();
            logger::record_sightings(&options.db_path, &options.log_file, &nearby, &timestamp)?;
            writeln!(
                out,
                "\n[📦] Logged devices in the sighting database and text file.\n"
            )?;
        }

        writeln!(
            out,
            "Sleeping for {} seconds...\n",
            options.interval.as_secs()
        )?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("scan loop cancelled");
                break;
            }
            _ = tokio::time::sleep(options.interval) => {}
        }

        writeln!(out, "Device log snapshot:")?;
        let store = SightingStore::open(&options.db_path)?;
        for (key, timestamps) in store.snapshot()? {
            writeln!(out, "{key}: {timestamps:?}")?;
        }
        write_banner(out)?;
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac_address::MacAddress;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;

    /// Plays back scripted discovery passes and cancels the loop once the
    /// script runs out, so tests never depend on wall-clock sleeps.
    struct FakeDiscovery {
        passes: Mutex<VecDeque<Vec<DiscoveredDevice>>>,
        cancel: CancellationToken,
    }

    impl FakeDiscovery {
        fn new(passes: Vec<Vec<DiscoveredDevice>>, cancel: CancellationToken) -> Self {
            Self {
                passes: Mutex::new(passes.into()),
                cancel,
            }
        }

        fn remaining(&self) -> usize {
            self.passes.lock().unwrap().len()
        }
    }

    impl Discovery for FakeDiscovery {
        fn discover(
            &self,
            _window: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<DiscoveredDevice>, ScanError>> + Send + '_>>
        {
            let mut passes = self.passes.lock().unwrap();
            let pass = passes.pop_front().unwrap_or_default();
            if passes.is_empty() {
                self.cancel.cancel();
            }
            Box::pin(async move { Ok(pass) })
        }
    }

    struct FailingDiscovery;

    impl Discovery for FailingDiscovery {
        fn discover(
            &self,
            _window: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<DiscoveredDevice>, ScanError>> + Send + '_>>
        {
            Box::pin(async { Err(ScanError::Bluetooth("adapter missing".to_string())) })
        }
    }

    fn device(address: &str, name: Option<&str>) -> DiscoveredDevice {
        DiscoveredDevice {
            address: address.parse().unwrap(),
            name: name.map(str::to_string),
        }
    }

    fn test_options(dir: &Path) -> Options {
        Options {
            known: vec![],
            tagged: vec![],
            no_builtin: false,
            interval: Duration::from_millis(1),
            scan_window: Duration::from_millis(1),
            db_path: dir.join("device_log.db"),
            log_file: dir.join("device_log_readable.txt"),
        }
    }

    #[test]
    fn registry_layers_cli_entries_over_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = test_options(dir.path());
        options.known.push(TableEntry {
            address: "08:8B:C8:5E:54:76".parse().unwrap(),
            name: "Work Phone".to_string(),
        });
        options.tagged.push(TableEntry {
            address: "AA:AA:AA:AA:AA:AA".parse().unwrap(),
            name: "Doorbell".to_string(),
        });

        let registry = options.registry();
        let pixel: MacAddress = "08:8B:C8:5E:54:76".parse().unwrap();
        assert_eq!(registry.known_name(pixel), Some("Work Phone"));
        assert_eq!(
            registry.tagged_label("AA:AA:AA:AA:AA:AA".parse().unwrap()),
            Some("Doorbell")
        );
        // Built-in entries not overridden are still present.
        assert_eq!(
            registry.known_name("E0:1F:FC:EC:A0:D2".parse().unwrap()),
            Some("My Tablet")
        );
    }

    #[test]
    fn registry_can_start_from_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = test_options(dir.path());
        options.no_builtin = true;

        let registry = options.registry();
        assert_eq!(registry.known_len(), 0);
        assert_eq!(registry.tagged_len(), 0);
    }

    #[tokio::test]
    async fn cycle_records_known_device_and_dumps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();

        // First pass sees the phone; second, empty pass ends the loop after
        // the snapshot from cycle one has printed.
        let discovery = FakeDiscovery::new(
            vec![
                vec![device("08:8B:C8:5E:54:76", Some("Pixel 9"))],
                vec![],
            ],
            cancel.clone(),
        );

        let mut out = Vec::<u8>::new();
        run_with_io(options.clone(), &discovery, cancel, &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("=".repeat(BANNER_WIDTH).as_str()));
        assert!(out.contains("Starting Bluetooth scan..."));
        assert!(out.contains("[✅ FOUND] Pixel 9 is nearby! (08:8B:C8:5E:54:76)"));
        assert!(out.contains("[📦] Logged devices in the sighting database and text file."));
        assert!(out.contains("Sleeping for 0 seconds..."));
        assert!(out.contains("Device log snapshot:"));
        assert!(out.contains("Pixel 9_08:8B:C8:5E:54:76: [\""));

        let store = SightingStore::open(&options.db_path).unwrap();
        let timestamps = store.timestamps("Pixel 9_08:8B:C8:5E:54:76").unwrap();
        assert_eq!(timestamps.len(), 1);

        let journal = std::fs::read_to_string(&options.log_file).unwrap();
        assert_eq!(journal.lines().count(), 1);
        assert!(journal.contains("- Pixel 9 (08:8B:C8:5E:54:76)"));
    }

    #[tokio::test]
    async fn empty_pass_reports_no_known_devices_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();
        let discovery = FakeDiscovery::new(vec![vec![]], cancel.clone());

        let mut out = Vec::<u8>::new();
        run_with_io(options.clone(), &discovery, cancel, &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("No known devices detected."));
        assert!(!out.contains("[📦]"));
        assert!(!options.db_path.exists());
        assert!(!options.log_file.exists());
    }

    #[tokio::test]
    async fn tagged_only_pass_is_reported_but_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();
        let discovery = FakeDiscovery::new(
            vec![vec![device("1C:13:38:0D:32:7E", None)]],
            cancel.clone(),
        );

        let mut out = Vec::<u8>::new();
        run_with_io(options.clone(), &discovery, cancel, &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[🔎 TAGGED] Bluetooth Speaker 🎵 - 1C:13:38:0D:32:7E"));
        assert!(out.contains("No known devices detected."));
        assert!(!options.db_path.exists());
        assert!(!options.log_file.exists());
    }

    #[tokio::test]
    async fn unnamed_unknown_device_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();
        let discovery = FakeDiscovery::new(
            vec![vec![device("73:40:69:EE:DE:55", None)]],
            cancel.clone(),
        );

        let mut out = Vec::<u8>::new();
        run_with_io(options, &discovery, cancel, &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[❓ UNKNOWN] Unnamed - 73:40:69:EE:DE:55"));
    }

    #[tokio::test]
    async fn cancelled_token_runs_no_passes() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let discovery = FakeDiscovery::new(
            vec![vec![device("08:8B:C8:5E:54:76", None)]],
            cancel.clone(),
        );

        let mut out = Vec::<u8>::new();
        run_with_io(options, &discovery, cancel, &mut out)
            .await
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(discovery.remaining(), 1);
    }

    #[tokio::test]
    async fn scan_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();

        let mut out = Vec::<u8>::new();
        let result = run_with_io(options, &FailingDiscovery, cancel, &mut out).await;

        assert!(matches!(result, Err(RunError::Scan(_))));
    }

    #[tokio::test]
    async fn repeated_sightings_extend_the_history() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        let cancel = CancellationToken::new();
        let pixel = || vec![device("08:8B:C8:5E:54:76", Some("Pixel 9"))];
        let discovery = FakeDiscovery::new(vec![pixel(), pixel(), vec![]], cancel.clone());

        let mut out = Vec::<u8>::new();
        run_with_io(options.clone(), &discovery, cancel, &mut out)
            .await
            .unwrap();

        let store = SightingStore::open(&options.db_path).unwrap();
        let timestamps = store.timestamps("Pixel 9_08:8B:C8:5E:54:76").unwrap();
        assert_eq!(timestamps.len(), 2);

        let journal = std::fs::read_to_string(&options.log_file).unwrap();
        assert_eq!(journal.lines().count(), 2);
    }
}
