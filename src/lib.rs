//! `presence-log` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, signal handling,
//! and process exit codes. The core "business logic" lives in [`crate::app`]
//! where it can be tested deterministically with an injected discovery backend
//! and injected output stream.

pub mod app;
pub mod classify;
pub mod defaults;
pub mod duration;
pub mod logger;
pub mod mac_address;
pub mod registry;
pub mod scanner;
pub mod store;

// Re-export commonly used types at the crate root
pub use app::{Discovery, Options, RunError, SystemDiscovery, run_with_io};
pub use classify::{Classification, classify, classify_pass};
pub use duration::parse_duration;
pub use logger::{current_timestamp, readable_line, record_sightings, sighting_key};
pub use mac_address::MacAddress;
pub use registry::{DeviceRegistry, TableEntry, parse_entry};
pub use scanner::{DiscoveredDevice, ScanError};
pub use store::{SightingStore, StoreError};
