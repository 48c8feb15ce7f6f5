//! BLE discovery abstraction.
//!
//! This module provides shared types for bounded discovery passes plus the
//! backend dispatch. The actual Bluetooth plumbing lives in the feature-gated
//! backend submodule.

#[cfg(feature = "bluer")]
pub mod bluer;

use crate::mac_address::MacAddress;
use std::time::Duration;
use thiserror::Error;

/// Placeholder shown for devices that advertise without a local name.
pub const UNNAMED: &str = "Unnamed";

/// A device observed during one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Hardware address the advertisement came from.
    pub address: MacAddress,
    /// Advertised local name, if the device broadcast one.
    pub name: Option<String>,
}

impl DiscoveredDevice {
    /// Advertised name, or the [`UNNAMED`] placeholder.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }
}

/// Error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
    /// Backend not available (not compiled in)
    #[allow(dead_code)]
    #[error("Backend '{0}' not available (not compiled in)")]
    BackendNotAvailable(String),
}

/// Run one bounded discovery pass with the compiled-in backend.
///
/// Collects every distinct device seen within `window` and returns them in
/// discovery order. Each pass starts fresh; nothing is remembered between
/// passes.
pub async fn discover(window: Duration) -> Result<Vec<DiscoveredDevice>, ScanError> {
    #[cfg(feature = "bluer")]
    {
        bluer::discover_pass(window).await
    }
    #[cfg(not(feature = "bluer"))]
    {
        let _ = window;
        Err(ScanError::BackendNotAvailable("bluer".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_advertised_name() {
        let device = DiscoveredDevice {
            address: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
            name: Some("Pixel 9".to_string()),
        };
        assert_eq!(device.display_name(), "Pixel 9");
    }

    #[test]
    fn display_name_falls_back_to_placeholder() {
        let device = DiscoveredDevice {
            address: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
            name: None,
        };
        assert_eq!(device.display_name(), "Unnamed");
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::Bluetooth("adapter missing".to_string());
        assert_eq!(format!("{}", err), "Bluetooth error: adapter missing");

        let err2 = ScanError::BackendNotAvailable("bluer".to_string());
        assert_eq!(
            format!("{}", err2),
            "Backend 'bluer' not available (not compiled in)"
        );
    }
}
