//! BlueZ D-Bus backend for device discovery.
//!
//! This backend uses the `bluer` crate to communicate with the BlueZ daemon
//! via D-Bus. It requires the `bluetoothd` daemon to be running.

use super::{DiscoveredDevice, ScanError};
use crate::mac_address::MacAddress;
use bluer::{Adapter, AdapterEvent, Address, Session};
use futures::StreamExt;
use std::collections::HashSet;
use std::time::Duration;

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

/// Run one bounded discovery pass using the BlueZ D-Bus backend.
///
/// This function initializes the Bluetooth adapter and collects device
/// discovery events until `window` elapses. Each distinct address is reported
/// once per pass, together with the advertised name if BlueZ has one.
pub async fn discover_pass(window: Duration) -> Result<Vec<DiscoveredDevice>, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    let events = adapter.discover_devices().await?;
    tokio::pin!(events);
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    let mut seen: HashSet<Address> = HashSet::new();
    let mut devices = Vec::new();

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.next() => match event {
                Some(AdapterEvent::DeviceAdded(address)) => {
                    if seen.insert(address) {
                        let name = device_name(&adapter, address).await;
                        devices.push(DiscoveredDevice {
                            address: MacAddress::from(address),
                            name,
                        });
                    }
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    tracing::debug!(count = devices.len(), "discovery pass finished");
    Ok(devices)
}

/// Look up the advertised local name for a discovered address.
///
/// Name lookups are best effort; a device that went away mid-pass or never
/// broadcast a name yields `None`.
async fn device_name(adapter: &Adapter, address: Address) -> Option<String> {
    let device = adapter.device(address).ok()?;
    device.name().await.ok().flatten()
}
