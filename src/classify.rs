//! Device classification against the registry tables.
//!
//! One discovery pass feeds [`classify_pass`], which writes a console line per
//! device and returns the known devices that were nearby, keyed by friendly
//! name. Tagged and unknown devices are reported but never collected.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::mac_address::MacAddress;
use crate::registry::DeviceRegistry;
use crate::scanner::DiscoveredDevice;

/// How a discovered address relates to the registry tables.
///
/// The known table wins when an address appears in both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Address is in the known table.
    Known { name: String },
    /// Address is in the tagged table only.
    Tagged { label: String },
    /// Address is in neither table.
    Unknown,
}

/// Classify a single address against the registry.
pub fn classify(registry: &DeviceRegistry, address: MacAddress) -> Classification {
    if let Some(name) = registry.known_name(address) {
        return Classification::Known {
            name: name.to_string(),
        };
    }
    if let Some(label) = registry.tagged_label(address) {
        return Classification::Tagged {
            label: label.to_string(),
        };
    }
    Classification::Unknown
}

/// Classify every device from one pass, writing a report line per device.
///
/// Returns the nearby known devices as `friendly name -> address`. The map is
/// what the logging step records; tagged and unknown sightings only show up
/// on the console.
pub fn classify_pass(
    registry: &DeviceRegistry,
    devices: &[DiscoveredDevice],
    out: &mut dyn Write,
) -> io::Result<BTreeMap<String, MacAddress>> {
    let mut nearby = BTreeMap::new();

    for device in devices {
        match classify(registry, device.address) {
            Classification::Known { name } => {
                writeln!(out, "[✅ FOUND] {} is nearby! ({})", name, device.address)?;
                nearby.insert(name, device.address);
            }
            Classification::Tagged { label } => {
                writeln!(out, "[🔎 TAGGED] {} - {}", label, device.address)?;
            }
            Classification::Unknown => {
                writeln!(
                    out,
                    "[❓ UNKNOWN] {} - {}",
                    device.display_name(),
                    device.address
                )?;
            }
        }
    }

    Ok(nearby)
}
