//! Device registry: the known and tagged lookup tables.
//!
//! Both tables are keyed by hardware address, built once at startup, and
//! passed into classification as immutable values. Entries come from the
//! built-in defaults and from repeatable `--known`/`--tagged` CLI options in
//! `MAC=NAME` form.

use std::collections::BTreeMap;

use crate::defaults;
use crate::mac_address::MacAddress;

/// A parsed table entry mapping a hardware address to a name or label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// The hardware address, canonicalized at parse time.
    pub address: MacAddress,
    /// The friendly name (known table) or descriptive label (tagged table).
    pub name: String,
}

/// Parse a table entry from a string in the format `MAC=NAME`.
///
/// The address half must be a valid colon-separated hardware address in any
/// hex case; the name half is taken verbatim (spaces allowed).
///
/// # Example
/// ```
/// use presence_log::registry::parse_entry;
///
/// let entry = parse_entry("08:8b:c8:5e:54:76=Pixel 9").unwrap();
/// assert_eq!(entry.address.to_string(), "08:8B:C8:5E:54:76");
/// assert_eq!(entry.name, "Pixel 9");
/// ```
pub fn parse_entry(src: &str) -> Result<TableEntry, String> {
    let (address, name) = src
        .split_once('=')
        .ok_or_else(|| "invalid entry: expected format MAC=NAME".to_string())?;
    let address = address
        .trim()
        .parse::<MacAddress>()
        .map_err(|e| e.to_string())?;
    if name.is_empty() {
        return Err("invalid entry: name must not be empty".to_string());
    }
    Ok(TableEntry {
        address,
        name: name.to_string(),
    })
}

/// Immutable lookup tables for device classification.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    known: BTreeMap<MacAddress, String>,
    tagged: BTreeMap<MacAddress, String>,
}

impl DeviceRegistry {
    /// Registry with empty tables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in tables.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (name, address) in defaults::KNOWN {
            registry.known.insert(*address, (*name).to_string());
        }
        for (address, label) in defaults::TAGGED {
            registry.tagged.insert(*address, (*label).to_string());
        }
        registry
    }

    /// Add known-device entries; a repeated address replaces the earlier name.
    pub fn add_known(&mut self, entries: &[TableEntry]) {
        for entry in entries {
            self.known.insert(entry.address, entry.name.clone());
        }
    }

    /// Add tagged-device entries; a repeated address replaces the earlier label.
    pub fn add_tagged(&mut self, entries: &[TableEntry]) {
        for entry in entries {
            self.tagged.insert(entry.address, entry.name.clone());
        }
    }

    /// Friendly name for a known address.
    pub fn known_name(&self, address: MacAddress) -> Option<&str> {
        self.known.get(&address).map(String::as_str)
    }

    /// Descriptive label for a tagged address.
    pub fn tagged_label(&self, address: MacAddress) -> Option<&str> {
        self.tagged.get(&address).map(String::as_str)
    }

    /// Number of known devices.
    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Number of tagged devices.
    pub fn tagged_len(&self) -> usize {
        self.tagged.len()
    }
}
