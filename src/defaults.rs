//! Built-in device tables, active unless `--no-builtin` is given.

use crate::mac_address::MacAddress;

/// Known devices: friendly name and hardware address. Sightings of these are
/// persisted.
pub const KNOWN: &[(&str, MacAddress)] = &[
    ("Pixel 9", MacAddress::new([0x08, 0x8B, 0xC8, 0x5E, 0x54, 0x76])),
    ("My Tablet", MacAddress::new([0xE0, 0x1F, 0xFC, 0xEC, 0xA0, 0xD2])),
];

/// Tagged devices: recognized addresses with a descriptive label. Reported on
/// the console only, never persisted.
pub const TAGGED: &[(MacAddress, &str)] = &[
    (
        MacAddress::new([0x1C, 0x13, 0x38, 0x0D, 0x32, 0x7E]),
        "Bluetooth Speaker 🎵",
    ),
    (
        MacAddress::new([0x4C, 0x6C, 0xAC, 0x0C, 0xD6, 0xA3]),
        "Neighbor's Device 🧑‍💻",
    ),
    (
        MacAddress::new([0x60, 0x1D, 0xB7, 0x04, 0x27, 0x98]),
        "Smart TV or Projector 📺",
    ),
];
