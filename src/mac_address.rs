//! Canonical hardware address type for Bluetooth devices.
//!
//! Addresses are parsed case-insensitively and stored as raw bytes, so two
//! spellings of the same address compare equal and share a table slot. The
//! display form is always uppercase colon-separated hex.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 6-octet Bluetooth hardware address.
///
/// Ordered and hashable so it can key the device registry tables directly,
/// independent of any specific Bluetooth library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Construct from raw octets, most significant first.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Errors returned when parsing a hardware address string.
#[derive(Error, Debug, PartialEq)]
pub enum ParseMacError {
    #[error("invalid hardware address: expected 6 colon-separated octets, got {0}")]
    OctetCount(usize),
    #[error("invalid hardware address: '{0}' is not a two-digit hex octet")]
    BadOctet(String),
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    /// Parse `AA:BB:CC:DD:EE:FF` in any hex case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut count = 0;

        for part in s.split(':') {
            if count < 6 {
                if part.len() != 2 {
                    return Err(ParseMacError::BadOctet(part.to_string()));
                }
                octets[count] = u8::from_str_radix(part, 16)
                    .map_err(|_| ParseMacError::BadOctet(part.to_string()))?;
            }
            count += 1;
        }

        if count != 6 {
            return Err(ParseMacError::OctetCount(count));
        }
        Ok(MacAddress(octets))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

#[cfg(feature = "bluer")]
impl From<bluer::Address> for MacAddress {
    fn from(addr: bluer::Address) -> Self {
        Self(addr.0)
    }
}

#[cfg(feature = "bluer")]
impl From<MacAddress> for bluer::Address {
    fn from(addr: MacAddress) -> Self {
        bluer::Address(addr.0)
    }
}
