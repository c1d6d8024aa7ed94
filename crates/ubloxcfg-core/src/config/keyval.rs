//! Configuration keys and values

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ubx::messages::cfg_value_size;

/// A 32-bit configuration key ID
///
/// Bits 28..30 encode the storage size of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigKey(pub u32);

impl ConfigKey {
    /// Wildcard matching all items (UBX-CFG-VALGET only)
    pub const ALL_WILDCARD: ConfigKey = ConfigKey(0x0fff_ffff);

    /// Wildcard matching all items of a group (UBX-CFG-VALGET only)
    ///
    /// `group_id` may be the group ID (e.g. `0x0052_0000`) or any key of the
    /// group. Only the group bits (16..23) are kept, so size class and item ID
    /// of a key are masked off.
    pub fn group_wildcard(group_id: u32) -> Self {
        ConfigKey((group_id & 0x00ff_0000) | 0x0000_ffff)
    }

    /// Size class (bits 28..30)
    pub fn size_class(&self) -> u8 {
        ((self.0 >> 28) & 0x07) as u8
    }

    /// Number of value bytes on the wire, `None` for an invalid size class
    pub fn value_size(&self) -> Option<usize> {
        cfg_value_size(self.0)
    }

    /// Read a key from 4 little-endian bytes
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        ConfigKey(LittleEndian::read_u32(bytes))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl From<u32> for ConfigKey {
    fn from(id: u32) -> Self {
        ConfigKey(id)
    }
}

/// A configuration item: key and raw value
///
/// Only the low [`ConfigKey::value_size`] bytes of `value` go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Configuration key
    pub key: ConfigKey,
    /// Raw value bits
    pub value: u64,
}

impl KeyValue {
    /// Create a new key/value item
    pub fn new(key: u32, value: u64) -> Self {
        Self {
            key: ConfigKey(key),
            value,
        }
    }

    /// Size on the wire (key and value), `None` for an invalid key
    pub fn encoded_size(&self) -> Option<usize> {
        self.key.value_size().map(|size| 4 + size)
    }

    /// Append key and value (little-endian) to `out`
    pub(crate) fn encode(&self, out: &mut Vec<u8>) -> Option<()> {
        let size = self.key.value_size()?;
        out.extend_from_slice(&self.key.0.to_le_bytes());
        out.extend_from_slice(&self.value.to_le_bytes()[..size]);
        Some(())
    }

    /// Decode one item from the start of `data`, returning it and its size
    pub(crate) fn decode(data: &[u8]) -> Option<(Self, usize)> {
        if data.len() < 4 {
            return None;
        }
        let key = ConfigKey::from_le_bytes(&data[..4]);
        let size = key.value_size()?;
        let raw = data.get(4..4 + size)?;
        let mut bytes = [0u8; 8];
        bytes[..size].copy_from_slice(raw);
        Some((
            Self {
                key,
                value: u64::from_le_bytes(bytes),
            },
            4 + size,
        ))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = 0x{:x}", self.key, self.value)
    }
}
