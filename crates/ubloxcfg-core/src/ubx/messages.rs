//! UBX message payloads
//!
//! Builders for the command messages the receiver session sends, decoders
//! for the responses it interprets and the UBX-CFG-VALSET/VALDEL header fields.

use serde::Serialize;
use std::fmt;

use super::{
    make_message, PayloadBuilder, UbxError, UBX_CFG_CFG_MSGID, UBX_CFG_CLSID, UBX_CFG_RST_MSGID,
};

/// UBX-CFG-CFG clear/save/load mask: nothing
pub const CFG_CFG_MASK_NONE: u32 = 0x0000_0000;
/// UBX-CFG-CFG clear/save/load mask: everything
pub const CFG_CFG_MASK_ALL: u32 = 0xffff_ffff;
/// UBX-CFG-CFG device mask: battery-backed RAM
pub const CFG_CFG_DEVICE_BBR: u8 = 0x01;
/// UBX-CFG-CFG device mask: flash
pub const CFG_CFG_DEVICE_FLASH: u8 = 0x02;

/// UBX-CFG-RST navBbrMask: hotstart (keep all data)
pub const CFG_RST_NAVBBR_HOTSTART: u16 = 0x0000;
/// UBX-CFG-RST navBbrMask: warmstart (clear ephemerides)
pub const CFG_RST_NAVBBR_WARMSTART: u16 = 0x0001;
/// UBX-CFG-RST navBbrMask: coldstart (erase all data)
pub const CFG_RST_NAVBBR_COLDSTART: u16 = 0xffff;

/// UBX-CFG-RST resetMode: forced, immediate hardware reset
pub const CFG_RST_MODE_HW_FORCED: u8 = 0x00;
/// UBX-CFG-RST resetMode: controlled software reset
pub const CFG_RST_MODE_SW: u8 = 0x01;
/// UBX-CFG-RST resetMode: restart GNSS
pub const CFG_RST_MODE_GNSS: u8 = 0x02;
/// UBX-CFG-RST resetMode: controlled hardware reset
pub const CFG_RST_MODE_HW_CONTROLLED: u8 = 0x04;
/// UBX-CFG-RST resetMode: stop GNSS
pub const CFG_RST_MODE_GNSS_STOP: u8 = 0x08;
/// UBX-CFG-RST resetMode: start GNSS
pub const CFG_RST_MODE_GNSS_START: u8 = 0x09;

/// UBX-CFG-VALSET/VALDEL message version
pub const CFG_VALSET_VALDEL_VERSION: u8 = 0x01;

/// Number of value bytes of a configuration key ID, `None` for an invalid
/// size class (bits 28..30)
pub fn cfg_value_size(key_id: u32) -> Option<usize> {
    match (key_id >> 28) & 0x07 {
        0x01 | 0x02 => Some(1), // one bit (stored as a byte), one byte
        0x03 => Some(2),
        0x04 => Some(4),
        0x05 => Some(8),
        _ => None,
    }
}

/// UBX-CFG-VALSET/VALDEL transaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transaction {
    /// Single message, no transaction
    None = 0,
    /// First message of a transaction
    Begin = 1,
    /// Intermediate message
    Continue = 2,
    /// Last message, applies the transaction
    End = 3,
}

impl Transaction {
    /// Decode the transaction field of a VALSET/VALDEL payload
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Transaction::None),
            1 => Some(Transaction::Begin),
            2 => Some(Transaction::Continue),
            3 => Some(Transaction::End),
            _ => None,
        }
    }

    /// Phase of chunk `index` out of `count`
    pub(crate) fn for_chunk(index: usize, count: usize) -> Self {
        if count <= 1 {
            Transaction::None
        } else if index == 0 {
            Transaction::Begin
        } else if index + 1 == count {
            Transaction::End
        } else {
            Transaction::Continue
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transaction::None => write!(f, "no transaction"),
            Transaction::Begin => write!(f, "transaction begin"),
            Transaction::Continue => write!(f, "transaction continue"),
            Transaction::End => write!(f, "transaction end"),
        }
    }
}

/// Build a UBX-CFG-CFG message
///
/// Without a device mask the payload is the three 4-byte masks only.
pub fn cfg_cfg(
    clear_mask: u32,
    save_mask: u32,
    load_mask: u32,
    device_mask: Option<u8>,
) -> Result<Vec<u8>, UbxError> {
    let mut builder = PayloadBuilder::new()
        .u32_le(clear_mask)
        .u32_le(save_mask)
        .u32_le(load_mask);
    if let Some(mask) = device_mask {
        builder = builder.u8(mask);
    }
    make_message(UBX_CFG_CLSID, UBX_CFG_CFG_MSGID, &builder.build())
}

/// Build a UBX-CFG-RST message
pub fn cfg_rst(nav_bbr_mask: u16, reset_mode: u8) -> Result<Vec<u8>, UbxError> {
    let payload = PayloadBuilder::new()
        .u16_le(nav_bbr_mask)
        .u8(reset_mode)
        .u8(0x00)
        .build();
    make_message(UBX_CFG_CLSID, UBX_CFG_RST_MSGID, &payload)
}

/// Decoded UBX-MON-VER payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonVer {
    /// Software version string
    pub sw_version: String,
    /// Hardware version string
    pub hw_version: String,
    /// Extension strings (e.g. "FWVER=HPG 1.13", "PROTVER=27.12", "MOD=ZED-F9P")
    pub extensions: Vec<String>,
}

const MON_VER_SW_SIZE: usize = 30;
const MON_VER_HW_SIZE: usize = 10;
const MON_VER_EXT_SIZE: usize = 30;

impl MonVer {
    /// Decode from a UBX-MON-VER payload
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let head = MON_VER_SW_SIZE + MON_VER_HW_SIZE;
        if payload.len() < head || (payload.len() - head) % MON_VER_EXT_SIZE != 0 {
            return None;
        }
        let extensions = payload[head..]
            .chunks(MON_VER_EXT_SIZE)
            .map(c_string)
            .filter(|s| !s.is_empty())
            .collect();
        Some(Self {
            sw_version: c_string(&payload[..MON_VER_SW_SIZE]),
            hw_version: c_string(&payload[MON_VER_SW_SIZE..head]),
            extensions,
        })
    }

    /// Get the value of a "KEY=value" extension
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions.iter().find_map(|ext| {
            ext.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
        })
    }

    /// Short version string for display, e.g. "HPG 1.13 (ZED-F9P, PROTVER 27.12)"
    pub fn version_string(&self) -> String {
        let fw = self.extension("FWVER").unwrap_or(self.sw_version.as_str());
        let module = self.extension("MOD").unwrap_or(self.hw_version.as_str());
        match self.extension("PROTVER") {
            Some(protver) => format!("{} ({}, PROTVER {})", fw, module, protver),
            None => format!("{} ({})", fw, module),
        }
    }
}

/// NUL-terminated, fixed-size string field
fn c_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).trim().to_string()
}
