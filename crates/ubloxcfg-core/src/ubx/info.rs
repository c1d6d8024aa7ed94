//! Message descriptions
//!
//! Short diagnostic strings for messages whose payload is worth summarising.

use super::messages::{cfg_value_size, MonVer, Transaction, CFG_VALSET_VALDEL_VERSION};
use super::{
    message_name, UBX_ACK_CLSID, UBX_CFG_CLSID, UBX_CFG_VALDEL_MSGID, UBX_CFG_VALSET_MSGID,
    UBX_FRAME_SIZE, UBX_HEAD_SIZE, UBX_INF_CLSID, UBX_MON_CLSID, UBX_MON_VER_MSGID,
};
use byteorder::{ByteOrder, LittleEndian};

/// Describe a complete UBX frame
///
/// Returns `None` for messages without a description or with a payload that
/// does not have the expected shape.
pub fn message_info(msg: &[u8]) -> Option<String> {
    if msg.len() < UBX_FRAME_SIZE {
        return None;
    }
    let payload = &msg[UBX_HEAD_SIZE..msg.len() - 2];
    match (msg[2], msg[3]) {
        (UBX_ACK_CLSID, _) if payload.len() == 2 => Some(message_name(payload[0], payload[1])),
        (UBX_INF_CLSID, _) => Some(printable(payload)),
        (UBX_MON_CLSID, UBX_MON_VER_MSGID) => {
            MonVer::from_payload(payload).map(|ver| ver.version_string())
        }
        (UBX_CFG_CLSID, UBX_CFG_VALSET_MSGID) => cfg_val_info(payload, true),
        (UBX_CFG_CLSID, UBX_CFG_VALDEL_MSGID) => cfg_val_info(payload, false),
        _ => None,
    }
}

fn printable(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
        .collect()
}

/// VALSET/VALDEL (version 1) summary: layers, transaction and item count
fn cfg_val_info(payload: &[u8], with_values: bool) -> Option<String> {
    if payload.len() < 4 || payload[0] != CFG_VALSET_VALDEL_VERSION {
        return None;
    }
    let mut layers = Vec::new();
    for (flag, name) in [(0x01, "RAM"), (0x02, "BBR"), (0x04, "Flash")] {
        if payload[1] & flag != 0 {
            layers.push(name);
        }
    }
    let transaction = Transaction::from_u8(payload[2])?;

    let mut count = 0;
    let mut offs = 4;
    while offs + 4 <= payload.len() {
        let key_id = LittleEndian::read_u32(&payload[offs..offs + 4]);
        offs += 4;
        if with_values {
            offs += cfg_value_size(key_id)?;
        }
        count += 1;
    }
    if offs != payload.len() {
        return None;
    }

    Some(format!(
        "{} {} in {}, {}",
        count,
        if count == 1 { "item" } else { "items" },
        layers.join(","),
        transaction
    ))
}
