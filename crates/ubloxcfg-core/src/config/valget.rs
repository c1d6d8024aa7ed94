//! UBX-CFG-VALGET poll and response

use byteorder::{ByteOrder, LittleEndian};

use super::{ConfigError, ConfigKey, KeyValue, Layers, VALGET_MAX_K};
use crate::ubx::{make_message, PayloadBuilder, UBX_CFG_CLSID, UBX_CFG_VALGET_MSGID};

const VALGET_POLL_VERSION: u8 = 0x00;
const VALGET_RESPONSE_VERSION: u8 = 0x01;

/// Decoded UBX-CFG-VALGET response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValgetResponse {
    /// Layer the values were read from
    pub layer: Layers,
    /// Number of values skipped in the result set
    pub position: u16,
    /// Configuration items
    pub items: Vec<KeyValue>,
}

/// Build a UBX-CFG-VALGET poll for up to 64 keys (or wildcards) from one layer
pub fn build_valget_poll(
    keys: &[ConfigKey],
    layer: Layers,
    position: u16,
) -> Result<Vec<u8>, ConfigError> {
    if keys.is_empty() || keys.len() > VALGET_MAX_K {
        return Err(ConfigError::TooManyKeys(keys.len(), VALGET_MAX_K));
    }
    let mut builder = PayloadBuilder::new()
        .u8(VALGET_POLL_VERSION)
        .u8(layer.valget_layer()?)
        .u16_le(position);
    for key in keys {
        builder = builder.u32_le(key.0);
    }
    Ok(make_message(UBX_CFG_CLSID, UBX_CFG_VALGET_MSGID, &builder.build())?)
}

/// Decode the payload of a UBX-CFG-VALGET response
pub fn parse_valget_response(payload: &[u8]) -> Result<ValgetResponse, ConfigError> {
    if payload.len() < 4 {
        return Err(ConfigError::MalformedResponse(format!(
            "payload too short ({} bytes)",
            payload.len()
        )));
    }
    if payload[0] != VALGET_RESPONSE_VERSION {
        return Err(ConfigError::MalformedResponse(format!(
            "unexpected version {}",
            payload[0]
        )));
    }
    let layer = Layers::from_valget_layer(payload[1]).ok_or_else(|| {
        ConfigError::MalformedResponse(format!("unexpected layer {}", payload[1]))
    })?;
    let position = LittleEndian::read_u16(&payload[2..4]);

    let mut items = Vec::new();
    let mut offs = 4;
    while offs < payload.len() {
        let (item, size) = KeyValue::decode(&payload[offs..]).ok_or_else(|| {
            ConfigError::MalformedResponse(format!("bad item at offset {}", offs))
        })?;
        items.push(item);
        offs += size;
    }

    Ok(ValgetResponse {
        layer,
        position,
        items,
    })
}
