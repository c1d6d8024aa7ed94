//! Configuration batching
//!
//! Packs key/value items (or keys) greedily, in input order, into as many
//! UBX-CFG-VALSET (UBX-CFG-VALDEL) messages as needed. Item order is kept
//! across chunks since later items may depend on earlier ones within the same
//! transaction.

use serde::Serialize;
use tracing::debug;

use super::{
    ConfigError, ConfigKey, KeyValue, Layers, VALDEL_KEYS_MAX, VALDEL_MAX_K, VALSET_CFGDATA_MAX,
    VALSET_MAX_KV,
};
use crate::ubx::messages::{Transaction, CFG_VALSET_VALDEL_VERSION};
use crate::ubx::{make_message, UBX_CFG_CLSID, UBX_CFG_VALDEL_MSGID, UBX_CFG_VALSET_MSGID};

/// Protocol limits for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// Maximum number of items per message
    pub max_items: usize,
    /// Maximum size of the data section (items without the 4-byte header)
    pub max_data_size: usize,
}

impl BatchLimits {
    /// UBX-CFG-VALSET limits
    pub const VALSET: BatchLimits = BatchLimits {
        max_items: VALSET_MAX_KV,
        max_data_size: VALSET_CFGDATA_MAX,
    };

    /// UBX-CFG-VALDEL limits
    pub const VALDEL: BatchLimits = BatchLimits {
        max_items: VALDEL_MAX_K,
        max_data_size: VALDEL_KEYS_MAX,
    };
}

/// One outgoing configuration message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigChunk<T> {
    /// Ordinal index within the batch
    pub index: usize,
    /// The items carried by this chunk
    pub items: Vec<T>,
    /// Transaction phase
    pub transaction: Transaction,
    /// Complete UBX frame
    pub msg: Vec<u8>,
}

impl<T> ConfigChunk<T> {
    /// Size of the UBX frame
    pub fn size(&self) -> usize {
        self.msg.len()
    }

    /// Short description, e.g. "12 items, transaction begin"
    pub fn info(&self) -> String {
        format!("{} items, {}", self.items.len(), self.transaction)
    }
}

/// Items that can be packed into a VALSET/VALDEL message
trait BatchItem: Clone {
    fn key(&self) -> ConfigKey;
    fn wire_size(&self) -> Option<usize>;
    fn write(&self, out: &mut Vec<u8>) -> Option<()>;
}

impl BatchItem for KeyValue {
    fn key(&self) -> ConfigKey {
        self.key
    }

    fn wire_size(&self) -> Option<usize> {
        self.encoded_size()
    }

    fn write(&self, out: &mut Vec<u8>) -> Option<()> {
        self.encode(out)
    }
}

impl BatchItem for ConfigKey {
    fn key(&self) -> ConfigKey {
        *self
    }

    fn wire_size(&self) -> Option<usize> {
        self.value_size().map(|_| 4)
    }

    fn write(&self, out: &mut Vec<u8>) -> Option<()> {
        out.extend_from_slice(&self.0.to_le_bytes());
        Some(())
    }
}

/// Convert key/value items into UBX-CFG-VALSET messages
pub fn build_set_batch(
    items: &[KeyValue],
    layers: Layers,
) -> Result<Vec<ConfigChunk<KeyValue>>, ConfigError> {
    build_set_batch_with(items, layers, BatchLimits::VALSET)
}

/// Convert key/value items into UBX-CFG-VALSET messages with custom limits
pub fn build_set_batch_with(
    items: &[KeyValue],
    layers: Layers,
    limits: BatchLimits,
) -> Result<Vec<ConfigChunk<KeyValue>>, ConfigError> {
    let flags = layers.valset_flags()?;
    build_batch(items, UBX_CFG_VALSET_MSGID, flags, limits)
}

/// Convert keys into UBX-CFG-VALDEL messages
pub fn build_delete_batch(
    keys: &[ConfigKey],
    layers: Layers,
) -> Result<Vec<ConfigChunk<ConfigKey>>, ConfigError> {
    build_delete_batch_with(keys, layers, BatchLimits::VALDEL)
}

/// Convert keys into UBX-CFG-VALDEL messages with custom limits
pub fn build_delete_batch_with(
    keys: &[ConfigKey],
    layers: Layers,
    limits: BatchLimits,
) -> Result<Vec<ConfigChunk<ConfigKey>>, ConfigError> {
    let flags = layers.valdel_flags()?;
    build_batch(keys, UBX_CFG_VALDEL_MSGID, flags, limits)
}

fn build_batch<T: BatchItem>(
    items: &[T],
    msg_id: u8,
    layer_flags: u8,
    limits: BatchLimits,
) -> Result<Vec<ConfigChunk<T>>, ConfigError> {
    // Validate everything before producing anything
    let sizes = items
        .iter()
        .map(|item| {
            let size = item.wire_size().ok_or(ConfigError::InvalidKey(item.key()))?;
            if size > limits.max_data_size {
                return Err(ConfigError::OversizedItem {
                    key: item.key(),
                    size,
                    limit: limits.max_data_size,
                });
            }
            Ok(size)
        })
        .collect::<Result<Vec<usize>, ConfigError>>()?;

    // Greedy grouping in input order
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    let mut data_size = 0;
    for (ix, &size) in sizes.iter().enumerate() {
        let count = ix - start;
        if count > 0 && (count >= limits.max_items || data_size + size > limits.max_data_size) {
            groups.push((start, ix));
            start = ix;
            data_size = 0;
        }
        data_size += size;
    }
    if start < items.len() {
        groups.push((start, items.len()));
    }

    let count = groups.len();
    let mut chunks = Vec::with_capacity(count);
    for (index, (start, end)) in groups.into_iter().enumerate() {
        let transaction = Transaction::for_chunk(index, count);
        let chunk_items = items[start..end].to_vec();

        let mut payload = vec![CFG_VALSET_VALDEL_VERSION, layer_flags, transaction as u8, 0x00];
        for item in &chunk_items {
            item.write(&mut payload)
                .ok_or(ConfigError::InvalidKey(item.key()))?;
        }
        let msg = make_message(UBX_CFG_CLSID, msg_id, &payload)?;

        debug!(
            "config chunk {}/{}: {} items, {} bytes, {}",
            index + 1,
            count,
            chunk_items.len(),
            msg.len(),
            transaction
        );

        chunks.push(ConfigChunk {
            index,
            items: chunk_items,
            transaction,
            msg,
        });
    }

    Ok(chunks)
}
