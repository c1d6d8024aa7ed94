//! Receiver Configuration
//!
//! Key/value configuration items and their encoding into UBX-CFG-VALSET,
//! UBX-CFG-VALDEL and UBX-CFG-VALGET messages.
//!
//! Large configuration sets are split into several messages ("chunks") which
//! are tagged as one transaction so that the receiver applies all of them or
//! none.

mod batch;
mod error;
mod keyval;
mod layers;
mod valget;

pub use crate::ubx::messages::Transaction;
pub use batch::{
    build_delete_batch, build_delete_batch_with, build_set_batch, build_set_batch_with,
    BatchLimits, ConfigChunk,
};
pub use error::ConfigError;
pub use keyval::{ConfigKey, KeyValue};
pub use layers::Layers;
pub use valget::{build_valget_poll, parse_valget_response, ValgetResponse};

/// Maximum number of key/value pairs in one UBX-CFG-VALSET message
pub const VALSET_MAX_KV: usize = 64;
/// Maximum size of the UBX-CFG-VALSET cfgData section
pub const VALSET_CFGDATA_MAX: usize = VALSET_MAX_KV * (4 + 8);
/// Maximum number of keys in one UBX-CFG-VALDEL message
pub const VALDEL_MAX_K: usize = 64;
/// Maximum size of the UBX-CFG-VALDEL keys section
pub const VALDEL_KEYS_MAX: usize = VALDEL_MAX_K * 4;
/// Maximum number of keys in one UBX-CFG-VALGET poll (and values per response)
pub const VALGET_MAX_K: usize = 64;
