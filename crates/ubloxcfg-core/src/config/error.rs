//! Configuration errors

use thiserror::Error;

use super::ConfigKey;
use crate::ubx::UbxError;

/// Errors that can occur while encoding or decoding configuration messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Item {key} needs {size} bytes, exceeds the {limit} bytes a single message can carry")]
    OversizedItem {
        key: ConfigKey,
        size: usize,
        limit: usize,
    },

    #[error("Invalid key {0}: unknown size class")]
    InvalidKey(ConfigKey),

    #[error("Invalid layers: {0}")]
    InvalidLayers(String),

    #[error("Too many keys: {0} (maximum {1})")]
    TooManyKeys(usize, usize),

    #[error("Malformed UBX-CFG-VALGET response: {0}")]
    MalformedResponse(String),

    #[error("Frame error: {0}")]
    Frame(#[from] UbxError),
}
