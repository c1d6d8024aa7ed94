//! UBX codec errors

use thiserror::Error;

/// Errors that can occur while encoding or decoding UBX frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UbxError {
    #[error("Frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },

    #[error("Bad sync characters: {0:02x} {1:02x}")]
    BadSync(u8, u8),

    #[error("Length mismatch: frame declares {declared} payload bytes, buffer holds {available}")]
    LengthMismatch { declared: usize, available: usize },

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Checksum mismatch: expected {expected:02x?}, got {actual:02x?}")]
    ChecksumMismatch { expected: [u8; 2], actual: [u8; 2] },
}
