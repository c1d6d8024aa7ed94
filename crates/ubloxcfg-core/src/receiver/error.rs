//! Receiver errors

use thiserror::Error;

use super::ReceiverState;
use crate::config::ConfigError;
use crate::ubx::UbxError;

/// Errors that can occur while talking to a receiver
#[derive(Error, Debug)]
pub enum RxError {
    #[error("No response to {name} after {attempts} attempt(s)")]
    Timeout { name: String, attempts: u32 },

    #[error("{name} not acknowledged")]
    NegativeAcknowledged { name: String },

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Invalid target '{0}'")]
    InvalidTarget(String),

    #[error("No receiver responding")]
    NoDeviceResponding,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Cannot {operation} while receiver is {state}")]
    InvalidState {
        state: ReceiverState,
        operation: String,
    },

    #[error("Aborted")]
    Aborted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] UbxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
