//! Session options and poll requests

use serde::Deserialize;

use super::DEFAULT_TIMEOUT_MS;
use crate::ubx::{UbxError, UbxFrame, UBX_FRAME_SIZE};

/// Receiver session options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReceiverOptions {
    /// Find the baud rate when opening
    pub autobaud: bool,
    /// Query the receiver version when opening
    pub detect: bool,
    /// Report progress at info level (otherwise debug)
    pub verbose: bool,
    /// Name used in log messages, derived from the target if not set
    pub name: Option<String>,
    /// How long to wait for a response at each baud rate
    pub probe_timeout_ms: u64,
    /// How long to sleep when no data is available
    pub poll_interval_ms: u64,
}

impl Default for ReceiverOptions {
    fn default() -> Self {
        Self {
            autobaud: true,
            detect: true,
            verbose: true,
            name: None,
            probe_timeout_ms: 1000,
            poll_interval_ms: 5,
        }
    }
}

/// A UBX poll: request message and response expectations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    /// Class ID of the request and response
    pub cls: u8,
    /// Message ID of the request and response
    pub id: u8,
    /// Request payload (usually empty)
    pub payload: Vec<u8>,
    /// Response timeout per attempt
    pub timeout_ms: u64,
    /// Number of retransmissions after the first attempt
    pub retries: u32,
    /// Minimum size of the response message (frame overhead included)
    pub min_size: usize,
}

impl PollRequest {
    /// Poll a message with an empty payload
    pub fn new(cls: u8, id: u8) -> Self {
        Self {
            cls,
            id,
            payload: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: 2,
            min_size: UBX_FRAME_SIZE,
        }
    }

    /// Poll using a complete request frame
    pub fn from_frame(msg: &[u8]) -> Result<Self, UbxError> {
        let frame = UbxFrame::from_bytes(msg)?;
        Ok(Self::new(frame.cls, frame.id).payload(frame.payload))
    }

    /// Set the request payload
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Set the timeout per attempt
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the number of retries
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the minimum response size
    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }
}
