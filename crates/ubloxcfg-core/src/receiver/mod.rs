//! Receiver Communication
//!
//! Sessions with a u-blox receiver over a serial port or TCP: baud rate
//! detection, message polling, acknowledged configuration and resets.

mod error;
mod options;
mod reset;
mod session;
pub mod transport;

pub use error::RxError;
pub use options::{PollRequest, ReceiverOptions};
pub use reset::ResetMode;
pub use session::{AbortHandle, Receiver, ReceiverState};
pub use transport::{SerialTransport, Target, TcpTransport, Transport};

/// Baud rate used to open serial ports
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default timeout for responses in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Baud rates tried by autobauding, in order
pub const AUTOBAUD_RATES: [u32; 6] = [9600, 38400, 115200, 230400, 460800, 921600];

/// Maximum number of unrelated messages kept while waiting for responses
pub const MAX_INTAKE: usize = 1000;
