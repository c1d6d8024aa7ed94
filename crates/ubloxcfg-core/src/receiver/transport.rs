//! Transports
//!
//! Byte channels to a receiver: serial ports and TCP connections (e.g. to a
//! ser2net server).

use serialport::SerialPort;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;
use tracing::debug;

use super::{RxError, DEFAULT_BAUD_RATE};

/// Read timeout of the underlying device, reads are driven by polling
/// [`Transport::bytes_to_read`]
const READ_TIMEOUT_MS: u64 = 10;

/// Abstraction for communication channels (serial or TCP)
pub trait Transport: Read + Write + Send {
    /// Discard received but not yet read bytes
    fn clear_input_buffer(&mut self) -> io::Result<()>;

    /// Get number of bytes available to read
    fn bytes_to_read(&mut self) -> io::Result<u32>;

    /// Current baud rate, `None` if the transport has no baud rate
    fn baud_rate(&self) -> Option<u32> {
        None
    }

    /// Change the baud rate (no-op for transports without one)
    fn set_baud_rate(&mut self, _baud_rate: u32) -> io::Result<()> {
        Ok(())
    }
}

fn to_io_error(e: serialport::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

/// Serial port transport
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    baud_rate: u32,
}

impl SerialTransport {
    /// Open a serial port (8N1, no flow control)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, RxError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .map_err(|e| RxError::TransportFailure(format!("{}: {}", path, e)))?;
        debug!("opened {} at {} baud", path, baud_rate);
        Ok(Self { port, baud_rate })
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialTransport {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(to_io_error)
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        self.port.bytes_to_read().map_err(to_io_error)
    }

    fn baud_rate(&self) -> Option<u32> {
        Some(self.baud_rate)
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()> {
        self.port.set_baud_rate(baud_rate).map_err(to_io_error)?;
        self.baud_rate = baud_rate;
        Ok(())
    }
}

/// TCP transport
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `host:port`
    pub fn connect(addr: &str) -> Result<Self, RxError> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| RxError::TransportFailure(format!("{}: {}", addr, e)))?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(Duration::from_millis(READ_TIMEOUT_MS)))?;
        debug!("connected to {}", addr);
        Ok(Self { stream })
    }
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Transport for TcpTransport {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        // Drain with non-blocking reads until the socket is empty
        self.stream.set_nonblocking(true)?;
        let mut buf = [0u8; 1024];
        let result = loop {
            match self.stream.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.stream.set_nonblocking(false)?;
        result
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        self.stream.set_nonblocking(true)?;
        let mut buf = [0u8; 4096];
        let result = self.stream.peek(&mut buf);
        self.stream.set_nonblocking(false)?;

        match result {
            // A readable socket with nothing to peek is a closed connection
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed",
            )),
            Ok(n) => Ok(n as u32),
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }
}

/// Where to find a receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Serial port, optionally with a baud rate
    Serial {
        /// Device path, e.g. "/dev/ttyACM0" or "COM3"
        path: String,
        /// Baud rate to try first
        baud_rate: Option<u32>,
    },
    /// TCP/IP connection
    Tcp {
        /// "host:port"
        addr: String,
    },
}

impl Target {
    /// Parse `path`, `ser://path[@baud]` or `tcp://host:port`
    pub fn parse(target: &str) -> Result<Self, RxError> {
        let invalid = || RxError::InvalidTarget(target.to_string());

        if let Some(addr) = target.strip_prefix("tcp://") {
            match addr.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    return Ok(Target::Tcp {
                        addr: addr.to_string(),
                    })
                }
                _ => return Err(invalid()),
            }
        }

        let port = target.strip_prefix("ser://").unwrap_or(target);
        let (path, baud_rate) = match port.rsplit_once('@') {
            Some((path, baud)) => (path, Some(baud.parse::<u32>().map_err(|_| invalid())?)),
            None => (port, None),
        };
        if path.is_empty() {
            return Err(invalid());
        }
        Ok(Target::Serial {
            path: path.to_string(),
            baud_rate,
        })
    }

    /// Open the transport
    pub fn open(&self) -> Result<Box<dyn Transport>, RxError> {
        match self {
            Target::Serial { path, baud_rate } => Ok(Box::new(SerialTransport::open(
                path,
                baud_rate.unwrap_or(DEFAULT_BAUD_RATE),
            )?)),
            Target::Tcp { addr } => Ok(Box::new(TcpTransport::connect(addr)?)),
        }
    }

    /// Short name, e.g. "ttyACM0" or "192.168.1.10:2001"
    pub fn short_name(&self) -> String {
        match self {
            Target::Serial { path, .. } => path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(path)
                .to_string(),
            Target::Tcp { addr } => addr.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Serial {
                path,
                baud_rate: Some(baud),
            } => write!(f, "ser://{}@{}", path, baud),
            Target::Serial { path, .. } => write!(f, "ser://{}", path),
            Target::Tcp { addr } => write!(f, "tcp://{}", addr),
        }
    }
}
