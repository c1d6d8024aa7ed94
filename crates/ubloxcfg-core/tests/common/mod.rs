//! Scripted in-memory transport for receiver tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use ubloxcfg_core::receiver::{ReceiverOptions, Transport};
use ubloxcfg_core::ubx::make_message;

type Responder = Box<dyn FnMut(Option<u32>, &[u8]) -> Vec<u8> + Send>;

#[derive(Default)]
struct MockState {
    rx: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    baud_rate: Option<u32>,
    baud_history: Vec<u32>,
    fail_io: bool,
}

/// Mock receiver: every write is answered by the responder, given the current
/// baud rate and the written bytes
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    responder: Responder,
}

/// Test-side view of a [`MockTransport`] owned by a receiver
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new<F>(baud_rate: Option<u32>, responder: F) -> (Box<dyn Transport>, MockHandle)
    where
        F: FnMut(Option<u32>, &[u8]) -> Vec<u8> + Send + 'static,
    {
        let state = Arc::new(Mutex::new(MockState {
            baud_rate,
            ..Default::default()
        }));
        let transport = MockTransport {
            state: state.clone(),
            responder: Box::new(responder),
        };
        (Box::new(transport), MockHandle { state })
    }
}

impl MockHandle {
    /// Messages written by the receiver
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Messages written by the receiver with the given class and message ID
    pub fn writes_of(&self, cls: u8, id: u8) -> usize {
        self.writes()
            .iter()
            .filter(|w| w.len() >= 4 && w[2] == cls && w[3] == id)
            .count()
    }

    /// Baud rates set by the receiver, in order
    pub fn baud_history(&self) -> Vec<u32> {
        self.state.lock().unwrap().baud_history.clone()
    }

    /// Make data available for reading
    pub fn inject(&self, data: &[u8]) {
        self.state.lock().unwrap().rx.extend(data.iter().copied());
    }

    /// Fail all further I/O
    pub fn fail_io(&self) {
        self.state.lock().unwrap().fail_io = true;
    }
}

fn broken_pipe() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "mock transport failure")
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.fail_io {
            return Err(broken_pipe());
        }
        let size = buf.len().min(state.rx.len());
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "no data"));
        }
        for (dst, src) in buf.iter_mut().zip(state.rx.drain(..size)) {
            *dst = src;
        }
        Ok(size)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let baud_rate = {
            let mut state = self.state.lock().unwrap();
            if state.fail_io {
                return Err(broken_pipe());
            }
            state.writes.push(buf.to_vec());
            state.baud_rate
        };
        let response = (self.responder)(baud_rate, buf);
        self.state.lock().unwrap().rx.extend(response);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().rx.clear();
        Ok(())
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        let state = self.state.lock().unwrap();
        if state.fail_io {
            return Err(broken_pipe());
        }
        Ok(state.rx.len() as u32)
    }

    fn baud_rate(&self) -> Option<u32> {
        self.state.lock().unwrap().baud_rate
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.baud_rate = Some(baud_rate);
        state.baud_history.push(baud_rate);
        Ok(())
    }
}

/// Endless stream: repeats `pattern` forever and ignores what is written
pub struct StreamingTransport {
    state: Arc<Mutex<MockState>>,
    pattern: Vec<u8>,
    offs: usize,
}

impl StreamingTransport {
    pub fn new(baud_rate: Option<u32>, pattern: Vec<u8>) -> (Box<dyn Transport>, MockHandle) {
        let state = Arc::new(Mutex::new(MockState {
            baud_rate,
            ..Default::default()
        }));
        let transport = StreamingTransport {
            state: state.clone(),
            pattern,
            offs: 0,
        };
        (Box::new(transport), MockHandle { state })
    }
}

impl Read for StreamingTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for dst in buf.iter_mut() {
            *dst = self.pattern[self.offs];
            self.offs = (self.offs + 1) % self.pattern.len();
        }
        Ok(buf.len())
    }
}

impl Write for StreamingTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.lock().unwrap().writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for StreamingTransport {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        Ok(64)
    }

    fn baud_rate(&self) -> Option<u32> {
        self.state.lock().unwrap().baud_rate
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.baud_rate = Some(baud_rate);
        state.baud_history.push(baud_rate);
        Ok(())
    }
}

/// Fast options without autobaud and detection
pub fn quiet_options() -> ReceiverOptions {
    ReceiverOptions {
        autobaud: false,
        detect: false,
        verbose: false,
        name: Some("mock".to_string()),
        probe_timeout_ms: 50,
        poll_interval_ms: 1,
    }
}

/// Check the class and message ID of a written message
pub fn is_msg(msg: &[u8], cls: u8, id: u8) -> bool {
    msg.len() >= 8 && msg[0] == 0xb5 && msg[1] == 0x62 && msg[2] == cls && msg[3] == id
}

/// Payload of a written message
pub fn payload(msg: &[u8]) -> &[u8] {
    &msg[6..msg.len() - 2]
}

fn fixed(s: &str, size: usize) -> Vec<u8> {
    let mut field = s.as_bytes().to_vec();
    field.resize(size, 0);
    field
}

/// UBX-MON-VER response of a NEO-M9N
pub fn mon_ver_response() -> Vec<u8> {
    let mut payload = fixed("ROM SPG 5.10 (7b202e)", 30);
    payload.extend(fixed("000A0000", 10));
    payload.extend(fixed("FWVER=SPG 5.10", 30));
    payload.extend(fixed("PROTVER=32.01", 30));
    payload.extend(fixed("MOD=NEO-M9N", 30));
    make_message(0x0a, 0x04, &payload).unwrap()
}

pub fn ack(cls: u8, id: u8) -> Vec<u8> {
    make_message(0x05, 0x01, &[cls, id]).unwrap()
}

pub fn nak(cls: u8, id: u8) -> Vec<u8> {
    make_message(0x05, 0x00, &[cls, id]).unwrap()
}
