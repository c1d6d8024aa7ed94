//! Stream Parser
//!
//! Splits a byte stream into UBX frames and NMEA sentences. Bytes that do not
//! form a valid message are not dropped but returned as garbage messages, so
//! that every received byte is accounted for.
//!
//! The parser resynchronises one byte at a time: when a candidate message
//! turns out to be invalid (bad checksum, bad length, non-printable NMEA
//! character, ...) only its first byte is declared garbage and scanning
//! continues at the next byte.

mod message;

pub use message::{InfLevel, MsgKind, ParserMsg};

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use tracing::trace;

use crate::nmea::{self, SentenceCheck};
use crate::ubx::{
    checksum, message_info, message_name, UBX_FRAME_SIZE, UBX_HEAD_SIZE, UBX_MAX_SIZE, UBX_SYNC_1,
    UBX_SYNC_2,
};

/// Garbage is emitted at the latest when this many bytes have accumulated
pub const MAX_GARBAGE_SIZE: usize = 4096;

/// Name of garbage messages
pub const GARBAGE_NAME: &str = "GARBAGE";

/// Message and byte counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParserStats {
    /// Number of UBX messages
    pub ubx_msgs: u64,
    /// Bytes in UBX messages
    pub ubx_bytes: u64,
    /// Number of NMEA messages
    pub nmea_msgs: u64,
    /// Bytes in NMEA messages
    pub nmea_bytes: u64,
    /// Number of garbage messages
    pub garbage_msgs: u64,
    /// Garbage bytes (including bytes dropped by [`Parser::reset`])
    pub garbage_bytes: u64,
}

impl ParserStats {
    /// Total number of messages
    pub fn total_msgs(&self) -> u64 {
        self.ubx_msgs + self.nmea_msgs + self.garbage_msgs
    }

    /// Total number of bytes
    pub fn total_bytes(&self) -> u64 {
        self.ubx_bytes + self.nmea_bytes + self.garbage_bytes
    }
}

/// Outcome of checking the buffer at the current position
enum Detect {
    Message(usize),
    Wait,
    None,
}

impl From<SentenceCheck> for Detect {
    fn from(check: SentenceCheck) -> Self {
        match check {
            SentenceCheck::Complete(size) => Detect::Message(size),
            SentenceCheck::NeedMore => Detect::Wait,
            SentenceCheck::Invalid => Detect::None,
        }
    }
}

/// Incremental UBX/NMEA stream parser
#[derive(Debug, Default)]
pub struct Parser {
    /// Received bytes not yet returned as messages
    buf: Vec<u8>,
    /// Number of bytes at the start of `buf` known to be garbage
    garbage: usize,
    /// Sequence number of the next message
    seq: u64,
    stats: ParserStats,
}

impl Parser {
    /// Create an empty parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Add received bytes
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Number of buffered bytes not yet returned
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Counters
    pub fn stats(&self) -> &ParserStats {
        &self.stats
    }

    /// Drop all buffered bytes (counted as garbage)
    pub fn reset(&mut self) {
        if !self.buf.is_empty() {
            trace!("parser reset, dropping {} bytes", self.buf.len());
        }
        self.stats.garbage_bytes += self.buf.len() as u64;
        self.buf.clear();
        self.garbage = 0;
    }

    /// Get the next message, `None` if more data is needed
    pub fn process(&mut self) -> Option<ParserMsg> {
        self.next_msg(false)
    }

    /// With `eof` set, incomplete messages are resynchronised like invalid ones
    fn next_msg(&mut self, eof: bool) -> Option<ParserMsg> {
        loop {
            if self.garbage >= MAX_GARBAGE_SIZE {
                return Some(self.emit_garbage());
            }

            let detect = match self.buf.get(self.garbage..) {
                Some(rest) if !rest.is_empty() => match detect(rest) {
                    Detect::Wait if eof => Detect::None,
                    detect => detect,
                },
                _ => Detect::Wait,
            };

            match detect {
                Detect::Message(size) => {
                    return Some(if self.garbage > 0 {
                        self.emit_garbage()
                    } else {
                        self.emit_message(size)
                    });
                }
                Detect::Wait => {
                    return if self.garbage > 0 {
                        Some(self.emit_garbage())
                    } else {
                        None
                    };
                }
                Detect::None => self.garbage += 1,
            }
        }
    }

    fn emit_garbage(&mut self) -> ParserMsg {
        let data: Vec<u8> = self.buf.drain(..self.garbage).collect();
        self.garbage = 0;
        self.stats.garbage_msgs += 1;
        self.stats.garbage_bytes += data.len() as u64;
        trace!("garbage: {} bytes", data.len());
        self.make_msg(MsgKind::Garbage, data, GARBAGE_NAME.to_string(), None)
    }

    fn emit_message(&mut self, size: usize) -> ParserMsg {
        let data: Vec<u8> = self.buf.drain(..size).collect();
        let (kind, name, info) = if data[0] == UBX_SYNC_1 {
            self.stats.ubx_msgs += 1;
            self.stats.ubx_bytes += size as u64;
            let (cls, id) = (data[2], data[3]);
            (
                MsgKind::Ubx { cls, id },
                message_name(cls, id),
                message_info(&data),
            )
        } else {
            self.stats.nmea_msgs += 1;
            self.stats.nmea_bytes += size as u64;
            let (talker, formatter) = nmea::address(&data).unwrap_or_default();
            (
                MsgKind::Nmea { talker, formatter },
                nmea::sentence_name(&data),
                nmea::sentence_info(&data),
            )
        };
        self.make_msg(kind, data, name, info)
    }

    fn make_msg(
        &mut self,
        kind: MsgKind,
        data: Vec<u8>,
        name: String,
        info: Option<String>,
    ) -> ParserMsg {
        let seq = self.seq;
        self.seq += 1;
        ParserMsg {
            kind,
            data,
            name,
            info,
            seq,
        }
    }
}

impl Iterator for Parser {
    type Item = ParserMsg;

    fn next(&mut self) -> Option<ParserMsg> {
        self.process()
    }
}

/// Parse a complete byte slice
///
/// Bytes of an incomplete message at the end are returned as garbage.
pub fn parse_stream(data: &[u8]) -> Vec<ParserMsg> {
    let mut parser = Parser::new();
    parser.feed(data);
    std::iter::from_fn(|| parser.next_msg(true)).collect()
}

fn detect(buf: &[u8]) -> Detect {
    match buf[0] {
        UBX_SYNC_1 => detect_ubx(buf),
        nmea::NMEA_START => nmea::check_sentence(buf).into(),
        _ => Detect::None,
    }
}

fn detect_ubx(buf: &[u8]) -> Detect {
    match buf.get(1) {
        None => return Detect::Wait,
        Some(&UBX_SYNC_2) => {}
        Some(_) => return Detect::None,
    }
    if buf.len() < UBX_HEAD_SIZE {
        return Detect::Wait;
    }
    let size = LittleEndian::read_u16(&buf[4..6]) as usize + UBX_FRAME_SIZE;
    if size > UBX_MAX_SIZE {
        return Detect::None;
    }
    if buf.len() < size {
        return Detect::Wait;
    }
    if checksum(&buf[2..size - 2])[..] == buf[size - 2..size] {
        Detect::Message(size)
    } else {
        Detect::None
    }
}
