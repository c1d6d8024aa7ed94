//! Parsed messages

use serde::Serialize;
use std::fmt;

use crate::ubx::{
    UBX_HEAD_SIZE, UBX_INF_CLSID, UBX_INF_DEBUG_MSGID, UBX_INF_ERROR_MSGID, UBX_INF_NOTICE_MSGID,
    UBX_INF_TEST_MSGID, UBX_INF_WARNING_MSGID,
};

/// Protocol family of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum MsgKind {
    /// UBX frame
    Ubx {
        /// Class ID
        cls: u8,
        /// Message ID
        id: u8,
    },
    /// NMEA sentence
    Nmea {
        /// Talker ID ("GN", "GP", ...) or proprietary prefix ("PUBX")
        talker: String,
        /// Sentence formatter ("GGA", "TXT", ...)
        formatter: String,
    },
    /// Bytes that are not part of any message
    Garbage,
}

/// Severity of an informational message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InfLevel {
    /// Error
    Error,
    /// Warning
    Warning,
    /// Notice
    Notice,
    /// Test output
    Test,
    /// Debug output
    Debug,
    /// Unknown level
    Other,
}

impl InfLevel {
    fn from_ubx_id(id: u8) -> Self {
        match id {
            UBX_INF_ERROR_MSGID => InfLevel::Error,
            UBX_INF_WARNING_MSGID => InfLevel::Warning,
            UBX_INF_NOTICE_MSGID => InfLevel::Notice,
            UBX_INF_TEST_MSGID => InfLevel::Test,
            UBX_INF_DEBUG_MSGID => InfLevel::Debug,
            _ => InfLevel::Other,
        }
    }

    fn from_txt_type(field: &str) -> Self {
        match field {
            "00" => InfLevel::Error,
            "01" => InfLevel::Warning,
            "02" => InfLevel::Notice,
            "03" => InfLevel::Test,
            "04" => InfLevel::Debug,
            _ => InfLevel::Other,
        }
    }
}

impl fmt::Display for InfLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfLevel::Error => "error",
            InfLevel::Warning => "warning",
            InfLevel::Notice => "notice",
            InfLevel::Test => "test",
            InfLevel::Debug => "debug",
            InfLevel::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A message produced by the [`Parser`](super::Parser)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserMsg {
    /// Protocol family
    pub kind: MsgKind,
    /// Raw message bytes as received
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    /// Message name, e.g. "UBX-NAV-PVT", "NMEA-GN-GGA" or "GARBAGE"
    pub name: String,
    /// Short description, for messages that have one
    pub info: Option<String>,
    /// Sequence number, counting all messages of a parser
    pub seq: u64,
}

impl ParserMsg {
    /// Size on the wire
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Class and message ID of a UBX message
    pub fn ubx_ids(&self) -> Option<(u8, u8)> {
        match self.kind {
            MsgKind::Ubx { cls, id } => Some((cls, id)),
            _ => None,
        }
    }

    /// Check for a specific UBX message
    pub fn is_ubx(&self, cls: u8, id: u8) -> bool {
        self.ubx_ids() == Some((cls, id))
    }

    /// Payload of a UBX message
    pub fn ubx_payload(&self) -> Option<&[u8]> {
        self.ubx_ids()?;
        self.data.get(UBX_HEAD_SIZE..self.data.len().checked_sub(2)?)
    }

    /// Check for garbage
    pub fn is_garbage(&self) -> bool {
        self.kind == MsgKind::Garbage
    }

    /// Informational text of UBX-INF-* messages and NMEA TXT sentences
    pub fn inf(&self) -> Option<(InfLevel, String)> {
        match &self.kind {
            MsgKind::Ubx { cls, id } if *cls == UBX_INF_CLSID => {
                let text = String::from_utf8_lossy(self.ubx_payload()?)
                    .trim_end_matches('\0')
                    .to_string();
                Some((InfLevel::from_ubx_id(*id), text))
            }
            MsgKind::Nmea { formatter, .. } if formatter == "TXT" => {
                // <total>,<number>,<type>,<text>
                let info = self.info.as_deref()?;
                let fields: Vec<&str> = info.splitn(4, ',').collect();
                if fields.len() < 4 {
                    return None;
                }
                Some((InfLevel::from_txt_type(fields[2]), fields[3].to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParserMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.seq, self.name, self.size())?;
        if let Some(info) = &self.info {
            write!(f, " {}", info)?;
        }
        Ok(())
    }
}

mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(data))
    }
}
