//! UBX Protocol
//!
//! Frame codec, message catalogue and payload helpers for the u-blox binary
//! protocol.
//!
//! Frame format:
//! - 2 bytes: sync characters (0xb5 0x62)
//! - 1 byte: message class
//! - 1 byte: message ID
//! - 2 bytes: payload length (little-endian)
//! - N bytes: payload
//! - 2 bytes: checksum (CK_A, CK_B) over class, ID, length and payload

mod error;
mod frame;
mod info;
pub mod messages;
mod names;

pub use error::UbxError;
pub use frame::{checksum, encode_into, make_message, PayloadBuilder, UbxFrame};
pub use info::message_info;
pub use names::{class_name, message_name, UbxMsgDef, UBX_MESSAGES};

/// First sync character
pub const UBX_SYNC_1: u8 = 0xb5;
/// Second sync character
pub const UBX_SYNC_2: u8 = 0x62;
/// Size of the header (sync, class, ID, length)
pub const UBX_HEAD_SIZE: usize = 6;
/// Size of the frame overhead (header and checksum)
pub const UBX_FRAME_SIZE: usize = 8;
/// Maximum size of a complete frame accepted by the codec and the parser
pub const UBX_MAX_SIZE: usize = 8192;
/// Maximum payload size
pub const UBX_MAX_PAYLOAD_SIZE: usize = UBX_MAX_SIZE - UBX_FRAME_SIZE;

/// UBX-ACK class
pub const UBX_ACK_CLSID: u8 = 0x05;
/// UBX-ACK-ACK
pub const UBX_ACK_ACK_MSGID: u8 = 0x01;
/// UBX-ACK-NAK
pub const UBX_ACK_NAK_MSGID: u8 = 0x00;

/// UBX-CFG class
pub const UBX_CFG_CLSID: u8 = 0x06;
/// UBX-CFG-RST
pub const UBX_CFG_RST_MSGID: u8 = 0x04;
/// UBX-CFG-CFG
pub const UBX_CFG_CFG_MSGID: u8 = 0x09;
/// UBX-CFG-VALSET
pub const UBX_CFG_VALSET_MSGID: u8 = 0x8a;
/// UBX-CFG-VALGET
pub const UBX_CFG_VALGET_MSGID: u8 = 0x8b;
/// UBX-CFG-VALDEL
pub const UBX_CFG_VALDEL_MSGID: u8 = 0x8c;

/// UBX-INF class
pub const UBX_INF_CLSID: u8 = 0x04;
/// UBX-INF-ERROR
pub const UBX_INF_ERROR_MSGID: u8 = 0x00;
/// UBX-INF-WARNING
pub const UBX_INF_WARNING_MSGID: u8 = 0x01;
/// UBX-INF-NOTICE
pub const UBX_INF_NOTICE_MSGID: u8 = 0x02;
/// UBX-INF-TEST
pub const UBX_INF_TEST_MSGID: u8 = 0x03;
/// UBX-INF-DEBUG
pub const UBX_INF_DEBUG_MSGID: u8 = 0x04;

/// UBX-MON class
pub const UBX_MON_CLSID: u8 = 0x0a;
/// UBX-MON-VER
pub const UBX_MON_VER_MSGID: u8 = 0x04;

