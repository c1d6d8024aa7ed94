//! # ubloxcfg Core Library
//!
//! Protocol engine for configuring and monitoring u-blox GNSS receivers.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - UBX frame encoding/decoding, message naming and payload descriptions
//! - NMEA sentence validation and classification
//! - An incremental stream parser for mixed UBX/NMEA byte streams
//! - UBX-CFG-VALSET/VALDEL batching of large configuration sets
//! - Receiver sessions: autobaud, polling, acknowledgements and resets
//!
//! ## Example
//!
//! ```rust,ignore
//! use ubloxcfg_core::config::{build_set_batch, KeyValue, Layers};
//! use ubloxcfg_core::receiver::{Receiver, ReceiverOptions};
//!
//! let mut rx = Receiver::open("/dev/ttyACM0", ReceiverOptions::default())?;
//! println!("Connected to {}", rx.name());
//!
//! let items = vec![KeyValue::new(0x10930006, 1)];
//! let chunks = build_set_batch(&items, Layers::RAM | Layers::BBR)?;
//! rx.apply_config(&chunks, 2000)?;
//! ```

pub mod config;
pub mod nmea;
pub mod parser;
pub mod receiver;
pub mod ubx;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        build_delete_batch, build_set_batch, ConfigChunk, ConfigKey, KeyValue, Layers,
        Transaction,
    };
    pub use crate::parser::{parse_stream, InfLevel, MsgKind, Parser, ParserMsg};
    pub use crate::receiver::{PollRequest, Receiver, ReceiverOptions, ReceiverState, ResetMode};
    pub use crate::ubx::{make_message, message_info, message_name, UbxFrame};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
