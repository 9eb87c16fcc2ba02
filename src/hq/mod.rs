//! HTTP/3 (HQ) framing
//!
//! This module encodes and decodes the frames HTTP/3 carries on QUIC
//! streams. It is the first place untrusted peer bytes are turned into
//! protocol values, so every decoder classifies its input three ways:
//!
//! - `Complete(value)`: the frame was decoded and exactly `length` payload
//!   bytes were consumed
//! - `Incomplete`: more bytes must be buffered; nothing was consumed
//! - `Malformed(code)`: a protocol violation, with the frame-specific code to
//!   report to the peer
//!
//! # Architecture
//!
//! - `varint`: QUIC variable-length integers
//! - `frames`: frame types, headers and the PRIORITY payload
//! - `settings`: the settings validation table, GREASE ids and `H3Settings`
//! - `push_id`: internal/external push ID namespaces
//! - `codec`: per-frame `write_*`/`parse_*` functions and whole-frame dispatch
//!
//! # Examples
//!
//! ```
//! use bytes::BytesMut;
//! use hq_framer::hq::codec::{decode_frame_header, parse_goaway, write_goaway};
//! use hq_framer::hq::{FrameType, ParseOutcome};
//!
//! let mut buf = BytesMut::new();
//! write_goaway(&mut buf, 4).unwrap();
//!
//! let mut cursor = buf.freeze();
//! let header = decode_frame_header(&mut cursor).complete().unwrap();
//! assert_eq!(header.frame_type, FrameType::Goaway);
//! assert_eq!(parse_goaway(&mut cursor, &header), ParseOutcome::Complete(4));
//! ```

pub mod codec;
pub mod error;
pub mod frames;
pub mod push_id;
pub mod settings;
pub mod varint;

pub use codec::{
    decode_frame_header, parse_frame, write_frame, write_frame_header, MAX_FRAME_HEADER_SIZE,
};
pub use error::{Error, ErrorCode, ParseOutcome, Result, WriteResult};
pub use frames::{Frame, FrameHeader, FrameType, PriorityElementType, PriorityUpdate};
pub use push_id::{
    is_external_push_id, is_internal_push_id, mask_push_id, unmask_push_id, PushId, PUSH_ID_MASK,
};
pub use settings::{
    grease_id, is_grease_id, H3Settings, SettingId, SettingPair, SettingValue, SettingsBuilder,
};
pub use varint::{decode_varint, encode_varint, MAX_VARINT};
