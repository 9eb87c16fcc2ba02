//! HTTP/3 framing error types
//!
//! Decoding never fails with an `Error`: it yields a [`ParseOutcome`], which
//! distinguishes "need more bytes" from a protocol violation. `Error` is what
//! the write side returns when a caller hands it something the wire format
//! cannot carry.

use super::frames::FrameType;
use std::fmt;

/// Framing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Value does not fit a QUIC variable-length integer (>= 2^62)
    #[error("Value {0} exceeds the varint range")]
    VarintOutOfRange(u64),

    /// Known setting carrying a value outside its declared domain
    #[error("Setting 0x{id:x} value {value} outside allowed range")]
    SettingValueOutOfRange { id: u64, value: u64 },

    /// Output sink cannot hold the whole frame
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Opaque frame whose type code belongs to a frame this codec knows
    #[error("Frame type 0x{0:x} is not an unknown frame type")]
    KnownFrameType(u64),

    /// Peer sent a malformed frame
    #[error("Malformed frame: {0}")]
    Malformed(ErrorCode),
}

/// Malformed-frame error codes, one per frame type that can be malformed.
///
/// Each code is `0x0100` plus the wire value of the frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum ErrorCode {
    MalformedFrameData = 0x0100,
    MalformedFrameHeaders = 0x0101,
    MalformedFramePriority = 0x0102,
    MalformedFrameCancelPush = 0x0103,
    MalformedFrameSettings = 0x0104,
    MalformedFramePushPromise = 0x0105,
    MalformedFrameGoaway = 0x0107,
    MalformedFrameMaxPushId = 0x010d,
    MalformedFrameDuplicatePush = 0x010e,
}

impl ErrorCode {
    /// Convert error code to its wire value
    pub fn as_u64(self) -> u64 {
        self as u64
    }

    /// Create error code from its wire value
    pub fn from_u64(code: u64) -> Option<Self> {
        match code {
            0x0100 => Some(ErrorCode::MalformedFrameData),
            0x0101 => Some(ErrorCode::MalformedFrameHeaders),
            0x0102 => Some(ErrorCode::MalformedFramePriority),
            0x0103 => Some(ErrorCode::MalformedFrameCancelPush),
            0x0104 => Some(ErrorCode::MalformedFrameSettings),
            0x0105 => Some(ErrorCode::MalformedFramePushPromise),
            0x0107 => Some(ErrorCode::MalformedFrameGoaway),
            0x010d => Some(ErrorCode::MalformedFrameMaxPushId),
            0x010e => Some(ErrorCode::MalformedFrameDuplicatePush),
            _ => None,
        }
    }

    /// Malformed-frame code reported for a given frame type
    ///
    /// Unknown frame types are skipped rather than validated, so they have none.
    pub fn for_frame_type(frame_type: FrameType) -> Option<Self> {
        match frame_type {
            FrameType::Data => Some(ErrorCode::MalformedFrameData),
            FrameType::Headers => Some(ErrorCode::MalformedFrameHeaders),
            FrameType::Priority => Some(ErrorCode::MalformedFramePriority),
            FrameType::CancelPush => Some(ErrorCode::MalformedFrameCancelPush),
            FrameType::Settings => Some(ErrorCode::MalformedFrameSettings),
            FrameType::PushPromise => Some(ErrorCode::MalformedFramePushPromise),
            FrameType::Goaway => Some(ErrorCode::MalformedFrameGoaway),
            FrameType::MaxPushId => Some(ErrorCode::MalformedFrameMaxPushId),
            FrameType::DuplicatePush => Some(ErrorCode::MalformedFrameDuplicatePush),
            FrameType::Unknown(_) => None,
        }
    }

    /// Get error name
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::MalformedFrameData => "HTTP_MALFORMED_FRAME_DATA",
            ErrorCode::MalformedFrameHeaders => "HTTP_MALFORMED_FRAME_HEADERS",
            ErrorCode::MalformedFramePriority => "HTTP_MALFORMED_FRAME_PRIORITY",
            ErrorCode::MalformedFrameCancelPush => "HTTP_MALFORMED_FRAME_CANCEL_PUSH",
            ErrorCode::MalformedFrameSettings => "HTTP_MALFORMED_FRAME_SETTINGS",
            ErrorCode::MalformedFramePushPromise => "HTTP_MALFORMED_FRAME_PUSH_PROMISE",
            ErrorCode::MalformedFrameGoaway => "HTTP_MALFORMED_FRAME_GOAWAY",
            ErrorCode::MalformedFrameMaxPushId => "HTTP_MALFORMED_FRAME_MAX_PUSH_ID",
            ErrorCode::MalformedFrameDuplicatePush => "HTTP_MALFORMED_FRAME_DUPLICATE_PUSH",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.name(), self.as_u64())
    }
}

/// Result of every decode operation.
///
/// `Incomplete` is not an error: the caller should buffer more bytes and
/// retry the same call. Decoders leave the cursor untouched when they
/// return `Incomplete`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ParseOutcome<T> {
    /// Value fully decoded
    Complete(T),
    /// Not enough bytes buffered yet
    Incomplete,
    /// Protocol violation
    Malformed(ErrorCode),
}

impl<T> ParseOutcome<T> {
    /// Did decoding produce a value?
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete(_))
    }

    /// Must the caller buffer more bytes and retry?
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseOutcome::Incomplete)
    }

    /// The error code, if the input was malformed
    pub fn malformed(&self) -> Option<ErrorCode> {
        match self {
            ParseOutcome::Malformed(code) => Some(*code),
            _ => None,
        }
    }

    /// The decoded value, discarding the other outcomes
    pub fn complete(self) -> Option<T> {
        match self {
            ParseOutcome::Complete(value) => Some(value),
            _ => None,
        }
    }

    /// Transform the decoded value, passing the other outcomes through
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ParseOutcome<U> {
        match self {
            ParseOutcome::Complete(value) => ParseOutcome::Complete(f(value)),
            ParseOutcome::Incomplete => ParseOutcome::Incomplete,
            ParseOutcome::Malformed(code) => ParseOutcome::Malformed(code),
        }
    }

    /// Convert to a `Result` so callers can propagate malformed input with `?`
    ///
    /// `Incomplete` maps to `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            ParseOutcome::Complete(value) => Ok(Some(value)),
            ParseOutcome::Incomplete => Ok(None),
            ParseOutcome::Malformed(code) => Err(Error::Malformed(code)),
        }
    }
}

impl<T> From<std::result::Result<T, ErrorCode>> for ParseOutcome<T> {
    fn from(result: std::result::Result<T, ErrorCode>) -> Self {
        match result {
            Ok(value) => ParseOutcome::Complete(value),
            Err(code) => ParseOutcome::Malformed(code),
        }
    }
}

/// Result type for framing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result of every write operation: the number of bytes written
pub type WriteResult = Result<usize>;
