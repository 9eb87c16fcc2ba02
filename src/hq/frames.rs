//! HTTP/3 frame types
//!
//! Every frame on an HTTP/3 stream is `varint(type) || varint(length)`
//! followed by exactly `length` bytes of type-specific payload.

use super::push_id::PushId;
use super::settings::SettingPair;
use bytes::Bytes;
use std::fmt;

/// HTTP/3 frame types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// DATA frame (0x0) - Request or response body bytes
    Data,
    /// HEADERS frame (0x1) - QPACK-encoded header block
    Headers,
    /// PRIORITY frame (0x2) - Reprioritizes an element of the dependency tree
    Priority,
    /// CANCEL_PUSH frame (0x3) - Cancels a server push
    CancelPush,
    /// SETTINGS frame (0x4) - Connection configuration parameters
    Settings,
    /// PUSH_PROMISE frame (0x5) - Announces a server push
    PushPromise,
    /// GOAWAY frame (0x7) - Initiates graceful shutdown
    Goaway,
    /// MAX_PUSH_ID frame (0xd) - Raises the push ID limit
    MaxPushId,
    /// DUPLICATE_PUSH frame (0xe) - References an already promised push
    DuplicatePush,
    /// Any other type; its payload is skipped
    Unknown(u64),
}

impl FrameType {
    /// Convert frame type to its wire value
    pub fn as_u64(self) -> u64 {
        match self {
            FrameType::Data => 0x0,
            FrameType::Headers => 0x1,
            FrameType::Priority => 0x2,
            FrameType::CancelPush => 0x3,
            FrameType::Settings => 0x4,
            FrameType::PushPromise => 0x5,
            FrameType::Goaway => 0x7,
            FrameType::MaxPushId => 0xd,
            FrameType::DuplicatePush => 0xe,
            FrameType::Unknown(value) => value,
        }
    }

    /// Create frame type from its wire value
    pub fn from_u64(value: u64) -> Self {
        match value {
            0x0 => FrameType::Data,
            0x1 => FrameType::Headers,
            0x2 => FrameType::Priority,
            0x3 => FrameType::CancelPush,
            0x4 => FrameType::Settings,
            0x5 => FrameType::PushPromise,
            0x7 => FrameType::Goaway,
            0xd => FrameType::MaxPushId,
            0xe => FrameType::DuplicatePush,
            other => FrameType::Unknown(other),
        }
    }

    /// Get frame type name
    pub fn name(&self) -> &'static str {
        match self {
            FrameType::Data => "DATA",
            FrameType::Headers => "HEADERS",
            FrameType::Priority => "PRIORITY",
            FrameType::CancelPush => "CANCEL_PUSH",
            FrameType::Settings => "SETTINGS",
            FrameType::PushPromise => "PUSH_PROMISE",
            FrameType::Goaway => "GOAWAY",
            FrameType::MaxPushId => "MAX_PUSH_ID",
            FrameType::DuplicatePush => "DUPLICATE_PUSH",
            FrameType::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<FrameType> for u64 {
    fn from(frame_type: FrameType) -> u64 {
        frame_type.as_u64()
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.name(), self.as_u64())
    }
}

/// Frame header: type and exact payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub frame_type: FrameType,
    pub length: u64,
}

impl FrameHeader {
    pub fn new(frame_type: FrameType, length: u64) -> Self {
        FrameHeader { frame_type, length }
    }
}

/// What a PRIORITY reference point denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PriorityElementType {
    RequestStream = 0x0,
    PushStream = 0x1,
    Placeholder = 0x2,
    TreeRoot = 0x3,
}

impl PriorityElementType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create from the low two bits of `bits`; every pattern is valid
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0x0 => PriorityElementType::RequestStream,
            0x1 => PriorityElementType::PushStream,
            0x2 => PriorityElementType::Placeholder,
            _ => PriorityElementType::TreeRoot,
        }
    }
}

// PRIORITY control byte: |PT(2)|DT(2)|reserved(3)|E(1)|
const PRIORITIZED_TYPE_SHIFT: u8 = 6;
const DEPENDENCY_TYPE_SHIFT: u8 = 4;
const ELEMENT_TYPE_MASK: u8 = 0x3;
/// Reserved bits of the PRIORITY control byte; must be zero on the wire
pub const PRIORITY_RESERVED_MASK: u8 = 0x0E;
const EXCLUSIVE_BIT: u8 = 0x01;

/// Prioritized element type carried by a control byte
pub fn control_prioritized_type(control: u8) -> PriorityElementType {
    PriorityElementType::from_bits((control >> PRIORITIZED_TYPE_SHIFT) & ELEMENT_TYPE_MASK)
}

/// Dependency element type carried by a control byte
pub fn control_dependency_type(control: u8) -> PriorityElementType {
    PriorityElementType::from_bits((control >> DEPENDENCY_TYPE_SHIFT) & ELEMENT_TYPE_MASK)
}

pub fn control_exclusive(control: u8) -> bool {
    control & EXCLUSIVE_BIT != 0
}

pub fn control_reserved_bits(control: u8) -> u8 {
    control & PRIORITY_RESERVED_MASK
}

/// PRIORITY frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityUpdate {
    pub prioritized_type: PriorityElementType,
    pub dependency_type: PriorityElementType,
    pub exclusive: bool,
    /// Absent on the wire (and 0) when `prioritized_type` is the tree root
    pub prioritized_element_id: u64,
    /// Absent on the wire (and 0) when `dependency_type` is the tree root
    pub element_dependency_id: u64,
    pub weight: u8,
}

impl PriorityUpdate {
    /// Pack the element types and exclusive flag into a control byte
    pub fn control_byte(&self) -> u8 {
        let mut control = (self.prioritized_type.as_u8() & ELEMENT_TYPE_MASK)
            << PRIORITIZED_TYPE_SHIFT;
        control |= (self.dependency_type.as_u8() & ELEMENT_TYPE_MASK) << DEPENDENCY_TYPE_SHIFT;
        if self.exclusive {
            control |= EXCLUSIVE_BIT;
        }
        control
    }
}

/// A fully decoded HTTP/3 frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(Bytes),
    Headers(Bytes),
    Priority(PriorityUpdate),
    CancelPush(PushId),
    Settings(Vec<SettingPair>),
    PushPromise { push_id: PushId, header_block: Bytes },
    Goaway(u64),
    MaxPushId(PushId),
    DuplicatePush(PushId),
    /// Frame of a type this codec does not know; the payload is passed through
    Unknown { frame_type: u64, payload: Bytes },
}

impl Frame {
    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::Data(_) => FrameType::Data,
            Frame::Headers(_) => FrameType::Headers,
            Frame::Priority(_) => FrameType::Priority,
            Frame::CancelPush(_) => FrameType::CancelPush,
            Frame::Settings(_) => FrameType::Settings,
            Frame::PushPromise { .. } => FrameType::PushPromise,
            Frame::Goaway(_) => FrameType::Goaway,
            Frame::MaxPushId(_) => FrameType::MaxPushId,
            Frame::DuplicatePush(_) => FrameType::DuplicatePush,
            Frame::Unknown { frame_type, .. } => FrameType::from_u64(*frame_type),
        }
    }
}
