//! HTTP/3 settings
//!
//! This module holds the validation table consulted by the SETTINGS codec
//! (known identifiers and their value domains, GREASE recognition) and a
//! typed `H3Settings` view with a builder for assembling a local SETTINGS
//! frame.

use super::error::{Error, Result};
use super::varint::MAX_VARINT;
use std::fmt;

/// Setting value as carried on the wire
pub type SettingValue = u64;

/// First GREASE setting identifier
const GREASE_BASE: u64 = 0x21;
/// Distance between GREASE setting identifiers
const GREASE_STRIDE: u64 = 0x1f;

/// Largest `N` for which `0x1f * N + 0x21` is still a valid varint
pub const MAX_GREASE_ID_INDEX: u64 = (MAX_VARINT - GREASE_BASE) / GREASE_STRIDE;

/// Known HTTP/3 settings identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum SettingId {
    /// SETTINGS_HEADER_TABLE_SIZE (0x1)
    /// Maximum size of the QPACK dynamic table
    HeaderTableSize = 0x1,

    /// SETTINGS_MAX_HEADER_LIST_SIZE (0x6)
    /// Advises peer of the maximum size of header list
    MaxHeaderListSize = 0x6,

    /// SETTINGS_QPACK_BLOCKED_STREAMS (0x7)
    /// Number of streams that may be blocked on QPACK decoding
    QpackBlockedStreams = 0x7,

    /// SETTINGS_NUM_PLACEHOLDERS (0x9)
    /// Number of PRIORITY placeholders the server provides
    NumPlaceholders = 0x9,
}

impl SettingId {
    pub fn as_u64(self) -> u64 {
        self as u64
    }

    /// Look up a known identifier; GREASE and unrecognized ids yield `None`
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            0x1 => Some(SettingId::HeaderTableSize),
            0x6 => Some(SettingId::MaxHeaderListSize),
            0x7 => Some(SettingId::QpackBlockedStreams),
            0x9 => Some(SettingId::NumPlaceholders),
            _ => None,
        }
    }

    /// Upper bound of the value domain (inclusive); all known settings are 32-bit
    pub fn max_value(self) -> SettingValue {
        match self {
            SettingId::HeaderTableSize
            | SettingId::MaxHeaderListSize
            | SettingId::QpackBlockedStreams
            | SettingId::NumPlaceholders => u64::from(u32::MAX),
        }
    }

    pub fn allows(self, value: SettingValue) -> bool {
        value <= self.max_value()
    }

    /// Get setting name
    pub fn name(&self) -> &'static str {
        match self {
            SettingId::HeaderTableSize => "HEADER_TABLE_SIZE",
            SettingId::MaxHeaderListSize => "MAX_HEADER_LIST_SIZE",
            SettingId::QpackBlockedStreams => "QPACK_BLOCKED_STREAMS",
            SettingId::NumPlaceholders => "NUM_PLACEHOLDERS",
        }
    }
}

impl From<SettingId> for u64 {
    fn from(id: SettingId) -> u64 {
        id.as_u64()
    }
}

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.name(), self.as_u64())
    }
}

/// GREASE identifier with the given index, if it fits the varint range
pub fn grease_id(index: u64) -> Option<u64> {
    if index > MAX_GREASE_ID_INDEX {
        return None;
    }
    Some(GREASE_STRIDE * index + GREASE_BASE)
}

/// Is `id` of the reserved form `0x1f * N + 0x21`?
pub fn is_grease_id(id: u64) -> bool {
    id >= GREASE_BASE && (id - GREASE_BASE) % GREASE_STRIDE == 0
}

/// One `(identifier, value)` pair of a SETTINGS frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingPair {
    pub id: u64,
    pub value: SettingValue,
}

impl SettingPair {
    pub fn new(id: impl Into<u64>, value: SettingValue) -> Self {
        SettingPair { id: id.into(), value }
    }

    /// The identifier if it is one this codec knows
    pub fn known_id(&self) -> Option<SettingId> {
        SettingId::from_u64(self.id)
    }
}

/// Typed view of the settings an endpoint advertises
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct H3Settings {
    /// QPACK dynamic table size (default: 0)
    pub header_table_size: Option<u32>,

    /// Maximum header list size (default: unlimited)
    pub max_header_list_size: Option<u32>,

    /// QPACK blocked streams (default: 0)
    pub qpack_blocked_streams: Option<u32>,

    /// PRIORITY placeholders (default: 0)
    pub num_placeholders: Option<u32>,
}

impl H3Settings {
    /// Create empty settings
    pub fn new() -> Self {
        H3Settings::default()
    }

    /// Settings with every protocol default spelled out
    pub fn default_settings() -> Self {
        H3Settings {
            header_table_size: Some(0),
            max_header_list_size: None, // Unlimited
            qpack_blocked_streams: Some(0),
            num_placeholders: Some(0),
        }
    }

    pub fn get_header_table_size(&self) -> u32 {
        self.header_table_size.unwrap_or(0)
    }

    /// None = unlimited
    pub fn get_max_header_list_size(&self) -> Option<u32> {
        self.max_header_list_size
    }

    pub fn get_qpack_blocked_streams(&self) -> u32 {
        self.qpack_blocked_streams.unwrap_or(0)
    }

    pub fn get_num_placeholders(&self) -> u32 {
        self.num_placeholders.unwrap_or(0)
    }

    fn slot(&mut self, id: SettingId) -> &mut Option<u32> {
        match id {
            SettingId::HeaderTableSize => &mut self.header_table_size,
            SettingId::MaxHeaderListSize => &mut self.max_header_list_size,
            SettingId::QpackBlockedStreams => &mut self.qpack_blocked_streams,
            SettingId::NumPlaceholders => &mut self.num_placeholders,
        }
    }

    /// Build from decoded pairs; unknown ids are ignored, later values win
    pub fn from_pairs(pairs: &[SettingPair]) -> Result<Self> {
        let mut settings = H3Settings::new();
        for pair in pairs {
            let Some(id) = pair.known_id() else {
                continue;
            };
            let value = u32::try_from(pair.value).map_err(|_| Error::SettingValueOutOfRange {
                id: pair.id,
                value: pair.value,
            })?;
            *settings.slot(id) = Some(value);
        }
        Ok(settings)
    }

    /// Pairs for every setting that is set, in identifier order
    pub fn to_pairs(&self) -> Vec<SettingPair> {
        let fields = [
            (SettingId::HeaderTableSize, self.header_table_size),
            (SettingId::MaxHeaderListSize, self.max_header_list_size),
            (SettingId::QpackBlockedStreams, self.qpack_blocked_streams),
            (SettingId::NumPlaceholders, self.num_placeholders),
        ];
        fields
            .into_iter()
            .filter_map(|(id, value)| value.map(|v| SettingPair::new(id, u64::from(v))))
            .collect()
    }

    /// Merge settings from another H3Settings object
    /// (values in `other` override values in `self`)
    pub fn merge(&mut self, other: &H3Settings) {
        if other.header_table_size.is_some() {
            self.header_table_size = other.header_table_size;
        }
        if other.max_header_list_size.is_some() {
            self.max_header_list_size = other.max_header_list_size;
        }
        if other.qpack_blocked_streams.is_some() {
            self.qpack_blocked_streams = other.qpack_blocked_streams;
        }
        if other.num_placeholders.is_some() {
            self.num_placeholders = other.num_placeholders;
        }
    }
}

/// Builder for HTTP/3 settings
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: H3Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        SettingsBuilder::default()
    }

    pub fn header_table_size(mut self, size: u32) -> Self {
        self.settings.header_table_size = Some(size);
        self
    }

    pub fn max_header_list_size(mut self, size: u32) -> Self {
        self.settings.max_header_list_size = Some(size);
        self
    }

    pub fn qpack_blocked_streams(mut self, streams: u32) -> Self {
        self.settings.qpack_blocked_streams = Some(streams);
        self
    }

    pub fn num_placeholders(mut self, placeholders: u32) -> Self {
        self.settings.num_placeholders = Some(placeholders);
        self
    }

    /// Build the settings
    pub fn build(self) -> H3Settings {
        self.settings
    }
}
