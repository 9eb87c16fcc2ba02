//! HTTP/3 frame encoding and decoding
//!
//! Parsers take a cursor positioned just after a decoded [`FrameHeader`] and
//! read exactly `header.length` bytes. If the whole payload is not buffered
//! yet they return `Incomplete` and consume nothing; once it is, every field
//! is read from the declared window only, so a field that runs past the
//! frame boundary is `Malformed` rather than `Incomplete`.
//!
//! Callers dispatch on `header.frame_type` before picking a parser; handing
//! a parser the header of another frame type trips a debug assertion.
//!
//! Writers check every field and the sink's capacity before emitting any
//! byte, so a failed write leaves the sink as it was. They do not second-guess
//! semantically odd but encodable input (a PRIORITY frame that gives the tree
//! root a nonzero ID, an empty DATA frame); the receiving parser rejects those.

use super::error::{Error, ErrorCode, ParseOutcome, Result, WriteResult};
use super::frames::*;
use super::push_id::{unmask_push_id, PushId};
use super::settings::{is_grease_id, SettingId, SettingPair};
use super::varint::{checked_varint_len, decode_varint, put_varint, MAX_VARINT_SIZE};
use bytes::{Buf, BufMut, Bytes};

/// Largest possible frame header: two maximum-width varints
pub const MAX_FRAME_HEADER_SIZE: usize = 2 * MAX_VARINT_SIZE;

macro_rules! try_complete {
    ($outcome:expr) => {
        match $outcome {
            ParseOutcome::Complete(value) => value,
            ParseOutcome::Incomplete => return ParseOutcome::Incomplete,
            ParseOutcome::Malformed(code) => return ParseOutcome::Malformed(code),
        }
    };
}

/// Reason a payload window failed to parse
type WindowResult<T> = std::result::Result<T, &'static str>;

// ========== Frame header ==========

/// Encode a frame header
pub fn write_frame_header<B: BufMut>(
    buf: &mut B,
    frame_type: FrameType,
    length: u64,
) -> WriteResult {
    let needed = header_len(frame_type, length)?;
    ensure_capacity(buf, needed)?;
    put_varint(buf, frame_type.as_u64());
    put_varint(buf, length);
    Ok(needed)
}

/// Decode a frame header
///
/// Consumes nothing unless both varints are fully buffered.
pub fn decode_frame_header<B: Buf + Clone>(buf: &mut B) -> ParseOutcome<FrameHeader> {
    let mut peek = buf.clone();
    let frame_type = try_complete!(decode_varint(&mut peek));
    let length = try_complete!(decode_varint(&mut peek));

    let consumed = buf.remaining() - peek.remaining();
    debug_assert!(consumed <= MAX_FRAME_HEADER_SIZE);
    buf.advance(consumed);
    ParseOutcome::Complete(FrameHeader::new(FrameType::from_u64(frame_type), length))
}

/// Write bytes that are not wrapped in a frame (stream preambles and the like)
pub fn write_unframed_bytes<B: BufMut>(buf: &mut B, data: &[u8]) -> WriteResult {
    ensure_capacity(buf, data.len())?;
    buf.put_slice(data);
    Ok(data.len())
}

// ========== DATA / HEADERS ==========

/// Encode a DATA frame
pub fn write_data<B: BufMut>(buf: &mut B, data: &[u8]) -> WriteResult {
    write_framed(buf, FrameType::Data, Ok(data.len()), |buf| buf.put_slice(data))
}

/// Parse a DATA frame payload; an empty DATA frame is malformed
pub fn parse_data<B: Buf>(buf: &mut B, header: &FrameHeader) -> ParseOutcome<Bytes> {
    debug_check_type(header, FrameType::Data);
    if header.length == 0 {
        return finish(header, ErrorCode::MalformedFrameData, Err("empty DATA frame"));
    }
    match take_window(buf, header) {
        Some(payload) => ParseOutcome::Complete(payload),
        None => ParseOutcome::Incomplete,
    }
}

/// Encode a HEADERS frame around an already compressed header block
pub fn write_headers<B: BufMut>(buf: &mut B, header_block: &[u8]) -> WriteResult {
    write_framed(buf, FrameType::Headers, Ok(header_block.len()), |buf| {
        buf.put_slice(header_block)
    })
}

/// Parse a HEADERS frame payload; an empty header block is accepted
pub fn parse_headers<B: Buf>(buf: &mut B, header: &FrameHeader) -> ParseOutcome<Bytes> {
    debug_check_type(header, FrameType::Headers);
    match take_window(buf, header) {
        Some(header_block) => ParseOutcome::Complete(header_block),
        None => ParseOutcome::Incomplete,
    }
}

// ========== Identifier-only frames ==========

/// Encode a CANCEL_PUSH frame; an internal tag on `push_id` is not sent
pub fn write_cancel_push<B: BufMut>(buf: &mut B, push_id: PushId) -> WriteResult {
    write_id_only(buf, FrameType::CancelPush, unmask_push_id(push_id))
}

/// Parse a CANCEL_PUSH payload into the (external) push ID
pub fn parse_cancel_push<B: Buf>(buf: &mut B, header: &FrameHeader) -> ParseOutcome<PushId> {
    parse_id_only(buf, header, FrameType::CancelPush, ErrorCode::MalformedFrameCancelPush)
}

/// Encode a GOAWAY frame carrying the last stream ID the sender will process
pub fn write_goaway<B: BufMut>(buf: &mut B, stream_id: u64) -> WriteResult {
    write_id_only(buf, FrameType::Goaway, stream_id)
}

/// Parse a GOAWAY payload into the stream ID
pub fn parse_goaway<B: Buf>(buf: &mut B, header: &FrameHeader) -> ParseOutcome<u64> {
    parse_id_only(buf, header, FrameType::Goaway, ErrorCode::MalformedFrameGoaway)
}

/// Encode a MAX_PUSH_ID frame; an internal tag on `push_id` is not sent
pub fn write_max_push_id<B: BufMut>(buf: &mut B, push_id: PushId) -> WriteResult {
    write_id_only(buf, FrameType::MaxPushId, unmask_push_id(push_id))
}

/// Parse a MAX_PUSH_ID payload into the (external) push ID
pub fn parse_max_push_id<B: Buf>(buf: &mut B, header: &FrameHeader) -> ParseOutcome<PushId> {
    parse_id_only(buf, header, FrameType::MaxPushId, ErrorCode::MalformedFrameMaxPushId)
}

/// Encode a DUPLICATE_PUSH frame; an internal tag on `push_id` is not sent
pub fn write_duplicate_push<B: BufMut>(buf: &mut B, push_id: PushId) -> WriteResult {
    write_id_only(buf, FrameType::DuplicatePush, unmask_push_id(push_id))
}

/// Parse a DUPLICATE_PUSH payload into the (external) push ID
pub fn parse_duplicate_push<B: Buf>(
    buf: &mut B,
    header: &FrameHeader,
) -> ParseOutcome<PushId> {
    parse_id_only(
        buf,
        header,
        FrameType::DuplicatePush,
        ErrorCode::MalformedFrameDuplicatePush,
    )
}

fn write_id_only<B: BufMut>(buf: &mut B, frame_type: FrameType, id: u64) -> WriteResult {
    write_framed(buf, frame_type, checked_varint_len(id), |buf| put_varint(buf, id))
}

fn parse_id_only<B: Buf>(
    buf: &mut B,
    header: &FrameHeader,
    frame_type: FrameType,
    code: ErrorCode,
) -> ParseOutcome<u64> {
    debug_check_type(header, frame_type);
    let Some(mut window) = take_window(buf, header) else {
        return ParseOutcome::Incomplete;
    };
    let result = window_varint(&mut window, "identifier runs past frame end")
        .and_then(|id| expect_drained(&window).map(|()| id));
    finish(header, code, result)
}

// ========== PUSH_PROMISE ==========

/// Encode a PUSH_PROMISE frame; an internal tag on `push_id` is not sent
pub fn write_push_promise<B: BufMut>(
    buf: &mut B,
    push_id: PushId,
    header_block: &[u8],
) -> WriteResult {
    let push_id = unmask_push_id(push_id);
    let payload_len = checked_varint_len(push_id).map(|id_len| id_len + header_block.len());
    write_framed(buf, FrameType::PushPromise, payload_len, |buf| {
        put_varint(buf, push_id);
        buf.put_slice(header_block);
    })
}

/// Parse a PUSH_PROMISE payload into the push ID and the header block
pub fn parse_push_promise<B: Buf>(
    buf: &mut B,
    header: &FrameHeader,
) -> ParseOutcome<(PushId, Bytes)> {
    debug_check_type(header, FrameType::PushPromise);
    let Some(mut window) = take_window(buf, header) else {
        return ParseOutcome::Incomplete;
    };
    let result = window_varint(&mut window, "push ID runs past frame end");
    finish(header, ErrorCode::MalformedFramePushPromise, result).map(|push_id| (push_id, window))
}

// ========== PRIORITY ==========

/// Encode a PRIORITY frame
///
/// The prioritized element ID is left out when it names the tree root as 0,
/// the form the parser decodes. A nonzero tree-root ID is written as given.
/// The dependency ID is left out whenever the dependency is the tree root.
pub fn write_priority<B: BufMut>(buf: &mut B, priority: &PriorityUpdate) -> WriteResult {
    write_framed(buf, FrameType::Priority, priority_payload_len(priority), |buf| {
        buf.put_u8(priority.control_byte());
        if writes_prioritized_id(priority) {
            put_varint(buf, priority.prioritized_element_id);
        }
        if priority.dependency_type != PriorityElementType::TreeRoot {
            put_varint(buf, priority.element_dependency_id);
        }
        buf.put_u8(priority.weight);
    })
}

fn priority_payload_len(priority: &PriorityUpdate) -> Result<usize> {
    // control byte + weight
    let mut len = 2;
    if writes_prioritized_id(priority) {
        len += checked_varint_len(priority.prioritized_element_id)?;
    }
    if priority.dependency_type != PriorityElementType::TreeRoot {
        len += checked_varint_len(priority.element_dependency_id)?;
    }
    Ok(len)
}

fn writes_prioritized_id(priority: &PriorityUpdate) -> bool {
    priority.prioritized_type != PriorityElementType::TreeRoot
        || priority.prioritized_element_id != 0
}

/// Parse a PRIORITY payload; IDs absent from the wire decode as 0
pub fn parse_priority<B: Buf>(
    buf: &mut B,
    header: &FrameHeader,
) -> ParseOutcome<PriorityUpdate> {
    debug_check_type(header, FrameType::Priority);
    let Some(mut window) = take_window(buf, header) else {
        return ParseOutcome::Incomplete;
    };
    finish(header, ErrorCode::MalformedFramePriority, read_priority(&mut window))
}

fn read_priority(window: &mut Bytes) -> WindowResult<PriorityUpdate> {
    if !window.has_remaining() {
        return Err("missing control byte");
    }
    let control = window.get_u8();
    if control_reserved_bits(control) != 0 {
        return Err("reserved bits set");
    }
    let prioritized_type = control_prioritized_type(control);
    let dependency_type = control_dependency_type(control);

    let prioritized_element_id = if prioritized_type == PriorityElementType::TreeRoot {
        0
    } else {
        window_varint(window, "prioritized element ID runs past frame end")?
    };
    let element_dependency_id = if dependency_type == PriorityElementType::TreeRoot {
        0
    } else {
        window_varint(window, "element dependency ID runs past frame end")?
    };

    if !window.has_remaining() {
        return Err("missing weight");
    }
    let weight = window.get_u8();
    expect_drained(window)?;

    Ok(PriorityUpdate {
        prioritized_type,
        dependency_type,
        exclusive: control_exclusive(control),
        prioritized_element_id,
        element_dependency_id,
        weight,
    })
}

// ========== SETTINGS ==========

/// Encode a SETTINGS frame
///
/// Known settings must carry a value within their domain; GREASE and
/// unrecognized identifiers are only limited by the varint range.
pub fn write_settings<B: BufMut>(buf: &mut B, settings: &[SettingPair]) -> WriteResult {
    write_framed(buf, FrameType::Settings, settings_payload_len(settings), |buf| {
        for setting in settings {
            put_varint(buf, setting.id);
            put_varint(buf, setting.value);
        }
    })
}

fn settings_payload_len(settings: &[SettingPair]) -> Result<usize> {
    let mut len = 0;
    for setting in settings {
        if let Some(id) = setting.known_id() {
            if !id.allows(setting.value) {
                return Err(Error::SettingValueOutOfRange {
                    id: setting.id,
                    value: setting.value,
                });
            }
        }
        len += checked_varint_len(setting.id)? + checked_varint_len(setting.value)?;
    }
    Ok(len)
}

/// Parse a SETTINGS payload
///
/// GREASE and unrecognized settings are dropped without looking at their
/// value. A known setting outside its domain makes the whole frame malformed.
pub fn parse_settings<B: Buf>(
    buf: &mut B,
    header: &FrameHeader,
) -> ParseOutcome<Vec<SettingPair>> {
    debug_check_type(header, FrameType::Settings);
    let Some(mut window) = take_window(buf, header) else {
        return ParseOutcome::Incomplete;
    };
    finish(header, ErrorCode::MalformedFrameSettings, read_settings(&mut window))
}

fn read_settings(window: &mut Bytes) -> WindowResult<Vec<SettingPair>> {
    let mut settings = Vec::new();
    while window.has_remaining() {
        let id = window_varint(window, "setting identifier runs past frame end")?;
        let value = window_varint(window, "setting value runs past frame end")?;
        match SettingId::from_u64(id) {
            Some(known) if known.allows(value) => settings.push(SettingPair::new(known, value)),
            Some(_) => return Err("setting value out of range"),
            None => tracing::trace!(id, grease = is_grease_id(id), "ignoring setting"),
        }
    }
    Ok(settings)
}

// ========== Whole frames ==========

/// Decode a frame header and its payload
///
/// Frames of unknown type are consumed and returned as [`Frame::Unknown`].
/// Nothing is consumed on `Incomplete`; on `Malformed` the offending frame
/// has been consumed.
pub fn parse_frame<B: Buf + Clone>(buf: &mut B) -> ParseOutcome<(FrameHeader, Frame)> {
    let mut peek = buf.clone();
    let header = try_complete!(decode_frame_header(&mut peek));

    let frame = match header.frame_type {
        FrameType::Data => parse_data(&mut peek, &header).map(Frame::Data),
        FrameType::Headers => parse_headers(&mut peek, &header).map(Frame::Headers),
        FrameType::Priority => parse_priority(&mut peek, &header).map(Frame::Priority),
        FrameType::CancelPush => parse_cancel_push(&mut peek, &header).map(Frame::CancelPush),
        FrameType::Settings => parse_settings(&mut peek, &header).map(Frame::Settings),
        FrameType::PushPromise => parse_push_promise(&mut peek, &header)
            .map(|(push_id, header_block)| Frame::PushPromise { push_id, header_block }),
        FrameType::Goaway => parse_goaway(&mut peek, &header).map(Frame::Goaway),
        FrameType::MaxPushId => parse_max_push_id(&mut peek, &header).map(Frame::MaxPushId),
        FrameType::DuplicatePush => {
            parse_duplicate_push(&mut peek, &header).map(Frame::DuplicatePush)
        }
        FrameType::Unknown(frame_type) => match take_window(&mut peek, &header) {
            Some(payload) => ParseOutcome::Complete(Frame::Unknown { frame_type, payload }),
            None => ParseOutcome::Incomplete,
        },
    };

    if !frame.is_incomplete() {
        let consumed = buf.remaining() - peek.remaining();
        buf.advance(consumed);
    }
    frame.map(|frame| (header, frame))
}

/// Encode any frame
///
/// `Frame::Unknown` must carry a type code this codec does not know;
/// known codes are rejected with [`Error::KnownFrameType`].
pub fn write_frame<B: BufMut>(buf: &mut B, frame: &Frame) -> WriteResult {
    match frame {
        Frame::Data(data) => write_data(buf, data),
        Frame::Headers(header_block) => write_headers(buf, header_block),
        Frame::Priority(priority) => write_priority(buf, priority),
        Frame::CancelPush(push_id) => write_cancel_push(buf, *push_id),
        Frame::Settings(settings) => write_settings(buf, settings),
        Frame::PushPromise { push_id, header_block } => {
            write_push_promise(buf, *push_id, header_block)
        }
        Frame::Goaway(stream_id) => write_goaway(buf, *stream_id),
        Frame::MaxPushId(push_id) => write_max_push_id(buf, *push_id),
        Frame::DuplicatePush(push_id) => write_duplicate_push(buf, *push_id),
        Frame::Unknown { frame_type, payload } => {
            let payload_len = match FrameType::from_u64(*frame_type) {
                FrameType::Unknown(_) => Ok(payload.len()),
                _ => Err(Error::KnownFrameType(*frame_type)),
            };
            write_framed(buf, FrameType::Unknown(*frame_type), payload_len, |buf| {
                buf.put_slice(payload)
            })
        }
    }
}

// ========== Helpers ==========

fn debug_check_type(header: &FrameHeader, expected: FrameType) {
    debug_assert_eq!(header.frame_type, expected, "parser called with another frame's header");
}

fn header_len(frame_type: FrameType, length: u64) -> Result<usize> {
    Ok(checked_varint_len(frame_type.as_u64())? + checked_varint_len(length)?)
}

fn ensure_capacity<B: BufMut>(buf: &B, needed: usize) -> Result<()> {
    let available = buf.remaining_mut();
    if available < needed {
        return Err(Error::BufferTooSmall { needed, available });
    }
    Ok(())
}

/// Validate, then write header and payload in one go
fn write_framed<B: BufMut>(
    buf: &mut B,
    frame_type: FrameType,
    payload_len: Result<usize>,
    put_payload: impl FnOnce(&mut B),
) -> WriteResult {
    let checked = payload_len.and_then(|len| {
        let needed = header_len(frame_type, len as u64)? + len;
        ensure_capacity(buf, needed)?;
        Ok((len, needed))
    });
    let (len, needed) = match checked {
        Ok(sizes) => sizes,
        Err(err) => {
            tracing::debug!(frame_type = %frame_type, error = %err, "frame write rejected");
            return Err(err);
        }
    };

    put_varint(buf, frame_type.as_u64());
    put_varint(buf, len as u64);
    put_payload(buf);
    Ok(needed)
}

/// Split off the payload window, or `None` if it is not fully buffered
fn take_window<B: Buf>(buf: &mut B, header: &FrameHeader) -> Option<Bytes> {
    let len = usize::try_from(header.length).ok()?;
    if buf.remaining() < len {
        return None;
    }
    Some(buf.copy_to_bytes(len))
}

/// Read a varint that must end inside the window
fn window_varint(window: &mut Bytes, reason: &'static str) -> WindowResult<u64> {
    decode_varint(window).complete().ok_or(reason)
}

fn expect_drained(window: &Bytes) -> WindowResult<()> {
    if window.has_remaining() {
        return Err("trailing bytes after last field");
    }
    Ok(())
}

/// Classify a window parse, logging why a frame was rejected
fn finish<T>(header: &FrameHeader, code: ErrorCode, result: WindowResult<T>) -> ParseOutcome<T> {
    if let Err(reason) = &result {
        tracing::debug!(
            frame_type = %header.frame_type,
            length = header.length,
            code = %code,
            reason,
            "malformed frame"
        );
    }
    ParseOutcome::from(result.map_err(|_| code))
}
