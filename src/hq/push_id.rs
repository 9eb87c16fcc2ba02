//! Push ID namespaces
//!
//! Push IDs synthesized locally are tagged with the top bit so they can never
//! collide with IDs a peer put on the wire. Only the untagged (external) form
//! is ever encoded; the frame codecs strip the tag on write.

/// Push identifier
pub type PushId = u64;

/// Bit reserved for internally-sourced push IDs
pub const PUSH_ID_MASK: PushId = 1 << 63;

/// Tag `id` as internal
pub const fn mask_push_id(id: PushId) -> PushId {
    id | PUSH_ID_MASK
}

/// Strip the internal tag, yielding the wire form
pub const fn unmask_push_id(id: PushId) -> PushId {
    id & !PUSH_ID_MASK
}

pub const fn is_internal_push_id(id: PushId) -> bool {
    id & PUSH_ID_MASK != 0
}

pub const fn is_external_push_id(id: PushId) -> bool {
    id & PUSH_ID_MASK == 0
}
