//! Per-connection overlay session state.

use std::sync::atomic::{AtomicU64, Ordering};

use tipcast_common::id::{prefix, prefixed_ulid};

pub struct OverlaySession {
    /// `ovl_` prefixed ULID, also used as the participant id in the room.
    pub session_id: String,
    pub room_id: String,
    /// Monotonically increasing sequence number for dispatched frames.
    seq: AtomicU64,
}

impl OverlaySession {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            session_id: prefixed_ulid(prefix::OVERLAY),
            room_id: room_id.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}
