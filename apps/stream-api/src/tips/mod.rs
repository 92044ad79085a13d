//! Tip broadcast and notification pipeline.
//!
//! Sending side: [`broadcaster`] encodes a persisted tip with [`codec`] and
//! publishes it into the room. Receiving side: [`feed`] runs a
//! [`pipeline::TipPipeline`] per session, which dedups and queues through
//! [`reducer`] and puts one notification on screen at a time through
//! [`sequencer`].

pub mod broadcaster;
pub mod chat_log;
pub mod codec;
pub mod escalation;
pub mod event;
pub mod feed;
pub mod pipeline;
pub mod reducer;
pub mod sequencer;
