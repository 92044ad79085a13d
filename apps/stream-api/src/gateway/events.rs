//! Overlay event names and wire-format frames.

use serde::Serialize;
use serde_json::{json, Value};

use crate::tips::pipeline::PipelineEvent;
use crate::tips::sequencer::SequencerEvent;

/// A message sent from the server to an overlay client.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayFrame {
    pub t: &'static str,
    pub s: u64,
    pub d: Value,
}

impl OverlayFrame {
    pub fn dispatch(event_name: &'static str, seq: u64, data: Value) -> Self {
        Self {
            t: event_name,
            s: seq,
            d: data,
        }
    }
}

/// Event names dispatched to overlay clients.
pub struct EventName;

impl EventName {
    pub const READY: &'static str = "READY";
    pub const TIP_ACCEPTED: &'static str = "TIP_ACCEPTED";
    pub const OVERLAY_ENTER: &'static str = "OVERLAY_ENTER";
    pub const OVERLAY_DISPLAY: &'static str = "OVERLAY_DISPLAY";
    pub const OVERLAY_EXIT: &'static str = "OVERLAY_EXIT";
    pub const OVERLAY_COMPLETE: &'static str = "OVERLAY_COMPLETE";
}

/// Event name and payload for a pipeline event.
pub fn describe(event: &PipelineEvent) -> Result<(&'static str, Value), serde_json::Error> {
    Ok(match event {
        PipelineEvent::Accepted(notification) => {
            (EventName::TIP_ACCEPTED, serde_json::to_value(notification)?)
        }
        PipelineEvent::Presentation(SequencerEvent::Entering(presentation)) => {
            (EventName::OVERLAY_ENTER, serde_json::to_value(presentation)?)
        }
        PipelineEvent::Presentation(SequencerEvent::Displaying { id }) => {
            (EventName::OVERLAY_DISPLAY, json!({ "id": id }))
        }
        PipelineEvent::Presentation(SequencerEvent::Exiting { id }) => {
            (EventName::OVERLAY_EXIT, json!({ "id": id }))
        }
        PipelineEvent::Presentation(SequencerEvent::Completed { id }) => {
            (EventName::OVERLAY_COMPLETE, json!({ "id": id }))
        }
    })
}
