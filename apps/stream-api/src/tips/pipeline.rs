//! Receiver-side glue: reducer, sequencer and chat log for one session.
//!
//! Every accepted tip goes to the chat log. Large tips and gifts are also
//! handed to the sequencer, whose own bounded queue decides which overlays
//! get shown. The reducer's active notification is retired when its overlay
//! completes, or after `display_duration` when it has no overlay in flight.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::NotificationConfig;

use super::chat_log::ChatLog;
use super::event::TipNotification;
use super::reducer::{MessageOutcome, NotificationQueueState};
use super::sequencer::{PresentationSequencer, SequencerEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A new tip passed dedup and was classified.
    Accepted(TipNotification),
    Presentation(SequencerEvent),
}

#[derive(Debug)]
pub struct TipPipeline {
    reducer: NotificationQueueState,
    sequencer: PresentationSequencer,
    chat: ChatLog,
    display: Duration,
    /// Retirement deadline for an active notification with no overlay.
    active_until: Option<Instant>,
}

impl TipPipeline {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            reducer: NotificationQueueState::new(config),
            sequencer: PresentationSequencer::new(config),
            chat: ChatLog::new(config.max_chat_notifications, config.chat_retention),
            display: config.display_duration,
            active_until: None,
        }
    }

    pub fn handle_message(&mut self, bytes: &[u8], now: Instant) -> Vec<PipelineEvent> {
        let mut events = Vec::new();

        let notification = match self.reducer.on_message(bytes) {
            MessageOutcome::Rejected(_) | MessageOutcome::Duplicate { .. } => return events,
            MessageOutcome::Activated(notification) => notification,
            MessageOutcome::Queued { notification, .. } => notification,
        };

        self.chat.push(notification.clone(), now);
        events.push(PipelineEvent::Accepted(notification.clone()));

        if notification.is_large_tier() || notification.is_gift_tier() {
            if let Some(event) = self.sequencer.present(notification, now) {
                events.push(PipelineEvent::Presentation(event));
            }
        }
        // Presenting may have pushed the active notification's overlay out
        // of the sequencer queue.
        self.watch_active(now);

        events
    }

    /// Fire every transition due at or before `now`, in deadline order.
    pub fn advance(&mut self, now: Instant) -> Vec<PipelineEvent> {
        let mut out = Vec::new();

        while let Some(at) = self.next_deadline().filter(|at| *at <= now) {
            for event in self.sequencer.advance(at) {
                if let SequencerEvent::Completed { id } = &event {
                    if self.reducer.active().is_some_and(|active| active.id() == id) {
                        self.retire(at);
                    }
                }
                out.push(PipelineEvent::Presentation(event));
            }

            if self.active_until.is_some_and(|until| until <= at) {
                self.retire(at);
            }
        }

        out
    }

    fn retire(&mut self, at: Instant) {
        self.active_until = None;
        if let Some(next) = self.reducer.on_display_complete() {
            tracing::trace!(tip_id = %next.id(), "notification promoted");
        }
        self.watch_active(at);
    }

    /// Start the display timer for an active notification the sequencer
    /// does not hold. Leaves a running timer alone.
    fn watch_active(&mut self, now: Instant) {
        if self.active_until.is_some() {
            return;
        }
        self.active_until = match self.reducer.active() {
            Some(active) if !self.sequencer.holds(active.id()) => Some(now + self.display),
            _ => None,
        };
    }

    pub fn cleanup(&mut self, now: Instant) {
        self.reducer.cleanup();
        self.chat.prune(now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.sequencer.next_deadline(), self.active_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn cancel(&mut self) {
        self.sequencer.cancel();
        self.active_until = None;
    }

    pub fn reducer(&self) -> &NotificationQueueState {
        &self.reducer
    }

    pub fn sequencer(&self) -> &PresentationSequencer {
        &self.sequencer
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }
}
