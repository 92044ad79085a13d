//! Single-slot presentation state machine.
//!
//! One notification is on screen at a time and walks through
//! `Idle -> Entering -> Displaying -> Exiting -> Idle`. The machine never
//! reads the clock itself: callers pass `now` and sleep until
//! [`PresentationSequencer::next_deadline`].

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::NotificationConfig;

use super::escalation::Surface;
use super::event::TipNotification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Entering,
    Displaying,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub notification: TipNotification,
    pub surface: Surface,
}

impl Presentation {
    pub fn id(&self) -> &str {
        self.notification.id()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    Entering(Presentation),
    Displaying { id: String },
    Exiting { id: String },
    /// The slot is free again.
    Completed { id: String },
}

/// Phase durations per surface.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub enter: Duration,
    pub gift_enter: Duration,
    pub display: Duration,
    pub gift_display: Duration,
    pub exit: Duration,
}

impl Timings {
    fn for_surface(&self, surface: &Surface) -> (Duration, Duration, Duration) {
        match surface {
            Surface::Inline => (Duration::ZERO, self.display, Duration::ZERO),
            Surface::TipOverlay { .. } => (self.enter, self.display, self.exit),
            Surface::GiftOverlay { .. } => (self.gift_enter, self.gift_display, self.exit),
        }
    }
}

impl From<&NotificationConfig> for Timings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            enter: config.enter_duration,
            gift_enter: config.gift_enter_duration,
            display: config.display_duration,
            gift_display: config.gift_display_duration,
            exit: config.exit_duration,
        }
    }
}

#[derive(Debug)]
struct Slot {
    presentation: Presentation,
    phase: Phase,
    deadline: Instant,
}

#[derive(Debug)]
pub struct PresentationSequencer {
    timings: Timings,
    max_queue: usize,
    current: Option<Slot>,
    queue: VecDeque<Presentation>,
}

impl PresentationSequencer {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            timings: Timings::from(config),
            max_queue: config.max_overlay_queue.max(1),
            current: None,
            queue: VecDeque::new(),
        }
    }

    /// Start presenting immediately if the slot is free, otherwise queue.
    ///
    /// A full queue silently drops its oldest candidate.
    pub fn present(&mut self, notification: TipNotification, now: Instant) -> Option<SequencerEvent> {
        let presentation = Presentation {
            surface: Surface::for_notification(&notification),
            notification,
        };

        if self.current.is_none() {
            return Some(self.start(presentation, now));
        }

        self.queue.push_back(presentation);
        if self.queue.len() > self.max_queue {
            if let Some(dropped) = self.queue.pop_front() {
                tracing::debug!(tip_id = %dropped.id(), "overlay queue full, dropped oldest");
            }
        }
        None
    }

    fn start(&mut self, presentation: Presentation, at: Instant) -> SequencerEvent {
        let (enter, _, _) = self.timings.for_surface(&presentation.surface);
        self.current = Some(Slot {
            presentation: presentation.clone(),
            phase: Phase::Entering,
            deadline: at + enter,
        });
        SequencerEvent::Entering(presentation)
    }

    /// Fire every transition whose deadline is at or before `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<SequencerEvent> {
        let mut events = Vec::new();

        while let Some(slot) = self.current.as_mut() {
            if slot.deadline > now {
                break;
            }
            let (_, display, exit) = self.timings.for_surface(&slot.presentation.surface);
            let id = slot.presentation.id().to_string();
            let at = slot.deadline;

            match slot.phase {
                Phase::Entering => {
                    slot.phase = Phase::Displaying;
                    slot.deadline = at + display;
                    events.push(SequencerEvent::Displaying { id });
                }
                Phase::Displaying => {
                    slot.phase = Phase::Exiting;
                    slot.deadline = at + exit;
                    events.push(SequencerEvent::Exiting { id });
                }
                Phase::Exiting | Phase::Idle => {
                    self.current = None;
                    events.push(SequencerEvent::Completed { id });
                    if let Some(next) = self.queue.pop_front() {
                        events.push(self.start(next, at));
                    }
                }
            }
        }

        events
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|slot| slot.deadline)
    }

    /// Abandon the current cycle and everything queued. No further
    /// transition fires.
    pub fn cancel(&mut self) {
        self.current = None;
        self.queue.clear();
    }

    pub fn phase(&self) -> Phase {
        self.current.as_ref().map_or(Phase::Idle, |slot| slot.phase)
    }

    pub fn current(&self) -> Option<&Presentation> {
        self.current.as_ref().map(|slot| &slot.presentation)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether `id` is on screen or waiting for the slot.
    pub fn holds(&self, id: &str) -> bool {
        self.current().is_some_and(|p| p.id() == id) || self.queue.iter().any(|p| p.id() == id)
    }
}
