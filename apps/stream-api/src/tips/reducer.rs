//! Per-session notification state: dedup, a bounded pending queue and a
//! single active slot.

use std::collections::{HashSet, VecDeque};

use crate::config::NotificationConfig;

use super::codec::{self, Rejection};
use super::event::{Thresholds, TipNotification};

/// What happened to one incoming message.
#[derive(Debug)]
pub enum MessageOutcome {
    Rejected(Rejection),
    Duplicate { key: String },
    /// Nothing was active, so this notification became active immediately.
    Activated(TipNotification),
    /// Queued behind the active notification. `dropped` is the oldest queued
    /// notification if the queue overflowed.
    Queued {
        notification: TipNotification,
        dropped: Option<TipNotification>,
    },
}

/// Insertion-ordered set with a hard cap. Inserting past the cap evicts the
/// oldest key.
#[derive(Debug)]
struct BoundedKeySet {
    order: VecDeque<String>,
    keys: HashSet<String>,
    cap: usize,
}

impl BoundedKeySet {
    fn new(cap: usize) -> Self {
        Self {
            order: VecDeque::new(),
            keys: HashSet::new(),
            cap: cap.max(1),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn insert(&mut self, key: String) {
        if !self.keys.insert(key.clone()) {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.cap {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.keys.clear();
    }
}

#[derive(Debug)]
pub struct NotificationQueueState {
    processed: BoundedKeySet,
    pending: VecDeque<TipNotification>,
    active: Option<TipNotification>,
    max_pending: usize,
    thresholds: Thresholds,
}

impl NotificationQueueState {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            processed: BoundedKeySet::new(config.processed_cap),
            pending: VecDeque::new(),
            active: None,
            max_pending: config.max_pending.max(1),
            thresholds: Thresholds {
                large: config.large_tip_threshold,
                mega: config.mega_tip_threshold,
            },
        }
    }

    pub fn on_message(&mut self, bytes: &[u8]) -> MessageOutcome {
        let event = match codec::decode(bytes) {
            Ok(event) => event,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected tip payload");
                return MessageOutcome::Rejected(rejection);
            }
        };

        let key = event.dedup_key();
        if self.processed.contains(&key) {
            tracing::trace!(key = %key, "duplicate tip notification");
            return MessageOutcome::Duplicate { key };
        }
        self.processed.insert(key);

        let notification = TipNotification::classify(event, self.thresholds);

        if self.active.is_none() {
            self.active = Some(notification.clone());
            return MessageOutcome::Activated(notification);
        }

        self.pending.push_back(notification.clone());
        let dropped = if self.pending.len() > self.max_pending {
            self.pending.pop_front()
        } else {
            None
        };
        if let Some(dropped) = &dropped {
            tracing::warn!(tip_id = %dropped.id(), "pending queue full, dropped oldest notification");
        }

        MessageOutcome::Queued {
            notification,
            dropped,
        }
    }

    /// Retire the active notification and promote the head of the queue.
    pub fn on_display_complete(&mut self) -> Option<TipNotification> {
        self.active = self.pending.pop_front();
        self.active.clone()
    }

    /// Periodic cleanup. Forgets every dedup key once the set is at its cap.
    /// Returns whether the set was cleared.
    pub fn cleanup(&mut self) -> bool {
        if self.processed.len() >= self.processed.cap {
            tracing::debug!(keys = self.processed.len(), "clearing processed tip keys");
            self.processed.clear();
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<&TipNotification> {
        self.active.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &TipNotification> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    /// Active first, then pending in arrival order.
    fn all(&self) -> impl Iterator<Item = &TipNotification> {
        self.active.iter().chain(self.pending.iter())
    }

    pub fn chat_inline(&self) -> Vec<&TipNotification> {
        self.all().collect()
    }

    pub fn large_tip_overlay(&self) -> Vec<&TipNotification> {
        self.all().filter(|n| n.is_large_tier()).collect()
    }

    pub fn gift_overlay(&self) -> Vec<&TipNotification> {
        self.all().filter(|n| n.is_gift_tier()).collect()
    }
}
