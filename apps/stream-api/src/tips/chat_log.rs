use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use super::event::TipNotification;

#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub notification: TipNotification,
    pub received_at: Instant,
}

/// Recent tip lines shown in chat, newest first.
#[derive(Debug)]
pub struct ChatLog {
    entries: VecDeque<ChatEntry>,
    max_entries: usize,
    retention: Duration,
}

impl ChatLog {
    pub fn new(max_entries: usize, retention: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
            retention,
        }
    }

    pub fn push(&mut self, notification: TipNotification, now: Instant) {
        self.entries.push_front(ChatEntry {
            notification,
            received_at: now,
        });
        self.entries.truncate(self.max_entries);
        self.prune(now);
    }

    /// Drop entries older than the retention window.
    pub fn prune(&mut self, now: Instant) {
        let retention = self.retention;
        self.entries
            .retain(|e| now.saturating_duration_since(e.received_at) <= retention);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
