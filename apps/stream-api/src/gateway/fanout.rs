//! Room-scoped side channel.
//!
//! Each live room gets its own `tokio::sync::broadcast` channel, created on
//! first subscribe and dropped once nobody is listening. Every participant's
//! receiver sees every message published into the room, its own included.
//! Late subscribers do not see earlier messages.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// A payload published into a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMessage {
    /// Participant that published the message.
    pub sender_id: String,
    /// Opaque bytes.
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("no active room: {0}")]
    NoActiveRoom(String),
}

/// Publish/subscribe access to one room.
#[async_trait]
pub trait DataChannel: Send + Sync {
    async fn send(&self, payload: Vec<u8>) -> Result<(), ChannelError>;

    /// Receive every subsequent message in the room, from any sender.
    fn subscribe(&self) -> broadcast::Receiver<Arc<RoomMessage>>;
}

/// Registry of per-room broadcast channels. Store in AppState.
pub struct RoomHub {
    rooms: DashMap<String, broadcast::Sender<Arc<RoomMessage>>>,
    capacity: usize,
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<Arc<RoomMessage>> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish into a room. Returns how many receivers got the message.
    pub fn publish(&self, room_id: &str, message: RoomMessage) -> Result<usize, ChannelError> {
        let sender = match self.rooms.get(room_id) {
            Some(sender) => sender.clone(),
            None => return Err(ChannelError::NoActiveRoom(room_id.to_string())),
        };

        match sender.send(Arc::new(message)) {
            Ok(delivered) => Ok(delivered),
            Err(_) => {
                // Everyone left; forget the room unless someone rejoined meanwhile.
                self.rooms
                    .remove_if(room_id, |_, sender| sender.receiver_count() == 0);
                Err(ChannelError::NoActiveRoom(room_id.to_string()))
            }
        }
    }

    /// Forget a room once its last receiver is gone. Call after dropping a
    /// subscription. Returns whether the room was removed.
    pub fn release(&self, room_id: &str) -> bool {
        self.rooms
            .remove_if(room_id, |_, sender| sender.receiver_count() == 0)
            .is_some()
    }

    /// Bind a participant to a room.
    pub fn channel(self: &Arc<Self>, room_id: &str, participant_id: &str) -> RoomChannel {
        RoomChannel {
            hub: Arc::clone(self),
            room_id: room_id.to_string(),
            participant_id: participant_id.to_string(),
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn subscriber_count(&self, room_id: &str) -> usize {
        self.rooms
            .get(room_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}

/// One participant's handle on a room.
#[derive(Clone)]
pub struct RoomChannel {
    hub: Arc<RoomHub>,
    room_id: String,
    participant_id: String,
}

#[async_trait]
impl DataChannel for RoomChannel {
    async fn send(&self, payload: Vec<u8>) -> Result<(), ChannelError> {
        let message = RoomMessage {
            sender_id: self.participant_id.clone(),
            payload,
        };
        self.hub.publish(&self.room_id, message).map(|_| ())
    }

    fn subscribe(&self) -> broadcast::Receiver<Arc<RoomMessage>> {
        self.hub.subscribe(&self.room_id)
    }
}
