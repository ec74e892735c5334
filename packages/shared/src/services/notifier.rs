use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::responses::{ChatMessage, LobbyEvent, MoveEvent};
use crate::services::errors::notifier_errors::NotifierError;

#[cfg(test)]
use mockall::automock;

/// Publishes committed moves to a lobby's observers.
///
/// Callers invoke this while still holding the session lock, so events for one
/// lobby reach the notifier in commit order. Implementations must not reorder
/// them; duplicate delivery is acceptable.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_move(&self, event: &MoveEvent) -> Result<(), NotifierError>;
}

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Longest chat line accepted, in characters.
pub const MAX_CHAT_LENGTH: usize = 500;

/// In-process fan-out with one broadcast channel per lobby. Moves and chat
/// share the channel, so observers see them in the order they were sent.
pub struct ChannelNotifier {
    channels: DashMap<Uuid, broadcast::Sender<LobbyEvent>>,
    capacity: usize,
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        ChannelNotifier {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, lobby_id: Uuid) -> broadcast::Receiver<LobbyEvent> {
        self.channels
            .entry(lobby_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drops the lobby's channel once nobody listens any more.
    pub fn prune(&self, lobby_id: &Uuid) {
        self.channels
            .remove_if(lobby_id, |_, sender| sender.receiver_count() == 0);
    }

    pub fn subscriber_count(&self, lobby_id: &Uuid) -> usize {
        self.channels
            .get(lobby_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Relays a chat line to the lobby's observers, the sender included.
    /// Returns how many observers it reached.
    pub fn send_chat(
        &self,
        lobby_id: Uuid,
        sender_id: &str,
        sender_name: &str,
        text: &str,
    ) -> Result<usize, NotifierError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NotifierError::InvalidMessage(
                "Chat message cannot be empty".to_string(),
            ));
        }
        if text.chars().count() > MAX_CHAT_LENGTH {
            return Err(NotifierError::InvalidMessage(format!(
                "Chat message cannot exceed {} characters",
                MAX_CHAT_LENGTH
            )));
        }

        let message = ChatMessage {
            lobby_id,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            message: text.to_string(),
            sent_at: Utc::now(),
        };
        let receivers = self.publish(lobby_id, LobbyEvent::Chat(message));
        debug!(
            "Chat from {} in lobby {} sent to {} observer(s)",
            sender_id, lobby_id, receivers
        );
        Ok(receivers)
    }

    fn publish(&self, lobby_id: Uuid, event: LobbyEvent) -> usize {
        let sender = match self.channels.get(&lobby_id) {
            Some(sender) => sender.clone(),
            None => {
                debug!("No observers for lobby {}", lobby_id);
                return 0;
            }
        };

        match sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                // Every receiver has gone away since the last subscribe.
                self.prune(&lobby_id);
                0
            }
        }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify_move(&self, event: &MoveEvent) -> Result<(), NotifierError> {
        let receivers = self.publish(event.lobby_id, LobbyEvent::Move(event.clone()));
        debug!(
            "Move {} of lobby {} sent to {} observer(s)",
            event.sequence, event.lobby_id, receivers
        );
        Ok(())
    }
}
