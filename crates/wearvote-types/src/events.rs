use serde::{Deserialize, Serialize};

use crate::api::NotificationView;
use crate::models::{Message, UserId};

/// Events pushed FROM server TO client over the WebSocket gateway.
///
/// Wire shape: `{"type": "receive_message", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum GatewayEvent {
    /// Server accepted the `identify` handshake
    Ready { user_id: UserId },

    /// A direct message addressed to this client
    ReceiveMessage(Message),

    /// Echo of a message this client sent, after it was stored
    MessageSent(Message),

    /// The counterpart started typing
    UserTyping { sender_id: UserId },

    /// The counterpart stopped typing
    UserStopTyping { sender_id: UserId },

    /// Fresh posts were generated; clients should re-fetch the feed
    NewPostsAvailable { count: usize },

    /// Activity on one of this client's posts
    NewNotification(NotificationView),
}

impl GatewayEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::ReceiveMessage(_) => "receive_message",
            Self::MessageSent(_) => "message_sent",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStopTyping { .. } => "user_stop_typing",
            Self::NewPostsAvailable { .. } => "new_posts_available",
            Self::NewNotification(_) => "new_notification",
        }
    }
}

/// Commands sent FROM client TO server over WebSocket.
///
/// The sender of `send_message`/`typing`/`stop_typing` is always the user the
/// connection identified as; a `senderId` field in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum GatewayCommand {
    /// Bind this connection to a user
    Identify { user_id: UserId },

    /// Send a direct message
    SendMessage { receiver_id: UserId, text: String },

    /// Indicate typing to a counterpart
    Typing { receiver_id: UserId },

    /// Indicate typing stopped
    StopTyping { receiver_id: UserId },
}
