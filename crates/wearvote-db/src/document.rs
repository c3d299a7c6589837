//! The persisted document layout: one top-level array per entity.
//!
//! Every collection is always present (missing arrays load as empty), and
//! references between rows are resolved by linear scan.

use serde::{Deserialize, Serialize};

use wearvote_types::models::{
    Comment, CommentId, Follow, Message, MessageId, Millis, Notification, NotificationId,
    NotificationKind, Post, PostId, User, UserId, Vote,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub votes: Vec<Vote>,
    pub follows: Vec<Follow>,
    pub messages: Vec<Message>,
    pub notifications: Vec<Notification>,
    pub sequences: Sequences,
}

/// Last id handed out for rows that get purged; never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sequences {
    pub message: MessageId,
    pub notification: NotificationId,
}

impl Document {
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn post_mut(&mut self, id: PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    pub fn vote(&self, post_id: PostId, user_id: UserId) -> Option<&Vote> {
        self.votes
            .iter()
            .find(|v| v.post_id == post_id && v.user_id == user_id)
    }

    pub fn comment_count(&self, post_id: PostId) -> usize {
        self.comments.iter().filter(|c| c.post_id == post_id).count()
    }

    pub fn is_following(&self, follower_id: UserId, following_id: UserId) -> bool {
        self.follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id)
    }

    pub fn next_post_id(&self) -> PostId {
        self.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    pub fn next_comment_id(&self) -> CommentId {
        self.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn next_message_id(&mut self) -> MessageId {
        let highest = self.messages.iter().map(|m| m.id).max().unwrap_or(0);
        self.sequences.message = self.sequences.message.max(highest) + 1;
        self.sequences.message
    }

    pub fn next_notification_id(&mut self) -> NotificationId {
        let highest = self.notifications.iter().map(|n| n.id).max().unwrap_or(0);
        self.sequences.notification = self.sequences.notification.max(highest) + 1;
        self.sequences.notification
    }

    pub fn push_comment(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        text: impl Into<String>,
        timestamp: Millis,
    ) -> Comment {
        let comment = Comment {
            id: self.next_comment_id(),
            post_id,
            user_id,
            text: text.into(),
            timestamp,
        };
        self.comments.push(comment.clone());
        comment
    }

    pub fn push_message(
        &mut self,
        sender_id: UserId,
        receiver_id: UserId,
        text: impl Into<String>,
        timestamp: Millis,
    ) -> Message {
        let message = Message {
            id: self.next_message_id(),
            sender_id,
            receiver_id,
            text: text.into(),
            timestamp,
            is_read: false,
        };
        self.messages.push(message.clone());
        message
    }

    pub fn push_notification(
        &mut self,
        user_id: UserId,
        sender_id: UserId,
        kind: NotificationKind,
        post_id: PostId,
        text: impl Into<String>,
        timestamp: Millis,
    ) -> Notification {
        let notification = Notification {
            id: self.next_notification_id(),
            user_id,
            sender_id,
            kind,
            post_id,
            text: text.into(),
            timestamp,
            is_read: false,
        };
        self.notifications.push(notification.clone());
        notification
    }
}
