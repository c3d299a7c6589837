//! Post activity window and the hourly purge of transient rows.

use wearvote_types::models::{Millis, Post};

use crate::document::Document;
use crate::{Result, Store};

/// Length of a post's voting window, and the retention of messages and
/// notifications.
pub const ONE_HOUR_MS: Millis = 60 * 60 * 1000;

pub fn now_millis() -> Millis {
    chrono::Utc::now().timestamp_millis()
}

/// A post is active for exactly one hour after creation. Derived on every
/// read; nothing is stored.
pub fn is_active(post: &Post, now: Millis) -> bool {
    now - post.timestamp < ONE_HOUR_MS
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub messages: usize,
    pub notifications: usize,
}

/// Drop messages and notifications at least an hour old. Posts, comments,
/// votes and follows are kept.
pub fn purge_expired(doc: &mut Document, now: Millis) -> PurgeReport {
    let messages_before = doc.messages.len();
    doc.messages.retain(|m| now - m.timestamp < ONE_HOUR_MS);

    let notifications_before = doc.notifications.len();
    doc.notifications.retain(|n| now - n.timestamp < ONE_HOUR_MS);

    PurgeReport {
        messages: messages_before - doc.messages.len(),
        notifications: notifications_before - doc.notifications.len(),
    }
}

impl Store {
    pub fn purge_expired(&self, now: Millis) -> Result<PurgeReport> {
        self.with_doc_mut(|doc| Ok(purge_expired(doc, now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearvote_types::models::{MediaType, NotificationKind};

    fn post_at(timestamp: Millis) -> Post {
        Post {
            id: 1,
            user_id: 1,
            image_url: "/uploads/x.jpg".into(),
            media_type: MediaType::Image,
            description: String::new(),
            category: "Other".into(),
            location: String::new(),
            timestamp,
            likes: 0,
            dislikes: 0,
            height: None,
            weight: None,
        }
    }

    #[test]
    fn active_window_boundary() {
        let t = 1_000_000;
        let post = post_at(t);
        assert!(is_active(&post, t));
        assert!(is_active(&post, t + 59 * 60 * 1000));
        assert!(is_active(&post, t + ONE_HOUR_MS - 1));
        assert!(!is_active(&post, t + ONE_HOUR_MS));
        assert!(!is_active(&post, t + 61 * 60 * 1000));
    }

    #[test]
    fn purge_only_touches_messages_and_notifications() {
        let now = 10 * ONE_HOUR_MS;
        let mut doc = Document::default();
        doc.posts.push(post_at(0));
        doc.push_comment(1, 1, "old comment", 0);
        doc.push_message(1, 2, "stale", now - ONE_HOUR_MS);
        doc.push_message(1, 2, "fresh", now - ONE_HOUR_MS + 1);
        doc.push_notification(1, 2, NotificationKind::Like, 1, "x", now - 2 * ONE_HOUR_MS);

        let report = purge_expired(&mut doc, now);

        assert_eq!(report, PurgeReport { messages: 1, notifications: 1 });
        assert_eq!(doc.messages.len(), 1);
        assert_eq!(doc.messages[0].text, "fresh");
        assert_eq!(doc.posts.len(), 1);
        assert_eq!(doc.comments.len(), 1);
    }

    #[test]
    fn store_purge_persists_and_reports() {
        let now = 10 * ONE_HOUR_MS;
        let mut doc = Document::default();
        doc.push_message(1, 2, "stale", now - ONE_HOUR_MS);
        let store = Store::in_memory(doc);

        assert_eq!(
            store.purge_expired(now).unwrap(),
            PurgeReport { messages: 1, notifications: 0 }
        );
        assert!(store.snapshot().unwrap().messages.is_empty());
        assert_eq!(store.purge_expired(now).unwrap(), PurgeReport::default());
    }
}
