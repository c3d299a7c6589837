use std::cmp::Reverse;

use wearvote_types::api::NotificationView;
use wearvote_types::models::{Notification, UserId};

use crate::document::Document;
use crate::{Result, Store};

/// Attach the actor; rows whose actor no longer exists are skipped.
pub fn enrich(doc: &Document, notification: &Notification) -> Option<NotificationView> {
    Some(NotificationView {
        notification: notification.clone(),
        sender: doc.user(notification.sender_id)?.clone(),
    })
}

impl Store {
    /// Newest first.
    pub fn notifications(&self, user_id: UserId) -> Result<Vec<NotificationView>> {
        self.with_doc(|doc| {
            let mut views: Vec<NotificationView> = doc
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id)
                .filter_map(|n| enrich(doc, n))
                .collect();
            views.sort_by_key(|v| Reverse((v.notification.timestamp, v.notification.id)));
            Ok(views)
        })
    }

    pub fn mark_notifications_read(&self, user_id: UserId) -> Result<usize> {
        self.with_doc_mut(|doc| {
            let mut updated = 0;
            for n in doc
                .notifications
                .iter_mut()
                .filter(|n| n.user_id == user_id && !n.is_read)
            {
                n.is_read = true;
                updated += 1;
            }
            Ok(updated)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearvote_types::models::{NotificationKind, User};

    fn store() -> Store {
        let users = (1..=3)
            .map(|id| User {
                id,
                name: format!("user {id}"),
                avatar: String::new(),
                bio: String::new(),
                followers: 0,
            })
            .collect();
        let mut doc = Document {
            users,
            ..Document::default()
        };
        doc.push_notification(1, 2, NotificationKind::Like, 10, "user 2 liked your post", 100);
        doc.push_notification(1, 3, NotificationKind::Comment, 10, "user 3 commented: wow", 200);
        doc.push_notification(2, 1, NotificationKind::Like, 11, "user 1 liked your post", 150);
        doc.push_notification(1, 8, NotificationKind::Like, 10, "gone", 300);
        Store::in_memory(doc)
    }

    #[test]
    fn lists_newest_first_with_sender() {
        let views = store().notifications(1).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].notification.kind, NotificationKind::Comment);
        assert_eq!(views[0].sender.id, 3);
        assert_eq!(views[1].sender.id, 2);
    }

    #[test]
    fn mark_read_twice_updates_nothing_second_time() {
        let store = store();
        assert_eq!(store.mark_notifications_read(1).unwrap(), 3);
        let first = store.snapshot().unwrap();
        assert_eq!(store.mark_notifications_read(1).unwrap(), 0);
        assert_eq!(store.snapshot().unwrap(), first);

        let others_untouched = first.notifications.iter().any(|n| n.user_id == 2 && !n.is_read);
        assert!(others_untouched);
    }
}
