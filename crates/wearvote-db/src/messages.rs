use std::cmp::Reverse;
use std::collections::BTreeSet;

use wearvote_types::api::Conversation;
use wearvote_types::models::{Message, Millis, UserId};

use crate::document::Document;
use crate::{Result, Store, StoreError};

impl Store {
    pub fn insert_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: &str,
        now: Millis,
    ) -> Result<Message> {
        if text.trim().is_empty() {
            return Err(StoreError::InvalidInput("message text is required".into()));
        }
        self.with_doc_mut(|doc| {
            if doc.user(sender_id).is_none() || doc.user(receiver_id).is_none() {
                return Err(StoreError::NotFound("user"));
            }
            Ok(doc.push_message(sender_id, receiver_id, text, now))
        })
    }

    /// Both directions between `a` and `b`, oldest first.
    pub fn conversation(&self, a: UserId, b: UserId) -> Result<Vec<Message>> {
        self.with_doc(|doc| {
            let mut messages: Vec<Message> = doc
                .messages
                .iter()
                .filter(|m| {
                    (m.sender_id == a && m.receiver_id == b)
                        || (m.sender_id == b && m.receiver_id == a)
                })
                .cloned()
                .collect();
            messages.sort_by_key(|m| (m.timestamp, m.id));
            Ok(messages)
        })
    }

    pub fn conversations(&self, user_id: UserId) -> Result<Vec<Conversation>> {
        self.with_doc(|doc| Ok(query_conversations(doc, user_id)))
    }

    /// Mark everything `sender_id` sent to `receiver_id` as read. Returns how
    /// many rows changed.
    pub fn mark_messages_read(&self, receiver_id: UserId, sender_id: UserId) -> Result<usize> {
        self.with_doc_mut(|doc| {
            let mut updated = 0;
            for m in doc
                .messages
                .iter_mut()
                .filter(|m| m.receiver_id == receiver_id && m.sender_id == sender_id && !m.is_read)
            {
                m.is_read = true;
                updated += 1;
            }
            Ok(updated)
        })
    }
}

fn query_conversations(doc: &Document, user_id: UserId) -> Vec<Conversation> {
    let counterparts: BTreeSet<UserId> = doc
        .messages
        .iter()
        .filter_map(|m| {
            if m.sender_id == user_id {
                Some(m.receiver_id)
            } else if m.receiver_id == user_id {
                Some(m.sender_id)
            } else {
                None
            }
        })
        .collect();

    let mut conversations: Vec<Conversation> = counterparts
        .into_iter()
        .filter_map(|other| {
            let user = doc.user(other)?.clone();
            let thread = doc.messages.iter().filter(|m| {
                (m.sender_id == user_id && m.receiver_id == other)
                    || (m.sender_id == other && m.receiver_id == user_id)
            });

            let last_message = thread.clone().max_by_key(|m| (m.timestamp, m.id))?.clone();
            let unread_count = thread
                .filter(|m| m.receiver_id == user_id && !m.is_read)
                .count();

            Some(Conversation {
                user,
                last_message,
                unread_count,
            })
        })
        .collect();

    conversations.sort_by_key(|c| Reverse((c.last_message.timestamp, c.last_message.id)));
    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearvote_types::models::User;

    fn store() -> Store {
        let users = (1..=4)
            .map(|id| User {
                id,
                name: format!("user {id}"),
                avatar: String::new(),
                bio: String::new(),
                followers: 0,
            })
            .collect();
        Store::in_memory(Document {
            users,
            ..Document::default()
        })
    }

    #[test]
    fn history_is_ascending_regardless_of_insert_order() {
        let store = store();
        store.insert_message(2, 1, "late reply", 300).unwrap();
        store.insert_message(1, 2, "hello", 100).unwrap();
        store.insert_message(1, 3, "other thread", 150).unwrap();
        store.insert_message(2, 1, "hi", 200).unwrap();

        let history = store.conversation(1, 2).unwrap();
        let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "hi", "late reply"]);
        assert_eq!(store.conversation(2, 1).unwrap(), history);
    }

    #[test]
    fn conversation_list_summarises_each_counterpart() {
        let store = store();
        store.insert_message(2, 1, "from 2", 100).unwrap();
        store.insert_message(2, 1, "again from 2", 110).unwrap();
        store.insert_message(1, 3, "to 3", 200).unwrap();
        store.insert_message(3, 1, "from 3", 250).unwrap();
        store
            .with_doc_mut(|doc| {
                doc.push_message(9, 1, "ghost", 300);
                Ok(())
            })
            .unwrap();

        let list = store.conversations(1).unwrap();
        let others: Vec<_> = list.iter().map(|c| c.user.id).collect();
        assert_eq!(others, vec![3, 2]);
        assert_eq!(list[0].last_message.text, "from 3");
        assert_eq!(list[0].unread_count, 1);
        assert_eq!(list[1].unread_count, 2);

        assert!(store.conversations(4).unwrap().is_empty());
    }

    #[test]
    fn mark_read_is_directional_and_idempotent() {
        let store = store();
        store.insert_message(2, 1, "a", 1).unwrap();
        store.insert_message(2, 1, "b", 2).unwrap();
        store.insert_message(1, 2, "c", 3).unwrap();

        assert_eq!(store.mark_messages_read(1, 2).unwrap(), 2);
        let after_first = store.snapshot().unwrap();
        assert_eq!(store.mark_messages_read(1, 2).unwrap(), 0);
        assert_eq!(store.snapshot().unwrap(), after_first);

        let unread_by_2 = after_first.messages.iter().filter(|m| !m.is_read).count();
        assert_eq!(unread_by_2, 1);
    }

    #[test]
    fn blank_messages_are_rejected() {
        let store = store();
        assert!(matches!(
            store.insert_message(1, 2, "  ", 0),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_sender_or_receiver_is_rejected() {
        let store = store();
        assert!(matches!(
            store.insert_message(1, 999, "hello?", 0),
            Err(StoreError::NotFound("user"))
        ));
        assert!(matches!(
            store.insert_message(999, 1, "hello?", 0),
            Err(StoreError::NotFound("user"))
        ));
        assert!(store.snapshot().unwrap().messages.is_empty());
    }
}
