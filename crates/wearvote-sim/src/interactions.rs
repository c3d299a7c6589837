//! Likes and comments aimed at one user's posts, each raising a notification.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use wearvote_db::notifications::enrich;
use wearvote_db::{Document, voting};
use wearvote_types::api::NotificationView;
use wearvote_types::models::{Message, Millis, NotificationKind, PostId, User, UserId, VoteType};

use crate::pools;

const LIKE_PROBABILITY: f64 = 0.7;

/// Run up to `count` interactions from random other users against `target`'s
/// posts. A like from someone who already voted on that post is skipped.
/// Returns the notifications created, enriched with their actor.
pub fn generate_interactions<R: Rng + ?Sized>(
    doc: &mut Document,
    rng: &mut R,
    target: UserId,
    count: usize,
    now: Millis,
) -> Vec<NotificationView> {
    let posts: Vec<PostId> = doc
        .posts
        .iter()
        .filter(|p| p.user_id == target)
        .map(|p| p.id)
        .collect();
    let actors: Vec<User> = doc.users.iter().filter(|u| u.id != target).cloned().collect();

    if posts.is_empty() || actors.is_empty() {
        debug!(
            "No interactions for user {}: {} posts, {} possible actors",
            target,
            posts.len(),
            actors.len()
        );
        return Vec::new();
    }

    let mut created = Vec::new();
    for _ in 0..count {
        let (Some(&post_id), Some(actor)) = (posts.choose(rng), actors.choose(rng)) else {
            break;
        };

        let (kind, text) = if rng.random_bool(LIKE_PROBABILITY) {
            if doc.vote(post_id, actor.id).is_some() {
                continue;
            }
            if voting::cast(doc, post_id, actor.id, VoteType::Like).is_err() {
                continue;
            }
            (NotificationKind::Like, format!("{} liked your post", actor.name))
        } else {
            let Some(comment) = pools::COMMENTS.choose(rng) else {
                continue;
            };
            doc.push_comment(post_id, actor.id, *comment, now);
            (
                NotificationKind::Comment,
                format!("{} commented: {}", actor.name, comment),
            )
        };

        let notification = doc.push_notification(target, actor.id, kind, post_id, text, now);
        created.extend(enrich(doc, &notification));
    }
    created
}

/// Insert between one and `max` messages from random other users to
/// `target`. These never trigger a simulated reply.
pub fn generate_inbound_messages<R: Rng + ?Sized>(
    doc: &mut Document,
    rng: &mut R,
    target: UserId,
    max: usize,
    now: Millis,
) -> Vec<Message> {
    let senders: Vec<UserId> = doc
        .users
        .iter()
        .filter(|u| u.id != target)
        .map(|u| u.id)
        .collect();

    if max == 0 || senders.is_empty() || doc.user(target).is_none() {
        debug!("No inbound messages for user {}", target);
        return Vec::new();
    }

    let mut sent = Vec::new();
    for _ in 0..rng.random_range(1..=max) {
        let (Some(&sender), Some(text)) = (senders.choose(rng), pools::INBOUND_MESSAGES.choose(rng))
        else {
            break;
        };
        sent.push(doc.push_message(sender, target, *text, now));
    }
    sent
}
