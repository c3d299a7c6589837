use wearvote_types::api::FollowResponse;
use wearvote_types::models::{Follow, Millis, User, UserId};

use crate::document::Document;
use crate::{Result, Store, StoreError};

/// Seeded base count plus live Follow rows.
pub(crate) fn follower_count(doc: &Document, user: &User) -> u64 {
    let live = doc.follows.iter().filter(|f| f.following_id == user.id).count();
    user.followers + live as u64
}

impl Store {
    /// Follow if not following, unfollow otherwise.
    pub fn toggle_follow(
        &self,
        follower_id: UserId,
        following_id: UserId,
        now: Millis,
    ) -> Result<FollowResponse> {
        if follower_id == following_id {
            return Err(StoreError::InvalidInput("users cannot follow themselves".into()));
        }

        self.with_doc_mut(|doc| {
            if doc.user(follower_id).is_none() {
                return Err(StoreError::NotFound("user"));
            }
            let target = doc
                .user(following_id)
                .cloned()
                .ok_or(StoreError::NotFound("user"))?;

            let existing = doc
                .follows
                .iter()
                .position(|f| f.follower_id == follower_id && f.following_id == following_id);

            let is_following = match existing {
                Some(i) => {
                    doc.follows.remove(i);
                    false
                }
                None => {
                    doc.follows.push(Follow {
                        follower_id,
                        following_id,
                        timestamp: now,
                    });
                    true
                }
            };

            Ok(FollowResponse {
                is_following,
                followers: follower_count(doc, &target),
            })
        })
    }
}
