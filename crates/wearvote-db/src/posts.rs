use std::cmp::Reverse;
use std::collections::HashSet;

use wearvote_types::api::{
    CommentView, FeedPost, FeedQuery, FeedType, ProfilePost, ProfileStats, RankedPost, UserProfile,
};
use wearvote_types::models::{MediaType, Millis, Post, PostId, User, UserId};

use crate::document::Document;
use crate::lifecycle::is_active;
use crate::social::follower_count;
use crate::{Result, Store, StoreError};

pub const HALL_OF_FAME_LIMIT: usize = 10;

/// Category values that mean "no category filter".
const ALL_CATEGORIES: &[&str] = &["all", "hepsi"];

/// Fields of a post supplied by its author; id, timestamp and counters are
/// assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub user_id: UserId,
    pub image_url: String,
    pub media_type: MediaType,
    pub description: String,
    pub category: String,
    pub location: String,
    pub height: Option<u32>,
    pub weight: Option<u32>,
}

impl Store {
    // -- Feed --

    pub fn feed(&self, query: &FeedQuery, now: Millis) -> Result<Vec<FeedPost>> {
        self.with_doc(|doc| Ok(query_feed(doc, query, now)))
    }

    pub fn hall_of_fame(&self, now: Millis) -> Result<Vec<RankedPost>> {
        self.with_doc(|doc| Ok(query_hall_of_fame(doc, now)))
    }

    // -- Users --

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_doc(|doc| Ok(doc.users.clone()))
    }

    pub fn search_users(&self, q: &str) -> Result<Vec<User>> {
        let needle = q.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(vec![]);
        }

        self.with_doc(|doc| {
            Ok(doc
                .users
                .iter()
                .filter(|u| u.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
    }

    pub fn user_profile(
        &self,
        user_id: UserId,
        requester_id: Option<UserId>,
        now: Millis,
    ) -> Result<UserProfile> {
        self.with_doc(|doc| query_profile(doc, user_id, requester_id, now))
    }

    // -- Posts --

    pub fn create_post(&self, new: NewPost, now: Millis) -> Result<Post> {
        self.with_doc_mut(|doc| {
            if doc.user(new.user_id).is_none() {
                return Err(StoreError::NotFound("user"));
            }

            let post = Post {
                id: doc.next_post_id(),
                user_id: new.user_id,
                image_url: new.image_url,
                media_type: new.media_type,
                description: new.description,
                category: new.category,
                location: new.location,
                timestamp: now,
                likes: 0,
                dislikes: 0,
                height: new.height,
                weight: new.weight,
            };
            doc.posts.push(post.clone());
            Ok(post)
        })
    }

    // -- Comments --

    /// Newest first. An unknown post simply has no comments.
    pub fn comments(&self, post_id: PostId) -> Result<Vec<CommentView>> {
        self.with_doc(|doc| {
            let mut comments: Vec<CommentView> = doc
                .comments
                .iter()
                .filter(|c| c.post_id == post_id)
                .filter_map(|c| {
                    Some(CommentView {
                        comment: c.clone(),
                        user: doc.user(c.user_id)?.clone(),
                    })
                })
                .collect();
            comments.sort_by_key(|c| Reverse(c.comment.timestamp));
            Ok(comments)
        })
    }

    pub fn add_comment(
        &self,
        post_id: PostId,
        user_id: UserId,
        text: &str,
        now: Millis,
    ) -> Result<CommentView> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::InvalidInput("comment text is required".into()));
        }

        self.with_doc_mut(|doc| {
            let user = doc.user(user_id).cloned().ok_or(StoreError::NotFound("user"))?;
            if doc.post(post_id).is_none() {
                return Err(StoreError::NotFound("post"));
            }

            let comment = doc.push_comment(post_id, user_id, text, now);
            Ok(CommentView { comment, user })
        })
    }
}

fn category_matches(filter: Option<&str>, category: &str) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(f) if ALL_CATEGORIES.contains(&f.to_lowercase().as_str()) => true,
        Some(f) => f == category,
    }
}

fn query_feed(doc: &Document, query: &FeedQuery, now: Millis) -> Vec<FeedPost> {
    let viewer = query.user_id;
    let authors: Option<HashSet<UserId>> = match FeedType::parse(query.feed_type.as_deref()) {
        FeedType::ForYou => None,
        FeedType::Following => {
            let Some(viewer) = viewer else {
                return vec![];
            };
            let mut set: HashSet<UserId> = doc
                .follows
                .iter()
                .filter(|f| f.follower_id == viewer)
                .map(|f| f.following_id)
                .collect();
            set.insert(viewer);
            Some(set)
        }
    };

    let mut posts: Vec<FeedPost> = doc
        .posts
        .iter()
        .filter(|p| is_active(p, now))
        .filter(|p| category_matches(query.category.as_deref(), &p.category))
        .filter(|p| authors.as_ref().is_none_or(|a| a.contains(&p.user_id)))
        .filter_map(|p| {
            Some(FeedPost {
                post: p.clone(),
                user: doc.user(p.user_id)?.clone(),
                comment_count: doc.comment_count(p.id),
                user_vote: viewer.and_then(|v| doc.vote(p.id, v)).map(|v| v.kind),
            })
        })
        .collect();

    posts.sort_by_key(|p| Reverse(p.post.timestamp));
    posts
}

/// All posts, active or expired, ranked by net score then recency.
fn query_hall_of_fame(doc: &Document, now: Millis) -> Vec<RankedPost> {
    let mut ranked: Vec<RankedPost> = doc
        .posts
        .iter()
        .filter_map(|p| {
            Some(RankedPost {
                post: p.clone(),
                user: doc.user(p.user_id)?.clone(),
                is_active: is_active(p, now),
            })
        })
        .collect();

    ranked.sort_by_key(|r| Reverse((r.post.score(), r.post.timestamp)));
    ranked.truncate(HALL_OF_FAME_LIMIT);
    ranked
}

fn query_profile(
    doc: &Document,
    user_id: UserId,
    requester_id: Option<UserId>,
    now: Millis,
) -> Result<UserProfile> {
    let user = doc.user(user_id).cloned().ok_or(StoreError::NotFound("user"))?;

    let mut posts: Vec<ProfilePost> = doc
        .posts
        .iter()
        .filter(|p| p.user_id == user_id)
        .map(|p| ProfilePost {
            post: p.clone(),
            is_active: is_active(p, now),
            comment_count: doc.comment_count(p.id),
            user_vote: requester_id
                .and_then(|r| doc.vote(p.id, r))
                .map(|v| v.kind),
        })
        .collect();
    posts.sort_by_key(|p| Reverse(p.post.timestamp));

    let stats = ProfileStats {
        followers: follower_count(doc, &user),
        following: doc.follows.iter().filter(|f| f.follower_id == user_id).count() as u64,
        posts: posts.len() as u64,
    };

    Ok(UserProfile {
        is_following: requester_id.is_some_and(|r| doc.is_following(r, user_id)),
        user,
        posts,
        stats,
    })
}
