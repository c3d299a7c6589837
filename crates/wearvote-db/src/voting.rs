//! Per (post, user) like/dislike toggle.
//!
//! Each pair is in one of three states: no vote, liked, disliked. Repeating
//! the current vote clears it; the opposite vote switches it.

use wearvote_types::api::{HasVotedResponse, VoteResponse};
use wearvote_types::models::{PostId, UserId, Vote, VoteType};

use crate::document::Document;
use crate::{Result, Store, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub likes: i32,
    pub dislikes: i32,
}

const fn delta(likes: i32, dislikes: i32) -> CounterDelta {
    CounterDelta { likes, dislikes }
}

pub fn transition(
    current: Option<VoteType>,
    requested: VoteType,
) -> (Option<VoteType>, CounterDelta) {
    use VoteType::{Dislike, Like};

    match (current, requested) {
        (None, Like) => (Some(Like), delta(1, 0)),
        (None, Dislike) => (Some(Dislike), delta(0, 1)),
        (Some(Like), Like) => (None, delta(-1, 0)),
        (Some(Like), Dislike) => (Some(Dislike), delta(-1, 1)),
        (Some(Dislike), Dislike) => (None, delta(0, -1)),
        (Some(Dislike), Like) => (Some(Like), delta(1, -1)),
    }
}

/// Counters never go below zero.
fn shift(counter: u32, by: i32) -> u32 {
    if by >= 0 {
        counter.saturating_add(by.unsigned_abs())
    } else {
        counter.saturating_sub(by.unsigned_abs())
    }
}

/// Apply `requested` for `user_id` on `post_id`, updating the vote row and the
/// post counters together.
pub fn cast(
    doc: &mut Document,
    post_id: PostId,
    user_id: UserId,
    requested: VoteType,
) -> Result<VoteResponse> {
    if doc.post(post_id).is_none() {
        return Err(StoreError::NotFound("post"));
    }

    let existing = doc
        .votes
        .iter()
        .position(|v| v.post_id == post_id && v.user_id == user_id);
    let current = existing.map(|i| doc.votes[i].kind);
    let (next, change) = transition(current, requested);

    match (existing, next) {
        (Some(i), None) => {
            doc.votes.remove(i);
        }
        (Some(i), Some(kind)) => doc.votes[i].kind = kind,
        (None, Some(kind)) => doc.votes.push(Vote {
            post_id,
            user_id,
            kind,
        }),
        (None, None) => {}
    }

    let post = doc
        .post_mut(post_id)
        .ok_or(StoreError::NotFound("post"))?;
    post.likes = shift(post.likes, change.likes);
    post.dislikes = shift(post.dislikes, change.dislikes);

    Ok(VoteResponse {
        post: post.clone(),
        user_vote: next,
    })
}

impl Store {
    pub fn vote(
        &self,
        post_id: PostId,
        user_id: UserId,
        requested: VoteType,
    ) -> Result<VoteResponse> {
        self.with_doc_mut(|doc| cast(doc, post_id, user_id, requested))
    }

    pub fn has_voted(&self, post_id: PostId, user_id: UserId) -> Result<HasVotedResponse> {
        self.with_doc(|doc| {
            let kind = doc.vote(post_id, user_id).map(|v| v.kind);
            Ok(HasVotedResponse {
                has_voted: kind.is_some(),
                kind,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearvote_types::models::{MediaType, Post};

    fn doc_with_post(id: PostId, likes: u32, dislikes: u32) -> Document {
        Document {
            posts: vec![Post {
                id,
                user_id: 2,
                image_url: "/uploads/p.jpg".into(),
                media_type: MediaType::Image,
                description: String::new(),
                category: "Other".into(),
                location: String::new(),
                timestamp: 0,
                likes,
                dislikes,
                height: None,
                weight: None,
            }],
            ..Document::default()
        }
    }

    #[test]
    fn transition_table() {
        use VoteType::{Dislike, Like};

        assert_eq!(transition(None, Like), (Some(Like), delta(1, 0)));
        assert_eq!(transition(None, Dislike), (Some(Dislike), delta(0, 1)));
        assert_eq!(transition(Some(Like), Like), (None, delta(-1, 0)));
        assert_eq!(transition(Some(Like), Dislike), (Some(Dislike), delta(-1, 1)));
        assert_eq!(transition(Some(Dislike), Dislike), (None, delta(0, -1)));
        assert_eq!(transition(Some(Dislike), Like), (Some(Like), delta(1, -1)));
    }

    #[test]
    fn like_twice_toggles_off() {
        let mut doc = doc_with_post(5, 7, 2);

        let first = cast(&mut doc, 5, 1, VoteType::Like).unwrap();
        assert_eq!((first.post.likes, first.post.dislikes), (8, 2));
        assert_eq!(first.user_vote, Some(VoteType::Like));

        let second = cast(&mut doc, 5, 1, VoteType::Like).unwrap();
        assert_eq!((second.post.likes, second.post.dislikes), (7, 2));
        assert_eq!(second.user_vote, None);
        assert!(doc.vote(5, 1).is_none());
    }

    #[test]
    fn switching_moves_the_count() {
        let mut doc = doc_with_post(1, 0, 0);

        cast(&mut doc, 1, 1, VoteType::Like).unwrap();
        let switched = cast(&mut doc, 1, 1, VoteType::Dislike).unwrap();
        assert_eq!((switched.post.likes, switched.post.dislikes), (0, 1));
        assert_eq!(doc.votes.len(), 1);
        assert_eq!(doc.vote(1, 1).unwrap().kind, VoteType::Dislike);
    }

    #[test]
    fn counters_match_vote_rows_after_any_sequence() {
        let mut doc = doc_with_post(1, 0, 0);
        let script: &[(UserId, VoteType)] = &[
            (1, VoteType::Like),
            (2, VoteType::Dislike),
            (3, VoteType::Like),
            (1, VoteType::Dislike),
            (2, VoteType::Dislike),
            (3, VoteType::Like),
            (4, VoteType::Like),
            (1, VoteType::Like),
            (2, VoteType::Like),
        ];

        for &(user, kind) in script {
            cast(&mut doc, 1, user, kind).unwrap();

            let post = doc.post(1).unwrap();
            let likes = doc.votes.iter().filter(|v| v.kind == VoteType::Like).count();
            let dislikes = doc.votes.iter().filter(|v| v.kind == VoteType::Dislike).count();
            assert_eq!(post.likes as usize, likes);
            assert_eq!(post.dislikes as usize, dislikes);

            let mut pairs: Vec<_> = doc.votes.iter().map(|v| (v.post_id, v.user_id)).collect();
            pairs.sort();
            pairs.dedup();
            assert_eq!(pairs.len(), doc.votes.len());
        }
    }

    #[test]
    fn counters_clamp_at_zero() {
        let mut doc = doc_with_post(1, 0, 0);
        doc.votes.push(Vote {
            post_id: 1,
            user_id: 1,
            kind: VoteType::Like,
        });

        let out = cast(&mut doc, 1, 1, VoteType::Like).unwrap();
        assert_eq!(out.post.likes, 0);
        assert_eq!(out.user_vote, None);
    }

    #[test]
    fn unknown_post_is_rejected() {
        let mut doc = doc_with_post(1, 0, 0);
        let err = cast(&mut doc, 42, 1, VoteType::Like).unwrap_err();
        assert!(matches!(err, StoreError::NotFound("post")));
        assert!(doc.votes.is_empty());
    }

    #[test]
    fn has_voted_reports_current_state() {
        let store = Store::in_memory(doc_with_post(3, 0, 0));
        assert!(!store.has_voted(3, 1).unwrap().has_voted);

        store.vote(3, 1, VoteType::Dislike).unwrap();
        let state = store.has_voted(3, 1).unwrap();
        assert!(state.has_voted);
        assert_eq!(state.kind, Some(VoteType::Dislike));
    }
}
