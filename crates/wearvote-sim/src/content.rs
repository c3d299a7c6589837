//! Synthetic posts and comments.

use rand::Rng;

use wearvote_db::Document;
use wearvote_db::lifecycle::is_active;
use wearvote_types::models::{MediaType, Millis, Post, UserId};

use crate::pools;

const VIDEO_PROBABILITY: f64 = 0.2;
const MEASUREMENTS_PROBABILITY: f64 = 0.8;
const NEW_POST_COMMENT_WINDOW_MS: Millis = 10 * 60 * 1000;
const SEED_COMMENT_WINDOW_MS: Millis = 30 * 60 * 1000;
const SEED_COMMENT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratedPosts {
    pub posts: usize,
    pub comments: usize,
}

/// Insert `count` posts by random existing users, each with up to three
/// comments. Does nothing when there are no users.
pub fn generate_posts<R: Rng + ?Sized>(
    doc: &mut Document,
    rng: &mut R,
    count: usize,
    now: Millis,
) -> GeneratedPosts {
    let authors: Vec<UserId> = doc.users.iter().map(|u| u.id).collect();
    let mut report = GeneratedPosts::default();
    if authors.is_empty() {
        return report;
    }

    let mut has_video = false;
    for i in 0..count {
        let force_video = count >= 2 && i == count - 1 && !has_video;
        let media_type = if force_video || rng.random_bool(VIDEO_PROBABILITY) {
            MediaType::Video
        } else {
            MediaType::Image
        };
        has_video |= media_type == MediaType::Video;

        let pool = match media_type {
            MediaType::Image => pools::IMAGES,
            MediaType::Video => pools::VIDEOS,
        };
        let (height, weight) = if rng.random_bool(MEASUREMENTS_PROBABILITY) {
            (
                Some(rng.random_range(150..=200)),
                Some(rng.random_range(45..=100)),
            )
        } else {
            (None, None)
        };

        let post = Post {
            id: doc.next_post_id(),
            user_id: pick(rng, &authors),
            image_url: pick(rng, pool).to_string(),
            media_type,
            description: pick(rng, pools::DESCRIPTIONS).to_string(),
            category: pick(rng, pools::CATEGORIES).to_string(),
            location: pick(rng, pools::LOCATIONS).to_string(),
            timestamp: now,
            likes: rng.random_range(0..20),
            dislikes: rng.random_range(0..5),
            height,
            weight,
        };
        let post_id = post.id;
        doc.posts.push(post);
        report.posts += 1;

        for _ in 0..rng.random_range(0..=3) {
            let at = now - rng.random_range(0..NEW_POST_COMMENT_WINDOW_MS);
            doc.push_comment(post_id, pick(rng, &authors), pick(rng, pools::COMMENTS), at);
            report.comments += 1;
        }
    }

    report
}

/// Top up every active post that has fewer than three comments with one to
/// three more from the last half hour. Returns the number added.
pub fn seed_comments<R: Rng + ?Sized>(doc: &mut Document, rng: &mut R, now: Millis) -> usize {
    let authors: Vec<UserId> = doc.users.iter().map(|u| u.id).collect();
    if authors.is_empty() {
        return 0;
    }

    let thin: Vec<_> = doc
        .posts
        .iter()
        .filter(|p| is_active(p, now) && doc.comment_count(p.id) < SEED_COMMENT_THRESHOLD)
        .map(|p| p.id)
        .collect();

    let mut added = 0;
    for post_id in thin {
        for _ in 0..rng.random_range(1..=3) {
            let at = now - rng.random_range(0..SEED_COMMENT_WINDOW_MS);
            doc.push_comment(post_id, pick(rng, &authors), pick(rng, pools::COMMENTS), at);
            added += 1;
        }
    }
    added
}

/// Callers guarantee `items` is non-empty.
fn pick<R: Rng + ?Sized, T: Copy>(rng: &mut R, items: &[T]) -> T {
    items[rng.random_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use wearvote_db::lifecycle::ONE_HOUR_MS;
    use wearvote_types::models::User;

    const NOW: Millis = 1_700_000_000_000;

    fn doc_with_users(n: u64) -> Document {
        Document {
            users: (1..=n)
                .map(|id| User {
                    id,
                    name: format!("user {id}"),
                    avatar: String::new(),
                    bio: String::new(),
                    followers: 0,
                })
                .collect(),
            ..Document::default()
        }
    }

    #[test]
    fn generated_posts_are_fresh_and_within_ranges() {
        let mut doc = doc_with_users(4);
        let mut rng = StdRng::seed_from_u64(7);

        let report = generate_posts(&mut doc, &mut rng, 25, NOW);

        assert_eq!(report.posts, 25);
        assert_eq!(doc.posts.len(), 25);
        assert_eq!(doc.comments.len(), report.comments);
        for post in &doc.posts {
            assert_eq!(post.timestamp, NOW);
            assert!(post.likes < 20);
            assert!(post.dislikes < 5);
            assert!(doc.user(post.user_id).is_some());
            assert_eq!(post.height.is_some(), post.weight.is_some());
            if let (Some(h), Some(w)) = (post.height, post.weight) {
                assert!((150..=200).contains(&h));
                assert!((45..=100).contains(&w));
            }
            assert!(doc.comment_count(post.id) <= 3);
        }
        for comment in &doc.comments {
            assert!(comment.timestamp <= NOW && comment.timestamp > NOW - NEW_POST_COMMENT_WINDOW_MS);
        }
    }

    #[test]
    fn ids_are_unique_across_a_batch() {
        let mut doc = doc_with_users(3);
        let mut rng = StdRng::seed_from_u64(11);
        generate_posts(&mut doc, &mut rng, 10, NOW);

        let mut post_ids: Vec<_> = doc.posts.iter().map(|p| p.id).collect();
        post_ids.sort_unstable();
        post_ids.dedup();
        assert_eq!(post_ids.len(), 10);

        let mut comment_ids: Vec<_> = doc.comments.iter().map(|c| c.id).collect();
        let total = comment_ids.len();
        comment_ids.sort_unstable();
        comment_ids.dedup();
        assert_eq!(comment_ids.len(), total);
    }

    #[test]
    fn every_multi_post_batch_has_a_video() {
        for seed in 0..50 {
            let mut doc = doc_with_users(2);
            let mut rng = StdRng::seed_from_u64(seed);
            generate_posts(&mut doc, &mut rng, 2, NOW);
            assert!(
                doc.posts.iter().any(|p| p.media_type == MediaType::Video),
                "seed {seed} produced no video"
            );
        }
    }

    #[test]
    fn media_url_matches_media_type() {
        let mut doc = doc_with_users(2);
        let mut rng = StdRng::seed_from_u64(3);
        generate_posts(&mut doc, &mut rng, 30, NOW);

        for post in &doc.posts {
            let pool = match post.media_type {
                MediaType::Image => pools::IMAGES,
                MediaType::Video => pools::VIDEOS,
            };
            assert!(pool.contains(&post.image_url.as_str()));
        }
    }

    #[test]
    fn no_users_is_a_no_op() {
        let mut doc = Document::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_posts(&mut doc, &mut rng, 4, NOW), GeneratedPosts::default());
        assert!(doc.posts.is_empty());
        assert_eq!(seed_comments(&mut doc, &mut rng, NOW), 0);
    }

    #[test]
    fn seeding_only_touches_thin_active_posts() {
        let mut doc = doc_with_users(3);
        let mut rng = StdRng::seed_from_u64(5);
        for (id, age) in [(1, 0), (2, ONE_HOUR_MS + 1), (3, 10)] {
            doc.posts.push(Post {
                id,
                user_id: 1,
                timestamp: NOW - age,
                ..Post::default()
            });
        }
        for _ in 0..3 {
            doc.push_comment(3, 2, "busy", NOW);
        }

        let added = seed_comments(&mut doc, &mut rng, NOW);

        assert!((1..=3).contains(&doc.comment_count(1)));
        assert_eq!(doc.comment_count(2), 0);
        assert_eq!(doc.comment_count(3), 3);
        assert_eq!(added, doc.comment_count(1));
        for c in doc.comments.iter().filter(|c| c.post_id == 1) {
            assert!(c.timestamp > NOW - SEED_COMMENT_WINDOW_MS);
        }
    }
}
