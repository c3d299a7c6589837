//! REST surface: every handler sits under `/api` and talks to the store
//! through `spawn_blocking`.

pub mod comments;
pub mod error;
pub mod feed;
pub mod follows;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod state;
pub mod users;
pub mod votes;

use axum::{
    Router,
    routing::{get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/feed", get(feed::feed))
        .route("/api/hall-of-fame", get(feed::hall_of_fame))
        .route("/api/users", get(users::list_users))
        .route("/api/users/search", get(users::search_users))
        .route("/api/users/{user_id}", get(users::get_profile))
        .route("/api/posts", post(posts::create_post))
        .route(
            "/api/posts/{post_id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route("/api/vote", post(votes::vote))
        .route("/api/hasVoted", post(votes::has_voted))
        .route("/api/follow", post(follows::toggle_follow))
        .route("/api/messages/mark-read", post(messages::mark_read))
        .route("/api/messages/{user_id}/{other_id}", get(messages::get_history))
        .route("/api/conversations/{user_id}", get(messages::get_conversations))
        .route("/api/notifications/mark-read", post(notifications::mark_read))
        .route("/api/notifications/{user_id}", get(notifications::get_notifications))
        .with_state(state)
}
