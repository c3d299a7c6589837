use axum::{Json, extract::State};

use wearvote_db::lifecycle::now_millis;
use wearvote_types::api::{FollowRequest, FollowResponse};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// POST /api/follow: follow, or unfollow if already following.
pub async fn toggle_follow(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FollowRequest>,
) -> Result<Json<FollowResponse>, ApiError> {
    let resp = state
        .blocking(move |store| {
            store.toggle_follow(req.follower_id, req.following_id, now_millis())
        })
        .await?;
    Ok(Json(resp))
}
