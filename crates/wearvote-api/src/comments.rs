use axum::{Json, extract::State};

use wearvote_db::lifecycle::now_millis;
use wearvote_types::api::{AddCommentRequest, CommentView};
use wearvote_types::models::PostId;

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::state::AppState;

pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<PostId>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let comments = state.blocking(move |store| store.comments(post_id)).await?;
    Ok(Json(comments))
}

pub async fn add_comment(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<PostId>,
    ApiJson(req): ApiJson<AddCommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    let comment = state
        .blocking(move |store| store.add_comment(post_id, req.user_id, &req.text, now_millis()))
        .await?;
    Ok(Json(comment))
}
