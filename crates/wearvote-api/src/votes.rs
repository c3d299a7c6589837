use axum::{Json, extract::State};

use wearvote_types::api::{HasVotedRequest, HasVotedResponse, VoteRequest, VoteResponse};
use wearvote_types::models::VoteType;

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// POST /api/vote: like/dislike toggle.
pub async fn vote(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let kind = req
        .kind
        .parse::<VoteType>()
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let (post_id, user_id) = (req.post_id, req.user_id);
    let resp = state
        .blocking(move |store| store.vote(post_id, user_id, kind))
        .await?;
    Ok(Json(resp))
}

pub async fn has_voted(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<HasVotedRequest>,
) -> Result<Json<HasVotedResponse>, ApiError> {
    let resp = state
        .blocking(move |store| store.has_voted(req.post_id, req.user_id))
        .await?;
    Ok(Json(resp))
}
