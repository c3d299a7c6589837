use axum::{Json, extract::State};

use wearvote_types::api::{Conversation, MarkMessagesReadRequest, MarkReadResponse};
use wearvote_types::models::{Message, UserId};

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::state::AppState;

/// GET /api/messages/{user_id}/{other_id}: oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    ApiPath((user_id, other_id)): ApiPath<(UserId, UserId)>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state
        .blocking(move |store| store.conversation(user_id, other_id))
        .await?;
    Ok(Json(messages))
}

pub async fn get_conversations(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations = state
        .blocking(move |store| store.conversations(user_id))
        .await?;
    Ok(Json(conversations))
}

/// Marks everything `other_id` sent to `user_id` as read.
pub async fn mark_read(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MarkMessagesReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = state
        .blocking(move |store| store.mark_messages_read(req.user_id, req.other_id))
        .await?;
    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}
