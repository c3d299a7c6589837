use axum::{Json, extract::State};

use wearvote_types::api::{MarkNotificationsReadRequest, MarkReadResponse, NotificationView};
use wearvote_types::models::UserId;

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::state::AppState;

pub async fn get_notifications(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let notifications = state
        .blocking(move |store| store.notifications(user_id))
        .await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MarkNotificationsReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let updated = state
        .blocking(move |store| store.mark_notifications_read(req.user_id))
        .await?;
    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}
