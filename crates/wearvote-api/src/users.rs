use axum::{Json, extract::State};

use wearvote_db::lifecycle::now_millis;
use wearvote_types::api::{ProfileQuery, SearchQuery, UserProfile};
use wearvote_types::models::{User, UserId};

use crate::error::{ApiError, ApiPath, ApiQuery};
use crate::state::AppState;

pub async fn search_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let q = query.q.unwrap_or_default();
    let users = state.blocking(move |store| store.search_users(&q)).await?;
    Ok(Json(users))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.blocking(|store| store.list_users()).await?;
    Ok(Json(users))
}

pub async fn get_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<ProfileQuery>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .blocking(move |store| store.user_profile(user_id, query.requester_id, now_millis()))
        .await?;
    Ok(Json(profile))
}
