use axum::{Json, extract::State};

use wearvote_db::lifecycle::now_millis;
use wearvote_types::api::{FeedPost, FeedQuery, RankedPost};

use crate::error::{ApiError, ApiQuery};
use crate::state::AppState;

/// GET /api/feed: active posts, newest first.
pub async fn feed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> Result<Json<Vec<FeedPost>>, ApiError> {
    let posts = state
        .blocking(move |store| store.feed(&query, now_millis()))
        .await?;
    Ok(Json(posts))
}

/// GET /api/hall-of-fame
pub async fn hall_of_fame(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedPost>>, ApiError> {
    let posts = state
        .blocking(|store| store.hall_of_fame(now_millis()))
        .await?;
    Ok(Json(posts))
}
