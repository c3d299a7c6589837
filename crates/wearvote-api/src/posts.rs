use std::ffi::OsStr;
use std::path::Path;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use rand::Rng;
use tracing::{info, warn};

use wearvote_db::NewPost;
use wearvote_db::lifecycle::now_millis;
use wearvote_types::models::{MediaType, Post, UserId};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_CATEGORY: &str = "Other";

/// Multipart names accepted for the media file.
const FILE_FIELDS: &[&str] = &["file", "image", "media"];

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

#[derive(Default)]
struct PostForm {
    upload: Option<Upload>,
    user_id: Option<String>,
    description: Option<String>,
    category: Option<String>,
    location: Option<String>,
    media_type: Option<String>,
    height: Option<String>,
    weight: Option<String>,
}

/// POST /api/posts: multipart upload. The file lands in the uploads dir as
/// `<epoch ms>-<random><ext>` and the post points at `/uploads/<name>`.
pub async fn create_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if FILE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await?;
            form.upload = Some(Upload {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field.text().await?;
        let slot = match name.as_str() {
            "userId" => &mut form.user_id,
            "description" => &mut form.description,
            "category" => &mut form.category,
            "location" => &mut form.location,
            "mediaType" => &mut form.media_type,
            "height" => &mut form.height,
            "weight" => &mut form.weight,
            _ => continue,
        };
        *slot = Some(value);
    }

    let (Some(upload), Some(user_id)) = (form.upload.take(), form.user_id.as_deref()) else {
        return Err(ApiError::InvalidInput("missing media file or userId".into()));
    };
    if upload.bytes.is_empty() {
        return Err(ApiError::InvalidInput("uploaded file is empty".into()));
    }

    let user_id: UserId = parse_number("userId", user_id)?
        .ok_or_else(|| ApiError::InvalidInput("missing media file or userId".into()))?;
    let media_type = match form.media_type.as_deref().map(str::trim) {
        Some(kind) if !kind.is_empty() => kind
            .parse::<MediaType>()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
        _ if upload
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("video/")) =>
        {
            MediaType::Video
        }
        _ => MediaType::Image,
    };
    let height = form
        .height
        .as_deref()
        .map(|v| parse_number("height", v))
        .transpose()?
        .flatten();
    let weight = form
        .weight
        .as_deref()
        .map(|v| parse_number("weight", v))
        .transpose()?
        .flatten();

    let now = now_millis();
    let stored_name = format!(
        "{}-{}{}",
        now,
        rand::rng().random_range(0..1_000_000_000u32),
        extension_of(upload.file_name.as_deref())
    );

    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create uploads directory: {e}")))?;
    let file_path = state.uploads_dir.join(&stored_name);
    tokio::fs::write(&file_path, &upload.bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to write {}: {e}", file_path.display())))?;

    let new_post = NewPost {
        user_id,
        image_url: format!("/uploads/{stored_name}"),
        media_type,
        description: form.description.unwrap_or_default(),
        category: form
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        location: form.location.unwrap_or_default(),
        height,
        weight,
    };

    match state
        .blocking(move |store| store.create_post(new_post, now))
        .await
    {
        Ok(post) => {
            info!("User {} created post {} ({} bytes)", post.user_id, post.id, upload.bytes.len());
            Ok((StatusCode::CREATED, Json(post)))
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&file_path).await {
                warn!("Failed to remove orphaned upload {}: {}", file_path.display(), rm);
            }
            Err(e)
        }
    }
}

/// Empty means absent; anything else must parse.
fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<Option<T>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ApiError::InvalidInput(format!("{field} must be a whole number")))
}

/// `.ext` from the client file name, lowercased; empty when there is none
/// or it is not plain alphanumeric.
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(extension_of(Some("look.JPG")), ".jpg");
        assert_eq!(extension_of(Some("clip.final.mp4")), ".mp4");
        assert_eq!(extension_of(Some("noext")), "");
        assert_eq!(extension_of(Some("weird.p%g")), "");
        assert_eq!(extension_of(None), "");
    }

    #[test]
    fn numbers_are_optional_but_strict() {
        assert_eq!(parse_number::<u32>("height", " 172 ").unwrap(), Some(172));
        assert_eq!(parse_number::<u32>("height", "").unwrap(), None);
        assert!(parse_number::<u32>("height", "tall").is_err());
    }
}
