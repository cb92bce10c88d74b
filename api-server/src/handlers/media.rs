//! Media asset reads and uploads
//!
//! Asset metadata lives in the `media_assets` collection; the bytes live in
//! object storage under the asset's `key`. Reads hand out a short-lived
//! presigned URL instead of proxying content.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use shared::database::Filter;
use shared::types::{media_object_key, Document, DEFAULT_CONTENT_TYPE, DEFAULT_PRESIGN_TTL};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::utils::{ApiError, ApiResult};
use crate::AppState;

const MEDIA_ASSETS: &str = "media_assets";

/// GET /api/media/:id
///
/// Returns the stored asset with `contentUrl` and `contentUrlExpiresAt` set
/// from a fresh 15 minute grant.
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let mut asset = state
        .documents
        .find_one(MEDIA_ASSETS, &Filter::eq("id", id.as_str()))
        .await?
        .ok_or(ApiError::NotFound)?;

    let key = asset.get_str("key").unwrap_or_default().to_string();
    if key.is_empty() {
        warn!(id = %id, "Media asset has no object key, returning without content URL");
        return Ok(Json(asset));
    }

    let grant = state.storage.presign(&key, DEFAULT_PRESIGN_TTL).await?;
    asset.insert("contentUrl", grant.url);
    asset.insert("contentUrlExpiresAt", grant.expires_at.to_rfc3339());

    Ok(Json(asset))
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/media
///
/// Multipart form with a `file` part and optional `title` and `type` parts.
/// The file is stored under `media/{id}/{name}` and an asset document is
/// written for it.
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let mut upload: Option<Upload> = None;
    let mut title: Option<String> = None;
    let mut media_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        debug!(field = %name, "Processing multipart field");

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                upload = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            }
            "title" => title = Some(field.text().await?),
            "type" => media_type = Some(field.text().await?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("no file provided".to_string()))?;
    if upload.data.is_empty() {
        return Err(ApiError::BadRequest("empty file provided".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    let key = media_object_key(&id, &upload.file_name);
    let content_type = upload
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let object = state.storage.put(&key, upload.data, &content_type).await?;

    let asset = Document::new()
        .with("id", id.as_str())
        .with("type", media_type.unwrap_or_else(|| kind_of(&object.content_type).to_string()))
        .with("title", title.unwrap_or_else(|| upload.file_name.clone()))
        .with("key", object.key.as_str())
        .with("contentType", object.content_type.as_str())
        .with("size", object.size)
        .with("createdAt", Utc::now().to_rfc3339());

    state
        .documents
        .upsert(MEDIA_ASSETS, &Filter::eq("id", id.as_str()), &asset)
        .await?;

    info!(id = %id, key = %object.key, size = object.size, "Media uploaded");
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Coarse media kind from a MIME type: `image`, `video`, `audio` or `file`.
fn kind_of(content_type: &str) -> &'static str {
    match content_type.split('/').next() {
        Some("image") => "image",
        Some("video") => "video",
        Some("audio") => "audio",
        _ => "file",
    }
}
