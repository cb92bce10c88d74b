//! Single-document lookups addressed by path parameter.

use axum::{
    extract::{Path, State},
    Json,
};
use shared::types::Document;

use super::find_one_by;
use crate::utils::ApiResult;
use crate::AppState;

pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "companies", "id", id).await
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "users", "id", id).await
}

pub async fn get_pitch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "pitch_pages", "id", id).await
}

pub async fn get_deal_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "deal_rooms", "id", id).await
}

pub async fn get_company_verification(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "company_verifications", "companyId", company_id).await
}

pub async fn get_job_compliance(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "job_compliance", "jobId", job_id).await
}

/// Moderation records are keyed by the moderated content's id.
pub async fn get_content_moderation(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "content_moderation", "contentId", content_id).await
}
