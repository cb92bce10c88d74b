//! Per-user records selected with `?userId=`.

use axum::{
    extract::{Query, State},
    Json,
};
use shared::database::Filter;
use shared::types::Document;

use super::{find_all, find_one_by, UserQuery};
use crate::utils::ApiResult;
use crate::AppState;

pub async fn list_inbox(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "inbox_items", Filter::eq("userId", query.require()?)).await
}

pub async fn list_capacity_packs(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "capacity_packs", Filter::eq("userId", query.require()?)).await
}

pub async fn list_charges(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "charges", Filter::eq("userId", query.require()?)).await
}

pub async fn get_notification_preferences(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "notification_preferences", "userId", query.require()?).await
}

pub async fn get_usage(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "usage_meters", "userId", query.require()?).await
}

pub async fn get_quota(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "quotas", "userId", query.require()?).await
}

pub async fn get_job_slots(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Document>> {
    find_one_by(&state, "job_slots", "userId", query.require()?).await
}
