//! Request handlers
//!
//! Entity handlers are thin pass-throughs: documents come back exactly as
//! stored.

pub mod account;
pub mod auth;
pub mod catalog;
pub mod entities;
pub mod health;
pub mod media;

use axum::Json;
use serde::Deserialize;
use shared::database::Filter;
use shared::types::Document;

use crate::utils::{ApiError, ApiResult};
use crate::AppState;

/// `?userId=` selector shared by the per-user routes.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn require(self) -> ApiResult<String> {
        self.user_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))
    }
}

/// First document of `collection` whose `field` equals `value`, else 404.
pub(crate) async fn find_one_by(
    state: &AppState,
    collection: &str,
    field: &str,
    value: String,
) -> ApiResult<Json<Document>> {
    state
        .documents
        .find_one(collection, &Filter::eq(field, value))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub(crate) async fn find_all(
    state: &AppState,
    collection: &str,
    filter: Filter,
) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.documents.find(collection, &filter).await?))
}
