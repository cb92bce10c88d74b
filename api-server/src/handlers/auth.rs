//! Cookie session lookup
//!
//! Login is by email only. The `uid` cookie carries the user id as-is; there
//! is no signing and no server-side session.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use shared::database::Filter;
use shared::types::Document;
use tracing::{debug, info};

use crate::utils::{ApiError, ApiResult};
use crate::AppState;

pub const SESSION_COOKIE: &str = "uid";
const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<(CookieJar, Json<Document>)> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let user = state
        .documents
        .find_one("users", &Filter::eq("email", request.email.as_str()))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let user_id = user.get_str("id").unwrap_or_default().to_string();
    info!(user_id = %user_id, "User logged in");

    let cookie = Cookie::build((SESSION_COOKIE, user_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_TTL_DAYS));

    Ok((jar.add(cookie), Json(user)))
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Json<Document>> {
    let user_id = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    debug!(user_id = %user_id, "Resolving session");
    state
        .documents
        .find_one("users", &Filter::eq("id", user_id))
        .await?
        .map(Json)
        .ok_or(ApiError::Unauthorized)
}
