//! Unfiltered collection scans backing the browse pages.

use axum::{extract::State, Json};
use serde::Serialize;
use shared::database::Filter;
use shared::types::Document;

use super::find_all;
use crate::utils::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ExploreResponse {
    pub projects: Vec<Document>,
    pub products: Vec<Document>,
    pub posts: Vec<Document>,
    pub jobs: Vec<Document>,
    pub companies: Vec<Document>,
}

/// GET /api/explore
pub async fn explore(State(state): State<AppState>) -> ApiResult<Json<ExploreResponse>> {
    let all = Filter::all();
    let store = &state.documents;
    let (projects, products, posts, jobs, companies) = tokio::try_join!(
        store.find("projects", &all),
        store.find("products", &all),
        store.find("posts", &all),
        store.find("jobs", &all),
        store.find("companies", &all),
    )?;

    Ok(Json(ExploreResponse {
        projects,
        products,
        posts,
        jobs,
        companies,
    }))
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "projects", Filter::all()).await
}

pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "jobs", Filter::all()).await
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "products", Filter::all()).await
}

pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "posts", Filter::all()).await
}

pub async fn list_investors(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "investor_profiles", Filter::all()).await
}

pub async fn list_media_assets(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    find_all(&state, "media_assets", Filter::all()).await
}
