use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{account, auth, catalog, entities, health, media};
use crate::middleware::credentialed_cors;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let server = &config.server;

    Router::new()
        .route("/health", get(health::health_check))
        // Browse
        .route("/api/explore", get(catalog::explore))
        .route("/api/projects", get(catalog::list_projects))
        .route("/api/jobs", get(catalog::list_jobs))
        .route("/api/products", get(catalog::list_products))
        .route("/api/posts", get(catalog::list_posts))
        .route("/api/investors", get(catalog::list_investors))
        .route("/api/media-assets", get(catalog::list_media_assets))
        // Single entities
        .route("/api/companies/:id", get(entities::get_company))
        .route("/api/users/:id", get(entities::get_user))
        .route("/api/pitch/:id", get(entities::get_pitch))
        .route("/api/deal-room/:id", get(entities::get_deal_room))
        .route(
            "/api/company-verifications/:company_id",
            get(entities::get_company_verification),
        )
        .route("/api/job-compliance/:job_id", get(entities::get_job_compliance))
        .route("/api/content-moderation/:id", get(entities::get_content_moderation))
        // Per user
        .route("/api/inbox", get(account::list_inbox))
        .route("/api/capacity-packs", get(account::list_capacity_packs))
        .route("/api/charges", get(account::list_charges))
        .route(
            "/api/notification-preferences",
            get(account::get_notification_preferences),
        )
        .route("/api/usage", get(account::get_usage))
        .route("/api/quota", get(account::get_quota))
        .route("/api/job-slots", get(account::get_job_slots))
        // Media
        .route("/api/media", post(media::upload_media))
        .route("/api/media/:id", get(media::get_media))
        // Session
        .route("/api/login", post(auth::login))
        .route("/api/me", get(auth::me))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(server.request_timeout))
                .layer(DefaultBodyLimit::max(server.max_body_bytes))
                .layer(credentialed_cors(&server.cors_allowed_origins)),
        )
        .with_state(state)
}
