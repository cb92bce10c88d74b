use std::time::Duration;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, SET_COOKIE},
    HeaderName, HeaderValue, Method,
};
use tower_http::cors::CorsLayer;
use tracing::warn;

/// CORS for the browser frontend: explicit origins, cookies allowed.
///
/// Origins that are not valid header values are dropped with a warning.
pub fn credentialed_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            ACCEPT,
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([SET_COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
