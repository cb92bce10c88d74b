use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

impl From<bool> for ServiceStatus {
    fn from(ok: bool) -> Self {
        if ok {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub database: ServiceStatus,
    pub storage: ServiceStatus,
}

/// GET /health
///
/// 200 when both the document store and the bucket answer, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, storage) =
        tokio::join!(state.documents.health_check(), state.storage.health_check());

    let status = ServiceStatus::from(database && storage);
    let code = if status == ServiceStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        services: ServiceHealth {
            database: database.into(),
            storage: storage.into(),
        },
    };

    (code, Json(response))
}
