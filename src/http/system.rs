//! Liveness and service information.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::http::response::ApiError;
use crate::http::server::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    Json(json!({
        "status": "healthy",
        "message": "Study abroad API is running",
        "timestamp": timestamp,
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Visa Requirements & University Rankings API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "visa": "/api/visa/{visaType}/{country}",
            "visa_types": "/api/visa/types",
            "visa_countries": "/api/visa/{visaType}/countries",
            "university_countries": "/api/university/countries",
            "university_country": "/api/university/country/{countryName}",
            "university_search": "/api/university/search",
            "university_top": "/api/university/top",
            "university_regions": "/api/university/regions",
        },
        "example": "/api/visa/tourist/united_states",
    }))
}

/// JSON 405 for a known path requested with an unrouted method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// JSON 404 for unmatched paths.
pub async fn fallback() -> (StatusCode, Json<Value>) {
    let error = ApiError::not_found("Not found");
    (error.status(), Json(error.body()))
}
