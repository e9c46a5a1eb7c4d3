use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::visa::CacheStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub visa_cache: CacheStats,
}

#[derive(Serialize)]
pub struct CacheCleared {
    pub cleared: usize,
    pub visa_cache: CacheStats,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        visa_cache: state.visa.cache_stats(),
    })
}

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.visa.cache_stats())
}

pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheCleared> {
    let cleared = state.visa.cache_stats().cache_size;
    state.visa.clear_cache();
    Json(CacheCleared {
        cleared,
        visa_cache: state.visa.cache_stats(),
    })
}
