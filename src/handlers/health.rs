use axum::Json;
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Instant;

use crate::models::catalog::CLASS_COUNT;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime: f64,
    pub classes: usize,
}

static START_TIME: OnceLock<Instant> = OnceLock::new();

pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

pub async fn health_check() -> Json<HealthResponse> {
    let uptime = START_TIME
        .get()
        .map(|s| s.elapsed().as_secs_f64())
        .unwrap_or(0.0);

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime,
        classes: CLASS_COUNT,
    })
}

pub async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "api_version": "v1",
        "build": env!("CARGO_PKG_VERSION")
    }))
}
