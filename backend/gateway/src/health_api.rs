//! Gateway Health API

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

pub const SERVICES: [&str; 3] = ["spectral", "fusion", "routing"];

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub services: [&'static str; 3],
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let now = Utc::now();
    Json(HealthReport {
        status: "healthy",
        services: SERVICES,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (now - state.started_at).num_seconds().max(0),
        timestamp: now,
    })
}
