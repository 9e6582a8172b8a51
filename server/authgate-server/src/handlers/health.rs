use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::server::AuthgateServer;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: u64,
    pub checks: HashMap<String, String>,
}

/// Health check handler
///
/// Always answers 200; a failing database shows up as `degraded`.
pub async fn health_check(State(server): State<AuthgateServer>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();

    let database = match &server.db_pool {
        Some(pool) => {
            if auth_identity::postgres::is_healthy(pool).await {
                "up"
            } else {
                "down"
            }
        }
        None => "memory",
    };
    checks.insert("database".to_string(), database.to_string());

    let status = if database == "down" { "degraded" } else { "healthy" };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_secs(),
        checks,
    })
}
