//! `/health` and `/version` endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub version: String,
    pub ok: bool,
}

/// Report the configured version. Requires no secret and never forwards.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        version: state.config.version.clone(),
        ok: true,
    })
}
