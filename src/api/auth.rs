//! Operator login.
//!
//! A single configured credential pair; there are no sessions or tokens.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::JsonBody;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    body: JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = body?;
    if request.username == state.config.login_username
        && request.password == state.config.login_password
    {
        info!("Operator '{}' logged in", request.username);
        Ok(Json(LoginResponse { ok: true }))
    } else {
        warn!("Rejected login for '{}'", request.username);
        Err(AppError::InvalidCredentials)
    }
}
