pub mod auth;
pub mod bridge;
pub mod control;
pub mod health;
pub mod signals;

use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json, Router,
};

/// JSON body whose rejection is turned into an `AppError` by the handler.
pub type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Query string whose rejection is turned into an `AppError` by the handler.
pub type QueryParams<T> = std::result::Result<Query<T>, QueryRejection>;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(control::router())
        .merge(signals::router())
        .merge(bridge::router())
}
