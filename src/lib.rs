//! Aurum - gold trading-signal server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod state;
pub mod types;

pub use error::{AppError, Result};
pub use state::AppState;
