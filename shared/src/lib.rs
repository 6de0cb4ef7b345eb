//! Shared types for AurumLedger
//!
//! Common types used by the server and its API clients: error codes,
//! the unified error/response envelope, ledger models and request DTOs.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
