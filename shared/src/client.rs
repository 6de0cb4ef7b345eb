//! Client-related types shared between server and client
//!
//! Request/response types used in API communication that are not
//! ledger rows themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub code: String,
    pub password: String,
}

/// Bearer token issued by login or revenue unlock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// First-run account creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    pub code: String,
    pub password: String,
}

/// Account maintenance request
///
/// Optional fields that are missing or blank keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdateRequest {
    pub current_password: String,
    pub new_code: Option<String>,
    pub new_password: Option<String>,
    pub new_kpi_pin: Option<String>,
}

/// Account code after setup or update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub code: String,
}

/// Revenue second verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueUnlockRequest {
    /// KPI pin when one is configured, otherwise the account password
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub initialized: bool,
}

/// Current user response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub code: String,
    pub revenue_unlocked: bool,
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// Backup API DTOs
// =============================================================================

/// Outcome of a restore upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreReport {
    pub restored: Vec<String>,
    pub skipped: Vec<String>,
    /// True when a database file was staged for the next startup
    pub restart_required: bool,
}

// =============================================================================
// Health API DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub status: String,
    pub version: String,
    pub db: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub health: String,
}
