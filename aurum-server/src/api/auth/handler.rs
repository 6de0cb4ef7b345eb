//! Authentication Handlers
//!
//! Account setup, login, revenue unlock and account maintenance

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::StatusCode};

use crate::auth::{AccountChange, CurrentUser, IssuedToken};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::{MAX_CODE_LEN, MAX_PASSWORD_LEN};
use crate::utils::{AppError, AppResult};
use shared::client::{
    AccountResponse, AccountUpdateRequest, AuthStatus, LoginRequest, MeResponse,
    RevenueUnlockRequest, SetupRequest, TokenResponse,
};

/// Fixed delay before answering a failed credential check
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn check_len(value: &str, field: &str, max: usize) -> AppResult<()> {
    if value.trim().chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

fn token_response(issued: IssuedToken) -> TokenResponse {
    TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
    }
}

async fn reject_credentials() -> AppError {
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;
    AppError::invalid_credentials()
}

/// GET /api/v1/auth/status - 是否已设置账号
pub async fn status(State(state): State<ServerState>) -> Json<AuthStatus> {
    Json(AuthStatus {
        initialized: state.credentials.is_initialized().await,
    })
}

/// POST /api/v1/auth/setup - 首次设置账号
pub async fn setup(
    State(state): State<ServerState>,
    payload: Result<Json<SetupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let Json(req) = payload?;
    check_len(&req.code, "code", MAX_CODE_LEN)?;
    check_len(&req.password, "password", MAX_PASSWORD_LEN)?;

    let code = state.credentials.setup(&req.code, &req.password).await?;
    security_log!("INFO", "account_setup", code = code.clone());
    Ok((StatusCode::CREATED, Json(AccountResponse { code })))
}

/// POST /api/v1/auth/login - 登录
///
/// 账号不存在与密码错误返回同一错误
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    let code = req.code.trim().to_string();

    if !state.credentials.verify(&code, &req.password).await {
        tracing::warn!(code = %code, "Login failed - invalid credentials");
        return Err(reject_credentials().await);
    }

    let issued = state
        .get_jwt_service()
        .generate_access_token(&code)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(code = %code, "User logged in");
    Ok(Json(token_response(issued)))
}

/// GET /api/v1/auth/me - 当前令牌信息
pub async fn me(user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        code: user.code,
        revenue_unlocked: user.revenue_unlocked,
        expires_at: user.expires_at,
    })
}

/// POST /api/v1/auth/revenue-unlock - 营收二次验证
///
/// 校验 KPI PIN (未设置时为账号密码), 签发带 `rev` 的短期令牌
pub async fn revenue_unlock(
    State(state): State<ServerState>,
    user: CurrentUser,
    payload: Result<Json<RevenueUnlockRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(req) = payload?;
    if !state.credentials.verify_revenue_secret(&req.secret).await {
        security_log!("WARN", "revenue_unlock_failed", code = user.code.clone());
        return Err(reject_credentials().await);
    }

    let issued = state
        .get_jwt_service()
        .generate_revenue_token(&user.code)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    security_log!("INFO", "revenue_unlocked", code = user.code.clone());
    Ok(Json(token_response(issued)))
}

/// PUT /api/v1/auth/account - 修改账号代码 / 密码 / KPI PIN
pub async fn update_account(
    State(state): State<ServerState>,
    user: CurrentUser,
    payload: Result<Json<AccountUpdateRequest>, JsonRejection>,
) -> AppResult<Json<AccountResponse>> {
    let Json(req) = payload?;
    if let Some(code) = &req.new_code {
        check_len(code, "new_code", MAX_CODE_LEN)?;
    }
    if let Some(password) = &req.new_password {
        check_len(password, "new_password", MAX_PASSWORD_LEN)?;
    }
    if let Some(pin) = &req.new_kpi_pin {
        check_len(pin, "new_kpi_pin", MAX_PASSWORD_LEN)?;
    }

    let code = state
        .credentials
        .change_account(AccountChange {
            current_password: req.current_password,
            new_code: req.new_code,
            new_password: req.new_password,
            new_kpi_pin: req.new_kpi_pin,
        })
        .await?;

    security_log!(
        "INFO",
        "account_updated",
        previous_code = user.code.clone(),
        code = code.clone()
    );
    Ok(Json(AccountResponse { code }))
}
