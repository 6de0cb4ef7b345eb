//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | / | GET | 服务信息 | 无 |
//! | /health | GET | 健康检查 | 无 |
//! | /healthz | GET | 同上 (探针别名) | 无 |
//!
//! # 响应示例
//!
//! ```json
//! { "ok": true, "status": "ok", "version": "0.1.0", "db": "resto.db" }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use shared::client::{HealthResponse, ServiceInfo};

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/healthz", get(health))
}

/// GET / - 服务信息
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "aurum-ledger".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        health: "/healthz".to_string(),
    })
}

/// GET /health - 数据库可达时 `ok = true`
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let db_ok = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check query failed");
            false
        }
    };

    Json(HealthResponse {
        ok: db_ok,
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        db: state.config.db_path.display().to_string(),
    })
}
