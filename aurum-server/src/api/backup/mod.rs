//! Backup API: 数据库与凭证的 ZIP 备份 / 恢复
//!
//! - GET /api/v1/backup → ZIP (`aurum.db` 快照, `auth.json`)
//! - POST /api/v1/backup/restore → 接收 ZIP; 数据库在下次启动时替换

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::core::ServerState;

/// Upload limit for restore archives
const MAX_RESTORE_BYTES: usize = 512 * 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/backup", get(handler::export))
        .route(
            "/api/v1/backup/restore",
            post(handler::restore).layer(DefaultBodyLimit::max(MAX_RESTORE_BYTES)),
        )
}
