use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::auth::{CredentialStore, JwtService};
use crate::core::{Config, ServerError};
use crate::db::{DbService, maintenance};
use crate::utils::time;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池实现浅拷贝, 每个请求克隆一份。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | credentials | Arc<CredentialStore> | auth.json 凭证存储 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 账号凭证存储
    pub credentials: Arc<CredentialStore>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            credentials,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 应用待恢复的数据库 / 启动备份
    /// 2. 连接池 + 迁移
    /// 3. 班别字段规范化
    /// 4. JWT 与凭证服务
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        if let Some(parent) = config.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        maintenance::apply_staged_restore(&config.db_path)
            .context("Failed to apply staged database restore")?;
        if config.backup_on_start {
            maintenance::backup_on_start(&config.db_path)
                .context("Failed to back up database on startup")?;
        }

        let db = DbService::new(&config.db_path).await?;

        maintenance::normalize_shifts(&db.pool)
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let credentials = Arc::new(CredentialStore::new(config.auth_file.clone()));

        if !credentials.is_initialized().await {
            tracing::warn!(
                path = %config.auth_file.display(),
                "No account configured yet, POST /api/v1/auth/setup to create one"
            );
        }

        Ok(Self::new(config.clone(), db.pool, jwt_service, credentials))
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 业务时区的今天
    pub fn today(&self) -> NaiveDate {
        time::today_in(self.config.timezone)
    }
}
