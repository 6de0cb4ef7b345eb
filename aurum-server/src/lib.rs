//! AurumLedger Server - 餐厅营业额 / 支出记账服务
//!
//! # 架构概述
//!
//! 单店单账号的记账后端, JSON REST 接口 + 本地 SQLite:
//!
//! - **账务** (`api::orders`, `api::expenses`): 营业单与支出的增删改查
//! - **报表** (`reports`, `period`): 日 / 月 / 年 KPI、每日营收、支出分类
//! - **认证** (`auth`): auth.json 凭证 + JWT, 营收二次验证
//! - **导出与备份** (`api::export`, `api::backup`): CSV 与 ZIP
//!
//! # 模块结构
//!
//! ```text
//! aurum-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 凭证存储、JWT、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、迁移、启动维护、仓储
//! ├── services/      # 路由装配
//! ├── utils/         # 校验、日期、CSV、日志
//! ├── money.rs       # 金额运算 (Decimal)
//! ├── period.rs      # 期间计算
//! └── reports.rs     # KPI 聚合
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod money;
pub mod period;
pub mod reports;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CredentialStore, CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerError, ServerState};
pub use services::build_router;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger;

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 `.env` 并初始化日志
///
/// 日志先于配置初始化, 以便配置解析中的警告可见。
pub fn setup_environment() {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env: {e}");
    }

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    init_logger(&level, log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ___                              __             __
   /   | __  ___________  ______ ___/ /   ___  ____/ /___ ____  _____
  / /| |/ / / / ___/ __ \/ __ `__ \/ /   / _ \/ __  / __ `/ _ \/ ___/
 / ___ / /_/ / /  / /_/ / / / / / / /___/  __/ /_/ / /_/ /  __/ /
/_/  |_\__,_/_/   \__,_/_/ /_/ /_/_____/\___/\__,_/\__, /\___/_/
                                                  /____/
    "#
    );
}
