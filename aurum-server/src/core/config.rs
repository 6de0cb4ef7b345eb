use std::path::{Path, PathBuf};

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// 默认业务时区
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Taipei;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | RESTO_DB | resto.db | SQLite 数据库路径 (也接受 `DATABASE_URL=sqlite:///...`) |
/// | AUTH_FILE | auth.json | 账号凭证文件 |
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | PORT | 8000 | 监听端口 |
/// | JWT_SECRET | 开发环境自动生成 | HS256 密钥 (生产环境必填, ≥ 32 字符) |
/// | TOKEN_HOURS | 12 | 访问令牌有效期 (小时) |
/// | REVENUE_TOKEN_MINUTES | 60 | 营收二次验证令牌有效期 (分钟) |
/// | REVENUE_GUARD | false | 报表/导出接口是否要求二次验证 |
/// | CORS_ORIGINS | * | 允许的来源, 逗号分隔 |
/// | BUSINESS_TIMEZONE | Asia/Taipei | 计算"今天"使用的时区 |
/// | BACKUP_ON_START | true | 启动时复制数据库 |
/// | LOG_LEVEL | info | 默认日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 日志目录, 设置后按天滚动写文件 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// RESTO_DB=/data/resto.db PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 数据库文件
    pub db_path: PathBuf,
    /// 凭证文件 (auth.json)
    pub auth_file: PathBuf,
    pub http_host: String,
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 报表类接口要求 `rev` 声明
    pub revenue_guard: bool,
    /// 空列表表示允许任意来源
    pub cors_origins: Vec<String>,
    /// 业务时区
    pub timezone: Tz,
    pub backup_on_start: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 未设置或为空的键使用默认值。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let db_path = get("RESTO_DB")
            .or_else(|| get("DATABASE_URL").map(|url| sqlite_url_to_path(&url)))
            .unwrap_or_else(|| "resto.db".into());

        let timezone = match get("BUSINESS_TIMEZONE") {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!(timezone = %name, "Unknown BUSINESS_TIMEZONE, using Asia/Taipei");
                DEFAULT_TIMEZONE
            }),
            None => DEFAULT_TIMEZONE,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty() && s != "*")
                    .collect()
            })
            .unwrap_or_default();

        let jwt = JwtConfig::from_parts(
            get("JWT_SECRET"),
            parse_or(get("TOKEN_HOURS"), 12),
            parse_or(get("REVENUE_TOKEN_MINUTES"), 60),
            environment == "production",
        )
        .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            auth_file: PathBuf::from(get("AUTH_FILE").unwrap_or_else(|| "auth.json".into())),
            http_host: get("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            http_port: parse_or(get("PORT"), 8000),
            jwt,
            revenue_guard: parse_bool(get("REVENUE_GUARD"), false),
            cors_origins,
            timezone,
            backup_on_start: parse_bool(get("BACKUP_ON_START"), true),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: get("LOG_DIR"),
            environment,
        })
    }

    /// 使用自定义路径覆盖部分配置
    ///
    /// 常用于测试场景, 不读取环境变量。
    pub fn with_overrides(db_path: impl AsRef<Path>, auth_file: impl AsRef<Path>) -> Self {
        let jwt = JwtConfig::from_parts(None, 12, 60, false)
            .unwrap_or_else(|_| JwtConfig::with_secret("aurum-ledger-test-secret-0123456789abcdef"));
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            auth_file: auth_file.as_ref().to_path_buf(),
            http_host: "127.0.0.1".into(),
            http_port: 0,
            jwt,
            revenue_guard: false,
            cors_origins: Vec::new(),
            timezone: DEFAULT_TIMEZONE,
            backup_on_start: false,
            log_level: "info".into(),
            log_dir: None,
            environment: "development".into(),
        }
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// `sqlite:///rel.db` → `rel.db`, `sqlite:////abs.db` → `/abs.db`
fn sqlite_url_to_path(url: &str) -> String {
    let rest = url.strip_prefix("sqlite:").unwrap_or(url);
    let path = rest
        .strip_prefix("///")
        .or_else(|| rest.strip_prefix("//"))
        .unwrap_or(rest);
    path.split('?').next().unwrap_or(path).to_string()
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
