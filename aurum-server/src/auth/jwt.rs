//! JWT 令牌服务
//!
//! 处理访问令牌与营收解锁令牌的生成、验证和解析。

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 令牌签发者
pub const ISSUER: &str = "aurum-ledger";
/// 令牌受众
pub const AUDIENCE: &str = "aurum-clients";
/// 密钥最小长度
pub const MIN_SECRET_LEN: usize = 32;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 密钥
    pub secret: String,
    /// 访问令牌有效期 (小时)
    pub access_token_hours: i64,
    /// 营收解锁令牌有效期 (分钟)
    pub revenue_token_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// 由配置项构造
    ///
    /// 生产环境必须提供 ≥ 32 字符的密钥; 其他环境缺省时生成临时密钥,
    /// 重启后旧令牌全部失效。
    pub fn from_parts(
        secret: Option<String>,
        access_token_hours: i64,
        revenue_token_minutes: i64,
        production: bool,
    ) -> Result<Self, JwtError> {
        let secret = match secret {
            Some(s) if s.len() >= MIN_SECRET_LEN => s,
            Some(_) if production => {
                return Err(JwtError::ConfigError(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            None if production => {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ));
            }
            Some(s) => {
                tracing::warn!("JWT_SECRET is shorter than {MIN_SECRET_LEN} characters");
                s
            }
            None => {
                tracing::warn!("JWT_SECRET not set, generating a temporary key");
                generate_printable_secret()?
            }
        };

        Ok(Self {
            secret,
            access_token_hours: access_token_hours.max(1),
            revenue_token_minutes: revenue_token_minutes.max(1),
            issuer: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
        })
    }

    /// 固定密钥 + 默认有效期
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            access_token_hours: 12,
            revenue_token_minutes: 60,
            issuer: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
        }
    }
}

/// 令牌类型
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REVENUE: &str = "revenue";

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 账号代码 (Subject)
    pub sub: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    pub iss: String,
    pub aud: String,
    /// 已通过营收二次验证
    #[serde(default)]
    pub rev: bool,
    pub token_type: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成可打印的随机密钥 (64 字符)
pub fn generate_printable_secret() -> Result<String, JwtError> {
    const ALLOWED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(bytes
        .iter()
        .map(|b| ALLOWED[(*b as usize) % ALLOWED.len()] as char)
        .collect())
}

/// 签发结果
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// 有效期 (秒)
    pub expires_in: i64,
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 登录后签发的访问令牌
    pub fn generate_access_token(&self, code: &str) -> Result<IssuedToken, JwtError> {
        self.issue(
            code,
            Duration::hours(self.config.access_token_hours),
            false,
            TOKEN_TYPE_ACCESS,
        )
    }

    /// 营收二次验证通过后签发的短期令牌 (`rev = true`)
    pub fn generate_revenue_token(&self, code: &str) -> Result<IssuedToken, JwtError> {
        self.issue(
            code,
            Duration::minutes(self.config.revenue_token_minutes),
            true,
            TOKEN_TYPE_REVENUE,
        )
    }

    fn issue(
        &self,
        code: &str,
        ttl: Duration,
        rev: bool,
        token_type: &str,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: code.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            rev,
            token_type: token_type.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: ttl.num_seconds(),
        })
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建, 注入到请求处理函数
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> Json<MeResponse> {
///     Json(MeResponse { code: user.code, .. })
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 账号代码
    pub code: String,
    /// 令牌携带 `rev` 声明
    pub revenue_unlocked: bool,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            code: claims.sub,
            revenue_unlocked: claims.rev,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        }
    }
}
