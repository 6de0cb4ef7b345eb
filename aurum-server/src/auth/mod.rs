//! 认证授权模块
//!
//! - [`CredentialStore`] - auth.json 账号凭证
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] / [`require_revenue_unlock`] - 中间件

pub mod credentials;
pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use credentials::{AccountChange, CredentialError, CredentialStore};
pub use jwt::{Claims, CurrentUser, IssuedToken, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_revenue_unlock};
