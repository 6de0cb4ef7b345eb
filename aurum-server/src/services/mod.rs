//! 服务层
//!
//! - [`http`] - 路由装配与中间件

pub mod http;

pub use self::http::build_router;
