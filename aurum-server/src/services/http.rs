//! HTTP 路由装配
//!
//! 中间件顺序 (外 → 内): 访问日志 → 压缩 → CORS → 认证 → 营收验证 → handler

use axum::{Router, middleware};
use http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::{require_auth, require_revenue_unlock};
use crate::core::{Config, ServerState};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    response
}

/// Build the Axum router (without state)
///
/// KPI / 报表 / 导出路由额外挂营收验证
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let revenue_routes = Router::<ServerState>::new()
        .merge(crate::api::reports::router())
        .merge(crate::api::export::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_revenue_unlock,
        ));

    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::expenses::router())
        .merge(crate::api::backup::router())
        .merge(revenue_routes)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 完整路由 (含状态与全部中间件)
pub fn build_router(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);

    build_app(&state)
        // require_auth 内部跳过 OPTIONS、非 /api 路径和公开的认证接口
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}
