//! 报表路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/v1/reports/kpi | GET | 指定期间 KPI + 前后导航 |
//! | /api/v1/reports/revenue | GET | 每日营收明细 |
//! | /api/v1/reports/expense-categories | GET | 支出分类排行 |
//! | /api/v1/kpi/{day,month,year} | GET | KPI 快捷查询 |
//!
//! `REVENUE_GUARD=true` 时这些路由要求营收解锁令牌。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/v1/reports", report_routes())
        .nest("/api/v1/kpi", kpi_routes())
}

fn report_routes() -> Router<ServerState> {
    Router::new()
        .route("/kpi", get(handler::kpi))
        .route("/revenue", get(handler::revenue))
        .route("/expense-categories", get(handler::expense_categories))
}

fn kpi_routes() -> Router<ServerState> {
    Router::new()
        .route("/day", get(handler::kpi_day))
        .route("/month", get(handler::kpi_month))
        .route("/year", get(handler::kpi_year))
}
