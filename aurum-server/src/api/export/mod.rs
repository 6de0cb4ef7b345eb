//! CSV 导出路由
//!
//! 窗口参数: `mode` + `ref_date`, 或 `date_from` / `date_to`

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/export", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders.csv", get(handler::orders_csv))
        .route("/expenses.csv", get(handler::expenses_csv))
        .route("/revenue.csv", get(handler::revenue_csv))
        .route("/sales.csv", get(handler::sales_csv))
}
