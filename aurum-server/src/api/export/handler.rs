//! CSV Export Handlers

use axum::{
    extract::{Query, State},
    response::Response,
};

use crate::core::ServerState;
use crate::db::repository::{expense, order};
use crate::money::format_amount;
use crate::period::WindowParams;
use crate::reports;
use crate::utils::AppResult;
use crate::utils::csv::{CsvWriter, csv_response};

/// GET /api/v1/export/orders.csv
pub async fn orders_csv(
    State(state): State<ServerState>,
    Query(params): Query<WindowParams>,
) -> AppResult<Response> {
    let window = params.resolve(state.today())?;
    let orders = order::find_in_range(&state.pool, window.date_from, window.date_to).await?;

    let mut csv = CsvWriter::new();
    csv.row(["日期", "班別", "單號", "金額", "備註"]);
    for o in &orders {
        csv.row([
            o.date.to_string(),
            o.shift_label().to_string(),
            o.order_no.clone(),
            format_amount(o.amount),
            o.memo.clone().unwrap_or_default(),
        ]);
    }

    tracing::info!(rows = orders.len(), window = %window.label, "Exported orders");
    Ok(csv_response(
        &format!("orders_{}.csv", window.file_tag()),
        csv.finish(),
    ))
}

/// GET /api/v1/export/expenses.csv
pub async fn expenses_csv(
    State(state): State<ServerState>,
    Query(params): Query<WindowParams>,
) -> AppResult<Response> {
    let window = params.resolve(state.today())?;
    let expenses = expense::find_in_range(&state.pool, window.date_from, window.date_to).await?;

    let mut csv = CsvWriter::new();
    csv.row(["日期", "分類", "金額", "備註"]);
    for e in &expenses {
        csv.row([
            e.date.to_string(),
            e.category.clone(),
            format_amount(e.amount),
            e.note.clone().unwrap_or_default(),
        ]);
    }

    tracing::info!(rows = expenses.len(), window = %window.label, "Exported expenses");
    Ok(csv_response(
        &format!("expenses_{}.csv", window.file_tag()),
        csv.finish(),
    ))
}

/// GET /api/v1/export/revenue.csv - 每日营收
pub async fn revenue_csv(
    State(state): State<ServerState>,
    Query(params): Query<WindowParams>,
) -> AppResult<Response> {
    let window = params.resolve(state.today())?;
    let report = reports::daily_revenue(&state.pool, &window).await?;

    let mut csv = CsvWriter::new();
    csv.row(["日期", "早班營業額", "晚班營業額", "總營業額", "支出", "利潤"]);
    for r in &report.rows {
        csv.row([
            r.date.to_string(),
            format_amount(r.morning),
            format_amount(r.evening),
            format_amount(r.total),
            format_amount(r.expense),
            format_amount(r.net),
        ]);
    }

    Ok(csv_response(
        &format!("revenue_{}.csv", window.file_tag()),
        csv.finish(),
    ))
}

/// GET /api/v1/export/sales.csv - 期间汇总 (单行)
pub async fn sales_csv(
    State(state): State<ServerState>,
    Query(params): Query<WindowParams>,
) -> AppResult<Response> {
    let window = params.resolve(state.today())?;
    let kpi = reports::kpi_for_range(
        &state.pool,
        window.date_from,
        window.date_to,
        window.label.clone(),
    )
    .await?;

    let mut csv = CsvWriter::new();
    csv.row(["期間", "營業額", "支出", "淨利"]);
    csv.row([
        format!("{}~{}", kpi.date_from, kpi.date_to),
        format_amount(kpi.total),
        format_amount(kpi.expense),
        format_amount(kpi.net),
    ]);

    Ok(csv_response(
        &format!("sales_{}.csv", window.file_tag()),
        csv.finish(),
    ))
}
