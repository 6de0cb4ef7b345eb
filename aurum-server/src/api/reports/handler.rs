//! Report API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::core::ServerState;
use crate::period::{self, Window, WindowParams};
use crate::reports;
use crate::utils::time;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{CategoryTotal, Kpi, KpiReport, PeriodMode, RevenueReport};

const DEFAULT_CATEGORY_LIMIT: u32 = 10;
const MAX_CATEGORY_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct KpiQuery {
    pub mode: Option<String>,
    pub ref_date: Option<String>,
}

/// GET /api/v1/reports/kpi?mode=day|month|year&ref_date=YYYY-MM-DD
pub async fn kpi(
    State(state): State<ServerState>,
    Query(query): Query<KpiQuery>,
) -> AppResult<Json<KpiReport>> {
    let mode = period::parse_mode(query.mode.as_deref())?;
    let today = state.today();
    let ref_date = time::parse_optional_date(query.ref_date.as_deref())?.unwrap_or(today);
    Ok(Json(reports::kpi(&state.pool, mode, ref_date, today).await?))
}

/// GET /api/v1/reports/revenue - 每日营收
pub async fn revenue(
    State(state): State<ServerState>,
    Query(params): Query<WindowParams>,
) -> AppResult<Json<RevenueReport>> {
    let window = params.resolve(state.today())?;
    Ok(Json(reports::daily_revenue(&state.pool, &window).await?))
}

/// Window params plus `limit`
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub mode: Option<String>,
    pub ref_date: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<u32>,
}

/// GET /api/v1/reports/expense-categories - 支出分类排行
pub async fn expense_categories(
    State(state): State<ServerState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<Vec<CategoryTotal>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_CATEGORY_LIMIT)
        .clamp(1, MAX_CATEGORY_LIMIT);
    let window = WindowParams {
        mode: query.mode,
        ref_date: query.ref_date,
        date_from: query.date_from,
        date_to: query.date_to,
    }
    .resolve(state.today())?;

    let rows =
        reports::expense_by_category(&state.pool, window.date_from, window.date_to, limit).await?;
    Ok(Json(rows))
}

// ── KPI aliases ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub d: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub y: Option<i32>,
    pub m: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub y: Option<i32>,
}

fn out_of_range(msg: &str) -> AppError {
    AppError::with_message(ErrorCode::ValueOutOfRange, msg)
}

async fn kpi_window(state: &ServerState, window: Window) -> AppResult<Json<Kpi>> {
    let kpi =
        reports::kpi_for_range(&state.pool, window.date_from, window.date_to, window.label)
            .await?;
    Ok(Json(kpi))
}

/// GET /api/v1/kpi/day?d=YYYY-MM-DD
pub async fn kpi_day(
    State(state): State<ServerState>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Kpi>> {
    let date = time::parse_optional_date(query.d.as_deref())?.unwrap_or_else(|| state.today());
    kpi_window(&state, Window::period(PeriodMode::Day, date)).await
}

/// GET /api/v1/kpi/month?y=&m=
pub async fn kpi_month(
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<Kpi>> {
    let today = state.today();
    let year = query.y.unwrap_or(today.year());
    let month = query.m.unwrap_or(today.month());
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| out_of_range("y/m must name a valid month"))?;
    kpi_window(&state, Window::period(PeriodMode::Month, first)).await
}

/// GET /api/v1/kpi/year?y=
pub async fn kpi_year(
    State(state): State<ServerState>,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<Kpi>> {
    let year = query.y.unwrap_or(state.today().year());
    let first =
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| out_of_range("y must be a valid year"))?;
    kpi_window(&state, Window::period(PeriodMode::Year, first)).await
}
