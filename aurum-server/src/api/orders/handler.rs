//! Order API Handlers

use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{RepoError, order};
use crate::db::repository::order::{OrderFilter, OrderInput};
use crate::utils::time;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_ORDER_NO_LEN, validate_amount, validate_optional_text, validate_paging,
    validate_required_text, validate_shift,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderCreate, OrderPatch, Page};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("id", id)
}

fn map_missing(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => not_found(id),
        other => other.into(),
    }
}

/// Validate a full payload into repository input
fn validate_input(payload: &OrderCreate) -> AppResult<OrderInput> {
    Ok(OrderInput {
        date: time::parse_date(&payload.date)?,
        shift: validate_shift(&payload.shift)?,
        order_no: validate_required_text(&payload.order_no, "order_no", MAX_ORDER_NO_LEN)?,
        amount: validate_amount(&payload.amount)?,
        memo: validate_optional_text(payload.memo.as_deref(), "memo", MAX_NOTE_LEN)?,
    })
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub shift: Option<String>,
    pub q: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// GET /api/v1/orders - 分页查询营业单
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Order>>> {
    validate_paging(query.page, query.page_size)?;

    let filter = OrderFilter {
        date_from: time::parse_optional_date(query.date_from.as_deref())?,
        date_to: time::parse_optional_date(query.date_to.as_deref())?,
        shift: query
            .shift
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(validate_shift)
            .transpose()?,
        q: query.q,
    };

    let total = order::count(&state.pool, &filter).await?;
    let items = order::find_page(&state.pool, &filter, query.page, query.page_size).await?;

    Ok(Json(Page {
        total,
        page: query.page,
        page_size: query.page_size,
        items,
    }))
}

/// GET /api/v1/orders/{id} - 获取单个营业单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(order))
}

/// POST /api/v1/orders - 新增营业单
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<OrderCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let Json(payload) = payload?;
    let input = validate_input(&payload)?;
    let order = order::create(&state.pool, input).await?;
    tracing::info!(id = order.id, order_no = %order.order_no, amount = order.amount, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/v1/orders/{id} - 整笔替换
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderCreate>, JsonRejection>,
) -> AppResult<Json<Order>> {
    let Json(payload) = payload?;
    let input = validate_input(&payload)?;
    let order = order::update(&state.pool, id, input)
        .await
        .map_err(map_missing(id))?;
    tracing::info!(id, "Order replaced");
    Ok(Json(order))
}

/// PATCH /api/v1/orders/{id} - 部分更新
///
/// 未提供的字段沿用原值, 合并后整体校验
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderPatch>, JsonRejection>,
) -> AppResult<Json<Order>> {
    let Json(payload) = payload?;
    let existing = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let input = OrderInput {
        date: match payload.date.as_deref() {
            Some(raw) => time::parse_date(raw)?,
            None => existing.date,
        },
        shift: match payload.shift.as_deref() {
            Some(raw) => validate_shift(raw)?,
            // 库中遗留的未知班别需随本次请求一并修正
            None => existing
                .shift_kind()
                .ok_or_else(|| AppError::invalid_shift(existing.shift.as_str()))?,
        },
        order_no: match payload.order_no.as_deref() {
            Some(raw) => validate_required_text(raw, "order_no", MAX_ORDER_NO_LEN)?,
            None => existing.order_no,
        },
        amount: match &payload.amount {
            Some(raw) => validate_amount(raw)?,
            None => existing.amount,
        },
        memo: match payload.memo.as_deref() {
            Some(raw) => validate_optional_text(Some(raw), "memo", MAX_NOTE_LEN)?,
            None => existing.memo,
        },
    };

    let order = order::update(&state.pool, id, input)
        .await
        .map_err(map_missing(id))?;
    tracing::info!(id, "Order patched");
    Ok(Json(order))
}

/// DELETE /api/v1/orders/{id} - 删除营业单
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if !order::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
