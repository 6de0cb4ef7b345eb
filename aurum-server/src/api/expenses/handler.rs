//! Expense API Handlers

use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::expense::{ExpenseFilter, ExpenseInput};
use crate::db::repository::{RepoError, expense};
use crate::utils::time;
use crate::utils::validation::{
    MAX_CATEGORY_LEN, MAX_NOTE_LEN, validate_amount, validate_optional_text, validate_paging,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{CategoryUsage, Expense, ExpenseCreate, ExpensePatch, Page};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ExpenseNotFound).with_detail("id", id)
}

fn validate_input(payload: &ExpenseCreate) -> AppResult<ExpenseInput> {
    Ok(ExpenseInput {
        date: time::parse_date(&payload.date)?,
        category: validate_required_text(&payload.category, "category", MAX_CATEGORY_LEN)?,
        amount: validate_amount(&payload.amount)?,
        note: validate_optional_text(payload.note.as_deref(), "note", MAX_NOTE_LEN)?,
    })
}

/// Query params for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub q: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// GET /api/v1/expenses - 分页查询支出
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Expense>>> {
    validate_paging(query.page, query.page_size)?;

    let filter = ExpenseFilter {
        date_from: time::parse_optional_date(query.date_from.as_deref())?,
        date_to: time::parse_optional_date(query.date_to.as_deref())?,
        q: query.q,
    };

    let total = expense::count(&state.pool, &filter).await?;
    let items = expense::find_page(&state.pool, &filter, query.page, query.page_size).await?;

    Ok(Json(Page {
        total,
        page: query.page,
        page_size: query.page_size,
        items,
    }))
}

/// GET /api/v1/expenses/categories - 按使用次数排序的分类
pub async fn categories(State(state): State<ServerState>) -> AppResult<Json<Vec<CategoryUsage>>> {
    Ok(Json(expense::categories(&state.pool).await?))
}

/// GET /api/v1/expenses/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Expense>> {
    let expense = expense::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(expense))
}

/// POST /api/v1/expenses - 新增支出
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let Json(payload) = payload?;
    let input = validate_input(&payload)?;
    let expense = expense::create(&state.pool, input).await?;
    tracing::info!(id = expense.id, category = %expense.category, amount = expense.amount, "Expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/v1/expenses/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<ExpenseCreate>, JsonRejection>,
) -> AppResult<Json<Expense>> {
    let Json(payload) = payload?;
    let input = validate_input(&payload)?;
    save(&state, id, input).await
}

/// PATCH /api/v1/expenses/{id}
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<ExpensePatch>, JsonRejection>,
) -> AppResult<Json<Expense>> {
    let Json(payload) = payload?;
    let existing = expense::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let input = ExpenseInput {
        date: match payload.date.as_deref() {
            Some(raw) => time::parse_date(raw)?,
            None => existing.date,
        },
        category: match payload.category.as_deref() {
            Some(raw) => validate_required_text(raw, "category", MAX_CATEGORY_LEN)?,
            None => existing.category,
        },
        amount: match &payload.amount {
            Some(raw) => validate_amount(raw)?,
            None => existing.amount,
        },
        note: match payload.note.as_deref() {
            Some(raw) => validate_optional_text(Some(raw), "note", MAX_NOTE_LEN)?,
            None => existing.note,
        },
    };

    save(&state, id, input).await
}

async fn save(state: &ServerState, id: i64, input: ExpenseInput) -> AppResult<Json<Expense>> {
    let expense = expense::update(&state.pool, id, input)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;
    tracing::info!(id, "Expense updated");
    Ok(Json(expense))
}

/// DELETE /api/v1/expenses/{id}
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if !expense::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(id, "Expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
