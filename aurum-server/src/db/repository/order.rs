//! Order Repository

use super::{RepoError, RepoResult, like_pattern, page_bounds};
use chrono::NaiveDate;
use shared::models::{Order, ShiftKind, parse_amount_text};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Amounts are read back as REAL so integral NUMERIC values decode as f64
const COLUMNS: &str =
    "id, date, COALESCE(shift, '') AS shift, order_no, CAST(amount AS REAL) AS amount, memo";

/// Validated order fields
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub date: NaiveDate,
    pub shift: ShiftKind,
    pub order_no: String,
    pub amount: f64,
    pub memo: Option<String>,
}

/// List filter
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub shift: Option<ShiftKind>,
    /// Matches `order_no` (substring) or, when numeric, the exact amount
    pub q: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(d) = filter.date_from {
        qb.push(" AND date >= ").push_bind(d);
    }
    if let Some(d) = filter.date_to {
        qb.push(" AND date <= ").push_bind(d);
    }
    if let Some(shift) = filter.shift {
        qb.push(" AND shift = ").push_bind(shift.as_str());
    }
    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        qb.push(" AND (order_no LIKE ")
            .push_bind(like_pattern(q))
            .push(" ESCAPE '\\'");
        if let Some(amount) = parse_amount_text(q).filter(|a| a.is_finite()) {
            qb.push(" OR amount = ").push_bind(amount);
        }
        qb.push(")");
    }
}

/// Count rows matching the filter
pub async fn count(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders");
    push_filters(&mut qb, filter);
    let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// One page of matching orders, newest id first
pub async fn find_page(
    pool: &SqlitePool,
    filter: &OrderFilter,
    page: u32,
    page_size: u32,
) -> RepoResult<Vec<Order>> {
    let (limit, offset) = page_bounds(page, page_size);
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM orders"));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let orders = qb.build_query_as::<Order>().fetch_all(pool).await?;
    Ok(orders)
}

/// All orders in a date window, ordered by (date, id)
pub async fn find_in_range(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE date BETWEEN ? AND ? ORDER BY date, id"
    ))
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn create(pool: &SqlitePool, data: OrderInput) -> RepoResult<Order> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (date, shift, order_no, amount, memo) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.date)
    .bind(data.shift.as_str())
    .bind(&data.order_no)
    .bind(data.amount)
    .bind(&data.memo)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Replace every field of an order
pub async fn update(pool: &SqlitePool, id: i64, data: OrderInput) -> RepoResult<Order> {
    let rows = sqlx::query(
        "UPDATE orders SET date = ?, shift = ?, order_no = ?, amount = ?, memo = ? WHERE id = ?",
    )
    .bind(data.date)
    .bind(data.shift.as_str())
    .bind(&data.order_no)
    .bind(data.amount)
    .bind(&data.memo)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Returns `false` when no row had that id
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
