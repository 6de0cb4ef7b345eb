//! Expense Repository

use super::{RepoError, RepoResult, like_pattern, page_bounds};
use chrono::NaiveDate;
use shared::models::{CategoryUsage, Expense, parse_amount_text};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, date, category, CAST(amount AS REAL) AS amount, note";

/// Validated expense fields
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub note: Option<String>,
}

/// List filter
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Matches category or note (substring) or, when numeric, the exact amount
    pub q: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ExpenseFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(d) = filter.date_from {
        qb.push(" AND date >= ").push_bind(d);
    }
    if let Some(d) = filter.date_to {
        qb.push(" AND date <= ").push_bind(d);
    }
    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = like_pattern(q);
        qb.push(" AND (category LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR note LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'");
        if let Some(amount) = parse_amount_text(q).filter(|a| a.is_finite()) {
            qb.push(" OR amount = ").push_bind(amount);
        }
        qb.push(")");
    }
}

pub async fn count(pool: &SqlitePool, filter: &ExpenseFilter) -> RepoResult<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM expenses");
    push_filters(&mut qb, filter);
    let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// One page of matching expenses, newest id first
pub async fn find_page(
    pool: &SqlitePool,
    filter: &ExpenseFilter,
    page: u32,
    page_size: u32,
) -> RepoResult<Vec<Expense>> {
    let (limit, offset) = page_bounds(page, page_size);
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM expenses"));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let expenses = qb.build_query_as::<Expense>().fetch_all(pool).await?;
    Ok(expenses)
}

/// All expenses in a date window, ordered by (date, id)
pub async fn find_in_range(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> RepoResult<Vec<Expense>> {
    let expenses = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {COLUMNS} FROM expenses WHERE date BETWEEN ? AND ? ORDER BY date, id"
    ))
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await?;
    Ok(expenses)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Expense>> {
    let expense =
        sqlx::query_as::<_, Expense>(&format!("SELECT {COLUMNS} FROM expenses WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(expense)
}

/// Distinct categories, most used first
pub async fn categories(pool: &SqlitePool) -> RepoResult<Vec<CategoryUsage>> {
    let rows = sqlx::query_as::<_, CategoryUsage>(
        "SELECT category, COUNT(*) AS count FROM expenses GROUP BY category ORDER BY count DESC, category",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: ExpenseInput) -> RepoResult<Expense> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO expenses (date, category, amount, note) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(data.date)
    .bind(&data.category)
    .bind(data.amount)
    .bind(&data.note)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create expense".into()))
}

/// Replace every field of an expense
pub async fn update(pool: &SqlitePool, id: i64, data: ExpenseInput) -> RepoResult<Expense> {
    let rows =
        sqlx::query("UPDATE expenses SET date = ?, category = ?, amount = ?, note = ? WHERE id = ?")
            .bind(data.date)
            .bind(&data.category)
            .bind(data.amount)
            .bind(&data.note)
            .bind(id)
            .execute(pool)
            .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Expense {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Expense {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
