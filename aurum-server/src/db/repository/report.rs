//! Report Repository
//!
//! Aggregate queries over orders and expenses. `TOTAL()` is used instead of
//! `SUM()` so empty windows yield `0.0` and results always decode as REAL.

use super::RepoResult;
use chrono::NaiveDate;
use shared::models::{CategoryTotal, ShiftKind};
use sqlx::SqlitePool;

/// Revenue per shift in a window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShiftSums {
    pub morning: f64,
    pub evening: f64,
}

impl ShiftSums {
    fn add(&mut self, shift: &str, amount: f64) {
        match ShiftKind::parse(shift) {
            Some(ShiftKind::Morning) => self.morning += amount,
            Some(ShiftKind::Evening) => self.evening += amount,
            None => tracing::warn!(shift = %shift, amount, "Skipping order with unknown shift"),
        }
    }
}

pub async fn shift_sums(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> RepoResult<ShiftSums> {
    let rows: Vec<(String, f64)> = sqlx::query_as(
        "SELECT shift, TOTAL(amount) FROM orders WHERE date BETWEEN ? AND ? GROUP BY shift",
    )
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await?;

    let mut sums = ShiftSums::default();
    for (shift, amount) in rows {
        sums.add(&shift, amount);
    }
    Ok(sums)
}

pub async fn expense_sum(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> RepoResult<f64> {
    let total: f64 =
        sqlx::query_scalar("SELECT TOTAL(amount) FROM expenses WHERE date BETWEEN ? AND ?")
            .bind(date_from)
            .bind(date_to)
            .fetch_one(pool)
            .await?;
    Ok(total)
}

/// Per-day shift revenue, only for days that have orders
pub async fn daily_shift_sums(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> RepoResult<Vec<(NaiveDate, ShiftSums)>> {
    let rows: Vec<(NaiveDate, String, f64)> = sqlx::query_as(
        "SELECT date, shift, TOTAL(amount) FROM orders WHERE date BETWEEN ? AND ? GROUP BY date, shift ORDER BY date",
    )
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await?;

    let mut out: Vec<(NaiveDate, ShiftSums)> = Vec::new();
    for (date, shift, amount) in rows {
        match out.last_mut() {
            Some((last, sums)) if *last == date => sums.add(&shift, amount),
            _ => {
                let mut sums = ShiftSums::default();
                sums.add(&shift, amount);
                out.push((date, sums));
            }
        }
    }
    Ok(out)
}

/// Per-day expense totals, only for days that have expenses
pub async fn daily_expense_sums(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> RepoResult<Vec<(NaiveDate, f64)>> {
    let rows = sqlx::query_as::<_, (NaiveDate, f64)>(
        "SELECT date, TOTAL(amount) FROM expenses WHERE date BETWEEN ? AND ? GROUP BY date ORDER BY date",
    )
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Expense totals per category, largest first
pub async fn expense_by_category(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
    limit: u32,
) -> RepoResult<Vec<CategoryTotal>> {
    let rows = sqlx::query_as::<_, CategoryTotal>(
        "SELECT category, TOTAL(amount) AS amount, COUNT(*) AS count FROM expenses WHERE date BETWEEN ? AND ? GROUP BY category ORDER BY amount DESC, category LIMIT ?",
    )
    .bind(date_from)
    .bind(date_to)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
