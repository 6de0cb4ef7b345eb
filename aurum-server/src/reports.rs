//! KPI and revenue reports
//!
//! SQL does the per-shift / per-day grouping, `money::Totals` derives
//! `total` and `net` so both identities hold exactly after rounding.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::models::{
    CategoryTotal, Kpi, KpiReport, PeriodMode, RevenueReport, RevenueRow, RevenueTotals,
};
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, report};
use crate::money::{self, Totals};
use crate::period::{self, Window};

/// KPI over an inclusive date window
pub async fn kpi_for_range(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
    period_label: String,
) -> RepoResult<Kpi> {
    let sums = report::shift_sums(pool, date_from, date_to).await?;
    let expense = report::expense_sum(pool, date_from, date_to).await?;
    let t = Totals::compute(sums.morning, sums.evening, expense);

    Ok(Kpi {
        morning: t.morning,
        evening: t.evening,
        expense: t.expense,
        total: t.total,
        net: t.net,
        period_label,
        date_from,
        date_to,
    })
}

/// KPI for a navigable period
pub async fn kpi(
    pool: &SqlitePool,
    mode: PeriodMode,
    ref_date: NaiveDate,
    today: NaiveDate,
) -> RepoResult<KpiReport> {
    let (date_from, date_to) = period::range(mode, ref_date);
    let kpi = kpi_for_range(pool, date_from, date_to, period::label(mode, ref_date)).await?;
    Ok(KpiReport {
        mode,
        ref_date,
        kpi,
        nav: period::nav(mode, ref_date, today),
    })
}

/// Per-day revenue rows for every date that has orders or expenses
pub async fn daily_revenue(pool: &SqlitePool, window: &Window) -> RepoResult<RevenueReport> {
    let orders = report::daily_shift_sums(pool, window.date_from, window.date_to).await?;
    let expenses = report::daily_expense_sums(pool, window.date_from, window.date_to).await?;

    let mut days: BTreeMap<NaiveDate, (f64, f64, f64)> = BTreeMap::new();
    for (date, sums) in orders {
        let entry = days.entry(date).or_default();
        entry.0 = sums.morning;
        entry.1 = sums.evening;
    }
    for (date, amount) in expenses {
        days.entry(date).or_default().2 = amount;
    }

    let rows: Vec<RevenueRow> = days
        .into_iter()
        .map(|(date, (morning, evening, expense))| {
            let t = Totals::compute(morning, evening, expense);
            RevenueRow {
                date,
                morning: t.morning,
                evening: t.evening,
                total: t.total,
                expense: t.expense,
                net: t.net,
            }
        })
        .collect();

    let t = Totals::compute(
        money::to_f64(money::sum(rows.iter().map(|r| r.morning))),
        money::to_f64(money::sum(rows.iter().map(|r| r.evening))),
        money::to_f64(money::sum(rows.iter().map(|r| r.expense))),
    );

    Ok(RevenueReport {
        date_from: window.date_from,
        date_to: window.date_to,
        period_label: window.label.clone(),
        rows,
        totals: RevenueTotals {
            morning: t.morning,
            evening: t.evening,
            total: t.total,
            expense: t.expense,
            net: t.net,
        },
    })
}

/// Largest expense categories in a window
pub async fn expense_by_category(
    pool: &SqlitePool,
    date_from: NaiveDate,
    date_to: NaiveDate,
    limit: u32,
) -> RepoResult<Vec<CategoryTotal>> {
    let mut rows = report::expense_by_category(pool, date_from, date_to, limit).await?;
    for row in &mut rows {
        row.amount = money::round_money(row.amount);
    }
    Ok(rows)
}
