//! Report Models (KPI / 營收報表)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting window granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    Day,
    Month,
    Year,
}

impl PeriodMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Previous / next / today reference dates for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodNav {
    pub prev: NaiveDate,
    pub next: NaiveDate,
    pub today: NaiveDate,
}

/// Aggregates over a date window
///
/// `total = morning + evening`, `net = total - expense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub morning: f64,
    pub evening: f64,
    pub expense: f64,
    pub total: f64,
    pub net: f64,
    pub period_label: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// KPI for a navigable period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiReport {
    pub mode: PeriodMode,
    pub ref_date: NaiveDate,
    #[serde(flatten)]
    pub kpi: Kpi,
    pub nav: PeriodNav,
}

/// One day of the revenue report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub date: NaiveDate,
    pub morning: f64,
    pub evening: f64,
    pub total: f64,
    pub expense: f64,
    pub net: f64,
}

/// Column sums of a revenue report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub morning: f64,
    pub evening: f64,
    pub total: f64,
    pub expense: f64,
    pub net: f64,
}

/// Daily revenue report over a window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueReport {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub period_label: String,
    pub rows: Vec<RevenueRow>,
    pub totals: RevenueTotals,
}

/// Expense total per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub count: i64,
}
