//! Expense Model (支出)

use super::amount::AmountInput;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Expense entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub note: Option<String>,
}

/// Create / full-replace expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub date: String,
    pub category: String,
    pub amount: AmountInput,
    pub note: Option<String>,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensePatch {
    pub date: Option<String>,
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    pub note: Option<String>,
}

/// Category with its number of uses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryUsage {
    pub category: String,
    pub count: i64,
}
