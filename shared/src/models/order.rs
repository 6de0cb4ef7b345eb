//! Order Model (營業額單據)

use super::amount::AmountInput;
use super::shift::ShiftKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Order entity: one sales slip within a shift
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub date: NaiveDate,
    /// Stored shift code, returned as-is
    ///
    /// Normally `MORNING` / `EVENING`; adopted databases may still hold
    /// values startup normalization could not map.
    pub shift: String,
    pub order_no: String,
    pub amount: f64,
    pub memo: Option<String>,
}

impl Order {
    /// Parsed shift, `None` for an unrecognized stored value
    pub fn shift_kind(&self) -> Option<ShiftKind> {
        ShiftKind::parse(&self.shift)
    }

    /// Display label, falling back to the stored value
    pub fn shift_label(&self) -> &str {
        match self.shift_kind() {
            Some(kind) => kind.label(),
            None => &self.shift,
        }
    }
}

/// Create / full-replace order payload
///
/// Date and shift arrive as raw strings so that bad values are reported
/// as validation errors instead of body rejections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub date: String,
    pub shift: String,
    pub order_no: String,
    pub amount: AmountInput,
    pub memo: Option<String>,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub date: Option<String>,
    pub shift: Option<String>,
    pub order_no: Option<String>,
    pub amount: Option<AmountInput>,
    pub memo: Option<String>,
}
