//! Money input

use serde::{Deserialize, Serialize};

/// Amount as sent by a client
///
/// Accepts a JSON number or a string that may carry thousands
/// separators (`"1,200"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Numeric value, `None` when the text form is not a number
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => parse_amount_text(s),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// Parse a free-form amount string, ignoring commas and surrounding spaces
pub fn parse_amount_text(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
