//! Shift Model (早班 / 晚班)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Business shift an order belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Morning,
    Evening,
}

impl ShiftKind {
    pub const ALL: [ShiftKind; 2] = [ShiftKind::Morning, ShiftKind::Evening];

    /// Stored / wire code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Evening => "EVENING",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "早班",
            Self::Evening => "晚班",
        }
    }

    /// Parse a shift from a code, a label or a legacy alias
    ///
    /// Input is trimmed and upper-cased before matching.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "MORNING" | "早班" | "上午" | "AM" => Some(Self::Morning),
            "EVENING" | "晚班" | "夜班" | "下午" | "PM" => Some(Self::Evening),
            _ => None,
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
