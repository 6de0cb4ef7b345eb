//! Period math (日 / 月 / 年 windows)
//!
//! A period is a `PeriodMode` plus a reference date. It resolves to an
//! inclusive `[date_from, date_to]` window, a display label and
//! previous/next reference dates for navigation.

use chrono::{Datelike, NaiveDate};
use shared::models::{PeriodMode, PeriodNav};

use crate::utils::time::parse_optional_date;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Number of days in a month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Shift by whole months, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Shift by whole years; Feb 29 lands on Feb 28 in common years
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    add_months(date, years * 12)
}

/// Inclusive window for a period
pub fn range(mode: PeriodMode, ref_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = ref_date.year();
    match mode {
        PeriodMode::Day => (ref_date, ref_date),
        PeriodMode::Month => {
            let month = ref_date.month();
            let first = ref_date.with_day(1).unwrap_or(ref_date);
            let last = ref_date
                .with_day(days_in_month(year, month))
                .unwrap_or(ref_date);
            (first, last)
        }
        PeriodMode::Year => (
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(ref_date),
            NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(ref_date),
        ),
    }
}

/// Display label, e.g. `期間：2024-03`
pub fn label(mode: PeriodMode, ref_date: NaiveDate) -> String {
    match mode {
        PeriodMode::Day => format!("期間：{}", ref_date.format("%Y-%m-%d")),
        PeriodMode::Month => format!("期間：{}", ref_date.format("%Y-%m")),
        PeriodMode::Year => format!("期間：{} 年", ref_date.year()),
    }
}

/// Label for an explicit date range
pub fn range_label(date_from: NaiveDate, date_to: NaiveDate) -> String {
    format!("期間：{date_from} ~ {date_to}")
}

/// Previous / next reference dates
pub fn nav(mode: PeriodMode, ref_date: NaiveDate, today: NaiveDate) -> PeriodNav {
    let (prev, next) = match mode {
        PeriodMode::Day => (
            ref_date.pred_opt().unwrap_or(ref_date),
            ref_date.succ_opt().unwrap_or(ref_date),
        ),
        PeriodMode::Month => (add_months(ref_date, -1), add_months(ref_date, 1)),
        PeriodMode::Year => (add_years(ref_date, -1), add_years(ref_date, 1)),
    };
    PeriodNav { prev, next, today }
}

/// Parse a `mode` query value, defaulting to `day`
pub fn parse_mode(raw: Option<&str>) -> AppResult<PeriodMode> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(PeriodMode::Day),
        Some(s) => PeriodMode::parse(s).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::InvalidPeriodMode,
                "mode must be one of day, month, year",
            )
            .with_detail("value", s)
        }),
    }
}

/// A resolved reporting window
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// `None` for an explicit date range
    pub mode: Option<PeriodMode>,
    pub ref_date: NaiveDate,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub label: String,
}

impl Window {
    pub fn period(mode: PeriodMode, ref_date: NaiveDate) -> Self {
        let (date_from, date_to) = range(mode, ref_date);
        Self {
            mode: Some(mode),
            ref_date,
            date_from,
            date_to,
            label: label(mode, ref_date),
        }
    }

    /// Explicit range; bounds are swapped when given in reverse
    pub fn explicit(a: NaiveDate, b: NaiveDate) -> Self {
        let (date_from, date_to) = if a <= b { (a, b) } else { (b, a) };
        Self {
            mode: None,
            ref_date: date_from,
            date_from,
            date_to,
            label: range_label(date_from, date_to),
        }
    }

    /// `{mode}_{ref}` or `range_{from}_{to}`, used in download names
    pub fn file_tag(&self) -> String {
        match self.mode {
            Some(mode) => format!("{}_{}", mode, self.ref_date),
            None => format!("range_{}_{}", self.date_from, self.date_to),
        }
    }
}

/// Raw window parameters as they arrive on the query string
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct WindowParams {
    pub mode: Option<String>,
    pub ref_date: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl WindowParams {
    /// Resolve against `today`
    ///
    /// `date_from`/`date_to` win over `mode`; a single bound is paired
    /// with itself.
    pub fn resolve(&self, today: NaiveDate) -> AppResult<Window> {
        let from = parse_optional_date(self.date_from.as_deref())?;
        let to = parse_optional_date(self.date_to.as_deref())?;
        match (from, to) {
            (Some(a), Some(b)) => return Ok(Window::explicit(a, b)),
            (Some(a), None) | (None, Some(a)) => return Ok(Window::explicit(a, a)),
            (None, None) => {}
        }
        let mode = parse_mode(self.mode.as_deref())?;
        let ref_date = parse_optional_date(self.ref_date.as_deref())?.unwrap_or(today);
        Ok(Window::period(mode, ref_date))
    }
}
