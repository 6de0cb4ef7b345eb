//! 时间工具函数: 业务时区与日期解析

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    let trimmed = date.trim();
    // chrono accepts `2024-3-1`; the wire format is zero-padded
    if trimmed.len() != 10 {
        return Err(AppError::invalid_date(date));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| AppError::invalid_date(date))
}

/// 解析可选日期参数, 空字符串视为未提供
pub fn parse_optional_date(date: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match date.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(s).map(Some),
        None => Ok(None),
    }
}

/// 业务时区的今天
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
