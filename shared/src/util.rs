//! 时间戳工具

/// 当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 本地时间戳, 用于 `.bak` 文件名（`YYYYMMDD-HHMMSS`）
pub fn file_stamp() -> String {
    chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// 本地时间戳, 用于备份 ZIP 文件名（`YYYYMMDD_HHMMSS`）
pub fn archive_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
