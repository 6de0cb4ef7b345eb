//! CSV 输出
//!
//! Excel 兼容: UTF-8 BOM + CRLF, 按 RFC 4180 加引号。

use axum::response::{IntoResponse, Response};
use http::header;

const BOM: char = '\u{feff}';

/// Row-oriented CSV buffer
#[derive(Debug)]
pub struct CsvWriter {
    buf: String,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        let mut buf = String::with_capacity(4096);
        buf.push(BOM);
        Self { buf }
    }

    /// Append one record
    pub fn row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            push_field(&mut self.buf, field.as_ref());
        }
        self.buf.push_str("\r\n");
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.into_bytes()
    }
}

fn push_field(buf: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        buf.push('"');
        buf.push_str(&field.replace('"', "\"\""));
        buf.push('"');
    } else {
        buf.push_str(field);
    }
}

/// `attachment; filename=<ascii>; filename*=UTF-8''<pct-encoded>`
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename={}; filename*=UTF-8''{}",
        ascii,
        percent_encode(filename)
    )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Download response for a finished CSV body
pub fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_and_crlf() {
        let mut w = CsvWriter::new();
        w.row(["日期", "金額"]);
        w.row(["2024-01-01", "1200"]);
        let text = String::from_utf8(w.finish()).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert_eq!(text, "\u{feff}日期,金額\r\n2024-01-01,1200\r\n");
    }

    #[test]
    fn test_quoting() {
        let mut w = CsvWriter::new();
        w.row(["a,b", "say \"hi\"", "line\nbreak", "plain"]);
        let text = String::from_utf8(w.finish()).unwrap();
        assert_eq!(
            text.trim_start_matches('\u{feff}'),
            "\"a,b\",\"say \"\"hi\"\"\",\"line\nbreak\",plain\r\n"
        );
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("orders_month_2024-02-01.csv"),
            "attachment; filename=orders_month_2024-02-01.csv; \
             filename*=UTF-8''orders_month_2024-02-01.csv"
        );
        let header = content_disposition("營收.csv");
        assert!(header.contains("filename=__.csv"));
        assert!(header.contains("filename*=UTF-8''%E7%87%9F%E6%94%B6.csv"));
    }
}
