use chrono::NaiveDate;
use crate::errors::{Result, DataHubError};

/// 站点上出现过的日期格式
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%A, %B %d, %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
    "%d %B %Y",
    "%Y/%m/%d",
];

/// 存储中使用的规范日期格式
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// 日期转换工具：把各种页面日期统一成 NaiveDate
pub fn normalize_date(raw: &str) -> Result<NaiveDate> {
    let text = raw.trim();
    if let Some(date) = parse_known_formats(text) {
        return Ok(date);
    }

    // "2024-01-01 15:00:00" 之类带时间的写法，只取日期部分
    if let Some(first) = text.split_whitespace().next() {
        if first != text {
            if let Some(date) = parse_known_formats(first.trim_end_matches(',')) {
                return Ok(date);
            }
        }
    }

    Err(DataHubError::DataError(format!("Unrecognized date: {:?}", raw)))
}

/// 去重键里的日期部分：能解析就统一格式，否则原样去空白
pub fn canonical_date_text(value: &str) -> String {
    normalize_date(value)
        .map(|d| format_date(&d))
        .unwrap_or_else(|_| value.trim().to_string())
}

fn parse_known_formats(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// 解析带千分位的数字，例如 "1,234.50"；"-" 和空串视为 0
pub fn parse_number(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return Ok(0.0);
    }

    Ok(cleaned.parse::<f64>()?)
}

/// [start, end] 闭区间内按升序枚举日期
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
