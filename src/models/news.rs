use chrono::NaiveDate;
use crate::errors::{Result, DataHubError};
use crate::models::record::{RawRecord, StoreRecord};
use crate::util;

/// 一条新闻：日期 + 标题
#[derive(Debug, Clone, PartialEq)]
pub struct NewsRecord {
    pub date: NaiveDate,
    pub title: String,
}

impl NewsRecord {
    pub fn new(date: NaiveDate, title: impl Into<String>) -> Self {
        Self {
            date,
            title: title.into().trim().to_string(),
        }
    }

    /// 从原始记录规范化；日期无法识别或标题缺失时返回错误
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let title = raw
            .get("title")
            .filter(|t| !RawRecord::is_placeholder("title", t) && !t.trim().is_empty())
            .ok_or_else(|| DataHubError::DataError("news item without title".to_string()))?;
        let date_text = raw.get("date").unwrap_or("");
        let date = util::normalize_date(date_text)?;
        Ok(Self::new(date, title))
    }
}

impl StoreRecord for NewsRecord {
    const HEADER: &'static [&'static str] = &["Date", "Title"];
    const KEY_FIELDS: &'static [&'static str] = &["Date", "Title"];

    fn to_values(&self) -> Vec<String> {
        vec![util::format_date(&self.date), self.title.clone()]
    }

    fn normalize_key_part(field: &str, value: &str) -> String {
        match field {
            "Date" => util::canonical_date_text(value),
            _ => value.trim().to_string(),
        }
    }
}
