use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 持久化表中的一行，按表头名取值
pub type Row = HashMap<String, String>;

/// 一个抓取目标：某一天的新闻，某只股票，或全部跟踪股票
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    Date(NaiveDate),
    Symbol(String),
    TrackedSecurities,
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            WorkUnit::Symbol(symbol) => write!(f, "{}", symbol),
            WorkUnit::TrackedSecurities => write!(f, "tracked securities"),
        }
    }
}

/// 从页面提取出的原始记录，字段全部是字符串
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// 缺失字段的占位值，例如 "No title"
    pub fn placeholder(field: &str) -> String {
        format!("No {}", field)
    }

    pub fn is_placeholder(field: &str, value: &str) -> bool {
        value == Self::placeholder(field)
    }

    /// 所有字段都是占位值，说明选择器没有命中任何内容
    pub fn is_blank(&self) -> bool {
        self.fields
            .iter()
            .all(|(field, value)| Self::is_placeholder(field, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 去重用的组合键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    /// 各部分先去掉首尾空白再用 "-" 连接
    pub fn compose<'a, I>(scope: Option<&'a str>, parts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pieces: Vec<&str> = Vec::new();
        if let Some(scope) = scope {
            pieces.push(scope.trim());
        }
        pieces.extend(parts.into_iter().map(str::trim));
        DedupKey(pieces.join("-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 可以写入表格存储的规范化记录
pub trait StoreRecord {
    /// 表头，列顺序固定
    const HEADER: &'static [&'static str];
    /// 参与去重键的列
    const KEY_FIELDS: &'static [&'static str];

    /// 按 HEADER 顺序输出各列的值
    fn to_values(&self) -> Vec<String>;

    /// 组键前对单个字段做规范化，默认只去空白
    fn normalize_key_part(_field: &str, value: &str) -> String {
        value.trim().to_string()
    }

    fn to_row(&self) -> Row {
        Self::HEADER
            .iter()
            .map(|h| h.to_string())
            .zip(self.to_values())
            .collect()
    }

    /// 由持久化行计算去重键；新旧记录都走这一条路径
    fn key_from_row(scope: Option<&str>, row: &Row) -> DedupKey {
        let parts: Vec<String> = Self::KEY_FIELDS
            .iter()
            .map(|field| {
                let value = row.get(*field).map(String::as_str).unwrap_or("");
                Self::normalize_key_part(field, value)
            })
            .collect();
        DedupKey::compose(scope, parts.iter().map(String::as_str))
    }

    fn dedup_key(&self, scope: Option<&str>) -> DedupKey {
        Self::key_from_row(scope, &self.to_row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_trims_every_part() {
        let padded = DedupKey::compose(None, ["2024-01-01 ", "  A"]);
        let clean = DedupKey::compose(None, ["2024-01-01", "A"]);
        assert_eq!(padded, clean);
        assert_eq!(clean.as_str(), "2024-01-01-A");
    }

    #[test]
    fn dedup_key_prefixes_scope() {
        let key = DedupKey::compose(Some("NABIL"), ["2024-01-01"]);
        assert_eq!(key.to_string(), "NABIL-2024-01-01");
    }

    #[test]
    fn blank_record_has_only_placeholders() {
        let blank = RawRecord::new()
            .with("date", &RawRecord::placeholder("date"))
            .with("title", &RawRecord::placeholder("title"));
        assert!(blank.is_blank());

        let partial = blank.clone().with("title", "Bonus share announced");
        assert!(!partial.is_blank());
    }

    #[test]
    fn work_unit_display() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(WorkUnit::Date(day).to_string(), "2024-03-09");
        assert_eq!(WorkUnit::Symbol("NABIL".into()).to_string(), "NABIL");
    }
}
