use chrono::NaiveDate;
use std::fmt;
use crate::errors::{Result, DataHubError};
use crate::models::record::{RawRecord, StoreRecord};
use crate::util;

/// 涨跌状态，由开盘价和收盘价推导
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStatus {
    Up,
    Down,
    Unchanged,
}

impl PriceStatus {
    pub fn derive(open: f64, close: f64) -> Self {
        if close > open {
            PriceStatus::Up
        } else if close < open {
            PriceStatus::Down
        } else {
            PriceStatus::Unchanged
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceStatus::Up => "up",
            PriceStatus::Down => "down",
            PriceStatus::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for PriceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日线数据结构
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub published_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub diff_pct: f64,
    pub volume: f64,
    pub turnover: f64,
    pub status: PriceStatus,
}

impl PriceRecord {
    /// 行情表中必须存在的列
    pub const BOARD_COLUMNS: &'static [&'static str] =
        &["Open", "High", "Low", "Close", "Diff %", "Vol", "Turnover"];

    /// 行情表中的一行 -> 规范化日线记录。
    /// 单元格为 "-" 时记为 0，整列缺失则是页面结构问题
    pub fn from_raw(published_date: NaiveDate, raw: &RawRecord) -> Result<Self> {
        let number = |field: &str| match raw.get(field) {
            Some(value) => util::parse_number(value),
            None => Err(DataHubError::StructureError(format!(
                "price column {:?} missing from board row",
                field
            ))),
        };

        let open = number("Open")?;
        let close = number("Close")?;

        Ok(Self {
            published_date,
            open,
            high: number("High")?,
            low: number("Low")?,
            close,
            diff_pct: number("Diff %")?,
            volume: number("Vol")?,
            turnover: number("Turnover")?,
            status: PriceStatus::derive(open, close),
        })
    }
}

impl StoreRecord for PriceRecord {
    const HEADER: &'static [&'static str] = &[
        "published_date",
        "Open",
        "High",
        "Low",
        "Close",
        "Diff %",
        "Vol",
        "Turnover",
        "Status",
    ];
    const KEY_FIELDS: &'static [&'static str] = &["published_date"];

    fn to_values(&self) -> Vec<String> {
        vec![
            util::format_date(&self.published_date),
            self.open.to_string(),
            self.high.to_string(),
            self.low.to_string(),
            self.close.to_string(),
            self.diff_pct.to_string(),
            self.volume.to_string(),
            self.turnover.to_string(),
            self.status.to_string(),
        ]
    }

    fn normalize_key_part(field: &str, value: &str) -> String {
        match field {
            "published_date" => util::canonical_date_text(value),
            _ => value.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_open_close() {
        assert_eq!(PriceStatus::derive(100.0, 110.0).as_str(), "up");
        assert_eq!(PriceStatus::derive(110.0, 100.0).as_str(), "down");
        assert_eq!(PriceStatus::derive(100.0, 100.0).as_str(), "unchanged");
    }

    #[test]
    fn converts_board_row() {
        let raw = RawRecord::new()
            .with("Symbol", "NABIL")
            .with("Open", "1,200.00")
            .with("High", "1,250.5")
            .with("Low", "1,190")
            .with("Close", "1,180")
            .with("Diff %", "-1.67")
            .with("Vol", "12,345")
            .with("Turnover", "14,567,890.25");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let record = PriceRecord::from_raw(day, &raw).unwrap();

        assert_eq!(record.open, 1200.0);
        assert_eq!(record.turnover, 14_567_890.25);
        assert_eq!(record.status, PriceStatus::Down);
        assert_eq!(
            record.to_values(),
            vec!["2024-01-01", "1200", "1250.5", "1190", "1180", "-1.67", "12345", "14567890.25", "down"]
        );
        assert_eq!(record.dedup_key(Some("NABIL")).as_str(), "NABIL-2024-01-01");
    }

    #[test]
    fn missing_column_is_a_structure_error() {
        let raw = RawRecord::new()
            .with("Open Price", "1,200")
            .with("High", "1,250")
            .with("Low", "1,190")
            .with("LTP", "1,240")
            .with("Diff %", "3.3")
            .with("Vol", "100")
            .with("Turnover", "1,000");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            PriceRecord::from_raw(day, &raw),
            Err(DataHubError::StructureError(_))
        ));
    }

    #[test]
    fn dash_cell_counts_as_zero() {
        let raw = RawRecord::new()
            .with("Open", "100")
            .with("High", "100")
            .with("Low", "100")
            .with("Close", "100")
            .with("Diff %", "-")
            .with("Vol", "0")
            .with("Turnover", "-");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let record = PriceRecord::from_raw(day, &raw).unwrap();
        assert_eq!(record.diff_pct, 0.0);
        assert_eq!(record.status, PriceStatus::Unchanged);
    }

    #[test]
    fn rejects_garbage_numbers() {
        let raw = RawRecord::new().with("Open", "n/a").with("Close", "10");
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(PriceRecord::from_raw(day, &raw).is_err());
    }
}
