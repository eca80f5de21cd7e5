use crate::config::{Config, PriceSourceConfig};
use crate::errors::{Result, DataHubError};
use crate::models::{PriceRecord, RawRecord};
use crate::scrapers::base::FetchClient;
use crate::scrapers::extractor::TableExtractor;
use crate::util;
use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::time::Duration;

/// 当日行情：页面声明的交易日期 + 按股票代码索引的行
#[derive(Debug, Clone)]
pub struct PriceBoard {
    pub as_of: NaiveDate,
    pub rows: HashMap<String, RawRecord>,
}

impl PriceBoard {
    pub fn get(&self, symbol: &str) -> Option<&RawRecord> {
        self.rows.get(symbol)
    }
}

/// 当日股价页抓取器，不分页
pub struct PriceScraper {
    source: PriceSourceConfig,
    table: TableExtractor,
    content_timeout: Duration,
    navigation_timeout: Duration,
}

impl PriceScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let source = config.price_source.clone();
        let table = TableExtractor::new(
            &source.header_selector,
            &source.row_selector,
            &source.cell_selector,
        )?;
        Ok(Self {
            source,
            table,
            content_timeout: config.content_timeout,
            navigation_timeout: config.navigation_timeout,
        })
    }

    pub async fn fetch_board(&self, client: &dyn FetchClient) -> Result<PriceBoard> {
        info!("Fetching price board from {}", self.source.url);
        let page = client.load(&self.source.url, self.navigation_timeout).await?;
        client
            .wait_for(&page, &self.source.row_selector, self.content_timeout)
            .await?;

        let as_of_text = page.text_of(&self.source.as_of_selector)?.ok_or_else(|| {
            DataHubError::StructureError(format!(
                "trading date {} not found on {}",
                self.source.as_of_selector, page.url
            ))
        })?;
        let first_token = as_of_text.split_whitespace().next().unwrap_or("");
        let as_of = util::normalize_date(first_token).map_err(|_| {
            DataHubError::StructureError(format!("unrecognized trading date {:?}", as_of_text))
        })?;

        // 列名变了就不能按列取值，整个页面按结构错误处理
        let headers = self.table.headers(&page.html);
        let missing: Vec<&str> = std::iter::once(self.source.symbol_column.as_str())
            .chain(PriceRecord::BOARD_COLUMNS.iter().copied())
            .filter(|column| !headers.iter().any(|h| h == column))
            .collect();
        if !missing.is_empty() {
            return Err(DataHubError::StructureError(format!(
                "price board columns {:?} not found on {}",
                missing, page.url
            )));
        }

        let mut rows = HashMap::new();
        for row in self.table.extract(&page.html) {
            let symbol = match row.get(&self.source.symbol_column) {
                Some(symbol) if !symbol.trim().is_empty() => symbol.trim().to_string(),
                _ => continue,
            };
            rows.insert(symbol, row);
        }

        if rows.is_empty() {
            return Err(DataHubError::StructureError(
                "No stock data extracted. The page structure might have changed.".to_string(),
            ));
        }

        info!("Extracted {} rows of stock data for {}", rows.len(), as_of);
        Ok(PriceBoard { as_of, rows })
    }
}
