use crate::config::{Config, NewsSourceConfig};
use crate::errors::{Result, DataHubError};
use crate::models::{NewsRecord, RawRecord, WorkUnit};
use crate::scrapers::base::FetchClient;
use crate::scrapers::extractor::RecordExtractor;
use crate::scrapers::pagination::PaginationDriver;
use crate::util;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Url;
use std::time::Duration;

/// 按日期抓取新闻列表（含翻页）
pub struct NewsScraper {
    source: NewsSourceConfig,
    extractor: RecordExtractor,
    content_timeout: Duration,
    navigation_timeout: Duration,
    max_pages: usize,
}

impl NewsScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let source = config.news_source.clone();
        let extractor = RecordExtractor::new(&source.item_selector, &source.field_selectors)?;
        Ok(Self {
            source,
            extractor,
            content_timeout: config.content_timeout,
            navigation_timeout: config.navigation_timeout,
            max_pages: config.max_pages,
        })
    }

    /// 某一天的列表页地址，例如 .../category/latest?date=2024-01-01
    pub fn listing_url(&self, date: &NaiveDate) -> Result<String> {
        let url = Url::parse_with_params(
            &self.source.listing_url,
            &[(self.source.date_param.as_str(), util::format_date(date))],
        )
        .map_err(|e| DataHubError::DataError(format!("Invalid listing url: {}", e)))?;
        Ok(url.to_string())
    }

    /// 抓取某一天所有页面的原始记录
    pub async fn fetch_date(&self, client: &dyn FetchClient, date: &NaiveDate) -> Result<Vec<RawRecord>> {
        let url = self.listing_url(date)?;
        debug!("Scraping news for {} from {}", date, url);

        PaginationDriver::new(
            client,
            &self.extractor,
            &self.source.content_marker,
            &self.source.next_selector,
        )
        .with_timeouts(self.content_timeout, self.navigation_timeout)
        .with_max_pages(self.max_pages)
        .collect(&url)
        .await
    }

    /// 规范化一个工作单元的全部记录。
    /// 整个单元没有提取到任何有效字段时视为页面结构变化
    pub fn normalize(unit: &WorkUnit, raw: &[RawRecord]) -> Result<Vec<NewsRecord>> {
        if raw.is_empty() || raw.iter().all(RawRecord::is_blank) {
            return Err(DataHubError::StructureError(format!(
                "no news fields extracted for {}",
                unit
            )));
        }

        let mut records = Vec::with_capacity(raw.len());
        for item in raw {
            match NewsRecord::from_raw(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping news item for {}: {} ({:?})", unit, e, item),
            }
        }
        Ok(records)
    }
}
