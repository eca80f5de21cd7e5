use crate::config::Config;
use crate::errors::{Result, DataHubError};
use crate::models::{NewsRecord, StoreRecord, WorkUnit};
use crate::scrapers::base::FetchClient;
use crate::scrapers::news::NewsScraper;
use crate::scrapers::retry::with_retry;
use crate::services::RunSummary;
use crate::store::{CsvPersistence, MergeStore, Persistence};
use crate::util;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::sync::Arc;

/// 新闻抓取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsMode {
    /// 从起始日期到今天逐日回补
    Range { start: NaiveDate },
    /// 只抓今天
    Latest,
}

/// 新闻服务：按日期遍历工作单元，抓取、去重、追加
pub struct NewsService {
    config: Config,
    client: Arc<dyn FetchClient>,
    persistence: CsvPersistence,
}

impl NewsService {
    pub fn new(config: Config, client: Arc<dyn FetchClient>) -> Self {
        Self {
            config,
            client,
            persistence: CsvPersistence::new(),
        }
    }

    /// 执行一次运行；无论成功与否都会关闭会话
    pub async fn run(&self, mode: NewsMode) -> Result<RunSummary> {
        let outcome = self.run_units(mode).await;
        if let Err(e) = self.client.close().await {
            warn!("Failed to close session: {}", e);
        }
        outcome
    }

    /// 本次运行要处理的日期
    pub fn dates(&self, mode: NewsMode) -> Vec<NaiveDate> {
        let today = self.config.today();
        match mode {
            NewsMode::Range { start } => util::date_range(start, today)
                .take(self.config.unit_limit())
                .collect(),
            NewsMode::Latest => vec![today],
        }
    }

    async fn run_units(&self, mode: NewsMode) -> Result<RunSummary> {
        let scraper = NewsScraper::new(&self.config)?;
        let path = &self.config.news_store;

        self.persistence.ensure_initialized(path, NewsRecord::HEADER)?;
        let mut store = MergeStore::<NewsRecord>::load(&self.persistence, path, None)?;
        info!("Loaded {} existing news keys from {}", store.len(), path.display());

        let dates = self.dates(mode);
        let mut summary = RunSummary::default();

        for (i, date) in dates.iter().enumerate() {
            if i > 0 && !self.config.inter_unit_delay.is_zero() {
                tokio::time::sleep(self.config.inter_unit_delay).await;
            }

            let unit = WorkUnit::Date(*date);
            summary.units += 1;

            match self.process_date(&scraper, &mut store, &unit, date).await {
                Ok(0) => summary.skipped += 1,
                Ok(count) => summary.committed += count,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    match &e {
                        DataHubError::StructureError(_) => {
                            warn!("Skipping news for {}: {}", unit, e)
                        }
                        _ => error!("Error scraping data for {}: {}", unit, e),
                    }
                    summary.record_failure(&unit, &e);
                }
            }
        }

        info!(
            "News run finished: {} unit(s), {} new item(s), {} failure(s)",
            summary.units,
            summary.committed,
            summary.failures.len()
        );
        Ok(summary)
    }

    async fn process_date(
        &self,
        scraper: &NewsScraper,
        store: &mut MergeStore<NewsRecord>,
        unit: &WorkUnit,
        date: &NaiveDate,
    ) -> Result<usize> {
        let client: &dyn FetchClient = self.client.as_ref();
        let raw = with_retry(
            unit,
            self.config.max_attempts,
            self.config.retry_delay,
            || scraper.fetch_date(client, date),
        )
        .await?;

        let records = NewsScraper::normalize(unit, &raw)?;
        let fresh = store.filter_new(records);
        if fresh.is_empty() {
            info!("No new news items for {}", unit);
            return Ok(0);
        }

        let count = store.commit(&self.persistence, &fresh)?;
        info!("Added {} news items for {}", count, unit);
        Ok(count)
    }
}
