use crate::config::Config;
use crate::errors::{Result, DataHubError};
use crate::models::{PriceRecord, WorkUnit};
use crate::scrapers::base::FetchClient;
use crate::scrapers::price::{PriceBoard, PriceScraper};
use crate::scrapers::retry::with_retry;
use crate::services::RunSummary;
use crate::store::{CsvPersistence, MergeStore};
use crate::util;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

/// 一只股票的存储
pub struct TrackedSecurity {
    pub symbol: String,
    pub store: MergeStore<PriceRecord>,
}

impl TrackedSecurity {
    /// 最后一行的 published_date，统一成 YYYY-MM-DD
    pub fn last_published(&self) -> Option<String> {
        self.store
            .latest_value("published_date")
            .map(util::canonical_date_text)
    }
}

/// 个股日线服务：价格目录下每个 CSV 文件对应一只股票
pub struct PriceService {
    config: Config,
    client: Arc<dyn FetchClient>,
    persistence: CsvPersistence,
}

impl PriceService {
    pub fn new(config: Config, client: Arc<dyn FetchClient>) -> Self {
        Self {
            config,
            client,
            persistence: CsvPersistence::new(),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let outcome = self.run_top_up().await;
        if let Err(e) = self.client.close().await {
            warn!("Failed to close session: {}", e);
        }
        outcome
    }

    /// 加载价格目录下的全部存储，按文件名排序；任何一个不可读都终止
    pub fn load_securities(&self) -> Result<Vec<TrackedSecurity>> {
        let dir = &self.config.price_dir;
        if !dir.exists() {
            warn!("Price directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "csv"))
            .collect();
        paths.sort();

        let mut securities = Vec::new();
        for path in paths.into_iter().take(self.config.unit_limit()) {
            let Some(symbol) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let store = MergeStore::load(&self.persistence, &path, Some(symbol.as_str()))?;
            securities.push(TrackedSecurity { symbol, store });
        }

        info!("Tracking {} securities in {}", securities.len(), dir.display());
        Ok(securities)
    }

    async fn run_top_up(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let securities = self.load_securities()?;
        if securities.is_empty() {
            return Ok(summary);
        }

        // 最后一行已经是今天的股票不需要抓取
        let today = util::format_date(&self.config.today());
        let (fresh, mut stale): (Vec<_>, Vec<_>) = securities
            .into_iter()
            .partition(|s| s.last_published().as_deref() == Some(today.as_str()));

        for security in &fresh {
            debug!("Skipping {} - Already updated.", security.symbol);
        }
        summary.skipped += fresh.len();

        if stale.is_empty() {
            info!("All {} securities already updated for {}", fresh.len(), today);
            return Ok(summary);
        }

        let unit = WorkUnit::TrackedSecurities;
        summary.units += 1;

        let scraper = PriceScraper::new(&self.config)?;
        let client: &dyn FetchClient = self.client.as_ref();
        let board = match with_retry(
            &unit,
            self.config.max_attempts,
            self.config.retry_delay,
            || scraper.fetch_board(client),
        )
        .await
        {
            Ok(board) => board,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("Error fetching or processing price data: {}", e);
                summary.record_failure(&unit, &e);
                return Ok(summary);
            }
        };

        for security in stale.iter_mut() {
            match self.merge_security(&board, security) {
                Ok(0) => summary.skipped += 1,
                Ok(count) => summary.committed += count,
                Err(e) if e.is_fatal() => return Err(e),
                Err(DataHubError::NoMatchingEntity(msg)) => {
                    warn!("{}", msg);
                    summary.unmatched.push(security.symbol.clone());
                }
                Err(e) => {
                    warn!("Skipping {}: {}", security.symbol, e);
                    summary.record_failure(&WorkUnit::Symbol(security.symbol.clone()), &e);
                }
            }
        }

        let tracked: HashSet<&str> = fresh
            .iter()
            .chain(stale.iter())
            .map(|s| s.symbol.as_str())
            .collect();
        let untracked: Vec<&String> = board
            .rows
            .keys()
            .filter(|symbol| !tracked.contains(symbol.as_str()))
            .collect();
        if !untracked.is_empty() {
            warn!("{} symbols on the board have no store file", untracked.len());
            debug!("Untracked symbols: {:?}", untracked);
        }
        summary.untracked = untracked.len();

        info!(
            "Price run finished: {} updated, {} skipped, {} unmatched",
            summary.committed,
            summary.skipped,
            summary.unmatched.len()
        );
        Ok(summary)
    }

    /// 把行情中该股票的一行合并进它的存储
    fn merge_security(&self, board: &PriceBoard, security: &mut TrackedSecurity) -> Result<usize> {
        let as_of = util::format_date(&board.as_of);
        if security.last_published().as_deref() == Some(as_of.as_str()) {
            info!("Skipping {} - Already updated.", security.symbol);
            return Ok(0);
        }

        let raw = board.get(&security.symbol).ok_or_else(|| {
            DataHubError::NoMatchingEntity(format!(
                "No matching stock data found for {}",
                security.symbol
            ))
        })?;

        let record = PriceRecord::from_raw(board.as_of, raw)?;
        let fresh = security.store.filter_new(vec![record]);
        let count = security.store.commit(&self.persistence, &fresh)?;
        if count > 0 {
            info!("Updated: {}", security.store.path().display());
        }
        Ok(count)
    }
}
