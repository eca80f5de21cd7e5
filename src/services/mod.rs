pub mod news_service;
pub mod price_service;

use crate::errors::DataHubError;
use crate::models::WorkUnit;
use serde::Serialize;

pub use news_service::{NewsMode, NewsService};
pub use price_service::PriceService;

/// 失败的工作单元及原因
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
    pub unit: String,
    pub error: String,
}

/// 一次运行的统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub units: usize,
    pub committed: usize,
    pub skipped: usize,
    pub failures: Vec<UnitFailure>,
    /// 有存储文件但行情中找不到的股票
    pub unmatched: Vec<String>,
    /// 行情中有但没有存储文件的股票数量
    pub untracked: usize,
}

impl RunSummary {
    pub fn record_failure(&mut self, unit: &WorkUnit, error: &DataHubError) {
        self.failures.push(UnitFailure {
            unit: unit.to_string(),
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
