// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod store;
pub mod services;

// 抓取与工具模块主要供二进制程序使用
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::{NewsRecord, PriceRecord, PriceStatus, RawRecord, WorkUnit};
pub use config::Config;
pub use services::{NewsMode, NewsService, PriceService, RunSummary};
pub use errors::{Result, DataHubError};
