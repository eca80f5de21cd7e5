use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

/// 新闻列表页的抓取配置
#[derive(Debug, Clone)]
pub struct NewsSourceConfig {
    pub listing_url: String,
    pub date_param: String,
    pub item_selector: String,
    /// 字段名 -> 选择器
    pub field_selectors: Vec<(String, String)>,
    pub content_marker: String,
    pub next_selector: String,
}

impl Default for NewsSourceConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://www.sharesansar.com/category/latest".to_string(),
            date_param: "date".to_string(),
            item_selector: ".featured-news-list".to_string(),
            field_selectors: vec![
                ("date".to_string(), "p".to_string()),
                ("title".to_string(), "h4".to_string()),
            ],
            content_marker: ".featured-news-list".to_string(),
            next_selector: r#"a[rel="next"]"#.to_string(),
        }
    }
}

/// 当日行情页的抓取配置
#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    pub url: String,
    pub as_of_selector: String,
    pub header_selector: String,
    pub row_selector: String,
    pub cell_selector: String,
    pub symbol_column: String,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: "https://www.sharesansar.com/today-share-price".to_string(),
            as_of_selector: "span.text-org".to_string(),
            header_selector: "table thead th".to_string(),
            row_selector: "table tbody tr".to_string(),
            cell_selector: "td".to_string(),
            symbol_column: "Symbol".to_string(),
        }
    }
}

pub struct Config {
    pub debug_mode: bool,
    pub debug_unit_limit: usize,
    pub data_dir: PathBuf,
    pub news_store: PathBuf,
    pub price_dir: PathBuf,
    pub news_start_date: NaiveDate,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub inter_unit_delay: Duration,
    pub content_timeout: Duration,
    pub navigation_timeout: Duration,
    pub max_pages: usize,
    pub request_interval: Duration,
    pub user_agent: String,
    pub timezone: Tz,
    pub today: Option<NaiveDate>,
    pub news_source: NewsSourceConfig,
    pub price_source: PriceSourceConfig,
}

impl Config {
    pub fn new() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            debug_mode: false,
            debug_unit_limit: 10,
            news_store: data_dir.join("news").join("raw_news.csv"),
            price_dir: data_dir.join("company-wise"),
            data_dir,
            news_start_date: NaiveDate::from_ymd_opt(2019, 11, 17).unwrap_or(NaiveDate::MIN),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            inter_unit_delay: Duration::from_secs(3),
            content_timeout: Duration::from_secs(15),
            navigation_timeout: Duration::from_secs(120),
            max_pages: 500,
            request_interval: Duration::from_millis(500),
            user_agent: "Mozilla/5.0".to_string(),
            timezone: chrono_tz::Asia::Kathmandu,
            today: None,
            news_source: NewsSourceConfig::default(),
            price_source: PriceSourceConfig::default(),
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_unit_limit(mut self, limit: usize) -> Self {
        self.debug_unit_limit = limit;
        self
    }

    /// 修改数据目录，新闻文件与个股目录随之移动
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.news_store = dir.join("news").join("raw_news.csv");
        self.price_dir = dir.join("company-wise");
        self.data_dir = dir;
        self
    }

    pub fn with_news_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.news_store = path.into();
        self
    }

    pub fn with_price_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.price_dir = dir.into();
        self
    }

    pub fn with_news_start_date(mut self, date: NaiveDate) -> Self {
        self.news_start_date = date;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_inter_unit_delay(mut self, delay: Duration) -> Self {
        self.inter_unit_delay = delay;
        self
    }

    pub fn with_content_timeout(mut self, timeout: Duration) -> Self {
        self.content_timeout = timeout;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max.max(1);
        self
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// 固定“今天”，用于可复现的运行和测试
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_news_source(mut self, source: NewsSourceConfig) -> Self {
        self.news_source = source;
        self
    }

    pub fn with_price_source(mut self, source: PriceSourceConfig) -> Self {
        self.price_source = source;
        self
    }

    /// 市场时区下的当前日期
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| Utc::now().with_timezone(&self.timezone).date_naive())
    }

    /// 调试模式下限制处理的工作单元数量
    pub fn unit_limit(&self) -> usize {
        if self.debug_mode {
            self.debug_unit_limit
        } else {
            usize::MAX
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
