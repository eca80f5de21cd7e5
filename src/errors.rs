use thiserror::Error;
use std::num::ParseFloatError;
use std::time::Duration;

#[derive(Error, Debug)]
pub enum DataHubError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    /// 重试耗尽后的抓取失败
    #[error("Fetch failed for {unit} after {attempts} attempt(s): {cause}")]
    FetchError {
        unit: String,
        attempts: u32,
        #[source]
        cause: Box<DataHubError>,
    },

    /// 页面结构可能已变化，重试无效
    #[error("Structure error: {0}")]
    StructureError(String),

    #[error("Store {path} is unreadable: {reason}")]
    StoreUnreadable { path: String, reason: String },

    #[error("No matching entity: {0}")]
    NoMatchingEntity(String),

    #[error("Pagination stopped at {pages} pages without a terminal page: {url}")]
    PaginationLimit { url: String, pages: usize },

    #[error("Invalid selector: {0}")]
    SelectorError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

impl DataHubError {
    /// 网络、超时、HTTP 状态错误可以重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataHubError::RequestError(_)
                | DataHubError::HttpStatus { .. }
                | DataHubError::Timeout(..)
        )
    }

    /// 存储不可读或本地 IO 失败时，去重保证无法成立，必须终止整个运行
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DataHubError::StoreUnreadable { .. } | DataHubError::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DataHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_failures_are_retryable() {
        assert!(DataHubError::HttpStatus { url: "u".into(), status: 503 }.is_retryable());
        assert!(DataHubError::Timeout(Duration::from_secs(1), "u".into()).is_retryable());
        assert!(!DataHubError::StructureError("layout".into()).is_retryable());
        assert!(!DataHubError::PaginationLimit { url: "u".into(), pages: 500 }.is_retryable());
    }

    #[test]
    fn unreadable_store_is_fatal() {
        let err = DataHubError::StoreUnreadable { path: "a.csv".into(), reason: "bad".into() };
        assert!(err.is_fatal());
        assert!(!DataHubError::NoMatchingEntity("NABIL".into()).is_fatal());
    }
}
