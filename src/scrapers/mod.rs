pub mod base;
pub mod extractor;
pub mod http;
pub mod news;
pub mod pagination;
pub mod price;
pub mod retry;

pub use base::{FetchClient, NextLink, Page};
pub use http::HttpSession;
pub use retry::with_retry;
