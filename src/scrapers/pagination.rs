use crate::errors::{Result, DataHubError};
use crate::models::RawRecord;
use crate::scrapers::base::{FetchClient, NextLink};
use crate::scrapers::extractor::RecordExtractor;
use log::{debug, info};
use std::time::Duration;

/// 翻页驱动：从第一页开始提取，直到“下一页”不存在或被禁用
pub struct PaginationDriver<'a> {
    client: &'a dyn FetchClient,
    extractor: &'a RecordExtractor,
    content_marker: &'a str,
    next_selector: &'a str,
    content_timeout: Duration,
    navigation_timeout: Duration,
    max_pages: usize,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(
        client: &'a dyn FetchClient,
        extractor: &'a RecordExtractor,
        content_marker: &'a str,
        next_selector: &'a str,
    ) -> Self {
        Self {
            client,
            extractor,
            content_marker,
            next_selector,
            content_timeout: Duration::from_secs(15),
            navigation_timeout: Duration::from_secs(120),
            max_pages: 500,
        }
    }

    pub fn with_timeouts(mut self, content: Duration, navigation: Duration) -> Self {
        self.content_timeout = content;
        self.navigation_timeout = navigation;
        self
    }

    /// 没有“禁用”信号时的安全上限
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// 依次访问所有页面并累积记录；任何一页失败则整体失败
    pub async fn collect(&self, start_url: &str) -> Result<Vec<RawRecord>> {
        let mut page = self.client.load(start_url, self.navigation_timeout).await?;
        let mut records = Vec::new();
        let mut pages = 0usize;

        loop {
            pages += 1;
            self.client
                .wait_for(&page, self.content_marker, self.content_timeout)
                .await?;

            let batch = self.extractor.extract(&page.html);
            debug!("Page {} of {}: {} records", pages, start_url, batch.len());
            records.extend(batch);

            match page.next_link(self.next_selector)? {
                NextLink::Absent | NextLink::Disabled => {
                    info!("Last page reached after {} page(s) for {}", pages, start_url);
                    break;
                }
                NextLink::Href(_) => {
                    if pages >= self.max_pages {
                        return Err(DataHubError::PaginationLimit {
                            url: start_url.to_string(),
                            pages,
                        });
                    }
                    page = self
                        .client
                        .activate(&page, self.next_selector, self.navigation_timeout)
                        .await?;
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::base::Page;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://www.sharesansar.com/category/latest";

    struct Pages {
        pages: HashMap<String, String>,
        visited: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FetchClient for Pages {
        async fn load(&self, url: &str, _timeout: Duration) -> Result<Page> {
            self.visited.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .map(|html| Page::new(url, html.clone()))
                .ok_or_else(|| DataHubError::HttpStatus { url: url.to_string(), status: 404 })
        }
    }

    fn listing(title: &str, next: &str) -> String {
        format!(
            r#"<div class="item"><h4>{}</h4></div><ul><li>{}</li></ul>"#,
            title, next
        )
    }

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(".item", &[("title".to_string(), "h4".to_string())]).unwrap()
    }

    fn client(pages: Vec<(String, String)>) -> Pages {
        Pages {
            pages: pages.into_iter().collect(),
            visited: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn follows_links_until_disabled() {
        let client = client(vec![
            (format!("{}?page=1", BASE), listing("A", r#"<a rel="next" href="?page=2">»</a>"#)),
            (format!("{}?page=2", BASE), listing("B", r#"<a rel="next" class="disabled" href="?page=3">»</a>"#)),
        ]);
        let extractor = extractor();
        let driver = PaginationDriver::new(&client, &extractor, ".item", r#"a[rel="next"]"#);

        let records = driver.collect(&format!("{}?page=1", BASE)).await.unwrap();

        let titles: Vec<_> = records.iter().filter_map(|r| r.get("title")).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(client.visited.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stops_when_next_is_absent() {
        let client = client(vec![(format!("{}?page=1", BASE), listing("A", ""))]);
        let extractor = extractor();
        let driver = PaginationDriver::new(&client, &extractor, ".item", r#"a[rel="next"]"#);

        let records = driver.collect(&format!("{}?page=1", BASE)).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn cap_is_an_error() {
        let client = client(vec![
            (format!("{}?page=1", BASE), listing("A", r#"<a rel="next" href="?page=2">»</a>"#)),
            (format!("{}?page=2", BASE), listing("B", r#"<a rel="next" href="?page=1">»</a>"#)),
        ]);
        let extractor = extractor();
        let driver = PaginationDriver::new(&client, &extractor, ".item", r#"a[rel="next"]"#)
            .with_max_pages(3);

        let result = driver.collect(&format!("{}?page=1", BASE)).await;
        assert!(matches!(result, Err(DataHubError::PaginationLimit { pages: 3, .. })));
        assert_eq!(client.visited.lock().unwrap().len(), 3);
    }
}
