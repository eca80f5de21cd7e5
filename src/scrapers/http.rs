use crate::config::Config;
use crate::errors::{Result, DataHubError};
use crate::scrapers::base::{FetchClient, Page};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// 基于 reqwest 的页面会话，带请求频率限制
pub struct HttpSession {
    client: Client,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpSession {
    /// 打开会话
    pub fn open(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.navigation_timeout)
            .build()
            .map_err(DataHubError::RequestError)?;

        info!("HTTP session opened");
        Ok(Self {
            client,
            request_interval: config.request_interval,
            last_request: Mutex::new(None),
        })
    }

    // 添加请求限速机制
    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(time) = *last {
            let elapsed = time.elapsed();
            if elapsed < self.request_interval {
                let wait_time = self.request_interval - elapsed;
                debug!("等待 {:?} 以遵守频率限制", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[async_trait]
impl FetchClient for HttpSession {
    async fn load(&self, url: &str, timeout: Duration) -> Result<Page> {
        self.wait_for_rate_limit().await;
        debug!("GET {}", url);

        let fetch = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(DataHubError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            let final_url = response.url().to_string();
            let html = response.text().await?;
            Ok::<Page, DataHubError>(Page::new(final_url, html))
        };

        match tokio::time::timeout(timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(DataHubError::Timeout(timeout, url.to_string())),
        }
    }

    async fn close(&self) -> Result<()> {
        info!("HTTP session closed");
        Ok(())
    }
}
