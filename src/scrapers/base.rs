use crate::errors::{Result, DataHubError};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// 已加载的页面：最终 URL 与 HTML 内容
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: String,
}

/// 翻页按钮的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLink {
    Absent,
    Disabled,
    Href(String),
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| DataHubError::SelectorError(format!("{}: {:?}", selector, e)))
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    pub fn contains(&self, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        Ok(self.document().select(&selector).next().is_some())
    }

    /// 第一个匹配元素的文本（去掉首尾空白）
    pub fn text_of(&self, selector: &str) -> Result<Option<String>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .document()
            .select(&selector)
            .next()
            .map(|el| element_text(&el)))
    }

    /// 检查“下一页”：不存在、被禁用（自身或父元素带 disabled），或给出链接
    pub fn next_link(&self, selector: &str) -> Result<NextLink> {
        let selector = parse_selector(selector)?;
        let document = self.document();
        let Some(next) = document.select(&selector).next() else {
            return Ok(NextLink::Absent);
        };

        let parent_disabled = next
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| is_disabled(&p))
            .unwrap_or(false);
        if is_disabled(&next) || parent_disabled {
            return Ok(NextLink::Disabled);
        }

        match next.value().attr("href").map(str::trim) {
            Some(href) if !href.is_empty() && href != "#" => Ok(NextLink::Href(href.to_string())),
            _ => Ok(NextLink::Disabled),
        }
    }

    /// 相对链接按当前页面 URL 解析
    pub fn resolve(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.url)
            .map_err(|e| DataHubError::DataError(format!("Invalid page url {}: {}", self.url, e)))?;
        let target = base
            .join(href)
            .map_err(|e| DataHubError::DataError(format!("Invalid link {}: {}", href, e)))?;
        Ok(target.to_string())
    }
}

fn is_disabled(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    value.classes().any(|c| c == "disabled")
        || value.attr("aria-disabled") == Some("true")
        || value.attr("disabled").is_some()
}

/// 元素文本，内部连续空白压缩成一个空格
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 页面获取/渲染会话。整个进程只打开一次，结束时关闭
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// 加载 URL，等待导航完成（有超时）
    async fn load(&self, url: &str, timeout: Duration) -> Result<Page>;

    /// 等待内容标记出现；静态 HTML 只需检查一次
    async fn wait_for(&self, page: &Page, marker: &str, _timeout: Duration) -> Result<()> {
        if page.contains(marker)? {
            Ok(())
        } else {
            Err(DataHubError::StructureError(format!(
                "content marker {} not found on {}",
                marker, page.url
            )))
        }
    }

    /// 激活选择器指向的链接并加载目标页
    async fn activate(&self, page: &Page, selector: &str, timeout: Duration) -> Result<Page> {
        match page.next_link(selector)? {
            NextLink::Href(href) => {
                let url = page.resolve(&href)?;
                self.load(&url, timeout).await
            }
            _ => Err(DataHubError::StructureError(format!(
                "{} is not an active link on {}",
                selector, page.url
            ))),
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
