#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use nepse_datahub::config::Config;
use nepse_datahub::errors::{DataHubError, Result};
use nepse_datahub::scrapers::base::{FetchClient, Page};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const LISTING: &str = "https://www.sharesansar.com/category/latest";
pub const PRICE_BOARD: &str = "https://www.sharesansar.com/today-share-price";

pub enum Script {
    Html(String),
    Fail,
}

/// 按 URL 返回预设页面，并记录每一次请求
#[derive(Default)]
pub struct ScriptedClient {
    pages: HashMap<String, Script>,
    requests: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), Script::Html(html));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Script::Fail);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchClient for ScriptedClient {
    async fn load(&self, url: &str, timeout: Duration) -> Result<Page> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(Script::Html(html)) => Ok(Page::new(url, html.clone())),
            Some(Script::Fail) => Err(DataHubError::Timeout(timeout, url.to_string())),
            None => Err(DataHubError::HttpStatus { url: url.to_string(), status: 404 }),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_config(dir: &Path, today: NaiveDate) -> Config {
    Config::new()
        .with_data_dir(dir)
        .with_today(today)
        .with_inter_unit_delay(Duration::ZERO)
        .with_retry_delay(Duration::ZERO)
}

pub fn listing_url(date: &str) -> String {
    format!("{}?date={}", LISTING, date)
}

pub fn listing_page_url(date: &str, page: usize) -> String {
    format!("{}?date={}&page={}", LISTING, date, page)
}

/// 新闻列表页；next 为 None 时“下一页”按钮被禁用
pub fn listing_html(items: &[(&str, &str)], next: Option<&str>) -> String {
    let mut body = String::new();
    for (date, title) in items {
        body.push_str(&format!(
            r#"<div class="featured-news-list"><a href="/newsdetail/x"><h4>{}</h4></a><p>{}</p></div>"#,
            title, date
        ));
    }
    let pager = match next {
        Some(href) => format!(
            r#"<ul class="pagination"><li class="page-item"><a class="page-link" rel="next" href="{}">&raquo;</a></li></ul>"#,
            href.replace('&', "&amp;")
        ),
        None => r##"<ul class="pagination"><li class="page-item disabled"><a class="page-link" rel="next" href="#">&raquo;</a></li></ul>"##
            .to_string(),
    };
    format!("<html><body><div class=\"listing\">{}</div>{}</body></html>", body, pager)
}

pub const BOARD_HEADERS: [&str; 8] = ["Symbol", "Open", "High", "Low", "Close", "Diff %", "Vol", "Turnover"];

/// 当日行情页
pub fn price_board_html(as_of: &str, rows: &[[&str; 8]]) -> String {
    price_board_html_with(&BOARD_HEADERS, as_of, rows)
}

/// 自定义表头的行情页
pub fn price_board_html_with(headers: &[&str], as_of: &str, rows: &[[&str; 8]]) -> String {
    let head: String = headers.iter().map(|h| format!("<th>{}</th>", h)).collect();
    let mut body = String::new();
    for row in rows {
        body.push_str("<tr>");
        for cell in row {
            body.push_str(&format!("<td>{}</td>", cell));
        }
        body.push_str("</tr>");
    }
    format!(
        r#"<html><body>
        <span class="text-org">{} 15:00:00</span>
        <table>
          <thead><tr>{}</tr></thead>
          <tbody>{}</tbody>
        </table></body></html>"#,
        as_of, head, body
    )
}
