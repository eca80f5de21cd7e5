use nepse_datahub::config::Config;
use nepse_datahub::scrapers::base::FetchClient;
use nepse_datahub::scrapers::http::HttpSession;
use nepse_datahub::services::{NewsMode, NewsService, PriceService, RunSummary};
use nepse_datahub::store::{CsvPersistence, Persistence};

use anyhow::{anyhow, Context};
use clap::{App, Arg, SubCommand};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// inspect 子命令输出的存储概要
#[derive(Serialize)]
struct StoreSummary {
    path: String,
    records: usize,
    first: Option<HashMap<String, String>>,
    last: Option<HashMap<String, String>>,
}

fn report(summary: &RunSummary) {
    match serde_json::to_string(summary) {
        Ok(json) => info!("Run summary: {}", json),
        Err(e) => warn!("Failed to encode run summary: {}", e),
    }
    if summary.has_failures() {
        warn!("{} unit(s) failed; they will be retried on the next run", summary.failures.len());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    // 创建基本的命令行应用
    let app = App::new("NEPSE DataHub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Incremental NEPSE news and daily price collector")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Root data directory (news/ and company-wise/ live below it)")
                .takes_value(true)
                .global(true),
        );

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app.arg(
        Arg::with_name("debug")
            .long("debug")
            .help("Enable debug mode")
            .takes_value(false)
            .global(true),
    )
    .arg(
        Arg::with_name("debug-limit")
            .long("debug-limit")
            .help("Limit the number of work units to process in debug mode")
            .takes_value(true)
            .default_value("2")
            .global(true),
    );

    // 添加子命令
    let app = app
        .subcommand(
            SubCommand::with_name("news")
                .about("Scrape daily news listings into the news store")
                .arg(
                    Arg::with_name("mode")
                        .short('m')
                        .long("mode")
                        .value_name("MODE")
                        .help("range: backfill from the start date; latest: today only")
                        .possible_values(["range", "latest"])
                        .takes_value(true)
                        .default_value("latest"),
                )
                .arg(
                    Arg::with_name("start")
                        .short('s')
                        .long("start")
                        .value_name("DATE")
                        .help("First date to backfill in range mode (YYYY-MM-DD)")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("prices")
                .about("Append today's price bar to every tracked security store"),
        )
        .subcommand(
            SubCommand::with_name("inspect")
                .about("Print a JSON summary of a store file")
                .arg(
                    Arg::with_name("store")
                        .long("store")
                        .value_name("PATH")
                        .help("Store file to inspect")
                        .required(true)
                        .takes_value(true),
                ),
        );

    let matches = app.get_matches();

    // 获取调试模式设置
    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_unit_limit = matches.value_of("debug-limit")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or(2);
    #[cfg(not(debug_assertions))]
    let debug_unit_limit = usize::MAX;

    let mut config = Config::new()
        .with_debug_mode(debug_mode)
        .with_debug_unit_limit(debug_unit_limit);
    if let Some(dir) = matches.value_of("data-dir") {
        config = config.with_data_dir(PathBuf::from(dir));
    }

    if let Some(matches) = matches.subcommand_matches("news") {
        let mode = match matches.value_of("mode").unwrap_or("latest") {
            "range" => {
                let start = match matches.value_of("start") {
                    Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .with_context(|| format!("invalid --start date: {}", s))?,
                    None => config.news_start_date,
                };
                NewsMode::Range { start }
            }
            _ => NewsMode::Latest,
        };

        info!("Running news scraper in {:?} mode, store {}", mode, config.news_store.display());
        let session: Arc<dyn FetchClient> = Arc::new(HttpSession::open(&config)?);
        let service = NewsService::new(config, session);
        let summary = service.run(mode).await?;
        report(&summary);
    } else if matches.subcommand_matches("prices").is_some() {
        info!("Running price top-up over {}", config.price_dir.display());
        let session: Arc<dyn FetchClient> = Arc::new(HttpSession::open(&config)?);
        let service = PriceService::new(config, session);
        let summary = service.run().await?;
        report(&summary);
    } else if let Some(matches) = matches.subcommand_matches("inspect") {
        let path = PathBuf::from(
            matches
                .value_of("store")
                .ok_or_else(|| anyhow!("--store is required"))?,
        );
        let rows = CsvPersistence::new().read_all(&path)?;
        let summary = StoreSummary {
            path: path.display().to_string(),
            records: rows.len(),
            first: rows.first().cloned(),
            last: rows.last().cloned(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
