use std::error::Error;
use std::fs;
use chrono::NaiveDate;
use nepse_datahub::config::Config;
use nepse_datahub::store::{CsvPersistence, Persistence};
use nepse_datahub::util;

fn main() -> Result<(), Box<dyn Error>> {
    // 检查个股目录是否存在
    let config = Config::new();
    let price_dir = &config.price_dir;
    if !price_dir.exists() {
        return Err("个股数据目录不存在，请先运行 'cargo run -- prices'".into());
    }

    let persistence = CsvPersistence::new();
    let mut latest: Option<NaiveDate> = None;
    let mut stores = 0;

    // 每个文件只看最后一行
    for entry in fs::read_dir(price_dir)? {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "csv") {
            continue;
        }
        stores += 1;

        let rows = persistence.read_all(&path)?;
        let last_date = rows
            .last()
            .and_then(|row| row.get("published_date"))
            .and_then(|value| util::normalize_date(value).ok());

        if let Some(date) = last_date {
            if latest.map_or(true, |current| date > current) {
                latest = Some(date);
            }
        }
    }

    match latest {
        Some(date) => println!("最新交易日期: {} ({} 个文件)", date, stores),
        None => println!("未找到有效的日期"),
    }

    Ok(())
}
