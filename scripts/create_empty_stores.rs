use std::env;
use std::error::Error;
use nepse_datahub::config::Config;
use nepse_datahub::models::{NewsRecord, PriceRecord, StoreRecord};
use nepse_datahub::store::{CsvPersistence, Persistence};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::new();
    let persistence = CsvPersistence::new();

    // 新闻文件只有表头
    persistence.ensure_initialized(&config.news_store, NewsRecord::HEADER)?;
    println!("新闻文件: {}", config.news_store.display());

    // 命令行参数为股票代码，每个代码一个只有表头的文件
    let symbols: Vec<String> = env::args().skip(1).collect();
    for symbol in &symbols {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        let path = config.price_dir.join(format!("{}.csv", symbol));
        persistence.ensure_initialized(&path, PriceRecord::HEADER)?;
        println!("个股文件: {}", path.display());
    }

    println!("成功初始化 {} 个个股文件", symbols.len());
    Ok(())
}
