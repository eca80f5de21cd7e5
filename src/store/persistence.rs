use crate::errors::{Result, DataHubError};
use crate::models::Row;
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// 表格存储的读写接口；存储以文件路径标识
pub trait Persistence {
    /// 读取全部行；文件不存在时返回空
    fn read_all(&self, path: &Path) -> Result<Vec<Row>>;

    /// 按给定顺序追加一批行，整批写入
    fn append_all(&self, path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()>;

    /// 文件不存在时写入仅含表头的文件；已存在则什么都不做
    fn ensure_initialized(&self, path: &Path, header: &[&str]) -> Result<()>;
}

/// 逗号分隔、首行为表头的 CSV 文件
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvPersistence;

impl CsvPersistence {
    pub fn new() -> Self {
        Self
    }

    fn unreadable(path: &Path, reason: impl ToString) -> DataHubError {
        DataHubError::StoreUnreadable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn has_content(path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// 文件非空且最后一个字节不是换行
    fn needs_newline(file: &mut fs::File) -> Result<bool> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

impl Persistence for CsvPersistence {
    fn read_all(&self, path: &Path) -> Result<Vec<Row>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| Self::unreadable(path, e))?;

        let mut rows = Vec::new();
        for result in reader.deserialize::<Row>() {
            let row = result.map_err(|e| Self::unreadable(path, e))?;
            rows.push(row);
        }

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    fn append_all(&self, path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.ensure_initialized(path, header)?;

        // 先在内存里编码整批数据，再一次性写入
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in rows {
            writer.write_record(row)?;
        }
        let encoded = writer
            .into_inner()
            .map_err(|e| DataHubError::DataError(format!("CSV encode failed: {}", e)))?;

        let mut file = OpenOptions::new().read(true).append(true).open(path)?;
        let mut buffer = Vec::with_capacity(encoded.len() + 1);
        if Self::needs_newline(&mut file)? {
            buffer.push(b'\n');
        }
        buffer.extend_from_slice(&encoded);

        file.write_all(&buffer)?;
        file.sync_data()?;
        Ok(())
    }

    fn ensure_initialized(&self, path: &Path, header: &[&str]) -> Result<()> {
        // 0 字节的文件（touch 出来的，或写表头前中断）同样要补表头
        if Self::has_content(path)? {
            return Ok(());
        }

        // 确保目录存在
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(header)?;
        writer.flush()?;
        info!("Initialized CSV file with headers at {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &[&str] = &["Date", "Title"];

    fn row(date: &str, title: &str) -> Vec<String> {
        vec![date.to_string(), title.to_string()]
    }

    #[test]
    fn missing_store_reads_as_empty() {
        let dir = tempdir().unwrap();
        let rows = CsvPersistence::new().read_all(&dir.path().join("none.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn initialize_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("news").join("raw_news.csv");
        let store = CsvPersistence::new();

        store.ensure_initialized(&path, HEADER).unwrap();
        store.append_all(&path, HEADER, &[row("2024-01-01", "A")]).unwrap();
        store.ensure_initialized(&path, HEADER).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Date,Title\n2024-01-01,A\n");
    }

    #[test]
    fn appends_in_order_and_quotes_commas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_news.csv");
        let store = CsvPersistence::new();

        store
            .append_all(&path, HEADER, &[row("2024-01-01", "B"), row("2024-01-01", "Profit up, dividend next")])
            .unwrap();
        let rows = store.read_all(&path).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Title"], "B");
        assert_eq!(rows[1]["Title"], "Profit up, dividend next");
    }

    #[test]
    fn repairs_missing_trailing_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NABIL.csv");
        fs::write(&path, "Date,Title\n2024-01-01,A").unwrap();

        CsvPersistence::new()
            .append_all(&path, HEADER, &[row("2024-01-02", "B")])
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Date,Title\n2024-01-01,A\n2024-01-02,B\n");
    }

    #[test]
    fn zero_byte_store_gets_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_news.csv");
        fs::write(&path, "").unwrap();
        let store = CsvPersistence::new();

        store.append_all(&path, HEADER, &[row("2024-01-01", "A")]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Date,Title\n2024-01-01,A\n");
        assert_eq!(store.read_all(&path).unwrap().len(), 1);

        let other = dir.path().join("NABIL.csv");
        fs::write(&other, "").unwrap();
        store.ensure_initialized(&other, HEADER).unwrap();
        assert_eq!(fs::read_to_string(&other).unwrap(), "Date,Title\n");
    }

    #[test]
    fn ragged_store_is_unreadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        fs::write(&path, "Date,Title\n2024-01-01,A,extra\n").unwrap();

        let err = CsvPersistence::new().read_all(&path).unwrap_err();
        assert!(matches!(err, DataHubError::StoreUnreadable { .. }));
    }
}
