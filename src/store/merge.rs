use crate::errors::Result;
use crate::models::{DedupKey, Row, StoreRecord};
use crate::store::persistence::Persistence;
use log::{debug, info};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// 单个存储的去重合并器。已知键集合只在启动时从文件读取一次，
/// 之后每次提交都同步更新，运行期间不再回读文件
pub struct MergeStore<R> {
    path: PathBuf,
    scope: Option<String>,
    known: HashSet<DedupKey>,
    last_row: Option<Row>,
    _record: PhantomData<R>,
}

impl<R: StoreRecord> MergeStore<R> {
    /// 读取已有记录，计算键集合；文件不存在时为空集合
    pub fn load<P: Persistence + ?Sized>(
        persistence: &P,
        path: impl Into<PathBuf>,
        scope: Option<&str>,
    ) -> Result<Self> {
        let path = path.into();
        let rows = persistence.read_all(&path)?;
        let known: HashSet<DedupKey> = rows
            .iter()
            .map(|row| R::key_from_row(scope, row))
            .collect();

        debug!("Loaded {} keys from {}", known.len(), path.display());
        Ok(Self {
            path,
            scope: scope.map(str::to_string),
            known,
            last_row: rows.into_iter().last(),
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn contains(&self, record: &R) -> bool {
        self.known.contains(&record.dedup_key(self.scope.as_deref()))
    }

    /// 最近一次写入的行中某列的值（去掉空白）
    pub fn latest_value(&self, field: &str) -> Option<&str> {
        self.last_row
            .as_ref()
            .and_then(|row| row.get(field))
            .map(|v| v.trim())
    }

    /// 过滤掉已存在的记录；同一批里重复的记录只保留第一条
    pub fn filter_new(&self, records: Vec<R>) -> Vec<R> {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter(|record| {
                let key = record.dedup_key(self.scope.as_deref());
                !self.known.contains(&key) && seen.insert(key)
            })
            .collect()
    }

    /// 整批追加，成功后把新键并入已知集合。返回写入条数
    pub fn commit<P: Persistence + ?Sized>(&mut self, persistence: &P, records: &[R]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let values: Vec<Vec<String>> = records.iter().map(R::to_values).collect();
        persistence.append_all(&self.path, R::HEADER, &values)?;

        for record in records {
            self.known.insert(record.dedup_key(self.scope.as_deref()));
        }
        if let Some(last) = records.last() {
            self.last_row = Some(last.to_row());
        }

        info!("Appended {} records to {}", records.len(), self.path.display());
        Ok(records.len())
    }
}
