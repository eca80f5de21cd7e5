use crate::errors::Result;
use crate::models::RawRecord;
use crate::scrapers::base::{element_text, parse_selector};
use scraper::{Html, Selector};

/// 按“条目选择器 + 字段选择器”从列表页提取原始记录
pub struct RecordExtractor {
    item: Selector,
    fields: Vec<(String, Selector)>,
}

impl RecordExtractor {
    pub fn new(item_selector: &str, field_selectors: &[(String, String)]) -> Result<Self> {
        let item = parse_selector(item_selector)?;
        let fields = field_selectors
            .iter()
            .map(|(field, selector)| -> Result<(String, Selector)> {
                Ok((field.clone(), parse_selector(selector)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { item, fields })
    }

    /// 惰性遍历文档中的条目；缺失字段填占位值，不丢弃条目
    pub fn records<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = RawRecord> + 'a {
        document.select(&self.item).map(move |item| {
            let mut record = RawRecord::new();
            for (field, selector) in &self.fields {
                let value = item
                    .select(selector)
                    .next()
                    .map(|el| element_text(&el))
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| RawRecord::placeholder(field));
                record.insert(field.as_str(), value);
            }
            record
        })
    }

    pub fn extract(&self, html: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let records: Vec<RawRecord> = self.records(&document).collect();
        records
    }
}

/// 表格提取：表头文字作为字段名，逐行映射单元格
pub struct TableExtractor {
    header: Selector,
    row: Selector,
    cell: Selector,
}

impl TableExtractor {
    pub fn new(header_selector: &str, row_selector: &str, cell_selector: &str) -> Result<Self> {
        Ok(Self {
            header: parse_selector(header_selector)?,
            row: parse_selector(row_selector)?,
            cell: parse_selector(cell_selector)?,
        })
    }

    /// 表头文字，按列顺序
    pub fn headers(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        self.header_texts(&document)
    }

    fn header_texts(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.header)
            .map(|th| element_text(&th))
            .collect()
    }

    pub fn extract(&self, html: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);
        let headers = self.header_texts(&document);

        let records: Vec<RawRecord> = document
            .select(&self.row)
            .map(|row| {
                let mut record = RawRecord::new();
                for (i, cell) in row.select(&self.cell).enumerate() {
                    if let Some(name) = headers.get(i) {
                        record.insert(name.as_str(), element_text(&cell));
                    }
                }
                record
            })
            .filter(|record| !record.is_empty())
            .collect();
        records
    }
}
