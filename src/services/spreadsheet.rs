//! 表格启发式 - 业务能力层
//!
//! 下载页面链接的 CSV / XLS(X) 文件：
//! - 页面提到 "sum" 时，返回第一个数值列的整数和
//! - 否则返回所有行（列名 → 单元格）
//!
//! 这是固定规则，不保证与题目真正的问题一致。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::infrastructure::HttpClient;

/// 读表时按缺失值处理的单元格文本（与 pandas 默认的 NA 标记一致）
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 表格文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Excel,
}

impl TableFormat {
    /// 按地址扩展名判断格式
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.ends_with(".csv") {
            Some(TableFormat::Csv)
        } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") {
            Some(TableFormat::Excel)
        } else {
            None
        }
    }
}

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl Cell {
    /// CSV 单元格按数字优先推断
    fn infer(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() || NA_MARKERS.contains(&s) {
            Cell::Empty
        } else if let Ok(i) = s.parse::<i64>() {
            Cell::Int(i)
        } else if let Some(f) = s.parse::<f64>().ok().filter(|f| !f.is_nan()) {
            Cell::Float(f)
        } else {
            Cell::Text(raw.to_string())
        }
    }

    fn from_excel(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Int(*i),
            // xlsx 把整数也存成浮点
            Data::Float(f) if is_integral(*f) => Cell::Int(*f as i64),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) if NA_MARKERS.contains(&s.trim()) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Empty | Data::Error(_) => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// 列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Other,
}

/// 解析后的表格，首行为列名
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_csv(bytes: &[u8]) -> Result<Self, String> {
        let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            let mut row: Vec<Cell> = record.iter().map(Cell::infer).collect();
            row.resize(columns.len(), Cell::Empty);
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn from_excel(bytes: &[u8]) -> Result<Self, String> {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| e.to_string())?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| "工作簿没有工作表".to_string())?
            .map_err(|e| e.to_string())?;

        let mut iter = range.rows();
        let columns: Vec<String> = match iter.next() {
            Some(header) => header.iter().map(|c| c.to_string()).collect(),
            None => return Ok(Self::default()),
        };
        let rows = iter
            .map(|r| {
                let mut row: Vec<Cell> = r.iter().map(Cell::from_excel).collect();
                row.resize(columns.len(), Cell::Empty);
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// 列类型，按 dataframe 的规则推断：
    /// - 没有数据行 → Other
    /// - 全为整数且无缺失 → Int
    /// - 全为数字或缺失 → Float
    fn column_kind(&self, index: usize) -> ColumnKind {
        if self.rows.is_empty() {
            return ColumnKind::Other;
        }

        let mut kind = ColumnKind::Int;
        for row in &self.rows {
            match row.get(index) {
                Some(Cell::Int(_)) => {}
                Some(Cell::Float(_)) | Some(Cell::Empty) | None => kind = ColumnKind::Float,
                Some(_) => return ColumnKind::Other,
            }
        }
        kind
    }

    /// 第一个数值列的整数和（浮点和向零截断）
    ///
    /// 没有数值列时返回 `Ok(None)`；和超出 i64 或不是有限数时返回错误
    pub fn first_numeric_sum(&self) -> Result<Option<i64>, String> {
        let Some((index, kind)) = (0..self.columns.len())
            .map(|i| (i, self.column_kind(i)))
            .find(|(_, kind)| *kind != ColumnKind::Other)
        else {
            return Ok(None);
        };

        let cells = self.rows.iter().filter_map(|row| row.get(index));
        let sum = match kind {
            ColumnKind::Int => cells
                .filter_map(|cell| match cell {
                    Cell::Int(i) => Some(*i),
                    _ => None,
                })
                .try_fold(0i64, |acc, i| acc.checked_add(i))
                .ok_or_else(|| format!("列 {} 求和溢出", self.columns[index]))?,
            _ => {
                let total: f64 = cells
                    .filter_map(|cell| match cell {
                        Cell::Int(i) => Some(*i as f64),
                        Cell::Float(f) => Some(*f),
                        _ => None,
                    })
                    .sum();
                let truncated = total.trunc();
                if !truncated.is_finite()
                    || truncated < i64::MIN as f64
                    || truncated >= i64::MAX as f64
                {
                    return Err(format!(
                        "列 {} 的和 {} 无法转为整数",
                        self.columns[index], total
                    ));
                }
                truncated as i64
            }
        };
        Ok(Some(sum))
    }

    /// 每行转成 列名 → 值 的对象
    pub fn to_records(&self) -> Value {
        let kinds: Vec<ColumnKind> = (0..self.columns.len()).map(|i| self.column_kind(i)).collect();

        let records = self
            .rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .zip(&kinds)
                    .map(|((name, cell), kind)| (name.clone(), cell_to_json(cell, *kind)))
                    .collect();
                Value::Object(record)
            })
            .collect();
        Value::Array(records)
    }
}

fn cell_to_json(cell: &Cell, kind: ColumnKind) -> Value {
    match (cell, kind) {
        (Cell::Empty, _) => Value::Null,
        (Cell::Int(i), ColumnKind::Float) => {
            Number::from_f64(*i as f64).map_or(Value::Null, Value::Number)
        }
        (Cell::Int(i), _) => Value::Number((*i).into()),
        (Cell::Float(f), _) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        (Cell::Bool(b), _) => Value::Bool(*b),
        (Cell::Text(s), _) => Value::String(s.clone()),
    }
}

/// 对表格应用启发式规则
pub fn evaluate_table(table: &Table, context_text: &str) -> Result<Value, String> {
    if context_text.to_lowercase().contains("sum") {
        if let Some(sum) = table.first_numeric_sum()? {
            debug!("按求和规则处理，结果: {}", sum);
            return Ok(Value::Number(sum.into()));
        }
    }
    Ok(table.to_records())
}

/// 表格启发式服务
pub struct SpreadsheetService {
    http: HttpClient,
}

impl SpreadsheetService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// 下载并处理表格文件
    ///
    /// # 参数
    /// - `file_url`: 已补全的文件地址
    /// - `context_text`: 页面正文，仅用于判断是否要求求和
    pub async fn solve(&self, file_url: &str, context_text: &str) -> AppResult<Value> {
        let format = TableFormat::from_url(file_url).ok_or_else(|| FileError::UnsupportedType {
            url: file_url.to_string(),
        })?;

        info!("📥 下载表格文件: {}", file_url);
        let bytes = self.http.get_bytes(file_url).await?;

        let table = match format {
            TableFormat::Csv => Table::from_csv(&bytes),
            TableFormat::Excel => Table::from_excel(&bytes),
        }
        .map_err(|reason| AppError::file_parse_failed(file_url, reason))?;

        debug!("表格共 {} 列 {} 行", table.columns.len(), table.rows.len());

        evaluate_table(&table, context_text)
            .map_err(|reason| AppError::file_parse_failed(file_url, reason))
    }
}
