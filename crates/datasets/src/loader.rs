//! Tabular file readers for the pre-computed input workbooks.
//!
//! Both `.csv` and `.xlsx` sources are supported. Column names are
//! normalized (trim + lowercase) on load, malformed dates coerce to
//! `None`, and absent columns fill with defaults while the table's
//! realized schema records what was actually present.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use retail_core::types::{ChurnRecord, ChurnSummary, ForecastPoint, SalesRecord, TableSchema};
use retail_core::{RetailError, RetailResult};
use std::path::Path;
use tracing::{debug, warn};

/// Sheet names inside the churn workbook.
const CHURNED_SHEET: &str = "Churned_Customers";
const CHURN_SUMMARY_SHEET: &str = "Churn_Summary";

/// Rows of a typed table plus the realized schema of its source file.
#[derive(Debug, Clone)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    pub schema: TableSchema,
}

impl<T> LoadedTable<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            schema: TableSchema::default(),
        }
    }
}

/// Trim + lowercase, matching how the source workbooks are normalized.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lenient date parsing. Anything unrecognized coerces to `None` and is
/// excluded from date-based computations downstream.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

// ─── Raw table ──────────────────────────────────────────────────────────────

/// A single untyped cell as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Cell::Empty => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

/// Integral floats render without a trailing fraction so spreadsheet
/// identifier columns survive the numeric round trip.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Header-indexed untyped rows, the common shape behind CSV and XLSX.
#[derive(Debug, Clone)]
pub(crate) struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    fn schema(&self) -> TableSchema {
        TableSchema::new(self.columns.iter().cloned())
    }

    fn col(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

fn cell_at(row: &[Cell], idx: Option<usize>) -> &Cell {
    idx.and_then(|i| row.get(i)).unwrap_or(&Cell::Empty)
}

fn text_at(row: &[Cell], idx: Option<usize>) -> String {
    cell_at(row, idx).as_text().unwrap_or_default()
}

fn number_at(row: &[Cell], idx: Option<usize>) -> f64 {
    cell_at(row, idx).as_f64().unwrap_or(0.0)
}

fn date_at(row: &[Cell], idx: Option<usize>) -> Option<NaiveDate> {
    cell_at(row, idx).as_date()
}

// ─── File readers ───────────────────────────────────────────────────────────

fn read_table(path: &Path, sheet: Option<&str>) -> RetailResult<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)?;
            read_csv_from(file)
        }
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => read_xlsx(path, sheet),
        other => Err(RetailError::DatasetLoad(format!(
            "unsupported table format '{}' for {}",
            other,
            path.display()
        ))),
    }
}

pub(crate) fn read_csv_from<R: std::io::Read>(reader: R) -> RetailResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| RetailError::DatasetLoad(e.to_string()))?
        .iter()
        .map(normalize_column)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| RetailError::DatasetLoad(e.to_string()))?;
        let row = record
            .iter()
            .map(|field| {
                let field = field.trim();
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }
    Ok(RawTable { columns, rows })
}

fn read_xlsx(path: &Path, sheet: Option<&str>) -> RetailResult<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| RetailError::DatasetLoad(format!("{}: {}", path.display(), e)))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| RetailError::DatasetLoad(format!("{}: no sheets", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| RetailError::DatasetLoad(format!("{} [{}]: {}", path.display(), sheet_name, e)))?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(|c| normalize_column(&header_text(c))).collect(),
        None => Vec::new(),
    };

    let rows = rows_iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(RawTable { columns, rows })
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::Date(ndt.date()),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => match parse_date(s) {
            Some(d) => Cell::Date(d),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(_) | Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

// ─── Typed table builders ───────────────────────────────────────────────────

pub(crate) fn sales_from_raw(raw: &RawTable) -> LoadedTable<SalesRecord> {
    let schema = raw.schema();
    let order_id = raw.col("order_id");
    let customer_id = raw.col("customer_id");
    let country = raw.col("country_name");
    let category = raw.col("category");
    let product = raw.col("product_name");
    let order_date = raw.col("order_date");
    let revenue = raw.col("total_revenue");

    let rows = raw
        .rows
        .iter()
        .map(|row| SalesRecord {
            order_id: text_at(row, order_id),
            customer_id: text_at(row, customer_id),
            country_name: text_at(row, country),
            category: text_at(row, category),
            product_name: text_at(row, product),
            order_date: date_at(row, order_date),
            total_revenue: number_at(row, revenue),
        })
        .collect();

    LoadedTable { rows, schema }
}

pub(crate) fn churned_from_raw(raw: &RawTable) -> LoadedTable<ChurnRecord> {
    let schema = raw.schema();
    let customer_id = raw.col("customer_id");
    let country = raw.col("country_name");
    let last_order = raw.col("last_order_date");
    let total_spent = raw.col("total_spent");

    let rows = raw
        .rows
        .iter()
        .map(|row| ChurnRecord {
            customer_id: text_at(row, customer_id),
            country_name: text_at(row, country),
            last_order_date: date_at(row, last_order),
            total_spent: number_at(row, total_spent),
        })
        .collect();

    LoadedTable { rows, schema }
}

pub(crate) fn churn_summary_from_raw(raw: &RawTable) -> LoadedTable<ChurnSummary> {
    let schema = raw.schema();
    let country = raw.col("country_name");
    let churned = raw.col("total_churned");

    let rows = raw
        .rows
        .iter()
        .map(|row| ChurnSummary {
            country_name: text_at(row, country),
            total_churned: number_at(row, churned).max(0.0) as u64,
        })
        .collect();

    LoadedTable { rows, schema }
}

pub(crate) fn forecast_from_raw(raw: &RawTable) -> LoadedTable<ForecastPoint> {
    let schema = raw.schema();
    let date = raw.col("date");
    let revenue = raw.col("forecast_revenue");
    let lower = raw.col("lower_ci");
    let upper = raw.col("upper_ci");
    let country = raw.col("country_name");

    let rows = raw
        .rows
        .iter()
        .map(|row| ForecastPoint {
            date: date_at(row, date),
            forecast_revenue: number_at(row, revenue),
            lower_ci: cell_at(row, lower).as_f64(),
            upper_ci: cell_at(row, upper).as_f64(),
            country_name: country.map(|_| text_at(row, country)).filter(|s| !s.is_empty()),
        })
        .collect();

    LoadedTable { rows, schema }
}

// ─── Public loaders ─────────────────────────────────────────────────────────

pub fn load_sales(path: &Path) -> RetailResult<LoadedTable<SalesRecord>> {
    let raw = read_table(path, None)?;
    let table = sales_from_raw(&raw);
    if !table.schema.has("order_date") {
        warn!(path = %path.display(), "sales table has no order_date column; date features disabled");
    }
    debug!(rows = table.rows.len(), path = %path.display(), "loaded sales table");
    Ok(table)
}

pub fn load_churned(path: &Path) -> RetailResult<LoadedTable<ChurnRecord>> {
    let sheet = is_spreadsheet(path).then_some(CHURNED_SHEET);
    let raw = read_table(path, sheet)?;
    let table = churned_from_raw(&raw);
    debug!(rows = table.rows.len(), path = %path.display(), "loaded churned customers");
    Ok(table)
}

pub fn load_churn_summary(path: &Path) -> RetailResult<LoadedTable<ChurnSummary>> {
    let sheet = is_spreadsheet(path).then_some(CHURN_SUMMARY_SHEET);
    let raw = read_table(path, sheet)?;
    let table = churn_summary_from_raw(&raw);
    debug!(rows = table.rows.len(), path = %path.display(), "loaded churn summary");
    Ok(table)
}

pub fn load_forecast(path: &Path) -> RetailResult<LoadedTable<ForecastPoint>> {
    let raw = read_table(path, None)?;
    let table = forecast_from_raw(&raw);
    debug!(rows = table.rows.len(), path = %path.display(), "loaded forecast table");
    Ok(table)
}

fn is_spreadsheet(path: &Path) -> bool {
    !matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("csv")
    )
}
