//! Export serialization for the filtered sales view — delimited text and
//! a spreadsheet byte blob, both losslessly round-trippable with the
//! in-memory schema.

use chrono::NaiveDate;
use retail_core::types::SalesRecord;
use retail_core::{RetailError, RetailResult};
use rust_xlsxwriter::Workbook;

/// The in-memory sales schema, in export column order.
pub const SALES_COLUMNS: [&str; 7] = [
    "order_id",
    "customer_id",
    "country_name",
    "category",
    "product_name",
    "order_date",
    "total_revenue",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialize to CSV with a header row. Undated rows export an empty date
/// cell.
pub fn to_csv(sales: &[SalesRecord]) -> RetailResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(SALES_COLUMNS)
        .map_err(|e| RetailError::Export(e.to_string()))?;

    for record in sales {
        let date = format_date(record.order_date);
        let revenue = record.total_revenue.to_string();
        writer
            .write_record([
                record.order_id.as_str(),
                record.customer_id.as_str(),
                record.country_name.as_str(),
                record.category.as_str(),
                record.product_name.as_str(),
                date.as_str(),
                revenue.as_str(),
            ])
            .map_err(|e| RetailError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RetailError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RetailError::Export(e.to_string()))
}

/// Re-parse exported CSV back into records. Used to verify the round trip
/// and by callers ingesting previously exported views.
pub fn parse_csv(text: &str) -> RetailResult<Vec<SalesRecord>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RetailError::Export(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let col = |name: &str| headers.iter().position(|h| h == name);
    let order_id = col("order_id");
    let customer_id = col("customer_id");
    let country = col("country_name");
    let category = col("category");
    let product = col("product_name");
    let order_date = col("order_date");
    let revenue = col("total_revenue");

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| RetailError::Export(e.to_string()))?;
        rows.push(SalesRecord {
            order_id: field(&record, order_id),
            customer_id: field(&record, customer_id),
            country_name: field(&record, country),
            category: field(&record, category),
            product_name: field(&record, product),
            order_date: NaiveDate::parse_from_str(&field(&record, order_date), DATE_FORMAT).ok(),
            total_revenue: field(&record, revenue).parse().unwrap_or(0.0),
        });
    }
    Ok(rows)
}

/// Serialize to an XLSX workbook: one worksheet, header row, same column
/// set as the CSV export.
pub fn to_xlsx(sales: &[SalesRecord]) -> RetailResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("filtered_sales")
        .map_err(|e| RetailError::Export(e.to_string()))?;

    for (col, name) in SALES_COLUMNS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *name)
            .map_err(|e| RetailError::Export(e.to_string()))?;
    }

    for (i, record) in sales.iter().enumerate() {
        let row = (i + 1) as u32;
        let cells = [
            record.order_id.as_str(),
            record.customer_id.as_str(),
            record.country_name.as_str(),
            record.category.as_str(),
            record.product_name.as_str(),
        ];
        for (col, value) in cells.iter().enumerate() {
            worksheet
                .write_string(row, col as u16, *value)
                .map_err(|e| RetailError::Export(e.to_string()))?;
        }
        worksheet
            .write_string(row, 5, format_date(record.order_date))
            .map_err(|e| RetailError::Export(e.to_string()))?;
        worksheet
            .write_number(row, 6, record.total_revenue)
            .map_err(|e| RetailError::Export(e.to_string()))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| RetailError::Export(e.to_string()))
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SalesRecord> {
        vec![
            SalesRecord {
                order_id: "O1".into(),
                customer_id: "C1".into(),
                country_name: "Germany".into(),
                category: "Toys".into(),
                product_name: "Kite, large".into(),
                order_date: Some("2024-01-10".parse().unwrap()),
                total_revenue: 19.9,
            },
            SalesRecord {
                order_id: "O2".into(),
                customer_id: "C2".into(),
                country_name: "France".into(),
                category: "Games".into(),
                product_name: "Dice".into(),
                order_date: None,
                total_revenue: 5.0,
            },
        ]
    }

    #[test]
    fn csv_round_trip_preserves_rows_and_columns() {
        let original = sample();
        let csv = to_csv(&original).unwrap();

        let header = csv.lines().next().unwrap();
        assert_eq!(header, SALES_COLUMNS.join(","));

        let parsed = parse_csv(&csv).unwrap();
        assert_eq!(parsed.len(), original.len());
        assert_eq!(parsed, original);
    }

    #[test]
    fn csv_quotes_embedded_delimiters() {
        let csv = to_csv(&sample()).unwrap();
        assert!(csv.contains("\"Kite, large\""));
    }

    #[test]
    fn empty_view_exports_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(parse_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn xlsx_blob_has_zip_magic_and_content() {
        let bytes = to_xlsx(&sample()).unwrap();
        assert!(bytes.len() > 4);
        // XLSX is a ZIP container.
        assert_eq!(&bytes[..2], b"PK");
    }
}
