//! End-to-end analytics flow: filter → KPIs → charts → export, plus the
//! segmentation-ignores-filters invariant.

use calamine::{Reader, Xlsx};
use retail_analytics::{charts, compute_kpis, compute_segments, export, filter, SalesFilter};
use retail_core::types::SalesRecord;

fn record(
    order: &str,
    customer: &str,
    country: &str,
    category: &str,
    product: &str,
    date: &str,
    revenue: f64,
) -> SalesRecord {
    SalesRecord {
        order_id: order.into(),
        customer_id: customer.into(),
        country_name: country.into(),
        category: category.into(),
        product_name: product.into(),
        order_date: Some(date.parse().unwrap()),
        total_revenue: revenue,
    }
}

fn sales() -> Vec<SalesRecord> {
    vec![
        record("O1", "C1", "Germany", "Toys", "Kite", "2024-01-05", 25.0),
        record("O2", "C2", "Germany", "Toys", "Ball", "2024-01-20", 40.0),
        record("O3", "C3", "France", "Games", "Dice", "2024-02-02", 15.0),
        record("O4", "C4", "France", "Toys", "Kite", "2024-02-18", 60.0),
        record("O5", "C5", "Spain", "Games", "Cards", "2024-03-03", 35.0),
        record("O6", "C6", "Spain", "Toys", "Ball", "2024-03-21", 20.0),
        record("O7", "C7", "Italy", "Games", "Dice", "2024-04-04", 55.0),
        record("O8", "C8", "Italy", "Toys", "Kite", "2024-04-19", 30.0),
        record("O9", "C9", "Poland", "Games", "Cards", "2024-05-06", 45.0),
        record("O10", "C10", "Poland", "Toys", "Ball", "2024-05-23", 50.0),
    ]
}

#[test]
fn filtered_view_feeds_kpis_and_charts() {
    let all = sales();
    let filter = SalesFilter {
        countries: vec!["Germany".into(), "France".into()],
        ..SalesFilter::default()
    };
    let view = filter.apply(&all);
    assert_eq!(view.len(), 4);

    let kpis = compute_kpis(&view);
    assert_eq!(kpis.total_orders, 4);
    assert_eq!(kpis.total_customers, 4);
    assert_eq!(kpis.total_revenue, 140.0);
    assert_eq!(kpis.average_order_value, 35.0);

    let monthly = charts::monthly_revenue(&view);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].month, "2024-01");
    assert_eq!(monthly[0].total_revenue, 65.0);

    let by_country = charts::revenue_by_country(&view);
    assert_eq!(by_country[0].country_name, "France");
    assert_eq!(by_country[0].total_revenue, 75.0);
}

#[test]
fn segmentation_runs_on_the_full_dataset_regardless_of_filters() {
    let all = sales();
    let filter = SalesFilter {
        countries: vec!["Germany".into()],
        ..SalesFilter::default()
    };
    let _view = filter.apply(&all);

    // Quintile bins come from the whole population; the profiles must be
    // identical whatever the active filter view happens to be.
    let profiles = compute_segments(&all);
    assert_eq!(profiles.len(), 10);

    let again = compute_segments(&all);
    assert_eq!(profiles, again);

    // With 10 distinct spends, exactly two customers land in each m bin.
    for bin in 1..=5u8 {
        assert_eq!(profiles.iter().filter(|p| p.m_score == bin).count(), 2);
    }
}

#[test]
fn csv_export_round_trips_the_filtered_view() {
    let all = sales();
    let filter = SalesFilter {
        categories: vec!["Games".into()],
        ..SalesFilter::default()
    };
    let view = filter.apply(&all);

    let csv = export::to_csv(&view).unwrap();
    let parsed = export::parse_csv(&csv).unwrap();
    assert_eq!(parsed.len(), view.len());
    assert_eq!(parsed, view);
    assert_eq!(
        csv.lines().next().unwrap(),
        export::SALES_COLUMNS.join(",")
    );
}

#[test]
fn xlsx_export_round_trips_row_count_and_columns() {
    let view = sales();
    let bytes = export::to_xlsx(&view).unwrap();

    let mut workbook = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range("filtered_sales").unwrap();

    // Header plus one row per record.
    assert_eq!(range.rows().count(), view.len() + 1);

    let header: Vec<String> = range
        .rows()
        .next()
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(header, export::SALES_COLUMNS.to_vec());
}

#[test]
fn filter_options_reflect_the_unfiltered_table() {
    let opts = filter::filter_options(&sales());
    assert_eq!(opts.countries.len(), 5);
    assert_eq!(opts.categories, vec!["Games", "Toys"]);
    assert_eq!(opts.products.len(), 4);
    assert_eq!(opts.min_order_date, Some("2024-01-05".parse().unwrap()));
    assert_eq!(opts.max_order_date, Some("2024-05-23".parse().unwrap()));
}
