//! Chart-ready series derived from the filtered tables.

use retail_core::types::{ChurnSummary, CountryRevenue, MonthlyRevenuePoint, SalesRecord};
use std::collections::{BTreeMap, HashMap};

/// Revenue summed into "YYYY-MM" buckets, sorted by month. Rows without a
/// parseable date are skipped.
pub fn monthly_revenue(sales: &[SalesRecord]) -> Vec<MonthlyRevenuePoint> {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    for record in sales {
        if let Some(date) = record.order_date {
            *buckets.entry(date.format("%Y-%m").to_string()).or_default() +=
                record.total_revenue;
        }
    }
    buckets
        .into_iter()
        .map(|(month, total_revenue)| MonthlyRevenuePoint {
            month,
            total_revenue,
        })
        .collect()
}

/// Revenue per country, highest first. Country name breaks revenue ties so
/// the ordering stays reproducible.
pub fn revenue_by_country(sales: &[SalesRecord]) -> Vec<CountryRevenue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in sales {
        if record.country_name.is_empty() {
            continue;
        }
        *totals.entry(record.country_name.as_str()).or_default() += record.total_revenue;
    }
    let mut series: Vec<CountryRevenue> = totals
        .into_iter()
        .map(|(country_name, total_revenue)| CountryRevenue {
            country_name: country_name.to_string(),
            total_revenue,
        })
        .collect();
    series.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.country_name.cmp(&b.country_name))
    });
    series
}

/// Churn counts per country, highest first.
pub fn churn_by_country(summary: &[ChurnSummary]) -> Vec<ChurnSummary> {
    let mut series = summary.to_vec();
    series.sort_by(|a, b| {
        b.total_churned
            .cmp(&a.total_churned)
            .then_with(|| a.country_name.cmp(&b.country_name))
    });
    series
}
