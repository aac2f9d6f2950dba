//! Predicate selections applied to the sales table and, where the schema
//! allows, to the churn summary and forecast tables.

use chrono::NaiveDate;
use retail_core::types::{
    ChurnSummary, FilterOptions, ForecastPoint, SalesRecord, TableSchema,
};
use serde::{Deserialize, Serialize};

/// User-selected filter state.
///
/// An empty selection on any of the three set dimensions means "do not
/// filter on this dimension" — not "exclude everything". The date range is
/// inclusive on both ends; an inverted range (start > end) matches nothing,
/// and a malformed range (anything but a 2-element date pair) deserializes
/// to `None` and is ignored rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesFilter {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default, deserialize_with = "lenient_date_range")]
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

fn lenient_date_range<'de, D>(de: D) -> Result<Option<(NaiveDate, NaiveDate)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(range_from_value(&value))
}

fn range_from_value(value: &serde_json::Value) -> Option<(NaiveDate, NaiveDate)> {
    let items = value.as_array()?;
    if items.len() != 2 {
        return None;
    }
    let date = |v: &serde_json::Value| v.as_str().and_then(|s| s.parse::<NaiveDate>().ok());
    Some((date(&items[0])?, date(&items[1])?))
}

impl SalesFilter {
    /// Apply the selections to the sales table, producing a new view.
    /// The input is untouched.
    pub fn apply(&self, sales: &[SalesRecord]) -> Vec<SalesRecord> {
        sales
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    fn matches(&self, record: &SalesRecord) -> bool {
        if !self.countries.is_empty() && !self.countries.contains(&record.country_name) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&record.category) {
            return false;
        }
        if !self.products.is_empty() && !self.products.contains(&record.product_name) {
            return false;
        }
        if let Some((start, end)) = self.date_range {
            // Rows with no parseable date are excluded once a range is active.
            match record.order_date {
                Some(d) => d >= start && d <= end,
                None => false,
            }
        } else {
            true
        }
    }

    /// Restrict the churn summary to the selected countries, but only when
    /// the loaded table actually carries a country column.
    pub fn restrict_churn(&self, rows: &[ChurnSummary], schema: &TableSchema) -> Vec<ChurnSummary> {
        if self.countries.is_empty() || !schema.has("country_name") {
            return rows.to_vec();
        }
        rows.iter()
            .filter(|r| self.countries.contains(&r.country_name))
            .cloned()
            .collect()
    }

    /// Same country restriction for the forecast table, schema permitting.
    pub fn restrict_forecast(
        &self,
        rows: &[ForecastPoint],
        schema: &TableSchema,
    ) -> Vec<ForecastPoint> {
        if self.countries.is_empty() || !schema.has("country_name") {
            return rows.to_vec();
        }
        rows.iter()
            .filter(|r| {
                r.country_name
                    .as_ref()
                    .is_some_and(|c| self.countries.contains(c))
            })
            .cloned()
            .collect()
    }
}

/// Distinct sorted values per dimension plus the loaded date bounds —
/// the inputs for the selection controls.
pub fn filter_options(sales: &[SalesRecord]) -> FilterOptions {
    let mut countries: Vec<String> = distinct(sales.iter().map(|r| &r.country_name));
    let mut categories: Vec<String> = distinct(sales.iter().map(|r| &r.category));
    let mut products: Vec<String> = distinct(sales.iter().map(|r| &r.product_name));
    countries.sort();
    categories.sort();
    products.sort();

    let dates: Vec<NaiveDate> = sales.iter().filter_map(|r| r.order_date).collect();
    FilterOptions {
        countries,
        categories,
        products,
        min_order_date: dates.iter().min().copied(),
        max_order_date: dates.iter().max().copied(),
    }
}

fn distinct<'a, I: Iterator<Item = &'a String>>(values: I) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(v.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        order: &str,
        customer: &str,
        country: &str,
        category: &str,
        product: &str,
        date: Option<&str>,
        revenue: f64,
    ) -> SalesRecord {
        SalesRecord {
            order_id: order.into(),
            customer_id: customer.into(),
            country_name: country.into(),
            category: category.into(),
            product_name: product.into(),
            order_date: date.map(|d| d.parse().unwrap()),
            total_revenue: revenue,
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            record("O1", "C1", "Germany", "Toys", "Kite", Some("2024-01-10"), 10.0),
            record("O2", "C2", "France", "Toys", "Ball", Some("2024-02-15"), 20.0),
            record("O3", "C3", "Germany", "Games", "Dice", Some("2024-03-20"), 30.0),
            record("O4", "C4", "Spain", "Games", "Cards", None, 40.0),
        ]
    }

    #[test]
    fn empty_selections_do_not_restrict() {
        let filter = SalesFilter::default();
        assert_eq!(filter.apply(&sample()).len(), 4);
    }

    #[test]
    fn empty_product_selection_means_all_products() {
        let filter = SalesFilter {
            countries: vec!["Germany".into()],
            ..SalesFilter::default()
        };
        let out = filter.apply(&sample());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.country_name == "Germany"));
    }

    #[test]
    fn non_empty_selections_are_membership_tests() {
        let filter = SalesFilter {
            countries: vec!["Germany".into(), "France".into()],
            categories: vec!["Toys".into()],
            products: vec!["Kite".into()],
            date_range: None,
        };
        let input = sample();
        let out = filter.apply(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].order_id, "O1");
        // Output is a subset; input is untouched.
        assert_eq!(input.len(), 4);
        assert!(out.iter().all(|r| input.contains(r)));
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let filter = SalesFilter {
            date_range: Some((
                "2024-01-10".parse().unwrap(),
                "2024-02-15".parse().unwrap(),
            )),
            ..SalesFilter::default()
        };
        let out = filter.apply(&sample());
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|r| r.order_id == "O1"));
        assert!(out.iter().any(|r| r.order_id == "O2"));
    }

    #[test]
    fn inverted_date_range_yields_empty_not_error() {
        let filter = SalesFilter {
            date_range: Some((
                "2024-12-31".parse().unwrap(),
                "2024-01-01".parse().unwrap(),
            )),
            ..SalesFilter::default()
        };
        assert!(filter.apply(&sample()).is_empty());
    }

    #[test]
    fn undated_rows_are_excluded_only_when_a_range_is_active() {
        let unfiltered = SalesFilter::default();
        assert!(unfiltered.apply(&sample()).iter().any(|r| r.order_id == "O4"));

        let ranged = SalesFilter {
            date_range: Some((
                "2020-01-01".parse().unwrap(),
                "2030-01-01".parse().unwrap(),
            )),
            ..SalesFilter::default()
        };
        assert!(!ranged.apply(&sample()).iter().any(|r| r.order_id == "O4"));
    }

    #[test]
    fn churn_restriction_requires_country_column() {
        let rows = vec![
            ChurnSummary { country_name: "Germany".into(), total_churned: 5 },
            ChurnSummary { country_name: "France".into(), total_churned: 3 },
        ];
        let filter = SalesFilter {
            countries: vec!["Germany".into()],
            ..SalesFilter::default()
        };

        let with_col = TableSchema::new(["country_name", "total_churned"]);
        assert_eq!(filter.restrict_churn(&rows, &with_col).len(), 1);

        // Without the column the restriction is skipped, not an error.
        let without_col = TableSchema::new(["total_churned"]);
        assert_eq!(filter.restrict_churn(&rows, &without_col).len(), 2);
    }

    #[test]
    fn malformed_date_ranges_deserialize_to_none() {
        let three_elements: SalesFilter =
            serde_json::from_str(r#"{"date_range": ["2024-01-01", "2024-02-01", "2024-03-01"]}"#)
                .unwrap();
        assert_eq!(three_elements.date_range, None);

        let unparseable: SalesFilter =
            serde_json::from_str(r#"{"date_range": ["yesterday", "today"]}"#).unwrap();
        assert_eq!(unparseable.date_range, None);

        let valid: SalesFilter =
            serde_json::from_str(r#"{"date_range": ["2024-01-01", "2024-02-01"]}"#).unwrap();
        assert_eq!(
            valid.date_range,
            Some(("2024-01-01".parse().unwrap(), "2024-02-01".parse().unwrap()))
        );

        let absent: SalesFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.date_range, None);
    }

    #[test]
    fn filter_options_are_sorted_distinct() {
        let opts = filter_options(&sample());
        assert_eq!(opts.countries, vec!["France", "Germany", "Spain"]);
        assert_eq!(opts.categories, vec!["Games", "Toys"]);
        assert_eq!(opts.min_order_date, Some("2024-01-10".parse().unwrap()));
        assert_eq!(opts.max_order_date, Some("2024-03-20".parse().unwrap()));
    }
}
