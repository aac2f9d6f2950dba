//! Domain types for the retail analytics pipeline — source table rows,
//! derived analytics records, and realized-schema capability queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ─── Source tables ──────────────────────────────────────────────────────────

/// One sales line. An order may span multiple lines, so `order_id` is not
/// unique. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_id: String,
    pub customer_id: String,
    pub country_name: String,
    pub category: String,
    pub product_name: String,
    /// Malformed source dates coerce to `None` and are excluded from
    /// date-based computations.
    pub order_date: Option<NaiveDate>,
    pub total_revenue: f64,
}

/// Per-customer churn row. Read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnRecord {
    pub customer_id: String,
    pub country_name: String,
    pub last_order_date: Option<NaiveDate>,
    pub total_spent: f64,
}

/// Per-country churn counts. Read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnSummary {
    pub country_name: String,
    pub total_churned: u64,
}

/// One forecast row. The forecast values are pre-computed inputs; this
/// system never produces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: Option<NaiveDate>,
    pub forecast_revenue: f64,
    pub lower_ci: Option<f64>,
    pub upper_ci: Option<f64>,
    /// Present only when the source table carries a country column.
    pub country_name: Option<String>,
}

// ─── Derived analytics ──────────────────────────────────────────────────────

/// Categorical customer segment, assigned by fixed thresholds on the
/// combined RFM score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Champions,
    Loyal,
    Potential,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl Segment {
    /// Thresholds are fixed constants, never re-derived from the data.
    pub fn from_rfm_sum(sum: u8) -> Self {
        match sum {
            s if s >= 13 => Segment::Champions,
            s if s >= 10 => Segment::Loyal,
            s if s >= 7 => Segment::Potential,
            _ => Segment::AtRisk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::Loyal => "Loyal",
            Segment::Potential => "Potential",
            Segment::AtRisk => "At Risk",
        }
    }

    pub const ALL: [Segment; 4] = [
        Segment::Champions,
        Segment::Loyal,
        Segment::Potential,
        Segment::AtRisk,
    ];
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recency/frequency/monetary profile for one customer. Recomputed on
/// demand over the full customer population, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRfmProfile {
    pub customer_id: String,
    /// Days since the customer's last order, relative to the dataset's
    /// global max order date. Customers with no valid date get 999.
    pub recency: i64,
    /// Count of distinct order ids.
    pub frequency: u64,
    /// Sum of revenue.
    pub monetary: f64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    /// r + f + m, always in 3..=15.
    pub rfm_sum: u8,
    pub segment: Segment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedForecastPoint {
    pub date: Option<NaiveDate>,
    pub forecast_revenue: f64,
    pub sim_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_customers: u64,
    pub total_orders: u64,
    pub average_order_value: f64,
}

// ─── Chart series ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenuePoint {
    /// "YYYY-MM" bucket label.
    pub month: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRevenue {
    pub country_name: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCount {
    pub segment: Segment,
    pub count: u64,
}

/// Distinct filterable values plus the loaded date bounds, for building
/// selection controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub products: Vec<String>,
    pub min_order_date: Option<NaiveDate>,
    pub max_order_date: Option<NaiveDate>,
}

// ─── Realized schema ────────────────────────────────────────────────────────

/// The set of normalized column names actually present in a loaded table.
/// Computations that depend on a column query membership first and skip
/// when it is absent, rather than erroring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: BTreeSet<String>,
}

impl TableSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
