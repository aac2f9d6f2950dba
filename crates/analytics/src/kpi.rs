//! KPI aggregation over a (usually filtered) sales view.

use retail_core::types::{KpiSummary, SalesRecord};
use std::collections::HashSet;

/// Sum revenue and count distinct customers and orders. Average order
/// value falls back to 0.0 when there are no orders — never NaN.
///
/// Empty ids are skipped: a sales table loaded without its id columns
/// fills them with empty strings, and those must report zero distinct
/// customers and orders, not one.
pub fn compute_kpis(sales: &[SalesRecord]) -> KpiSummary {
    let total_revenue: f64 = sales.iter().map(|r| r.total_revenue).sum();
    let total_customers = sales
        .iter()
        .map(|r| r.customer_id.as_str())
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len() as u64;
    let total_orders = sales
        .iter()
        .map(|r| r.order_id.as_str())
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len() as u64;

    let average_order_value = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };

    KpiSummary {
        total_revenue,
        total_customers,
        total_orders,
        average_order_value,
    }
}
