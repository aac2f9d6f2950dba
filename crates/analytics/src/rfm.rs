//! RFM (recency / frequency / monetary) customer segmentation.
//!
//! Profiles are always computed over the entire sales dataset, never a
//! filtered view: the quintile bins are derived from the population's own
//! distribution, so the population must stay stable and comparable across
//! filter changes.

use retail_core::types::{CustomerRfmProfile, SalesRecord, Segment, SegmentCount};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Recency for customers with no parseable order date: deliberately large,
/// "very stale".
pub const RECENCY_SENTINEL: i64 = 999;

struct CustomerAccum {
    customer_id: String,
    last_order: Option<chrono::NaiveDate>,
    orders: HashSet<String>,
    monetary: f64,
}

/// Compute one profile per customer, in first-seen order. Deterministic
/// for a given input; bin boundaries are re-derived on every invocation.
pub fn compute_segments(sales: &[SalesRecord]) -> Vec<CustomerRfmProfile> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut customers: Vec<CustomerAccum> = Vec::new();

    for record in sales {
        if record.customer_id.is_empty() {
            continue;
        }
        let slot = *index.entry(record.customer_id.as_str()).or_insert_with(|| {
            customers.push(CustomerAccum {
                customer_id: record.customer_id.clone(),
                last_order: None,
                orders: HashSet::new(),
                monetary: 0.0,
            });
            customers.len() - 1
        });
        let acc = &mut customers[slot];
        if let Some(d) = record.order_date {
            acc.last_order = Some(acc.last_order.map_or(d, |prev| prev.max(d)));
        }
        if !record.order_id.is_empty() {
            acc.orders.insert(record.order_id.clone());
        }
        acc.monetary += record.total_revenue;
    }

    if customers.is_empty() {
        return Vec::new();
    }

    let global_max = customers.iter().filter_map(|c| c.last_order).max();

    let recency: Vec<i64> = customers
        .iter()
        .map(|c| match (global_max, c.last_order) {
            (Some(max), Some(last)) => (max - last).num_days(),
            _ => RECENCY_SENTINEL,
        })
        .collect();
    let frequency: Vec<u64> = customers.iter().map(|c| c.orders.len() as u64).collect();
    let monetary: Vec<f64> = customers.iter().map(|c| c.monetary).collect();

    // Recency bins by value (equal recency shares a bin), inverted so the
    // most recent customers score 5. Frequency and monetary bin by stable
    // rank, first-seen order breaking ties, highest value scoring 5.
    let recency_f: Vec<f64> = recency.iter().map(|&r| r as f64).collect();
    let r_scores: Vec<u8> = quintile_by_value(&recency_f).iter().map(|q| 6 - q).collect();
    let f_scores = quintile_by_rank(&frequency.iter().map(|&f| f as f64).collect::<Vec<_>>());
    let m_scores = quintile_by_rank(&monetary);

    customers
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let rfm_sum = r_scores[i] + f_scores[i] + m_scores[i];
            CustomerRfmProfile {
                customer_id: c.customer_id,
                recency: recency[i],
                frequency: frequency[i],
                monetary: monetary[i],
                r_score: r_scores[i],
                f_score: f_scores[i],
                m_score: m_scores[i],
                rfm_sum,
                segment: Segment::from_rfm_sum(rfm_sum),
            }
        })
        .collect()
}

/// Customer counts per segment, in fixed segment order.
pub fn segment_distribution(profiles: &[CustomerRfmProfile]) -> Vec<SegmentCount> {
    Segment::ALL
        .iter()
        .map(|&segment| SegmentCount {
            segment,
            count: profiles.iter().filter(|p| p.segment == segment).count() as u64,
        })
        .collect()
}

/// Positional quantile cut into 5 equal-population bins, scores 1..=5
/// ascending with the value. Ties are broken by insertion order (first
/// seen ranks lower), so every customer gets a score even with duplicate
/// values. Populations smaller than 5 collapse naturally into fewer
/// distinct bins instead of erroring.
fn quintile_by_rank(values: &[f64]) -> Vec<u8> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let order = stable_order(values);
    let mut scores = vec![1u8; n];
    for (pos, &i) in order.iter().enumerate() {
        scores[i] = (pos * 5 / n) as u8 + 1;
    }
    scores
}

/// Same positional cut, except runs of equal values all take the bin of
/// the run's first position. Used for recency, where equal values must
/// score equally.
fn quintile_by_value(values: &[f64]) -> Vec<u8> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let order = stable_order(values);
    let mut scores = vec![1u8; n];
    let mut run_start = 0usize;
    for pos in 0..n {
        if pos > 0 && values[order[pos]] != values[order[pos - 1]] {
            run_start = pos;
        }
        scores[order[pos]] = (run_start * 5 / n) as u8 + 1;
    }
    scores
}

fn stable_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}
