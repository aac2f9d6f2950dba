//! Pure, stateless analytics over the loaded retail tables — filtering,
//! KPI aggregation, RFM segmentation, what-if simulation, chart series,
//! and export serialization.

pub mod charts;
pub mod export;
pub mod filter;
pub mod kpi;
pub mod rfm;
pub mod simulator;

pub use filter::SalesFilter;
pub use kpi::compute_kpis;
pub use rfm::{compute_segments, segment_distribution};
pub use simulator::simulate;
