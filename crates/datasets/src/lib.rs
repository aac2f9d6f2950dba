//! Dataset loading and the process-wide snapshot cache.
//!
//! The three input workbooks (sales, churn, forecast) are read once,
//! normalized, and shared immutably for the life of the process.

pub mod loader;
pub mod store;

pub use loader::{load_churn_summary, load_churned, load_forecast, load_sales, LoadedTable};
pub use store::{DatasetStore, Datasets};
