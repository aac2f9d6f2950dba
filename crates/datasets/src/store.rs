//! Process-wide dataset snapshot with lazy-init-once semantics.
//!
//! The four tables are loaded from disk on first access and shared as an
//! immutable `Arc` for the life of the process. There are no writers after
//! load, so no locking is needed beyond the one-time initialization.

use crate::loader::{self, LoadedTable};
use retail_core::config::DataConfig;
use retail_core::types::{ChurnRecord, ChurnSummary, ForecastPoint, SalesRecord};
use retail_core::RetailResult;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Immutable snapshot of everything loaded from disk.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub sales: LoadedTable<SalesRecord>,
    pub churned: LoadedTable<ChurnRecord>,
    pub churn_summary: LoadedTable<ChurnSummary>,
    pub forecast: LoadedTable<ForecastPoint>,
}

/// Memoizing loader: the load step takes no parameters, so the cache is a
/// single cell, invalidated only by process restart.
pub struct DatasetStore {
    config: DataConfig,
    cell: OnceLock<Arc<Datasets>>,
}

impl DatasetStore {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            cell: OnceLock::new(),
        }
    }

    /// Get the shared snapshot, loading it on first call.
    pub fn snapshot(&self) -> RetailResult<Arc<Datasets>> {
        if let Some(data) = self.cell.get() {
            return Ok(Arc::clone(data));
        }

        let loaded = Arc::new(self.load()?);
        // A concurrent initializer may have won the race; both values are
        // snapshots of the same immutable files, so either one is kept.
        Ok(Arc::clone(self.cell.get_or_init(|| loaded)))
    }

    /// Whether the snapshot has been materialized yet.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    fn load(&self) -> RetailResult<Datasets> {
        let sales = loader::load_sales(&self.config.sales_path())?;
        let churned = loader::load_churned(&self.config.churned_path())?;
        let churn_summary = loader::load_churn_summary(&self.config.churn_summary_path())?;
        let forecast = loader::load_forecast(&self.config.forecast_path())?;

        info!(
            sales_rows = sales.rows.len(),
            churned_rows = churned.rows.len(),
            churn_summary_rows = churn_summary.rows.len(),
            forecast_rows = forecast.rows.len(),
            "datasets loaded"
        );

        Ok(Datasets {
            sales,
            churned,
            churn_summary,
            forecast,
        })
    }

    /// Build a store that is already initialized with in-memory tables.
    /// Used by tests and by callers that source data elsewhere.
    pub fn preloaded(datasets: Datasets) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(datasets));
        Self {
            config: DataConfig::default(),
            cell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retail_core::types::TableSchema;

    fn empty_datasets() -> Datasets {
        Datasets {
            sales: LoadedTable {
                rows: vec![],
                schema: TableSchema::new(["order_id"]),
            },
            churned: LoadedTable::empty(),
            churn_summary: LoadedTable::empty(),
            forecast: LoadedTable::empty(),
        }
    }

    #[test]
    fn preloaded_store_serves_the_same_snapshot() {
        let store = DatasetStore::preloaded(empty_datasets());
        assert!(store.is_loaded());

        let a = store.snapshot().unwrap();
        let b = store.snapshot().unwrap();
        assert!(Arc::ptr_eq(&a, &b), "snapshots share one allocation");
        assert!(a.sales.schema.has("order_id"));
    }

    #[test]
    fn missing_files_surface_as_dataset_load_errors() {
        let config = DataConfig {
            data_dir: "/nonexistent".into(),
            ..DataConfig::default()
        };
        let store = DatasetStore::new(config);
        assert!(store.snapshot().is_err());
        assert!(!store.is_loaded());
    }
}
