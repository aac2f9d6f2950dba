use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `RETAIL_INTEL__` and `__` as the nesting separator.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

/// Locations of the three pre-computed input workbooks. Each path may
/// point at a `.xlsx` workbook or a `.csv` file; the churn workbook holds
/// two sheets (churned customers and the per-country summary), so it
/// appears twice here with different sheet bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_sales_file")]
    pub sales_file: String,
    #[serde(default = "default_churn_file")]
    pub churned_file: String,
    #[serde(default = "default_churn_file")]
    pub churn_summary_file: String,
    #[serde(default = "default_forecast_file")]
    pub forecast_file: String,
}

impl DataConfig {
    pub fn sales_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.sales_file)
    }
    pub fn churned_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.churned_file)
    }
    pub fn churn_summary_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.churn_summary_file)
    }
    pub fn forecast_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.forecast_file)
    }
}

/// Decorative hero animation. Strictly best-effort: fetch failures are
/// swallowed and the dashboard renders without it.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_animation_enabled")]
    pub enabled: bool,
    #[serde(default = "default_animation_url")]
    pub url: String,
    #[serde(default = "default_animation_timeout_secs")]
    pub timeout_secs: u64,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_sales_file() -> String {
    "sales_summary.xlsx".to_string()
}
fn default_churn_file() -> String {
    "churn_analysis.xlsx".to_string()
}
fn default_forecast_file() -> String {
    "forecast_summary.xlsx".to_string()
}
fn default_animation_enabled() -> bool {
    true
}
fn default_animation_url() -> String {
    "https://assets2.lottiefiles.com/packages/lf20_jcikwtux.json".to_string()
}
fn default_animation_timeout_secs() -> u64 {
    6
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sales_file: default_sales_file(),
            churned_file: default_churn_file(),
            churn_summary_file: default_churn_file(),
            forecast_file: default_forecast_file(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: default_animation_enabled(),
            url: default_animation_url(),
            timeout_secs: default_animation_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            data: DataConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> crate::RetailResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("RETAIL_INTEL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| crate::RetailError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| crate::RetailError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_three_workbooks() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data.sales_path().to_str().unwrap(), "data/sales_summary.xlsx");
        assert_eq!(
            cfg.data.churned_path(),
            cfg.data.churn_summary_path(),
            "both churn tables default to the same workbook"
        );
        assert_eq!(cfg.animation.timeout_secs, 6);
    }
}
