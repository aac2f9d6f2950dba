//! What-if revenue simulation over the forecast series.

use retail_core::types::{ForecastPoint, SimulatedForecastPoint};

/// Elementwise multiplicative adjustment:
///
/// `sim = forecast * (1 + growth/100) * (1 - discount/100) * (1 + churn_reduction/100)`
///
/// Any real-valued percentages are accepted; range enforcement belongs to
/// the input controls, not this engine. Stateless and deterministic.
pub fn simulate(
    forecast: &[ForecastPoint],
    growth_pct: f64,
    churn_reduction_pct: f64,
    discount_pct: f64,
) -> Vec<SimulatedForecastPoint> {
    let factor =
        (1.0 + growth_pct / 100.0) * (1.0 - discount_pct / 100.0) * (1.0 + churn_reduction_pct / 100.0);

    forecast
        .iter()
        .map(|p| SimulatedForecastPoint {
            date: p.date,
            forecast_revenue: p.forecast_revenue,
            sim_revenue: p.forecast_revenue * factor,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<ForecastPoint> {
        [100.0, 250.0, 0.0, 1234.5]
            .iter()
            .map(|&v| ForecastPoint {
                date: None,
                forecast_revenue: v,
                lower_ci: None,
                upper_ci: None,
                country_name: None,
            })
            .collect()
    }

    #[test]
    fn zero_adjustments_are_the_identity() {
        for point in simulate(&series(), 0.0, 0.0, 0.0) {
            assert!((point.sim_revenue - point.forecast_revenue).abs() < 1e-9);
        }
    }

    #[test]
    fn growth_alone_is_linear() {
        for point in simulate(&series(), 10.0, 0.0, 0.0) {
            assert!((point.sim_revenue - point.forecast_revenue * 1.10).abs() < 1e-9);
        }
    }

    #[test]
    fn combined_parameters_match_the_closed_form() {
        let out = simulate(&series(), 5.0, 10.0, 3.0);
        let factor = 1.05 * 0.97 * 1.10;
        for point in out {
            assert!((point.sim_revenue - point.forecast_revenue * factor).abs() < 1e-9);
        }
    }

    #[test]
    fn out_of_range_percentages_are_not_special_cased() {
        let out = simulate(&series(), -150.0, 0.0, 200.0);
        // -150% growth and 200% discount both flip sign; the engine just
        // applies the formula.
        let factor = (1.0 - 1.5) * (1.0 - 2.0);
        assert!((out[0].sim_revenue - out[0].forecast_revenue * factor).abs() < 1e-9);
    }
}
