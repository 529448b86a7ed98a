mod monetize;
mod traffic;
mod types;
mod variance;

pub use monetize::{
    MonetizedMonth, TOTALS_WINDOW_MONTHS, conversion_rate, simulate_ad_value,
    simulate_ecommerce_revenue, traffic_value,
};
pub use traffic::simulate_traffic;
pub use types::{
    AdValueMonth, AdValueTotals, CompetitionLevel, ContentDepth, EcommerceMonth, EcommerceTotals,
    FUNNEL_BENCHMARKS, FunnelRates, IntentDistribution, ModelBand, MonetizationModel,
    MonthlyTraffic, SimulationConfig, SimulationResult, StrengthTier, TrafficTotals, VarianceBand,
    VarianceMode,
};
pub use variance::{DEFAULT_ITERATIONS, sample_band, sample_model_band, sample_variance};
