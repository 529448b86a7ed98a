use tracing::debug;

use super::traffic::{saturating_count, simulate_traffic};
use super::types::{
    AdValueMonth, AdValueTotals, ContentDepth, EcommerceMonth, EcommerceTotals, FUNNEL_BENCHMARKS,
    MonetizationModel, MonthlyTraffic, SimulationConfig, SimulationResult, StrengthTier,
    TrafficTotals,
};

/// Totals cover at most this many trailing months.
pub const TOTALS_WINDOW_MONTHS: usize = 12;

const MONTHS_PER_YEAR: f64 = 12.0;
const DAYS_PER_YEAR: f64 = 365.0;
const AOV_UPLIFT: f64 = 1.2;
const CRO_HORIZON_MONTHS: u32 = 24;

/// A monetized month that the variance sampler can re-run and band.
pub trait MonetizedMonth: Copy + Send + Sync {
    type Totals;

    const MODEL: MonetizationModel;

    fn simulate(config: &SimulationConfig) -> SimulationResult<Self, Self::Totals>;

    fn traffic(&self) -> &MonthlyTraffic;

    /// The monetary metric banded by the sampler.
    fn metric(&self) -> f64;

    fn with_banded(self, clicks: u64, metric: f64) -> Self;
}

impl MonetizedMonth for AdValueMonth {
    type Totals = AdValueTotals;

    const MODEL: MonetizationModel = MonetizationModel::AdValue;

    fn simulate(config: &SimulationConfig) -> SimulationResult<Self, Self::Totals> {
        simulate_ad_value(config)
    }

    fn traffic(&self) -> &MonthlyTraffic {
        &self.traffic
    }

    fn metric(&self) -> f64 {
        self.traffic_value
    }

    fn with_banded(mut self, clicks: u64, metric: f64) -> Self {
        self.traffic.clicks = clicks;
        self.traffic_value = metric;
        self
    }
}

impl MonetizedMonth for EcommerceMonth {
    type Totals = EcommerceTotals;

    const MODEL: MonetizationModel = MonetizationModel::Ecommerce;

    fn simulate(config: &SimulationConfig) -> SimulationResult<Self, Self::Totals> {
        simulate_ecommerce_revenue(config)
    }

    fn traffic(&self) -> &MonthlyTraffic {
        &self.traffic
    }

    fn metric(&self) -> f64 {
        self.revenue
    }

    fn with_banded(mut self, clicks: u64, metric: f64) -> Self {
        self.traffic.clicks = clicks;
        self.revenue = metric;
        self
    }
}

pub fn simulate_ad_value(config: &SimulationConfig) -> SimulationResult<AdValueMonth, AdValueTotals> {
    let monthly_data = simulate_traffic(config)
        .into_iter()
        .map(|traffic| AdValueMonth {
            traffic,
            traffic_value: traffic_value(traffic.clicks, config),
        })
        .collect::<Vec<_>>();

    let window = trailing_window(&monthly_data);
    let yearly_traffic_value = window.iter().map(|m| m.traffic_value).sum::<f64>();
    let totals = AdValueTotals {
        traffic: traffic_totals(window.iter().map(|m| &m.traffic)),
        yearly_traffic_value,
        monthly_traffic_value: yearly_traffic_value / MONTHS_PER_YEAR,
        daily_traffic_value: yearly_traffic_value / DAYS_PER_YEAR,
    };
    debug!(
        months = monthly_data.len(),
        yearly_traffic_value, "ad-value simulation complete"
    );

    SimulationResult {
        monthly_data,
        totals,
        funnel: None,
    }
}

/// Blended CPC-equivalent (one paid click per 300 organic) plus CPM-equivalent value.
pub fn traffic_value(clicks: u64, config: &SimulationConfig) -> f64 {
    let clicks = clicks as f64;
    (clicks / 300.0) * config.avg_cpc + (clicks / 1000.0) * config.avg_cpm
}

pub fn simulate_ecommerce_revenue(
    config: &SimulationConfig,
) -> SimulationResult<EcommerceMonth, EcommerceTotals> {
    let aov = config.avg_product_price * AOV_UPLIFT;
    let monthly_data = simulate_traffic(config)
        .into_iter()
        .map(|traffic| {
            let cvr = conversion_rate(config, traffic.month);
            let orders = saturating_count(traffic.clicks as f64 * cvr);
            let revenue = orders as f64 * aov;
            EcommerceMonth {
                traffic,
                orders,
                revenue,
                profit: revenue * config.net_margin,
                rpv: if traffic.clicks > 0 {
                    revenue / traffic.clicks as f64
                } else {
                    0.0
                },
            }
        })
        .collect::<Vec<_>>();

    let window = trailing_window(&monthly_data);
    let traffic = traffic_totals(window.iter().map(|m| &m.traffic));
    let yearly_orders = window
        .iter()
        .fold(0_u64, |acc, m| acc.saturating_add(m.orders));
    let yearly_revenue = window.iter().map(|m| m.revenue).sum::<f64>();
    let yearly_profit = window.iter().map(|m| m.profit).sum::<f64>();
    let totals = EcommerceTotals {
        traffic,
        yearly_orders,
        yearly_revenue,
        monthly_revenue: yearly_revenue / MONTHS_PER_YEAR,
        daily_revenue: yearly_revenue / DAYS_PER_YEAR,
        yearly_profit,
        monthly_profit: yearly_profit / MONTHS_PER_YEAR,
        daily_profit: yearly_profit / DAYS_PER_YEAR,
        blended_cvr: yearly_orders as f64 / traffic.yearly_clicks.max(1) as f64,
    };
    debug!(
        months = monthly_data.len(),
        yearly_orders, yearly_revenue, "ecommerce simulation complete"
    );

    SimulationResult {
        monthly_data,
        totals,
        funnel: Some(FUNNEL_BENCHMARKS),
    }
}

/// Final visit-to-order conversion rate for a given month.
pub fn conversion_rate(config: &SimulationConfig, month: u32) -> f64 {
    let intent = &config.intent_distribution;
    let intent_multiplier =
        intent.transactional * 1.5 + intent.commercial * 1.2 + intent.informational * 0.3;
    let mobile_factor = if config.apply_mobile_penalty { 0.8 } else { 1.0 };

    base_cvr(config.store_trust)
        * brand_cvr_multiplier(config.brand_strength)
        * speed_cvr_multiplier(config.page_speed_score)
        * depth_cvr_multiplier(config.content_depth)
        * intent_multiplier
        * mobile_factor
        * cro_multiplier(month)
}

/// Conversion-optimization learning curve, flat after two years.
fn cro_multiplier(month: u32) -> f64 {
    1.0 + (month.min(CRO_HORIZON_MONTHS) as f64 / CRO_HORIZON_MONTHS as f64) * 0.2
}

fn base_cvr(store_trust: StrengthTier) -> f64 {
    match store_trust {
        StrengthTier::Low => 0.005,
        StrengthTier::Average => 0.012,
        StrengthTier::Strong => 0.025,
        StrengthTier::Elite => 0.045,
    }
}

fn brand_cvr_multiplier(brand: StrengthTier) -> f64 {
    match brand {
        StrengthTier::Low => 0.7,
        StrengthTier::Average => 1.0,
        StrengthTier::Strong => 1.35,
        StrengthTier::Elite => 1.8,
    }
}

fn speed_cvr_multiplier(score: f64) -> f64 {
    if score >= 90.0 {
        1.1
    } else if score >= 70.0 {
        1.0
    } else {
        0.8
    }
}

fn depth_cvr_multiplier(depth: ContentDepth) -> f64 {
    match depth {
        ContentDepth::Comprehensive => 1.25,
        ContentDepth::Thin => 0.6,
        ContentDepth::Average => 1.0,
    }
}

fn trailing_window<T>(data: &[T]) -> &[T] {
    &data[data.len().saturating_sub(TOTALS_WINDOW_MONTHS)..]
}

fn traffic_totals<'a>(window: impl Iterator<Item = &'a MonthlyTraffic>) -> TrafficTotals {
    let mut totals = TrafficTotals::default();
    let mut last = None;
    for month in window {
        totals.yearly_clicks = totals.yearly_clicks.saturating_add(month.clicks);
        totals.yearly_impressions = totals.yearly_impressions.saturating_add(month.impressions);
        last = Some(month);
    }

    let clicks = totals.yearly_clicks as f64;
    let impressions = totals.yearly_impressions as f64;
    totals.monthly_clicks = clicks / MONTHS_PER_YEAR;
    totals.daily_clicks = clicks / DAYS_PER_YEAR;
    totals.monthly_impressions = impressions / MONTHS_PER_YEAR;
    totals.daily_impressions = impressions / DAYS_PER_YEAR;
    totals.average_ctr = clicks / totals.yearly_impressions.max(1) as f64;
    totals.avg_position = last.map_or(0.0, |m| m.avg_position);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CompetitionLevel, IntentDistribution};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    /// The interactive tool's starting scenario.
    fn reference_config() -> SimulationConfig {
        let mut config = SimulationConfig::new(2000.0, 30.0, CompetitionLevel::Medium, 24);
        config.avg_cpc = 2.50;
        config.avg_cpm = 12.00;
        config.avg_product_price = 150.0;
        config.net_margin = 0.35;
        config.store_trust = StrengthTier::Average;
        config.apply_mobile_penalty = true;
        config
    }

    #[test]
    fn reference_scenario_produces_positive_ecommerce_totals() {
        let result = simulate_ecommerce_revenue(&reference_config());
        assert_eq!(result.monthly_data.len(), 24);
        assert!(result.totals.yearly_revenue > 0.0);
        assert!(result.totals.yearly_orders > 0);
        assert!(result.totals.yearly_profit > 0.0);
        assert_approx_tol(
            result.totals.yearly_profit,
            result.totals.yearly_revenue * 0.35,
            1e-6,
        );
        assert_eq!(result.funnel, Some(FUNNEL_BENCHMARKS));
    }

    #[test]
    fn reference_scenario_values_clicks_at_blended_rate() {
        let config = reference_config();
        let result = simulate_ad_value(&config);
        let expected = result.totals.traffic.yearly_clicks as f64 * (2.50 / 300.0 + 12.00 / 1000.0);
        assert!(result.totals.yearly_traffic_value > 0.0);
        assert_approx_tol(result.totals.yearly_traffic_value, expected, 1e-6);
    }

    #[test]
    fn traffic_value_blends_cpc_and_cpm() {
        let mut config = reference_config();
        config.avg_cpc = 3.0;
        config.avg_cpm = 10.0;
        assert_approx_tol(traffic_value(3000, &config), 30.0 + 30.0, 1e-12);
        assert_eq!(traffic_value(0, &config), 0.0);
    }

    #[test]
    fn totals_cover_only_trailing_twelve_months() {
        let mut config = reference_config();
        config.months_since_launch = 30;
        let result = simulate_ad_value(&config);
        let trailing_clicks = result.monthly_data[18..]
            .iter()
            .map(|m| m.traffic.clicks)
            .sum::<u64>();
        let all_clicks = result
            .monthly_data
            .iter()
            .map(|m| m.traffic.clicks)
            .sum::<u64>();

        assert_eq!(result.totals.traffic.yearly_clicks, trailing_clicks);
        assert!(all_clicks > trailing_clicks);
        assert_approx_tol(
            result.totals.traffic.monthly_clicks,
            trailing_clicks as f64 / 12.0,
            1e-9,
        );
        assert_approx_tol(
            result.totals.traffic.daily_clicks,
            trailing_clicks as f64 / 365.0,
            1e-9,
        );
        assert_eq!(
            result.totals.traffic.avg_position,
            result.monthly_data[29].traffic.avg_position
        );
    }

    #[test]
    fn short_horizon_totals_use_whole_sequence() {
        let mut config = reference_config();
        config.months_since_launch = 5;
        let result = simulate_ecommerce_revenue(&config);
        let orders = result.monthly_data.iter().map(|m| m.orders).sum::<u64>();
        let revenue = result.monthly_data.iter().map(|m| m.revenue).sum::<f64>();
        assert_eq!(result.totals.yearly_orders, orders);
        assert_approx_tol(result.totals.yearly_revenue, revenue, 1e-9);
        assert_approx_tol(result.totals.monthly_revenue, revenue / 12.0, 1e-9);
    }

    #[test]
    fn zero_horizon_yields_all_zero_totals() {
        let mut config = reference_config();
        config.months_since_launch = 0;

        let ad = simulate_ad_value(&config);
        assert!(ad.monthly_data.is_empty());
        assert_eq!(ad.totals, AdValueTotals::default());

        let ecom = simulate_ecommerce_revenue(&config);
        assert!(ecom.monthly_data.is_empty());
        assert_eq!(ecom.totals, EcommerceTotals::default());
    }

    #[test]
    fn blended_cvr_and_rpv_follow_orders() {
        let result = simulate_ecommerce_revenue(&reference_config());
        let totals = &result.totals;
        assert_approx_tol(
            totals.blended_cvr,
            totals.yearly_orders as f64 / totals.traffic.yearly_clicks as f64,
            1e-12,
        );
        for month in &result.monthly_data {
            if month.traffic.clicks == 0 {
                assert_eq!(month.rpv, 0.0);
            } else {
                assert_approx_tol(
                    month.rpv,
                    month.revenue / month.traffic.clicks as f64,
                    1e-12,
                );
            }
            assert_approx_tol(month.revenue, month.orders as f64 * 180.0, 1e-9);
        }
    }

    #[test]
    fn conversion_rate_stacks_every_multiplier() {
        let mut config = reference_config();
        config.intent_distribution = IntentDistribution {
            transactional: 1.0,
            commercial: 0.0,
            informational: 0.0,
        };
        config.apply_mobile_penalty = false;
        assert_approx_tol(conversion_rate(&config, 24), 0.012 * 1.5 * 1.2, 1e-12);
        assert_approx_tol(conversion_rate(&config, 12), 0.012 * 1.5 * 1.1, 1e-12);

        config.apply_mobile_penalty = true;
        config.page_speed_score = 95.0;
        config.content_depth = ContentDepth::Thin;
        config.brand_strength = StrengthTier::Strong;
        assert_approx_tol(
            conversion_rate(&config, 36),
            0.012 * 1.35 * 1.1 * 0.6 * 1.5 * 0.8 * 1.2,
            1e-12,
        );
    }

    #[test]
    fn elite_store_trust_converts_better_than_low() {
        let mut low = reference_config();
        low.store_trust = StrengthTier::Low;
        let mut elite = reference_config();
        elite.store_trust = StrengthTier::Elite;

        for month in [1, 12, 24, 48] {
            assert!(conversion_rate(&elite, month) > conversion_rate(&low, month));
        }
        assert!(
            simulate_ecommerce_revenue(&elite).totals.yearly_revenue
                > simulate_ecommerce_revenue(&low).totals.yearly_revenue
        );
    }

    #[test]
    fn cro_multiplier_saturates_at_two_years() {
        assert_approx_tol(cro_multiplier(0), 1.0, 1e-12);
        assert_approx_tol(cro_multiplier(12), 1.1, 1e-12);
        assert_approx_tol(cro_multiplier(24), 1.2, 1e-12);
        assert_approx_tol(cro_multiplier(60), 1.2, 1e-12);
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&simulate_ecommerce_revenue(&reference_config()))
            .expect("result should serialize");
        for key in [
            "\"monthlyData\"",
            "\"totals\"",
            "\"yearlyRevenue\"",
            "\"blendedCvr\"",
            "\"yearlyClicks\"",
            "\"funnel\"",
            "\"rpv\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }

        let json = serde_json::to_string(&simulate_ad_value(&reference_config()))
            .expect("result should serialize");
        assert!(json.contains("\"yearlyTrafficValue\""));
        assert!(!json.contains("\"funnel\""));
    }

    #[test]
    fn runaway_inventory_growth_saturates_totals() {
        let mut config = reference_config();
        config.months_since_launch = 120;
        config.inventory_growth_rate = 50.0;

        let ad = simulate_ad_value(&config);
        assert_eq!(ad.monthly_data.len(), 120);
        assert_eq!(ad.totals.traffic.yearly_clicks, u64::MAX);
        assert_eq!(ad.totals.traffic.yearly_impressions, u64::MAX);
        assert!((0.0..=1.0).contains(&ad.totals.traffic.average_ctr));
        assert!(ad.totals.yearly_traffic_value.is_finite());

        let ecom = simulate_ecommerce_revenue(&config);
        assert!(ecom.totals.yearly_orders > 0);
        assert!(ecom.totals.yearly_revenue.is_finite());
        assert!((0.0..=1.0).contains(&ecom.totals.blended_cvr));
        for month in &ecom.monthly_data {
            assert!(month.orders <= month.traffic.clicks);
            assert!((0.0..=1.0).contains(&month.traffic.ctr));
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_converters_are_deterministic_and_non_negative(
            total_pages in 0u32..50_000,
            domain_authority in 0u32..101,
            months in 0u32..48,
            price in 0u32..1_000,
            margin_pct in 0u32..101,
            cpc_cents in 0u32..2_000,
        ) {
            let mut config = reference_config();
            config.total_pages = total_pages as f64;
            config.domain_authority = domain_authority as f64;
            config.months_since_launch = months;
            config.avg_product_price = price as f64;
            config.net_margin = margin_pct as f64 / 100.0;
            config.avg_cpc = cpc_cents as f64 / 100.0;

            let ad = simulate_ad_value(&config);
            let ecom = simulate_ecommerce_revenue(&config);
            prop_assert_eq!(&ad, &simulate_ad_value(&config));
            prop_assert_eq!(&ecom, &simulate_ecommerce_revenue(&config));
            prop_assert_eq!(ad.monthly_data.len(), months as usize);

            for month in &ad.monthly_data {
                prop_assert!(month.traffic_value >= 0.0);
            }
            for month in &ecom.monthly_data {
                prop_assert!(month.revenue >= 0.0);
                prop_assert!(month.profit >= 0.0);
                prop_assert!(month.rpv >= 0.0);
                prop_assert!(month.orders <= month.traffic.clicks);
            }

            let window_start = ad.monthly_data.len().saturating_sub(12);
            let window_clicks = ad.monthly_data[window_start..]
                .iter()
                .map(|m| m.traffic.clicks)
                .sum::<u64>();
            prop_assert_eq!(ad.totals.traffic.yearly_clicks, window_clicks);
        }
    }
}
