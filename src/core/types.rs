use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
}

/// Four-step strength scale shared by brand strength and store trust.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthTier {
    Low,
    #[default]
    Average,
    Strong,
    Elite,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDepth {
    Thin,
    #[default]
    Average,
    Comprehensive,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonetizationModel {
    #[serde(alias = "gsc", alias = "adValue", alias = "ad_value")]
    AdValue,
    #[serde(alias = "ecom")]
    Ecommerce,
}

/// Search-intent weights. They are not required to sum to 1.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentDistribution {
    pub transactional: f64,
    pub commercial: f64,
    pub informational: f64,
}

impl Default for IntentDistribution {
    fn default() -> Self {
        Self {
            transactional: 0.25,
            commercial: 0.35,
            informational: 0.40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub total_pages: f64,
    /// Monthly inventory growth in percent.
    #[serde(default)]
    pub inventory_growth_rate: f64,
    pub domain_authority: f64,
    #[serde(rename = "competition", alias = "competitionLevel")]
    pub competition_level: CompetitionLevel,
    pub months_since_launch: u32,
    #[serde(default)]
    pub brand_strength: StrengthTier,
    #[serde(default = "default_page_speed_score")]
    pub page_speed_score: f64,
    #[serde(default)]
    pub content_depth: ContentDepth,

    #[serde(default)]
    pub avg_cpc: f64,
    #[serde(default)]
    pub avg_cpm: f64,

    #[serde(default)]
    pub avg_product_price: f64,
    #[serde(default)]
    pub net_margin: f64,
    #[serde(default)]
    pub store_trust: StrengthTier,
    #[serde(default)]
    pub intent_distribution: IntentDistribution,

    #[serde(default)]
    pub apply_cannibalization_penalty: bool,
    #[serde(default)]
    pub apply_seasonality: bool,
    #[serde(default)]
    pub apply_core_update_volatility: bool,
    #[serde(default)]
    pub apply_content_decay: bool,
    #[serde(default)]
    pub apply_serp_suppression: bool,
    #[serde(default)]
    pub apply_reindexation_risk: bool,
    #[serde(default = "default_true")]
    pub apply_mobile_penalty: bool,
}

fn default_page_speed_score() -> f64 {
    70.0
}

fn default_true() -> bool {
    true
}

impl SimulationConfig {
    /// A config with every optional field at its default.
    pub fn new(
        total_pages: f64,
        domain_authority: f64,
        competition_level: CompetitionLevel,
        months_since_launch: u32,
    ) -> Self {
        Self {
            total_pages,
            inventory_growth_rate: 0.0,
            domain_authority,
            competition_level,
            months_since_launch,
            brand_strength: StrengthTier::Average,
            page_speed_score: default_page_speed_score(),
            content_depth: ContentDepth::Average,
            avg_cpc: 0.0,
            avg_cpm: 0.0,
            avg_product_price: 0.0,
            net_margin: 0.0,
            store_trust: StrengthTier::Average,
            intent_distribution: IntentDistribution::default(),
            apply_cannibalization_penalty: false,
            apply_seasonality: false,
            apply_core_update_volatility: false,
            apply_content_decay: false,
            apply_serp_suppression: false,
            apply_reindexation_risk: false,
            apply_mobile_penalty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTraffic {
    pub month: u32,
    pub indexed_pages: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub ctr: f64,
    pub avg_position: f64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdValueMonth {
    #[serde(flatten)]
    pub traffic: MonthlyTraffic,
    pub traffic_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcommerceMonth {
    #[serde(flatten)]
    pub traffic: MonthlyTraffic,
    pub orders: u64,
    pub revenue: f64,
    pub profit: f64,
    pub rpv: f64,
}

/// Traffic aggregates shared by both monetization views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficTotals {
    pub yearly_clicks: u64,
    pub monthly_clicks: f64,
    pub daily_clicks: f64,
    pub yearly_impressions: u64,
    pub monthly_impressions: f64,
    pub daily_impressions: f64,
    pub average_ctr: f64,
    pub avg_position: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdValueTotals {
    #[serde(flatten)]
    pub traffic: TrafficTotals,
    pub yearly_traffic_value: f64,
    pub monthly_traffic_value: f64,
    pub daily_traffic_value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcommerceTotals {
    #[serde(flatten)]
    pub traffic: TrafficTotals,
    pub yearly_orders: u64,
    pub yearly_revenue: f64,
    pub monthly_revenue: f64,
    pub daily_revenue: f64,
    pub yearly_profit: f64,
    pub monthly_profit: f64,
    pub daily_profit: f64,
    pub blended_cvr: f64,
}

/// Fixed checkout-funnel benchmarks reported alongside ecommerce results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelRates {
    pub atc: f64,
    pub checkout: f64,
    pub purchase: f64,
}

pub const FUNNEL_BENCHMARKS: FunnelRates = FunnelRates {
    atc: 0.08,
    checkout: 0.60,
    purchase: 0.55,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult<M, T> {
    pub monthly_data: Vec<M>,
    pub totals: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel: Option<FunnelRates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceBand<M> {
    pub median: Vec<M>,
    pub p10: Vec<M>,
    pub p90: Vec<M>,
}

/// Variance bands for a model chosen at runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelBand {
    AdValue(VarianceBand<AdValueMonth>),
    Ecommerce(VarianceBand<EcommerceMonth>),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VarianceMode {
    /// No perturbation; all three bands equal the deterministic run.
    Steady,
    /// Reproducible ensemble derived from the given base seed.
    Seeded(u64),
    /// Ensemble seeded from the thread RNG.
    Random,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_with_documented_defaults() {
        let json = r#"{
          "totalPages": 2000,
          "domainAuthority": 30,
          "competition": "medium",
          "monthsSinceLaunch": 24
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).expect("valid config");

        assert_eq!(config.competition_level, CompetitionLevel::Medium);
        assert_eq!(config.brand_strength, StrengthTier::Average);
        assert_eq!(config.store_trust, StrengthTier::Average);
        assert_eq!(config.content_depth, ContentDepth::Average);
        assert_eq!(config.page_speed_score, 70.0);
        assert_eq!(config.inventory_growth_rate, 0.0);
        assert_eq!(config.intent_distribution, IntentDistribution::default());
        assert!(config.apply_mobile_penalty);
        assert!(!config.apply_seasonality);
        assert!(!config.apply_cannibalization_penalty);
        assert_eq!(
            config,
            SimulationConfig::new(2000.0, 30.0, CompetitionLevel::Medium, 24)
        );
    }

    #[test]
    fn config_rejects_missing_required_fields() {
        let json = r#"{ "totalPages": 2000, "competition": "medium" }"#;
        assert!(serde_json::from_str::<SimulationConfig>(json).is_err());
    }

    #[test]
    fn config_rejects_unknown_enum_values() {
        let json = r#"{
          "totalPages": 10,
          "domainAuthority": 30,
          "competition": "extreme",
          "monthsSinceLaunch": 3
        }"#;
        assert!(serde_json::from_str::<SimulationConfig>(json).is_err());
    }

    #[test]
    fn monetized_month_flattens_traffic_fields() {
        let month = AdValueMonth {
            traffic: MonthlyTraffic {
                month: 1,
                indexed_pages: 3,
                impressions: 100,
                clicks: 2,
                ctr: 0.02,
                avg_position: 37.0,
                total_pages: 10,
            },
            traffic_value: 1.5,
        };
        let json = serde_json::to_string(&month).expect("serializes");
        assert!(json.contains("\"indexedPages\":3"));
        assert!(json.contains("\"avgPosition\":37.0"));
        assert!(json.contains("\"trafficValue\":1.5"));
        assert!(!json.contains("\"traffic\""));
    }

    #[test]
    fn model_accepts_short_and_long_names() {
        for (raw, expected) in [
            ("\"gsc\"", MonetizationModel::AdValue),
            ("\"ad-value\"", MonetizationModel::AdValue),
            ("\"ecom\"", MonetizationModel::Ecommerce),
            ("\"ecommerce\"", MonetizationModel::Ecommerce),
        ] {
            let model: MonetizationModel = serde_json::from_str(raw).expect("known model");
            assert_eq!(model, expected);
        }
    }
}
