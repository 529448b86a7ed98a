use std::f64::consts::PI;

use super::types::{CompetitionLevel, ContentDepth, MonthlyTraffic, SimulationConfig, StrengthTier};

#[derive(Clone, Copy, Debug)]
struct PositionSlot {
    /// Representative rank; the midpoint for ranged buckets.
    position: f64,
    ctr: f64,
}

const fn slot(position: f64, ctr: f64) -> PositionSlot {
    PositionSlot { position, ctr }
}

/// Position bins `1-3`, `4-10`, `11-20`, `21-50`, `51-100`.
const RANKING_BINS: [&[PositionSlot]; 5] = [
    &[slot(1.0, 0.27), slot(2.0, 0.15), slot(3.0, 0.11)],
    &[
        slot(4.0, 0.08),
        slot(5.0, 0.07),
        slot(6.0, 0.05),
        slot(7.0, 0.04),
        slot(8.0, 0.03),
        slot(9.0, 0.025),
        slot(10.0, 0.022),
    ],
    &[slot(15.5, 0.01)],
    &[slot(35.5, 0.003)],
    &[slot(75.5, 0.001)],
];

const BASE_BIN_WEIGHTS: [f64; 5] = [0.03, 0.12, 0.20, 0.40, 0.25];
const LOW_AUTHORITY_BIN_WEIGHTS: [f64; 5] = [0.005, 0.04, 0.12, 0.45, 0.385];

const SERP_SUPPRESSION_FACTOR: f64 = 0.8;
const CANNIBALIZATION_THRESHOLD_PAGES: f64 = 500.0;

pub fn simulate_traffic(config: &SimulationConfig) -> Vec<MonthlyTraffic> {
    let weights = ranking_weights(config.domain_authority);
    let base_impressions_per_page = competition_base_impressions(config.competition_level)
        * authority_multiplier(config.domain_authority)
        * page_speed_multiplier(config.page_speed_score);
    let serp_factor = if config.apply_serp_suppression {
        SERP_SUPPRESSION_FACTOR
    } else {
        1.0
    };
    let brand_factor = brand_ctr_multiplier(config.brand_strength);

    (1..=config.months_since_launch)
        .map(|month| {
            simulate_month(
                config,
                month,
                base_impressions_per_page,
                &weights,
                serp_factor,
                brand_factor,
            )
        })
        .collect()
}

fn simulate_month(
    config: &SimulationConfig,
    month: u32,
    base_impressions_per_page: f64,
    weights: &[f64; 5],
    serp_factor: f64,
    brand_factor: f64,
) -> MonthlyTraffic {
    let m = month as f64;
    let current_pages =
        config.total_pages * (1.0 + config.inventory_growth_rate / 100.0).powf(m - 1.0);
    let indexed_pages = (current_pages * index_rate(config, month)).floor().max(0.0);

    let mut impressions_per_page = base_impressions_per_page;
    if config.apply_content_decay && month > 12 {
        impressions_per_page *= 0.975_f64.powf(m - 12.0);
    }
    if config.apply_seasonality {
        impressions_per_page *= 1.0 + (m / 12.0 * PI * 2.0).sin() * 0.15;
    }
    if config.apply_core_update_volatility && month % 6 == 0 {
        impressions_per_page *= 0.7 + m.sin() * 0.3;
    }

    let mut impressions = (indexed_pages * impressions_per_page).floor();
    if config.apply_cannibalization_penalty && current_pages > CANNIBALIZATION_THRESHOLD_PAGES {
        let scale = (current_pages / CANNIBALIZATION_THRESHOLD_PAGES).log10();
        impressions = (impressions * (1.0 - 0.05 * scale).max(0.7)).floor();
    }
    impressions = (impressions * growth_factor(config, month)).floor().max(0.0);

    let mut clicks = 0.0;
    let mut click_rate = 0.0;
    let mut mean_position = 0.0;
    for (slots, weight) in RANKING_BINS.iter().zip(weights) {
        let share = weight / slots.len() as f64;
        let per_position = impressions * share;
        for slot in *slots {
            let slot_ctr = slot.ctr * serp_factor * brand_factor;
            clicks += per_position * slot_ctr;
            click_rate += share * slot_ctr;
            mean_position += share * slot.position;
        }
    }

    // Overflowed inventories fall back to the impression-independent rates.
    let ctr = if impressions <= 0.0 {
        0.0
    } else if impressions.is_finite() && clicks.is_finite() {
        clicks / impressions
    } else {
        click_rate
    };

    MonthlyTraffic {
        month,
        indexed_pages: saturating_count(indexed_pages),
        impressions: saturating_count(impressions),
        clicks: saturating_count(clicks),
        ctr: ctr.clamp(0.0, 1.0),
        avg_position: if impressions > 0.0 { mean_position } else { 0.0 },
        total_pages: saturating_count(current_pages),
    }
}

/// Floors a quantity into a count. Negative and NaN values map to 0 and
/// anything past `u64::MAX` (infinity included) saturates.
pub(super) fn saturating_count(value: f64) -> u64 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, u64::MAX as f64) as u64
}

fn base_index_rate(month: u32) -> f64 {
    match month {
        0 | 1 => 0.30,
        2 => 0.55,
        3 => 0.70,
        4..=5 => 0.75,
        6 => 0.85,
        7..=11 => 0.90,
        _ => 0.95,
    }
}

fn index_rate(config: &SimulationConfig, month: u32) -> f64 {
    let mut rate = base_index_rate(month) * content_depth_index_multiplier(config.content_depth);
    if config.domain_authority > 60.0 {
        rate = (rate + 0.03).min(0.98);
    }
    if config.apply_reindexation_risk && month > 3 {
        rate *= 0.985;
    }
    rate
}

/// Saturating authority-accrual curve `1 - e^(-k*m)`.
///
/// This compounds with the indexation ramp in [`index_rate`], so early months
/// are discounted twice.
fn growth_factor(config: &SimulationConfig, month: u32) -> f64 {
    let depth_speed = if config.content_depth == ContentDepth::Comprehensive {
        1.2
    } else {
        1.0
    };
    let k = (0.12 + config.domain_authority * 0.006) * depth_speed;
    1.0 - (-k * month as f64).exp()
}

fn ranking_weights(domain_authority: f64) -> [f64; 5] {
    let mut weights = BASE_BIN_WEIGHTS;
    if domain_authority > 50.0 {
        let shift = (domain_authority - 50.0) * 0.0015;
        weights[0] += shift * 2.5;
        weights[1] += shift;
        weights[4] -= shift * 3.5;
    } else if domain_authority < 20.0 {
        weights = LOW_AUTHORITY_BIN_WEIGHTS;
    }

    let total: f64 = weights.iter().sum();
    weights.map(|w| w / total)
}

fn competition_base_impressions(level: CompetitionLevel) -> f64 {
    match level {
        CompetitionLevel::Low => 90.0,
        CompetitionLevel::Medium => 375.0,
        CompetitionLevel::High => 1800.0,
    }
}

fn authority_multiplier(domain_authority: f64) -> f64 {
    if domain_authority <= 10.0 {
        0.5
    } else if domain_authority <= 30.0 {
        0.8
    } else if domain_authority <= 50.0 {
        1.0
    } else if domain_authority <= 70.0 {
        1.5
    } else {
        2.0
    }
}

fn page_speed_multiplier(score: f64) -> f64 {
    if score >= 90.0 {
        1.15
    } else if score >= 50.0 {
        1.0
    } else {
        0.85
    }
}

fn content_depth_index_multiplier(depth: ContentDepth) -> f64 {
    match depth {
        ContentDepth::Comprehensive => 1.1,
        ContentDepth::Thin => 0.7,
        ContentDepth::Average => 1.0,
    }
}

fn brand_ctr_multiplier(tier: StrengthTier) -> f64 {
    match tier {
        StrengthTier::Low => 0.8,
        StrengthTier::Average => 1.0,
        StrengthTier::Strong => 1.25,
        StrengthTier::Elite => 1.6,
    }
}
