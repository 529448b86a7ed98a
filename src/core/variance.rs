use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use super::monetize::MonetizedMonth;
use super::types::{
    AdValueMonth, EcommerceMonth, ModelBand, MonetizationModel, SimulationConfig, VarianceBand,
    VarianceMode,
};

pub const DEFAULT_ITERATIONS: u32 = 30;

/// Half-width of the uniform domain-authority perturbation per trial.
const AUTHORITY_JITTER: f64 = 2.0;

const MEDIAN_PCT: f64 = 0.5;
const LOW_PCT: f64 = 0.1;
const HIGH_PCT: f64 = 0.9;

/// Bands for a model chosen at runtime. `enable_randomness == false` is the
/// reproducible mode: no perturbation and no randomness consumed.
pub fn sample_variance(
    config: &SimulationConfig,
    model: MonetizationModel,
    iterations: u32,
    enable_randomness: bool,
) -> ModelBand {
    let mode = if enable_randomness {
        VarianceMode::Random
    } else {
        VarianceMode::Steady
    };
    sample_model_band(config, model, iterations, mode)
}

pub fn sample_model_band(
    config: &SimulationConfig,
    model: MonetizationModel,
    iterations: u32,
    mode: VarianceMode,
) -> ModelBand {
    match model {
        MonetizationModel::AdValue => {
            ModelBand::AdValue(sample_band::<AdValueMonth>(config, iterations, mode))
        }
        MonetizationModel::Ecommerce => {
            ModelBand::Ecommerce(sample_band::<EcommerceMonth>(config, iterations, mode))
        }
    }
}

pub fn sample_band<M: MonetizedMonth>(
    config: &SimulationConfig,
    iterations: u32,
    mode: VarianceMode,
) -> VarianceBand<M> {
    let base_seed = match mode {
        _ if iterations == 0 => None,
        VarianceMode::Steady => None,
        VarianceMode::Seeded(seed) => Some(seed),
        VarianceMode::Random => Some(rand::random::<u64>()),
    };

    let Some(base_seed) = base_seed else {
        let monthly = M::simulate(config).monthly_data;
        return VarianceBand {
            median: monthly.clone(),
            p10: monthly.clone(),
            p90: monthly,
        };
    };

    debug!(
        model = ?M::MODEL,
        iterations,
        base_seed,
        months = config.months_since_launch,
        "sampling variance bands"
    );

    let trials = (0..iterations)
        .into_par_iter()
        .map(|trial| run_trial::<M>(config, base_seed, trial))
        .collect::<Vec<_>>();

    reduce_trials(&trials, config.months_since_launch as usize)
}

fn run_trial<M: MonetizedMonth>(config: &SimulationConfig, base_seed: u64, trial: u32) -> Vec<M> {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(base_seed, trial));
    let mut perturbed = config.clone();
    perturbed.domain_authority += rng.gen_range(-AUTHORITY_JITTER..=AUTHORITY_JITTER);
    M::simulate(&perturbed).monthly_data
}

fn reduce_trials<M: MonetizedMonth>(trials: &[Vec<M>], months: usize) -> VarianceBand<M> {
    let mut band = VarianceBand {
        median: Vec::with_capacity(months),
        p10: Vec::with_capacity(months),
        p90: Vec::with_capacity(months),
    };
    let Some(template_run) = trials.first() else {
        return band;
    };

    let mut clicks = Vec::with_capacity(trials.len());
    let mut metrics = Vec::with_capacity(trials.len());
    for (idx, template) in template_run.iter().enumerate().take(months) {
        clicks.clear();
        metrics.clear();
        for run in trials {
            if let Some(month) = run.get(idx) {
                clicks.push(month.traffic().clicks);
                metrics.push(month.metric());
            }
        }
        clicks.sort_unstable();
        metrics.sort_by(|a, b| a.total_cmp(b));

        band.median.push(template.with_banded(
            order_statistic(&clicks, MEDIAN_PCT),
            order_statistic(&metrics, MEDIAN_PCT),
        ));
        band.p10.push(template.with_banded(
            order_statistic(&clicks, LOW_PCT),
            order_statistic(&metrics, LOW_PCT),
        ));
        band.p90.push(template.with_banded(
            order_statistic(&clicks, HIGH_PCT),
            order_statistic(&metrics, HIGH_PCT),
        ));
    }
    band
}

/// Value at index `floor(n * pct)` of an ascending sample, without interpolation.
fn order_statistic<T: Copy>(sorted: &[T], pct: f64) -> T {
    let idx = ((sorted.len() as f64 * pct).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

fn derive_seed(base_seed: u64, trial: u32) -> u64 {
    splitmix64(base_seed ^ ((trial as u64) << 32) ^ trial as u64)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
