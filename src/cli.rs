use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::debug;

use crate::api::{MAX_VARIANCE_ITERATIONS, config_from_json, run_http_server, validate_config};
use crate::core::{
    CompetitionLevel, ContentDepth, DEFAULT_ITERATIONS, IntentDistribution, MonetizationModel,
    SimulationConfig, StrengthTier, VarianceMode, sample_model_band, simulate_ad_value,
    simulate_ecommerce_revenue,
};
use crate::error::ForecastError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliModel {
    #[value(alias = "gsc")]
    AdValue,
    #[value(alias = "ecom")]
    Ecommerce,
}

impl From<CliModel> for MonetizationModel {
    fn from(value: CliModel) -> Self {
        match value {
            CliModel::AdValue => MonetizationModel::AdValue,
            CliModel::Ecommerce => MonetizationModel::Ecommerce,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliCompetition {
    Low,
    Medium,
    High,
}

impl From<CliCompetition> for CompetitionLevel {
    fn from(value: CliCompetition) -> Self {
        match value {
            CliCompetition::Low => CompetitionLevel::Low,
            CliCompetition::Medium => CompetitionLevel::Medium,
            CliCompetition::High => CompetitionLevel::High,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTier {
    Low,
    Average,
    Strong,
    Elite,
}

impl From<CliTier> for StrengthTier {
    fn from(value: CliTier) -> Self {
        match value {
            CliTier::Low => StrengthTier::Low,
            CliTier::Average => StrengthTier::Average,
            CliTier::Strong => StrengthTier::Strong,
            CliTier::Elite => StrengthTier::Elite,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliContentDepth {
    Thin,
    Average,
    Comprehensive,
}

impl From<CliContentDepth> for ContentDepth {
    fn from(value: CliContentDepth) -> Self {
        match value {
            CliContentDepth::Thin => ContentDepth::Thin,
            CliContentDepth::Average => ContentDepth::Average,
            CliContentDepth::Comprehensive => ContentDepth::Comprehensive,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "serp-forecast",
    about = "Organic search traffic forecaster with ad-value and ecommerce monetization"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON HTTP API.
    Serve(ServeArgs),
    /// Run one deterministic forecast and print the result as JSON.
    Simulate(SimulateArgs),
    /// Print median/p10/p90 uncertainty bands as JSON.
    Variance(VarianceArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, value_enum)]
    pub model: CliModel,
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    #[arg(long, help = "Pretty-print the JSON output")]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct VarianceArgs {
    #[arg(long, value_enum)]
    pub model: CliModel,
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u32,
    #[arg(long, help = "Base seed for a reproducible ensemble")]
    pub seed: Option<u64>,
    #[arg(long, help = "Skip perturbation and return the deterministic run as every band")]
    pub steady: bool,
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    #[arg(long, help = "Pretty-print the JSON output")]
    pub pretty: bool,
}

impl VarianceArgs {
    fn mode(&self) -> VarianceMode {
        match (self.steady, self.seed) {
            (true, _) => VarianceMode::Steady,
            (false, Some(seed)) => VarianceMode::Seeded(seed),
            (false, None) => VarianceMode::Random,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    #[arg(
        long,
        help = "JSON scenario file in the HTTP body format; replaces every other scenario flag"
    )]
    pub scenario: Option<PathBuf>,
    #[arg(long, default_value_t = 2000.0)]
    pub total_pages: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly inventory growth in percent")]
    pub inventory_growth_rate: f64,
    #[arg(long, default_value_t = 30.0)]
    pub domain_authority: f64,
    #[arg(long, value_enum, default_value_t = CliCompetition::Medium)]
    pub competition: CliCompetition,
    #[arg(long, default_value_t = 24, help = "Simulation horizon in months")]
    pub months: u32,
    #[arg(long, value_enum, default_value_t = CliTier::Average)]
    pub brand_strength: CliTier,
    #[arg(long, default_value_t = 70.0)]
    pub page_speed_score: f64,
    #[arg(long, value_enum, default_value_t = CliContentDepth::Average)]
    pub content_depth: CliContentDepth,
    #[arg(long, default_value_t = 2.50)]
    pub avg_cpc: f64,
    #[arg(long, default_value_t = 12.00)]
    pub avg_cpm: f64,
    #[arg(long, default_value_t = 150.0)]
    pub avg_product_price: f64,
    #[arg(long, default_value_t = 0.35, help = "Net margin as a fraction of revenue")]
    pub net_margin: f64,
    #[arg(long, value_enum, default_value_t = CliTier::Average)]
    pub store_trust: CliTier,
    #[arg(long, default_value_t = 0.25)]
    pub intent_transactional: f64,
    #[arg(long, default_value_t = 0.35)]
    pub intent_commercial: f64,
    #[arg(long, default_value_t = 0.40)]
    pub intent_informational: f64,
    #[arg(long, help = "Penalize impressions for inventories above 500 pages")]
    pub cannibalization: bool,
    #[arg(long = "no-seasonality", action = ArgAction::SetFalse)]
    pub seasonality: bool,
    #[arg(long = "no-core-update-volatility", action = ArgAction::SetFalse)]
    pub core_update_volatility: bool,
    #[arg(long, help = "Decay impressions after the first year")]
    pub content_decay: bool,
    #[arg(long = "no-serp-suppression", action = ArgAction::SetFalse)]
    pub serp_suppression: bool,
    #[arg(long)]
    pub reindexation_risk: bool,
    #[arg(long = "no-mobile-penalty", action = ArgAction::SetFalse)]
    pub mobile_penalty: bool,
}

impl ScenarioArgs {
    pub fn load(&self) -> Result<SimulationConfig, ForecastError> {
        if let Some(path) = &self.scenario {
            let json = fs::read_to_string(path).map_err(|source| ForecastError::ReadScenario {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "loaded scenario file");
            return config_from_json(&json);
        }

        let config = self.to_config();
        validate_config(&config)?;
        Ok(config)
    }

    fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            total_pages: self.total_pages,
            inventory_growth_rate: self.inventory_growth_rate,
            domain_authority: self.domain_authority,
            competition_level: self.competition.into(),
            months_since_launch: self.months,
            brand_strength: self.brand_strength.into(),
            page_speed_score: self.page_speed_score,
            content_depth: self.content_depth.into(),
            avg_cpc: self.avg_cpc,
            avg_cpm: self.avg_cpm,
            avg_product_price: self.avg_product_price,
            net_margin: self.net_margin,
            store_trust: self.store_trust.into(),
            intent_distribution: IntentDistribution {
                transactional: self.intent_transactional,
                commercial: self.intent_commercial,
                informational: self.intent_informational,
            },
            apply_cannibalization_penalty: self.cannibalization,
            apply_seasonality: self.seasonality,
            apply_core_update_volatility: self.core_update_volatility,
            apply_content_decay: self.content_decay,
            apply_serp_suppression: self.serp_suppression,
            apply_reindexation_risk: self.reindexation_risk,
            apply_mobile_penalty: self.mobile_penalty,
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), ForecastError> {
    match cli.command {
        Command::Serve(args) => run_http_server(args.bind, args.port).await,
        Command::Simulate(args) => {
            let output = simulate_json(&args)?;
            println!("{output}");
            Ok(())
        }
        Command::Variance(args) => {
            let output = variance_json(&args)?;
            println!("{output}");
            Ok(())
        }
    }
}

fn simulate_json(args: &SimulateArgs) -> Result<String, ForecastError> {
    let config = args.scenario.load()?;
    match MonetizationModel::from(args.model) {
        MonetizationModel::AdValue => render(&simulate_ad_value(&config), args.pretty),
        MonetizationModel::Ecommerce => render(&simulate_ecommerce_revenue(&config), args.pretty),
    }
}

fn variance_json(args: &VarianceArgs) -> Result<String, ForecastError> {
    if args.iterations > MAX_VARIANCE_ITERATIONS {
        return Err(ForecastError::TooManyIterations {
            iterations: args.iterations,
            limit: MAX_VARIANCE_ITERATIONS,
        });
    }
    let config = args.scenario.load()?;
    let band = sample_model_band(&config, args.model.into(), args.iterations, args.mode());
    render(&band, args.pretty)
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, ForecastError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
