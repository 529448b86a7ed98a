use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::core::{
    DEFAULT_ITERATIONS, MonetizationModel, SimulationConfig, VarianceMode, sample_model_band,
    simulate_ad_value, simulate_ecommerce_revenue,
};
use crate::error::ForecastError;

/// Longest horizon accepted from outside callers.
pub const MAX_HORIZON_MONTHS: u32 = 600;
/// Largest ensemble accepted from outside callers.
pub const MAX_VARIANCE_ITERATIONS: u32 = 1000;

const INVALID_INPUT_MESSAGE: &str = "Invalid inputs provided";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariancePayload {
    #[serde(flatten)]
    config: SimulationConfig,
    model: MonetizationModel,
    #[serde(default = "default_iterations")]
    iterations: u32,
    #[serde(default = "default_randomize")]
    randomize: bool,
    #[serde(default)]
    seed: Option<u64>,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_randomize() -> bool {
    true
}

impl VariancePayload {
    fn mode(&self) -> VarianceMode {
        match (self.randomize, self.seed) {
            (false, _) => VarianceMode::Steady,
            (true, Some(seed)) => VarianceMode::Seeded(seed),
            (true, None) => VarianceMode::Random,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate/gsc", post(ad_value_handler))
        .route("/api/simulate/ecom", post(ecommerce_handler))
        .route("/api/simulate/variance", post(variance_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(bind: IpAddr, port: u16) -> Result<(), ForecastError> {
    let addr = SocketAddr::new(bind, port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "forecast HTTP API listening");

    axum::serve(listener, router()).await?;
    Ok(())
}

/// Boundary checks applied before any engine call.
pub fn validate_config(config: &SimulationConfig) -> Result<(), ForecastError> {
    if config.months_since_launch > MAX_HORIZON_MONTHS {
        return Err(ForecastError::HorizonTooLong {
            months: config.months_since_launch,
            limit: MAX_HORIZON_MONTHS,
        });
    }
    Ok(())
}

pub fn config_from_json(json: &str) -> Result<SimulationConfig, ForecastError> {
    let config = serde_json::from_str::<SimulationConfig>(json)?;
    validate_config(&config)?;
    Ok(config)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn ad_value_handler(payload: Result<Json<SimulationConfig>, JsonRejection>) -> Response {
    match accept_config(payload) {
        Ok(config) => json_response(StatusCode::OK, simulate_ad_value(&config)),
        Err(err) => invalid_input(err),
    }
}

async fn ecommerce_handler(payload: Result<Json<SimulationConfig>, JsonRejection>) -> Response {
    match accept_config(payload) {
        Ok(config) => json_response(StatusCode::OK, simulate_ecommerce_revenue(&config)),
        Err(err) => invalid_input(err),
    }
}

async fn variance_handler(payload: Result<Json<VariancePayload>, JsonRejection>) -> Response {
    let payload = match accept_variance(payload) {
        Ok(payload) => payload,
        Err(err) => return invalid_input(err),
    };

    let mode = payload.mode();
    let VariancePayload {
        config,
        model,
        iterations,
        ..
    } = payload;
    let sampled =
        tokio::task::spawn_blocking(move || sample_model_band(&config, model, iterations, mode))
            .await;

    match sampled {
        Ok(band) => json_response(StatusCode::OK, band),
        Err(err) => {
            error!(%err, "variance sampling task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Simulation failed")
        }
    }
}

fn accept_config(
    payload: Result<Json<SimulationConfig>, JsonRejection>,
) -> Result<SimulationConfig, ForecastError> {
    let Json(config) = payload.map_err(|e| ForecastError::InvalidInput(e.body_text()))?;
    validate_config(&config)?;
    Ok(config)
}

fn accept_variance(
    payload: Result<Json<VariancePayload>, JsonRejection>,
) -> Result<VariancePayload, ForecastError> {
    let Json(payload) = payload.map_err(|e| ForecastError::InvalidInput(e.body_text()))?;
    validate_config(&payload.config)?;
    if payload.iterations > MAX_VARIANCE_ITERATIONS {
        return Err(ForecastError::TooManyIterations {
            iterations: payload.iterations,
            limit: MAX_VARIANCE_ITERATIONS,
        });
    }
    Ok(payload)
}

fn invalid_input(err: ForecastError) -> Response {
    warn!(%err, "rejected simulation request");
    error_response(StatusCode::BAD_REQUEST, INVALID_INPUT_MESSAGE)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
