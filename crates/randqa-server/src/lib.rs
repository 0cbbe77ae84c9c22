//! HTTP wrapper around the randqa test battery.
//!
//! Endpoints:
//! - `GET /` API index
//! - `GET /health` liveness check
//! - `GET /analyze?source=&bits=&block_size=&ml_k=&seed=&alpha=&rct_cutoff=&apt_window=`

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use randqa_core::{MAX_ML_K, RunConfig, SourceKind, bits_from_source};
use randqa_tests::{TestSuiteResult, run_tests};

/// Largest bit count a single request may ask for.
pub const MAX_BITS: usize = 2_000_000;
const DEFAULT_BITS: usize = 100_000;
const DEFAULT_SEED: u32 = 42;

/// Shared server state.
struct AppState {
    defaults: RunConfig,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeParams {
    source: Option<String>,
    bits: Option<usize>,
    block_size: Option<usize>,
    ml_k: Option<usize>,
    seed: Option<u32>,
    alpha: Option<f64>,
    rct_cutoff: Option<usize>,
    apt_window: Option<usize>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    source: String,
    bits: usize,
    block_size: usize,
    ml_k: usize,
    /// Null for unseeded sources.
    seed: Option<u32>,
    results: TestSuiteResult,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn bad_request(error: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

async fn handle_analyze(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
) -> ApiResult<AnalyzeResponse> {
    let kind: SourceKind = params
        .source
        .as_deref()
        .unwrap_or("lcg")
        .parse()
        .map_err(bad_request)?;
    let bits = params.bits.unwrap_or(DEFAULT_BITS).clamp(1, MAX_BITS);
    let seed = params.seed.unwrap_or(DEFAULT_SEED);

    let defaults = &state.defaults;
    let config = RunConfig {
        block_size: params.block_size.unwrap_or(defaults.block_size),
        ml_k: params.ml_k.unwrap_or(defaults.ml_k),
        alpha: params.alpha.unwrap_or(defaults.alpha),
        rct_cutoff: params.rct_cutoff.unwrap_or(defaults.rct_cutoff),
        apt_window: params.apt_window.unwrap_or(defaults.apt_window),
        train_fraction: defaults.train_fraction,
    };
    config.validate().map_err(bad_request)?;

    let job_config = config.clone();
    let results = tokio::task::spawn_blocking(move || {
        let mut src = kind.build(seed);
        let acquired = bits_from_source(src.as_mut(), bits);
        run_tests(&acquired.bits, &job_config)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("analysis task failed: {e}"),
            }),
        )
    })?
    .map_err(bad_request)?;

    Ok(Json(AnalyzeResponse {
        source: kind.name().to_string(),
        bits,
        block_size: config.block_size,
        ml_k: config.ml_k,
        seed: kind.is_seeded().then_some(seed),
        results,
    }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let sources: Vec<&str> = SourceKind::ALL.iter().map(|k| k.name()).collect();
    let d = &state.defaults;
    Json(serde_json::json!({
        "name": "randqa server",
        "version": randqa_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/health": "Health check",
            "/analyze": {
                "method": "GET",
                "description": "Sample a source and run the full test battery",
                "params": {
                    "source": format!("One of: {} (default: lcg)", sources.join(", ")),
                    "bits": format!("Bits to sample (1-{MAX_BITS}, default: {DEFAULT_BITS})"),
                    "block_size": format!("Block Frequency block size (default: {})", d.block_size),
                    "ml_k": format!("ML history length, 1-{MAX_ML_K} (default: {})", d.ml_k),
                    "seed": format!("PRNG seed, ignored for osrandom (default: {DEFAULT_SEED})"),
                    "alpha": format!("Significance level (default: {})", d.alpha),
                    "rct_cutoff": format!("Repetition Count cutoff (default: {})", d.rct_cutoff),
                    "apt_window": format!("Adaptive Proportion window (default: {})", d.apt_window),
                }
            },
        },
        "examples": {
            "weak_prng": "/analyze?source=lcg&bits=100000&block_size=128&ml_k=8&seed=42",
            "os_random": "/analyze?source=osrandom&bits=200000",
        }
    }))
}

/// Build the axum router. `defaults` fills in parameters a request omits.
pub fn build_router(defaults: RunConfig) -> Router {
    let state = Arc::new(AppState { defaults });

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/analyze", get(handle_analyze))
        .with_state(state)
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn run_server(host: &str, port: u16, defaults: RunConfig) -> std::io::Result<()> {
    let app = build_router(defaults);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, app).await
}
