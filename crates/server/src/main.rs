//! Festive Analytics — synthetic festival-season dataset and dashboard API
//!
//! Usage:
//!   festive-analytics serve --port 5000      — Launch the API server
//!   festive-analytics seed                   — Regenerate the dataset from CLI

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use engine::{
    optional_range, required_range, seed_all_data, Analytics, AnalyticsError, SeedSummary,
    SimulationConfig, DEFAULT_LAG_DAYS,
};
use persistence::repository::DatasetRepository;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "data/ecommerce_festive.db";

#[derive(Parser)]
#[command(name = "festive-analytics")]
#[command(about = "Festival sales vs. social buzz analytics", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fix the RNG seed so every reseed produces the same dataset
    #[arg(long, global = true)]
    rng_seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the analytics API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
        /// Regenerate the dataset before serving
        #[arg(long)]
        seed: bool,
    },
    /// Regenerate the full dataset and exit
    Seed,
}

/// Settings resolved from CLI flags and the environment
#[derive(Debug, Clone)]
struct AppConfig {
    db_path: String,
    rng_seed: Option<u64>,
}

impl AppConfig {
    fn resolve(cli_rng_seed: Option<u64>) -> Self {
        let db_path =
            std::env::var("FESTIVE_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let rng_seed = cli_rng_seed.or_else(|| {
            let raw = std::env::var("FESTIVE_RNG_SEED").ok()?;
            parse_rng_seed(&raw)
        });
        Self { db_path, rng_seed }
    }

    fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Unparseable seeds are reported and ignored, leaving the RNG on entropy
fn parse_rng_seed(raw: &str) -> Option<u64> {
    match raw.trim().parse() {
        Ok(seed) => Some(seed),
        Err(e) => {
            warn!("Ignoring FESTIVE_RNG_SEED '{raw}': {e}");
            None
        }
    }
}

#[derive(Clone)]
struct AppState {
    db: Arc<persistence::Database>,
    config: Arc<AppConfig>,
    simulation: Arc<SimulationConfig>,
    /// Serializes reseeds; readers never take it
    seed_lock: Arc<Mutex<()>>,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug,festive_analytics=debug")
    } else {
        EnvFilter::new("info,engine=info,persistence=info,festive_analytics=info,sqlx=warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::resolve(cli.rng_seed);

    match cli.command {
        Commands::Serve { host, port, seed } => {
            cmd_serve(config, &host, port, seed).await?;
        }
        Commands::Seed => {
            cmd_seed(config).await?;
        }
    }

    Ok(())
}

async fn open_database(path: &str) -> anyhow::Result<persistence::Database> {
    let db = persistence::Database::new(path).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;
    info!("Database initialized: {}", path);
    Ok(db)
}

// ============================================================================
// Seed command — CLI mode (no web server)
// ============================================================================

async fn cmd_seed(config: AppConfig) -> anyhow::Result<()> {
    let db = open_database(&config.db_path).await?;
    let simulation = SimulationConfig::default();
    let mut rng = config.rng();

    let summary = seed_all_data(&db, &simulation, &mut rng)
        .await
        .map_err(|e| anyhow::anyhow!("Seeding failed: {}", e))?;

    println!("\nSeeded {}", config.db_path);
    println!(
        "  {} festivals | {} days | {} social rows | {} derived rows",
        summary.festivals, summary.days, summary.social_metrics, summary.derived_metrics
    );
    Ok(())
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/seed", post(api_seed))
        .route("/festivals", get(api_festivals))
        .route("/summary", get(api_summary))
        .route("/timeline", get(api_timeline))
        .route("/social-breakdown", get(api_social_breakdown))
        .route("/lag-analysis", get(api_lag_analysis))
        .route("/counterfactual", get(api_counterfactual))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

async fn cmd_serve(config: AppConfig, host: &str, port: u16, seed: bool) -> anyhow::Result<()> {
    info!("Festive Analytics v{} starting...", APP_VERSION);

    let db = open_database(&config.db_path).await?;
    let simulation = SimulationConfig::default();

    if seed {
        let summary = seed_all_data(&db, &simulation, &mut config.rng())
            .await
            .map_err(|e| anyhow::anyhow!("Seeding failed: {}", e))?;
        info!(days = summary.days, "Dataset regenerated on startup");
    }

    let db_path = config.db_path.clone();
    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config),
        simulation: Arc::new(simulation),
        seed_lock: Arc::new(Mutex::new(())),
    };
    let app = build_router(state);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Festive Analytics v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health              - Health check");
    println!("  POST /api/seed                - Regenerate the dataset");
    println!("  GET  /api/festivals           - Festival calendar");
    println!("  GET  /api/summary             - Headline KPIs");
    println!("  GET  /api/timeline            - Daily sales, buzz and uplift");
    println!("  GET  /api/social-breakdown    - Per-platform engagement");
    println!("  GET  /api/lag-analysis        - Buzz shifted by ?lag days vs. sales");
    println!("  GET  /api/counterfactual      - Actual vs. baseline (range required)");
    println!("\n  Database: {}", db_path);
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Errors and query parsing
// ============================================================================

/// Error response: `{ "error": message }` with a status code
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::MissingRange | AnalyticsError::InvalidRange { .. } => {
                ApiError::bad_request(e.to_string())
            }
            AnalyticsError::Db(_) => {
                error!("Analytics query failed: {}", e);
                ApiError::internal(e.to_string())
            }
        }
    }
}

/// Query params shared by the date-ranged endpoints
#[derive(Debug, Default, Deserialize)]
struct RangeParams {
    start_date: Option<String>,
    end_date: Option<String>,
}

impl RangeParams {
    fn dates(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), ApiError> {
        Ok((
            parse_date("start_date", self.start_date.as_deref())?,
            parse_date("end_date", self.end_date.as_deref())?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
struct LagParams {
    lag: Option<String>,
    #[serde(flatten)]
    range: RangeParams,
}

/// Blank values count as absent
fn parse_date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let s = match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => return Ok(None),
    };
    let message = format!("Invalid {name}: expected YYYY-MM-DD, got '{s}'");
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::bad_request(message))
}

fn parse_lag(value: Option<&str>) -> Result<usize, ApiError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_LAG_DAYS),
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Invalid lag: '{s}'"))),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "festive-analytics",
        "version": APP_VERSION,
    }))
}

/// Seed response: the row counts sit next to the message
#[derive(Debug, Serialize)]
struct SeedResponse {
    message: &'static str,
    #[serde(flatten)]
    summary: SeedSummary,
}

/// POST /api/seed — regenerate and atomically replace the dataset
async fn api_seed(State(state): State<AppState>) -> Result<Json<SeedResponse>, ApiError> {
    let _guard = state.seed_lock.lock().await;
    let mut rng = state.config.rng();

    info!("Reseed requested via API");
    match seed_all_data(state.db.as_ref(), &state.simulation, &mut rng).await {
        Ok(summary) => Ok(Json(SeedResponse {
            message: "Database seeded successfully",
            summary,
        })),
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

/// GET /api/festivals
async fn api_festivals(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = DatasetRepository::new(state.db.pool());
    let festivals = repo.festivals().await.map_err(|e| {
        error!("Failed to load festivals: {}", e);
        ApiError::internal(e.to_string())
    })?;
    Ok(Json(serde_json::json!(festivals)))
}

/// GET /api/summary — headline KPIs, optionally ranged
async fn api_summary(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (start, end) = params.dates()?;
    let range = optional_range(start, end)?;
    let analytics = Analytics::new(state.db.pool());
    let summary = analytics.summary(range).await?;
    Ok(Json(serde_json::json!(summary)))
}

/// GET /api/timeline
async fn api_timeline(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (start, end) = params.dates()?;
    let range = optional_range(start, end)?;
    let analytics = Analytics::new(state.db.pool());
    let points = analytics.timeline(range).await?;
    Ok(Json(serde_json::json!(points)))
}

/// GET /api/social-breakdown
async fn api_social_breakdown(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (start, end) = params.dates()?;
    let range = optional_range(start, end)?;
    let analytics = Analytics::new(state.db.pool());
    let rows = analytics.social_breakdown(range).await?;
    Ok(Json(serde_json::json!(rows)))
}

/// GET /api/lag-analysis — `?lag=N` (default 3)
async fn api_lag_analysis(
    State(state): State<AppState>,
    Query(params): Query<LagParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lag = parse_lag(params.lag.as_deref())?;
    let (start, end) = params.range.dates()?;
    let range = optional_range(start, end)?;
    let analytics = Analytics::new(state.db.pool());
    let points = analytics.lag_analysis(lag, range).await?;
    Ok(Json(serde_json::json!(points)))
}

/// GET /api/counterfactual — range required
async fn api_counterfactual(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (start, end) = params.dates()?;
    let range = required_range(start, end)?;
    let analytics = Analytics::new(state.db.pool());
    let report = analytics.counterfactual(range).await?;
    Ok(Json(serde_json::json!(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> AppState {
        AppState {
            db: Arc::new(persistence::Database::in_memory().await.unwrap()),
            config: Arc::new(AppConfig {
                db_path: ":memory:".to_string(),
                rng_seed: Some(42),
            }),
            simulation: Arc::new(SimulationConfig::default()),
            seed_lock: Arc::new(Mutex::new(())),
        }
    }

    fn range(start: &str, end: &str) -> RangeParams {
        RangeParams {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    #[test]
    fn test_parse_date_accepts_iso_and_blank() {
        assert_eq!(
            parse_date("start_date", Some("2023-11-05")).unwrap(),
            NaiveDate::from_ymd_opt(2023, 11, 5)
        );
        assert_eq!(parse_date("start_date", Some("  ")).unwrap(), None);
        assert_eq!(parse_date("start_date", None).unwrap(), None);
        let err = parse_date("end_date", Some("11/05/2023")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_lag_defaults_to_three() {
        assert_eq!(parse_lag(None).unwrap(), 3);
        assert_eq!(parse_lag(Some("7")).unwrap(), 7);
        let err = parse_lag(Some("-1")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bad_rng_seed_falls_back_to_entropy() {
        assert_eq!(parse_rng_seed("42"), Some(42));
        assert_eq!(parse_rng_seed(" 7 "), Some(7));
        assert_eq!(parse_rng_seed("not-a-seed"), None);
        assert_eq!(parse_rng_seed("-3"), None);
    }

    #[tokio::test]
    async fn test_counterfactual_requires_range() {
        let state = test_state().await;
        let err = api_counterfactual(State(state.clone()), Query(RangeParams::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Date range required");

        let half = RangeParams {
            start_date: Some("2023-01-01".to_string()),
            end_date: None,
        };
        let err = api_counterfactual(State(state), Query(half))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reversed_range_is_client_error() {
        let state = test_state().await;
        let err = api_timeline(State(state), Query(range("2023-12-01", "2023-01-01")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_seed_then_query() {
        let state = test_state().await;
        let Json(seeded) = api_seed(State(state.clone())).await.unwrap();
        let body = serde_json::to_value(&seeded).unwrap();
        assert_eq!(body["message"], "Database seeded successfully");
        assert_eq!(body["festivals"], 5);
        assert_eq!(body["days"], 365);
        assert_eq!(body["social_metrics"], 1095);
        assert_eq!(body["derived_metrics"], 365);
        assert!(body.get("summary").is_none());

        let Json(festivals) = api_festivals(State(state.clone())).await.unwrap();
        assert_eq!(festivals.as_array().unwrap().len(), 5);
        assert_eq!(festivals[0]["start_date"], "2023-01-20");

        let Json(report) = api_counterfactual(
            State(state.clone()),
            Query(range("2023-11-01", "2023-11-10")),
        )
        .await
        .unwrap();
        assert_eq!(report["chart_data"].as_array().unwrap().len(), 10);

        let Json(lagged) = api_lag_analysis(State(state), Query(LagParams::default()))
            .await
            .unwrap();
        assert_eq!(lagged.as_array().unwrap().len(), 362);
        assert_eq!(lagged[0]["date"], "2023-01-04");
    }
}
