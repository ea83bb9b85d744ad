use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use benefit_match::config::AppConfig;
use benefit_match::error::AppError;
use benefit_match::telemetry;
use benefit_match::workflows::recommendation::{
    load_catalog, load_profiles, recommendation_router, ApplicantProfile, BenefitOffer,
    ImportError, InMemoryCatalog, InMemoryProfileStore, MatchingEngine, MatchingPolicy,
    ProfileRecord, RecommendationService, SystemClock,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Benefit Match",
    about = "Match applicants to welfare and scholarship benefits and rank the results",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank a catalog file for a single profile file and print the results
    Recommend(RecommendArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Offer catalog (.json array or .csv export)
    #[arg(long)]
    catalog: PathBuf,
    /// Applicant profile as a JSON object
    #[arg(long)]
    profile: PathBuf,
    /// Evaluation instant, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,
    /// Print at most this many results
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Recommend(args) => run_recommend(args),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let offers = match &config.catalog.catalog_path {
        Some(path) => load_catalog(path)?,
        None => {
            warn!("CATALOG_PATH not set; serving an empty catalog");
            Vec::new()
        }
    };
    let profiles = match &config.catalog.profiles_path {
        Some(path) => load_profiles(path)?,
        None => Default::default(),
    };
    info!(offers = offers.len(), profiles = profiles.len(), "catalog loaded");
    let catalog = InMemoryCatalog::new(offers);
    let profiles = InMemoryProfileStore::new(profiles);

    let service = RecommendationService::new(
        Arc::new(catalog),
        Arc::new(profiles),
        Arc::new(SystemClock),
        config.matching.policy,
    )
    .with_open_windows_only(config.matching.open_windows_only);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(recommendation_router(Arc::new(service)))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "benefit matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        catalog,
        profile,
        now,
        limit,
    } = args;

    let policy = AppConfig::load()?.matching.policy;
    let offers = load_catalog(&catalog)?;
    let record: ProfileRecord =
        serde_json::from_reader(std::fs::File::open(&profile)?).map_err(ImportError::Json)?;
    let applicant = ApplicantProfile::try_from(record)?;
    let now = now.unwrap_or_else(Utc::now);

    render_recommendations(&offers, &applicant, policy, now, limit);
    Ok(())
}

fn render_recommendations(
    offers: &[BenefitOffer],
    applicant: &ApplicantProfile,
    policy: MatchingPolicy,
    now: DateTime<Utc>,
    limit: Option<usize>,
) {
    let engine = MatchingEngine::new(policy);
    let ranked = engine.rank(offers, applicant, now);

    println!("Benefit recommendations");
    println!(
        "Evaluated {} offers at {} (age {}, region {})",
        offers.len(),
        now.to_rfc3339(),
        applicant.age_on(now.date_naive()),
        applicant.province
    );

    if ranked.is_empty() {
        println!("\nNo eligible offers");
        return;
    }

    println!("\nRanked offers");
    for result in ranked.iter().take(limit.unwrap_or(usize::MAX)) {
        let offer = result.offer;
        let badge = match result.days_remaining(now) {
            Some(days) if result.is_urgent(&policy, now) => format!(" [closing soon, {days}d]"),
            _ => String::new(),
        };
        println!(
            "- [{}] {} ({}, {}) | closes {}{}",
            result.score,
            offer.title,
            offer.category.label(),
            offer.region.label(),
            offer.application_window.ends_at.date_naive(),
            badge
        );
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
