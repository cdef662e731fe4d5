use std::sync::Arc;

use analysis_core::AnalysisError;
use analysis_orchestrator::AnalysisOrchestrator;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod analysis_routes;
pub mod config;
pub mod correlation;


pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            orchestrator: Arc::new(AnalysisOrchestrator::new(config.valuation)),
        }
    }
}

/// Envelope for every JSON response except `/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Maps an analysis error onto the HTTP status the caller should see.
pub fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::MissingData(_) | AnalysisError::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Provider(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::InsufficientHistory { .. } | AnalysisError::Computation(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(error: AnalysisError) -> Self {
        Self::with_status(status_for(&error), error.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.message);
        }
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_allow_any {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(analysis_routes::analysis_routes())
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(config))
                .map_response(|response: axum::http::Response<_>| response.map(Body::new))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        correlation_id = tracing::field::Empty,
                    )
                }))
                .layer(middleware::from_fn(correlation::tag_correlation)),
        )
        .with_state(state)
}

/// `RUST_LOG` filters (default `info`); `RUST_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;
    tracing::info!(
        "DCF assumptions: risk-free {:.3}, market premium {:.3}, terminal growth {:.3}, {} years",
        config.valuation.risk_free_rate,
        config.valuation.market_premium,
        config.valuation.terminal_growth,
        config.valuation.years
    );

    let app = build_router(AppState::new(&config), &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}
