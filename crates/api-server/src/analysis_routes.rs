use analysis_core::AnalysisInput;
use analysis_orchestrator::AnalysisResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{correlation::CorrelationId, status_for, ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<AnalysisInput>,
}

/// One entry of a batch response; failures do not abort the rest of the batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItem {
    pub symbol: String,
    pub success: bool,
    pub status: u16,
    pub data: Option<AnalysisResult>,
    pub error: Option<String>,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/batch", post(analyze_batch))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn unprocessable(rejection: JsonRejection) -> AppError {
    AppError::with_status(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
}

async fn analyze(
    State(state): State<AppState>,
    Extension(CorrelationId(correlation)): Extension<CorrelationId>,
    payload: Result<Json<AnalysisInput>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisResult>>, AppError> {
    let Json(input) = payload.map_err(unprocessable)?;
    tracing::info!("[{}] analyze {}", correlation, input.symbol);

    let orchestrator = state.orchestrator.clone();
    let result = tokio::task::spawn_blocking(move || orchestrator.analyze(&input))
        .await
        .map_err(|e| AppError::with_status(StatusCode::INTERNAL_SERVER_ERROR, format!("analysis task failed: {}", e)))??;
    Ok(Json(ApiResponse::success(result)))
}

async fn analyze_batch(
    State(state): State<AppState>,
    Extension(CorrelationId(correlation)): Extension<CorrelationId>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<BatchItem>>>, AppError> {
    let Json(batch) = payload.map_err(unprocessable)?;
    tracing::info!("[{}] batch analyze {} symbols", correlation, batch.requests.len());

    let orchestrator = state.orchestrator.clone();
    let items = tokio::task::spawn_blocking(move || {
        let results = orchestrator.analyze_batch(&batch.requests);
        batch
            .requests
            .iter()
            .zip(results)
            .map(|(input, result)| match result {
                Ok(result) => BatchItem {
                    symbol: result.symbol.clone(),
                    success: true,
                    status: StatusCode::OK.as_u16(),
                    data: Some(result),
                    error: None,
                },
                Err(e) => BatchItem {
                    symbol: input.symbol.to_uppercase(),
                    success: false,
                    status: status_for(&e).as_u16(),
                    data: None,
                    error: Some(e.to_string()),
                },
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| AppError::with_status(StatusCode::INTERNAL_SERVER_ERROR, format!("batch task failed: {}", e)))?;

    Ok(Json(ApiResponse::success(items)))
}
