use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use arogami_schema::{DiseasesResponse, DualPredictResponse, ErrorBody, HealthResponse, ModelInfo, PredictRequest, PredictionRow, SymptomsResponse};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

use crate::context::{AppContext, PredictError};

pub static PROM: Lazy<Option<PrometheusHandle>> = Lazy::new(|| match PrometheusBuilder::new().install_recorder() {
    Ok(h) => Some(h),
    Err(e) => { tracing::warn!(error = %e, "metrics recorder not installed"); None }
});

type Ctx = State<Arc<AppContext>>;

#[derive(Debug)]
pub enum ApiError { BadRequest(String), Internal(String) }

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        if e.is_user_error() { ApiError::BadRequest(e.to_string()) } else { ApiError::Internal(format!("Prediction failed: {e}")) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(d) => (StatusCode::BAD_REQUEST, d),
            ApiError::Internal(d) => { tracing::error!(%d, "request failed"); (StatusCode::INTERNAL_SERVER_ERROR, d) }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(metrics_handler))
        .route("/symptoms", get(symptoms))
        .route("/diseases", get(diseases))
        .route("/models", get(models))
        .route("/predict", post(predict))
        .route("/predict/dual", post(predict_dual))
        .with_state(ctx)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        message: "Arogami Disease Prediction API is running".into(),
        available_endpoints: ["/predict", "/predict/dual", "/diseases", "/symptoms", "/models"].map(String::from).to_vec(),
    })
}

async fn metrics_handler() -> String { PROM.as_ref().map(|h| h.render()).unwrap_or_default() }

async fn symptoms(State(ctx): Ctx) -> Json<SymptomsResponse> { Json(SymptomsResponse::new(ctx.list_symptoms().to_vec())) }

async fn diseases(State(ctx): Ctx) -> Json<DiseasesResponse> { Json(DiseasesResponse::new(ctx.list_diseases().to_vec())) }

async fn models(State(ctx): Ctx) -> Json<Vec<ModelInfo>> { Json(ctx.ensemble().info()) }

async fn predict(State(ctx): Ctx, Json(req): Json<PredictRequest>) -> Result<Json<Vec<PredictionRow>>, ApiError> {
    let span = tracing::info_span!("predict", symptoms = req.symptoms.len());
    let _e = span.enter();
    counter!("predict_requests_total", 1, "route" => "predict");
    tracing::info!(symptoms = ?req.symptoms, "prediction request");
    let rows = ctx.predict(&req.symptoms)?;
    tracing::info!(results = rows.len(), "prediction successful");
    Ok(Json(rows))
}

async fn predict_dual(State(ctx): Ctx, Json(req): Json<PredictRequest>) -> Result<Json<DualPredictResponse>, ApiError> {
    let span = tracing::info_span!("predict_dual", symptoms = req.symptoms.len());
    let _e = span.enter();
    counter!("predict_requests_total", 1, "route" => "predict_dual");
    Ok(Json(ctx.predict_dual(&req.symptoms)?))
}
