use std::sync::Arc;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use feed::{FeedClient, HttpFeedClient, LoadReport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shell::{GlobeView, Intent, ShellError};
use tracing::warn;

pub type View = GlobeView<HttpFeedClient>;

#[derive(Clone)]
pub struct AppState {
    pub view: Arc<View>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/state", get(get_state))
        .route("/api/earthquakes", get(get_earthquakes))
        .route("/api/earthquakes/:id/detail", get(get_detail))
        .route("/api/stats", get(get_stats))
        .route("/api/scene", get(get_scene))
        .route("/api/solar-system", get(get_solar_system))
        .route("/api/metrics", get(get_metrics))
        .route("/api/events", get(get_events))
        .route("/api/intent", post(post_intent))
        .route("/api/refresh", post(post_refresh))
        .route("/api/select/:id", post(post_select))
        .route("/api/pick", post(post_pick))
        .route("/api/viewport", post(post_viewport))
        .route("/api/camera", post(post_camera))
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

fn shell_error(err: ShellError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        ShellError::UnknownFeature(_) => StatusCode::NOT_FOUND,
        ShellError::NotRendered(_) => StatusCode::CONFLICT,
        ShellError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ShellError::Unmounted => StatusCode::SERVICE_UNAVAILABLE,
        ShellError::Resource(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

async fn healthz(State(state): State<AppState>) -> Response {
    if state.view.is_mounted() {
        (StatusCode::OK, "ok").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unmounted").into_response()
    }
}

async fn get_state(State(state): State<AppState>) -> Json<Value> {
    let now = Utc::now();
    Json(json!({
        "filter": state.view.filter(),
        "status": state.view.status(),
        "options": state.view.options_panel(now),
        "info": state.view.info_panel(now),
    }))
}

async fn get_earthquakes(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.view.snapshot();
    Json(json!({
        "filter": snapshot.filter,
        "fetchedAt": snapshot.fetched_at,
        "features": snapshot.features,
    }))
}

async fn get_detail(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Value> {
    let snapshot = state.view.snapshot();
    let Some(feature) = snapshot.feature(&id) else {
        return Err(shell_error(ShellError::UnknownFeature(id)));
    };
    let Some(url) = feature.detail.as_deref() else {
        return Err(api_error(StatusCode::NOT_FOUND, "feature has no detail document"));
    };
    match state.view.fetcher().client().fetch_detail(url).await {
        Ok(detail) => Ok(Json(detail)),
        Err(err) => {
            warn!(%id, %err, "detail fetch failed");
            Err(api_error(StatusCode::BAD_GATEWAY, err.user_message()))
        }
    }
}

async fn get_stats(State(state): State<AppState>) -> Json<compute::QuakeStats> {
    Json(state.view.stats())
}

async fn get_scene(State(state): State<AppState>) -> ApiResult<shell::SceneView> {
    state.view.scene_view().map(Json).map_err(shell_error)
}

#[derive(Debug, Deserialize)]
struct SolarQuery {
    #[serde(default)]
    days: f64,
}

async fn get_solar_system(Query(q): Query<SolarQuery>) -> ApiResult<Vec<shell::PlanetView>> {
    if !q.days.is_finite() {
        return Err(api_error(StatusCode::BAD_REQUEST, "days must be finite"));
    }
    shell::solar_system_view(q.days)
        .map(Json)
        .map_err(|e| shell_error(e.into()))
}

async fn get_metrics(State(state): State<AppState>) -> Json<shell::MetricsView> {
    Json(state.view.metrics())
}

async fn get_events(State(state): State<AppState>) -> Json<Vec<shell::EventView>> {
    Json(state.view.events())
}

async fn post_intent(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<shell::IntentOutcome> {
    let intent: Intent = serde_json::from_value(body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid intent: {e}")))?;
    state.view.dispatch(intent).await.map(Json).map_err(shell_error)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    token: u64,
    elapsed_ms: u128,
    #[serde(flatten)]
    outcome: feed::LoadOutcome,
}

impl From<LoadReport> for RefreshResponse {
    fn from(report: LoadReport) -> Self {
        Self {
            token: report.token.0,
            elapsed_ms: report.elapsed.as_millis(),
            outcome: report.outcome,
        }
    }
}

async fn post_refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    Json(state.view.refresh().await.into())
}

async fn post_select(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Value> {
    let target = state.view.select(&id).map_err(shell_error)?;
    Ok(Json(json!({
        "id": id,
        "target": target.target.as_array(),
        "cameraPosition": target.camera_position.as_array(),
    })))
}

#[derive(Debug, Deserialize)]
struct PickRequest {
    x: f64,
    y: f64,
}

async fn post_pick(
    State(state): State<AppState>,
    Json(req): Json<PickRequest>,
) -> ApiResult<Value> {
    let id = state.view.pick(req.x, req.y).map_err(shell_error)?;
    Ok(Json(json!({ "id": id })))
}

#[derive(Debug, Deserialize)]
struct Viewport {
    width: f64,
    height: f64,
}

async fn post_viewport(
    State(state): State<AppState>,
    Json(vp): Json<Viewport>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .view
        .set_viewport(vp.width, vp.height)
        .map_err(shell_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Orbit angles in radians and an optional zoom factor, applied in that order.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CameraRequest {
    yaw: f64,
    pitch: f64,
    zoom: Option<f64>,
}

async fn post_camera(
    State(state): State<AppState>,
    Json(req): Json<CameraRequest>,
) -> ApiResult<Value> {
    let mut position = state
        .view
        .orbit_camera(req.yaw, req.pitch)
        .map_err(shell_error)?;
    if let Some(factor) = req.zoom {
        position = state.view.zoom_camera(factor).map_err(shell_error)?;
    }
    Ok(Json(json!({ "position": position.as_array() })))
}
