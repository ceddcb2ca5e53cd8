// HTTP request handlers
use crate::application::coordinator::{CITY_CONTROL, METRIC_CONTROL};
use crate::application::outlook::daily_outlook;
use crate::application::popup_manager::PopupState;
use crate::application::views::ChartView;
use crate::domain::error::DashboardError;
use crate::domain::reading::Metric;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::plot_mapper::chart_to_plot;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RankingQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct ControlChange {
    pub city: Option<String>,
    pub metric: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HoverEvent {
    Enter,
    Leave,
}

#[derive(Deserialize)]
pub struct HoverRequest {
    pub marker: String,
    pub event: HoverEvent,
}

#[derive(Serialize)]
struct ControlState {
    name: String,
    value: String,
    options: Vec<String>,
}

#[derive(Serialize)]
struct ViewResponse {
    view: String,
    generation: u64,
    controls: Vec<ControlState>,
    plot: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub fn status_for(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::UnknownCity(_) | DashboardError::UnknownView(_) | DashboardError::UnknownMarker(_) => {
            StatusCode::NOT_FOUND
        }
        DashboardError::UnknownMetric(_)
        | DashboardError::UnknownControl(_)
        | DashboardError::InvalidControlValue { .. } => StatusCode::BAD_REQUEST,
        DashboardError::NoData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::MissingCredential
        | DashboardError::InvalidTierTable(_)
        | DashboardError::InvalidColor(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn respond<T: Serialize>(result: Result<T, DashboardError>, compress: bool) -> Response<Body> {
    let response = match result {
        Ok(data) => json_response(StatusCode::OK, &data, compress).await,
        Err(e) => {
            let status = status_for(&e);
            tracing::warn!("Request failed with {}: {}", status, e);
            json_response(status, &ErrorBody { error: e.to_string() }, compress).await
        }
    };

    match response {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn view_response(view: &ChartView) -> ViewResponse {
    ViewResponse {
        view: view.view().to_string(),
        generation: view.mounted().generation,
        controls: view
            .controls()
            .iter()
            .map(|c| ControlState {
                name: c.name().to_string(),
                value: c.value().to_string(),
                options: c.options().to_vec(),
            })
            .collect(),
        plot: chart_to_plot(&view.mounted().artifact),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_cities(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(Ok(state.chart_service.cities()), accepts_brotli(&headers)).await
}

pub async fn legend(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(Ok(state.scale.legend()), accepts_brotli(&headers)).await
}

pub async fn ranking(
    Query(query): Query<RankingQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(state.ranking_limit);
    let chart = state.chart_service.ranking(limit);
    respond(Ok(chart_to_plot(&chart)), accepts_brotli(&headers)).await
}

/// Currently mounted chart of a view, with its control values
pub async fn get_view(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let view = match state.view(&name) {
        Ok(view) => view.lock().await,
        Err(e) => return respond::<()>(Err(e), compress).await,
    };
    respond(Ok(view_response(&view)), compress).await
}

/// Applies a control change batch with a single rebuild
pub async fn update_controls(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(change): Json<ControlChange>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let mut view = match state.view(&name) {
        Ok(view) => view.lock().await,
        Err(e) => return respond::<()>(Err(e), compress).await,
    };

    let mut changes: Vec<(&str, &str)> = Vec::new();
    if let Some(city) = change.city.as_deref() {
        changes.push((CITY_CONTROL, city));
    }
    if let Some(metric) = change.metric.as_deref() {
        // Field names ("aqius") select the same option as labels ("AQI US")
        let metric = Metric::parse(metric).map(|m| m.label()).unwrap_or(metric);
        changes.push((METRIC_CONTROL, metric));
    }
    if changes.is_empty() {
        return respond(Ok(view_response(&view)), compress).await;
    }

    let result = view.apply(&changes).map(|_detached| view_response(&view));
    respond(result, compress).await
}

pub async fn city_outlook(
    Path(city): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let result = if state.chart_service.cities().contains(&city) {
        daily_outlook(&state.snapshot.readings, &city)
    } else {
        Err(DashboardError::UnknownCity(city))
    };
    respond(result, accepts_brotli(&headers)).await
}

/// Markers and popup of a map, as the renderer should draw them
pub async fn get_map(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let map = match state.map(&name) {
        Ok(map) => map.lock().await,
        Err(e) => return respond::<()>(Err(e), compress).await,
    };
    respond(Ok(map.surface().scene()), compress).await
}

pub async fn hover_marker(
    Path(name): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<HoverRequest>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let mut map = match state.map(&name) {
        Ok(map) => map.lock().await,
        Err(e) => return respond::<()>(Err(e), compress).await,
    };

    let result: Result<PopupState, DashboardError> = match request.event {
        HoverEvent::Enter => map.pointer_enter(&request.marker).cloned(),
        HoverEvent::Leave => Ok(map.pointer_leave(&request.marker).clone()),
    };
    respond(result, compress).await
}
