// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::chart_service::ChartService;
use crate::application::map_service::{emission_layer, station_layer, MapKind, MapView};
use crate::application::reconciler::Reconciler;
use crate::application::snapshot_repository::{load_snapshot, Snapshot};
use crate::application::views::{build_view, ViewDefaults, ViewKind};
use crate::domain::severity::SeverityScale;
use crate::infrastructure::config::{load_dashboard_config, DashboardConfig};
use crate::infrastructure::json_repository::JsonRepository;
use crate::infrastructure::map_scene::SceneMap;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    city_outlook, get_map, get_view, health_check, hover_marker, legend, list_cities, ranking, update_controls,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let scale = Arc::new(config.severity_scale()?);

    // Create repository (infrastructure layer)
    let repository = JsonRepository::new(
        config.data.readings.clone(),
        config.data.ranking.clone(),
        config.data.emissions.clone(),
    );
    let snapshot = Arc::new(load_snapshot(&repository).await?);

    // Create services (application layer)
    let reconciler = Reconciler::new(scale.clone(), config.forecast_horizon());
    let chart_service = Arc::new(ChartService::new(snapshot.clone(), reconciler));

    let defaults = ViewDefaults {
        city: config.dashboard.default_city.clone(),
        metric: config.default_metric()?,
    };
    let mut views = HashMap::new();
    for kind in ViewKind::ALL {
        let view = build_view(kind, chart_service.clone(), &defaults)
            .with_context(|| format!("Failed to mount {} view", kind))?;
        views.insert(kind, Mutex::new(view));
    }

    let maps = build_maps(&config, &snapshot, &scale)?;

    // Create application state
    let state = Arc::new(AppState {
        chart_service,
        scale,
        snapshot,
        ranking_limit: config.dashboard.ranking_limit,
        views,
        maps,
    });

    // Build router (presentation layer)
    // Note: We handle compression manually in our response builders,
    // so we don't use CompressionLayer to avoid double compression
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/cities", get(list_cities))
        .route("/cities/:city/outlook", get(city_outlook))
        .route("/legend", get(legend))
        .route("/ranking", get(ranking))
        .route("/views/:view", get(get_view))
        .route("/views/:view/controls", post(update_controls))
        .route("/maps/:map", get(get_map))
        .route("/maps/:map/hover", post(hover_marker))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting aqi-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

/// Both maps need the access token; a missing one stops startup
fn build_maps(
    config: &DashboardConfig,
    snapshot: &Snapshot,
    scale: &SeverityScale,
) -> anyhow::Result<HashMap<MapKind, Mutex<MapView<SceneMap>>>> {
    let settings = &config.map;
    let sizing = settings.marker_sizing();

    let mut maps = HashMap::new();
    for kind in MapKind::ALL {
        let mut map = MapView::new(settings.access_token.as_deref(), |token| {
            SceneMap::new(token, settings.center, settings.zoom)
        })
        .with_context(|| format!("Failed to create {} map (set map.access_token or AQ__MAP__ACCESS_TOKEN)", kind))?;

        let layer = match kind {
            MapKind::Stations => station_layer(&snapshot.readings, scale, sizing),
            MapKind::Emissions => emission_layer(
                &snapshot.emissions,
                sizing,
                settings.emissions_year,
                &settings.emissions_gas,
            ),
        };
        map.show(layer);
        tracing::info!("{} map: {} markers", kind, map.marker_count());
        maps.insert(kind, Mutex::new(map));
    }

    Ok(maps)
}
