// Application state for HTTP handlers
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::chart_service::ChartService;
use crate::application::map_service::{MapKind, MapView};
use crate::application::snapshot_repository::Snapshot;
use crate::application::views::{ChartView, ViewKind};
use crate::domain::error::DashboardError;
use crate::domain::severity::SeverityScale;
use crate::infrastructure::map_scene::SceneMap;

pub struct AppState {
    pub chart_service: Arc<ChartService>,
    pub scale: Arc<SeverityScale>,
    pub snapshot: Arc<Snapshot>,
    pub ranking_limit: usize,
    // Each view and map is driven serially
    pub views: HashMap<ViewKind, Mutex<ChartView>>,
    pub maps: HashMap<MapKind, Mutex<MapView<SceneMap>>>,
}

impl AppState {
    pub fn view(&self, name: &str) -> Result<&Mutex<ChartView>, DashboardError> {
        let kind = ViewKind::parse(name)?;
        self.views
            .get(&kind)
            .ok_or_else(|| DashboardError::UnknownView(name.to_string()))
    }

    pub fn map(&self, name: &str) -> Result<&Mutex<MapView<SceneMap>>, DashboardError> {
        let kind = MapKind::parse(name)?;
        self.maps
            .get(&kind)
            .ok_or_else(|| DashboardError::UnknownView(name.to_string()))
    }
}
