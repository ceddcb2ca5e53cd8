// In-memory map surface whose state is published as a serializable scene
use serde::Serialize;

use crate::application::map_surface::MapSurface;
use crate::domain::marker::{LatLon, Marker};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePopup {
    pub position: Option<LatLon>,
    pub html: String,
    pub attached: bool,
}

/// Snapshot of what the map renderer should draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene<'a> {
    pub access_token: &'a str,
    pub center: LatLon,
    pub zoom: u8,
    pub markers: Vec<&'a Marker>,
    pub popup: Option<&'a ScenePopup>,
}

#[derive(Debug)]
pub struct SceneMap {
    access_token: String,
    center: LatLon,
    zoom: u8,
    // Removed markers leave a hole so outstanding handles stay valid
    markers: Vec<Option<Marker>>,
    popups: Vec<ScenePopup>,
}

impl SceneMap {
    pub fn new(access_token: &str, center: LatLon, zoom: u8) -> Self {
        Self {
            access_token: access_token.to_string(),
            center,
            zoom,
            markers: Vec::new(),
            popups: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn popup_count(&self) -> usize {
        self.popups.len()
    }

    pub fn scene(&self) -> MapScene<'_> {
        MapScene {
            access_token: &self.access_token,
            center: self.center,
            zoom: self.zoom,
            markers: self.markers.iter().flatten().collect(),
            popup: self.popups.iter().find(|p| p.attached),
        }
    }

    fn popup_mut(&mut self, handle: usize) -> Option<&mut ScenePopup> {
        let popup = self.popups.get_mut(handle);
        if popup.is_none() {
            tracing::warn!("Unknown popup handle {}", handle);
        }
        popup
    }
}

impl MapSurface for SceneMap {
    type MarkerHandle = usize;
    type PopupHandle = usize;

    fn add_marker(&mut self, marker: &Marker) -> usize {
        self.markers.push(Some(marker.clone()));
        self.markers.len() - 1
    }

    fn remove_marker(&mut self, handle: &usize) {
        if let Some(slot) = self.markers.get_mut(*handle) {
            *slot = None;
        }
    }

    fn create_popup(&mut self) -> usize {
        self.popups.push(ScenePopup {
            position: None,
            html: String::new(),
            attached: false,
        });
        self.popups.len() - 1
    }

    fn set_popup(&mut self, popup: &usize, position: LatLon, html: &str) {
        if let Some(popup) = self.popup_mut(*popup) {
            popup.position = Some(position);
            popup.html = html.to_string();
        }
    }

    fn attach_popup(&mut self, popup: &usize) {
        if let Some(popup) = self.popup_mut(*popup) {
            popup.attached = true;
        }
    }

    fn detach_popup(&mut self, popup: &usize) {
        if let Some(popup) = self.popup_mut(*popup) {
            popup.attached = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::map_service::{MapView, MarkerSpec, emission_layer, station_layer};
    use crate::application::popup_manager::PopupState;
    use crate::domain::color::RgbHex;
    use crate::domain::error::DashboardError;
    use crate::domain::marker::MarkerSizing;
    use crate::domain::reading::DataType;
    use crate::domain::reading::fixtures::*;
    use crate::domain::severity::SeverityScale;

    fn view() -> MapView<SceneMap> {
        MapView::new(Some("pk.test"), |token| SceneMap::new(token, LatLon::new(30.3753, 69.3451), 5)).unwrap()
    }

    fn spec(id: &str, lat: f64) -> MarkerSpec {
        MarkerSpec {
            marker: Marker::new(
                id.to_string(),
                LatLon::new(lat, 70.0),
                12.0,
                RgbHex::new(0x00, 0xE4, 0x00),
                "10".to_string(),
            ),
            tooltip: format!("<strong>{}</strong>", id),
        }
    }

    #[test]
    fn test_missing_credential_builds_no_surface() {
        let mut built = false;
        let result = MapView::new(None, |token| {
            built = true;
            SceneMap::new(token, LatLon::new(0.0, 0.0), 5)
        });

        assert!(matches!(result, Err(DashboardError::MissingCredential)));
        assert!(!built);
    }

    #[test]
    fn test_hovering_many_markers_uses_one_popup() {
        let mut map = view();
        map.show(vec![spec("a", 31.0), spec("b", 32.0), spec("c", 33.0)]);

        for id in ["a", "b", "c", "a"] {
            map.pointer_enter(id).unwrap();
        }
        map.pointer_leave("b");

        assert_eq!(map.surface().popup_count(), 1);
        assert_eq!(map.popup_state(), &PopupState::Shown("a".to_string()));
        let scene = map.surface().scene();
        let popup = scene.popup.unwrap();
        assert_eq!(popup.position, Some(LatLon::new(31.0, 70.0)));
        assert_eq!(popup.html, "<strong>a</strong>");

        map.pointer_leave("a");
        assert!(map.surface().scene().popup.is_none());
    }

    #[test]
    fn test_unknown_marker_rejected() {
        let mut map = view();
        map.show(vec![spec("a", 31.0)]);

        assert_eq!(
            map.pointer_enter("zz").unwrap_err(),
            DashboardError::UnknownMarker("zz".to_string())
        );
        assert_eq!(map.popup_state(), &PopupState::Hidden);
    }

    #[test]
    fn test_switching_layers_replaces_markers_and_hides_popup() {
        let mut map = view();
        let readings = vec![
            city_reading("Lahore", DataType::Current, at(9), 120.0, 184.0),
            station_reading("Lahore", "Gulberg", DataType::Current, at(9), 35.0, 40.0),
        ];
        map.show(station_layer(&readings, &SeverityScale::aqi_us(), MarkerSizing::default()));
        map.pointer_enter("city:Lahore").unwrap();

        map.show(emission_layer(&[], MarkerSizing::default(), 2022, "co2"));

        assert_eq!(map.marker_count(), 0);
        assert_eq!(map.popup_state(), &PopupState::Hidden);
        let scene = map.surface().scene();
        assert!(scene.markers.is_empty());
        assert!(scene.popup.is_none());
        assert_eq!(scene.access_token, "pk.test");
    }
}
