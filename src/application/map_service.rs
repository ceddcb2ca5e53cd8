// Map service - Marker layers and hoverable map views
use std::fmt;

use crate::application::map_surface::MapSurface;
use crate::application::popup_manager::{HoverTarget, PopupManager, PopupState};
use crate::domain::color::RgbHex;
use crate::domain::emission::EmissionSource;
use crate::domain::error::DashboardError;
use crate::domain::marker::{LatLon, Marker, MarkerSizing};
use crate::domain::reading::{DataSource, DataType, Reading};
use crate::domain::severity::SeverityScale;
use crate::domain::tooltip::{emission_tooltip, reading_tooltip};

const EMISSION_COLOR: RgbHex = RgbHex::new(0xFF, 0x44, 0x44);
const CITY_FILL_OPACITY: f64 = 0.6;
const EMISSION_FILL_OPACITY: f64 = 170.0 / 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    Stations,
    Emissions,
}

impl MapKind {
    pub const ALL: [MapKind; 2] = [MapKind::Stations, MapKind::Emissions];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapKind::Stations => "stations",
            MapKind::Emissions => "emissions",
        }
    }

    pub fn parse(input: &str) -> Result<Self, DashboardError> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == input)
            .ok_or_else(|| DashboardError::UnknownView(input.to_string()))
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marker together with its popup content.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub marker: Marker,
    pub tooltip: String,
}

/// Current city and station readings. Cities get the large radius and a
/// translucent fill, stations the small one.
pub fn station_layer(readings: &[Reading], scale: &SeverityScale, sizing: MarkerSizing) -> Vec<MarkerSpec> {
    let current = |source: DataSource| {
        readings
            .iter()
            .filter(move |r| r.data_source == source && r.data_type == DataType::Current)
    };

    let stations = current(DataSource::Station).map(|r| MarkerSpec {
        marker: reading_marker(r, scale, sizing.floor),
        tooltip: reading_tooltip(r),
    });
    let cities = current(DataSource::City).map(|r| MarkerSpec {
        marker: reading_marker(r, scale, sizing.ceiling).with_opacity(CITY_FILL_OPACITY),
        tooltip: reading_tooltip(r),
    });

    stations.chain(cities).collect()
}

fn reading_marker(reading: &Reading, scale: &SeverityScale, radius: f64) -> Marker {
    let id = match reading.data_source {
        DataSource::City => format!("city:{}", reading.city),
        DataSource::Station => format!("station:{}:{}", reading.city, reading.station_key()),
    };
    let label = reading.pm25.map(|v| v.round().to_string()).unwrap_or_default();

    Marker::new(
        id,
        LatLon::new(reading.latitude, reading.longitude),
        radius,
        scale.classify_opt(reading.aqius).color,
        label,
    )
}

/// Emission sources for one year and gas, sized by emitted quantity.
pub fn emission_layer(sources: &[EmissionSource], sizing: MarkerSizing, year: i32, gas: &str) -> Vec<MarkerSpec> {
    let selected: Vec<&EmissionSource> = sources.iter().filter(|s| s.matches(year, gas)).collect();
    let missing = selected.iter().filter(|s| s.magnitude().is_none()).count();
    if missing > 0 {
        tracing::debug!("{} of {} emission sources have no quantity", missing, selected.len());
    }

    // One pass for the dataset-wide maximum, reused by every marker
    let scale = sizing.scale(selected.iter().map(|s| s.magnitude()));
    tracing::debug!(
        "Sizing {} emission markers against max quantity {}",
        selected.len(),
        scale.max_magnitude()
    );

    selected
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let magnitude = source.magnitude();
            let label = magnitude
                .map(|q| q.abs().round().to_string())
                .unwrap_or_default();
            let marker = Marker::new(
                format!("emission:{}:{}", i, source.source_name),
                LatLon::new(source.latitude, source.longitude),
                scale.radius(magnitude),
                EMISSION_COLOR,
                label,
            )
            .with_opacity(EMISSION_FILL_OPACITY);

            MarkerSpec {
                marker,
                tooltip: emission_tooltip(source),
            }
        })
        .collect()
}

/// The credential the map renderer needs; blank counts as missing.
pub fn require_credential(token: Option<&str>) -> Result<&str, DashboardError> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(DashboardError::MissingCredential)
}

struct PlacedMarker<H> {
    target: HoverTarget,
    handle: H,
}

/// A map surface with its markers and the single shared hover popup.
pub struct MapView<S: MapSurface> {
    surface: S,
    markers: Vec<PlacedMarker<S::MarkerHandle>>,
    popup: PopupManager<S::PopupHandle>,
}

impl<S: MapSurface> MapView<S> {
    /// Fails with [`DashboardError::MissingCredential`] before any surface exists.
    pub fn new<F>(credential: Option<&str>, make_surface: F) -> Result<Self, DashboardError>
    where
        F: FnOnce(&str) -> S,
    {
        let credential = require_credential(credential)?;
        Ok(Self {
            surface: make_surface(credential),
            markers: Vec::new(),
            popup: PopupManager::new(),
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn popup_state(&self) -> &PopupState {
        self.popup.state()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Replaces every marker on the map with `layer`.
    pub fn show(&mut self, layer: Vec<MarkerSpec>) {
        self.popup.hide(&mut self.surface);
        for placed in self.markers.drain(..) {
            self.surface.remove_marker(&placed.handle);
        }

        for spec in layer {
            let handle = self.surface.add_marker(&spec.marker);
            self.markers.push(PlacedMarker {
                target: HoverTarget {
                    id: spec.marker.id,
                    position: spec.marker.position,
                    html: spec.tooltip,
                },
                handle,
            });
        }
    }

    pub fn pointer_enter(&mut self, marker_id: &str) -> Result<&PopupState, DashboardError> {
        let placed = self
            .markers
            .iter()
            .find(|m| m.target.id == marker_id)
            .ok_or_else(|| DashboardError::UnknownMarker(marker_id.to_string()))?;
        self.popup.pointer_enter(&mut self.surface, &placed.target);
        Ok(self.popup.state())
    }

    pub fn pointer_leave(&mut self, marker_id: &str) -> &PopupState {
        self.popup.pointer_leave(&mut self.surface, marker_id);
        self.popup.state()
    }
}
