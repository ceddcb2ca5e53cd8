use chrono::TimeDelta;
use serde::Deserialize;
use std::path::PathBuf;

use crate::application::reconciler::DEFAULT_FORECAST_HORIZON;
use crate::domain::error::DashboardError;
use crate::domain::marker::{DEFAULT_CEILING, DEFAULT_FLOOR, LatLon, MarkerSizing};
use crate::domain::reading::Metric;
use crate::domain::severity::{SeverityScale, SeverityTier};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub map: MapSettings,
    /// Replaces the built-in US AQI table when present.
    #[serde(default)]
    pub tiers: Vec<SeverityTier>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    pub readings: PathBuf,
    pub ranking: Option<PathBuf>,
    pub emissions: Option<PathBuf>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            readings: PathBuf::from("data/readings.json"),
            ranking: None,
            emissions: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub default_city: String,
    pub default_metric: String,
    pub forecast_horizon_hours: i64,
    pub ranking_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_city: "Karachi".to_string(),
            default_metric: "PM2.5".to_string(),
            forecast_horizon_hours: DEFAULT_FORECAST_HORIZON.num_hours(),
            ranking_limit: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapSettings {
    pub access_token: Option<String>,
    pub center: LatLon,
    pub zoom: u8,
    pub marker_floor: f64,
    pub marker_ceiling: f64,
    pub emissions_year: i32,
    pub emissions_gas: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            center: LatLon::new(30.3753, 69.3451),
            zoom: 5,
            marker_floor: DEFAULT_FLOOR,
            marker_ceiling: DEFAULT_CEILING,
            emissions_year: 2022,
            emissions_gas: "co2".to_string(),
        }
    }
}

impl MapSettings {
    pub fn marker_sizing(&self) -> MarkerSizing {
        MarkerSizing {
            floor: self.marker_floor,
            ceiling: self.marker_ceiling,
        }
    }
}

impl DashboardConfig {
    /// Validated tier table; the configured one must be contiguous.
    pub fn severity_scale(&self) -> Result<SeverityScale, DashboardError> {
        if self.tiers.is_empty() {
            return Ok(SeverityScale::aqi_us());
        }
        let scale = SeverityScale::new(self.tiers.clone())?;
        tracing::info!("Using {} configured severity tiers", scale.tiers().len());
        Ok(scale)
    }

    pub fn forecast_horizon(&self) -> TimeDelta {
        TimeDelta::hours(self.dashboard.forecast_horizon_hours)
    }

    pub fn default_metric(&self) -> Result<Metric, DashboardError> {
        Metric::parse(&self.dashboard.default_metric)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("AQ").separator("__")
}

/// Reads `config/dashboard.toml`, then `AQ__SECTION__KEY` environment overrides.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::RgbHex;

    fn parse(toml: &str, env: &[(&str, &str)]) -> DashboardConfig {
        let overrides = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .add_source(environment().source(Some(overrides)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_sections_default_when_absent() {
        let config = parse("", &[]);

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.dashboard.default_city, "Karachi");
        assert_eq!(config.default_metric().unwrap(), Metric::Pm25);
        assert_eq!(config.dashboard.forecast_horizon_hours, 48);
        assert_eq!(config.forecast_horizon(), DEFAULT_FORECAST_HORIZON);
        assert_eq!(config.map.zoom, 5);
        assert_eq!(config.map.access_token, None);
        assert_eq!(config.severity_scale().unwrap(), SeverityScale::aqi_us());
    }

    #[test]
    fn test_environment_overrides_file() {
        let config = parse(
            r#"
            [map]
            access_token = "from-file"
            emissions_gas = "ch4"
            "#,
            &[("AQ__MAP__ACCESS_TOKEN", "pk.from-env")],
        );

        assert_eq!(config.map.access_token.as_deref(), Some("pk.from-env"));
        assert_eq!(config.map.emissions_gas, "ch4");
    }

    #[test]
    fn test_custom_tiers() {
        let config = parse(
            r##"
            [[tiers]]
            label = "Clean"
            min_inclusive = 0
            max_inclusive = 100
            color = "#00E400"

            [[tiers]]
            label = "Dirty"
            min_inclusive = 101
            color = "#7E0023"
            "##,
            &[],
        );

        let scale = config.severity_scale().unwrap();
        assert_eq!(scale.tiers().len(), 2);
        assert_eq!(scale.classify(100.5).label, "Dirty");
        assert_eq!(scale.classify(3000.0).color, RgbHex::new(0x7E, 0x00, 0x23));
    }

    #[test]
    fn test_invalid_tiers_rejected() {
        let config = parse(
            r##"
            [[tiers]]
            label = "Clean"
            min_inclusive = 0
            max_inclusive = 50
            color = "#00E400"

            [[tiers]]
            label = "Gap"
            min_inclusive = 80
            color = "#FF0000"
            "##,
            &[],
        );

        assert!(matches!(
            config.severity_scale(),
            Err(DashboardError::InvalidTierTable(_))
        ));
    }
}
