// Chart views bound to city/metric selectors
use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::application::chart_service::ChartService;
use crate::application::coordinator::{CITY_CONTROL, LinkedControls, METRIC_CONTROL, SelectControl, Selection};
use crate::domain::chart::ChartData;
use crate::domain::error::DashboardError;
use crate::domain::reading::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Trend,
    Bars,
}

impl ViewKind {
    pub const ALL: [ViewKind; 2] = [ViewKind::Trend, ViewKind::Bars];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Trend => "trend",
            ViewKind::Bars => "bars",
        }
    }

    pub fn parse(input: &str) -> Result<Self, DashboardError> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == input)
            .ok_or_else(|| DashboardError::UnknownView(input.to_string()))
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial selector values.
#[derive(Debug, Clone)]
pub struct ViewDefaults {
    pub city: String,
    pub metric: Metric,
}

pub type ChartView = LinkedControls<ChartData>;

/// Builds a view with city and metric selectors and mounts its first chart.
///
/// Falls back to the first city in the dataset when the configured default
/// city has no readings.
pub fn build_view(kind: ViewKind, charts: Arc<ChartService>, defaults: &ViewDefaults) -> Result<ChartView, DashboardError> {
    let cities = charts.cities();
    let city = if cities.contains(&defaults.city) {
        defaults.city.clone()
    } else {
        match cities.first() {
            Some(first) => {
                tracing::warn!(
                    "Default city {} not in dataset, using {} for {} view",
                    defaults.city,
                    first,
                    kind
                );
                first.clone()
            }
            None => {
                return Err(DashboardError::NoData {
                    city: defaults.city.clone(),
                    metric: defaults.metric.to_string(),
                });
            }
        }
    };

    let metrics = Metric::ALL.iter().map(|m| m.label().to_string()).collect();
    let controls = vec![
        SelectControl::new(CITY_CONTROL, cities, &city)?,
        SelectControl::new(METRIC_CONTROL, metrics, defaults.metric.label())?,
    ];

    let render = Box::new(move |selection: &Selection| -> Result<ChartData, DashboardError> {
        let city = selection.require(CITY_CONTROL)?;
        let metric = Metric::parse(selection.require(METRIC_CONTROL)?)?;
        // "now" moves between renders, so the forecast window does too
        let now = Utc::now();
        match kind {
            ViewKind::Trend => charts.city_trend(city, metric, now),
            ViewKind::Bars => charts.city_bars(city, metric, now),
        }
    });

    LinkedControls::mount(kind.as_str(), controls, render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::reconciler::{DEFAULT_FORECAST_HORIZON, Reconciler};
    use crate::application::snapshot_repository::Snapshot;
    use crate::domain::reading::DataType;
    use crate::domain::reading::fixtures::*;
    use crate::domain::severity::SeverityScale;
    use chrono::TimeDelta;

    fn charts() -> Arc<ChartService> {
        let now = Utc::now();
        let snapshot = Snapshot {
            readings: vec![
                city_reading("Karachi", DataType::Current, now, 60.0, 153.0),
                city_reading("Karachi", DataType::History, now - TimeDelta::hours(1), 55.0, 150.0),
                city_reading("Lahore", DataType::Current, now, 120.0, 184.0),
            ],
            ..Snapshot::default()
        };
        let reconciler = Reconciler::new(Arc::new(SeverityScale::aqi_us()), DEFAULT_FORECAST_HORIZON);
        Arc::new(ChartService::new(Arc::new(snapshot), reconciler))
    }

    fn defaults(city: &str) -> ViewDefaults {
        ViewDefaults {
            city: city.to_string(),
            metric: Metric::Pm25,
        }
    }

    #[test]
    fn test_metric_change_mounts_new_chart() {
        let mut view = build_view(ViewKind::Bars, charts(), &defaults("Karachi")).unwrap();
        let before = view.mounted().artifact.clone();
        assert_eq!(before.id, "bars:Karachi:pm25");

        let detached = view.apply(&[(METRIC_CONTROL, "AQI US")]).unwrap();

        assert_eq!(detached, before);
        assert_eq!(view.mounted().artifact.id, "bars:Karachi:aqius");
        assert_eq!(view.mounted().generation, 1);
    }

    #[test]
    fn test_failed_rebuild_keeps_chart() {
        let mut view = build_view(ViewKind::Trend, charts(), &defaults("Karachi")).unwrap();

        // No AQI CN values anywhere in the dataset
        let err = view.apply(&[(METRIC_CONTROL, "AQI CN")]).unwrap_err();

        assert!(matches!(err, DashboardError::NoData { .. }));
        assert_eq!(view.mounted().artifact.id, "trend:Karachi:pm25");
        assert_eq!(view.selection().get(METRIC_CONTROL), Some("PM2.5"));
    }

    #[test]
    fn test_unknown_default_city_falls_back() {
        let view = build_view(ViewKind::Trend, charts(), &defaults("Multan")).unwrap();
        assert_eq!(view.selection().get(CITY_CONTROL), Some("Karachi"));
    }

    #[test]
    fn test_view_kind_parse() {
        assert_eq!(ViewKind::parse("bars").unwrap(), ViewKind::Bars);
        assert!(matches!(ViewKind::parse("pie"), Err(DashboardError::UnknownView(_))));
    }
}
