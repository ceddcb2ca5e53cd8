// Time-series reconciliation - filter, dedup and window readings for one view
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::chart::Point;
use crate::domain::reading::{DataSource, DataType, Metric, Reading};
use crate::domain::severity::SeverityScale;

/// Forecasts further out than this are not displayed.
pub const DEFAULT_FORECAST_HORIZON: TimeDelta = TimeDelta::days(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFilter {
    pub city: String,
    pub source: DataSource,
    pub metric: Metric,
}

impl SeriesFilter {
    pub fn new(city: &str, source: DataSource, metric: Metric) -> Self {
        Self {
            city: city.to_string(),
            source,
            metric,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    scale: Arc<SeverityScale>,
    horizon: TimeDelta,
}

impl Reconciler {
    pub fn new(scale: Arc<SeverityScale>, horizon: TimeDelta) -> Self {
        Self { scale, horizon }
    }

    pub fn scale(&self) -> &SeverityScale {
        &self.scale
    }

    /// Ordered points for `filter`, evaluated at `now`.
    ///
    /// Per entity (the city aggregate, or each station) a history row sharing
    /// the current reading's timestamp is dropped, and forecasts past
    /// `now + horizon` are dropped. Output is sorted by timestamp, stable
    /// with respect to input order.
    pub fn reconcile(&self, readings: &[Reading], filter: &SeriesFilter, now: DateTime<Utc>) -> Vec<Point> {
        let candidates: Vec<(&Reading, f64)> = readings
            .iter()
            .filter(|r| r.city == filter.city && r.data_source == filter.source)
            .filter_map(|r| r.metric(filter.metric).map(|value| (r, value)))
            .collect();

        let mut current_ts: HashMap<Option<Cow<'_, str>>, DateTime<Utc>> = HashMap::new();
        for &(reading, _) in &candidates {
            if reading.data_type == DataType::Current {
                current_ts.entry(entity_key(reading)).or_insert(reading.ts);
            }
        }

        let cutoff = now + self.horizon;
        let mut seen = HashSet::new();
        let mut points: Vec<Point> = candidates
            .into_iter()
            .filter(|&(reading, _)| match reading.data_type {
                DataType::Current => true,
                DataType::History => current_ts.get(&entity_key(reading)) != Some(&reading.ts),
                DataType::Forecast => reading.ts <= cutoff,
            })
            .filter(|&(reading, _)| seen.insert((entity_key(reading), reading.ts, reading.data_type)))
            .map(|(reading, value)| {
                let tier = self.scale.classify_opt(reading.aqius);
                Point {
                    timestamp: reading.ts,
                    value,
                    severity_color: tier.color,
                    severity_label: tier.label.clone(),
                    data_type: reading.data_type,
                    entity: entity_key(reading).map(Cow::into_owned),
                    aqius: reading.aqius,
                }
            })
            .collect();

        points.sort_by_key(|p| p.timestamp);
        points
    }
}

fn entity_key(reading: &Reading) -> Option<Cow<'_, str>> {
    match reading.data_source {
        DataSource::City => None,
        DataSource::Station => Some(reading.station_key()),
    }
}
