// Chart service - Use cases for building the chart views
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::reconciler::{Reconciler, SeriesFilter};
use crate::application::snapshot_repository::Snapshot;
use crate::domain::chart::{AxisValue, ChartData, ChartKind, ChartPoint, MarkKind, Point, SeriesData};
use crate::domain::color::RgbHex;
use crate::domain::error::DashboardError;
use crate::domain::reading::{DataSource, DataType, Metric, distinct_cities};

const STATION_COLOR: RgbHex = RgbHex::new(0x46, 0x82, 0xB4);
const CITY_LINE_COLOR: RgbHex = RgbHex::new(0x00, 0x00, 0x00);
const BAR_HEADROOM: f64 = 1.1;

#[derive(Clone)]
pub struct ChartService {
    snapshot: Arc<Snapshot>,
    reconciler: Reconciler,
}

impl ChartService {
    pub fn new(snapshot: Arc<Snapshot>, reconciler: Reconciler) -> Self {
        Self { snapshot, reconciler }
    }

    pub fn cities(&self) -> Vec<String> {
        distinct_cities(&self.snapshot.readings)
    }

    /// City aggregate as line + severity-colored dots, stations as faint lines.
    pub fn city_trend(&self, city: &str, metric: Metric, now: DateTime<Utc>) -> Result<ChartData, DashboardError> {
        let city_points = self.city_points(city, metric, now)?;
        let station_points = self.reconciler.reconcile(
            &self.snapshot.readings,
            &SeriesFilter::new(city, DataSource::Station, metric),
            now,
        );

        let mut series = Vec::new();
        for station in station_names(&station_points) {
            let points: Vec<ChartPoint> = station_points
                .iter()
                .filter(|p| p.entity.as_deref() == Some(station.as_str()))
                .map(|p| station_point(p, metric))
                .collect();
            series.push(
                SeriesData::new(format!("station:{}", station), station.clone(), MarkKind::Line, points)
                    .stroked(STATION_COLOR, 0.3),
            );
        }

        let city_line = city_points
            .iter()
            .map(|p| ChartPoint {
                x: AxisValue::Time(p.timestamp),
                value: p.value,
                fill: None,
                opacity: 0.6,
                highlight: false,
                tooltip: Vec::new(),
            })
            .collect();
        series.push(
            SeriesData::new("city-line".to_string(), city.to_string(), MarkKind::Line, city_line)
                .stroked(CITY_LINE_COLOR, 0.6),
        );

        let city_dots = city_points
            .iter()
            .map(|p| city_point(city, p, metric, forecast_opacity(p, 0.5)))
            .collect();
        series.push(SeriesData::new(
            "city".to_string(),
            city.to_string(),
            MarkKind::Dot,
            city_dots,
        ));

        let y_max = city_points
            .iter()
            .chain(station_points.iter())
            .map(|p| p.value)
            .fold(0.0, f64::max);

        tracing::debug!(
            "Built trend chart for {} / {}: {} city points, {} station points",
            city,
            metric,
            city_points.len(),
            station_points.len()
        );

        Ok(ChartData::new(
            format!("trend:{}:{}", city, metric.field()),
            format!("{} {}", city, metric),
            ChartKind::Trend,
            "Time →".to_string(),
            format!("↑ {}", metric),
            [0.0, y_max],
            series,
        ))
    }

    /// City aggregate as severity-colored bars with the current reading outlined.
    pub fn city_bars(&self, city: &str, metric: Metric, now: DateTime<Utc>) -> Result<ChartData, DashboardError> {
        let city_points = self.city_points(city, metric, now)?;

        let bars: Vec<ChartPoint> = city_points
            .iter()
            .map(|p| city_point(city, p, metric, forecast_opacity(p, 0.3)))
            .collect();
        let y_max = city_points.iter().map(|p| p.value).fold(0.0, f64::max) * BAR_HEADROOM;

        Ok(ChartData::new(
            format!("bars:{}:{}", city, metric.field()),
            format!("{} {}", city, metric),
            ChartKind::Bars,
            String::new(),
            format!("↑ {}", metric),
            [0.0, y_max],
            vec![SeriesData::new(
                "city".to_string(),
                city.to_string(),
                MarkKind::BarY,
                bars,
            )],
        ))
    }

    /// Top `limit` ranked cities, highest AQI first.
    pub fn ranking(&self, limit: usize) -> ChartData {
        let scale = self.reconciler.scale();
        let mut entries: Vec<_> = self.snapshot.ranking.iter().take(limit).collect();
        entries.sort_by(|a, b| b.current_aqi.total_cmp(&a.current_aqi));

        let bars: Vec<ChartPoint> = entries
            .iter()
            .map(|entry| {
                let tier = scale.classify(entry.current_aqi);
                ChartPoint {
                    x: AxisValue::Category(entry.city.clone()),
                    value: entry.current_aqi,
                    fill: Some(tier.color),
                    opacity: 1.0,
                    highlight: false,
                    tooltip: vec![
                        ("Rank".to_string(), entry.rank.to_string()),
                        ("AQI".to_string(), entry.current_aqi.to_string()),
                        ("Level".to_string(), tier.label.clone()),
                        ("Location".to_string(), format!("{}, {}", entry.city, entry.country)),
                        ("Updated".to_string(), format_time(entry.updated)),
                    ],
                }
            })
            .collect();
        let x_max = entries.iter().map(|e| e.current_aqi).fold(0.0, f64::max);

        ChartData::new(
            "ranking".to_string(),
            "Live Most Polluted Major City Ranking".to_string(),
            ChartKind::Ranking,
            "Air Quality Index (AQI)".to_string(),
            String::new(),
            [0.0, x_max],
            vec![SeriesData::new(
                "ranking".to_string(),
                "Ranking".to_string(),
                MarkKind::BarX,
                bars,
            )],
        )
    }

    fn city_points(&self, city: &str, metric: Metric, now: DateTime<Utc>) -> Result<Vec<Point>, DashboardError> {
        if !self.snapshot.readings.iter().any(|r| r.city == city) {
            return Err(DashboardError::UnknownCity(city.to_string()));
        }

        let points = self.reconciler.reconcile(
            &self.snapshot.readings,
            &SeriesFilter::new(city, DataSource::City, metric),
            now,
        );
        if points.is_empty() {
            return Err(DashboardError::NoData {
                city: city.to_string(),
                metric: metric.to_string(),
            });
        }
        Ok(points)
    }
}

fn station_names(points: &[Point]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in points.iter().filter_map(|p| p.entity.as_ref()) {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

fn forecast_opacity(point: &Point, forecast: f64) -> f64 {
    if point.data_type == DataType::Forecast { forecast } else { 0.8 }
}

fn city_point(city: &str, point: &Point, metric: Metric, opacity: f64) -> ChartPoint {
    let mut tooltip = vec![
        ("City".to_string(), city.to_string()),
        (metric.label().to_string(), format_value(point.value, metric)),
    ];
    if metric != Metric::AqiUs {
        if let Some(aqius) = point.aqius {
            tooltip.push(("AQI US".to_string(), aqius.to_string()));
        }
    }
    tooltip.push(("Level".to_string(), point.severity_label.clone()));
    tooltip.push(("Reading".to_string(), data_type_label(point.data_type).to_string()));
    tooltip.push(("Time".to_string(), format_time(point.timestamp)));

    ChartPoint {
        x: AxisValue::Time(point.timestamp),
        value: point.value,
        fill: Some(point.severity_color),
        opacity,
        highlight: point.data_type == DataType::Current,
        tooltip,
    }
}

fn station_point(point: &Point, metric: Metric) -> ChartPoint {
    let mut tooltip = vec![(metric.label().to_string(), format_value(point.value, metric))];
    if let Some(station) = &point.entity {
        tooltip.insert(0, ("Station".to_string(), station.clone()));
    }
    tooltip.push(("Time".to_string(), format_time(point.timestamp)));

    ChartPoint {
        x: AxisValue::Time(point.timestamp),
        value: point.value,
        fill: Some(STATION_COLOR),
        opacity: 0.3,
        highlight: false,
        tooltip,
    }
}

fn format_value(value: f64, metric: Metric) -> String {
    match metric {
        Metric::Pm25 => format!("{} µg/m³", value),
        _ => value.to_string(),
    }
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn data_type_label(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Current => "current",
        DataType::History => "history",
        DataType::Forecast => "forecast",
    }
}
