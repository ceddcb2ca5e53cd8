// Chart domain models handed to the charting adapter
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::color::RgbHex;
use super::reading::DataType;

/// One reconciled time-series sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub severity_color: RgbHex,
    pub severity_label: String,
    pub data_type: DataType,
    /// Station name for station series, `None` for the city aggregate.
    pub entity: Option<String>,
    /// AQI US of the underlying reading, kept for tooltips.
    pub aqius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Time(DateTime<Utc>),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: AxisValue,
    pub value: f64,
    pub fill: Option<RgbHex>,
    pub opacity: f64,
    /// Draw an outline ring/box around the mark.
    pub highlight: bool,
    pub tooltip: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkKind {
    Line,
    Dot,
    BarY,
    BarX,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub mark: MarkKind,
    pub stroke: Option<RgbHex>,
    pub opacity: f64,
    pub points: Vec<ChartPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, mark: MarkKind, points: Vec<ChartPoint>) -> Self {
        Self {
            id,
            name,
            mark,
            stroke: None,
            opacity: 1.0,
            points,
        }
    }

    pub fn stroked(mut self, stroke: RgbHex, opacity: f64) -> Self {
        self.stroke = Some(stroke);
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Trend,
    Bars,
    Ranking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub y_domain: [f64; 2],
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(
        id: String,
        title: String,
        kind: ChartKind,
        x_label: String,
        y_label: String,
        y_domain: [f64; 2],
        series: Vec<SeriesData>,
    ) -> Self {
        Self {
            id,
            title,
            kind,
            x_label,
            y_label,
            y_domain,
            series,
        }
    }
}
