// Air-quality reading domain model
use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DashboardError;

/// Whether a reading is a city-wide aggregate or from a single sensor station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    City,
    Station,
}

/// Temporal classification of a reading relative to the moment of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Current,
    History,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub data_source: DataSource,
    pub data_type: DataType,
    pub ts: DateTime<Utc>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub aqius: Option<f64>,
    #[serde(default)]
    pub aqicn: Option<f64>,
    /// Temperature, degrees Celsius.
    #[serde(default)]
    pub tp: Option<f64>,
    /// Relative humidity, percent.
    #[serde(default)]
    pub hu: Option<f64>,
    /// Wind speed, m/s.
    #[serde(default)]
    pub ws: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Reading {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pm25 => self.pm25,
            Metric::AqiUs => self.aqius,
            Metric::AqiCn => self.aqicn,
        }
        .filter(|v| v.is_finite())
    }

    /// Station name for station readings, the city otherwise.
    pub fn display_name(&self) -> &str {
        self.station_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.city)
    }

    /// Identity of a station within its city: the station name, or its
    /// coordinates when the name is missing so unnamed stations stay apart.
    pub fn station_key(&self) -> Cow<'_, str> {
        match self.station_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("{:.5},{:.5}", self.latitude, self.longitude)),
        }
    }
}

/// Selectable pollutant metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Pm25,
    AqiUs,
    AqiCn,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Pm25, Metric::AqiUs, Metric::AqiCn];

    /// Label shown in the metric selector.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Pm25 => "PM2.5",
            Metric::AqiUs => "AQI US",
            Metric::AqiCn => "AQI CN",
        }
    }

    /// Reading field backing the metric.
    pub fn field(&self) -> &'static str {
        match self {
            Metric::Pm25 => "pm25",
            Metric::AqiUs => "aqius",
            Metric::AqiCn => "aqicn",
        }
    }

    /// Accepts either the selector label or the field name.
    pub fn parse(input: &str) -> Result<Self, DashboardError> {
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(input) || m.field().eq_ignore_ascii_case(input))
            .ok_or_else(|| DashboardError::UnknownMetric(input.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sorted distinct city names present in a reading set.
pub fn distinct_cities(readings: &[Reading]) -> Vec<String> {
    let mut cities: Vec<String> = readings.iter().map(|r| r.city.clone()).collect();
    cities.sort();
    cities.dedup();
    cities
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, hour, 0, 0).unwrap()
    }

    pub fn reading(city: &str, source: DataSource, data_type: DataType, ts: DateTime<Utc>) -> Reading {
        Reading {
            city: city.to_string(),
            station_name: None,
            state: None,
            country: Some("Pakistan".to_string()),
            data_source: source,
            data_type,
            ts,
            pm25: None,
            pm10: None,
            aqius: None,
            aqicn: None,
            tp: None,
            hu: None,
            ws: None,
            latitude: 31.5204,
            longitude: 74.3587,
            comment: None,
        }
    }

    pub fn city_reading(
        city: &str,
        data_type: DataType,
        ts: DateTime<Utc>,
        pm25: f64,
        aqius: f64,
    ) -> Reading {
        Reading {
            pm25: Some(pm25),
            aqius: Some(aqius),
            ..reading(city, DataSource::City, data_type, ts)
        }
    }

    pub fn station_reading(
        city: &str,
        station: &str,
        data_type: DataType,
        ts: DateTime<Utc>,
        pm25: f64,
        aqius: f64,
    ) -> Reading {
        Reading {
            station_name: Some(station.to_string()),
            pm25: Some(pm25),
            aqius: Some(aqius),
            ..reading(city, DataSource::Station, data_type, ts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_metric_parse() {
        assert_eq!(Metric::parse("PM2.5").unwrap(), Metric::Pm25);
        assert_eq!(Metric::parse("aqius").unwrap(), Metric::AqiUs);
        assert_eq!(Metric::parse("AQI CN").unwrap(), Metric::AqiCn);
        assert!(matches!(Metric::parse("ozone"), Err(DashboardError::UnknownMetric(_))));
    }

    #[test]
    fn test_metric_skips_non_finite() {
        let mut r = city_reading("Lahore", DataType::Current, at(10), 120.0, 180.0);
        assert_eq!(r.metric(Metric::Pm25), Some(120.0));
        assert_eq!(r.metric(Metric::AqiCn), None);
        r.pm25 = Some(f64::NAN);
        assert_eq!(r.metric(Metric::Pm25), None);
    }

    #[test]
    fn test_deserialize_with_missing_optionals() {
        let json = r#"{
            "city": "Karachi",
            "data_source": "station",
            "data_type": "history",
            "ts": "2026-01-15T10:00:00Z",
            "pm25": null,
            "latitude": 24.86,
            "longitude": 67.0
        }"#;
        let r: Reading = serde_json::from_str(json).unwrap();
        assert_eq!(r.data_source, DataSource::Station);
        assert_eq!(r.data_type, DataType::History);
        assert_eq!(r.pm25, None);
        assert_eq!(r.display_name(), "Karachi");
        assert_eq!(r.station_key(), "24.86000,67.00000");
    }

    #[test]
    fn test_station_key_prefers_name() {
        let named = station_reading("Lahore", "Gulberg", DataType::Current, at(9), 35.0, 40.0);
        assert_eq!(named.station_key(), "Gulberg");

        let mut blank = named.clone();
        blank.station_name = Some(String::new());
        assert_eq!(blank.station_key(), "31.52040,74.35870");
    }

    #[test]
    fn test_distinct_cities() {
        let readings = vec![
            city_reading("Lahore", DataType::Current, at(1), 1.0, 1.0),
            city_reading("Karachi", DataType::Current, at(1), 1.0, 1.0),
            city_reading("Lahore", DataType::History, at(0), 1.0, 1.0),
        ];
        assert_eq!(distinct_cities(&readings), vec!["Karachi", "Lahore"]);
    }
}
