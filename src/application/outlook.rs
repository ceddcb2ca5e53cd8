// Daily outlook - yesterday's actuals and tomorrow's forecast around the current reading
use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::domain::error::DashboardError;
use crate::domain::reading::{DataSource, DataType, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub pm25: Option<f64>,
    pub aqius: Option<f64>,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOutlook {
    pub city: String,
    pub date: NaiveDate,
    pub pm25: Option<f64>,
    pub aqius: Option<f64>,
    pub yesterday: Option<DailyAverage>,
    pub tomorrow: Option<DailyAverage>,
}

/// Outlook for `city` anchored on the date (UTC) of its current city reading.
pub fn daily_outlook(readings: &[Reading], city: &str) -> Result<DailyOutlook, DashboardError> {
    let city_rows: Vec<&Reading> = readings
        .iter()
        .filter(|r| r.city == city && r.data_source == DataSource::City)
        .collect();

    let current = city_rows
        .iter()
        .find(|r| r.data_type == DataType::Current)
        .ok_or_else(|| DashboardError::NoData {
            city: city.to_string(),
            metric: "current".to_string(),
        })?;
    let date = current.ts.date_naive();

    let yesterday = date
        .checked_sub_days(Days::new(1))
        .and_then(|day| average(&city_rows, DataType::History, day));
    let tomorrow = date
        .checked_add_days(Days::new(1))
        .and_then(|day| average(&city_rows, DataType::Forecast, day));

    Ok(DailyOutlook {
        city: city.to_string(),
        date,
        pm25: current.pm25,
        aqius: current.aqius,
        yesterday,
        tomorrow,
    })
}

fn average(rows: &[&Reading], data_type: DataType, date: NaiveDate) -> Option<DailyAverage> {
    let day: Vec<&&Reading> = rows
        .iter()
        .filter(|r| r.data_type == data_type && r.ts.date_naive() == date)
        .collect();
    if day.is_empty() {
        return None;
    }

    Some(DailyAverage {
        date,
        pm25: mean(day.iter().filter_map(|r| r.pm25)),
        aqius: mean(day.iter().filter_map(|r| r.aqius)),
        samples: day.len(),
    })
}

/// Mean rounded to one decimal; `None` for no values.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| (sum / count as f64 * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::fixtures::*;
    use chrono::TimeDelta;

    #[test]
    fn test_yesterday_and_tomorrow_averages() {
        let now = at(12);
        let readings = vec![
            city_reading("Lahore", DataType::Current, now, 120.0, 184.0),
            city_reading("Lahore", DataType::History, now - TimeDelta::days(1), 100.0, 174.0),
            city_reading("Lahore", DataType::History, now - TimeDelta::hours(25), 90.0, 170.0),
            city_reading("Lahore", DataType::History, now - TimeDelta::hours(2), 500.0, 500.0),
            city_reading("Lahore", DataType::Forecast, now + TimeDelta::days(1), 70.0, 158.06),
            city_reading("Karachi", DataType::History, now - TimeDelta::days(1), 10.0, 40.0),
        ];

        let outlook = daily_outlook(&readings, "Lahore").unwrap();

        let yesterday = outlook.yesterday.unwrap();
        assert_eq!(yesterday.samples, 2);
        assert_eq!(yesterday.pm25, Some(95.0));
        assert_eq!(yesterday.aqius, Some(172.0));
        let tomorrow = outlook.tomorrow.unwrap();
        assert_eq!(tomorrow.samples, 1);
        assert_eq!(tomorrow.aqius, Some(158.1));
        assert_eq!(outlook.pm25, Some(120.0));
    }

    #[test]
    fn test_missing_days_are_absent() {
        let readings = vec![city_reading("Lahore", DataType::Current, at(12), 120.0, 184.0)];

        let outlook = daily_outlook(&readings, "Lahore").unwrap();

        assert_eq!(outlook.yesterday, None);
        assert_eq!(outlook.tomorrow, None);
    }

    #[test]
    fn test_requires_current_reading() {
        let readings = vec![city_reading("Lahore", DataType::History, at(12), 120.0, 184.0)];
        assert!(matches!(
            daily_outlook(&readings, "Lahore"),
            Err(DashboardError::NoData { .. })
        ));
    }
}
