// Emission source domain model for the emissions map
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionSource {
    pub source_name: String,
    pub source_type: String,
    pub gas: String,
    #[serde(default)]
    pub emissions_quantity: Option<f64>,
    #[serde(default)]
    pub emissions_factor_units: Option<String>,
    #[serde(default)]
    pub capacity: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl EmissionSource {
    /// Quantity used to size the marker, when present and finite.
    pub fn magnitude(&self) -> Option<f64> {
        self.emissions_quantity.filter(|q| q.is_finite())
    }

    pub fn matches(&self, year: i32, gas: &str) -> bool {
        self.start_time.year() == year && self.gas.eq_ignore_ascii_case(gas)
    }
}
