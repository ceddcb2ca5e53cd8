// Live most-polluted-city ranking entry
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
    pub current_aqi: f64,
    pub updated: DateTime<Utc>,
}
