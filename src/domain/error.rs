// Core error kinds shared by every dashboard component
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    #[error("map access credential is required")]
    MissingCredential,

    #[error("invalid severity tier table: {0}")]
    InvalidTierTable(String),

    #[error("invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("unknown city '{0}'")]
    UnknownCity(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("unknown control '{0}'")]
    UnknownControl(String),

    #[error("value '{value}' is not an option of control '{control}'")]
    InvalidControlValue { control: String, value: String },

    #[error("no {metric} readings for {city}")]
    NoData { city: String, metric: String },

    #[error("unknown marker '{0}'")]
    UnknownMarker(String),

    #[error("unknown view '{0}'")]
    UnknownView(String),
}
