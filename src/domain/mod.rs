// Domain layer - Pure types and rules, no I/O
pub mod chart;
pub mod color;
pub mod emission;
pub mod error;
pub mod marker;
pub mod ranking;
pub mod reading;
pub mod severity;
pub mod tooltip;
