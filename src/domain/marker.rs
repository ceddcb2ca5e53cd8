// Map marker geometry: sizing and derived marker records
use serde::{Deserialize, Serialize};

use super::color::{RgbHex, TextColor, contrast_color};

pub const DEFAULT_FLOOR: f64 = 12.0;
pub const DEFAULT_CEILING: f64 = 34.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub position: LatLon,
    pub radius: f64,
    pub fill_color: RgbHex,
    pub fill_opacity: f64,
    pub text_color: TextColor,
    pub label: String,
}

impl Marker {
    pub fn new(id: String, position: LatLon, radius: f64, fill_color: RgbHex, label: String) -> Self {
        Self {
            id,
            position,
            radius,
            fill_color,
            fill_opacity: 1.0,
            text_color: contrast_color(fill_color),
            label,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = opacity;
        self
    }
}

/// Radius bounds for magnitude-sized markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSizing {
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for MarkerSizing {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR,
            ceiling: DEFAULT_CEILING,
        }
    }
}

impl MarkerSizing {
    /// Computes the dataset-wide maximum magnitude once for a marker pass.
    pub fn scale<I>(&self, values: I) -> MagnitudeScale
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let max_magnitude = values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .map(f64::abs)
            .fold(0.0, f64::max);

        MagnitudeScale {
            sizing: *self,
            max_magnitude,
        }
    }
}

/// Sizing bounds paired with a precomputed maximum magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeScale {
    sizing: MarkerSizing,
    max_magnitude: f64,
}

impl MagnitudeScale {
    pub fn max_magnitude(&self) -> f64 {
        self.max_magnitude
    }

    pub fn radius(&self, value: Option<f64>) -> f64 {
        let MarkerSizing { floor, ceiling } = self.sizing;
        let Some(value) = value.filter(|v| v.is_finite()) else {
            return floor;
        };
        if self.max_magnitude == 0.0 {
            return floor;
        }

        (value.abs() / self.max_magnitude * ceiling).max(floor).min(ceiling)
    }
}

/// Single-marker form of [`MagnitudeScale::radius`]; prefer building the
/// scale once when sizing many markers.
pub fn radius(value: Option<f64>, all_values: &[Option<f64>], floor: f64, ceiling: f64) -> f64 {
    MarkerSizing { floor, ceiling }
        .scale(all_values.iter().copied())
        .radius(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_uses_floor() {
        assert_eq!(radius(None, &[Some(10.0), Some(40.0)], 12.0, 34.0), 12.0);
    }

    #[test]
    fn test_own_maximum_uses_ceiling() {
        assert_eq!(radius(Some(250.0), &[Some(250.0)], 12.0, 34.0), 34.0);
        assert_eq!(radius(Some(-250.0), &[Some(-250.0), Some(100.0)], 12.0, 34.0), 34.0);
    }

    #[test]
    fn test_zero_maximum_uses_floor() {
        let all = [Some(0.0), Some(0.0), Some(0.0)];
        assert_eq!(radius(Some(0.0), &all, 12.0, 34.0), 12.0);
    }

    #[test]
    fn test_proportional_and_clamped() {
        let scale = MarkerSizing::default().scale([Some(100.0), None, Some(-50.0), Some(10.0)]);
        assert_eq!(scale.max_magnitude(), 100.0);
        assert_eq!(scale.radius(Some(50.0)), 17.0);
        assert_eq!(scale.radius(Some(-50.0)), 17.0);
        // 10% of the ceiling is below the floor
        assert_eq!(scale.radius(Some(10.0)), 12.0);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let scale = MarkerSizing::default().scale([Some(f64::NAN), Some(20.0), Some(f64::INFINITY)]);
        assert_eq!(scale.max_magnitude(), 20.0);
        assert_eq!(scale.radius(Some(f64::NAN)), 12.0);
    }

    #[test]
    fn test_marker_text_color_follows_fill() {
        let light = Marker::new(
            "m".to_string(),
            LatLon::new(31.5, 74.3),
            12.0,
            RgbHex::new(0xFF, 0xCF, 0x01),
            "42".to_string(),
        );
        assert_eq!(light.text_color, TextColor::Black);
    }
}
