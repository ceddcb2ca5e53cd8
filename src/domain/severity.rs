//! AQI severity tiers and the classifier shared by every view.
//!
//! A [`SeverityScale`] is built once (from defaults or configuration) and
//! handed to every component that colors a value. Tiers are published as
//! integer bands (`0-50`, `51-100`, ...) but classification treats each tier
//! as the half-open band `(previous.max, max]`, so fractional values such as
//! `50.4` never fall into a gap between bands.
//!
//! The ranking chart historically matched on the upper bound alone
//! (`value <= max`). That shortcut is only equivalent to the full-range check
//! because tiers are contiguous, which [`SeverityScale::new`] enforces.

use serde::{Deserialize, Serialize};

use super::color::{RgbHex, TextColor, contrast_color};
use super::error::DashboardError;

/// A labeled, colored band of the air-quality index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityTier {
    pub label: String,
    pub min_inclusive: f64,
    /// `None` deserializes to an unbounded catch-all tier.
    #[serde(default = "unbounded", deserialize_with = "deserialize_max")]
    pub max_inclusive: f64,
    pub color: RgbHex,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

fn deserialize_max<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl SeverityTier {
    pub fn new(label: &str, min_inclusive: f64, max_inclusive: f64, color: RgbHex) -> Self {
        Self {
            label: label.to_string(),
            min_inclusive,
            max_inclusive,
            color,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_inclusive.is_infinite()
    }
}

/// One cell of the severity legend strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendCell {
    pub range: String,
    pub label: String,
    pub color: RgbHex,
    pub text_color: TextColor,
}

/// Ordered, contiguous tier table covering `[0, +inf)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityScale {
    tiers: Vec<SeverityTier>,
}

impl SeverityScale {
    /// Validates the table: starts at 0, ascending maxima, each lower bound
    /// within one index unit above the previous maximum, unbounded last tier.
    pub fn new(tiers: Vec<SeverityTier>) -> Result<Self, DashboardError> {
        let invalid = |reason: String| Err(DashboardError::InvalidTierTable(reason));

        let Some(first) = tiers.first() else {
            return invalid("at least one tier is required".to_string());
        };
        if first.min_inclusive != 0.0 {
            return invalid(format!("first tier '{}' must start at 0", first.label));
        }

        for pair in tiers.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.is_unbounded() {
                return invalid(format!("only the last tier may be unbounded, not '{}'", prev.label));
            }
            if next.max_inclusive <= prev.max_inclusive {
                return invalid(format!("tier '{}' must end above '{}'", next.label, prev.label));
            }
            // Integer bands: 50 -> 51 is contiguous, 50 -> 52 leaves a gap
            let step = next.min_inclusive - prev.max_inclusive;
            if !(step > 0.0 && step <= 1.0) {
                return invalid(format!(
                    "tier '{}' does not start directly after '{}'",
                    next.label, prev.label
                ));
            }
        }

        let last = &tiers[tiers.len() - 1];
        if !last.is_unbounded() {
            return invalid(format!("last tier '{}' must be unbounded", last.label));
        }

        Ok(Self { tiers })
    }

    /// US EPA AQI bands.
    pub fn aqi_us() -> Self {
        let tiers = vec![
            SeverityTier::new("Good", 0.0, 50.0, RgbHex::new(0x97, 0xC9, 0x3D)),
            SeverityTier::new("Moderate", 51.0, 100.0, RgbHex::new(0xFF, 0xCF, 0x01)),
            SeverityTier::new(
                "Unhealthy for Sensitive Groups",
                101.0,
                150.0,
                RgbHex::new(0xFF, 0x99, 0x33),
            ),
            SeverityTier::new("Unhealthy", 151.0, 200.0, RgbHex::new(0xFF, 0x33, 0x33)),
            SeverityTier::new("Very Unhealthy", 201.0, 300.0, RgbHex::new(0xA3, 0x5D, 0xB5)),
            SeverityTier::new("Hazardous", 301.0, f64::INFINITY, RgbHex::new(0x8B, 0x3F, 0x3F)),
        ];
        Self { tiers }
    }

    pub fn tiers(&self) -> &[SeverityTier] {
        &self.tiers
    }

    /// Highest-severity tier, also the fallback for out-of-domain input.
    pub fn catch_all(&self) -> &SeverityTier {
        // new() rejects empty tables
        &self.tiers[self.tiers.len() - 1]
    }

    /// Returns the tier whose band contains `value`.
    ///
    /// Negative and non-finite input falls through to the catch-all tier.
    pub fn classify(&self, value: f64) -> &SeverityTier {
        if !value.is_finite() || value < 0.0 {
            return self.catch_all();
        }

        let mut lower = f64::NEG_INFINITY;
        for tier in &self.tiers {
            if value > lower && value <= tier.max_inclusive {
                return tier;
            }
            lower = tier.max_inclusive;
        }
        self.catch_all()
    }

    /// Classifies an optional reading; absent values get the catch-all tier.
    pub fn classify_opt(&self, value: Option<f64>) -> &SeverityTier {
        value.map_or_else(|| self.catch_all(), |v| self.classify(v))
    }

    pub fn legend(&self) -> Vec<LegendCell> {
        let mut cells = Vec::with_capacity(self.tiers.len());
        let mut prev_max = None;

        for tier in &self.tiers {
            let range = match (tier.is_unbounded(), prev_max) {
                (true, Some(prev)) => format!("{}+", prev),
                (true, None) => format!("{}+", tier.min_inclusive),
                (false, _) => format!("{}-{}", tier.min_inclusive, tier.max_inclusive),
            };
            cells.push(LegendCell {
                range,
                label: tier.label.clone(),
                color: tier.color,
                text_color: contrast_color(tier.color),
            });
            prev_max = Some(tier.max_inclusive);
        }

        cells
    }
}

impl Default for SeverityScale {
    fn default() -> Self {
        Self::aqi_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "Good")]
    #[case(50.0, "Good")]
    #[case(50.4, "Moderate")]
    #[case(51.0, "Moderate")]
    #[case(100.0, "Moderate")]
    #[case(120.0, "Unhealthy for Sensitive Groups")]
    #[case(200.0, "Unhealthy")]
    #[case(250.0, "Very Unhealthy")]
    #[case(300.0, "Very Unhealthy")]
    #[case(301.0, "Hazardous")]
    #[case(999.0, "Hazardous")]
    fn test_classify(#[case] value: f64, #[case] expected: &str) {
        let scale = SeverityScale::aqi_us();
        assert_eq!(scale.classify(value).label, expected);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_out_of_domain_falls_to_catch_all(#[case] value: f64) {
        let scale = SeverityScale::aqi_us();
        assert_eq!(scale.classify(value).label, "Hazardous");
    }

    #[test]
    fn test_bounds_fall_in_adjacent_tiers() {
        let scale = SeverityScale::aqi_us();
        let tiers = scale.tiers();
        for (i, tier) in tiers.iter().enumerate().filter(|(_, t)| !t.is_unbounded()) {
            let at = scale.classify(tier.max_inclusive);
            let above = scale.classify(tier.max_inclusive + 1e-6);
            assert_eq!(at, tier);
            assert_eq!(above, &tiers[i + 1]);
        }
    }

    #[test]
    fn test_full_range_matches_upper_bound_shortcut() {
        // Equivalent on contiguous tables only
        let scale = SeverityScale::aqi_us();
        for step in 0..4000 {
            let value = f64::from(step) * 0.25;
            let by_max = scale
                .tiers()
                .iter()
                .find(|t| value <= t.max_inclusive)
                .unwrap_or(scale.catch_all());
            assert_eq!(scale.classify(value), by_max, "value {}", value);
        }
    }

    #[test]
    fn test_rejects_gapped_table() {
        let color = RgbHex::new(0, 0, 0);
        let tiers = vec![
            SeverityTier::new("Low", 0.0, 50.0, color),
            SeverityTier::new("High", 60.0, f64::INFINITY, color),
        ];
        assert!(matches!(
            SeverityScale::new(tiers),
            Err(DashboardError::InvalidTierTable(_))
        ));
    }

    #[test]
    fn test_rejects_bounded_last_tier() {
        let color = RgbHex::new(0, 0, 0);
        let tiers = vec![
            SeverityTier::new("Low", 0.0, 50.0, color),
            SeverityTier::new("High", 51.0, 100.0, color),
        ];
        assert!(SeverityScale::new(tiers).is_err());
        assert!(SeverityScale::new(Vec::new()).is_err());
    }

    #[test]
    fn test_default_table_is_valid() {
        let scale = SeverityScale::aqi_us();
        assert_eq!(SeverityScale::new(scale.tiers().to_vec()).unwrap(), scale);
    }

    #[test]
    fn test_legend() {
        let legend = SeverityScale::aqi_us().legend();
        assert_eq!(legend.len(), 6);
        assert_eq!(legend[0].range, "0-50");
        assert_eq!(legend[1].range, "51-100");
        assert_eq!(legend[5].range, "300+");
        assert_eq!(legend[5].label, "Hazardous");
        assert_eq!(legend[5].text_color, TextColor::White);
    }

    #[test]
    fn test_tier_deserialize_without_max_is_unbounded() {
        let tier: SeverityTier = serde_json::from_str(
            r##"{"label":"Hazardous","min_inclusive":301,"color":"#8B3F3F"}"##,
        )
        .unwrap();
        assert!(tier.is_unbounded());
        assert_eq!(tier.color, RgbHex::new(0x8B, 0x3F, 0x3F));
    }
}
