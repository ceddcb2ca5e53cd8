// RGB colors and legible text color selection
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DashboardError;

/// Perceived brightness above which dark text is used.
const BRIGHTNESS_THRESHOLD: f64 = 128.0;

/// An opaque RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbHex {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbHex {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB`, `RRGGBB` or `#RRGGBBAA`. An alpha suffix is ignored.
    pub fn parse(input: &str) -> Result<Self, DashboardError> {
        let hex = input.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DashboardError::InvalidColor(input.to_string()));
        }

        let channel = |offset: usize| {
            u8::from_str_radix(&hex[offset..offset + 2], 16)
                .map_err(|_| DashboardError::InvalidColor(input.to_string()))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Weighted channel sum (ITU-R BT.601 luma), 0..=255.
    pub fn brightness(&self) -> f64 {
        let weighted = u32::from(self.r) * 299 + u32::from(self.g) * 587 + u32::from(self.b) * 114;
        f64::from(weighted) / 1000.0
    }
}

impl fmt::Display for RgbHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for RgbHex {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RgbHex> for String {
    fn from(color: RgbHex) -> Self {
        color.to_string()
    }
}

/// Foreground color for text drawn on top of a filled marker or legend cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

/// Black on light backgrounds, white on dark ones.
pub fn contrast_color(background: RgbHex) -> TextColor {
    if background.brightness() > BRIGHTNESS_THRESHOLD {
        TextColor::Black
    } else {
        TextColor::White
    }
}
