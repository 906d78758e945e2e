// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Product lookup endpoint; the code and a `.json` suffix are appended
pub const DEFAULT_CATALOG_URL: &str = "https://world.openfoodfacts.org/api/v0/product";

/// Catalog request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Frames are downscaled to this size before QR detection
pub const DEFAULT_MAX_FRAME_DIMENSION: u32 = 640;

/// Placeholder shown for any value the catalog did not provide
pub const UNKNOWN_LABEL: &str = "Unknown";

/// An sRGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fixed palette for scores and nutrient levels
pub mod palette {
    use super::Color;

    pub const GREEN_500: Color = Color::from_rgb8(0x22, 0xc5, 0x5e);
    pub const GREEN_400: Color = Color::from_rgb8(0x4a, 0xde, 0x80);
    pub const YELLOW_400: Color = Color::from_rgb8(0xfa, 0xcc, 0x15);
    pub const YELLOW_500: Color = Color::from_rgb8(0xea, 0xb3, 0x08);
    pub const ORANGE_400: Color = Color::from_rgb8(0xfb, 0x92, 0x3c);
    pub const RED_500: Color = Color::from_rgb8(0xef, 0x44, 0x44);
    /// Fallback for an unknown Nutri-Score
    pub const ZINC_400: Color = Color::from_rgb8(0xa1, 0xa1, 0xaa);
    /// Neutral dot for an unset nutrient level
    pub const ZINC_600: Color = Color::from_rgb8(0x52, 0x52, 0x5b);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(palette::RED_500.to_hex(), "#ef4444");
        assert_eq!(Color::from_rgb8(0, 10, 255).to_hex(), "#000aff");
    }
}
