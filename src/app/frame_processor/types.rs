// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis result types

use serde::Serialize;

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions,
/// so they stay valid after downscaling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            x: x as f32 / frame_width as f32,
            y: y as f32 / frame_height as f32,
            width: width as f32 / frame_width as f32,
            height: height as f32 / frame_height as f32,
        }
    }

    /// Flip horizontally, as seen through a mirrored front-camera preview
    pub fn mirrored(&self) -> Self {
        Self {
            x: (1.0 - self.x - self.width).max(0.0),
            ..self.clone()
        }
    }
}

/// A decoded QR symbol and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct QrDetection {
    /// Bounding box in normalized frame coordinates
    pub bounds: FrameRegion,
    /// Decoded payload
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_region_from_pixels() {
        let region = FrameRegion::from_pixels(100, 50, 200, 100, 1000, 500);
        assert!((region.x - 0.1).abs() < 0.001);
        assert!((region.y - 0.1).abs() < 0.001);
        assert!((region.width - 0.2).abs() < 0.001);
        assert!((region.height - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_mirrored_region() {
        let region = FrameRegion {
            x: 0.1,
            y: 0.2,
            width: 0.3,
            height: 0.3,
        };
        let mirrored = region.mirrored();
        assert!((mirrored.x - 0.6).abs() < 0.0001);
        assert_eq!(mirrored.y, region.y);
        assert_eq!(mirrored.width, region.width);
    }
}
