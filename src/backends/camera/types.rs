// SPDX-License-Identifier: GPL-3.0-only

//! Camera feed types: frames, raw detections and decode events

use crate::app::frame_processor::FrameRegion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which lens the feed uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    #[default]
    Back,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

/// Barcode symbologies the scanner acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Qr,
    Code128,
    Code93,
    Aztec,
    Codabar,
    Code39,
    Ean13,
    Ean8,
    Itf14,
    UpcA,
    UpcE,
    DataMatrix,
    Pdf417,
}

impl Symbology {
    /// The supported set
    pub const ALL: [Symbology; 13] = [
        Symbology::Qr,
        Symbology::Code128,
        Symbology::Code93,
        Symbology::Aztec,
        Symbology::Codabar,
        Symbology::Code39,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Itf14,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::DataMatrix,
        Symbology::Pdf417,
    ];

    /// Parse a camera layer type name such as `ean13`, `EAN-13` or `upc_a`
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Some(match key.as_str() {
            "qr" | "qrcode" => Symbology::Qr,
            "code128" => Symbology::Code128,
            "code93" => Symbology::Code93,
            "aztec" => Symbology::Aztec,
            "codabar" => Symbology::Codabar,
            "code39" => Symbology::Code39,
            "ean13" => Symbology::Ean13,
            "ean8" => Symbology::Ean8,
            "itf14" => Symbology::Itf14,
            "upca" => Symbology::UpcA,
            "upce" => Symbology::UpcE,
            "datamatrix" => Symbology::DataMatrix,
            "pdf417" => Symbology::Pdf417,
            _ => return None,
        })
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Symbology::Qr => "QR",
            Symbology::Code128 => "Code 128",
            Symbology::Code93 => "Code 93",
            Symbology::Aztec => "Aztec",
            Symbology::Codabar => "Codabar",
            Symbology::Code39 => "Code 39",
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::Itf14 => "ITF-14",
            Symbology::UpcA => "UPC-A",
            Symbology::UpcE => "UPC-E",
            Symbology::DataMatrix => "Data Matrix",
            Symbology::Pdf417 => "PDF417",
        }
    }
}

/// Symbol found in a frame, as reported by the camera layer
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Decoded payload
    pub data: String,
    /// Camera layer type name, not yet checked against the supported set
    pub symbology: String,
    /// Where in the frame the symbol was found, if known
    pub bounds: Option<FrameRegion>,
}

/// One recognized barcode in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeEvent {
    pub raw_value: String,
    pub symbology: Symbology,
    pub timestamp: DateTime<Utc>,
}

impl DecodeEvent {
    pub fn new(raw_value: impl Into<String>, symbology: Symbology) -> Self {
        Self {
            raw_value: raw_value.into(),
            symbology,
            timestamp: Utc::now(),
        }
    }
}

/// Pixel layout of [`CameraFrame::data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit luma, 1 byte per pixel
    Gray8,
    /// 32-bit RGBA, 4 bytes per pixel
    RGBA,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::RGBA => 4,
        }
    }
}

/// A single camera frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row, may include padding
    pub stride: u32,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Luma value at (x, y); out-of-range reads are black
    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        let offset = y * self.stride as usize + x * self.format.bytes_per_pixel();
        match self.format {
            PixelFormat::Gray8 => self.data.get(offset).copied().unwrap_or(0),
            PixelFormat::RGBA => match self.data.get(offset..offset + 3) {
                // ITU-R BT.601 weights, integer form
                Some(&[r, g, b]) => {
                    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
                }
                _ => 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbology_names() {
        assert_eq!(Symbology::from_name("ean13"), Some(Symbology::Ean13));
        assert_eq!(Symbology::from_name("EAN-13"), Some(Symbology::Ean13));
        assert_eq!(Symbology::from_name("upc_a"), Some(Symbology::UpcA));
        assert_eq!(Symbology::from_name("datamatrix"), Some(Symbology::DataMatrix));
        assert_eq!(Symbology::from_name("maxicode"), None);
        assert_eq!(Symbology::from_name(""), None);
    }

    #[test]
    fn test_every_supported_symbology_parses_from_serde_name() {
        for symbology in Symbology::ALL {
            let name = serde_json::to_value(symbology).unwrap();
            let name = name.as_str().unwrap();
            assert_eq!(Symbology::from_name(name), Some(symbology), "{}", name);
        }
    }

    #[test]
    fn test_decode_event_is_stamped_at_creation() {
        let before = Utc::now();
        let event = DecodeEvent::new("3017620422003", Symbology::Ean13);
        assert!(event.timestamp >= before);
        assert!(event.timestamp <= Utc::now());
        assert_eq!(event.clone(), event);
    }

    #[test]
    fn test_facing_flip() {
        assert_eq!(CameraFacing::Back.flipped(), CameraFacing::Front);
        assert_eq!(CameraFacing::Front.flipped().flipped(), CameraFacing::Front);
    }

    #[test]
    fn test_luma_from_rgba() {
        let frame = CameraFrame {
            width: 2,
            height: 1,
            data: Arc::from(&[255u8, 255, 255, 255, 0, 0, 0, 255][..]),
            format: PixelFormat::RGBA,
            stride: 8,
            captured_at: Instant::now(),
        };
        assert_eq!(frame.luma_at(0, 0), 255);
        assert_eq!(frame.luma_at(1, 0), 0);
        assert_eq!(frame.luma_at(5, 5), 0);
    }
}
