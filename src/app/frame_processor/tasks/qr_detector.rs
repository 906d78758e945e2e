// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Converts frames to luma, downscales large ones, and runs rqrr's grid
//! finder and decoder over the result.

use crate::app::frame_processor::types::{FrameRegion, QrDetection};
use crate::backends::camera::types::CameraFrame;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// QR code detector
///
/// Frames larger than `max_dimension` on either side are downscaled first.
#[derive(Debug, Clone)]
pub struct QrDetector {
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self {
            max_dimension: crate::constants::DEFAULT_MAX_FRAME_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Detect QR codes in a camera frame
    ///
    /// The work is CPU-bound and runs on the blocking pool.
    pub async fn detect(&self, frame: Arc<CameraFrame>) -> Vec<QrDetection> {
        let max_dim = self.max_dimension;

        tokio::task::spawn_blocking(move || detect_sync(&frame, max_dim))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "QR detection task panicked");
                Vec::new()
            })
    }
}

fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> Vec<QrDetection> {
    let start = std::time::Instant::now();

    let width = frame.width;
    let height = frame.height;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let (luma, proc_width, proc_height, scale) = if width > max_dimension || height > max_dimension
    {
        let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
        let new_width = ((width as f32 / scale) as u32).max(1);
        let new_height = ((height as f32 / scale) as u32).max(1);
        (
            downscale_luma(frame, new_width, new_height),
            new_width,
            new_height,
            scale,
        )
    } else {
        (copy_luma_without_stride(frame), width, height, 1.0)
    };

    trace!(
        proc_width,
        proc_height,
        scale,
        conversion_ms = start.elapsed().as_millis(),
        "Prepared luma image for processing"
    );

    let row = proc_width as usize;
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(proc_width as usize, proc_height as usize, |x, y| {
            luma[y * row + x]
        });
    let grids = prepared.detect_grids();

    let mut detections = Vec::with_capacity(grids.len());
    for grid in grids {
        let content = match grid.decode() {
            Ok((_meta, content)) => content,
            Err(e) => {
                debug!(error = %e, "Failed to decode QR grid");
                continue;
            }
        };

        let xs = grid.bounds.iter().map(|p| p.x.max(0) as f32);
        let ys = grid.bounds.iter().map(|p| p.y.max(0) as f32);
        let min_x = xs.clone().fold(f32::MAX, f32::min);
        let max_x = xs.fold(0.0, f32::max).min(proc_width as f32);
        let min_y = ys.clone().fold(f32::MAX, f32::min);
        let max_y = ys.fold(0.0, f32::max).min(proc_height as f32);

        // Back to original frame pixels, then normalized
        let region = FrameRegion::from_pixels(
            (min_x * scale) as u32,
            (min_y * scale) as u32,
            ((max_x - min_x).max(0.0) * scale) as u32,
            ((max_y - min_y).max(0.0) * scale) as u32,
            width,
            height,
        );

        debug!(
            len = content.len(),
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            "Detected QR code"
        );

        detections.push(QrDetection {
            bounds: region,
            content,
        });
    }

    if !detections.is_empty() {
        debug!(
            count = detections.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found codes"
        );
    }

    detections
}

/// Luma plane without stride padding
fn copy_luma_without_stride(frame: &CameraFrame) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;

    let mut result = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            result.push(frame.luma_at(x, y));
        }
    }
    result
}

/// Downscale to luma using bilinear interpolation
fn downscale_luma(frame: &CameraFrame, dst_width: u32, dst_height: u32) -> Vec<u8> {
    let src_width = frame.width as usize;
    let src_height = frame.height as usize;

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = (src_x as usize).min(src_width - 1);
            let y0 = (src_y as usize).min(src_height - 1);
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let p00 = frame.luma_at(x0, y0) as f32;
            let p01 = frame.luma_at(x1, y0) as f32;
            let p10 = frame.luma_at(x0, y1) as f32;
            let p11 = frame.luma_at(x1, y1) as f32;

            let value = p00 * (1.0 - x_frac) * (1.0 - y_frac)
                + p01 * x_frac * (1.0 - y_frac)
                + p10 * (1.0 - x_frac) * y_frac
                + p11 * x_frac * y_frac;

            result.push(value as u8);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::PixelFormat;

    fn frame(width: u32, height: u32, stride: u32, format: PixelFormat, data: &[u8]) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(data),
            format,
            stride,
            captured_at: std::time::Instant::now(),
        }
    }

    #[test]
    fn test_copy_luma_without_stride() {
        let data: Vec<u8> = vec![
            10, 20, 0, 0, // row 0 + padding
            30, 40, 0, 0, // row 1 + padding
        ];
        let frame = frame(2, 2, 4, PixelFormat::Gray8, &data);
        assert_eq!(copy_luma_without_stride(&frame), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_copy_rgba_to_luma() {
        let data: Vec<u8> = vec![
            255, 255, 255, 255, // white
            0, 0, 0, 255, // black
        ];
        let frame = frame(2, 1, 8, PixelFormat::RGBA, &data);
        assert_eq!(copy_luma_without_stride(&frame), vec![255, 0]);
    }

    #[test]
    fn test_downscale_luma() {
        // 4x2 horizontal gradient
        let data: Vec<u8> = vec![
            0, 85, 170, 255, //
            0, 85, 170, 255,
        ];
        let frame = frame(4, 2, 4, PixelFormat::Gray8, &data);

        let result = downscale_luma(&frame, 2, 1);
        assert_eq!(result.len(), 2);
        assert!(result[0] < 100);
        assert!(result[1] > 150);
    }

    #[test]
    fn test_empty_frame() {
        let frame = frame(0, 0, 0, PixelFormat::Gray8, &[]);
        assert!(detect_sync(&frame, 640).is_empty());
    }

    /// White frame with a black QR symbol drawn at (`left`, `top`)
    fn qr_frame(payload: &str, module_px: u32, left: u32, top: u32, width: u32, height: u32) -> CameraFrame {
        let code = qrcodegen::QrCode::encode_text(payload, qrcodegen::QrCodeEcc::Medium).unwrap();
        let mut data = vec![255u8; (width * height) as usize];
        for my in 0..code.size() {
            for mx in 0..code.size() {
                if !code.get_module(mx, my) {
                    continue;
                }
                for dy in 0..module_px {
                    for dx in 0..module_px {
                        let x = left + mx as u32 * module_px + dx;
                        let y = top + my as u32 * module_px + dy;
                        data[(y * width + x) as usize] = 0;
                    }
                }
            }
        }
        frame(width, height, width, PixelFormat::Gray8, &data)
    }

    #[test]
    fn test_decodes_qr_payload_and_bounds() {
        // 21 modules of 8px: the symbol spans x 32..200 and y 32..200
        let frame = qr_frame("3017620422003", 8, 32, 32, 400, 232);
        let detections = detect_sync(&frame, 640);

        assert_eq!(detections.len(), 1);
        let detection = &detections[0];
        assert_eq!(detection.content, "3017620422003");

        let b = &detection.bounds;
        assert!((b.x - 32.0 / 400.0).abs() < 0.05, "x = {}", b.x);
        assert!((b.y - 32.0 / 232.0).abs() < 0.05, "y = {}", b.y);
        assert!((b.width - 168.0 / 400.0).abs() < 0.05, "width = {}", b.width);
        assert!((b.height - 168.0 / 232.0).abs() < 0.05, "height = {}", b.height);
    }

    #[test]
    fn test_downscaled_bounds_stay_in_frame_coordinates() {
        let frame = qr_frame("3017620422003", 8, 32, 32, 400, 232);
        let full = detect_sync(&frame, 640);
        // Halves the frame before detection
        let scaled = detect_sync(&frame, 200);

        assert_eq!(full.len(), 1);
        assert_eq!(scaled.len(), 1);
        assert_eq!(scaled[0].content, full[0].content);

        let (a, b) = (&full[0].bounds, &scaled[0].bounds);
        assert!((a.x - b.x).abs() < 0.03);
        assert!((a.y - b.y).abs() < 0.03);
        assert!((a.width - b.width).abs() < 0.03);
        assert!((a.height - b.height).abs() < 0.03);
    }

    #[tokio::test]
    async fn test_detect_runs_on_blocking_pool() {
        let frame = qr_frame("hello", 6, 24, 24, 200, 200);
        let detections = QrDetector::new().detect(Arc::new(frame)).await;
        let contents: Vec<&str> = detections.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, ["hello"]);
    }

    #[tokio::test]
    async fn test_blank_frame_has_no_codes() {
        let frame = frame(32, 32, 32, PixelFormat::Gray8, &[255u8; 32 * 32]);
        let detector = QrDetector::with_max_dimension(16);
        assert!(detector.detect(Arc::new(frame)).await.is_empty());
    }
}
