// SPDX-License-Identifier: GPL-3.0-only

//! Camera feed backed by still images
//!
//! Each image file is one frame. Frames are loaded lazily and run through
//! the QR detector, so a scan can be replayed on a machine with no camera.

use super::types::{CameraFacing, CameraFrame, PixelFormat, RawDetection};
use super::CameraFeed;
use crate::app::frame_processor::QrDetector;
use crate::errors::CameraError;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

type FrameStream = Pin<Box<dyn Stream<Item = Result<CameraFrame, CameraError>> + Send>>;

pub struct ImageFeed {
    frames: FrameStream,
    detector: QrDetector,
    pending: VecDeque<RawDetection>,
    facing: CameraFacing,
}

impl std::fmt::Debug for ImageFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFeed")
            .field("pending", &self.pending.len())
            .field("facing", &self.facing)
            .finish()
    }
}

impl ImageFeed {
    pub fn new(paths: Vec<PathBuf>, detector: QrDetector) -> Self {
        info!(frames = paths.len(), "Opening image feed");
        let frames = async_stream::stream! {
            for path in paths {
                let display = path.display().to_string();
                let loaded = tokio::task::spawn_blocking(move || load_frame(&path)).await;
                match loaded {
                    Ok(frame) => yield frame,
                    Err(e) => yield Err(CameraError::FrameLoad(format!("{}: {}", display, e))),
                }
            }
        };

        Self {
            frames: Box::pin(frames),
            detector,
            pending: VecDeque::new(),
            facing: CameraFacing::Back,
        }
    }
}

impl CameraFeed for ImageFeed {
    fn set_facing(&mut self, facing: CameraFacing) {
        self.facing = facing;
    }

    fn set_torch(&mut self, on: bool) {
        debug!(torch = on, "Torch has no effect on still images");
    }

    fn next_detection(&mut self) -> impl Future<Output = Option<RawDetection>> + Send {
        async move {
            loop {
                if let Some(detection) = self.pending.pop_front() {
                    return Some(detection);
                }

                let frame = match self.frames.next().await? {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable frame");
                        continue;
                    }
                };

                // Front-facing previews are mirrored
                let mirrored = self.facing == CameraFacing::Front;
                let detections = self.detector.detect(Arc::new(frame)).await;
                self.pending
                    .extend(detections.into_iter().map(|detection| RawDetection {
                        data: detection.content,
                        symbology: "qr".to_string(),
                        bounds: Some(if mirrored {
                            detection.bounds.mirrored()
                        } else {
                            detection.bounds
                        }),
                    }));
            }
        }
    }
}

/// Decode an image file into a luma frame
fn load_frame(path: &Path) -> Result<CameraFrame, CameraError> {
    let luma = image::open(path)?.to_luma8();
    let (width, height) = luma.dimensions();
    debug!(path = %path.display(), width, height, "Loaded frame");

    Ok(CameraFrame {
        width,
        height,
        data: Arc::from(luma.into_raw()),
        format: PixelFormat::Gray8,
        stride: width,
        captured_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreadable_frames_end_feed() {
        let mut feed = ImageFeed::new(
            vec![PathBuf::from("/nonexistent/frame.png")],
            QrDetector::default(),
        );
        assert!(feed.next_detection().await.is_none());
    }

    #[tokio::test]
    async fn test_blank_frame_has_no_detections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        image::GrayImage::from_pixel(64, 64, image::Luma([255u8]))
            .save(&path)
            .unwrap();

        let mut feed = ImageFeed::new(vec![path], QrDetector::default());
        assert!(feed.next_detection().await.is_none());
    }
}
