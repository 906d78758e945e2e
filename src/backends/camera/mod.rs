// SPDX-License-Identifier: GPL-3.0-only

//! Camera feed abstraction and barcode decoding
//!
//! ```text
//! ┌─────────────────────┐
//! │   ScanController    │  ← de-dup policy, user intent
//! └──────────┬──────────┘
//!            │ DecodeEvent
//! ┌──────────▼──────────┐
//! │   BarcodeDecoder    │  ← supported-symbology check only
//! └──────────┬──────────┘
//!            │ RawDetection
//! ┌──────────▼──────────┐
//! │  CameraFeed (trait) │  ← device, image files, test scripts
//! └─────────────────────┘
//! ```

pub mod image_feed;
pub mod types;

pub use image_feed::ImageFeed;
pub use types::*;

use std::future::Future;
use tracing::{debug, info, trace};

/// A source of camera frames that yields decoded symbols
pub trait CameraFeed {
    /// Switch lens; applies from the next frame
    fn set_facing(&mut self, facing: CameraFacing);

    /// Switch the torch; applies from the next frame
    fn set_torch(&mut self, on: bool);

    /// Next symbol found by the feed, or `None` once the feed has ended
    fn next_detection(&mut self) -> impl Future<Output = Option<RawDetection>> + Send;
}

/// Turns a camera feed into [`DecodeEvent`]s
///
/// Every recognized frame is reported, including repeats of the same
/// barcode. Acting on repeats is the controller's decision.
#[derive(Debug)]
pub struct BarcodeDecoder<F> {
    feed: F,
    facing: CameraFacing,
    torch: bool,
}

impl<F: CameraFeed> BarcodeDecoder<F> {
    pub fn new(mut feed: F, facing: CameraFacing) -> Self {
        feed.set_facing(facing);
        feed.set_torch(false);
        Self {
            feed,
            facing,
            torch: false,
        }
    }

    pub fn set_facing(&mut self, facing: CameraFacing) {
        if self.facing != facing {
            info!(?facing, "Switching camera facing");
        }
        self.facing = facing;
        self.feed.set_facing(facing);
    }

    pub fn set_torch(&mut self, on: bool) {
        debug!(torch = on, "Setting torch");
        self.torch = on;
        self.feed.set_torch(on);
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn torch(&self) -> bool {
        self.torch
    }

    /// Wait for the next detection in a supported symbology
    ///
    /// Returns `None` when the feed ends.
    pub async fn next_event(&mut self) -> Option<DecodeEvent> {
        loop {
            let detection = self.feed.next_detection().await?;
            match Symbology::from_name(&detection.symbology) {
                Some(symbology) => {
                    trace!(
                        symbology = symbology.display_name(),
                        len = detection.data.len(),
                        "Barcode decoded"
                    );
                    return Some(DecodeEvent::new(detection.data, symbology));
                }
                None => {
                    trace!(symbology = %detection.symbology, "Skipping unsupported symbology");
                }
            }
        }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedFeed {
        detections: VecDeque<RawDetection>,
        facing: Option<CameraFacing>,
        torch: Option<bool>,
    }

    impl CameraFeed for ScriptedFeed {
        fn set_facing(&mut self, facing: CameraFacing) {
            self.facing = Some(facing);
        }

        fn set_torch(&mut self, on: bool) {
            self.torch = Some(on);
        }

        fn next_detection(&mut self) -> impl Future<Output = Option<RawDetection>> + Send {
            std::future::ready(self.detections.pop_front())
        }
    }

    fn raw(data: &str, symbology: &str) -> RawDetection {
        RawDetection {
            data: data.to_string(),
            symbology: symbology.to_string(),
            bounds: None,
        }
    }

    #[tokio::test]
    async fn test_reports_repeats_and_skips_unsupported() {
        let feed = ScriptedFeed {
            detections: VecDeque::from([
                raw("3017620422003", "ean13"),
                raw("ignored", "maxicode"),
                raw("3017620422003", "ean13"),
            ]),
            ..Default::default()
        };
        let mut decoder = BarcodeDecoder::new(feed, CameraFacing::Back);

        let first = decoder.next_event().await.unwrap();
        let second = decoder.next_event().await.unwrap();
        assert_eq!(first.raw_value, "3017620422003");
        assert_eq!(second.raw_value, "3017620422003");
        assert_eq!(second.symbology, Symbology::Ean13);
        assert!(decoder.next_event().await.is_none());
    }

    #[test]
    fn test_controls_forwarded_to_feed() {
        let mut decoder = BarcodeDecoder::new(ScriptedFeed::default(), CameraFacing::Back);
        assert_eq!(decoder.feed().facing, Some(CameraFacing::Back));
        assert_eq!(decoder.feed().torch, Some(false));

        decoder.set_facing(CameraFacing::Front);
        decoder.set_torch(true);
        assert_eq!(decoder.facing(), CameraFacing::Front);
        assert!(decoder.torch());
        assert_eq!(decoder.feed().facing, Some(CameraFacing::Front));
        assert_eq!(decoder.feed().torch, Some(true));
    }
}
