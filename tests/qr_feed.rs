// SPDX-License-Identifier: MPL-2.0

//! Integration tests for decoding QR symbols from image files

use scanfeast::app::DecodeOutcome;
use scanfeast::app::frame_processor::QrDetector;
use scanfeast::backends::camera::{
    BarcodeDecoder, CameraFacing, CameraFeed, ImageFeed, RawDetection, Symbology,
};
use scanfeast::backends::permission::{FixedAuthority, PermissionGate, PermissionStatus};
use scanfeast::navigation::HistoryNavigator;
use scanfeast::ScanController;
use std::path::{Path, PathBuf};

const PAYLOAD: &str = "3017620422003";

/// Write a PNG with a QR symbol in the left part of a wide frame
fn write_qr_png(dir: &Path, payload: &str) -> PathBuf {
    let code = qrcodegen::QrCode::encode_text(payload, qrcodegen::QrCodeEcc::Medium).unwrap();
    let module_px = 8;
    let quiet = 4 * module_px;
    let side = code.size() as u32 * module_px + 2 * quiet;

    let image = image::GrayImage::from_fn(side * 2, side, |x, y| {
        let (mx, my) = (x.wrapping_sub(quiet) / module_px, y.wrapping_sub(quiet) / module_px);
        let inside = x >= quiet && y >= quiet && (mx as i32) < code.size() && (my as i32) < code.size();
        if inside && code.get_module(mx as i32, my as i32) {
            image::Luma([0u8])
        } else {
            image::Luma([255u8])
        }
    });

    let path = dir.join("qr.png");
    image.save(&path).unwrap();
    path
}

async fn first_detection(path: &Path, facing: CameraFacing) -> RawDetection {
    let mut feed = ImageFeed::new(vec![path.to_path_buf()], QrDetector::default());
    feed.set_facing(facing);
    feed.next_detection().await.unwrap()
}

#[tokio::test]
async fn test_image_feed_reports_qr() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qr_png(dir.path(), PAYLOAD);

    let detection = first_detection(&path, CameraFacing::Back).await;
    assert_eq!(detection.data, PAYLOAD);
    assert_eq!(detection.symbology, "qr");

    let bounds = detection.bounds.unwrap();
    assert!(bounds.x + bounds.width < 0.5, "symbol is in the left half");
    assert!(bounds.width > 0.3);
}

#[tokio::test]
async fn test_front_facing_bounds_are_mirrored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qr_png(dir.path(), PAYLOAD);

    let back = first_detection(&path, CameraFacing::Back).await.bounds.unwrap();
    let front = first_detection(&path, CameraFacing::Front).await.bounds.unwrap();

    assert_eq!(front, back.mirrored());
    assert!(front.x > 0.5, "mirrored symbol is in the right half");
    assert_eq!(front.y, back.y);
}

#[tokio::test]
async fn test_decoder_turns_qr_into_event() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qr_png(dir.path(), PAYLOAD);

    let feed = ImageFeed::new(vec![path.clone(), path], QrDetector::default());
    let mut decoder = BarcodeDecoder::new(feed, CameraFacing::Back);

    // No de-duplication at this layer
    for _ in 0..2 {
        let event = decoder.next_event().await.unwrap();
        assert_eq!(event.raw_value, PAYLOAD);
        assert_eq!(event.symbology, Symbology::Qr);
    }
    assert!(decoder.next_event().await.is_none());
}

#[tokio::test]
async fn test_scanner_freezes_on_scanned_qr() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_qr_png(dir.path(), PAYLOAD);

    let mut gate = PermissionGate::new(FixedAuthority::answering(PermissionStatus::Granted));
    gate.request_access().await;
    let mut nav = HistoryNavigator::new();

    let feed = ImageFeed::new(vec![path.clone(), path], QrDetector::default());
    let mut scan = ScanController::new(feed, CameraFacing::Front);
    assert!(scan.activate(&gate, &mut nav));

    assert_eq!(scan.pump().await, Some(DecodeOutcome::Recorded));
    assert_eq!(scan.pump().await, Some(DecodeOutcome::Ignored));
    assert_eq!(scan.pump().await, None);

    let code = scan.confirm(&mut nav).unwrap();
    assert_eq!(code.as_str(), PAYLOAD);
    assert_eq!(nav.current_path(), "/product/3017620422003");
}
