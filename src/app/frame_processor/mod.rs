// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis
//!
//! Finds and decodes QR symbols in raw camera frames. Used by feeds that
//! deliver pixels rather than already-decoded symbols.

pub mod tasks;
pub mod types;

pub use tasks::QrDetector;
pub use types::{FrameRegion, QrDetection};
