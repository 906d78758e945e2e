// SPDX-License-Identifier: GPL-3.0-only

//! Screen logic
//!
//! - [`entry`]: permission request and the way into the scanner
//! - [`scan`]: scan session, decode de-duplication, handoff to the product screen
//! - [`product`]: lookup state and section flags of the product screen
//! - [`display`]: derived display values
//! - [`frame_processor`]: QR detection on raw frames

pub mod display;
pub mod entry;
pub mod frame_processor;
pub mod product;
pub mod scan;

pub use product::{ProductScreen, ProductView, Section, SectionExpansion};
pub use scan::{DecodeOutcome, ProductCode, ScanController, ScanSessionState};
