// SPDX-License-Identifier: GPL-3.0-only

//! scanfeast - scan a product barcode and look up its nutrition data
//!
//! # Architecture
//!
//! - [`backends`]: camera permission and camera feeds, behind traits
//! - [`app`]: entry, scan and product screen logic
//! - [`catalog`]: remote product catalog and the lookup state machine
//! - [`navigation`]: route paths and the navigator interface
//! - [`config`]: user configuration
//!
//! A scan flows entry → scan → product: the permission gate lets the
//! scanner start, the first decoded barcode is frozen until confirmed,
//! and confirming navigates to `/product/{code}`, where the product screen
//! looks the code up.

pub mod app;
pub mod backends;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod errors;
pub mod navigation;

pub use app::{ProductCode, ProductScreen, ScanController};
pub use catalog::{HttpCatalog, LookupState, Product};
pub use config::Config;
