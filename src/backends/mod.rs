// SPDX-License-Identifier: GPL-3.0-only

//! Device capabilities: camera access permission and camera feeds
//!
//! Both are traits so screens can be driven without a real device.

pub mod camera;
pub mod permission;
