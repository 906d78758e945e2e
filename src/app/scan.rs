// SPDX-License-Identifier: GPL-3.0-only

//! Scan screen controller
//!
//! Owns the scan session and maps user intent (back, flip, torch, clear,
//! confirm) and decode events onto it. The first decode freezes as the
//! pending result; later decodes are ignored until the user clears it.

use crate::backends::camera::{BarcodeDecoder, CameraFacing, CameraFeed, DecodeEvent};
use crate::backends::permission::{CameraAuthority, PermissionGate};
use crate::navigation::{Navigator, Route};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Identifier handed from the scanner to the product screen
///
/// Only emptiness is checked; the catalog decides what is a real product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductCode(String);

impl ProductCode {
    /// `None` for an empty or whitespace-only value
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of one scan screen visit
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSessionState {
    pub facing: CameraFacing,
    pub torch_on: bool,
    /// First decode since the last clear
    pub pending_result: Option<DecodeEvent>,
}

impl ScanSessionState {
    pub fn new(facing: CameraFacing) -> Self {
        Self {
            facing,
            torch_on: false,
            pending_result: None,
        }
    }
}

/// What happened to a decode event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Became the pending result
    Recorded,
    /// A result is already pending
    Ignored,
    /// Empty payload
    Malformed,
}

/// Drives the scan screen
#[derive(Debug)]
pub struct ScanController<F> {
    session_id: Uuid,
    state: ScanSessionState,
    decoder: BarcodeDecoder<F>,
    active: bool,
}

impl<F: CameraFeed> ScanController<F> {
    pub fn new(feed: F, facing: CameraFacing) -> Self {
        let session_id = Uuid::new_v4();
        debug!(%session_id, ?facing, "Scan session created");
        Self {
            session_id,
            state: ScanSessionState::new(facing),
            decoder: BarcodeDecoder::new(feed, facing),
            active: false,
        }
    }

    /// Entry guard: leave for the entry screen unless camera access is granted
    ///
    /// Returns whether the scanner is now running.
    pub fn activate<A: CameraAuthority>(
        &mut self,
        gate: &PermissionGate<A>,
        nav: &mut impl Navigator,
    ) -> bool {
        let status = gate.current_status();
        if !status.is_granted() {
            warn!(session_id = %self.session_id, ?status, "Camera not authorized, leaving scanner");
            self.active = false;
            nav.navigate_to(&Route::Entry);
            return false;
        }
        info!(session_id = %self.session_id, "Scanner active");
        self.active = true;
        true
    }

    /// Apply a decode event; never blocks
    pub fn on_decode(&mut self, event: DecodeEvent) -> DecodeOutcome {
        if event.raw_value.trim().is_empty() {
            trace!(session_id = %self.session_id, "Ignoring empty decode");
            return DecodeOutcome::Malformed;
        }
        if self.state.pending_result.is_some() {
            return DecodeOutcome::Ignored;
        }

        info!(
            session_id = %self.session_id,
            symbology = event.symbology.display_name(),
            code = %event.raw_value,
            "Barcode captured"
        );
        self.state.pending_result = Some(event);
        DecodeOutcome::Recorded
    }

    /// Drop the pending result so the next decode is captured
    pub fn clear(&mut self) {
        if self.state.pending_result.take().is_some() {
            debug!(session_id = %self.session_id, "Pending result cleared");
        }
    }

    /// Hand the pending result to the product screen
    ///
    /// No-op returning `None` when nothing is pending. The pending result
    /// stays set; the screen is left, not reset.
    pub fn confirm(&mut self, nav: &mut impl Navigator) -> Option<ProductCode> {
        let event = self.state.pending_result.as_ref()?;
        let code = ProductCode::new(&event.raw_value)?;
        info!(session_id = %self.session_id, code = %code, "Opening product");
        nav.navigate_to(&Route::Product(code.clone()));
        Some(code)
    }

    pub fn flip(&mut self) {
        self.state.facing = self.state.facing.flipped();
        self.decoder.set_facing(self.state.facing);
    }

    pub fn toggle_torch(&mut self) {
        self.state.torch_on = !self.state.torch_on;
        self.decoder.set_torch(self.state.torch_on);
    }

    pub fn go_back(&mut self, nav: &mut impl Navigator) {
        nav.navigate_to(&Route::Entry);
    }

    /// Wait for the next decode and apply it
    ///
    /// Returns `None` when the scanner is not active or the feed has ended.
    pub async fn pump(&mut self) -> Option<DecodeOutcome> {
        if !self.active {
            return None;
        }
        let event = self.decoder.next_event().await?;
        Some(self.on_decode(event))
    }

    pub fn state(&self) -> &ScanSessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}
