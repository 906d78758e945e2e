// SPDX-License-Identifier: GPL-3.0-only

//! Entry screen: ask for camera access and open the scanner

use crate::backends::permission::{CameraAuthority, PermissionGate, PermissionStatus};
use crate::errors::PermissionError;
use crate::navigation::{Navigator, Route};
use tracing::{info, warn};

/// Label of the main button for a permission state
pub fn scan_button_label(status: PermissionStatus) -> &'static str {
    if status.is_granted() {
        "Start Scanning"
    } else {
        "Allow Camera Access"
    }
}

/// The scan button
///
/// Opens the scanner when access is (or becomes) granted. A denial is
/// returned so the caller can show it; it is never retried here.
pub async fn handle_scan_press<A: CameraAuthority>(
    gate: &mut PermissionGate<A>,
    nav: &mut impl Navigator,
) -> Result<(), PermissionError> {
    let status = match gate.current_status() {
        PermissionStatus::Granted => PermissionStatus::Granted,
        _ => gate.request_access().await,
    };

    if status.is_granted() {
        info!("Opening scanner");
        nav.navigate_to(&Route::Scan);
        Ok(())
    } else {
        warn!(?status, "Camera access not granted");
        Err(PermissionError::Denied)
    }
}
