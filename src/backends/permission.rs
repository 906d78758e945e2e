// SPDX-License-Identifier: GPL-3.0-only

//! Camera access permission
//!
//! [`PermissionGate`] caches the authorization state and runs the request
//! protocol. The platform side (system prompt, stored decision) is a
//! [`CameraAuthority`] injected by the caller.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

/// Camera authorization state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// The user has not been asked yet
    #[default]
    Undetermined,
    Granted,
    /// Terminal until the user changes it outside the app
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Platform access to the camera permission
pub trait CameraAuthority {
    /// Current system decision, without prompting
    fn status(&self) -> PermissionStatus;

    /// Show the system prompt and wait for the answer
    fn prompt(&mut self) -> impl Future<Output = PermissionStatus> + Send;
}

/// Owner of the camera permission state
#[derive(Debug)]
pub struct PermissionGate<A> {
    authority: A,
    status: PermissionStatus,
}

impl<A: CameraAuthority> PermissionGate<A> {
    pub fn new(authority: A) -> Self {
        let status = authority.status();
        debug!(?status, "Permission gate created");
        Self { authority, status }
    }

    /// Cached status; call [`refresh`](Self::refresh) to pick up external changes
    pub fn current_status(&self) -> PermissionStatus {
        self.status
    }

    /// Re-read the system decision (e.g. when a screen regains focus)
    pub fn refresh(&mut self) -> PermissionStatus {
        let status = self.authority.status();
        if status != self.status {
            info!(from = ?self.status, to = ?status, "Camera permission changed outside the app");
            self.status = status;
        }
        status
    }

    /// Ask for camera access
    ///
    /// Already granted returns immediately. Undetermined prompts exactly
    /// once. Denied is not re-prompted; only the system state is re-read.
    pub async fn request_access(&mut self) -> PermissionStatus {
        match self.refresh() {
            PermissionStatus::Granted => PermissionStatus::Granted,
            PermissionStatus::Denied => {
                debug!("Camera permission previously denied, not prompting");
                PermissionStatus::Denied
            }
            PermissionStatus::Undetermined => {
                info!("Requesting camera permission");
                let status = self.authority.prompt().await;
                if status == PermissionStatus::Undetermined {
                    warn!("Permission prompt dismissed without an answer");
                }
                self.status = status;
                status
            }
        }
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }
}

/// Authority with a preset answer, for unattended runs
#[derive(Debug, Clone)]
pub struct FixedAuthority {
    status: PermissionStatus,
    answer: PermissionStatus,
}

impl FixedAuthority {
    /// Starts undetermined and answers the prompt with `answer`
    pub fn answering(answer: PermissionStatus) -> Self {
        Self {
            status: PermissionStatus::Undetermined,
            answer,
        }
    }
}

impl CameraAuthority for FixedAuthority {
    fn status(&self) -> PermissionStatus {
        self.status
    }

    fn prompt(&mut self) -> impl Future<Output = PermissionStatus> + Send {
        self.status = self.answer;
        std::future::ready(self.status)
    }
}

/// Authority that asks on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalAuthority {
    decision: PermissionStatus,
}

impl CameraAuthority for TerminalAuthority {
    fn status(&self) -> PermissionStatus {
        self.decision
    }

    fn prompt(&mut self) -> impl Future<Output = PermissionStatus> + Send {
        async move {
            let granted = tokio::task::spawn_blocking(ask_on_terminal)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Permission prompt task failed");
                    None
                });
            self.decision = match granted {
                Some(true) => PermissionStatus::Granted,
                Some(false) => PermissionStatus::Denied,
                None => PermissionStatus::Undetermined,
            };
            self.decision
        }
    }
}

/// `None` when stdin is closed
fn ask_on_terminal() -> Option<bool> {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "Allow scanfeast to use the camera? [y/N] ");
    let _ = stderr.flush();

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")),
    }
}
