// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scan-to-lookup pipeline
//!
//! None of these are fatal. Every error leaves the screen it came from in a
//! state the user can retry from or navigate away from.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Camera permission errors
    Permission(PermissionError),
    /// Catalog lookup errors
    Lookup(LookupError),
    /// Camera feed and frame decoding errors
    Camera(CameraError),
    /// A screen was entered without the route data it needs
    Navigation(String),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera permission errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    /// The user (or the system, from a cached decision) refused camera access
    Denied,
}

/// Catalog lookup errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The catalog answered, but has no product for the code
    NotFound,
    /// Network failure, unreadable body, or a payload that is not JSON
    Transport(String),
}

/// Camera feed errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No frames could be produced from the source
    Unavailable(String),
    /// A frame could not be loaded or converted
    FrameLoad(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Lookup(e) => write!(f, "Lookup error: {}", e),
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Navigation(msg) => write!(f, "Navigation error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::Denied => {
                write!(f, "Camera permission is required to use the scanner")
            }
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "Product not found"),
            LookupError::Transport(msg) => write!(f, "Failed to fetch product data: {}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Unavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            CameraError::FrameLoad(msg) => write!(f, "Failed to load frame: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PermissionError {}
impl std::error::Error for LookupError {}
impl std::error::Error for CameraError {}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        AppError::Lookup(err)
    }
}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

// Any failure on the way to a parsed payload is a transport failure;
// only a well-formed "status != 1" answer means not-found.
impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Transport(err.to_string())
    }
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::FrameLoad(err.to_string())
    }
}
