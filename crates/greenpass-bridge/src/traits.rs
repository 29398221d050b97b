// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// A pass enters the app either as a PDF from device storage or as a QR code
// seen by the camera. Platforms lacking one of these return
// `GreenpassError::PlatformUnavailable`.

use greenpass_core::error::Result;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: NativeCamera + NativeFilePicker + Send + Sync {
    /// Human-readable platform name (e.g. "Linux desktop", "Android 14").
    fn platform_name(&self) -> &str;
}

/// Capture images from the device camera.
pub trait NativeCamera {
    /// Ask for camera access. `Ok(false)` means the user refused.
    fn request_camera_permission(&self) -> Result<bool>;

    /// Capture one still and return it encoded (JPEG or PNG).
    /// Returns Ok(None) if the user cancelled.
    fn capture_image(&self) -> Result<Option<Vec<u8>>>;
}

/// Pick files from the device storage.
pub trait NativeFilePicker {
    /// Show a file picker filtered to the given MIME types.
    /// Returns the file path chosen, or None if cancelled.
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>>;

    /// Read the bytes of a previously picked file.
    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>>;
}
