// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge — native file dialogs via `rfd`. Desktops have no camera
// contract we rely on, so "capturing" means choosing a photo of the QR code.

use std::path::Path;

use greenpass_core::error::Result;
use tracing::{debug, info};

use crate::traits::*;

/// Image extensions accepted as camera stills.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

/// Bridge backed by the host's file dialogs.
#[derive(Debug, Default)]
pub struct DesktopBridge;

impl DesktopBridge {
    pub fn new() -> Self {
        Self
    }
}

/// File-dialog extensions for a MIME type.
fn extensions_for(mime_type: &str) -> &'static [&'static str] {
    match mime_type {
        "application/pdf" => &["pdf"],
        "image/png" => &["png"],
        "image/jpeg" => &["jpg", "jpeg"],
        _ if mime_type.starts_with("image/") => IMAGE_EXTENSIONS,
        _ => &[],
    }
}

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        std::env::consts::OS
    }
}

impl NativeCamera for DesktopBridge {
    fn request_camera_permission(&self) -> Result<bool> {
        Ok(true)
    }

    fn capture_image(&self) -> Result<Option<Vec<u8>>> {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Choose a photo of the QR code")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            debug!("image dialog dismissed");
            return Ok(None);
        };
        let bytes = std::fs::read(&path)?;
        info!(path = %path.display(), bytes = bytes.len(), "image loaded for scanning");
        Ok(Some(bytes))
    }
}

impl NativeFilePicker for DesktopBridge {
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
        let mut dialog = rfd::FileDialog::new();
        for mime_type in mime_types {
            let extensions = extensions_for(mime_type);
            if !extensions.is_empty() {
                dialog = dialog.add_filter(*mime_type, extensions);
            }
        }
        Ok(dialog
            .pick_file()
            .map(|path| path.to_string_lossy().into_owned()))
    }

    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(Path::new(path))?)
    }
}
