// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// greenpass-bridge — Native platform bridge abstractions.
//
// Defines the document source and camera traits and picks the implementation
// for the target operating system.

use greenpass_core::error::{GreenpassError, Result};
use tracing::{debug, info};

pub mod stub;
pub mod traits;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod desktop;

pub use traits::{NativeCamera, NativeFilePicker, PlatformBridge};

/// MIME types offered by the document picker.
pub const PDF_MIME_TYPES: &[&str] = &["application/pdf"];

/// Bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Box::new(desktop::DesktopBridge::new())
    }
    #[cfg(any(target_os = "ios", target_os = "android"))]
    {
        // No native picker or camera binding yet on mobile targets.
        Box::new(stub::StubBridge)
    }
}

/// Let the user choose a PDF and return its bytes.
///
/// `Ok(None)` means the user dismissed the picker.
pub fn pick_document<B: NativeFilePicker + ?Sized>(bridge: &B) -> Result<Option<Vec<u8>>> {
    let Some(path) = bridge.pick_file(PDF_MIME_TYPES)? else {
        debug!("document picker dismissed");
        return Ok(None);
    };
    let bytes = bridge.read_picked_file(&path)?;
    info!(bytes = bytes.len(), "document picked");
    Ok(Some(bytes))
}

/// Capture one still from the camera, if the user grants permission.
pub fn capture_frame<B: NativeCamera + ?Sized>(bridge: &B) -> Result<Option<Vec<u8>>> {
    if !bridge.request_camera_permission()? {
        return Err(GreenpassError::Bridge("camera permission denied".into()));
    }
    bridge.capture_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted picker and camera.
    struct FakeBridge {
        picked: Option<String>,
        files: Vec<(String, Vec<u8>)>,
        permission: bool,
        reads: Mutex<Vec<String>>,
    }

    impl NativeFilePicker for FakeBridge {
        fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
            assert_eq!(mime_types, PDF_MIME_TYPES);
            Ok(self.picked.clone())
        }

        fn read_picked_file(&self, path: &str) -> Result<Vec<u8>> {
            self.reads.lock().expect("lock").push(path.to_string());
            self.files
                .iter()
                .find(|(name, _)| name == path)
                .map(|(_, bytes)| bytes.clone())
                .ok_or_else(|| {
                    GreenpassError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
                })
        }
    }

    impl NativeCamera for FakeBridge {
        fn request_camera_permission(&self) -> Result<bool> {
            Ok(self.permission)
        }

        fn capture_image(&self) -> Result<Option<Vec<u8>>> {
            Ok(Some(vec![0x89, b'P', b'N', b'G']))
        }
    }

    fn bridge(picked: Option<&str>) -> FakeBridge {
        FakeBridge {
            picked: picked.map(str::to_string),
            files: vec![("pass.pdf".to_string(), b"%PDF-1.5".to_vec())],
            permission: true,
            reads: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn pick_document_reads_chosen_file() {
        let fake = bridge(Some("pass.pdf"));
        let bytes = pick_document(&fake).expect("pick");
        assert_eq!(bytes.as_deref(), Some(&b"%PDF-1.5"[..]));
        assert_eq!(*fake.reads.lock().expect("lock"), vec!["pass.pdf".to_string()]);
    }

    #[test]
    fn dismissed_picker_reads_nothing() {
        let fake = bridge(None);
        assert_eq!(pick_document(&fake).expect("pick"), None);
        assert!(fake.reads.lock().expect("lock").is_empty());
    }

    #[test]
    fn unreadable_file_propagates_error() {
        let fake = bridge(Some("elsewhere.pdf"));
        assert!(matches!(pick_document(&fake), Err(GreenpassError::Io(_))));
    }

    #[test]
    fn capture_requires_permission() {
        let mut fake = bridge(None);
        assert!(capture_frame(&fake).expect("capture").is_some());

        fake.permission = false;
        assert!(matches!(capture_frame(&fake), Err(GreenpassError::Bridge(_))));
    }

    #[test]
    fn stub_bridge_is_unavailable() {
        let stub = stub::StubBridge;
        assert!(matches!(
            pick_document(&stub),
            Err(GreenpassError::PlatformUnavailable)
        ));
        assert!(!stub.request_camera_permission().expect("permission"));
    }
}
