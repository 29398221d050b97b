// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Green Pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload;

/// Fully opaque alpha value written by the pixel normalizer.
pub const OPAQUE_ALPHA: u8 = u8::MAX;

/// States of the acquisition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMode {
    /// No result held; the import chooser is shown.
    Idle,
    /// The camera is active and every frame is offered to the validator.
    CameraScanning,
    /// A validated payload is held and rendered.
    ResultDisplayed,
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::CameraScanning => "scanning",
            Self::ResultDisplayed => "displaying a pass",
        };
        f.write_str(label)
    }
}

/// Where a validated payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadSource {
    /// Decoded from a live camera frame.
    Camera,
    /// Extracted from an imported PDF document.
    Document,
    /// Loaded from the persistent store on startup.
    Restored,
}

/// Raw RGB pixel samples of an extracted image.
///
/// One byte per channel, row-major, no alpha. The constructor guarantees
/// `width * height * 3 == samples.len()` with both dimensions positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    samples: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageSample {
    /// Wrap RGB samples, returning `None` when the geometry is inconsistent.
    pub fn new(samples: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(3)?;
        if samples.len() != expected {
            return None;
        }
        Some(Self {
            samples,
            width,
            height,
        })
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }
}

/// RGBA pixel buffer handed to the QR decoder.
///
/// `data.len() == width * height * 4` and every alpha byte is
/// [`OPAQUE_ALPHA`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelBuffer {
    /// Number of pixels in the buffer.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A certificate payload that passed the format check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedPayload {
    content: String,
    pub source: PayloadSource,
    pub acquired_at: DateTime<Utc>,
}

impl ValidatedPayload {
    /// Accept `candidate` if it passes [`payload::validate`].
    pub fn accept(candidate: &str, source: PayloadSource) -> Option<Self> {
        if !payload::validate(candidate) {
            return None;
        }
        Some(Self {
            content: candidate.to_owned(),
            source,
            acquired_at: Utc::now(),
        })
    }

    /// The payload text, exactly as decoded.
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for ValidatedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

/// Sizing of the rendered QR code on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrLayout {
    /// Preferred edge length in pixels (the imported image height, or the
    /// configured default).
    pub dimension: u32,
    /// Blank margin around the code, in pixels.
    pub quiet_zone: u32,
}

impl QrLayout {
    /// Edge length that fits a window of the given size, leaving 8px of
    /// horizontal and 16px of vertical breathing room.
    pub fn render_size(&self, window_width: u32, window_height: u32) -> u32 {
        self.dimension
            .min(window_width.saturating_sub(8))
            .min(window_height.saturating_sub(16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_sample_rejects_inconsistent_geometry() {
        assert!(ImageSample::new(vec![0; 12], 2, 2).is_some());
        assert!(ImageSample::new(vec![0; 11], 2, 2).is_none());
        assert!(ImageSample::new(Vec::new(), 0, 0).is_none());
        assert!(ImageSample::new(vec![0; 3], 1, 0).is_none());
    }

    #[test]
    fn accept_applies_prefix_check() {
        let accepted = ValidatedPayload::accept("HC1:ABC", PayloadSource::Camera)
            .expect("valid payload");
        assert_eq!(accepted.as_str(), "HC1:ABC");
        assert_eq!(accepted.source, PayloadSource::Camera);

        assert!(ValidatedPayload::accept("NOTAVALIDCODE", PayloadSource::Camera).is_none());
    }

    #[test]
    fn render_size_is_bounded_by_window() {
        let layout = QrLayout {
            dimension: 404,
            quiet_zone: 8,
        };
        assert_eq!(layout.render_size(1920, 1080), 404);
        assert_eq!(layout.render_size(300, 1080), 292);
        assert_eq!(layout.render_size(1920, 200), 184);
        assert_eq!(layout.render_size(4, 4), 0);
    }
}
