// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel normalizer — expands 3-channel RGB samples into the 4-channel RGBA
// layout the QR decoder consumes.

use greenpass_core::{ImageSample, OPAQUE_ALPHA, PixelBuffer};

/// Insert an opaque alpha byte after every RGB triple.
///
/// The output has `width * height * 4` bytes and its RGB bytes equal the
/// input in order.
///
/// # Panics
///
/// If either dimension is zero or `samples.len() != width * height * 3`.
pub fn normalize(samples: &[u8], width: u32, height: u32) -> PixelBuffer {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let pixels = width as usize * height as usize;
    assert_eq!(samples.len(), pixels * 3, "RGB sample count mismatch");

    let mut data = Vec::with_capacity(pixels * 4);
    for rgb in samples.chunks_exact(3).take(pixels) {
        data.extend_from_slice(rgb);
        data.push(OPAQUE_ALPHA);
    }

    PixelBuffer {
        data,
        width,
        height,
    }
}

/// [`normalize`] for an extracted image.
pub fn normalize_sample(sample: &ImageSample) -> PixelBuffer {
    normalize(sample.samples(), sample.width(), sample.height())
}
