// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// greenpass-document — Document processing for Green Pass.
//
// Provides the PDF side of pass acquisition (first-image extraction, pass
// export) and the image side (RGB to RGBA normalization, QR decoding).

pub mod image;
pub mod pdf;

// Re-export the entry points so callers can use `greenpass_document::extract_first_image` etc.
pub use image::normalize::{normalize, normalize_sample};
pub use image::qr::{QrDecoder, RqrrDecoder, decode_encoded_image};
pub use pdf::extract::extract_first_image;
pub use pdf::writer::PassPdfWriter;
