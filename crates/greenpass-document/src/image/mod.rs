// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — channel normalization and QR symbol decoding.

pub mod normalize;
pub mod qr;

pub use normalize::{normalize, normalize_sample};
pub use qr::{QrDecoder, RqrrDecoder};
