// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — locating and decoding the first painted image, and writing
// single-image pass documents.

pub mod extract;
mod samples;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extract::extract_first_image;
pub use writer::PassPdfWriter;
