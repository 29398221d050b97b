// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the greenpass-document import path: first-image
// extraction from an exported pass PDF, and RGB to RGBA normalization.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use greenpass_core::ImageSample;
use greenpass_document::pdf::writer::write_image_pdf;
use greenpass_document::{PassPdfWriter, extract_first_image, normalize_sample};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Extract the QR image from a pass PDF produced by `PassPdfWriter`.
///
/// The image is FlateDecode-compressed, so this covers loading, operator
/// scanning, inflation and sample unpacking.
fn bench_extract_first_image(c: &mut Criterion) {
    let writer = PassPdfWriter::new();
    let image = writer
        .render_qr("HC1:NCFOXN%TS3DH3ZSUZK+.V0ETD%65NL-AH")
        .expect("render QR");
    let pdf = write_image_pdf(&image, None).expect("write PDF");

    c.bench_function("extract_first_image (pass PDF)", |b| {
        b.iter(|| black_box(extract_first_image(black_box(&pdf)).expect("extract")));
    });
}

/// Normalize a 1024x1024 RGB image, about the size of a scanned certificate QR.
fn bench_normalize(c: &mut Criterion) {
    let side = 1024u32;
    let samples: Vec<u8> = (0..side * side * 3).map(|i| (i % 251) as u8).collect();
    let sample = ImageSample::new(samples, side, side).expect("sample");

    c.bench_function("normalize (1024x1024)", |b| {
        b.iter(|| black_box(normalize_sample(black_box(&sample))));
    });
}

criterion_group!(benches, bench_extract_first_image, bench_normalize);
criterion_main!(benches);
