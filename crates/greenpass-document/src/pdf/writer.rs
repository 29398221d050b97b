// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — export a held pass as a single-page PDF whose first painted
// image is the pass QR code, so the export can be imported again.
//
// Documents are assembled directly with `lopdf` so the image XObject carries
// exactly the dictionary we need (DeviceRGB, 8 bits, FlateDecode).

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use greenpass_core::error::GreenpassError;
use greenpass_core::{ImageSample, ValidatedPayload};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use qrcode::{Color, EcLevel, QrCode};
use tracing::{debug, info, instrument};

/// A4 page size in PDF points.
const PAGE_WIDTH_PT: f32 = 595.0;
const PAGE_HEIGHT_PT: f32 = 842.0;

/// Edge length of the painted QR code on the page, in points.
const QR_EDGE_PT: f32 = 340.0;

/// Renders pass payloads as QR images and wraps them in PDF documents.
pub struct PassPdfWriter {
    /// Pixels per QR module in the embedded image.
    module_size: u32,
    /// Blank modules around the symbol.
    quiet_zone_modules: u32,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl Default for PassPdfWriter {
    fn default() -> Self {
        Self {
            module_size: 8,
            quiet_zone_modules: 4,
            title: None,
        }
    }
}

impl PassPdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of pixels per QR module (minimum 1).
    pub fn set_module_size(&mut self, module_size: u32) {
        self.module_size = module_size.max(1);
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    // -- QR rendering ---------------------------------------------------------

    /// Render `text` as an RGB QR code image.
    pub fn render_qr(&self, text: &str) -> Result<ImageSample, GreenpassError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
            .map_err(|err| GreenpassError::ImageError(format!("cannot encode QR code: {}", err)))?;
        let modules = code.width() as u32;
        let colors = code.to_colors();

        let scale = self.module_size;
        let side = (modules + self.quiet_zone_modules * 2) * scale;
        let mut samples = vec![u8::MAX; side as usize * side as usize * 3];

        for (index, color) in colors.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let mx = index as u32 % modules + self.quiet_zone_modules;
            let my = index as u32 / modules + self.quiet_zone_modules;
            for y in my * scale..(my + 1) * scale {
                let row = (y * side) as usize * 3;
                let start = row + (mx * scale) as usize * 3;
                let end = start + scale as usize * 3;
                samples[start..end].fill(0);
            }
        }

        debug!(modules, side, "QR code rendered");
        ImageSample::new(samples, side, side)
            .ok_or_else(|| GreenpassError::ImageError("rendered QR code is empty".into()))
    }

    // -- Pass to PDF ----------------------------------------------------------

    /// Create a PDF containing the pass payload's QR code.
    #[instrument(skip_all, fields(source = ?payload.source))]
    pub fn create_from_payload(&self, payload: &ValidatedPayload) -> Result<Vec<u8>, GreenpassError> {
        let image = self.render_qr(payload.as_str())?;
        let bytes = write_image_pdf(&image, self.title.as_deref())?;
        info!(bytes = bytes.len(), "pass PDF created");
        Ok(bytes)
    }

    /// Create the pass PDF and write it to `path`.
    pub fn write_pass_to_file(
        &self,
        payload: &ValidatedPayload,
        path: &Path,
    ) -> Result<(), GreenpassError> {
        let bytes = self.create_from_payload(payload)?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), "pass PDF written");
        Ok(())
    }
}

/// Build a one-page A4 PDF that paints `image` centred on the page.
pub fn write_image_pdf(image: &ImageSample, title: Option<&str>) -> Result<Vec<u8>, GreenpassError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image.samples())?;
    let compressed = encoder.finish()?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(image.width())),
            "Height" => Object::Integer(i64::from(image.height())),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "FlateDecode",
        },
        compressed,
    ));

    let x = (PAGE_WIDTH_PT - QR_EDGE_PT) / 2.0;
    let y = (PAGE_HEIGHT_PT - QR_EDGE_PT) / 2.0;
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(QR_EDGE_PT),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(QR_EDGE_PT),
                    Object::Real(x),
                    Object::Real(y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Pass".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|err| GreenpassError::ImageError(format!("cannot encode page content: {}", err)))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH_PT),
            Object::Real(PAGE_HEIGHT_PT),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Pass" => image_id },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title.unwrap_or("Green Pass")),
        "Producer" => Object::string_literal("greenpass"),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| GreenpassError::ImageError(format!("cannot serialise PDF: {}", err)))?;
    Ok(bytes)
}
