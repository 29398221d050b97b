// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures — small hand-assembled PDFs with controlled image placement.

use greenpass_core::ImageSample;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use qrcode::{Color, EcLevel, QrCode, Version};

/// Builds a document whose first page paints XObjects in a chosen order.
pub(crate) struct PageBuilder {
    doc: Document,
    xobjects: Dictionary,
    operations: Vec<Operation>,
    inherit_resources: bool,
    split_contents: bool,
    second_page: Option<String>,
}

impl PageBuilder {
    pub(crate) fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            xobjects: Dictionary::new(),
            operations: Vec::new(),
            inherit_resources: false,
            split_contents: false,
            second_page: None,
        }
    }

    /// Register an image XObject under `name` with a raw dictionary.
    pub(crate) fn add_image(&mut self, name: &str, dict: Dictionary, content: Vec<u8>) -> ObjectId {
        let id = self.doc.add_object(Stream::new(dict, content));
        self.xobjects.set(name, id);
        id
    }

    pub(crate) fn add_rgb_image(&mut self, name: &str, sample: &ImageSample) -> ObjectId {
        let id = self.add_detached_rgb_image(sample);
        self.xobjects.set(name, id);
        id
    }

    /// Add an 8-bit DeviceRGB image that no page resource names.
    pub(crate) fn add_detached_rgb_image(&mut self, sample: &ImageSample) -> ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(sample.width()),
            "Height" => i64::from(sample.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        self.doc
            .add_object(Stream::new(dict, sample.samples().to_vec()))
    }

    /// Register a form XObject whose own resources name `xobjects`.
    pub(crate) fn add_form(&mut self, name: &str, operations: Vec<Operation>, xobjects: Dictionary) {
        let content = Content { operations }.encode().expect("encode form");
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Resources" => dictionary! { "XObject" => xobjects },
        };
        let id = self.doc.add_object(Stream::new(dict, content));
        self.xobjects.set(name, id);
    }

    /// Paint `name` at 100x100 points.
    pub(crate) fn paint(&mut self, name: &str) {
        self.operations.push(Operation::new("q", vec![]));
        self.op(
            "cm",
            vec![100.into(), 0.into(), 0.into(), 100.into(), 0.into(), 0.into()],
        );
        self.op("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.operations.push(Operation::new("Q", vec![]));
    }

    pub(crate) fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    /// Put the resources on the page tree root instead of the page.
    pub(crate) fn inherit_resources(&mut self) {
        self.inherit_resources = true;
    }

    /// Store page 1's content as `/Contents N 0 R` pointing at an array of
    /// two indirect streams, splitting the queued operations between them.
    pub(crate) fn split_contents(&mut self) {
        self.split_contents = true;
    }

    /// Add a second page that paints `name`; page 1 paints whatever was queued.
    pub(crate) fn add_second_page_painting(&mut self, name: &str) {
        self.second_page = Some(name.to_string());
    }

    pub(crate) fn build(mut self) -> Vec<u8> {
        let pages_id = self.doc.new_object_id();
        let resources = dictionary! { "XObject" => self.xobjects.clone() };

        let mut kids = Vec::new();
        let operations = std::mem::take(&mut self.operations);
        let contents = if self.split_contents {
            self.add_split_contents(operations)
        } else {
            self.add_contents(operations)
        };
        let first = self.add_page(pages_id, contents, &resources);
        kids.push(Object::Reference(first));
        if let Some(name) = self.second_page.take() {
            let operations = vec![Operation::new("Do", vec![Object::Name(name.into_bytes())])];
            let contents = self.add_contents(operations);
            let second = self.add_page(pages_id, contents, &resources);
            kids.push(Object::Reference(second));
        }

        let count = kids.len() as i64;
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        };
        if self.inherit_resources {
            pages.set("Resources", resources);
        }
        self.doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).expect("save fixture");
        bytes
    }

    fn add_contents(&mut self, operations: Vec<Operation>) -> ObjectId {
        let content = Content { operations }.encode().expect("encode page");
        self.doc.add_object(Stream::new(dictionary! {}, content))
    }

    fn add_split_contents(&mut self, mut operations: Vec<Operation>) -> ObjectId {
        let tail = operations.split_off(operations.len() / 2);
        let head_id = self.add_contents(operations);
        let tail_id = self.add_contents(tail);
        self.doc.add_object(vec![
            Object::Reference(head_id),
            Object::Reference(tail_id),
        ])
    }

    fn add_page(
        &mut self,
        pages_id: ObjectId,
        content_id: ObjectId,
        resources: &Dictionary,
    ) -> ObjectId {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
        };
        if !self.inherit_resources {
            page.set("Resources", resources.clone());
        }
        self.doc.add_object(page)
    }
}

/// A `width` x `height` image filled with one colour.
pub(crate) fn solid_sample(width: u32, height: u32, rgb: [u8; 3]) -> ImageSample {
    let samples = rgb.repeat(width as usize * height as usize);
    ImageSample::new(samples, width, height).expect("solid sample")
}

/// A version 1 QR symbol for `text`, one pixel per module, no quiet zone.
pub(crate) fn qr_sample(text: &str) -> ImageSample {
    let code = QrCode::with_version(text.as_bytes(), Version::Normal(1), EcLevel::L)
        .expect("fits version 1");
    let side = code.width() as u32;
    let samples: Vec<u8> = code
        .to_colors()
        .into_iter()
        .flat_map(|color| match color {
            Color::Dark => [0u8; 3],
            Color::Light => [u8::MAX; 3],
        })
        .collect();
    ImageSample::new(samples, side, side).expect("qr sample")
}
