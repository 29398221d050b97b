// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// First-image extraction — walks page 1's content-stream operators in
// document order and returns the samples of the first painted image XObject,
// using the `lopdf` crate for object graph and content parsing.

use greenpass_core::ExtractionError;
use greenpass_core::ImageSample;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument};

use super::samples::decode_image;

/// Operator that paints a named XObject (`/Name Do`).
const PAINT_XOBJECT: &str = "Do";

/// Form XObjects nested deeper than this are not entered.
const MAX_FORM_DEPTH: usize = 8;

/// Upper bound on `/Parent` hops when resolving inherited page resources.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Upper bound on consecutive indirect references inside `/Contents`.
const MAX_REFERENCE_HOPS: usize = 8;

/// Extract the first raster image painted on the first page of `document`.
///
/// Later image paints on the page, and every other page, are ignored.
#[instrument(skip_all, fields(bytes_len = document.len()))]
pub fn extract_first_image(document: &[u8]) -> Result<ImageSample, ExtractionError> {
    let doc = Document::load_mem(document)
        .map_err(|err| malformed(format!("failed to load PDF: {err}")))?;

    let page_id = first_page(&doc)?;
    let page = doc
        .get_dictionary(page_id)
        .map_err(|err| malformed(format!("cannot read page object {page_id:?}: {err}")))?;

    let operations = page_operations(&doc, page)?;
    let resources = page_resources(&doc, page_id);
    debug!(
        operations = operations.len(),
        has_resources = resources.is_some(),
        "page content decoded"
    );

    let image = find_first_image(&doc, &operations, resources, 0)?
        .ok_or(ExtractionError::NoImageFound)?;

    let sample = decode_image(&doc, image)?;
    info!(
        width = sample.width(),
        height = sample.height(),
        "first page image extracted"
    );
    Ok(sample)
}

/// Object ID of page 1.
fn first_page(doc: &Document) -> Result<ObjectId, ExtractionError> {
    // lopdf pages are keyed by 1-indexed page number.
    doc.get_pages()
        .get(&1)
        .copied()
        .ok_or_else(|| malformed("document has no pages".to_string()))
}

/// Scan `operations` in order and return the first image XObject painted.
///
/// A `Do` naming a form XObject is entered in place, with the form's own
/// resources when it declares them.
fn find_first_image<'a>(
    doc: &'a Document,
    operations: &[Operation],
    resources: Option<&'a Dictionary>,
    depth: usize,
) -> Result<Option<&'a Stream>, ExtractionError> {
    let mut index = 0;
    while index < operations.len() {
        let operation = &operations[index];
        index += 1;

        if operation.operator != PAINT_XOBJECT {
            continue;
        }

        let name = match operation.operands.first() {
            Some(Object::Name(name)) => name.as_slice(),
            _ => return Err(ExtractionError::NoImageFound),
        };
        let xobject =
            resolve_xobject(doc, resources, name).ok_or(ExtractionError::NoImageFound)?;

        match subtype(xobject) {
            Some(b"Image") => {
                debug!(
                    name = %String::from_utf8_lossy(name),
                    operation = index - 1,
                    depth,
                    "paint image operation found"
                );
                return Ok(Some(xobject));
            }
            Some(b"Form") if depth < MAX_FORM_DEPTH => {
                let form_operations = decode_operations(&stream_bytes(xobject)?)?;
                let form_resources = xobject
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| resolve(doc, obj))
                    .and_then(|obj| obj.as_dict().ok())
                    .or(resources);
                if let Some(image) =
                    find_first_image(doc, &form_operations, form_resources, depth + 1)?
                {
                    return Ok(Some(image));
                }
            }
            _ => {}
        }
    }
    Ok(None)
}

/// Decode the page's content streams into one operator list.
fn page_operations(doc: &Document, page: &Dictionary) -> Result<Vec<Operation>, ExtractionError> {
    let mut content = Vec::new();
    if let Ok(contents) = page.get(b"Contents") {
        collect_content(doc, contents, &mut content, false, 0)?;
    }
    decode_operations(&content)
}

/// Append the bytes of a `/Contents` entry, which may be a stream, a
/// reference to one, or an array of either.
///
/// Arrays may not nest. Reference chains are bounded to rule out cycles.
fn collect_content(
    doc: &Document,
    object: &Object,
    out: &mut Vec<u8>,
    in_array: bool,
    hops: usize,
) -> Result<(), ExtractionError> {
    match object {
        Object::Reference(id) => {
            if hops >= MAX_REFERENCE_HOPS {
                return Err(malformed("/Contents reference chain too long".to_string()));
            }
            let resolved = doc
                .get_object(*id)
                .map_err(|err| malformed(format!("failed to resolve /Contents: {err}")))?;
            collect_content(doc, resolved, out, in_array, hops + 1)
        }
        Object::Array(_) if in_array => Err(malformed("/Contents arrays nest".to_string())),
        Object::Array(parts) => {
            for part in parts {
                collect_content(doc, part, out, true, 0)?;
            }
            Ok(())
        }
        Object::Stream(stream) => {
            if !out.is_empty() {
                out.push(b'\n');
            }
            out.extend_from_slice(&stream_bytes(stream)?);
            Ok(())
        }
        Object::Null => Ok(()),
        _ => Err(malformed(
            "/Contents is not a stream, reference or array".to_string(),
        )),
    }
}

fn decode_operations(content: &[u8]) -> Result<Vec<Operation>, ExtractionError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Content::decode(content)
        .map(|content| content.operations)
        .map_err(|err| malformed(format!("cannot decode content stream: {err}")))
}

/// Stream payload with its filters removed.
pub(super) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, ExtractionError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|err| malformed(format!("failed to decompress stream: {err}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Resources dictionary of a page, inherited through `/Parent` if needed.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok();
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let current = node?;
        let resources = current
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());
        if resources.is_some() {
            return resources;
        }
        node = match current.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => doc.get_dictionary(*parent_id).ok(),
            _ => None,
        };
    }
    None
}

/// Look up `/XObject /<name>` in `resources` and return its stream.
fn resolve_xobject<'a>(
    doc: &'a Document,
    resources: Option<&'a Dictionary>,
    name: &[u8],
) -> Option<&'a Stream> {
    let xobjects = resolve(doc, resources?.get(b"XObject").ok()?)?
        .as_dict()
        .ok()?;
    resolve(doc, xobjects.get(name).ok()?)?.as_stream().ok()
}

fn subtype(stream: &Stream) -> Option<&[u8]> {
    match stream.dict.get(b"Subtype") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

/// Follow a single indirect reference.
pub(super) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(super) fn malformed(detail: String) -> ExtractionError {
    ExtractionError::MalformedDocument(detail)
}
