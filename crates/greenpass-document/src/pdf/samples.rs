// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image XObject decoding — turns an image stream's samples into 8-bit RGB,
// whatever its filter, colour space and bit depth.

use std::io::Read;

use flate2::read::ZlibDecoder;
use greenpass_core::{ExtractionError, ImageSample};
use image::ImageFormat;
use lopdf::{Document, Object, Stream};
use tracing::debug;

use super::extract::{malformed, resolve, stream_bytes};

/// Images with more pixels than this are refused before decoding.
const MAX_IMAGE_PIXELS: u64 = 64 * 1024 * 1024;

/// Colour spaces an image may be painted in.
#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed {
        base: Box<ColorSpace>,
        hival: usize,
        lookup: Vec<u8>,
    },
}

impl ColorSpace {
    fn components(&self) -> usize {
        match self {
            Self::Gray | Self::Indexed { .. } => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }
}

/// Decode an image XObject into RGB samples.
pub(super) fn decode_image(doc: &Document, image: &Stream) -> Result<ImageSample, ExtractionError> {
    let filters = filter_names(doc, image);
    if let Some(codec) = filters
        .iter()
        .find(|name| matches!(name.as_str(), "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode"))
    {
        return Err(ExtractionError::UnsupportedImage(format!(
            "{codec} images are not supported"
        )));
    }

    match filters.iter().position(|name| name == "DCTDecode") {
        Some(0) if filters.len() == 1 => return decode_jpeg(&image.content),
        Some(_) => {
            return Err(ExtractionError::UnsupportedImage(
                "DCTDecode must be the only filter".to_string(),
            ));
        }
        None => {}
    }

    let width = dimension(doc, image, b"Width")?;
    let height = dimension(doc, image, b"Height")?;
    if u64::from(width) * u64::from(height) > MAX_IMAGE_PIXELS {
        return Err(ExtractionError::UnsupportedImage(format!(
            "{width}x{height} image exceeds the pixel limit"
        )));
    }

    let is_mask = matches!(image.dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    let (color_space, bits) = if is_mask {
        (ColorSpace::Gray, 1)
    } else {
        let color_space = match image.dict.get(b"ColorSpace") {
            Ok(object) => parse_color_space(doc, object, 0)?,
            Err(_) => return Err(malformed("image has no /ColorSpace".to_string())),
        };
        let bits = integer(doc, image.dict.get(b"BitsPerComponent").ok()).unwrap_or(8);
        (color_space, bits)
    };
    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return Err(ExtractionError::UnsupportedImage(format!(
            "{bits} bits per component"
        )));
    }
    let bits = bits as u32;

    let needed = sample_len(width, height, color_space.components(), bits);
    let data = sample_bytes(image, &filters, needed)?;
    let decode = decode_ranges(doc, image, &color_space, bits);
    debug!(
        width,
        height,
        bits,
        components = color_space.components(),
        filters = ?filters,
        "decoding image samples"
    );

    let rgb = unpack_rgb(&data, width, height, bits, &color_space, decode.as_deref())?;
    ImageSample::new(rgb, width, height)
        .ok_or_else(|| malformed("decoded samples do not match image size".to_string()))
}

/// Bytes of packed samples for an image of the given shape.
fn sample_len(width: u32, height: u32, components: usize, bits: u32) -> usize {
    let row_bits = width as usize * components * bits as usize;
    row_bits.div_ceil(8) * height as usize
}

/// Unfiltered sample data. A lone FlateDecode without predictor is inflated
/// here and stops after `needed` bytes; other chains go through lopdf.
fn sample_bytes(image: &Stream, filters: &[String], needed: usize) -> Result<Vec<u8>, ExtractionError> {
    let plain_flate = matches!(filters, [only] if only == "FlateDecode")
        && image.dict.get(b"DecodeParms").is_err();
    if !plain_flate {
        return stream_bytes(image);
    }

    let mut data = Vec::with_capacity(needed);
    ZlibDecoder::new(image.content.as_slice())
        .take(needed as u64)
        .read_to_end(&mut data)
        .map_err(|err| malformed(format!("failed to inflate image samples: {err}")))?;
    Ok(data)
}

/// DCT-encoded streams are JPEG files; their own header gives the size.
fn decode_jpeg(bytes: &[u8]) -> Result<ImageSample, ExtractionError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|err| malformed(format!("cannot decode JPEG image: {err}")))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    if u64::from(width) * u64::from(height) > MAX_IMAGE_PIXELS {
        return Err(ExtractionError::UnsupportedImage(format!(
            "{width}x{height} image exceeds the pixel limit"
        )));
    }
    ImageSample::new(rgb.into_raw(), width, height)
        .ok_or_else(|| malformed("JPEG image is empty".to_string()))
}

fn filter_names(doc: &Document, image: &Stream) -> Vec<String> {
    let Some(filter) = image.dict.get(b"Filter").ok().and_then(|obj| resolve(doc, obj)) else {
        return Vec::new();
    };
    let name = |obj: &Object| match resolve(doc, obj) {
        Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    };
    match filter {
        Object::Array(items) => items.iter().filter_map(name).collect(),
        other => name(other).into_iter().collect(),
    }
}

fn dimension(doc: &Document, image: &Stream, key: &[u8]) -> Result<u32, ExtractionError> {
    let value = integer(doc, image.dict.get(key).ok()).ok_or_else(|| {
        malformed(format!(
            "image has no /{}",
            String::from_utf8_lossy(key)
        ))
    })?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| malformed(format!("invalid image dimension {value}")))
}

fn integer(doc: &Document, object: Option<&Object>) -> Option<i64> {
    match resolve(doc, object?)? {
        Object::Integer(value) => Some(*value),
        Object::Real(value) => Some(*value as i64),
        _ => None,
    }
}

fn number(doc: &Document, object: &Object) -> Option<f32> {
    match resolve(doc, object)? {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn parse_color_space(
    doc: &Document,
    object: &Object,
    depth: usize,
) -> Result<ColorSpace, ExtractionError> {
    if depth > 4 {
        return Err(malformed("colour space nests too deeply".to_string()));
    }
    let object = resolve(doc, object)
        .ok_or_else(|| malformed("unresolvable /ColorSpace".to_string()))?;

    match object {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorSpace::Gray),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorSpace::Rgb),
            b"DeviceCMYK" | b"CMYK" => Ok(ColorSpace::Cmyk),
            other => Err(ExtractionError::UnsupportedImage(format!(
                "colour space {}",
                String::from_utf8_lossy(other)
            ))),
        },
        Object::Array(items) => {
            let family = match items.first().and_then(|obj| resolve(doc, obj)) {
                Some(Object::Name(name)) => name.as_slice(),
                _ => return Err(malformed("colour space array has no family".to_string())),
            };
            match family {
                b"CalGray" => Ok(ColorSpace::Gray),
                b"CalRGB" => Ok(ColorSpace::Rgb),
                b"ICCBased" => {
                    let profile = items
                        .get(1)
                        .and_then(|obj| resolve(doc, obj))
                        .and_then(|obj| obj.as_stream().ok())
                        .ok_or_else(|| malformed("ICCBased without profile stream".to_string()))?;
                    match integer(doc, profile.dict.get(b"N").ok()) {
                        Some(1) => Ok(ColorSpace::Gray),
                        Some(3) => Ok(ColorSpace::Rgb),
                        Some(4) => Ok(ColorSpace::Cmyk),
                        n => Err(ExtractionError::UnsupportedImage(format!(
                            "ICC profile with {n:?} components"
                        ))),
                    }
                }
                b"Indexed" | b"I" => parse_indexed(doc, items, depth),
                other => Err(ExtractionError::UnsupportedImage(format!(
                    "colour space {}",
                    String::from_utf8_lossy(other)
                ))),
            }
        }
        _ => Err(malformed("/ColorSpace is neither name nor array".to_string())),
    }
}

fn parse_indexed(
    doc: &Document,
    items: &[Object],
    depth: usize,
) -> Result<ColorSpace, ExtractionError> {
    let [_, base, hival, lookup] = items else {
        return Err(malformed("Indexed colour space needs four entries".to_string()));
    };
    let base = parse_color_space(doc, base, depth + 1)?;
    if matches!(base, ColorSpace::Indexed { .. }) {
        return Err(malformed("Indexed base cannot be Indexed".to_string()));
    }
    let hival = integer(doc, Some(hival))
        .and_then(|v| usize::try_from(v).ok())
        .filter(|v| *v <= 255)
        .ok_or_else(|| malformed("Indexed hival out of range".to_string()))?;
    let lookup = match resolve(doc, lookup) {
        Some(Object::String(bytes, _)) => bytes.clone(),
        Some(Object::Stream(stream)) => stream_bytes(stream)?,
        _ => return Err(malformed("Indexed lookup is not a string or stream".to_string())),
    };
    if lookup.len() < (hival + 1) * base.components() {
        return Err(malformed("Indexed lookup table is truncated".to_string()));
    }
    Ok(ColorSpace::Indexed {
        base: Box::new(base),
        hival,
        lookup,
    })
}

/// Per-component `(min, max)` from `/Decode`, or `None` for the default.
fn decode_ranges(
    doc: &Document,
    image: &Stream,
    color_space: &ColorSpace,
    bits: u32,
) -> Option<Vec<(f32, f32)>> {
    let items = match image.dict.get(b"Decode").ok().and_then(|obj| resolve(doc, obj)) {
        Some(Object::Array(items)) => items,
        _ => return None,
    };
    let values: Vec<f32> = items.iter().filter_map(|obj| number(doc, obj)).collect();
    let components = color_space.components();
    if values.len() < components * 2 {
        return None;
    }
    let ranges: Vec<(f32, f32)> = values
        .chunks_exact(2)
        .take(components)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    let max = ((1u32 << bits) - 1) as f32;
    let default = match color_space {
        ColorSpace::Indexed { .. } => (0.0, max),
        _ => (0.0, 1.0),
    };
    if ranges.iter().all(|range| *range == default) {
        None
    } else {
        Some(ranges)
    }
}

fn unpack_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    bits: u32,
    color_space: &ColorSpace,
    decode: Option<&[(f32, f32)]>,
) -> Result<Vec<u8>, ExtractionError> {
    let components = color_space.components();
    let needed = sample_len(width, height, components, bits);
    let width = width as usize;
    let height = height as usize;
    let row_bytes = (width * components * bits as usize).div_ceil(8);
    if data.len() < needed {
        return Err(malformed(format!(
            "image data truncated: {} of {needed} bytes",
            data.len()
        )));
    }

    let max = (1u32 << bits) - 1;
    let mut rgb = Vec::with_capacity(width * height * 3);
    let mut pixel = [0u32; 4];

    for row in data.chunks_exact(row_bytes).take(height) {
        for x in 0..width {
            for (c, slot) in pixel.iter_mut().enumerate().take(components) {
                *slot = read_sample(row, (x * components + c) * bits as usize, bits);
            }

            match color_space {
                ColorSpace::Indexed { base, hival, lookup } => {
                    let mut index = pixel[0] as f32;
                    if let Some(&(lo, hi)) = decode.and_then(|d| d.first()) {
                        index = lo + index * (hi - lo) / max as f32;
                    }
                    let index = (index.round().max(0.0) as usize).min(*hival);
                    let n = base.components();
                    let entry = &lookup[index * n..index * n + n];
                    push_rgb(&mut rgb, base, entry);
                }
                _ => {
                    let mut scaled = [0u8; 4];
                    for c in 0..components {
                        scaled[c] = scale(pixel[c], max, decode.and_then(|d| d.get(c)));
                    }
                    push_rgb(&mut rgb, color_space, &scaled[..components]);
                }
            }
        }
    }
    Ok(rgb)
}

/// Read `bits` bits starting at `bit_offset`, most significant bit first.
fn read_sample(row: &[u8], bit_offset: usize, bits: u32) -> u32 {
    match bits {
        8 => u32::from(row[bit_offset / 8]),
        16 => {
            let i = bit_offset / 8;
            (u32::from(row[i]) << 8) | u32::from(row[i + 1])
        }
        _ => {
            let byte = row[bit_offset / 8];
            let shift = 8 - bits - (bit_offset % 8) as u32;
            u32::from(byte >> shift) & ((1 << bits) - 1)
        }
    }
}

fn scale(value: u32, max: u32, decode: Option<&(f32, f32)>) -> u8 {
    match decode {
        None => ((value * 255 + max / 2) / max) as u8,
        Some(&(lo, hi)) => {
            let t = lo + (value as f32 / max as f32) * (hi - lo);
            (t.clamp(0.0, 1.0) * 255.0).round() as u8
        }
    }
}

fn push_rgb(out: &mut Vec<u8>, color_space: &ColorSpace, values: &[u8]) {
    match color_space {
        ColorSpace::Gray => out.extend_from_slice(&[values[0]; 3]),
        ColorSpace::Rgb => out.extend_from_slice(&values[..3]),
        ColorSpace::Cmyk => {
            let k = 255 - u32::from(values[3]);
            for &ink in &values[..3] {
                out.push(((255 - u32::from(ink)) * k / 255) as u8);
            }
        }
        // Indexed bases are resolved before this point.
        ColorSpace::Indexed { .. } => out.extend_from_slice(&[0; 3]),
    }
}
