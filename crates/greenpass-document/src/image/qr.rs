// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR decoding — turns an RGBA pixel buffer into the text of the first QR
// symbol found, using `rqrr` behind a small preprocessing cascade.

use std::panic;

use greenpass_core::error::GreenpassError;
use greenpass_core::PixelBuffer;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use rqrr::PreparedImage;
use tracing::{debug, instrument, trace, warn};

use super::normalize::normalize;

/// Images smaller than this on their longest edge are upscaled before
/// detection, since rqrr needs several pixels per module.
const MIN_DETECT_EDGE: u32 = 240;

/// Decodes QR symbols from pixel buffers.
///
/// Implementations must be usable from background import tasks.
pub trait QrDecoder: Send + Sync {
    /// Text of the first QR symbol in `buffer`, or `None` if none decodes.
    fn decode(&self, buffer: &PixelBuffer) -> Option<String>;
}

/// Preprocessing applied before handing an image to rqrr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Raw,
    Upscaled,
    Otsu,
}

impl Strategy {
    const CASCADE: [Strategy; 3] = [Strategy::Raw, Strategy::Upscaled, Strategy::Otsu];
}

/// Default [`QrDecoder`] backed by the pure-Rust `rqrr` crate.
#[derive(Debug, Clone, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    #[instrument(skip_all, fields(width = buffer.width, height = buffer.height))]
    fn decode(&self, buffer: &PixelBuffer) -> Option<String> {
        if buffer.width == 0 || buffer.height == 0 || buffer.data.len() < buffer.pixel_count() * 4 {
            return None;
        }
        let grey = to_greyscale(buffer);
        // Upscale first: a quiet zone around one pixel per module trips rqrr.
        let upscaled = with_quiet_zone(&upscale(&grey));

        for strategy in Strategy::CASCADE {
            if let Some(text) = attempt(strategy, &grey, &upscaled) {
                debug!(strategy = ?strategy, "QR symbol decoded");
                return Some(text);
            }
        }
        debug!("no QR symbol decoded");
        None
    }
}

/// Run one strategy. A panic inside rqrr counts as no symbol.
fn attempt(strategy: Strategy, grey: &GrayImage, upscaled: &GrayImage) -> Option<String> {
    let outcome = panic::catch_unwind(|| match strategy {
        Strategy::Raw => detect_greyscale(grey),
        Strategy::Upscaled => detect_greyscale(upscaled),
        Strategy::Otsu => {
            let level = otsu_level(upscaled);
            trace!(level, "otsu threshold");
            detect_bitmap(upscaled, level)
        }
    });
    match outcome {
        Ok(text) => text,
        Err(_) => {
            warn!(strategy = ?strategy, "QR detector panicked; treating as no symbol");
            None
        }
    }
}

/// Decode an encoded still image (PNG, JPEG, ...) into an RGBA buffer.
pub fn decode_encoded_image(bytes: &[u8]) -> Result<PixelBuffer, GreenpassError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| GreenpassError::ImageError(format!("failed to decode image: {}", err)))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(normalize(rgb.as_raw(), width, height))
}

// -- Preprocessing ------------------------------------------------------------

/// ITU-R BT.601 luminance in integer arithmetic.
fn to_greyscale(buffer: &PixelBuffer) -> GrayImage {
    let luma: Vec<u8> = buffer
        .data
        .chunks_exact(4)
        .take(buffer.pixel_count())
        .map(|px| {
            let (r, g, b) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
            ((77 * r + 150 * g + 29 * b) >> 8) as u8
        })
        .collect();
    GrayImage::from_raw(buffer.width, buffer.height, luma)
        .unwrap_or_else(|| GrayImage::new(buffer.width, buffer.height))
}

/// Pad with white on every side, a quarter of the longest edge (at least 8px).
fn with_quiet_zone(grey: &GrayImage) -> GrayImage {
    let margin = (grey.width().max(grey.height()) / 4).max(8);
    let mut padded = GrayImage::from_pixel(
        grey.width() + margin * 2,
        grey.height() + margin * 2,
        Luma([u8::MAX]),
    );
    imageops::replace(&mut padded, grey, i64::from(margin), i64::from(margin));
    padded
}

/// Nearest-neighbour upscale so the longest edge reaches `MIN_DETECT_EDGE`.
fn upscale(grey: &GrayImage) -> GrayImage {
    let longest = grey.width().max(grey.height());
    if longest >= MIN_DETECT_EDGE {
        return grey.clone();
    }
    let factor = MIN_DETECT_EDGE.div_ceil(longest);
    imageops::resize(
        grey,
        grey.width() * factor,
        grey.height() * factor,
        FilterType::Nearest,
    )
}

// -- rqrr wrappers ------------------------------------------------------------

fn detect_greyscale(grey: &GrayImage) -> Option<String> {
    let mut prepared = PreparedImage::prepare_from_greyscale(
        grey.width() as usize,
        grey.height() as usize,
        |x, y| grey.get_pixel(x as u32, y as u32).0[0],
    );
    prepared
        .detect_grids()
        .iter()
        .find_map(|grid| grid.decode().ok())
        .map(|(_, content)| content)
}

fn detect_bitmap(grey: &GrayImage, threshold: u8) -> Option<String> {
    let mut prepared = PreparedImage::prepare_from_bitmap(
        grey.width() as usize,
        grey.height() as usize,
        |x, y| grey.get_pixel(x as u32, y as u32).0[0] <= threshold,
    );
    prepared
        .detect_grids()
        .iter()
        .find_map(|grid| grid.decode().ok())
        .map(|(_, content)| content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::normalize::normalize_sample;
    use crate::pdf::extract::extract_first_image;
    use crate::pdf::fixtures::{PageBuilder, qr_sample, solid_sample};
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    #[test]
    fn bare_21x21_symbol_decodes() {
        let sample = qr_sample("HC1:TESTDATA");
        let text = RqrrDecoder::new().decode(&normalize_sample(&sample));
        assert_eq!(text.as_deref(), Some("HC1:TESTDATA"));
    }

    #[test]
    fn every_strategy_survives_a_one_pixel_module_symbol() {
        let buffer = normalize_sample(&qr_sample("HC1:TESTDATA"));
        let grey = to_greyscale(&buffer);
        let upscaled = with_quiet_zone(&upscale(&grey));

        let results: Vec<_> = Strategy::CASCADE
            .iter()
            .map(|&strategy| attempt(strategy, &grey, &upscaled))
            .collect();
        assert_eq!(results[1].as_deref(), Some("HC1:TESTDATA"));
    }

    #[test]
    fn bare_padding_of_tiny_symbol_is_contained() {
        // Padding without upscaling is the input that panics inside rqrr.
        let grey = to_greyscale(&normalize_sample(&qr_sample("HC1:TESTDATA")));
        let padded = with_quiet_zone(&grey);
        let _ = attempt(Strategy::Raw, &padded, &padded);
        let _ = attempt(Strategy::Otsu, &padded, &padded);
    }

    #[test]
    fn blank_image_has_no_symbol() {
        let sample = solid_sample(64, 64, [255, 255, 255]);
        assert_eq!(RqrrDecoder::new().decode(&normalize_sample(&sample)), None);
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let buffer = PixelBuffer {
            data: Vec::new(),
            width: 0,
            height: 0,
        };
        assert_eq!(RqrrDecoder::new().decode(&buffer), None);
    }

    #[test]
    fn pdf_round_trip_yields_payload() {
        let mut builder = PageBuilder::new();
        builder.add_rgb_image("Im0", &qr_sample("HC1:TESTDATA"));
        builder.paint("Im0");

        let sample = extract_first_image(&builder.build()).expect("extract");
        let buffer = normalize_sample(&sample);
        assert_eq!(buffer.data.len(), 21 * 21 * 4);
        assert_eq!(
            RqrrDecoder::new().decode(&buffer).as_deref(),
            Some("HC1:TESTDATA")
        );
    }

    #[test]
    fn encoded_png_is_decoded_to_rgba() {
        let sample = qr_sample("HC1:PNG");
        let rgb = RgbImage::from_raw(sample.width(), sample.height(), sample.samples().to_vec())
            .expect("rgb image");
        let mut png = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("encode png");

        let buffer = decode_encoded_image(&png).expect("decode");
        assert_eq!(buffer, normalize_sample(&sample));
        assert_eq!(
            RqrrDecoder::new().decode(&buffer).as_deref(),
            Some("HC1:PNG")
        );
    }

    #[test]
    fn garbage_image_bytes_error() {
        assert!(matches!(
            decode_encoded_image(b"not an image"),
            Err(GreenpassError::ImageError(_))
        ));
    }
}
