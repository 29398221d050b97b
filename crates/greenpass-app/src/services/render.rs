// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// On-screen QR rendering — SVG markup via the `qrcode` crate.

use greenpass_core::QrLayout;
use greenpass_core::error::{GreenpassError, Result};
use qrcode::QrCode;
use qrcode::render::svg;

/// Window size the desktop shell opens with, in logical pixels.
pub const WINDOW_SIZE: (u32, u32) = (480, 800);

/// Edge length of the code for the current layout and window.
pub fn edge_for(layout: &QrLayout) -> u32 {
    layout.render_size(WINDOW_SIZE.0, WINDOW_SIZE.1).max(1)
}

/// Render `text` as a square SVG of exactly `edge` pixels, without margin.
/// The caller draws the quiet zone around it.
pub fn qr_svg(text: &str, edge: u32) -> Result<String> {
    let code = QrCode::new(text.as_bytes())
        .map_err(|err| GreenpassError::ImageError(format!("cannot encode QR code: {}", err)))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .quiet_zone(false)
        .min_dimensions(edge, edge)
        .max_dimensions(edge, edge)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}
