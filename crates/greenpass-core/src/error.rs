// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Green Pass.

use thiserror::Error;

use crate::types::AcquisitionMode;

/// Failures of the PDF image extractor.
///
/// Both document-level kinds are terminal for the current import attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The bytes are not a well-formed PDF (header, xref, object graph or
    /// page content could not be read).
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The first page has no paintable image object.
    #[error("no image found on the first page")]
    NoImageFound,

    /// An image was found but its encoding cannot be turned into samples.
    #[error("unsupported image encoding: {0}")]
    UnsupportedImage(String),
}

/// Top-level error type for all Green Pass operations.
#[derive(Debug, Error)]
pub enum GreenpassError {
    // -- Acquisition errors --
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("no readable code in the extracted image")]
    NoReadableCode,

    #[error("decoded text is not a recognised certificate payload")]
    UnrecognizedPayload,

    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: AcquisitionMode,
        action: &'static str,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GreenpassError>;
