// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Green Pass — Core types, error definitions and payload validation shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod payload;
pub mod types;

pub use config::AppConfig;
pub use error::{ExtractionError, GreenpassError};
pub use payload::{CERTIFICATE_PREFIX, validate};
pub use types::*;
