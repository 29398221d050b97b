// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// greenpass-acquire — Getting a pass into the app.
//
// The orchestrator owns the Idle / CameraScanning / ResultDisplayed state
// machine. Camera frames and imported PDFs both end in the same validator
// and the same single-slot pass store.

pub mod import;
pub mod orchestrator;
pub mod store;

pub use import::{CancelToken, DecodedDocument, ImportHandle, ImportTask, decode_document};
pub use orchestrator::{FrameOutcome, ImportOutcome, Orchestrator};
pub use store::PassStore;
