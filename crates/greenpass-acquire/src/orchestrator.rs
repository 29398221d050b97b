// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Acquisition orchestrator — the state machine behind the app's three screens.
//
//   Idle ──start_scan──▶ CameraScanning ──offer_frame(valid)──▶ ResultDisplayed
//    ▲ ▲                      │                                      │
//    │ └────cancel_scan───────┘                                      │
//    │                                                               │
//    ├──offer_frame(valid) ─────────────────────────────────────────▶│
//    ├──import_document / apply_import (valid) ─────────────────────▶│
//    └──────────────────────────── reset (from any state) ───────────┘
//
// Frames keep arriving from the decoder regardless of which screen is up, so
// a valid frame is accepted in Idle as well as while scanning.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use greenpass_core::error::{GreenpassError, Result};
use greenpass_core::{AcquisitionMode, AppConfig, PayloadSource, QrLayout, ValidatedPayload};
use greenpass_document::QrDecoder;
use greenpass_security::KeyValueStore;
use tracing::{debug, info, instrument, warn};

use crate::import::{DecodedDocument, ImportHandle, ImportTask, decode_document};
use crate::store::PassStore;

/// What happened to a camera frame's candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Valid payload; persisted and now displayed.
    Accepted,
    /// Not a certificate; scanning continues.
    Rejected,
    /// A pass is already displayed; the frame was ignored.
    Discarded,
}

/// Result of an import that got as far as validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Valid payload; persisted and now displayed.
    Displayed,
    /// A QR code was read but is not a certificate. Nothing changed.
    Unrecognized,
}

/// Owns the acquisition mode, the held pass and its persistence.
pub struct Orchestrator {
    mode: AcquisitionMode,
    payload: Option<ValidatedPayload>,
    store: PassStore,
    decoder: Arc<dyn QrDecoder>,
    config: AppConfig,
    dimension: u32,
}

impl Orchestrator {
    /// Build the orchestrator, restoring a previously stored pass.
    ///
    /// A stored value that no longer passes validation is cleared.
    #[instrument(skip_all, fields(key = %config.storage_key))]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        decoder: Arc<dyn QrDecoder>,
        config: AppConfig,
    ) -> Result<Self> {
        let store = PassStore::new(store, config.storage_key.clone());
        let mut orchestrator = Self {
            mode: AcquisitionMode::Idle,
            payload: None,
            store,
            decoder,
            dimension: config.default_qr_dimension,
            config,
        };

        if let Some(stored) = orchestrator.store.load()? {
            match ValidatedPayload::accept(&stored, PayloadSource::Restored) {
                Some(payload) => {
                    info!(payload_len = stored.len(), "stored pass restored");
                    orchestrator.payload = Some(payload);
                    orchestrator.mode = AcquisitionMode::ResultDisplayed;
                }
                None => {
                    warn!("stored value is not a certificate, clearing it");
                    orchestrator.store.clear()?;
                }
            }
        }
        Ok(orchestrator)
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// The pass currently held, if any.
    pub fn payload(&self) -> Option<&ValidatedPayload> {
        self.payload.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The decoder used for imports, shared so camera frames use the same one.
    pub fn decoder(&self) -> Arc<dyn QrDecoder> {
        Arc::clone(&self.decoder)
    }

    /// Sizing for the rendered QR code.
    pub fn layout(&self) -> QrLayout {
        QrLayout {
            dimension: self.dimension,
            quiet_zone: self.config.quiet_zone,
        }
    }

    // -- Camera ---------------------------------------------------------------

    pub fn start_scan(&mut self) -> Result<()> {
        self.require(AcquisitionMode::Idle, "start scanning")?;
        self.transition(AcquisitionMode::CameraScanning);
        Ok(())
    }

    /// Offer text decoded from one camera frame.
    ///
    /// Accepted in Idle and CameraScanning. Ignored once a pass is displayed.
    pub fn offer_frame(&mut self, candidate: &str) -> Result<FrameOutcome> {
        if self.mode == AcquisitionMode::ResultDisplayed {
            debug!(mode = %self.mode, "frame discarded");
            return Ok(FrameOutcome::Discarded);
        }
        let Some(payload) = ValidatedPayload::accept(candidate, PayloadSource::Camera) else {
            debug!(candidate_len = candidate.len(), "frame rejected");
            return Ok(FrameOutcome::Rejected);
        };
        self.hold(payload, self.config.default_qr_dimension)?;
        Ok(FrameOutcome::Accepted)
    }

    pub fn cancel_scan(&mut self) -> Result<()> {
        self.require(AcquisitionMode::CameraScanning, "cancel scanning")?;
        self.transition(AcquisitionMode::Idle);
        Ok(())
    }

    // -- Document import ------------------------------------------------------

    /// Import a PDF synchronously.
    pub fn import_document(&mut self, bytes: &[u8]) -> Result<ImportOutcome> {
        self.require(AcquisitionMode::Idle, "import a document")?;
        let decoded = decode_document(
            bytes,
            self.decoder.as_ref(),
            self.config.max_document_bytes,
            &AtomicBool::new(false),
        )?;
        self.apply_import(decoded)
    }

    /// Start a background import. Apply its result with [`apply_import`].
    ///
    /// [`apply_import`]: Self::apply_import
    pub fn begin_import(&self, bytes: Vec<u8>) -> Result<ImportHandle> {
        self.require(AcquisitionMode::Idle, "import a document")?;
        Ok(ImportTask::spawn(
            bytes,
            Arc::clone(&self.decoder),
            self.config.max_document_bytes,
        ))
    }

    /// Validate a decoded document and display it if it is a certificate.
    pub fn apply_import(&mut self, decoded: DecodedDocument) -> Result<ImportOutcome> {
        self.require(AcquisitionMode::Idle, "import a document")?;
        let Some(payload) = ValidatedPayload::accept(&decoded.candidate, PayloadSource::Document)
        else {
            warn!(document = %decoded.fingerprint, "imported code is not a certificate");
            return Ok(ImportOutcome::Unrecognized);
        };
        self.hold(payload, decoded.image_height)?;
        info!(document = %decoded.fingerprint, "document imported");
        Ok(ImportOutcome::Displayed)
    }

    // -- Reset ----------------------------------------------------------------

    /// Forget the held pass and return to Idle, from any state.
    pub fn reset(&mut self) -> Result<()> {
        self.payload = None;
        self.dimension = self.config.default_qr_dimension;
        self.transition(AcquisitionMode::Idle);
        self.store.clear()
    }

    // -- Internals ------------------------------------------------------------

    fn require(&self, expected: AcquisitionMode, action: &'static str) -> Result<()> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(GreenpassError::InvalidTransition {
                from: self.mode,
                action,
            })
        }
    }

    /// Persist `payload`, then display it.
    fn hold(&mut self, payload: ValidatedPayload, dimension: u32) -> Result<()> {
        self.store.save(&payload)?;
        info!(source = ?payload.source, payload_len = payload.as_str().len(), "pass accepted");
        self.payload = Some(payload);
        self.dimension = dimension;
        self.transition(AcquisitionMode::ResultDisplayed);
        Ok(())
    }

    fn transition(&mut self, to: AcquisitionMode) {
        if self.mode != to {
            info!(from = %self.mode, to = %to, "acquisition mode changed");
        }
        self.mode = to;
    }
}
