// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use greenpass_core::error::GreenpassError;
use greenpass_core::human_errors::{HumanError, humanize_error};

use crate::services::app_services::{AppServices, Snapshot};

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Mode, held pass and layout as last read from the orchestrator.
    pub snapshot: Snapshot,
    /// Whether the scan button is offered.
    pub camera_available: bool,
    /// An import or capture is in flight.
    pub busy: bool,
    /// Last error, in plain language.
    pub message: Option<HumanError>,
}

impl AppState {
    /// Create initial state from the backend services.
    pub fn new(svc: &AppServices) -> Self {
        Self {
            snapshot: svc.snapshot(),
            camera_available: svc.camera_available(),
            busy: false,
            message: None,
        }
    }

    /// Re-read the orchestrator after an action.
    pub fn refresh(&mut self, svc: &AppServices) {
        self.snapshot = svc.snapshot();
    }

    /// Show `err` to the user. Cancellations are not errors to them.
    pub fn report(&mut self, err: &GreenpassError) {
        tracing::warn!(error = %err, "action failed");
        if matches!(err, GreenpassError::Cancelled) {
            return;
        }
        self.message = Some(humanize_error(err));
    }
}
