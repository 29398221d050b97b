// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — initialises the backend and provides
// async-friendly methods for the Dioxus UI to call.
//
// The orchestrator holds a SQLite connection behind its store, so it is
// shared as `Arc<Mutex<>>`. No lock is held across an await point.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use greenpass_acquire::{CancelToken, FrameOutcome, ImportOutcome, Orchestrator};
use greenpass_bridge::{PlatformBridge, capture_frame, pick_document, platform_bridge};
use greenpass_core::error::{GreenpassError, Result};
use greenpass_core::{AcquisitionMode, AppConfig, QrLayout};
use greenpass_document::{PassPdfWriter, RqrrDecoder, decode_encoded_image};
use greenpass_security::{KeyValueStore, MemoryStore, SqliteStore};
use tracing::{info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "greenpass.db";

/// What the UI needs to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: AcquisitionMode,
    pub payload: Option<String>,
    pub layout: QrLayout,
}

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    orchestrator: Arc<Mutex<Orchestrator>>,
    bridge: Arc<dyn PlatformBridge>,
    pending_import: Arc<Mutex<Option<CancelToken>>>,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    ///
    /// Opens the pass database in the data directory and restores any pass
    /// stored there.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();
        let store = SqliteStore::open(dir.join(STORE_FILE))?;
        Self::with_store(Arc::new(store), dir, config)
    }

    /// Services backed by a volatile store, for when the database cannot be
    /// opened. The pass will not survive a restart.
    pub fn fallback() -> Result<Self> {
        let dir = data_dir::data_dir();
        let config = load_config(&dir).unwrap_or_default();
        Self::with_store(Arc::new(MemoryStore::new()), dir, config)
    }

    fn with_store(store: Arc<dyn KeyValueStore>, dir: PathBuf, config: AppConfig) -> Result<Self> {
        let orchestrator = Orchestrator::new(store, Arc::new(RqrrDecoder::new()), config.clone())?;
        let bridge: Arc<dyn PlatformBridge> = Arc::from(platform_bridge());
        info!(platform = bridge.platform_name(), mode = %orchestrator.mode(), "app services initialised");

        Ok(Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            bridge,
            pending_import: Arc::new(Mutex::new(None)),
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        })
    }

    fn orchestrator(&self) -> MutexGuard<'_, Orchestrator> {
        self.orchestrator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current mode, held pass and layout.
    pub fn snapshot(&self) -> Snapshot {
        let orchestrator = self.orchestrator();
        Snapshot {
            mode: orchestrator.mode(),
            payload: orchestrator.payload().map(|p| p.as_str().to_owned()),
            layout: orchestrator.layout(),
        }
    }

    // -- Camera ---------------------------------------------------------------

    /// Whether the scan button should be offered.
    pub fn camera_available(&self) -> bool {
        if !self.config().camera_enabled {
            return false;
        }
        match self.bridge.request_camera_permission() {
            Ok(granted) => granted,
            Err(e) => {
                warn!(error = %e, "camera permission check failed");
                false
            }
        }
    }

    pub fn start_scan(&self) -> Result<()> {
        self.orchestrator().start_scan()
    }

    pub fn cancel_scan(&self) -> Result<()> {
        self.orchestrator().cancel_scan()
    }

    /// Capture one frame, decode it and offer the text to the orchestrator.
    ///
    /// `Ok(None)` means the capture was dismissed or no code was seen.
    pub async fn scan_once(&self) -> Result<Option<FrameOutcome>> {
        let bridge = Arc::clone(&self.bridge);
        let decoder = self.orchestrator().decoder();

        let candidate = tokio::task::spawn_blocking(move || -> Result<Option<String>> {
            let Some(frame) = capture_frame(bridge.as_ref())? else {
                return Ok(None);
            };
            let buffer = decode_encoded_image(&frame)?;
            Ok(decoder.decode(&buffer))
        })
        .await
        .map_err(|e| GreenpassError::Bridge(format!("capture task failed: {e}")))??;

        match candidate {
            Some(text) => Ok(Some(self.orchestrator().offer_frame(&text)?)),
            None => Ok(None),
        }
    }

    // -- Document import ------------------------------------------------------

    /// Let the user pick a PDF and import it in the background.
    ///
    /// `Ok(None)` means the picker was dismissed.
    pub async fn import_pdf(&self) -> Result<Option<ImportOutcome>> {
        let bridge = Arc::clone(&self.bridge);
        let picked = tokio::task::spawn_blocking(move || pick_document(bridge.as_ref()))
            .await
            .map_err(|e| GreenpassError::Bridge(format!("picker task failed: {e}")))??;
        let Some(bytes) = picked else {
            return Ok(None);
        };

        let handle = self.orchestrator().begin_import(bytes)?;
        *self.pending() = Some(handle.cancel_token());
        let joined = handle.join().await;
        *self.pending() = None;

        let outcome = self.orchestrator().apply_import(joined?)?;
        Ok(Some(outcome))
    }

    /// Abandon the import in flight, if any.
    pub fn cancel_import(&self) {
        if let Some(token) = self.pending().take() {
            info!("import cancelled by user");
            token.cancel();
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.pending_import.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Held pass ------------------------------------------------------------

    pub fn reset(&self) -> Result<()> {
        self.cancel_import();
        self.orchestrator().reset()
    }

    /// Write the held pass to `path` as a single-page PDF.
    pub fn export_pass(&self, path: &Path) -> Result<()> {
        let payload = self
            .orchestrator()
            .payload()
            .cloned()
            .ok_or(GreenpassError::InvalidTransition {
                from: AcquisitionMode::Idle,
                action: "export a pass",
            })?;
        let mut writer = PassPdfWriter::new();
        writer.set_title("Green Pass");
        writer.write_pass_to_file(&payload, path)
    }

    // -- Config ---------------------------------------------------------------

    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update and persist the config. Takes effect on next start.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        persist_config(&self.data_dir, config)
    }
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
