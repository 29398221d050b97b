// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Key under which the validated payload is persisted.
    pub storage_key: String,
    /// QR edge length used when no imported image height is known.
    pub default_qr_dimension: u32,
    /// Quiet zone drawn around the rendered QR code, in pixels.
    pub quiet_zone: u32,
    /// Imports larger than this are refused before parsing.
    pub max_document_bytes: usize,
    /// Offer camera scanning when the platform grants permission.
    pub camera_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: "@qr".to_string(),
            default_qr_dimension: 404,
            quiet_zone: 8,
            max_document_bytes: 32 * 1024 * 1024,
            camera_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "quiet_zone": 4 }"#).expect("parse config");
        assert_eq!(config.quiet_zone, 4);
        assert_eq!(config.storage_key, "@qr");
        assert_eq!(config.default_qr_dimension, 404);
        assert!(config.camera_enabled);
    }
}
