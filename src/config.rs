// SPDX-License-Identifier: GPL-3.0-only

//! Run configuration and label mappings

use crate::constants::{DEFAULT_MAPPINGS_FILE, detection::QR_MAX_DIMENSION};
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything a scan run needs to know, resolved from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    /// `/dev/video<N>`
    pub camera_index: usize,
    /// Beep on the first sighting of a value
    pub beep: bool,
    /// Per-frame debug logging
    pub debug: bool,
    /// Draw the camera preview in the terminal
    pub preview: bool,
    /// Downscale limit for the QR decoder
    pub max_dimension: u32,
    /// Explicit mapping file; `None` means "use mappings.json if present"
    pub mappings: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            beep: true,
            debug: false,
            preview: true,
            max_dimension: QR_MAX_DIMENSION,
            mappings: None,
        }
    }
}

/// Parse the positional beep flag
///
/// Accepts the usual boolean spellings in any case.
pub fn parse_beep_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!(
            "invalid beep flag '{}' (expected 1/0, true/false, yes/no or on/off)",
            other
        )),
    }
}

/// Decoded text to display label
///
/// Stored as a flat JSON object, e.g. `{"3009P": "Front door"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMappings {
    labels: HashMap<String, String>,
}

impl LabelMappings {
    /// Read a mapping file
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| AppError::Config(format!("invalid mappings in {}: {}", path.display(), e)))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Mappings for a run
    ///
    /// An explicit path is loaded; otherwise `mappings.json` in the working
    /// directory is used if it exists. Any problem is logged and the run
    /// continues without mappings.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let default_path = Path::new(DEFAULT_MAPPINGS_FILE);
        let path = match explicit {
            Some(path) => path,
            None if default_path.is_file() => default_path,
            None => return Self::default(),
        };

        match Self::load(path) {
            Ok(mappings) => {
                info!(path = %path.display(), count = mappings.len(), "Loaded label mappings");
                mappings
            }
            Err(e) => {
                warn!(error = %e, "Ignoring label mappings");
                Self::default()
            }
        }
    }

    /// Label for a decoded text, if one is mapped
    pub fn label_for(&self, text: &str) -> Option<&str> {
        self.labels.get(text).map(String::as_str)
    }

    pub fn insert(&mut self, text: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(text.into(), label.into());
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
