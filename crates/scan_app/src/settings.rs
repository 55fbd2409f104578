use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use scan_core::ScanConfig;
use scan_engine::SubmitSettings;
use scan_logging::{scan_debug, scan_info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SETTINGS_FILE: &str = "scanner_settings.ron";

/// On-disk settings. Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub service_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        let submit = SubmitSettings::default();
        Self {
            service_url: submit.service_url,
            connect_timeout_secs: submit.connect_timeout.as_secs(),
            request_timeout_secs: submit.request_timeout.as_secs(),
            max_response_bytes: submit.max_bytes,
        }
    }
}

impl AppSettings {
    pub fn submit_settings(&self) -> SubmitSettings {
        SubmitSettings {
            service_url: self.service_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
        }
    }
}

/// Loads settings from `explicit`, or from [`DEFAULT_SETTINGS_FILE`] when no
/// path was given. Only the implicit default file may be absent.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<AppSettings> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            scan_debug!("No settings file at {:?}; using defaults", path);
            return Ok(AppSettings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading settings from {}", path.display()))
        }
    };

    let settings: AppSettings = ron::from_str(&content)
        .with_context(|| format!("parsing settings from {}", path.display()))?;
    scan_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Reads a scan config in the `{"api": {"base_url": ..., "endpoints": [...]}}` shape.
pub fn load_scan_config(path: &Path) -> anyhow::Result<ScanConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading scan config from {}", path.display()))?;
    let config: ScanConfig = serde_json::from_str(&content)
        .with_context(|| format!("parsing scan config from {}", path.display()))?;
    scan_info!(
        "Loaded scan config from {:?} ({} endpoints)",
        path,
        config.endpoint_count()
    );
    Ok(config)
}
