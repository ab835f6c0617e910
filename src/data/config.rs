use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::Platform;

const ENV_CONFIG_DIR: &str = "AUDIO_ROUTE_CTL_CONFIG_DIR";
const APP_DIR: &str = "audio-route-ctl";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// One-line record written by the workstation when an output is picked.
    pub selected_output_path: PathBuf,
    /// `acpi_listen` output.
    pub event_log_path: PathBuf,
    /// `{card}` is replaced with the selected card index.
    pub codec_dump_template: String,
    pub amixer: String,
    pub osascript: String,
    /// Overrides the platform detected from the build target.
    pub platform: Option<Platform>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selected_output_path: default_selected_output_path(),
            event_log_path: PathBuf::from("/tmp/acpi_events.log"),
            codec_dump_template: "/proc/asound/card{card}/codec#0".to_string(),
            amixer: "amixer".to_string(),
            osascript: "osascript".to_string(),
            platform: None,
        }
    }
}

impl Config {
    /// Loads `path`, or the default location when `None`. A missing file gives
    /// the defaults; an unreadable or malformed one is logged and also gives the
    /// defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
        if !path.exists() {
            return Self::default();
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("cannot read config {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };
        Self::parse(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}

pub fn default_path() -> PathBuf {
    config_root().join("config.toml")
}

fn config_root() -> PathBuf {
    if let Some(p) = std::env::var_os(ENV_CONFIG_DIR) {
        return PathBuf::from(p);
    }
    // Linux: $XDG_CONFIG_HOME/audio-route-ctl, macOS: ~/Library/Application Support/audio-route-ctl
    match BaseDirs::new() {
        Some(d) => d.config_dir().join(APP_DIR),
        None => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR),
    }
}

fn default_selected_output_path() -> PathBuf {
    let rel = Path::new("qa-workstation").join("selected_output");
    match BaseDirs::new() {
        Some(d) => d.cache_dir().join(rel),
        None => PathBuf::from("/tmp").join(rel),
    }
}
