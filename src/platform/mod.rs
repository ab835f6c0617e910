pub mod controller;

use serde::{Deserialize, Serialize};

/// How a volume request is carried out on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// amixer across hardware card, default device, pulse and pipewire.
    Linux,
    /// A single osascript call.
    MacOs,
    Unsupported,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unsupported
        }
    }
}

pub use controller::{MixerReport, NativeCall, TargetReport, VolumeController, VolumeReport};
