//! Output route detection and volume control for QA workstations.
//!
//! [`VolumeController::set_volume`] works out which card is the active output and
//! whether headphones are plugged in, then sets every playback control it can find
//! through `amixer` (hardware card, default device, pulse, pipewire). On macOS it
//! falls back to a single `osascript` call.

pub mod data;
pub mod device;
pub mod mixer;
pub mod platform;
pub mod utils;

pub use data::config::Config;
pub use device::headphones::{HeadphoneDetector, HeadphoneState, SignalSource};
pub use device::output_card::{OutputCardResolver, SelectedCard};
pub use mixer::policy::{Percent, VolumeDecision};
pub use platform::{Platform, VolumeController, VolumeReport};
pub use utils::command::{CommandError, CommandRunner};
