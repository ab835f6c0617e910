use std::fmt;

use crate::mixer::enumerate::MixerControl;
use crate::mixer::target::OutputTarget;

/// Volume in percent, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(u8);

impl Percent {
    pub const MUTED: Percent = Percent(0);
    pub const FULL: Percent = Percent(100);

    /// Values bound to the workstation's volume buttons.
    pub const PRESETS: [Percent; 5] = [Percent(10), Percent(25), Percent(50), Percent(75), Percent(100)];

    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDecision {
    pub target: OutputTarget,
    pub control: MixerControl,
    pub percent: Percent,
    pub mute: bool,
}

/// Maps one control to `(percent, mute)`.
///
/// Rules, in order: mute the speaker while headphones are in and the headphone
/// while they are out; always mute sidetone; never mute anything on a USB
/// output except sidetone; drive boost controls to full when unmuted.
pub fn decide(name: &str, is_usb: bool, headphones_connected: bool, desired: Percent) -> (Percent, bool) {
    let sidetone = name.starts_with("Sidetone");

    let mut mute = (headphones_connected && name.starts_with("Speaker"))
        || (!headphones_connected && name.starts_with("Headphone"));
    if sidetone {
        // Sidetone loops back into some USB headsets as a loud buzz.
        mute = true;
    }
    if is_usb && !sidetone {
        mute = false;
    }

    let percent = if mute {
        Percent::MUTED
    } else if is_boost(name) {
        Percent::FULL
    } else {
        desired
    };
    (percent, mute)
}

/// Accepts both the bare name and amixer's quoted form (`Mic Boost'`).
fn is_boost(name: &str) -> bool {
    name.contains(" Boost'") || name.ends_with(" Boost")
}

pub fn decide_all(
    target: &OutputTarget,
    controls: Vec<MixerControl>,
    is_usb: bool,
    headphones_connected: bool,
    desired: Percent,
) -> Vec<VolumeDecision> {
    controls
        .into_iter()
        .filter(|c| c.supports_playback)
        .map(|control| {
            let (percent, mute) = decide(&control.name, is_usb, headphones_connected, desired);
            VolumeDecision {
                target: target.clone(),
                control,
                percent,
                mute,
            }
        })
        .collect()
}
