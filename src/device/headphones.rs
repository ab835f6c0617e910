use std::fs;
use std::path::{Path, PathBuf};

use crate::device::output_card::SelectedCard;

const EVENT_UNPLUG: &str = "HEADPHONE unplug";
const EVENT_PLUG: &str = "HEADPHONE plug";

const PIN_HEADERS: [&str; 2] = ["Conn = Analog, Color = Unknown", "Conn = 1/8, Color = Green"];
const PIN_CTLS: &str = "Pin-ctls:";
const PIN_SENSED: &str = "0x00:";

/// Which stage of the detection chain produced a reading, most trusted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignalSource {
    UsbOutput,
    EventLog,
    CodecProbe,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadphoneState {
    pub connected: bool,
    pub source: SignalSource,
}

pub trait HeadphoneDetector {
    fn detect(&self, card: &SelectedCard) -> HeadphoneState;
}

/// Reads the ACPI event log and the per-card codec dump from disk.
pub struct FileHeadphoneDetector {
    event_log: PathBuf,
    codec_dump_template: String,
}

impl FileHeadphoneDetector {
    /// `codec_dump_template` has `{card}` replaced by the selected card index.
    pub fn new(event_log: impl Into<PathBuf>, codec_dump_template: impl Into<String>) -> Self {
        Self {
            event_log: event_log.into(),
            codec_dump_template: codec_dump_template.into(),
        }
    }

    fn codec_dump_path(&self, card: &SelectedCard) -> PathBuf {
        PathBuf::from(self.codec_dump_template.replace("{card}", &card.index))
    }
}

impl HeadphoneDetector for FileHeadphoneDetector {
    fn detect(&self, card: &SelectedCard) -> HeadphoneState {
        resolve(
            card,
            || read_optional(&self.event_log),
            || read_optional(&self.codec_dump_path(card)),
        )
    }
}

/// In-memory signal contents; `None` means the file does not exist.
#[derive(Debug, Clone, Default)]
pub struct InMemorySignals {
    pub event_log: Option<String>,
    pub codec_dump: Option<String>,
}

impl HeadphoneDetector for InMemorySignals {
    fn detect(&self, card: &SelectedCard) -> HeadphoneState {
        resolve(card, || self.event_log.clone(), || self.codec_dump.clone())
    }
}

fn read_optional(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            log::debug!("{} unavailable: {e}", path.display());
            None
        }
    }
}

/// Runs the chain. Later sources are only loaded when earlier ones are inconclusive.
pub fn resolve(
    card: &SelectedCard,
    event_log: impl FnOnce() -> Option<String>,
    codec_dump: impl FnOnce() -> Option<String>,
) -> HeadphoneState {
    if card.is_usb {
        return HeadphoneState {
            connected: true,
            source: SignalSource::UsbOutput,
        };
    }

    if let Some(connected) = event_log().and_then(|log| scan_event_log(log.lines())) {
        return HeadphoneState {
            connected,
            source: SignalSource::EventLog,
        };
    }

    if let Some(dump) = codec_dump() {
        if probe_codec_pins(dump.lines()) {
            return HeadphoneState {
                connected: true,
                source: SignalSource::CodecProbe,
            };
        }
    }

    HeadphoneState {
        connected: false,
        source: SignalSource::Fallback,
    }
}

/// Returns the state from the last plug/unplug event, or `None` if there was none.
pub fn scan_event_log<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<bool> {
    let mut last = None;
    for line in lines {
        let line = line.trim_end();
        if line.ends_with(EVENT_UNPLUG) {
            last = Some(false);
        } else if line.ends_with(EVENT_PLUG) {
            last = Some(true);
        }
    }
    last
}

/// True once a headphone-style pin header is followed by a `Pin-ctls:` line with `0x00:`.
///
/// A `Pin-ctls:` line without the token does not end the scan; the next matching
/// header gets its own chance.
pub fn probe_codec_pins<'a>(lines: impl IntoIterator<Item = &'a str>) -> bool {
    let mut looking = false;
    for line in lines {
        if PIN_HEADERS.iter().any(|h| line.contains(h)) {
            looking = true;
            continue;
        }
        if looking && line.trim_start().starts_with(PIN_CTLS) {
            if line.contains(PIN_SENSED) {
                return true;
            }
            looking = false;
        }
    }
    false
}
