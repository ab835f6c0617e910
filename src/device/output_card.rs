use std::fs;
use std::path::PathBuf;

const RECORD_PREFIX: &str = "Output ";

/// The hardware card currently chosen as audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedCard {
    /// ALSA card number, digits only.
    pub index: String,
    pub is_usb: bool,
}

impl Default for SelectedCard {
    fn default() -> Self {
        Self {
            index: "0".to_string(),
            is_usb: false,
        }
    }
}

pub trait OutputCardResolver {
    fn resolve(&self) -> SelectedCard;
}

/// Reads the workstation's cached "selected output" record.
pub struct FileOutputCardResolver {
    path: PathBuf,
}

impl FileOutputCardResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputCardResolver for FileOutputCardResolver {
    fn resolve(&self) -> SelectedCard {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_selected_output(&raw),
            Err(e) => {
                log::debug!(
                    "selected output record {} unavailable ({e}); using card 0",
                    self.path.display()
                );
                SelectedCard::default()
            }
        }
    }
}

/// A fixed card, for callers that already know the route (and for tests).
impl OutputCardResolver for SelectedCard {
    fn resolve(&self) -> SelectedCard {
        self.clone()
    }
}

/// Parses `Output <index>: <description>`. Anything else maps to card 0, non-USB.
pub fn parse_selected_output(raw: &str) -> SelectedCard {
    let Some(line) = raw.lines().next() else {
        return SelectedCard::default();
    };
    if !line.starts_with(RECORD_PREFIX) {
        return SelectedCard::default();
    }

    let head = line.split(':').next().unwrap_or_default();
    let index: String = head.chars().filter(char::is_ascii_digit).collect();

    SelectedCard {
        index: if index.is_empty() { "0".to_string() } else { index },
        is_usb: line.contains(" USB "),
    }
}
