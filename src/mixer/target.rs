use std::fmt;

use crate::device::output_card::SelectedCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundServer {
    Pulse,
    Pipewire,
}

impl SoundServer {
    pub fn device_name(self) -> &'static str {
        match self {
            SoundServer::Pulse => "pulse",
            SoundServer::Pipewire => "pipewire",
        }
    }
}

/// One addressing scheme for `amixer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    HardwareCard(String),
    DefaultDevice,
    ForcedBackend(SoundServer),
}

impl OutputTarget {
    /// The four targets tried on every request, in order. Most machines only
    /// have one or two of them backed by something real.
    pub fn all_for(card: &SelectedCard) -> [OutputTarget; 4] {
        [
            OutputTarget::HardwareCard(card.index.clone()),
            OutputTarget::DefaultDevice,
            OutputTarget::ForcedBackend(SoundServer::Pulse),
            OutputTarget::ForcedBackend(SoundServer::Pipewire),
        ]
    }

    /// Arguments placed between the program name and the amixer command.
    pub fn args(&self) -> Vec<String> {
        match self {
            OutputTarget::HardwareCard(index) => vec!["-c".to_string(), index.clone()],
            OutputTarget::DefaultDevice => Vec::new(),
            OutputTarget::ForcedBackend(server) => {
                vec!["-D".to_string(), server.device_name().to_string()]
            }
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::HardwareCard(index) => write!(f, "card {index}"),
            OutputTarget::DefaultDevice => f.write_str("default"),
            OutputTarget::ForcedBackend(server) => f.write_str(server.device_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_targets_in_fixed_order() {
        let card = SelectedCard {
            index: "2".into(),
            is_usb: false,
        };
        let targets = OutputTarget::all_for(&card);
        assert_eq!(targets[0], OutputTarget::HardwareCard("2".into()));
        assert_eq!(targets[1], OutputTarget::DefaultDevice);
        assert_eq!(targets[2], OutputTarget::ForcedBackend(SoundServer::Pulse));
        assert_eq!(targets[3], OutputTarget::ForcedBackend(SoundServer::Pipewire));
    }

    #[test]
    fn target_args() {
        assert_eq!(OutputTarget::HardwareCard("1".into()).args(), ["-c", "1"]);
        assert!(OutputTarget::DefaultDevice.args().is_empty());
        assert_eq!(
            OutputTarget::ForcedBackend(SoundServer::Pipewire).args(),
            ["-D", "pipewire"]
        );
    }
}
