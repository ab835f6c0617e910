use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;

use audio_route_ctl::device::headphones::{FileHeadphoneDetector, InMemorySignals};
use audio_route_ctl::device::output_card::FileOutputCardResolver;
use audio_route_ctl::mixer::apply::ApplyStatus;
use audio_route_ctl::mixer::target::{OutputTarget, SoundServer};
use audio_route_ctl::platform::MixerReport;
use audio_route_ctl::{
    CommandError, CommandRunner, Config, Percent, Platform, SelectedCard, SignalSource, VolumeController,
    VolumeReport,
};
use tempfile::TempDir;

const CARD_SCONTENTS: &str = "\
Simple mixer control 'Master',0
  Capabilities: pvolume pswitch
  Playback channels: Mono
Simple mixer control 'Headphone',0
  Capabilities: pvolume pswitch
  Playback channels: Front Left - Front Right
Simple mixer control 'Speaker',0
  Capabilities: pvolume pswitch
  Playback channels: Front Left - Front Right
Simple mixer control 'Capture',0
  Capabilities: cvolume cswitch
  Capture channels: Front Left - Front Right
Simple mixer control 'Mic Boost',0
  Capabilities: volume
  Playback channels: Front Left - Front Right
Simple mixer control 'Sidetone',0
  Capabilities: pvolume pswitch
  Playback channels: Mono
";

const PULSE_SCONTENTS: &str = "\
Simple mixer control 'Master',0
  Capabilities: pvolume pswitch pswitch-joined
  Playback channels: Front Left - Front Right
Simple mixer control 'Capture',0
  Capabilities: cvolume cswitch cswitch-joined
  Capture channels: Front Left - Front Right
";

/// Answers `scontents` from a per-target script and records every call.
#[derive(Clone, Default)]
struct ScriptedAmixer {
    scontents: HashMap<Vec<String>, Result<&'static str, &'static str>>,
    failing_controls: Vec<&'static str>,
    calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl ScriptedAmixer {
    fn with_target(mut self, target: &OutputTarget, out: Result<&'static str, &'static str>) -> Self {
        self.scontents.insert(target.args(), out);
        self
    }

    fn sset_calls(&self) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.iter().any(|a| a == "sset"))
            .cloned()
            .collect()
    }
}

impl CommandRunner for ScriptedAmixer {
    fn run(&self, argv: &[String]) -> Result<Vec<String>, CommandError> {
        self.calls.borrow_mut().push(argv.to_vec());
        let fail = |stderr: &str| CommandError::ExitStatus {
            program: argv[0].clone(),
            status: "exit status: 1".into(),
            stderr: stderr.into(),
        };

        let cmd_at = argv
            .iter()
            .position(|a| a == "scontents" || a == "sset")
            .expect("amixer command");
        let target_args = argv[1..cmd_at].to_vec();

        if argv[cmd_at] == "sset" {
            if self.failing_controls.iter().any(|c| argv[cmd_at + 1].starts_with(c)) {
                return Err(fail("Unable to find simple control"));
            }
            return Ok(Vec::new());
        }

        match self.scontents.get(&target_args) {
            Some(Ok(out)) => Ok(out.lines().map(str::to_string).collect()),
            Some(Err(stderr)) => Err(fail(stderr)),
            None => Ok(Vec::new()),
        }
    }
}

fn mixer_report(report: VolumeReport) -> MixerReport {
    match report {
        VolumeReport::Mixer(r) => r,
        other => panic!("expected mixer report, got {other:?}"),
    }
}

fn decision_for(report: &MixerReport, target: usize, name: &str) -> (Percent, bool) {
    let d = report.targets[target]
        .decisions()
        .find(|d| d.control.name == name)
        .unwrap_or_else(|| panic!("no decision for {name}"));
    (d.percent, d.mute)
}

fn linux_controller(amixer: ScriptedAmixer, card: SelectedCard, signals: InMemorySignals) -> VolumeController {
    VolumeController::new(Platform::Linux, Box::new(amixer), Box::new(card), Box::new(signals))
}

#[test]
fn usb_output_short_circuits_and_unmutes_speaker() {
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("selected_output");
    fs::write(&record, "Output 1: USB Audio Device\n").unwrap();
    let codec = dir.path().join("card{card}-codec");
    fs::write(dir.path().join("card1-codec"), "garbage that must not matter\n").unwrap();

    let card_target = OutputTarget::HardwareCard("1".into());
    let amixer = ScriptedAmixer::default().with_target(&card_target, Ok(CARD_SCONTENTS));
    let controller = VolumeController::new(
        Platform::Linux,
        Box::new(amixer.clone()),
        Box::new(FileOutputCardResolver::new(&record)),
        Box::new(FileHeadphoneDetector::new(
            dir.path().join("no-events.log"),
            codec.to_string_lossy(),
        )),
    );

    let report = mixer_report(controller.set_volume(Percent::new(75)));
    assert_eq!(
        report.card,
        SelectedCard {
            index: "1".into(),
            is_usb: true
        }
    );
    assert!(report.headphones.connected);
    assert_eq!(report.headphones.source, SignalSource::UsbOutput);
    assert_eq!(report.targets[0].target, card_target);

    assert_eq!(decision_for(&report, 0, "Speaker"), (Percent::new(75), false));
    assert_eq!(decision_for(&report, 0, "Headphone"), (Percent::new(75), false));
    assert_eq!(decision_for(&report, 0, "Sidetone"), (Percent::MUTED, true));
    assert_eq!(decision_for(&report, 0, "Mic Boost"), (Percent::FULL, false));

    let ssets = amixer.sset_calls();
    assert!(ssets.contains(&vec![
        "amixer".to_string(),
        "-c".into(),
        "1".into(),
        "sset".into(),
        "Speaker,0".into(),
        "75%".into(),
        "unmute".into(),
    ]));
}

#[test]
fn unplugged_event_log_mutes_headphone_on_default_card() {
    let dir = TempDir::new().unwrap();
    let events = dir.path().join("acpi_events.log");
    fs::write(
        &events,
        "jack/headphone HEADPHONE plug\njack/headphone HEADPHONE unplug\nbutton/volumeup VOLUP 00000080 00000000\n",
    )
    .unwrap();
    let codec = dir.path().join("codec");
    fs::write(&codec, "    Conn = 1/8, Color = Green\n  Pin-ctls: 0x00: OUT HP\n").unwrap();

    let amixer = ScriptedAmixer::default().with_target(&OutputTarget::HardwareCard("0".into()), Ok(CARD_SCONTENTS));
    let controller = VolumeController::new(
        Platform::Linux,
        Box::new(amixer),
        Box::new(FileOutputCardResolver::new(dir.path().join("missing_record"))),
        Box::new(FileHeadphoneDetector::new(&events, codec.to_string_lossy())),
    );

    let report = mixer_report(controller.set_volume(Percent::new(50)));
    assert_eq!(report.card, SelectedCard::default());
    assert!(!report.headphones.connected);
    assert_eq!(report.headphones.source, SignalSource::EventLog);
    assert_eq!(decision_for(&report, 0, "Headphone"), (Percent::MUTED, true));
    assert_eq!(decision_for(&report, 0, "Speaker"), (Percent::new(50), false));
    assert_eq!(decision_for(&report, 0, "Mic Boost"), (Percent::FULL, false));
    assert_eq!(decision_for(&report, 0, "Master"), (Percent::new(50), false));
}

#[test]
fn codec_probe_used_when_no_event_log() {
    let signals = InMemorySignals {
        event_log: None,
        codec_dump: Some("    Conn = Analog, Color = Unknown\n    Misc = NO_PRESENCE\n  Pin-ctls: 0x00: VREF_HIZ\n".into()),
    };
    let amixer = ScriptedAmixer::default().with_target(&OutputTarget::HardwareCard("0".into()), Ok(CARD_SCONTENTS));
    let report = mixer_report(linux_controller(amixer, SelectedCard::default(), signals).set_volume(Percent::new(10)));

    assert!(report.headphones.connected);
    assert_eq!(report.headphones.source, SignalSource::CodecProbe);
    assert_eq!(decision_for(&report, 0, "Speaker"), (Percent::MUTED, true));
    assert_eq!(decision_for(&report, 0, "Headphone"), (Percent::new(10), false));
}

#[test]
fn every_playback_control_gets_exactly_one_decision() {
    let amixer = ScriptedAmixer::default().with_target(&OutputTarget::HardwareCard("0".into()), Ok(CARD_SCONTENTS));
    let report = mixer_report(
        linux_controller(amixer.clone(), SelectedCard::default(), InMemorySignals::default())
            .set_volume(Percent::new(25)),
    );
    let names: Vec<_> = report.targets[0].decisions().map(|d| d.control.name.clone()).collect();
    assert_eq!(names, ["Master", "Headphone", "Speaker", "Mic Boost", "Sidetone"]);
    assert_eq!(amixer.sset_calls().len(), 5);
}

#[test]
fn failing_targets_do_not_stop_the_rest() {
    let pulse = OutputTarget::ForcedBackend(SoundServer::Pulse);
    let amixer = ScriptedAmixer {
        failing_controls: vec!["Headphone"],
        ..ScriptedAmixer::default()
    }
    .with_target(&OutputTarget::HardwareCard("0".into()), Ok(CARD_SCONTENTS))
    .with_target(&OutputTarget::DefaultDevice, Err("Mixer attach default error: No such file or directory"))
    .with_target(&pulse, Ok(PULSE_SCONTENTS));

    let report = mixer_report(
        linux_controller(amixer.clone(), SelectedCard::default(), InMemorySignals::default())
            .set_volume(Percent::new(100)),
    );

    let targets: Vec<_> = report.targets.iter().map(|t| t.target.clone()).collect();
    assert_eq!(
        targets,
        [
            OutputTarget::HardwareCard("0".into()),
            OutputTarget::DefaultDevice,
            pulse.clone(),
            OutputTarget::ForcedBackend(SoundServer::Pipewire),
        ]
    );

    assert_eq!(report.targets[0].failures(), 1);
    assert_eq!(report.targets[0].applied.len(), 5);
    assert!(report.targets[1].enumerate_error.is_some());
    assert!(report.targets[1].applied.is_empty());
    assert_eq!(report.targets[2].applied.len(), 1);
    assert_eq!(report.targets[2].applied[0].status, ApplyStatus::Applied);
    assert!(report.targets[3].enumerate_error.is_none());
    assert!(report.targets[3].applied.is_empty());

    let enumerations = amixer
        .calls
        .borrow()
        .iter()
        .filter(|c| c.last().map(String::as_str) == Some("scontents"))
        .count();
    assert_eq!(enumerations, 4);
}

#[test]
fn config_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cfg_path = dir.path().join("config.toml");
    fs::write(
        &cfg_path,
        format!(
            "selected_output_path = {:?}\nevent_log_path = {:?}\nplatform = \"linux\"\n",
            dir.path().join("selected_output"),
            dir.path().join("events.log"),
        ),
    )
    .unwrap();
    fs::write(dir.path().join("selected_output"), "Output 2: HDA Intel PCH\n").unwrap();

    let config = Config::load_or_default(Some(cfg_path.as_path()));
    assert_eq!(config.platform(), Platform::Linux);

    let amixer = ScriptedAmixer::default();
    let controller = VolumeController::from_config(&config, Box::new(amixer.clone()));
    assert_eq!(controller.platform(), Platform::Linux);
    let report = mixer_report(controller.set_volume(Percent::new(50)));

    assert_eq!(report.card.index, "2");
    assert_eq!(report.headphones.source, SignalSource::Fallback);
    assert_eq!(report.targets[0].target, OutputTarget::HardwareCard("2".into()));
    assert!(report.targets.iter().all(|t| t.applied.is_empty()));
}
