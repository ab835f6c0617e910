use std::fmt;

use crate::data::config::Config;
use crate::device::headphones::{FileHeadphoneDetector, HeadphoneDetector, HeadphoneState};
use crate::device::output_card::{FileOutputCardResolver, OutputCardResolver, SelectedCard};
use crate::mixer::apply::{apply_all, AppliedDecision, ApplyStatus};
use crate::mixer::enumerate::enumerate_controls;
use crate::mixer::policy::{decide_all, Percent, VolumeDecision};
use crate::mixer::target::OutputTarget;
use crate::platform::Platform;
use crate::utils::command::{find_executable, CommandRunner};

const ENV_AMIXER: &str = "AUDIO_ROUTE_CTL_AMIXER";
const ENV_OSASCRIPT: &str = "AUDIO_ROUTE_CTL_OSASCRIPT";

/// What one `set_volume` call did. Purely observational; nothing in here is an error
/// the caller has to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeReport {
    Mixer(MixerReport),
    Native(Vec<NativeCall>),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerReport {
    pub card: SelectedCard,
    pub headphones: HeadphoneState,
    pub targets: Vec<TargetReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: OutputTarget,
    /// Set when listing controls failed; the target then has no decisions.
    pub enumerate_error: Option<String>,
    pub applied: Vec<AppliedDecision>,
}

impl TargetReport {
    pub fn decisions(&self) -> impl Iterator<Item = &VolumeDecision> {
        self.applied.iter().map(|a| &a.decision)
    }

    pub fn failures(&self) -> usize {
        self.applied
            .iter()
            .filter(|a| matches!(a.status, ApplyStatus::Failed(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCall {
    pub argv: Vec<String>,
    pub error: Option<String>,
}

pub struct VolumeController {
    platform: Platform,
    runner: Box<dyn CommandRunner>,
    cards: Box<dyn OutputCardResolver>,
    headphones: Box<dyn HeadphoneDetector>,
    amixer: String,
    osascript: String,
}

impl VolumeController {
    pub fn new(
        platform: Platform,
        runner: Box<dyn CommandRunner>,
        cards: Box<dyn OutputCardResolver>,
        headphones: Box<dyn HeadphoneDetector>,
    ) -> Self {
        Self {
            platform,
            runner,
            cards,
            headphones,
            amixer: "amixer".to_string(),
            osascript: "osascript".to_string(),
        }
    }

    /// File-backed resolvers at the configured locations.
    pub fn from_config(config: &Config, runner: Box<dyn CommandRunner>) -> Self {
        let cards = FileOutputCardResolver::new(&config.selected_output_path);
        let headphones =
            FileHeadphoneDetector::new(&config.event_log_path, config.codec_dump_template.clone());
        let mut controller = Self::new(config.platform(), runner, Box::new(cards), Box::new(headphones));
        controller.amixer = find_executable(&config.amixer, ENV_AMIXER)
            .to_string_lossy()
            .into_owned();
        controller.osascript = find_executable(&config.osascript, ENV_OSASCRIPT)
            .to_string_lossy()
            .into_owned();
        controller
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Sets output volume everywhere it plausibly applies. Never fails; at worst
    /// nothing changes.
    pub fn set_volume(&self, percent: Percent) -> VolumeReport {
        match self.platform {
            Platform::Linux => VolumeReport::Mixer(self.set_mixer_volume(percent)),
            Platform::MacOs => VolumeReport::Native(self.set_native_volume(percent)),
            Platform::Unsupported => {
                log::debug!("volume control not supported on this platform");
                VolumeReport::Unsupported
            }
        }
    }

    fn set_mixer_volume(&self, percent: Percent) -> MixerReport {
        let card = self.cards.resolve();
        let headphones = self.headphones.detect(&card);
        log::info!(
            "card {} (usb: {}), headphones {} via {:?}",
            card.index,
            card.is_usb,
            if headphones.connected { "connected" } else { "disconnected" },
            headphones.source
        );

        // Sequential on purpose: the targets may share one physical device.
        let targets = OutputTarget::all_for(&card)
            .into_iter()
            .map(|target| self.apply_target(target, &card, headphones, percent))
            .collect();

        MixerReport {
            card,
            headphones,
            targets,
        }
    }

    fn apply_target(
        &self,
        target: OutputTarget,
        card: &SelectedCard,
        headphones: HeadphoneState,
        percent: Percent,
    ) -> TargetReport {
        let controls = match enumerate_controls(&*self.runner, &self.amixer, &target) {
            Ok(controls) => controls,
            Err(e) => {
                log::warn!("{target}: listing controls failed: {e}");
                return TargetReport {
                    target,
                    enumerate_error: Some(e.to_string()),
                    applied: Vec::new(),
                };
            }
        };

        let decisions = decide_all(&target, controls, card.is_usb, headphones.connected, percent);
        let applied = apply_all(&*self.runner, &self.amixer, decisions);
        TargetReport {
            target,
            enumerate_error: None,
            applied,
        }
    }

    fn set_native_volume(&self, percent: Percent) -> Vec<NativeCall> {
        let scripts = [
            format!("set volume output volume {} without output muted", percent.get()),
            "set volume alert volume 100".to_string(),
        ];
        scripts
            .into_iter()
            .map(|script| {
                let argv = vec![self.osascript.clone(), "-e".to_string(), script];
                let error = match self.runner.run(&argv) {
                    Ok(_) => None,
                    Err(e) => {
                        log::warn!("osascript failed: {e}");
                        Some(e.to_string())
                    }
                };
                NativeCall { argv, error }
            })
            .collect()
    }
}

impl fmt::Display for VolumeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeReport::Mixer(report) => {
                writeln!(
                    f,
                    "card {}{}, headphones {} ({:?})",
                    report.card.index,
                    if report.card.is_usb { " [usb]" } else { "" },
                    if report.headphones.connected { "connected" } else { "disconnected" },
                    report.headphones.source
                )?;
                for t in &report.targets {
                    if let Some(e) = &t.enumerate_error {
                        writeln!(f, "  {}: unavailable ({e})", t.target)?;
                        continue;
                    }
                    write!(f, "  {}: {} control(s)", t.target, t.applied.len())?;
                    let failed = t.failures();
                    if failed > 0 {
                        write!(f, ", {failed} failed")?;
                    }
                    writeln!(f)?;
                    for d in t.decisions() {
                        let state = if d.mute { "mute" } else { "unmute" };
                        writeln!(f, "    {} {} {state}", d.control.name, d.percent)?;
                    }
                }
                Ok(())
            }
            VolumeReport::Native(calls) => {
                for c in calls {
                    match &c.error {
                        None => writeln!(f, "{}", c.argv.join(" "))?,
                        Some(e) => writeln!(f, "{} (failed: {e})", c.argv.join(" "))?,
                    }
                }
                Ok(())
            }
            VolumeReport::Unsupported => writeln!(f, "volume control is not supported on this platform"),
        }
    }
}
