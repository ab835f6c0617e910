use crate::mixer::target::OutputTarget;
use crate::utils::command::{CommandError, CommandRunner};

const CONTROL_HEADER: &str = "Simple mixer control '";
const PLAYBACK_MARKER: &str = "  Playback channels";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerControl {
    pub name: String,
    pub index: u32,
    pub supports_playback: bool,
}

impl MixerControl {
    /// The simple-control id as amixer accepts it (`Master,0`).
    pub fn selector(&self) -> String {
        format!("{},{}", self.name, self.index)
    }
}

pub fn enumerate_args(amixer: &str, target: &OutputTarget) -> Vec<String> {
    let mut argv = vec![amixer.to_string()];
    argv.extend(target.args());
    argv.push("scontents".to_string());
    argv
}

/// Lists playback-capable controls for one target.
pub fn enumerate_controls(
    runner: &dyn CommandRunner,
    amixer: &str,
    target: &OutputTarget,
) -> Result<Vec<MixerControl>, CommandError> {
    let lines = runner.run(&enumerate_args(amixer, target))?;
    Ok(parse_scontents(lines.iter().map(String::as_str)))
}

/// Parses `amixer scontents` output. Controls never followed by a
/// `Playback channels` line (capture-only) are dropped.
pub fn parse_scontents<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<MixerControl> {
    let mut controls = Vec::new();
    let mut current: Option<(String, u32)> = None;

    for line in lines {
        if let Some(rest) = line.strip_prefix(CONTROL_HEADER) {
            current = Some(parse_header(rest));
        } else if line.starts_with(PLAYBACK_MARKER) {
            if let Some((name, index)) = current.take() {
                controls.push(MixerControl {
                    name,
                    index,
                    supports_playback: true,
                });
            }
        }
    }

    controls
}

// `Mic Boost',0` -> ("Mic Boost", 0)
fn parse_header(rest: &str) -> (String, u32) {
    let (quoted, index) = match rest.rsplit_once(',') {
        Some((q, i)) => (q, i.trim().parse().unwrap_or(0)),
        None => (rest, 0),
    };
    let name = quoted.strip_suffix('\'').unwrap_or(quoted);
    (name.to_string(), index)
}
