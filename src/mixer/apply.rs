use crate::mixer::policy::VolumeDecision;
use crate::utils::command::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    Applied,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDecision {
    pub decision: VolumeDecision,
    pub status: ApplyStatus,
}

pub fn apply_args(amixer: &str, decision: &VolumeDecision) -> Vec<String> {
    let mut argv = vec![amixer.to_string()];
    argv.extend(decision.target.args());
    argv.push("sset".to_string());
    argv.push(decision.control.selector());
    argv.push(decision.percent.to_string());
    argv.push(if decision.mute { "mute" } else { "unmute" }.to_string());
    argv
}

/// Applies every decision; a failing control is logged and the rest still run.
pub fn apply_all(
    runner: &dyn CommandRunner,
    amixer: &str,
    decisions: Vec<VolumeDecision>,
) -> Vec<AppliedDecision> {
    decisions
        .into_iter()
        .map(|decision| {
            let status = match runner.run(&apply_args(amixer, &decision)) {
                Ok(_) => {
                    log::debug!(
                        "{}: {} -> {} {}",
                        decision.target,
                        decision.control.name,
                        decision.percent,
                        if decision.mute { "muted" } else { "unmuted" }
                    );
                    ApplyStatus::Applied
                }
                Err(e) => {
                    log::warn!("{}: set {} failed: {e}", decision.target, decision.control.name);
                    ApplyStatus::Failed(e.to_string())
                }
            };
            AppliedDecision { decision, status }
        })
        .collect()
}
