use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty argument vector")]
    Empty,
    #[error("spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Runs an argument vector to completion and hands back stdout split into lines.
pub trait CommandRunner {
    fn run(&self, argv: &[String]) -> Result<Vec<String>, CommandError>;
}

pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, argv: &[String]) -> Result<Vec<String>, CommandError> {
        let (program, args) = argv.split_first().ok_or(CommandError::Empty)?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CommandError::ExitStatus {
                program: program.clone(),
                status: output.status.to_string(),
                stderr: stderr.lines().next().unwrap_or_default().trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(str::to_string).collect())
    }
}

/// Logs what would run and pretends it produced nothing.
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, argv: &[String]) -> Result<Vec<String>, CommandError> {
        if argv.is_empty() {
            return Err(CommandError::Empty);
        }
        log::info!("dry-run: {}", argv.join(" "));
        Ok(Vec::new())
    }
}

/// Resolution order: env var override, then the configured name (looked up on PATH).
pub fn find_executable(configured: &str, env_var: &str) -> PathBuf {
    if let Some(p) = std::env::var_os(env_var) {
        let p = PathBuf::from(p);
        if p.is_file() {
            return p;
        }
        log::warn!("{env_var}={} is not a file; ignoring", p.display());
    }
    PathBuf::from(configured)
}
