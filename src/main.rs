use anyhow::Result;
use audio_route_ctl::utils::command::{CommandRunner, DryRunRunner, SystemCommandRunner};
use audio_route_ctl::{Config, Percent, VolumeController};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "audio-route-ctl", version, about)]
struct Cli {
    /// Target volume in percent.
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    percent: u8,

    /// Config file (default: <config dir>/audio-route-ctl/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log the amixer/osascript commands instead of running them.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref());

    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(SystemCommandRunner)
    };

    let controller = VolumeController::from_config(&config, runner);
    let report = controller.set_volume(Percent::new(cli.percent));
    print!("{report}");
    Ok(())
}
