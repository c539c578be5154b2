use std::path::Path;
use std::process::ExitCode;

use mediafetch_core::models::settings::Settings;
use mediafetch_core::Fetcher;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod commands;
pub mod storage;

pub struct AppState {
    pub settings: Settings,
    pub fetcher: Fetcher,
}

impl AppState {
    pub fn new(settings: Settings, root: &Path) -> anyhow::Result<Self> {
        let fetcher = Fetcher::from_settings(&settings, root)?;
        Ok(Self { settings, fetcher })
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run(cli: cli::Cli) -> ExitCode {
    init_tracing(&cli.log_level);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
