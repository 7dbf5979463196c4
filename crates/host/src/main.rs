mod app;
mod cli;
mod toast;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use verlofrooster_core::error_handler::{classify_message, report_error, ErrorReport};
use verlofrooster_core::NotificationCenter;

use app::App;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    install_panic_hook();

    let mut notifications = NotificationCenter::new();
    toast::attach(&mut notifications);

    match run(cli, &mut notifications) {
        Ok(code) => code,
        Err(err) => {
            report_error(&mut notifications, &ErrorReport::from_anyhow(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, notifications: &mut NotificationCenter) -> Result<ExitCode> {
    let app = App::connect(&cli, notifications)?;
    app.execute(cli.command, notifications)
}

/// Panics go through the same classification as command errors.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let detail = info.to_string();
        let mut center = NotificationCenter::new();
        toast::attach(&mut center);
        report_error(
            &mut center,
            &ErrorReport::new(classify_message(&detail), detail).with_context("Onverwachte fout"),
        );
    }));
}
