use clap::Parser;
use dotenv::dotenv;
use std::process::ExitCode;
use taskboard::app_env::Settings;
use taskboard::cli::commands::Outcome;
use taskboard::cli::{self, Cli};
use taskboard::logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let args = Cli::parse();

    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Invalid configuration: {err:#}");
            return ExitCode::from(78);
        }
    };
    args.apply_overrides(&mut settings);

    let env_filter = match logging::init_env_filter() {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("Invalid log configuration: {err:#}");
            return ExitCode::from(78);
        }
    };
    let otel_exporters = match &settings.otel {
        Some(endpoints) => match logging::init_exporters(&endpoints.traces, &endpoints.metrics) {
            Ok(exporters) => Some(exporters),
            Err(err) => {
                eprintln!("OpenTelemetry export disabled: {err:#}");
                None
            }
        },
        None => None,
    };
    logging::setup_logging_and_tracing(env_filter, otel_exporters.as_ref());

    let outcome = cli::run(args.command, &settings, &mut std::io::stdout().lock()).await;

    if let Some(exporters) = otel_exporters {
        exporters.shutdown();
    }

    match outcome {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Ok(Outcome::LoginRequired) => ExitCode::from(2),
        Err(err) => {
            error!("Command failed: {err:#}");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
