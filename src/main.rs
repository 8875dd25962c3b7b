use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use verdant_ask::cli::Cli;
use verdant_ask::events::{JsonLinesSink, TurnEvent};
use verdant_ask::settings::TurnSettings;
use verdant_ask::turn::{self, HttpBackend};

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let settings = TurnSettings::from_cli(cli);
    let mut sink = JsonLinesSink::new(std::io::stdout());

    let backend = match HttpBackend::new(settings.api_config(), settings.streaming) {
        Ok(backend) => backend,
        Err(error) => {
            let _ = sink.emit(&TurnEvent::error(error.to_string()));
            return ExitCode::FAILURE;
        }
    };

    ExitCode::from(turn::execute(&settings, &backend, &mut sink))
}

// Stdout carries the event protocol; diagnostics stay on stderr.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
