mod args;
mod console;
mod prompt;

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use migrator::migration::{CompositeEventHandler, LoggingEventHandler};
use migrator::services::client::VraClient;
use migrator::services::MigrationError;
use migrator::MigrationOrchestrator;

use crate::args::Args;
use crate::console::ConsoleEventHandler;

const EXIT_FAILURE: u8 = 1;
const EXIT_INVALID_CONFIG: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.config();
    if let Err(message) = config.validate() {
        eprintln!("error: invalid configuration: {}", message);
        return ExitCode::from(EXIT_INVALID_CONFIG);
    }

    let request = match prompt::collect_request(&args) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(EXIT_INVALID_CONFIG);
        }
    };
    if let Err(message) = request.validate() {
        eprintln!("error: invalid configuration: {}", message);
        return ExitCode::from(EXIT_INVALID_CONFIG);
    }

    let client = match VraClient::new(&config.http) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    println!(
        "{}",
        console::banner(&request.source_host, &request.destination_host, &request.content_name)
    );
    info!("Working directory base: {}", config.base_dir.display());

    let events = CompositeEventHandler::new()
        .with_handler(ConsoleEventHandler)
        .with_handler(LoggingEventHandler);
    let mut orchestrator =
        MigrationOrchestrator::new(Arc::new(client), config).with_event_handler(events);

    match orchestrator.run(&request).await {
        Ok(report) => {
            println!("{}", console::summary(&report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            eprintln!("Migration failed during {}", e.stage());
            if let Some(status) = e.status() {
                eprintln!("  HTTP status: {}", status);
            }
            eprintln!("  {}", e);
            match e {
                MigrationError::Configuration { .. } => ExitCode::from(EXIT_INVALID_CONFIG),
                _ => ExitCode::from(EXIT_FAILURE),
            }
        }
    }
}
