//! Human-facing progress output

use migrator::migration::{MigrationEvent, MigrationEventHandler};
use migrator::{MigrationReport, MigrationState};

/// Stages that print a progress line
const STAGES: [MigrationState; 6] = [
    MigrationState::AuthSource,
    MigrationState::AuthDestination,
    MigrationState::ResolveContent,
    MigrationState::BuildPackage,
    MigrationState::Export,
    MigrationState::Import,
];

pub fn banner(source: &str, destination: &str, content: &str) -> String {
    format!(
        "vra-migrate {}\nMigrating '{}': {} -> {}",
        env!("CARGO_PKG_VERSION"),
        content,
        source,
        destination
    )
}

pub fn stage_line(step: MigrationState) -> String {
    match STAGES.iter().position(|stage| *stage == step) {
        Some(index) => format!("[{}/{}] {}...", index + 1, STAGES.len(), step),
        None => format!("{}...", step),
    }
}

pub fn summary(report: &MigrationReport) -> String {
    format!(
        "Migration complete\n  content:     {} ({})\n  package:     {} ({})\n  source:      {}\n  destination: {}\n  archive:     {} files, {} bytes\n  duration:    {:.1}s",
        report.content.name,
        report.content.id,
        report.package.name,
        report.package.id,
        report.source_host,
        report.destination_host,
        report.archive_files,
        report.archive_bytes,
        report.duration.as_secs_f64()
    )
}

/// Prints one line per stage to stdout, failures to stderr
pub struct ConsoleEventHandler;

impl MigrationEventHandler for ConsoleEventHandler {
    fn handle_event(&self, event: MigrationEvent) {
        match event {
            MigrationEvent::StepBegun { step } => println!("{}", stage_line(step)),
            MigrationEvent::StepCompleted { duration_ms, .. } => {
                println!("      ok ({} ms)", duration_ms)
            }
            MigrationEvent::Warning { message } => eprintln!("warning: {}", message),
            MigrationEvent::Error { step, message } => {
                eprintln!("error during {}: {}", step, message)
            }
            MigrationEvent::Started { .. } | MigrationEvent::Completed { .. } => {}
        }
    }
}
