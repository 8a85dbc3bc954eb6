use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use migrator::services::config::{MigrationConfig, DEFAULT_TENANT};

/// Migrate a content item between two vRealize Automation appliances
#[derive(Parser, Debug)]
#[command(name = "vra-migrate", version, about)]
pub struct Args {
    /// Source appliance host
    #[arg(long)]
    pub source: Option<String>,

    /// Destination appliance host
    #[arg(long)]
    pub destination: Option<String>,

    /// User authenticated on both appliances
    #[arg(long)]
    pub username: Option<String>,

    /// Name of the content item to migrate (case-sensitive)
    #[arg(long)]
    pub content: Option<String>,

    #[arg(long, env = "VRA_TENANT", default_value = DEFAULT_TENANT)]
    pub tenant: String,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Base directory for per-run scratch space (defaults to the current directory)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Listings performed while waiting for the new package to appear
    #[arg(long, default_value_t = 5)]
    pub package_lookup_attempts: u32,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn config(&self) -> MigrationConfig {
        let mut config = MigrationConfig::default();
        config.http.timeout = Duration::from_secs(self.timeout_secs);
        config.http.accept_invalid_certs = self.insecure;
        config.retry.package_lookup_attempts = self.package_lookup_attempts;
        config.tenant = self.tenant.clone();
        if let Some(dir) = &self.work_dir {
            config.base_dir = dir.clone();
        }
        config
    }

    /// Default filter directive when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
