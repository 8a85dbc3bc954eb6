//! Interactive collection of run inputs missing from the command line

use anyhow::{Context, Result};
use inquire::{Password, Text};

use migrator::MigrationRequest;

use crate::args::Args;

pub const PASSWORD_ENV: &str = "VRA_PASSWORD";

fn value_or_prompt(value: Option<&str>, message: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Text::new(message)
            .prompt()
            .with_context(|| format!("Failed to read '{}'", message.trim_end_matches(':'))),
    }
}

fn password() -> Result<String> {
    match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => Ok(password),
        _ => Password::new("Password:")
            .without_confirmation()
            .prompt()
            .context("Failed to read password"),
    }
}

/// Build the run request, prompting for every value not supplied
pub fn collect_request(args: &Args) -> Result<MigrationRequest> {
    let source = value_or_prompt(args.source.as_deref(), "Source vRA host:")?;
    let destination = value_or_prompt(args.destination.as_deref(), "Destination vRA host:")?;
    let username = value_or_prompt(args.username.as_deref(), "Username:")?;
    let password = password()?;
    let content = value_or_prompt(args.content.as_deref(), "Content name:")?;

    Ok(MigrationRequest::new(source, destination, username, password, content))
}
