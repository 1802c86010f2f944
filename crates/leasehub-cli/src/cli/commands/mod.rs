//! CLI command handlers. Each command is in its own file.

mod classify;
mod config;
mod fetch;
mod get;

pub use classify::{run_classify, ClassifyArgs};
pub use config::run_config;
pub use fetch::{run_fetch, RetryArgs};
pub use get::run_get;

use anyhow::Result;
use leasehub_core::logger::Logger;
use leasehub_core::retry::{handle_error, Failure};
use serde_json::Map;

/// Log an API failure and turn it into the message shown to the user.
pub(crate) fn report_failure(logger: &Logger, failure: &Failure, command: &str) -> anyhow::Error {
    let mut extra = Map::new();
    extra.insert("command".into(), command.into());
    let classified = handle_error(logger, failure, extra);
    anyhow::anyhow!("{}", classified.user_message)
}

pub(crate) fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
