//! `leasehub get <path>` – raw GET with the configured retry policy.

use super::{print_json, report_failure};
use anyhow::Result;
use leasehub_core::api::{camelize_keys, ApiClient};
use leasehub_core::config::LeasehubConfig;
use leasehub_core::logger::Logger;

pub async fn run_get(cfg: &LeasehubConfig, logger: &Logger, path: &str) -> Result<()> {
    let client = ApiClient::from_config(cfg)?;
    match client.get_with_retry(path, &cfg.retry_options(), logger).await {
        Ok(body) => print_json(&camelize_keys(body)),
        Err(failure) => Err(report_failure(logger, &failure, "get")),
    }
}
