//! `leasehub fetch <resource>` – list a CRM collection with retry.

use super::{print_json, report_failure};
use anyhow::Result;
use leasehub_core::api::{ApiClient, Resource};
use leasehub_core::config::LeasehubConfig;
use leasehub_core::logger::Logger;
use leasehub_core::retry::RetryOptions;
use serde_json::Value;
use std::time::Duration;

/// Retry flags that override the `[retry]` config section.
#[derive(Debug, Clone, Default)]
pub struct RetryArgs {
    pub retries: Option<u32>,
    pub delay_ms: Option<u64>,
    pub no_backoff: bool,
}

impl RetryArgs {
    pub fn apply(&self, mut options: RetryOptions) -> RetryOptions {
        if let Some(n) = self.retries {
            options.max_retries = n;
        }
        if let Some(ms) = self.delay_ms {
            options.delay = Duration::from_millis(ms);
        }
        if self.no_backoff {
            options.backoff = false;
        }
        options
    }
}

pub async fn run_fetch(cfg: &LeasehubConfig, logger: &Logger, resource: &str, retry: &RetryArgs) -> Result<()> {
    let resource: Resource = resource.parse()?;
    let client = ApiClient::from_config(cfg)?;
    let options = retry.apply(cfg.retry_options());

    match client.list(resource, &options, logger).await {
        Ok(records) => print_json(&Value::Array(records)),
        Err(failure) => Err(report_failure(logger, &failure, "fetch")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = RetryArgs {
            retries: Some(7),
            delay_ms: Some(50),
            no_backoff: true,
        };
        let opts = args.apply(RetryOptions::default());
        assert_eq!(opts.max_retries, 7);
        assert_eq!(opts.delay, Duration::from_millis(50));
        assert!(!opts.backoff);
    }

    #[test]
    fn no_flags_keep_config() {
        let base = RetryOptions::new(4).with_delay(Duration::from_millis(300));
        assert_eq!(RetryArgs::default().apply(base.clone()), base);
    }
}
