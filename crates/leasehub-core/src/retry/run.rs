//! Retry loop: run an operation until success or the options say stop.

use super::classify::{ClassifiedError, Classify};
use super::policy::{RetryDecision, RetryOptions, RetryState};
use crate::logger::Logger;
use serde_json::{Map, Value};
use std::future::Future;
use std::time::Duration;

/// Runs `operation` until it succeeds or the retry options say to stop.
///
/// The error returned on give-up is the last one the operation produced.
/// Sleeps on the tokio timer between attempts; no delay before the first.
pub async fn retry<T, E, F, Fut>(
    options: &RetryOptions,
    logger: &Logger,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify,
{
    let mut state = RetryState::new(options);
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => match next_step(&mut state, &e, logger) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(e),
            },
        }
    }
}

/// Blocking counterpart of [`retry`] for code running off the async runtime.
pub fn retry_blocking<T, E, F>(options: &RetryOptions, logger: &Logger, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Classify,
{
    let mut state = RetryState::new(options);
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) => match next_step(&mut state, &e, logger) {
                Some(delay) => std::thread::sleep(delay),
                None => return Err(e),
            },
        }
    }
}

/// Classifies `err`, logs the decision and returns the delay before the next attempt.
fn next_step<E: Classify>(state: &mut RetryState<'_>, err: &E, logger: &Logger) -> Option<Duration> {
    let classified = err.classify();
    let attempt = state.attempt() + 1;
    let decision = state.on_failure(classified.kind);
    let mut ctx = attempt_context(&classified, attempt);
    match decision {
        RetryDecision::RetryAfter(delay) => {
            ctx.insert("delayMs".into(), Value::from(delay.as_millis() as u64));
            logger.warn(
                &format!("attempt {} failed, retrying in {:?}", attempt, delay),
                ctx,
                Some(&classified.original_error),
            );
            Some(delay)
        }
        RetryDecision::Exhausted => {
            logger.error(
                &format!("giving up after {} attempts", attempt),
                ctx,
                Some(&classified.original_error),
            );
            None
        }
        RetryDecision::NoRetry => {
            logger.debug(
                &format!("attempt {} failed with non-retryable {:?} error", attempt, classified.kind),
                ctx,
            );
            None
        }
    }
}

fn attempt_context(classified: &ClassifiedError, attempt: u32) -> Map<String, Value> {
    let mut ctx = Map::new();
    ctx.insert("attempt".into(), Value::from(attempt));
    ctx.insert("kind".into(), serde_json::to_value(classified.kind).unwrap_or(Value::Null));
    if let Some(code) = classified.status_code {
        ctx.insert("statusCode".into(), Value::from(code));
    }
    ctx
}
