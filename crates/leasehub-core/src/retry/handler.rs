//! Classify, describe and log a failure in one call.

use super::classify::{classify, ClassifiedError};
use super::context::extract_context;
use super::error::Failure;
use crate::logger::Logger;
use serde_json::{Map, Value};

/// Classifies `failure`, logs it with its extracted context merged with
/// `extra`, and returns the classification for the caller to render.
///
/// Retryable kinds log at warn, everything else at error.
pub fn handle_error(logger: &Logger, failure: &Failure, extra: Map<String, Value>) -> ClassifiedError {
    let classified = classify(failure);
    let mut ctx = extract_context(failure);
    ctx.extend(extra);
    ctx.insert(
        "kind".into(),
        serde_json::to_value(classified.kind).unwrap_or(Value::Null),
    );
    ctx.insert("retryable".into(), Value::Bool(classified.retryable));

    if classified.retryable {
        logger.warn(&classified.message, ctx, Some(failure));
    } else {
        logger.error(&classified.message, ctx, Some(failure));
    }
    classified
}
