//! Failure classification and retry.
//!
//! This module maps API client failures to a closed set of error kinds with
//! user-facing messages, and re-runs operations whose failures are transient,
//! with optional exponential backoff between attempts.

mod classify;
mod context;
mod error;
mod handler;
mod policy;
mod run;

pub use classify::{classify, ClassifiedError, Classify};
pub use context::extract_context;
pub use error::{Failure, OtherFailure, TransportFailure, TransportResponse};
pub use handler::handle_error;
pub use policy::{ErrorKind, RetryDecision, RetryOptions, RetryState};
pub use run::{retry, retry_blocking};
