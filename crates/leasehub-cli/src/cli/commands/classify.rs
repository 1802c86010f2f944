//! `leasehub classify` – show how a failure would be classified.

use super::print_json;
use anyhow::Result;
use leasehub_core::retry::{classify, extract_context, Failure};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default)]
pub struct ClassifyArgs {
    pub status: Option<u16>,
    pub body: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
    pub plain: bool,
}

/// Build the failure described by the command-line flags.
pub fn failure_from_args(args: &ClassifyArgs) -> Failure {
    if args.plain {
        return Failure::other(args.message.clone().unwrap_or_else(|| "Error".to_string()));
    }
    match args.status {
        Some(status) => {
            let data = args
                .body
                .as_deref()
                .map(|b| serde_json::from_str(b).unwrap_or_else(|_| Value::String(b.to_string())));
            let mut failure = Failure::http_status("GET", "", status, "", data);
            if let (Failure::Transport(t), Some(msg)) = (&mut failure, &args.message) {
                t.message = msg.clone();
            }
            failure
        }
        None => Failure::no_response(
            "GET",
            "",
            args.code.as_deref(),
            args.message.clone().unwrap_or_else(|| "Network Error".to_string()),
        ),
    }
}

pub fn run_classify(args: &ClassifyArgs) -> Result<()> {
    let failure = failure_from_args(args);
    let classified = classify(&failure);
    print_json(&json!({
        "kind": classified.kind,
        "retryable": classified.retryable,
        "statusCode": classified.status_code,
        "userMessage": classified.user_message,
        "message": classified.message,
        "context": extract_context(&failure),
    }))
}
