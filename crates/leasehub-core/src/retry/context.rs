//! Structured diagnostic fields for logging a failure.

use crate::retry::error::Failure;
use serde_json::{Map, Value};

/// Flat record of what is known about a failure. Fields that cannot be
/// derived are omitted rather than set to null.
pub fn extract_context(failure: &Failure) -> Map<String, Value> {
    let mut ctx = Map::new();
    match failure {
        Failure::Transport(t) => {
            ctx.insert("url".into(), Value::String(t.url.clone()));
            ctx.insert("method".into(), Value::String(t.method.clone()));
            if let Some(resp) = &t.response {
                ctx.insert("statusCode".into(), Value::from(resp.status));
                if !resp.status_text.is_empty() {
                    ctx.insert("statusText".into(), Value::String(resp.status_text.clone()));
                }
                if let Some(data) = &resp.data {
                    ctx.insert("responseData".into(), data.clone());
                }
            }
            if let Some(code) = &t.code {
                ctx.insert("code".into(), Value::String(code.clone()));
            }
            ctx.insert("message".into(), Value::String(t.message.clone()));
        }
        Failure::Other(o) => {
            ctx.insert("message".into(), Value::String(o.message.clone()));
            if let Some(stack) = &o.stack {
                ctx.insert("stack".into(), Value::String(stack.clone()));
            }
        }
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_fields() {
        let f = Failure::http_status(
            "POST",
            "http://api.test/api/leads",
            422,
            "Unprocessable Entity",
            Some(json!({"detail": "bad"})),
        );
        let ctx = extract_context(&f);
        assert_eq!(ctx["url"], "http://api.test/api/leads");
        assert_eq!(ctx["method"], "POST");
        assert_eq!(ctx["statusCode"], 422);
        assert_eq!(ctx["statusText"], "Unprocessable Entity");
        assert_eq!(ctx["responseData"], json!({"detail": "bad"}));
        assert_eq!(ctx["message"], "Request failed with status code 422");
        assert!(!ctx.contains_key("stack"));
    }

    #[test]
    fn no_response_omits_status_fields() {
        let f = Failure::no_response("GET", "http://api.test/api/bots", Some("ETIMEDOUT"), "timed out");
        let ctx = extract_context(&f);
        assert!(!ctx.contains_key("statusCode"));
        assert!(!ctx.contains_key("responseData"));
        assert_eq!(ctx["code"], "ETIMEDOUT");
        assert_eq!(ctx["url"], "http://api.test/api/bots");
    }

    #[test]
    fn other_failure_message_and_stack() {
        let f = Failure::Other(crate::retry::error::OtherFailure {
            message: "boom".into(),
            stack: Some("at render".into()),
        });
        let ctx = extract_context(&f);
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx["message"], "boom");
        assert_eq!(ctx["stack"], "at render");
    }
}
