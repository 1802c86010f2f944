//! curl-backed JSON client for the CRM backend.
//!
//! Every outcome that is not a 2xx JSON body is turned into a [`Failure`]
//! right here, so callers never probe error shapes.

use crate::config::LeasehubConfig;
use crate::logger::Logger;
use crate::retry::{retry, Failure, RetryOptions};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::str;
use std::time::Duration;
use url::Url;

/// Connect phase never waits longer than this, even with a longer request timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    timeout: Duration,
    token: Option<String>,
}

/// Status, reason phrase and raw body of a completed transfer.
struct RawResponse {
    status: u16,
    status_text: String,
    body: Vec<u8>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url).with_context(|| format!("invalid base URL: {}", base_url))?;
        // Paths are joined relative to the base, so keep any prefix like `/v1/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            timeout,
            token: None,
        })
    }

    pub fn from_config(cfg: &LeasehubConfig) -> Result<Self> {
        let client = Self::new(&cfg.api_base_url, cfg.request_timeout())?;
        Ok(match &cfg.api_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path (e.g. `/api/leads`) against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, Failure> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Failure::other(format!("invalid request path {:?}: {}", path, e)))
    }

    /// Perform one request and decode the JSON body.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, Failure> {
        let url = self.url_for(path)?.to_string();
        let payload = match body {
            Some(v) => Some(serde_json::to_vec(v).map_err(|e| Failure::from_error(&e))?),
            None => None,
        };
        let timeout = self.timeout;
        let token = self.token.clone();
        tracing::debug!("{} {}", method, url);

        let joined = tokio::task::spawn_blocking(move || {
            let raw = transfer(method, &url, payload.as_deref(), timeout, token.as_deref())
                .map_err(|e| {
                    let code = curl_code(&e);
                    Failure::no_response(method.as_str(), url.as_str(), Some(code.as_str()), e.to_string())
                })?;
            decode(method, &url, raw)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => Err(Failure::from_error(&e)),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, Failure> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, Failure> {
        self.request(Method::Post, path, Some(body)).await
    }

    /// GET with the retry driver around it.
    pub async fn get_with_retry(
        &self,
        path: &str,
        options: &RetryOptions,
        logger: &Logger,
    ) -> Result<Value, Failure> {
        retry(options, logger, || self.get(path)).await
    }
}

fn transfer(
    method: Method,
    url: &str,
    body: Option<&[u8]>,
    timeout: Duration,
    token: Option<&str>,
) -> Result<RawResponse, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.custom_request(method.as_str())?;
    easy.follow_location(true)?;
    easy.connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))?;
    easy.timeout(timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Accept: application/json")?;
    if let Some(token) = token {
        list.append(&format!("Authorization: Bearer {}", token))?;
    }
    if let Some(body) = body {
        list.append("Content-Type: application/json")?;
        easy.post_fields_copy(body)?;
    }
    easy.http_headers(list)?;

    let mut status_line = String::new();
    let mut data = Vec::new();
    {
        let mut transfer = easy.transfer();
        // Redirects produce several status lines; the last one wins.
        transfer.header_function(|h| {
            if let Ok(s) = str::from_utf8(h) {
                if s.starts_with("HTTP/") {
                    status_line = s.trim_end().to_string();
                }
            }
            true
        })?;
        transfer.write_function(|d| {
            data.extend_from_slice(d);
            Ok(d.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()? as u16;
    Ok(RawResponse {
        status,
        status_text: reason_phrase(&status_line).to_string(),
        body: data,
    })
}

fn decode(method: Method, url: &str, raw: RawResponse) -> Result<Value, Failure> {
    if !(200..300).contains(&raw.status) {
        let data = (!raw.body.is_empty()).then(|| {
            serde_json::from_slice(&raw.body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&raw.body).into_owned()))
        });
        return Err(Failure::http_status(method.as_str(), url, raw.status, raw.status_text, data));
    }
    if raw.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&raw.body)
        .map_err(|e| Failure::other(format!("invalid JSON from {} {}: {}", method, url, e)))
}

/// `HTTP/1.1 404 Not Found` -> `Not Found`. Empty for HTTP/2 status lines.
fn reason_phrase(status_line: &str) -> &str {
    status_line.splitn(3, ' ').nth(2).unwrap_or("").trim()
}

/// Map a curl error to the short code the classifier understands.
fn curl_code(e: &curl::Error) -> String {
    if e.is_operation_timedout() {
        "ETIMEDOUT".to_string()
    } else if e.is_couldnt_connect() {
        "ECONNREFUSED".to_string()
    } else if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        "ENOTFOUND".to_string()
    } else if e.is_recv_error() || e.is_send_error() || e.is_got_nothing() || e.is_read_error() {
        "ECONNRESET".to_string()
    } else {
        format!("CURLE_{}", e.code())
    }
}
