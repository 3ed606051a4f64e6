//! Request and response logging for calls against the cluster API.
//!
//! Request lines and response statuses are logged at info, headers at debug
//! and bodies at trace. Authorization style headers are always redacted.

use crate::constants;
use tracing::{debug, info, trace};

/// Redacts sensitive values from strings
#[must_use]
pub fn redact_sensitive_value(value: &str) -> String {
    if value.is_empty() {
        value.to_string()
    } else {
        "[REDACTED]".to_string()
    }
}

/// Checks if a header name should be redacted
#[must_use]
pub fn should_redact_header(header_name: &str) -> bool {
    let lower = header_name.to_lowercase();
    matches!(
        lower.as_str(),
        constants::HEADER_AUTHORIZATION_LC
            | "proxy-authorization"
            | "cookie"
            | "set-cookie"
            | "x-api-key"
            | "x-auth-token"
    )
}

fn log_headers(label: &str, headers: &reqwest::header::HeaderMap) {
    debug!(target: "drove::client", "{label}:");
    for (name, value) in headers {
        let header_str = name.as_str();
        let display_value = if should_redact_header(header_str) {
            redact_sensitive_value(&String::from_utf8_lossy(value.as_bytes()))
        } else {
            String::from_utf8_lossy(value.as_bytes()).to_string()
        };
        debug!(target: "drove::client", "  {}: {}", header_str, display_value);
    }
}

/// Logs an outgoing request with its default headers
pub fn log_request(method: &str, url: &str, headers: Option<&reqwest::header::HeaderMap>) {
    info!(
        target: "drove::client",
        "→ {} {}",
        method.to_uppercase(),
        url
    );

    if let Some(header_map) = headers {
        log_headers("Request headers", header_map);
    }
}

/// Logs a response status and, when available, its headers and body
pub fn log_response(
    status: u16,
    duration_ms: u128,
    headers: Option<&reqwest::header::HeaderMap>,
    body: Option<&str>,
    max_body_len: usize,
) {
    info!(
        target: "drove::client",
        "← {} ({}ms)",
        status,
        duration_ms
    );

    if let Some(header_map) = headers {
        log_headers("Response headers", header_map);
    }

    let Some(body_content) = body else {
        return;
    };

    if body_content.len() > max_body_len {
        let cut = floor_char_boundary(body_content, max_body_len);
        trace!(
            target: "drove::client",
            "Response body: {} (truncated at {} chars)",
            &body_content[..cut],
            max_body_len
        );
    } else {
        trace!(target: "drove::client", "Response body: {}", body_content);
    }
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut cut = index.min(s.len());
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

/// Gets the maximum body length from `DROVE_LOG_MAX_BODY` environment variable
#[must_use]
pub fn get_max_body_len() -> usize {
    std::env::var(constants::ENV_DROVE_LOG_MAX_BODY)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1000)
}
