//! Parsed HTTP response model
//!
//! The Data API transport hands back two raw strings: the header block
//! and the body. [`Response::parse`] normalizes both into a header map
//! plus a classified body, and [`Response::validate`] turns an API-level
//! failure into a typed error.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{DomainError, DomainResult, ErrorCode};

/// Key under which the status line is folded into the header map.
///
/// A status line (`HTTP/1.1 200 OK`) has no `key: value` shape, so it
/// travels through header parsing under this synthetic key.
pub const STATUS_HEADER: &str = "Status";

/// Classification of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// The body decoded as JSON.
    Structured,
    /// The body is opaque text.
    Text,
}

/// A response body, already classified.
///
/// The variant is the single source of truth for [`ResponseKind`]: a
/// body is `Json` exactly when it decoded successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Successfully decoded JSON document.
    Json(Value),
    /// Raw body text that did not decode.
    Text(String),
}

/// A normalized HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    headers: BTreeMap<String, String>,
    body: Body,
}

impl Response {
    /// Parses a raw header block and body text into a `Response`.
    #[must_use]
    pub fn parse(header_text: &str, body_text: &str) -> Self {
        Self {
            headers: parse_headers(header_text),
            body: parse_body(body_text),
        }
    }

    /// Returns a header value.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::HeaderNotFound`] when the header is absent
    /// or present with an empty value.
    pub fn header(&self, name: &str) -> DomainResult<&str> {
        self.headers
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DomainError::HeaderNotFound(name.to_string()))
    }

    /// Extracts the numeric HTTP status from the `Status` pseudo-header.
    ///
    /// The status line reads `HTTP/x.x <code> <reason>`; the code is its
    /// second whitespace-delimited token.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedStatus`] when the token is missing
    /// or not numeric, and [`DomainError::HeaderNotFound`] when there is
    /// no status line at all.
    pub fn http_code(&self) -> DomainResult<u16> {
        let status = self.header(STATUS_HEADER)?;
        status
            .split_whitespace()
            .nth(1)
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| DomainError::MalformedStatus(status.to_string()))
    }

    /// Returns the parsed body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the body kind.
    #[must_use]
    pub const fn kind(&self) -> ResponseKind {
        match self.body {
            Body::Json(_) => ResponseKind::Structured,
            Body::Text(_) => ResponseKind::Text,
        }
    }

    /// Returns the body as text, re-serializing a structured body.
    #[must_use]
    pub fn body_text(&self) -> String {
        match &self.body {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text.clone(),
        }
    }

    /// Returns the JSON body, if the response was structured.
    #[must_use]
    pub const fn body_json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// Checks the response for an API-level failure.
    ///
    /// A response fails when its HTTP status is in `[400, 600)`, or when
    /// it is exactly `100` *and* the payload carries an error message.
    /// A bare `100` with no message is informational and passes.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Api`] describing the failure. The payload's
    /// own error code takes precedence over the HTTP status when present.
    pub fn validate(&self) -> DomainResult<()> {
        let code = self.http_code()?;

        if !(400..600).contains(&code) && code != 100 {
            return Ok(());
        }

        if let Some((message, payload_code)) = self.error_signal() {
            return Err(DomainError::Api {
                message,
                code: payload_code.map_or(ErrorCode::Http(code), ErrorCode::Api),
            });
        }

        // A status code 100 with no message is OK.
        if code == 100 {
            return Ok(());
        }

        let mut message = self.body_text();
        if message.is_empty() {
            message = self.header(STATUS_HEADER)?.to_string();
        }

        Err(DomainError::Api {
            message,
            code: ErrorCode::Http(code),
        })
    }

    /// Extracts `messages[0].message` / `messages[0].code` from a
    /// structured error payload.
    fn error_signal(&self) -> Option<(String, Option<String>)> {
        let first = self.body_json()?.get("messages")?.get(0)?;

        let message = match first.get("message")? {
            Value::String(text) if !text.is_empty() => text.clone(),
            Value::Array(parts) if !parts.is_empty() => parts
                .iter()
                .map(|part| match part {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" - "),
            _ => return None,
        };

        let code = match first.get("code") {
            Some(Value::String(code)) if !code.is_empty() => Some(code.clone()),
            Some(Value::Number(code)) => Some(code.to_string()),
            _ => None,
        };

        Some((message, code))
    }
}

/// Parses a raw header block into a key/value map.
///
/// Each line splits on `:`; tokens are trimmed and stripped of quote
/// characters, and lines with an empty first token are dropped. Leading
/// lines without a second token are status lines: their token lands
/// under [`STATUS_HEADER`], last one winning. From the first `key: value`
/// line onward, lines fold into the map with last-write-wins semantics.
fn parse_headers(header_text: &str) -> BTreeMap<String, String> {
    let lines: Vec<Vec<String>> = header_text
        .split('\n')
        .map(|line| {
            line.split(':')
                .map(|token| token.trim().replace('"', ""))
                .collect()
        })
        .filter(|tokens: &Vec<String>| tokens.first().is_some_and(|first| !first.is_empty()))
        .collect();

    let mut headers = BTreeMap::new();
    let mut rest = lines.as_slice();

    while let [tokens, remaining @ ..] = rest {
        if tokens.len() > 1 {
            break;
        }
        if let Some(first) = tokens.first() {
            headers.insert(STATUS_HEADER.to_string(), first.clone());
        }
        rest = remaining;
    }

    for tokens in rest {
        if let [key, value, ..] = tokens.as_slice() {
            if !value.is_empty() {
                headers.insert(key.clone(), value.clone());
            }
        }
    }

    headers
}

/// Classifies a body: JSON when it decodes, text otherwise.
fn parse_body(body_text: &str) -> Body {
    serde_json::from_str(body_text).map_or_else(|_| Body::Text(body_text.to_string()), Body::Json)
}
