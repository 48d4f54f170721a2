//! Request marshaling and dispatch
//!
//! [`RequestSender`] owns the base URL and the executor port. It turns
//! a method, path and [`RequestOptions`] into one wire request, and a
//! raw exchange into a validated [`Response`].

use std::sync::Arc;

use url::Url;

use fmdata_domain::{HttpMethod, OptionMap, OptionValue, Payload, RequestOptions, Response};

use crate::error::{ClientResult, Error};
use crate::ports::{HttpExecutor, TransportError, WireBody};

/// Sends marshaled requests through the executor port.
pub struct RequestSender {
    executor: Arc<dyn HttpExecutor>,
    base_url: String,
}

impl RequestSender {
    /// Creates a sender for the given API base URL.
    pub fn new(executor: Arc<dyn HttpExecutor>, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
        }
    }

    /// Performs one request and returns the validated response.
    ///
    /// The call is atomic from the caller's point of view: exactly one
    /// round-trip, one parse and one validation happen before either
    /// the response or the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the executor fails and
    /// [`Error::Domain`] when the response signals an API-level error.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<Response> {
        let full = format!("{}{path}", self.base_url);
        let mut url =
            Url::parse(&full).map_err(|e| TransportError::InvalidUrl(format!("{e}: {full}")))?;

        if !options.query.is_empty() {
            let pairs: Vec<(&str, String)> = options
                .query
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_query_string()))
                .collect();
            let query = serde_urlencoded::to_string(&pairs)
                .map_err(|e| TransportError::Body(e.to_string()))?;
            if !query.is_empty() {
                url.set_query(Some(&query));
            }
        }

        let body = match (&options.payload, method) {
            (Payload::Json(map), m) if m != HttpMethod::Get => WireBody::Json(encode_json_body(map)),
            (Payload::File(upload), HttpMethod::Post) => WireBody::Multipart(upload.clone()),
            _ => WireBody::Empty,
        };

        let mut headers = options.headers;
        let has_content_type = headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("content-type") && !value.is_empty());
        if matches!(body, WireBody::Multipart(_)) {
            // The adapter owns the multipart boundary.
            headers.retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
        } else if !has_content_type {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        let header_list: Vec<(String, String)> = headers.into_iter().collect();
        let exchange = self
            .executor
            .execute(method, url.as_str(), &header_list, body)
            .await
            .map_err(Error::Transport)?;

        let response = Response::parse(&exchange.header_text, &exchange.body_text);
        response.validate()?;

        Ok(response)
    }
}

/// Assembles a JSON body from a flat option map.
///
/// A `Text` value that is itself a valid JSON document is embedded
/// verbatim; this is how pre-serialized documents (`fieldData`,
/// `query`, `sort`) end up nested instead of double-encoded. Any other
/// text is JSON-encoded, and integers are embedded as numbers.
fn encode_json_body(map: &OptionMap) -> String {
    let fragments: Vec<String> = map
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                OptionValue::Int(int) => int.to_string(),
                OptionValue::Text(text) => {
                    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
                        text.clone()
                    } else {
                        serde_json::Value::String(text.clone()).to_string()
                    }
                }
            };
            format!("{}:{rendered}", serde_json::Value::String(key.clone()))
        })
        .collect();

    format!("{{{}}}", fragments.join(","))
}
