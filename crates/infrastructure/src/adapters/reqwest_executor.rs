//! HTTP executor implementation using reqwest.
//!
//! This adapter implements the `HttpExecutor` port using the reqwest
//! library. It handles the actual network round-trip and flattens the
//! response back into the raw header/body text the core parses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode, Url};

use fmdata_application::ports::{HttpExecutor, RawExchange, TransportError, WireBody};
use fmdata_domain::{FileUpload, HttpMethod};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// HTTP executor implementation using reqwest.
///
/// Wraps `reqwest::Client` and implements the `HttpExecutor` port from
/// the application layer. Timeouts live here; the core defines none.
pub struct ReqwestExecutor {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestExecutor {
    /// Creates a new executor with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent("fmdata/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        })
    }

    /// Creates an executor with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Converts the domain `HttpMethod` to a reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Builds the multipart form for a container upload.
    ///
    /// The Data API expects the file under the single field `upload`.
    fn build_multipart(upload: FileUpload) -> Result<Form, TransportError> {
        let mime = upload.mime.clone().unwrap_or_else(|| {
            mime_guess::from_path(&upload.file_name)
                .first_or_octet_stream()
                .to_string()
        });

        let part = Part::bytes(upload.content)
            .file_name(upload.file_name)
            .mime_str(&mime)
            .map_err(|e| TransportError::Body(format!("invalid MIME type: {e}")))?;

        Ok(Form::new().part("upload", part))
    }

    /// Flattens status and headers back into a raw header block.
    ///
    /// The synthetic `Status` line carries the status code through the
    /// same parsing path as the real headers.
    fn raw_header_text(status: StatusCode, headers: &HeaderMap) -> String {
        let mut text = String::new();

        for (name, value) in headers {
            text.push_str(name.as_str());
            text.push_str(": ");
            text.push_str(value.to_str().unwrap_or("<binary>"));
            text.push('\n');
        }

        text.push_str(&format!(
            "Status: HTTP/1.1 {} {}\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ));

        text
    }

    /// Maps reqwest errors to the port's `TransportError`.
    fn map_error(error: reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            let port = error.url().and_then(Url::port);

            return Self::classify_connect_error(error.to_string(), host, port);
        }

        if error.is_redirect() {
            return TransportError::Other("too many redirects".to_string());
        }

        TransportError::Other(error.to_string())
    }

    /// Classifies a connect failure by its message text.
    ///
    /// Reqwest reports DNS and refused-connection failures only through
    /// the error message, so the classification is textual.
    fn classify_connect_error(message: String, host: String, port: Option<u16>) -> TransportError {
        let lowered = message.to_lowercase();

        if lowered.contains("dns") || lowered.contains("resolve") {
            return TransportError::Dns { host, message };
        }

        if lowered.contains("refused") {
            return TransportError::ConnectionRefused {
                host,
                port: port.unwrap_or(443),
            };
        }

        TransportError::ConnectionFailed(message)
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
        body: WireBody,
    ) -> Result<RawExchange, TransportError> {
        let parsed_url =
            Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{e}: {url}")))?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(method), parsed_url)
            .timeout(Duration::from_millis(self.timeout_ms));

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        builder = match body {
            WireBody::Empty => builder,
            WireBody::Json(content) => builder.body(content),
            WireBody::Multipart(upload) => builder.multipart(Self::build_multipart(upload)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(e, self.timeout_ms))?;

        let status = response.status();
        let header_text = Self::raw_header_text(status, response.headers());

        let body_text = response
            .text()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?;

        Ok(RawExchange {
            header_text,
            body_text,
        })
    }
}
