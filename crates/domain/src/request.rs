//! Request option containers

use std::collections::BTreeMap;

use crate::options::OptionMap;

/// HTTP methods used by the Data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Returns the method name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file destined for a container field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name reported in the multipart part.
    pub file_name: String,
    /// Raw file content.
    pub content: Vec<u8>,
    /// MIME type; guessed from the file name when absent.
    pub mime: Option<String>,
}

impl FileUpload {
    /// Creates an upload with no explicit MIME type.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            mime: None,
        }
    }
}

/// The request payload.
///
/// JSON and file payloads are mutually exclusive; the variant makes the
/// combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    /// No body.
    #[default]
    None,
    /// A JSON body assembled from a flat option map.
    Json(OptionMap),
    /// A multipart file upload.
    File(FileUpload),
}

/// Per-call request options, built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestOptions {
    /// Extra headers for this call.
    pub headers: BTreeMap<String, String>,
    /// Query-string parameters.
    pub query: OptionMap,
    /// Request payload.
    pub payload: Payload,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn query(mut self, query: OptionMap) -> Self {
        self.query = query;
        self
    }

    /// Sets a JSON payload.
    #[must_use]
    pub fn json(mut self, body: OptionMap) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    /// Sets a file payload.
    #[must_use]
    pub fn file(mut self, upload: FileUpload) -> Self {
        self.payload = Payload::File(upload);
        self
    }
}
