//! Data API session client
//!
//! [`DataApiClient`] is the public surface: it owns the bearer token,
//! builds the per-call option maps, and extracts the documented field
//! from each validated response.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use fmdata_domain::{
    FileUpload, HttpMethod, ListOptions, OptionMap, OptionValue, PortalDirective, QueryPredicate,
    RequestOptions, Response, ScriptDirective, field_data, list_options, portal_data,
    portal_options, query_options, script_options,
};

use crate::error::{ClientResult, Error};
use crate::ports::HttpExecutor;
use crate::sender::RequestSender;

/// Credentials available to a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    /// No credentials; only a pre-existing token can authenticate.
    #[default]
    None,
    /// Username and password for Basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// An OAuth request previously negotiated with the server.
    OAuth {
        /// OAuth request id.
        request_id: String,
        /// OAuth identifier.
        identifier: String,
    },
}

impl Credentials {
    /// Returns true when a login is possible.
    ///
    /// Both parts of a credential pair must be non-empty.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self {
            Self::None => false,
            Self::Basic { username, password } => !username.is_empty() && !password.is_empty(),
            Self::OAuth {
                request_id,
                identifier,
            } => !request_id.is_empty() && !identifier.is_empty(),
        }
    }
}

/// Session configuration.
///
/// `credentials` and `token` default to empty; construction requires at
/// least one of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// API base URL, up to and excluding `/v1`.
    pub base_url: String,
    /// Database the session is bound to.
    pub database: String,
    /// Login credentials, if any.
    pub credentials: Credentials,
    /// Pre-existing session token, if any.
    pub token: Option<String>,
}

/// A client for one logical Data API session.
///
/// The token is the only mutable state and is guarded by a lock, so
/// calls may run concurrently; each call still performs exactly one
/// request and one validation.
pub struct DataApiClient {
    sender: RequestSender,
    database: String,
    credentials: Credentials,
    token: RwLock<String>,
}

impl DataApiClient {
    /// Creates a client from a configuration and an executor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the configuration carries
    /// neither credentials nor a token.
    pub fn new(config: SessionConfig, executor: Arc<dyn HttpExecutor>) -> ClientResult<Self> {
        let token = config.token.unwrap_or_default();

        if !config.credentials.is_configured() && token.is_empty() {
            return Err(Error::Configuration(
                "valid credentials [username;password] or [request_id;identifier] or a token are required"
                    .to_string(),
            ));
        }

        Ok(Self {
            sender: RequestSender::new(executor, config.base_url),
            database: config.database,
            credentials: config.credentials,
            token: RwLock::new(token),
        })
    }

    /// Returns the current session token.
    pub async fn token(&self) -> String {
        self.token.read().await.clone()
    }

    /// Replaces the session token.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = token.into();
    }

    // -- Auth --

    /// Opens a session and stores the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the session has no
    /// credentials; the stored token is left untouched in that case.
    pub async fn login(&self) -> ClientResult<String> {
        let headers = self.auth_headers()?;

        let mut options = RequestOptions::new().json(OptionMap::new());
        options.headers = headers;

        let response = self
            .sender
            .send(
                HttpMethod::Post,
                &format!("{}/sessions", self.database_path()),
                options,
            )
            .await?;

        let token = Self::string_field(&response, &["response", "token"])?;
        self.set_token(token.clone()).await;

        Ok(token)
    }

    /// Closes the session and clears the stored token.
    ///
    /// The token is cleared only after the server confirmed the close.
    pub async fn logout(&self) -> ClientResult<()> {
        let token = self.token().await;

        self.sender
            .send(
                HttpMethod::Delete,
                &format!("{}/sessions/{token}", self.database_path()),
                RequestOptions::new(),
            )
            .await?;

        self.token.write().await.clear();
        Ok(())
    }

    // -- Records --

    /// Creates a record and returns its record id.
    pub async fn create_record(
        &self,
        layout: &str,
        data: &Map<String, Value>,
        scripts: &[ScriptDirective],
        portals: Option<&Map<String, Value>>,
    ) -> ClientResult<String> {
        let mut body = field_data(data);
        insert_portal_data(&mut body, portals);
        script_options(scripts, &mut body);

        let response = self
            .sender
            .send(
                HttpMethod::Post,
                &format!("{}/records", self.layout_path(layout)),
                self.bearer_options().await.json(body),
            )
            .await?;

        Self::string_field(&response, &["response", "recordId"])
    }

    /// Duplicates an existing record and returns the new record id.
    pub async fn duplicate_record(
        &self,
        layout: &str,
        record_id: &str,
        scripts: &[ScriptDirective],
    ) -> ClientResult<String> {
        let mut body = OptionMap::new();
        script_options(scripts, &mut body);

        let response = self
            .sender
            .send(
                HttpMethod::Post,
                &format!("{}/records/{record_id}", self.layout_path(layout)),
                self.bearer_options().await.json(body),
            )
            .await?;

        Self::string_field(&response, &["response", "recordId"])
    }

    /// Edits a record and returns its new modification id.
    ///
    /// When `last_modification_id` is given, the server rejects the edit
    /// if the record changed since.
    pub async fn edit_record(
        &self,
        layout: &str,
        record_id: &str,
        data: &Map<String, Value>,
        last_modification_id: Option<&str>,
        scripts: &[ScriptDirective],
        portals: Option<&Map<String, Value>>,
    ) -> ClientResult<String> {
        let mut body = field_data(data);

        if let Some(mod_id) = last_modification_id {
            if !mod_id.is_empty() {
                body.insert("modId".to_string(), OptionValue::Text(mod_id.to_string()));
            }
        }

        insert_portal_data(&mut body, portals);
        script_options(scripts, &mut body);

        let response = self
            .sender
            .send(
                HttpMethod::Patch,
                &format!("{}/records/{record_id}", self.layout_path(layout)),
                self.bearer_options().await.json(body),
            )
            .await?;

        Self::string_field(&response, &["response", "modId"])
    }

    /// Deletes a record.
    pub async fn delete_record(
        &self,
        layout: &str,
        record_id: &str,
        scripts: &[ScriptDirective],
    ) -> ClientResult<()> {
        let mut body = OptionMap::new();
        script_options(scripts, &mut body);

        self.sender
            .send(
                HttpMethod::Delete,
                &format!("{}/records/{record_id}", self.layout_path(layout)),
                self.bearer_options().await.json(body),
            )
            .await?;

        Ok(())
    }

    /// Fetches a single record.
    ///
    /// The server wraps single-record lookups in a one-element `data`
    /// sequence; this returns that element.
    pub async fn get_record(
        &self,
        layout: &str,
        record_id: &str,
        portals: &[PortalDirective],
        scripts: &[ScriptDirective],
        response_layout: Option<&str>,
    ) -> ClientResult<Value> {
        let mut query = OptionMap::new();

        if let Some(response_layout) = response_layout {
            if !response_layout.is_empty() {
                query.insert(
                    "layout.response".to_string(),
                    OptionValue::Text(response_layout.to_string()),
                );
            }
        }

        script_options(scripts, &mut query);
        portal_options(portals, &mut query);

        let response = self
            .sender
            .send(
                HttpMethod::Get,
                &format!("{}/records/{record_id}", self.layout_path(layout)),
                self.bearer_options().await.query(query),
            )
            .await?;

        Self::body_field(&response, &["response", "data"])?
            .get(0)
            .cloned()
            .ok_or_else(|| Error::UnexpectedPayload("empty `data` sequence".to_string()))
    }

    /// Lists records of a layout.
    pub async fn get_records(
        &self,
        layout: &str,
        list: &ListOptions,
        portals: &[PortalDirective],
        scripts: &[ScriptDirective],
    ) -> ClientResult<Vec<Value>> {
        let mut query = OptionMap::new();
        // The record-list endpoint names its parameters with a leading
        // underscore, unlike the find endpoint.
        list_options(list, true, &mut query);
        script_options(scripts, &mut query);
        portal_options(portals, &mut query);

        let response = self
            .sender
            .send(
                HttpMethod::Get,
                &format!("{}/records", self.layout_path(layout)),
                self.bearer_options().await.query(query),
            )
            .await?;

        Self::data_field(&response)
    }

    /// Runs a find request.
    ///
    /// Predicates are ORed by the server; the fields inside one
    /// predicate are ANDed.
    pub async fn find_records(
        &self,
        layout: &str,
        query: &[QueryPredicate],
        list: &ListOptions,
        portals: &[PortalDirective],
        scripts: &[ScriptDirective],
    ) -> ClientResult<Vec<Value>> {
        let prepared = Value::Array(
            query_options(query)
                .into_iter()
                .map(Value::Object)
                .collect(),
        );

        let mut body = OptionMap::new();
        body.insert("query".to_string(), OptionValue::Text(prepared.to_string()));
        list_options(list, false, &mut body);
        script_options(scripts, &mut body);
        portal_options(portals, &mut body);

        let response = self
            .sender
            .send(
                HttpMethod::Post,
                &format!("{}/_find", self.layout_path(layout)),
                self.bearer_options().await.json(body),
            )
            .await?;

        Self::data_field(&response)
    }

    // -- Scripts --

    /// Executes a script on its own and returns the script result.
    pub async fn execute_script(
        &self,
        layout: &str,
        script_name: &str,
        script_param: Option<&str>,
    ) -> ClientResult<Value> {
        let mut query = OptionMap::new();

        if let Some(param) = script_param {
            if !param.is_empty() {
                query.insert(
                    "script.param".to_string(),
                    OptionValue::Text(param.to_string()),
                );
            }
        }

        let response = self
            .sender
            .send(
                HttpMethod::Get,
                &format!("{}/script/{script_name}", self.layout_path(layout)),
                self.bearer_options().await.query(query),
            )
            .await?;

        Self::body_field(&response, &["response", "scriptResult"]).cloned()
    }

    // -- Containers --

    /// Uploads a file into a container field.
    ///
    /// `repetition` addresses a specific field repetition when given.
    /// Returns the whole response body.
    pub async fn upload_to_container(
        &self,
        layout: &str,
        record_id: &str,
        field_name: &str,
        repetition: Option<u32>,
        file: FileUpload,
    ) -> ClientResult<Value> {
        let mut path = format!(
            "{}/records/{record_id}/containers/{field_name}",
            self.layout_path(layout)
        );
        if let Some(repetition) = repetition {
            path.push_str(&format!("/{repetition}"));
        }

        let response = self
            .sender
            .send(
                HttpMethod::Post,
                &path,
                self.bearer_options().await.file(file),
            )
            .await?;

        Ok(response
            .body_json()
            .cloned()
            .unwrap_or_else(|| Value::String(response.body_text())))
    }

    // -- Globals --

    /// Sets one or more global fields.
    pub async fn set_global_fields(
        &self,
        global_fields: &Map<String, Value>,
    ) -> ClientResult<Value> {
        let mut body = OptionMap::new();
        body.insert(
            "globalFields".to_string(),
            OptionValue::Text(Value::Object(global_fields.clone()).to_string()),
        );

        let response = self
            .sender
            .send(
                HttpMethod::Patch,
                &format!("{}/globals", self.database_path()),
                self.bearer_options().await.json(body),
            )
            .await?;

        Self::body_field(&response, &["response"]).cloned()
    }

    // -- Metadata --

    /// Returns server product information.
    pub async fn get_product_info(&self) -> ClientResult<Value> {
        self.get_metadata("/v1/productInfo".to_string()).await
    }

    /// Lists databases visible to the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the session has no
    /// credentials; this endpoint does not accept a bearer token.
    pub async fn get_database_names(&self) -> ClientResult<Value> {
        let headers = self.auth_headers()?;

        let mut options = RequestOptions::new();
        options.headers = headers;

        let response = self
            .sender
            .send(HttpMethod::Get, "/v1/databases", options)
            .await?;

        Self::body_field(&response, &["response"]).cloned()
    }

    /// Lists the layouts of the database.
    pub async fn get_layout_names(&self) -> ClientResult<Value> {
        self.get_metadata(format!("{}/layouts", self.database_path()))
            .await
    }

    /// Lists the scripts of the database.
    pub async fn get_script_names(&self) -> ClientResult<Value> {
        self.get_metadata(format!("{}/scripts", self.database_path()))
            .await
    }

    /// Returns layout metadata.
    ///
    /// With a record id the metadata is evaluated in the context of that
    /// record (value lists can depend on it).
    pub async fn get_layout_metadata(
        &self,
        layout: &str,
        record_id: Option<&str>,
    ) -> ClientResult<Value> {
        let mut options = self.bearer_options().await;
        let mut path = self.layout_path(layout);

        match record_id {
            Some(record_id) if !record_id.is_empty() => {
                let mut query = OptionMap::new();
                query.insert(
                    "recordId".to_string(),
                    OptionValue::Text(record_id.to_string()),
                );
                options = options.query(query);
            }
            _ => path.push_str("/metadata"),
        }

        let response = self.sender.send(HttpMethod::Get, &path, options).await?;
        Self::body_field(&response, &["response"]).cloned()
    }

    // -- Internals --

    async fn get_metadata(&self, path: String) -> ClientResult<Value> {
        let response = self
            .sender
            .send(HttpMethod::Get, &path, self.bearer_options().await)
            .await?;

        Self::body_field(&response, &["response"]).cloned()
    }

    fn database_path(&self) -> String {
        format!("/v1/databases/{}", self.database)
    }

    fn layout_path(&self, layout: &str) -> String {
        format!("{}/layouts/{layout}", self.database_path())
    }

    /// Default headers for authenticated calls.
    async fn bearer_options(&self) -> RequestOptions {
        RequestOptions::new().header(
            "Authorization",
            format!("Bearer {}", self.token.read().await),
        )
    }

    /// Builds the login headers for the configured credential kind.
    fn auth_headers(&self) -> ClientResult<BTreeMap<String, String>> {
        let mut headers = BTreeMap::new();

        match &self.credentials {
            Credentials::Basic { username, password } => {
                headers.insert(
                    "Authorization".to_string(),
                    format!("Basic {}", BASE64.encode(format!("{username}:{password}"))),
                );
            }
            Credentials::OAuth {
                request_id,
                identifier,
            } => {
                headers.insert("X-FM-Data-Login-Type".to_string(), "oauth".to_string());
                headers.insert(
                    "X-FM-Data-OAuth-Request-Id".to_string(),
                    request_id.clone(),
                );
                headers.insert(
                    "X-FM-Data-OAuth-Identifier".to_string(),
                    identifier.clone(),
                );
            }
            Credentials::None => {
                return Err(Error::Configuration(
                    "not available without credentials".to_string(),
                ));
            }
        }

        Ok(headers)
    }

    /// Walks the body to the given field.
    fn body_field<'a>(response: &'a Response, path: &[&str]) -> ClientResult<&'a Value> {
        let mut value = response
            .body_json()
            .ok_or_else(|| Error::UnexpectedPayload("expected a JSON body".to_string()))?;

        for key in path {
            value = value.get(key).ok_or_else(|| {
                Error::UnexpectedPayload(format!("missing `{}` in response", path.join(".")))
            })?;
        }

        Ok(value)
    }

    /// Reads a body field that the API may report as string or number.
    fn string_field(response: &Response, path: &[&str]) -> ClientResult<String> {
        match Self::body_field(response, path)? {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(Error::UnexpectedPayload(format!(
                "expected a scalar at `{}`, got {other}",
                path.join(".")
            ))),
        }
    }

    /// Reads the `response.data` sequence.
    fn data_field(response: &Response) -> ClientResult<Vec<Value>> {
        match Self::body_field(response, &["response", "data"])? {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(Error::UnexpectedPayload(
                "expected a sequence at `response.data`".to_string(),
            )),
        }
    }
}

fn insert_portal_data(body: &mut OptionMap, portals: Option<&Map<String, Value>>) {
    if let Some(portals) = portals {
        if !portals.is_empty() {
            body.insert(
                "portalData".to_string(),
                OptionValue::Text(portal_data(portals)),
            );
        }
    }
}
