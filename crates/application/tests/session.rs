//! Session client integration tests
//!
//! These drive [`DataApiClient`] end to end against an in-memory
//! executor that records every request and replays canned exchanges.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use fmdata_application::ports::{HttpExecutor, RawExchange, TransportError, WireBody};
use fmdata_application::{Credentials, DataApiClient, Error, SessionConfig};
use fmdata_domain::{
    DomainError, ErrorCode, FieldFilter, FileUpload, HttpMethod, ListOptions, PortalDirective,
    QueryPredicate, ScriptDirective, ScriptPhase, Sort,
};

const BASE_URL: &str = "https://fms.example.com/fmi/data";

#[derive(Debug, Clone)]
struct Recorded {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: WireBody,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn json_body(&self) -> Value {
        match &self.body {
            WireBody::Json(text) => serde_json::from_str(text).unwrap(),
            other => panic!("expected a JSON body, got {other:?}"),
        }
    }
}

#[derive(Default)]
struct MockExecutor {
    requests: Mutex<Vec<Recorded>>,
    responses: Mutex<VecDeque<RawExchange>>,
}

impl MockExecutor {
    fn replying(body: &Value) -> Arc<Self> {
        let executor = Arc::new(Self::default());
        executor.push_ok(body);
        executor
    }

    fn push_ok(&self, body: &Value) {
        self.push(200, "OK", &body.to_string());
    }

    fn push(&self, code: u16, reason: &str, body: &str) {
        self.responses.lock().unwrap().push_back(RawExchange {
            header_text: format!(
                "Content-Type: application/json\nStatus: HTTP/1.1 {code} {reason}\n"
            ),
            body_text: body.to_string(),
        });
    }

    fn last(&self) -> Recorded {
        self.requests.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl HttpExecutor for MockExecutor {
    async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
        body: WireBody,
    ) -> Result<RawExchange, TransportError> {
        self.requests.lock().unwrap().push(Recorded {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
            body,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no canned response left".to_string()))
    }
}

fn basic_client(executor: &Arc<MockExecutor>) -> DataApiClient {
    DataApiClient::new(
        SessionConfig {
            base_url: BASE_URL.to_string(),
            database: "Crm".to_string(),
            credentials: Credentials::Basic {
                username: "alice".to_string(),
                password: "secret".to_string(),
            },
            token: None,
        },
        Arc::clone(executor) as Arc<dyn HttpExecutor>,
    )
    .unwrap()
}

fn token_client(executor: &Arc<MockExecutor>) -> DataApiClient {
    DataApiClient::new(
        SessionConfig {
            base_url: BASE_URL.to_string(),
            database: "Crm".to_string(),
            credentials: Credentials::None,
            token: Some("tok-123".to_string()),
        },
        Arc::clone(executor) as Arc<dyn HttpExecutor>,
    )
    .unwrap()
}

#[test]
fn construction_requires_credentials_or_token() {
    let executor = Arc::new(MockExecutor::default());
    let result = DataApiClient::new(
        SessionConfig {
            base_url: BASE_URL.to_string(),
            database: "Crm".to_string(),
            ..SessionConfig::default()
        },
        executor as Arc<dyn HttpExecutor>,
    );

    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn construction_rejects_empty_credential_pairs() {
    let executor = Arc::new(MockExecutor::default());
    let result = DataApiClient::new(
        SessionConfig {
            base_url: BASE_URL.to_string(),
            database: "Crm".to_string(),
            credentials: Credentials::Basic {
                username: String::new(),
                password: String::new(),
            },
            token: None,
        },
        executor as Arc<dyn HttpExecutor>,
    );

    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[tokio::test]
async fn login_with_basic_credentials_stores_token() {
    let executor = MockExecutor::replying(&json!({"response": {"token": "tok-999"}}));
    let client = basic_client(&executor);

    let token = client.login().await.unwrap();

    assert_eq!(token, "tok-999");
    assert_eq!(client.token().await, "tok-999");

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Post);
    assert_eq!(recorded.url, format!("{BASE_URL}/v1/databases/Crm/sessions"));
    // base64("alice:secret")
    assert_eq!(
        recorded.header("Authorization"),
        Some("Basic YWxpY2U6c2VjcmV0")
    );
    assert_eq!(recorded.json_body(), json!({}));
}

#[tokio::test]
async fn login_with_oauth_sends_oauth_headers() {
    let executor = MockExecutor::replying(&json!({"response": {"token": "tok-1"}}));
    let client = DataApiClient::new(
        SessionConfig {
            base_url: BASE_URL.to_string(),
            database: "Crm".to_string(),
            credentials: Credentials::OAuth {
                request_id: "req-7".to_string(),
                identifier: "ident-9".to_string(),
            },
            token: None,
        },
        Arc::clone(&executor) as Arc<dyn HttpExecutor>,
    )
    .unwrap();

    client.login().await.unwrap();

    let recorded = executor.last();
    assert_eq!(recorded.header("X-FM-Data-Login-Type"), Some("oauth"));
    assert_eq!(recorded.header("X-FM-Data-OAuth-Request-Id"), Some("req-7"));
    assert_eq!(
        recorded.header("X-FM-Data-OAuth-Identifier"),
        Some("ident-9")
    );
}

#[tokio::test]
async fn token_only_session_cannot_login_but_calls_succeed() {
    let executor = Arc::new(MockExecutor::default());
    let client = token_client(&executor);

    let err = client.login().await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    // The supplied token is untouched by the failed login.
    assert_eq!(client.token().await, "tok-123");

    executor.push_ok(&json!({"response": {"data": []}}));
    let records = client
        .get_records("People", &ListOptions::default(), &[], &[])
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(
        executor.last().header("Authorization"),
        Some("Bearer tok-123")
    );
}

#[tokio::test]
async fn logout_clears_token_after_success() {
    let executor = MockExecutor::replying(&json!({"response": {}}));
    let client = token_client(&executor);

    client.logout().await.unwrap();

    assert_eq!(client.token().await, "");
    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Delete);
    assert_eq!(
        recorded.url,
        format!("{BASE_URL}/v1/databases/Crm/sessions/tok-123")
    );
}

#[tokio::test]
async fn logout_failure_keeps_token() {
    let executor = Arc::new(MockExecutor::default());
    executor.push(500, "Internal Server Error", "down");
    let client = token_client(&executor);

    assert!(client.logout().await.is_err());
    assert_eq!(client.token().await, "tok-123");
}

#[tokio::test]
async fn create_record_embeds_field_data_and_scripts() {
    let executor = MockExecutor::replying(&json!({"response": {"recordId": "17"}}));
    let client = token_client(&executor);

    let Value::Object(data) = json!({"name": "Bob"}) else {
        panic!("object literal");
    };
    let Value::Object(portals) = json!({"Orders": [{"No": 1}]}) else {
        panic!("object literal");
    };

    let record_id = client
        .create_record(
            "People",
            &data,
            &[ScriptDirective::new(ScriptPhase::PostRequest, "Audit", "new")],
            Some(&portals),
        )
        .await
        .unwrap();

    assert_eq!(record_id, "17");

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Post);
    assert_eq!(
        recorded.url,
        format!("{BASE_URL}/v1/databases/Crm/layouts/People/records")
    );
    // Pre-serialized documents land nested, not double-encoded.
    assert_eq!(
        recorded.json_body(),
        json!({
            "fieldData": {"name": "Bob"},
            "portalData": {"Orders": [{"No": 1}]},
            "script": "Audit",
            "script.param": "new",
        })
    );
}

#[tokio::test]
async fn edit_record_sends_mod_id_and_returns_new_one() {
    let executor = MockExecutor::replying(&json!({"response": {"modId": "4"}}));
    let client = token_client(&executor);

    let Value::Object(data) = json!({"name": "Ann"}) else {
        panic!("object literal");
    };

    let mod_id = client
        .edit_record("People", "17", &data, Some("3"), &[], None)
        .await
        .unwrap();

    assert_eq!(mod_id, "4");

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Patch);
    assert_eq!(
        recorded.url,
        format!("{BASE_URL}/v1/databases/Crm/layouts/People/records/17")
    );
    // "3" is itself valid JSON, so the verbatim-embed rule turns it
    // into a bare number in the body.
    assert_eq!(
        recorded.json_body(),
        json!({"fieldData": {"name": "Ann"}, "modId": 3})
    );
}

#[tokio::test]
async fn duplicate_record_returns_new_record_id() {
    let executor = MockExecutor::replying(&json!({"response": {"recordId": "18"}}));
    let client = token_client(&executor);

    let record_id = client.duplicate_record("People", "17", &[]).await.unwrap();

    assert_eq!(record_id, "18");
    assert_eq!(executor.last().method, HttpMethod::Post);
    assert_eq!(executor.last().json_body(), json!({}));
}

#[tokio::test]
async fn delete_record_sends_scripts() {
    let executor = MockExecutor::replying(&json!({"response": {}}));
    let client = token_client(&executor);

    client
        .delete_record(
            "People",
            "17",
            &[ScriptDirective::new(ScriptPhase::PreRequest, "Check", "")],
        )
        .await
        .unwrap();

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Delete);
    assert_eq!(
        recorded.json_body(),
        json!({"script.prerequest": "Check", "script.prerequest.param": ""})
    );
}

#[tokio::test]
async fn get_record_returns_first_data_element() {
    let executor = MockExecutor::replying(&json!({
        "response": {"data": [{"fieldData": {"x": 1}}]}
    }));
    let client = token_client(&executor);

    let record = client
        .get_record(
            "People",
            "17",
            &[PortalDirective::new("Orders")],
            &[],
            Some("Detail"),
        )
        .await
        .unwrap();

    assert_eq!(record, json!({"fieldData": {"x": 1}}));

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Get);
    let url = recorded.url;
    assert!(url.starts_with(&format!(
        "{BASE_URL}/v1/databases/Crm/layouts/People/records/17?"
    )));
    assert!(url.contains("layout.response=Detail"));
    assert!(url.contains("portal=%5B%22Orders%22%5D"));
}

#[tokio::test]
async fn get_records_uses_underscored_parameters() {
    let executor = MockExecutor::replying(&json!({
        "response": {"data": [{"fieldData": {}}, {"fieldData": {}}]}
    }));
    let client = token_client(&executor);

    let records = client
        .get_records(
            "People",
            &ListOptions {
                offset: Some(1),
                limit: Some(2),
                sort: Some(Sort::Expr("Name".to_string())),
                response_layout: None,
            },
            &[],
            &[],
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 2);

    let url = executor.last().url;
    assert!(url.contains("_offset=1"));
    assert!(url.contains("_limit=2"));
    assert!(url.contains("_sort=Name"));
}

#[tokio::test]
async fn find_records_builds_query_body() {
    let executor = MockExecutor::replying(&json!({
        "response": {"data": [{"fieldData": {"Name": "A"}}]}
    }));
    let client = token_client(&executor);

    let records = client
        .find_records(
            "People",
            &[QueryPredicate::with_fields(vec![FieldFilter::new(
                "Name", "A",
            )])],
            &ListOptions {
                limit: Some(10),
                ..ListOptions::default()
            },
            &[],
            &[],
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Post);
    assert_eq!(
        recorded.url,
        format!("{BASE_URL}/v1/databases/Crm/layouts/People/_find")
    );
    assert_eq!(
        recorded.json_body(),
        json!({"query": [{"Name": "A"}], "limit": 10})
    );
}

#[tokio::test]
async fn execute_script_passes_param_and_returns_result() {
    let executor = MockExecutor::replying(&json!({"response": {"scriptResult": "done"}}));
    let client = token_client(&executor);

    let result = client
        .execute_script("People", "Nightly", Some("full"))
        .await
        .unwrap();

    assert_eq!(result, json!("done"));

    let url = executor.last().url;
    assert!(url.starts_with(&format!(
        "{BASE_URL}/v1/databases/Crm/layouts/People/script/Nightly?"
    )));
    assert!(url.contains("script.param=full"));
}

#[tokio::test]
async fn upload_to_container_sends_multipart() {
    let executor = MockExecutor::replying(&json!({"response": {"modId": "2"}}));
    let client = token_client(&executor);

    let body = client
        .upload_to_container(
            "People",
            "17",
            "photo",
            Some(2),
            FileUpload::new("face.png", vec![0x89, 0x50, 0x4e, 0x47]),
        )
        .await
        .unwrap();

    assert_eq!(body, json!({"response": {"modId": "2"}}));

    let recorded = executor.last();
    assert_eq!(
        recorded.url,
        format!("{BASE_URL}/v1/databases/Crm/layouts/People/records/17/containers/photo/2")
    );
    assert!(matches!(recorded.body, WireBody::Multipart(_)));
    assert!(
        !recorded
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    );
}

#[tokio::test]
async fn set_global_fields_patches_globals() {
    let executor = MockExecutor::replying(&json!({"response": {}}));
    let client = token_client(&executor);

    let Value::Object(globals) = json!({"Prefs::Theme": "dark"}) else {
        panic!("object literal");
    };

    client.set_global_fields(&globals).await.unwrap();

    let recorded = executor.last();
    assert_eq!(recorded.method, HttpMethod::Patch);
    assert_eq!(recorded.url, format!("{BASE_URL}/v1/databases/Crm/globals"));
    assert_eq!(
        recorded.json_body(),
        json!({"globalFields": {"Prefs::Theme": "dark"}})
    );
}

#[tokio::test]
async fn metadata_calls_hit_documented_paths() {
    let executor = MockExecutor::replying(&json!({"response": {"productVersion": "19"}}));
    let client = token_client(&executor);

    client.get_product_info().await.unwrap();
    assert_eq!(executor.last().url, format!("{BASE_URL}/v1/productInfo"));

    executor.push_ok(&json!({"response": {"layouts": []}}));
    client.get_layout_names().await.unwrap();
    assert_eq!(
        executor.last().url,
        format!("{BASE_URL}/v1/databases/Crm/layouts")
    );

    executor.push_ok(&json!({"response": {"scripts": []}}));
    client.get_script_names().await.unwrap();
    assert_eq!(
        executor.last().url,
        format!("{BASE_URL}/v1/databases/Crm/scripts")
    );

    executor.push_ok(&json!({"response": {"fieldMetaData": []}}));
    client.get_layout_metadata("People", None).await.unwrap();
    assert_eq!(
        executor.last().url,
        format!("{BASE_URL}/v1/databases/Crm/layouts/People/metadata")
    );

    executor.push_ok(&json!({"response": {"fieldMetaData": []}}));
    client.get_layout_metadata("People", Some("17")).await.unwrap();
    assert_eq!(
        executor.last().url,
        format!("{BASE_URL}/v1/databases/Crm/layouts/People?recordId=17")
    );
}

#[tokio::test]
async fn database_names_requires_credentials() {
    let executor = Arc::new(MockExecutor::default());
    let client = token_client(&executor);

    assert!(matches!(
        client.get_database_names().await,
        Err(Error::Configuration(_))
    ));

    executor.push_ok(&json!({"response": {"databases": []}}));
    let with_credentials = basic_client(&executor);
    with_credentials.get_database_names().await.unwrap();

    let recorded = executor.last();
    assert_eq!(recorded.url, format!("{BASE_URL}/v1/databases"));
    assert_eq!(
        recorded.header("Authorization"),
        Some("Basic YWxpY2U6c2VjcmV0")
    );
}

#[tokio::test]
async fn api_error_surfaces_payload_code() {
    let executor = Arc::new(MockExecutor::default());
    executor.push(
        400,
        "Bad Request",
        &json!({"messages": [{"message": "Bad", "code": "101"}]}).to_string(),
    );
    let client = token_client(&executor);

    let err = client
        .get_record("People", "17", &[], &[], None)
        .await
        .unwrap_err();

    match err {
        Error::Domain(DomainError::Api { message, code }) => {
            assert_eq!(message, "Bad");
            assert_eq!(code, ErrorCode::Api("101".to_string()));
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}
