use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use vaultcollect::{
    AdditionalRecord, AuthError, AuthProvider, CollectOptions, FieldMap, HttpRequest,
    HttpTransport, InputElement, TransportError, VaultClient,
};

struct ScriptedAuth {
    token: &'static str,
    calls: AtomicUsize,
}

impl ScriptedAuth {
    fn new(token: &'static str) -> Arc<Self> {
        Arc::new(Self {
            token,
            calls: AtomicUsize::new(0),
        })
    }
}

impl AuthProvider for ScriptedAuth {
    async fn get_access_token(&self) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.to_string())
    }
}

struct FailingAuth;

impl AuthProvider for FailingAuth {
    async fn get_access_token(&self) -> Result<String, AuthError> {
        Err(AuthError::token_acquisition("credentials expired"))
    }
}

struct ScriptedTransport {
    response: Value,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn recorded(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn request(&self, request: HttpRequest) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

struct FailingTransport {
    calls: AtomicUsize,
}

impl HttpTransport for FailingTransport {
    async fn request(&self, _request: HttpRequest) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::ConnectionFailed {
            message: "connection refused".to_string(),
        })
    }
}

fn person_elements() -> Vec<InputElement> {
    vec![
        InputElement::valid("person", "name.first", "Jane "),
        InputElement::valid("person", "name.last", "Doe"),
    ]
}

#[tokio::test]
async fn submit_tokenize_round_trip() {
    let auth = ScriptedAuth::new("secret-token");
    let transport = ScriptedTransport::new(json!({
        "responses": [
            { "records": [{ "skyflow_id": "id-person" }] },
            { "fields": { "name": { "first": "tok-first", "last": "tok-last" }, "*": {} } },
        ]
    }));
    let client = VaultClient::new(
        "https://vault.test",
        "vault-1",
        auth.clone(),
        transport.clone(),
    );

    let records = client
        .submit(&person_elements(), &CollectOptions::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        json!([
            {
                "table": "person",
                "fields": {
                    "skyflow_id": "id-person",
                    "name": { "first": "tok-first", "last": "tok-last" },
                },
            },
        ])
    );

    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "https://vault.test/v1/vaults/vault-1");
    assert!(requests[0].headers.contains(&(
        "authorization".to_string(),
        "Bearer secret-token".to_string()
    )));
    assert!(requests[0]
        .headers
        .contains(&("content-type".to_string(), "application/json".to_string())));

    // Exactly one insert + dependent read pair, with the value untouched.
    assert_eq!(
        requests[0].body,
        json!({
            "records": [
                {
                    "method": "POST",
                    "quorum": true,
                    "tableName": "person",
                    "fields": { "name": { "first": "Jane ", "last": "Doe" } },
                },
                {
                    "method": "GET",
                    "tableName": "person",
                    "ID": "$responses.0.records.0.skyflow_id",
                    "tokenization": true,
                },
            ]
        })
    );
    assert_eq!(auth.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn submit_plain_mode_preserves_table_order() {
    let auth = ScriptedAuth::new("t");
    let transport = ScriptedTransport::new(json!({
        "responses": [
            { "records": [{ "skyflow_id": "id-0" }] },
            { "records": [{ "skyflow_id": "id-1" }] },
        ]
    }));
    let client = VaultClient::new("https://vault.test", "v", auth, transport.clone());

    let elements = vec![
        InputElement::valid("person", "email", "jane@example.com"),
        InputElement::valid("card", "card_number", "4111 1111 1111 1111"),
    ];
    let records = client
        .submit(&elements, &CollectOptions::new().with_tokens(false))
        .await
        .unwrap();

    let tables: Vec<&str> = records.iter().map(|r| r.table()).collect();
    assert_eq!(tables, vec!["person", "card"]);

    // Plain mode sends one insert per record and leaves card_number as typed.
    let body = &transport.recorded()[0].body;
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["records"][1]["fields"]["card_number"],
        json!("4111 1111 1111 1111")
    );
}

#[tokio::test]
async fn submit_card_number_normalized_in_tokenize_mode() {
    let auth = ScriptedAuth::new("t");
    let transport = ScriptedTransport::new(json!({
        "responses": [
            { "records": [{ "skyflow_id": "id-0" }] },
            { "fields": { "card_number": "tok-card" } },
        ]
    }));
    let client = VaultClient::new("https://vault.test", "v", auth, transport.clone());

    let elements = vec![InputElement::valid(
        "card",
        "card_number",
        "4111 1111 1111 1111",
    )];
    client
        .submit(&elements, &CollectOptions::new())
        .await
        .unwrap();

    let body = &transport.recorded()[0].body;
    assert_eq!(
        body["records"][0]["fields"]["card_number"],
        json!("4111111111111111")
    );
}

#[tokio::test]
async fn submit_invalid_elements_fail_before_network() {
    let auth = ScriptedAuth::new("t");
    let transport = ScriptedTransport::new(json!({ "responses": [] }));
    let client = VaultClient::new("https://vault.test", "v", auth.clone(), transport.clone());

    let elements = vec![
        InputElement::invalid("person", "email", "", "email is required"),
        InputElement::invalid("card", "card_number", "41", "invalid card number"),
    ];
    let err = client
        .submit(&elements, &CollectOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    let msg = format!("{err}");
    assert!(msg.contains("email: email is required"));
    assert!(msg.contains("card_number: invalid card number"));
    assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    assert!(transport.recorded().is_empty());
}

#[tokio::test]
async fn submit_duplicate_additional_field_fails_before_network() {
    let auth = ScriptedAuth::new("t");
    let transport = ScriptedTransport::new(json!({ "responses": [] }));
    let client = VaultClient::new("https://vault.test", "v", auth.clone(), transport.clone());

    let options = CollectOptions::new().with_additional_record(AdditionalRecord::new(
        "person",
        FieldMap::from_json(&json!({ "name": { "first": "Janet" } })).unwrap(),
    ));
    let err = client
        .submit(&person_elements(), &options)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    let msg = format!("{err}");
    assert!(msg.contains("name.first"));
    assert!(msg.contains("person"));
    assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    assert!(transport.recorded().is_empty());
}

#[tokio::test]
async fn submit_auth_failure_skips_transport() {
    let transport = Arc::new(FailingTransport {
        calls: AtomicUsize::new(0),
    });
    let client = VaultClient::new("https://vault.test", "v", FailingAuth, transport.clone());

    let err = client
        .submit(&person_elements(), &CollectOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert!(format!("{err}").contains("credentials expired"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submit_transport_failure_propagates() {
    let auth = ScriptedAuth::new("t");
    let transport = Arc::new(FailingTransport {
        calls: AtomicUsize::new(0),
    });
    let client = VaultClient::new("https://vault.test", "v", auth, transport.clone());

    let err = client
        .submit(&person_elements(), &CollectOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.is_retryable());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn submit_short_tokenize_response_is_typed_error() {
    let auth = ScriptedAuth::new("t");
    // One entry where the insert + read pair expects two.
    let transport = ScriptedTransport::new(json!({
        "responses": [
            { "records": [{ "skyflow_id": "id-0" }] },
        ]
    }));
    let client = VaultClient::new("https://vault.test", "v", auth, transport);

    let err = client
        .submit(&person_elements(), &CollectOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_response());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn submit_undecodable_response_is_transport_error() {
    let auth = ScriptedAuth::new("t");
    let transport = ScriptedTransport::new(json!({ "unexpected": true }));
    let client = VaultClient::new("https://vault.test", "v", auth, transport);

    let err = client
        .submit(&person_elements(), &CollectOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_transport());
}
