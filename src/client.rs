//! Submission orchestrator and collaborator traits.
//!
//! The client sequences the pipeline: collect elements, merge additional
//! records, build the wire batch, acquire an auth token, submit over the
//! transport, and assemble the response. The token and the round trip
//! are the only suspension points and always run in that order. Any
//! stage's failure is terminal for the invocation; nothing retries.
//!
//! Auth and transport are abstract collaborators so hosts can plug in
//! their own credential flow and HTTP stack, and so tests can script
//! both without a network.

use std::future::Future;
use std::sync::Arc;

use crate::collect::{collect_elements, merge_additional};
use crate::element::InputElement;
use crate::error::{AuthError, TransportError, VaultResult};
use crate::options::CollectOptions;
use crate::request::build_batch;
use crate::response::{assemble, OutputRecord, ServerResponse};
use crate::wire::InsertMode;

/// Supplies bearer tokens for vault calls.
///
/// Failure propagates as the overall submission's failure; the client
/// never retries acquisition.
pub trait AuthProvider: Send + Sync {
    /// Resolves an access token for the next request.
    fn get_access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send;
}

impl<T: AuthProvider> AuthProvider for Arc<T> {
    fn get_access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send {
        (**self).get_access_token()
    }
}

/// One HTTP exchange handed to the transport collaborator.
///
/// The transport owns timeouts, TLS, and status handling; a non-success
/// status must surface as a [`TransportError`]. The transport must not
/// reorder or split the body: operation order inside it is a correctness
/// invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: String,

    /// Fully resolved request URL.
    pub url: String,

    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,

    /// JSON request body.
    pub body: serde_json::Value,
}

/// Performs the vault round trip.
pub trait HttpTransport: Send + Sync {
    /// Executes one request and returns the decoded JSON response body.
    fn request(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TransportError>> + Send;
}

impl<T: HttpTransport> HttpTransport for Arc<T> {
    fn request(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TransportError>> + Send {
        (**self).request(request)
    }
}

/// Client for batched insert-and-tokenize submissions.
///
/// Holds no per-request state: every [`submit`](Self::submit) call runs
/// an independent pipeline over its own structures, so concurrent
/// submissions need no coordination.
#[derive(Debug, Clone)]
pub struct VaultClient<A, T> {
    vault_url: String,
    vault_id: String,
    auth: A,
    transport: T,
}

impl<A: AuthProvider, T: HttpTransport> VaultClient<A, T> {
    /// Creates a client for one vault.
    #[must_use]
    pub fn new(
        vault_url: impl Into<String>,
        vault_id: impl Into<String>,
        auth: A,
        transport: T,
    ) -> Self {
        Self {
            vault_url: vault_url.into(),
            vault_id: vault_id.into(),
            auth,
            transport,
        }
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1/vaults/{}",
            self.vault_url.trim_end_matches('/'),
            self.vault_id
        )
    }

    /// Collects, merges, submits, and reassembles one batch.
    ///
    /// All validation runs before the auth collaborator is consulted, so
    /// invalid inputs never cause network traffic. The returned records
    /// are in logical-record order: one per table.
    ///
    /// # Errors
    ///
    /// Any stage's failure is returned as-is; see
    /// [`VaultError`](crate::error::VaultError) for the taxonomy.
    pub async fn submit(
        &self,
        elements: &[InputElement],
        options: &CollectOptions,
    ) -> VaultResult<Vec<OutputRecord>> {
        let collected = collect_elements(elements)?;
        let records = merge_additional(collected, &options.additional_fields)?;
        let mode = InsertMode::from_tokens(options.tokens);
        let batch = build_batch(&records, mode, options.upsert.as_deref())?;

        let token = self.auth.get_access_token().await?;

        let body = serde_json::to_value(&batch).map_err(|e| {
            TransportError::SerializationFailed {
                message: e.to_string(),
            }
        })?;
        let request = HttpRequest {
            method: "POST".to_string(),
            url: self.endpoint_url(),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {token}")),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
        };
        let raw = self.transport.request(request).await?;

        let response: ServerResponse = serde_json::from_value(raw).map_err(|e| {
            TransportError::DeserializationFailed {
                message: e.to_string(),
            }
        })?;
        Ok(assemble(&response, mode, &records)?)
    }
}
