//! # vaultcollect - batched insert-and-tokenize for a data vault
//!
//! vaultcollect is the request-assembly and response-reconstruction layer
//! of a vault client SDK. It gathers sensitive field values from named
//! input elements, groups them into table-shaped records, merges in
//! caller-supplied additional records, submits one batched call to the
//! vault, and folds the interleaved response back into one record per
//! logical insert.
//!
//! ## Core Concepts
//!
//! - **InputElement**: one UI-bound field with a (table, column) destination
//! - **LogicalRecord**: one table's merged field tree, prior to wire expansion
//! - **WireBatch**: the ordered operation sequence sent to the vault; reads
//!   reference earlier inserts by response position
//! - **OutputRecord**: the caller-facing result, one per logical record
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vaultcollect::{CollectOptions, InputElement, UpsertRule, VaultClient};
//!
//! let client = VaultClient::new(vault_url, vault_id, auth, transport);
//!
//! let elements = vec![
//!     InputElement::valid("person", "name.first", "Jane"),
//!     InputElement::valid("person", "name.last", "Doe"),
//! ];
//! let options = CollectOptions::new()
//!     .with_upsert(vec![UpsertRule::new("person", "email")]);
//!
//! let records = client.submit(&elements, &options).await?;
//! ```
//!
//! Data flows strictly left to right: elements become grouped fields,
//! grouped fields become logical records, logical records become the wire
//! batch, and the server response is reconstructed into output records.
//! No component holds state across invocations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod collect;
pub mod element;
pub mod error;
pub mod fields;
pub mod options;
pub mod record;
pub mod request;
pub mod response;
pub mod wire;

// Re-export primary types at crate root for convenience
pub use client::{AuthProvider, HttpRequest, HttpTransport, VaultClient};
pub use collect::{collect_elements, merge_additional, TableFields};
pub use element::InputElement;
pub use error::{
    AuthError, ResponseError, TransportError, ValidationError, VaultError, VaultResult,
};
pub use fields::{FieldMap, FieldNode};
pub use options::{CollectOptions, UpsertRule};
pub use record::{AdditionalRecord, LogicalRecord};
pub use request::build_batch;
pub use response::{assemble, InsertedRecord, OperationResult, OutputRecord, ServerResponse};
pub use wire::{InsertMode, OperationRef, WireBatch, WireOperation, GENERATED_ID_FIELD};
