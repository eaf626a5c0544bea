//! Wire-level batch model.
//!
//! A [`WireBatch`] is the ordered body of one batched vault call. Order is
//! semantically load-bearing: dependent reads reference the response
//! position of the insert they tokenize, so the transport must never
//! reorder operations. Forward references are typed ([`OperationRef`])
//! and checked at build time rather than carried as opaque strings.

use serde::{Serialize, Serializer};

use crate::error::ValidationError;
use crate::fields::FieldMap;

/// Field name under which the vault returns a generated identifier.
pub const GENERATED_ID_FIELD: &str = "skyflow_id";

/// How logical records expand into wire operations.
///
/// Resolved exactly once at request-builder entry from the `tokens`
/// option; nothing downstream re-inspects the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Each logical record becomes an insert plus a dependent tokenizing
    /// read of the just-written row.
    Tokenize,
    /// Each logical record becomes a single insert.
    Plain,
}

impl InsertMode {
    /// Resolves the mode from the `tokens` option.
    ///
    /// Absence defaults to tokenizing; only an explicit `false` selects
    /// plain mode.
    #[must_use]
    pub fn from_tokens(tokens: Option<bool>) -> Self {
        match tokens {
            Some(false) => Self::Plain,
            _ => Self::Tokenize,
        }
    }

    /// Returns true for tokenize mode.
    #[must_use]
    pub const fn is_tokenize(self) -> bool {
        matches!(self, Self::Tokenize)
    }
}

/// A typed reference to a prior operation's response.
///
/// Serializes as the vault's reference expression
/// `$responses.<index>.records.0.<field>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
    /// Response position of the referenced operation.
    pub response_index: usize,

    /// Field taken from the referenced response record.
    pub field: String,
}

impl OperationRef {
    /// Creates a reference to the generated identifier of the insert at
    /// `response_index`.
    #[must_use]
    pub fn generated_id(response_index: usize) -> Self {
        Self {
            response_index,
            field: GENERATED_ID_FIELD.to_string(),
        }
    }

    /// Renders the vault reference expression.
    #[must_use]
    pub fn render(&self) -> String {
        format!("$responses.{}.records.0.{}", self.response_index, self.field)
    }
}

impl Serialize for OperationRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

/// One unit in the batched vault call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method")]
pub enum WireOperation {
    /// A write. Carries the record payload; quorum is always requested.
    #[serde(rename = "POST")]
    Insert {
        /// Quorum acknowledgement flag; always true for this pipeline.
        quorum: bool,

        /// Destination table.
        #[serde(rename = "tableName")]
        table: String,

        /// Record payload.
        fields: FieldMap,

        /// Upsert column, when upsert rules were supplied. An empty
        /// string means insert-only for this table; absence omits the
        /// key from the wire entirely.
        #[serde(skip_serializing_if = "Option::is_none")]
        upsert: Option<String>,
    },

    /// A dependent read that tokenizes a just-written row.
    #[serde(rename = "GET")]
    Read {
        /// Table of the referenced row.
        #[serde(rename = "tableName")]
        table: String,

        /// Forward reference to the insert's generated identifier.
        #[serde(rename = "ID")]
        id: OperationRef,

        /// Tokenization flag; always true for reads built here.
        tokenization: bool,
    },
}

impl WireOperation {
    /// Creates a quorum insert.
    #[must_use]
    pub fn insert(table: impl Into<String>, fields: FieldMap, upsert: Option<String>) -> Self {
        Self::Insert {
            quorum: true,
            table: table.into(),
            fields,
            upsert,
        }
    }

    /// Creates a tokenizing read referencing a prior insert.
    #[must_use]
    pub fn tokenize_read(table: impl Into<String>, id: OperationRef) -> Self {
        Self::Read {
            table: table.into(),
            id,
            tokenization: true,
        }
    }

    /// Returns true for insert operations.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }
}

/// The ordered operation sequence of one batched vault call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireBatch {
    /// Operations in submission order.
    pub records: Vec<WireOperation>,
}

impl WireBatch {
    /// Creates a batch from an operation sequence.
    #[must_use]
    pub fn new(records: Vec<WireOperation>) -> Self {
        Self { records }
    }

    /// Number of operations in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the batch holds no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checks the forward-reference invariant.
    ///
    /// Every read must reference a response index strictly before its own
    /// position, and the referenced operation must be an insert.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (position, operation) in self.records.iter().enumerate() {
            if let WireOperation::Read { id, .. } = operation {
                let target = id.response_index;
                let valid = target < position
                    && self.records.get(target).is_some_and(WireOperation::is_insert);
                if !valid {
                    return Err(ValidationError::InvalidReference { position, target });
                }
            }
        }
        Ok(())
    }
}
