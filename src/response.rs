//! Response assembler: vault response back to caller-facing records.
//!
//! The vault answers a batch with a flat result array positionally
//! aligned to the submitted operations. In tokenize mode that array
//! interleaves insert results (carrying generated identifiers) with read
//! results (carrying tokenized fields); the assembler folds each pair
//! back into one record. Malformed or short responses fail with typed
//! errors instead of surfacing as downstream access panics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResponseError;
use crate::record::LogicalRecord;
use crate::wire::{InsertMode, GENERATED_ID_FIELD};

/// Catch-all field group some vault versions include in read results.
/// Never forwarded to callers.
const WILDCARD_FIELD_GROUP: &str = "*";

/// One row as returned by an insert result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertedRecord {
    /// Identifier the vault generated for the inserted row.
    pub skyflow_id: String,
}

/// One per-operation result within the vault response.
///
/// Insert results carry `records`; tokenizing read results carry
/// `fields`. Both are optional at the serde level so shape mismatches
/// surface as typed assembly errors rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OperationResult {
    /// Inserted rows (insert results only).
    #[serde(default)]
    pub records: Option<Vec<InsertedRecord>>,

    /// Tokenized field values (read results only).
    #[serde(default)]
    pub fields: Option<serde_json::Map<String, Value>>,
}

/// The vault's response to one submitted batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerResponse {
    /// Per-operation results, positionally aligned with the batch.
    pub responses: Vec<OperationResult>,
}

/// A caller-facing result record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputRecord {
    /// Tokenize-mode result: the generated identifier plus tokenized
    /// field values.
    Tokenized {
        /// Table the record was written to.
        table: String,
        /// Tokenized fields, including the generated identifier.
        fields: serde_json::Map<String, Value>,
    },

    /// Plain-mode result: just the generated identifier.
    Plain {
        /// Table the record was written to.
        table: String,
        /// Identifier the vault generated for the row.
        skyflow_id: String,
    },
}

impl OutputRecord {
    /// Returns the table this record was written to.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Tokenized { table, .. } | Self::Plain { table, .. } => table,
        }
    }
}

fn generated_id(result: &OperationResult, position: usize) -> Result<String, ResponseError> {
    result
        .records
        .as_ref()
        .and_then(|records| records.first())
        .map(|record| record.skyflow_id.clone())
        .ok_or(ResponseError::MissingIdentifier { position })
}

/// Reconstructs caller-facing records from the vault response.
///
/// Tokenize mode expects exactly `2n` results for `n` logical records:
/// for pair `i`, the identifier comes from position `2i` and the
/// tokenized fields from position `2i + 1` (minus the wildcard group).
/// Plain mode expects exactly `n` results. Output order follows logical
/// record order in both modes.
pub fn assemble(
    response: &ServerResponse,
    mode: InsertMode,
    records: &[LogicalRecord],
) -> Result<Vec<OutputRecord>, ResponseError> {
    match mode {
        InsertMode::Tokenize => {
            let expected = records.len() * 2;
            if response.responses.len() != expected {
                return Err(ResponseError::LengthMismatch {
                    expected,
                    actual: response.responses.len(),
                });
            }
            records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    let insert = &response.responses[2 * index];
                    let read = &response.responses[2 * index + 1];

                    let id = generated_id(insert, 2 * index)?;
                    let tokenized = read
                        .fields
                        .as_ref()
                        .ok_or(ResponseError::MissingFields { position: 2 * index + 1 })?;

                    let mut fields = serde_json::Map::new();
                    fields.insert(GENERATED_ID_FIELD.to_string(), Value::String(id));
                    for (key, value) in tokenized {
                        if key != WILDCARD_FIELD_GROUP {
                            fields.insert(key.clone(), value.clone());
                        }
                    }
                    Ok(OutputRecord::Tokenized {
                        table: record.table.clone(),
                        fields,
                    })
                })
                .collect()
        }
        InsertMode::Plain => {
            if response.responses.len() != records.len() {
                return Err(ResponseError::LengthMismatch {
                    expected: records.len(),
                    actual: response.responses.len(),
                });
            }
            records
                .iter()
                .enumerate()
                .map(|(index, record)| {
                    Ok(OutputRecord::Plain {
                        table: record.table.clone(),
                        skyflow_id: generated_id(&response.responses[index], index)?,
                    })
                })
                .collect()
        }
    }
}
