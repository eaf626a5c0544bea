//! Logical records: one table's worth of merged field data.

use serde::{Deserialize, Serialize};

use crate::fields::FieldMap;

/// One table's merged fields, prior to wire-level expansion.
///
/// Within a single request, table names are unique across logical records;
/// the merge step guarantees this by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalRecord {
    /// Destination table.
    pub table: String,

    /// Merged field tree for the table.
    pub fields: FieldMap,
}

impl LogicalRecord {
    /// Creates a logical record.
    #[must_use]
    pub fn new(table: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            table: table.into(),
            fields,
        }
    }
}

/// A caller-supplied pre-built record merged in alongside collected fields.
///
/// Same shape as [`LogicalRecord`]. No column path in an additional record
/// may already exist in the collected fields for the same table; the merge
/// rejects any overlap as a caller error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalRecord {
    /// Destination table.
    pub table: String,

    /// Pre-built field tree to merge in.
    pub fields: FieldMap,
}

impl AdditionalRecord {
    /// Creates an additional record.
    #[must_use]
    pub fn new(table: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            table: table.into(),
            fields,
        }
    }
}
