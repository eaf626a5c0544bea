//! Caller-owned input elements.

use serde::{Deserialize, Serialize};

/// A snapshot of one UI-bound input field.
///
/// Elements are owned by the caller; the pipeline only reads them. The
/// validity flag and error text come from whatever validation UI the host
/// application runs; this layer trusts them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputElement {
    /// Destination table in the vault.
    pub table: String,

    /// Destination column. May be a dotted path (`address.city`), which
    /// expands into nested fields.
    pub column: String,

    /// Current value of the element.
    pub value: serde_json::Value,

    /// Whether the host application's validation marked this element valid.
    pub is_valid: bool,

    /// Error text for an invalid element; empty when valid.
    #[serde(default)]
    pub error_text: String,
}

impl InputElement {
    /// Creates a valid element.
    #[must_use]
    pub fn valid(
        table: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            value: value.into(),
            is_valid: true,
            error_text: String::new(),
        }
    }

    /// Creates an invalid element carrying its validation error text.
    #[must_use]
    pub fn invalid(
        table: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<serde_json::Value>,
        error_text: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            value: value.into(),
            is_valid: false,
            error_text: error_text.into(),
        }
    }
}
