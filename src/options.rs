//! Submission configuration.
//!
//! Replaces the loosely-typed options bag of older SDK surfaces with an
//! explicit struct: every recognized option has a stated type and default.

use serde::{Deserialize, Serialize};

use crate::record::AdditionalRecord;

/// A per-table upsert key.
///
/// When an insert for `table` carries `column` as its upsert key, the
/// vault updates an existing row matching that column instead of
/// inserting a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertRule {
    /// Table the rule applies to.
    pub table: String,

    /// Column used as the upsert key.
    pub column: String,
}

impl UpsertRule {
    /// Creates an upsert rule.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Options recognized by [`submit`](crate::client::VaultClient::submit).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectOptions {
    /// Whether written values are tokenized by a dependent read.
    ///
    /// `None` defaults to tokenizing; only an explicit `Some(false)`
    /// selects the plain insert-only branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<bool>,

    /// Per-table upsert keys. `None` omits the upsert column from the
    /// wire entirely; with rules present, tables without a matching rule
    /// get an insert-only sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<Vec<UpsertRule>>,

    /// Pre-built records merged in alongside collected fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_fields: Vec<AdditionalRecord>,
}

impl CollectOptions {
    /// Creates the default options (tokenize, no upsert, nothing extra).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tokenize flag explicitly.
    #[must_use]
    pub fn with_tokens(mut self, tokens: bool) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the upsert rules.
    #[must_use]
    pub fn with_upsert(mut self, rules: Vec<UpsertRule>) -> Self {
        self.upsert = Some(rules);
        self
    }

    /// Appends an additional record.
    #[must_use]
    pub fn with_additional_record(mut self, record: AdditionalRecord) -> Self {
        self.additional_fields.push(record);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_tokenize() {
        let options = CollectOptions::default();
        assert_eq!(options.tokens, None);
        assert!(options.upsert.is_none());
        assert!(options.additional_fields.is_empty());
    }

    #[test]
    fn test_builder_setters() {
        let options = CollectOptions::new()
            .with_tokens(false)
            .with_upsert(vec![UpsertRule::new("person", "email")]);
        assert_eq!(options.tokens, Some(false));
        assert_eq!(
            options.upsert.as_deref(),
            Some(&[UpsertRule::new("person", "email")][..])
        );
    }
}
