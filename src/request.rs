//! Request builder: logical records to wire batch.

use serde_json::Value;

use crate::error::ValidationError;
use crate::fields::{FieldMap, FieldNode};
use crate::options::UpsertRule;
use crate::record::LogicalRecord;
use crate::wire::{InsertMode, OperationRef, WireBatch, WireOperation};

/// Leaf name that gets whitespace-normalized before submission.
const CARD_NUMBER_FIELD: &str = "card_number";

/// Resolves the upsert column for a table.
///
/// The first rule whose table matches wins. With rules present but none
/// matching, the empty string sentinel means insert-only; with no rules
/// supplied at all, no upsert column is attached.
fn resolve_upsert(table: &str, rules: Option<&[UpsertRule]>) -> Option<String> {
    let rules = rules?;
    Some(
        rules
            .iter()
            .find(|rule| rule.table == table)
            .map(|rule| rule.column.clone())
            .unwrap_or_default(),
    )
}

/// Strips all whitespace from a top-level `card_number` string leaf.
///
/// Tolerates user-formatted input (spaced card numbers) without
/// rejecting it. Only the tokenize path applies this; plain mode sends
/// fields untouched. The asymmetry matches the vault SDK's observed
/// behavior and is covered by tests so a future change is deliberate.
fn normalize_card_number(fields: &FieldMap) -> FieldMap {
    let mut fields = fields.clone();
    let stripped = match fields.get(CARD_NUMBER_FIELD) {
        Some(FieldNode::Leaf(Value::String(raw))) => {
            Some(raw.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        }
        _ => None,
    };
    if let Some(stripped) = stripped {
        fields.insert_path(CARD_NUMBER_FIELD, Value::String(stripped));
    }
    fields
}

/// Builds the wire batch for a set of logical records.
///
/// Tokenize mode expands the record at ordinal `i` into an insert at
/// position `2i` and a dependent tokenizing read at `2i + 1` referencing
/// the insert's generated identifier. Plain mode emits exactly one insert
/// per record, in record order. Both flavors request quorum.
///
/// The produced batch always satisfies [`WireBatch::validate`]; the check
/// still runs so any future builder change that breaks the reference
/// invariant fails here rather than at the vault.
pub fn build_batch(
    records: &[LogicalRecord],
    mode: InsertMode,
    upsert_rules: Option<&[UpsertRule]>,
) -> Result<WireBatch, ValidationError> {
    let mut operations = Vec::with_capacity(match mode {
        InsertMode::Tokenize => records.len() * 2,
        InsertMode::Plain => records.len(),
    });

    match mode {
        InsertMode::Tokenize => {
            for (index, record) in records.iter().enumerate() {
                operations.push(WireOperation::insert(
                    record.table.clone(),
                    normalize_card_number(&record.fields),
                    resolve_upsert(&record.table, upsert_rules),
                ));
                operations.push(WireOperation::tokenize_read(
                    record.table.clone(),
                    OperationRef::generated_id(2 * index),
                ));
            }
        }
        InsertMode::Plain => {
            for record in records {
                operations.push(WireOperation::insert(
                    record.table.clone(),
                    record.fields.clone(),
                    resolve_upsert(&record.table, upsert_rules),
                ));
            }
        }
    }

    let batch = WireBatch::new(operations);
    batch.validate()?;
    Ok(batch)
}
