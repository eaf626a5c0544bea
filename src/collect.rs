//! Field collection and additional-record merging.
//!
//! The collector turns a flat list of input elements into per-table field
//! trees; the merger folds caller-supplied additional records into them.
//! Both are pure transforms, both fail fast with typed errors, and both
//! run before any network activity.

use crate::element::InputElement;
use crate::error::ValidationError;
use crate::fields::FieldMap;
use crate::record::{AdditionalRecord, LogicalRecord};

/// Per-table field trees in first-appearance order.
pub type TableFields = Vec<(String, FieldMap)>;

/// Groups element values into per-table field trees.
///
/// Every element must be valid. If any element is invalid, the whole
/// collection fails with a single [`ValidationError::InvalidElements`]
/// aggregating each invalid element's column and error text; no partial
/// result is returned.
///
/// Valid elements have their value written into their table's tree at the
/// element's dotted column path, creating nesting as needed. Last write
/// wins when two elements target the same (table, path).
pub fn collect_elements(elements: &[InputElement]) -> Result<TableFields, ValidationError> {
    let mut details = String::new();
    for element in elements {
        if !element.is_valid {
            details.push_str(&element.column);
            details.push_str(": ");
            details.push_str(&element.error_text);
            details.push(' ');
        }
    }
    if !details.is_empty() {
        return Err(ValidationError::InvalidElements { details });
    }

    let mut tables: TableFields = Vec::new();
    for element in elements {
        let pos = match tables.iter().position(|(table, _)| *table == element.table) {
            Some(pos) => pos,
            None => {
                tables.push((element.table.clone(), FieldMap::new()));
                tables.len() - 1
            }
        };
        tables[pos].1.insert_path(&element.column, element.value.clone());
    }
    Ok(tables)
}

/// Merges additional records into collected fields and emits the final
/// ordered logical records.
///
/// For an additional record whose table was collected, every leaf path of
/// its fields is checked against the collected tree; any overlap fails
/// fast with [`ValidationError::DuplicateField`]. Non-colliding fields
/// merge in as defaults. Tables not collected are appended after the
/// collected tables, in additional-record order.
pub fn merge_additional(
    mut collected: TableFields,
    additional: &[AdditionalRecord],
) -> Result<Vec<LogicalRecord>, ValidationError> {
    for record in additional {
        match collected.iter_mut().find(|(table, _)| *table == record.table) {
            Some((_, fields)) => {
                for path in record.fields.leaf_paths() {
                    if fields.contains_path(&path) {
                        return Err(ValidationError::DuplicateField {
                            path,
                            table: record.table.clone(),
                        });
                    }
                }
                fields.merge_defaults(&record.fields);
            }
            None => collected.push((record.table.clone(), record.fields.clone())),
        }
    }

    Ok(collected
        .into_iter()
        .map(|(table, fields)| LogicalRecord::new(table, fields))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_groups_by_table() {
        let elements = vec![
            InputElement::valid("person", "name.first", json!("Jane")),
            InputElement::valid("person", "name.last", json!("Doe")),
            InputElement::valid("card", "card_number", json!("4111 1111 1111 1111")),
        ];

        let tables = collect_elements(&elements).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].0, "person");
        assert_eq!(
            tables[0].1.to_json(),
            json!({ "name": { "first": "Jane", "last": "Doe" } })
        );
        assert_eq!(tables[1].0, "card");
        assert_eq!(
            tables[1].1.to_json(),
            json!({ "card_number": "4111 1111 1111 1111" })
        );
    }

    #[test]
    fn test_collect_aggregates_all_invalid_elements() {
        let elements = vec![
            InputElement::invalid("person", "email", json!(""), "email is required"),
            InputElement::valid("person", "name.first", json!("Jane")),
            InputElement::invalid("card", "card_number", json!("41"), "invalid card number"),
        ];

        let err = collect_elements(&elements).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("email: email is required"));
        assert!(msg.contains("card_number: invalid card number"));
    }

    #[test]
    fn test_collect_empty_input() {
        let tables = collect_elements(&[]).unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_merge_detects_duplicate_leaf_path() {
        let collected = collect_elements(&[InputElement::valid(
            "person",
            "name.first",
            json!("Jane"),
        )])
        .unwrap();
        let additional = vec![AdditionalRecord::new(
            "person",
            FieldMap::from_json(&json!({ "name": { "first": "Janet" } })).unwrap(),
        )];

        let err = merge_additional(collected, &additional).unwrap_err();
        let ValidationError::DuplicateField { path, table } = err else {
            panic!("expected duplicate field error, got {err}");
        };
        assert_eq!(path, "name.first");
        assert_eq!(table, "person");
    }

    #[test]
    fn test_merge_array_leaf_collides_as_single_path() {
        let collected = collect_elements(&[InputElement::valid(
            "person",
            "phones",
            json!(["123"]),
        )])
        .unwrap();
        let additional = vec![AdditionalRecord::new(
            "person",
            FieldMap::from_json(&json!({ "phones": ["456"] })).unwrap(),
        )];

        let err = merge_additional(collected, &additional).unwrap_err();
        assert!(format!("{err}").contains("phones"));
    }

    #[test]
    fn test_merge_fills_in_missing_fields() {
        let collected = collect_elements(&[InputElement::valid(
            "person",
            "name.first",
            json!("Jane"),
        )])
        .unwrap();
        let additional = vec![AdditionalRecord::new(
            "person",
            FieldMap::from_json(&json!({ "name": { "last": "Doe" }, "country": "DE" })).unwrap(),
        )];

        let records = merge_additional(collected, &additional).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].table, "person");
        assert_eq!(
            records[0].fields.to_json(),
            json!({ "name": { "first": "Jane", "last": "Doe" }, "country": "DE" })
        );
    }

    #[test]
    fn test_merge_appends_unknown_tables_in_order() {
        let collected = collect_elements(&[InputElement::valid(
            "person",
            "email",
            json!("jane@example.com"),
        )])
        .unwrap();
        let additional = vec![
            AdditionalRecord::new(
                "account",
                FieldMap::from_json(&json!({ "iban": "DE00" })).unwrap(),
            ),
            AdditionalRecord::new(
                "address",
                FieldMap::from_json(&json!({ "city": "Berlin" })).unwrap(),
            ),
        ];

        let records = merge_additional(collected, &additional).unwrap();
        let tables: Vec<&str> = records.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["person", "account", "address"]);
    }
}
