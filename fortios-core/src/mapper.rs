//! Mapper - Generic field mapping between wire records and typed state
//!
//! One traversal serves every object type:
//!
//! - `to_state` (flatten) copies a decoded API response into the state,
//!   field by field, following the object's descriptor table.
//! - `to_record` (expand) builds an API request body from the state.
//!
//! Nested blocks are walked element by element. Elements are addressed with
//! positional paths of the form `<field>.<index>.<subfield>`.

use std::collections::HashMap;

use crate::resource::Value;
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema, TypeError};
use crate::transform::TransformError;

/// Untyped record: one decoded REST payload
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Read access to typed state
pub trait StateReader {
    /// Look up a value by path (`"name"`, `"rule.0.action"`).
    /// Returns `None` when nothing is set at that path.
    fn get_ok(&self, path: &str) -> Option<&Value>;
}

/// Write access to typed state
pub trait StateWriter {
    /// Store a value, rejecting it if it does not have the shape of `attr_type`
    fn set(&mut self, key: &str, value: Value, attr_type: &AttributeType)
    -> Result<(), TypeError>;
}

impl StateReader for HashMap<String, Value> {
    fn get_ok(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = HashMap::get(self, segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                Value::Map(map) => map.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl StateWriter for HashMap<String, Value> {
    fn set(
        &mut self,
        key: &str,
        value: Value,
        attr_type: &AttributeType,
    ) -> Result<(), TypeError> {
        check_shape(attr_type, &value)?;
        self.insert(key.to_string(), value);
        Ok(())
    }
}

/// Shallow type check used when storing device values.
///
/// Enum membership and validation constraints are not enforced here: the
/// device is the source of truth for what it reports.
fn check_shape(attr_type: &AttributeType, value: &Value) -> Result<(), TypeError> {
    let ok = match (attr_type.base(), value) {
        (AttributeType::String | AttributeType::Enum(_), Value::String(_)) => true,
        (AttributeType::Int, Value::Int(_)) => true,
        (AttributeType::Bool, Value::Bool(_)) => true,
        (AttributeType::List(inner), Value::List(items)) => {
            for (index, item) in items.iter().enumerate() {
                check_shape(inner, item).map_err(|e| TypeError::ListItemError {
                    index,
                    inner: Box::new(e),
                })?;
            }
            true
        }
        (AttributeType::Block(_), Value::List(items)) => {
            items.iter().all(|item| matches!(item, Value::Map(_)))
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(TypeError::TypeMismatch {
            expected: attr_type.type_name(),
            got: value.type_name(),
        })
    }
}

/// Field mapping error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("Error reading {path}: {source}")]
    Read { path: String, source: TypeError },

    #[error("Error expanding {path}: {source}")]
    Expand {
        path: String,
        source: TransformError,
    },
}

/// Field descriptors of an object type, rendered for display
pub fn describe(schema: &ResourceSchema) -> serde_json::Value {
    serde_json::Value::Array(schema.attributes.iter().map(|a| a.describe()).collect())
}

/// Copy a decoded API response into state.
///
/// Absent and `null` fields are skipped. Every field is attempted; rejected
/// writes are collected and returned together, except where the device
/// reported a blank value, which is tolerated.
pub fn to_state<W: StateWriter>(
    fields: &[AttributeSchema],
    record: &Record,
    state: &mut W,
) -> Result<(), Vec<MappingError>> {
    let mut errors = Vec::new();
    flatten_fields(fields, record, state, "", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn flatten_fields<W: StateWriter>(
    fields: &[AttributeSchema],
    record: &Record,
    state: &mut W,
    prefix: &str,
    errors: &mut Vec<MappingError>,
) {
    for field in fields {
        let Some(wire_key) = &field.provider_name else {
            continue;
        };
        let Some(raw) = record.get(wire_key) else {
            continue;
        };
        let path = join_path(prefix, &field.name);

        let value = match (&field.attr_type, raw) {
            (AttributeType::Block(sub_fields), serde_json::Value::Array(items)) => {
                Ok(Some(flatten_block(sub_fields, items, &path, errors)))
            }
            (_, serde_json::Value::Array(items)) => match items.iter().position(|i| i.is_null()) {
                Some(index) => Err(null_item_error(&field.attr_type, index)),
                None => Ok(field.transform.flatten(raw, &field.attr_type)),
            },
            _ => Ok(field.transform.flatten(raw, &field.attr_type)),
        };
        let result = match value {
            Ok(Some(value)) => state.set(&field.name, value, &field.attr_type),
            Ok(None) => continue,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            if api_may_omit(raw) {
                log::warn!("ignoring blank value for {}: {}", path, e);
                continue;
            }
            errors.push(MappingError::Read { path, source: e });
        }
    }
}

fn flatten_block(
    fields: &[AttributeSchema],
    items: &[serde_json::Value],
    path: &str,
    errors: &mut Vec<MappingError>,
) -> Value {
    let mut elements = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{}.{}", path, index);
        let mut element: HashMap<String, Value> = HashMap::new();
        match item {
            serde_json::Value::Object(record) => {
                flatten_fields(fields, record, &mut element, &item_path, errors);
            }
            other => errors.push(MappingError::Read {
                path: item_path,
                source: TypeError::TypeMismatch {
                    expected: "Map".to_string(),
                    got: json_type_name(other).to_string(),
                },
            }),
        }
        elements.push(Value::Map(element));
    }
    Value::List(elements)
}

/// Build an API request body from state.
///
/// Fields without a value are left out. With `delete_mode` every mapped
/// field is sent as a reset sentinel instead: `null` for scalars, `[]` for
/// lists and nested blocks. The first failing transform aborts the pass.
pub fn to_record<R: StateReader>(
    fields: &[AttributeSchema],
    state: &R,
    delete_mode: bool,
) -> Result<Record, MappingError> {
    expand_fields(fields, state, "", delete_mode)
}

fn expand_fields<R: StateReader>(
    fields: &[AttributeSchema],
    state: &R,
    prefix: &str,
    delete_mode: bool,
) -> Result<Record, MappingError> {
    let mut record = Record::new();

    for field in fields {
        let Some(wire_key) = &field.provider_name else {
            continue;
        };

        if delete_mode {
            let sentinel = match field.attr_type.base() {
                AttributeType::Block(_) | AttributeType::List(_) => {
                    serde_json::Value::Array(Vec::new())
                }
                _ => serde_json::Value::Null,
            };
            record.insert(wire_key.clone(), sentinel);
            continue;
        }

        let path = join_path(prefix, &field.name);
        let Some(value) = state.get_ok(&path) else {
            continue;
        };

        let wire = match &field.attr_type {
            AttributeType::Block(sub_fields) => {
                let count = value.as_list().map(|items| items.len()).ok_or_else(|| {
                    MappingError::Expand {
                        path: path.clone(),
                        source: TransformError::Unexpected {
                            expected: "List".to_string(),
                            got: value.type_name(),
                        },
                    }
                })?;
                let mut items = Vec::with_capacity(count);
                for index in 0..count {
                    let item_path = format!("{}.{}", path, index);
                    let item = expand_fields(sub_fields, state, &item_path, false)?;
                    items.push(serde_json::Value::Object(item));
                }
                serde_json::Value::Array(items)
            }
            _ => field
                .transform
                .expand(value)
                .map_err(|source| MappingError::Expand {
                    path: path.clone(),
                    source,
                })?,
        };

        record.insert(wire_key.clone(), wire);
    }

    Ok(record)
}

/// Blank values the API is known to report for unset fields
/// A `null` list element has no state representation; dropping it would
/// shift every later element
fn null_item_error(attr_type: &AttributeType, index: usize) -> TypeError {
    let expected = match attr_type.base() {
        AttributeType::List(inner) => inner.type_name(),
        other => other.type_name(),
    };
    TypeError::ListItemError {
        index,
        inner: Box::new(TypeError::TypeMismatch {
            expected,
            got: "Null".to_string(),
        }),
    }
}

fn api_may_omit(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "Null",
        serde_json::Value::Bool(_) => "Bool",
        serde_json::Value::Number(_) => "Number",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "List",
        serde_json::Value::Object(_) => "Map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types;
    use crate::transform::Transform;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    fn dnstranslation_fields() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::new("fosid", AttributeType::Int).with_provider_name("id"),
            AttributeSchema::new("src", AttributeType::String),
            AttributeSchema::new("dst", AttributeType::String),
            AttributeSchema::new("netmask", AttributeType::String),
            AttributeSchema::new("vdomparam", AttributeType::String).host_only(),
        ]
    }

    fn prefix_list_fields() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::new("name", AttributeType::String),
            AttributeSchema::new(
                "rule",
                AttributeType::Block(vec![
                    AttributeSchema::new("id", AttributeType::Int),
                    AttributeSchema::new("action", types::enumeration(&["permit", "deny"])),
                    AttributeSchema::new("prefix", AttributeType::String),
                    AttributeSchema::new("ge", AttributeType::Int),
                    AttributeSchema::new("le", AttributeType::Int),
                    AttributeSchema::new("flags", AttributeType::Int),
                ]),
            ),
        ]
    }

    #[test]
    fn dnstranslation_round_trip() {
        let wire = record(json!({
            "id": 3,
            "src": "1.1.1.1",
            "dst": "2.2.2.2",
            "netmask": "255.255.255.0"
        }));
        let fields = dnstranslation_fields();

        let mut state = HashMap::new();
        to_state(&fields, &wire, &mut state).unwrap();

        assert_eq!(state.get("fosid"), Some(&Value::Int(3)));
        assert_eq!(state.get("src"), Some(&Value::String("1.1.1.1".to_string())));
        assert_eq!(state.get("dst"), Some(&Value::String("2.2.2.2".to_string())));
        assert_eq!(
            state.get("netmask"),
            Some(&Value::String("255.255.255.0".to_string()))
        );
        assert_eq!(state.len(), 4);

        let back = to_record(&fields, &state, false).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn prefix_list_rule_round_trip() {
        let wire = record(json!({
            "name": "pl1",
            "rule": [{
                "id": 1,
                "action": "permit",
                "prefix": "10.0.0.0/8",
                "ge": 8,
                "le": 24,
                "flags": 0
            }]
        }));
        let fields = prefix_list_fields();

        let mut state = HashMap::new();
        to_state(&fields, &wire, &mut state).unwrap();

        let rules = state.get("rule").and_then(Value::as_list).unwrap();
        assert_eq!(rules.len(), 1);
        let rule = rules[0].as_map().unwrap();
        assert_eq!(rule.len(), 6);
        assert_eq!(rule["id"], Value::Int(1));
        assert_eq!(rule["action"], Value::String("permit".to_string()));
        assert_eq!(rule["prefix"], Value::String("10.0.0.0/8".to_string()));
        assert_eq!(rule["ge"], Value::Int(8));
        assert_eq!(rule["le"], Value::Int(24));
        assert_eq!(rule["flags"], Value::Int(0));

        assert_eq!(state.get_ok("rule.0.le"), Some(&Value::Int(24)));

        let back = to_record(&fields, &state, false).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn nested_lists_keep_order_and_count() {
        let wire = record(json!({
            "rule": [
                {"id": 30, "action": "deny"},
                {"id": 10, "action": "permit"},
                {"id": 20, "action": "permit"}
            ]
        }));
        let fields = prefix_list_fields();

        let mut state = HashMap::new();
        to_state(&fields, &wire, &mut state).unwrap();

        let ids: Vec<i64> = state["rule"]
            .as_list()
            .unwrap()
            .iter()
            .map(|r| r.as_map().unwrap()["id"].as_int().unwrap())
            .collect();
        assert_eq!(ids, vec![30, 10, 20]);

        let back = to_record(&fields, &state, false).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn absent_and_null_fields_are_skipped() {
        let wire = record(json!({"src": "1.1.1.1", "dst": null, "unknown": 1}));
        let mut state = HashMap::new();
        to_state(&dnstranslation_fields(), &wire, &mut state).unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.contains_key("src"));
    }

    #[test]
    fn type_mismatch_is_reported_for_every_field() {
        let wire = record(json!({"id": "three", "src": 5, "dst": "2.2.2.2"}));
        let mut state = HashMap::new();
        let errors = to_state(&dnstranslation_fields(), &wire, &mut state).unwrap_err();

        let paths: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                MappingError::Read { path, .. } => path.as_str(),
                MappingError::Expand { path, .. } => path.as_str(),
            })
            .collect();
        assert_eq!(paths, vec!["fosid", "src"]);
        // The well-typed field is still written
        assert_eq!(state.get("dst"), Some(&Value::String("2.2.2.2".to_string())));
    }

    #[test]
    fn blank_values_are_tolerated() {
        let wire = record(json!({"id": "", "rule": ""}));
        let fields = vec![
            AttributeSchema::new("fosid", AttributeType::Int).with_provider_name("id"),
            prefix_list_fields().remove(1),
        ];
        let mut state = HashMap::new();
        assert!(to_state(&fields, &wire, &mut state).is_ok());
        assert!(state.is_empty());
    }

    #[test]
    fn null_list_items_are_rejected() {
        let fields = vec![AttributeSchema::new(
            "members",
            AttributeType::List(Box::new(AttributeType::String)),
        )];
        let wire = record(json!({"members": ["a", null, "b"]}));
        let mut state = HashMap::new();

        let errors = to_state(&fields, &wire, &mut state).unwrap_err();
        assert_eq!(
            errors,
            vec![MappingError::Read {
                path: "members".to_string(),
                source: TypeError::ListItemError {
                    index: 1,
                    inner: Box::new(TypeError::TypeMismatch {
                        expected: "String".to_string(),
                        got: "Null".to_string(),
                    }),
                },
            }]
        );
        assert!(!state.contains_key("members"));
    }

    #[test]
    fn huge_wire_integers_are_rejected() {
        let fields = vec![AttributeSchema::new("flags", AttributeType::Int)];
        let wire = record(json!({"flags": u64::MAX}));
        let mut state = HashMap::new();

        let errors = to_state(&fields, &wire, &mut state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(state.get("flags").is_none());
    }

    #[test]
    fn nested_errors_carry_positional_path() {
        let wire = record(json!({"rule": [{"id": 1}, {"id": "x"}]}));
        let mut state = HashMap::new();
        let errors = to_state(&prefix_list_fields(), &wire, &mut state).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            MappingError::Read { path, .. } if path == "rule.1.id"
        ));
    }

    #[test]
    fn delete_mode_sends_reset_sentinels() {
        let mut state = HashMap::new();
        state.insert("name".to_string(), Value::String("pl1".to_string()));

        let body = to_record(&prefix_list_fields(), &state, true).unwrap();
        assert_eq!(body, record(json!({"name": null, "rule": []})));
    }

    #[test]
    fn host_only_fields_never_reach_the_wire() {
        let mut state = HashMap::new();
        state.insert("vdomparam".to_string(), Value::String("root".to_string()));
        let body = to_record(&dnstranslation_fields(), &state, false).unwrap();
        assert!(body.is_empty());

        let body = to_record(&dnstranslation_fields(), &state, true).unwrap();
        assert!(!body.contains_key("vdomparam"));
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn first_expand_error_aborts() {
        let fields = vec![
            AttributeSchema::new("subnet", AttributeType::String).with_transform(Transform::IpMask),
            AttributeSchema::new("count", AttributeType::Int).with_transform(Transform::IntCoerce),
        ];
        let mut state = HashMap::new();
        state.insert("subnet".to_string(), Value::String("10.0.0.0/99".to_string()));
        state.insert("count".to_string(), Value::String("x".to_string()));

        match to_record(&fields, &state, false) {
            Err(MappingError::Expand { path, .. }) => assert_eq!(path, "subnet"),
            other => panic!("Expected Expand error, got {:?}", other),
        }
    }

    #[test]
    fn reader_resolves_paths() {
        let mut state: HashMap<String, Value> = HashMap::new();
        state.insert(
            "collectors".to_string(),
            Value::List(vec![Value::Map(HashMap::from([(
                "collector_port".to_string(),
                Value::Int(2055),
            )]))]),
        );
        assert_eq!(
            state.get_ok("collectors.0.collector_port"),
            Some(&Value::Int(2055))
        );
        assert_eq!(state.get_ok("collectors.1.collector_port"), None);
        assert_eq!(state.get_ok("collectors.x"), None);
        assert_eq!(state.get_ok("missing"), None);
    }

    #[test]
    fn describe_lists_descriptors_in_order() {
        let schema = ResourceSchema::new("firewall_dnstranslation")
            .attribute(
                AttributeSchema::new("fosid", AttributeType::Int)
                    .with_provider_name("id")
                    .int_between(0, 4294967295),
            )
            .attribute(AttributeSchema::new("src", AttributeType::String));
        let described = describe(&schema);
        assert_eq!(described[0]["name"], json!("fosid"));
        assert_eq!(described[0]["wire_key"], json!("id"));
        assert_eq!(
            described[0]["validation"],
            json!({"int_between": [0, 4294967295i64]})
        );
        assert_eq!(described[1]["wire_key"], json!("src"));
    }
}
