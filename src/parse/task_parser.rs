use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::task::Task;

/// The inbound payload could not be read as a sequence of records.
/// The caller falls back to an empty task list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("task data is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("task data must be an array of records, found {0}")]
    NotAnArray(&'static str),
}

/// A single record was rejected. The record is dropped; the load continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("record {index}: expected an object")]
    NotAnObject { index: usize },
    #[error("record {index}: missing field `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("record {index}: field `{field}` must be {expected}")]
    WrongType {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
    #[error("record {index}: displayOrder of {id} is not a 64-bit integer")]
    FractionalOrder { index: usize, id: String },
    #[error("record {index}: duplicate id {id}")]
    DuplicateId { index: usize, id: String },
}

impl ValidationError {
    /// Position of the offending record in the payload
    pub fn index(&self) -> usize {
        match self {
            ValidationError::NotAnObject { index }
            | ValidationError::MissingField { index, .. }
            | ValidationError::WrongType { index, .. }
            | ValidationError::FractionalOrder { index, .. }
            | ValidationError::DuplicateId { index, .. } => *index,
        }
    }
}

/// Result of a successful load: accepted tasks plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    pub dropped: Vec<ValidationError>,
}

/// Parse a serialized task list.
///
/// Absent, empty, whitespace-only, and `null` payloads load as an empty list.
/// Records failing validation are dropped individually and reported in
/// [`Loaded::dropped`]; a payload that isn't an array yields [`ParseError`].
pub fn load(raw: Option<&str>) -> Result<Loaded, ParseError> {
    let text = match raw {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Ok(Loaded::default()),
    };

    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let records = match value {
        Value::Array(records) => records,
        Value::Null => return Ok(Loaded::default()),
        other => return Err(ParseError::NotAnArray(json_kind(&other))),
    };

    let mut loaded = Loaded::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        match validate_record(index, record) {
            Ok(task) => {
                if seen.contains(&task.id) {
                    loaded.dropped.push(ValidationError::DuplicateId {
                        index,
                        id: task.id,
                    });
                    continue;
                }
                seen.insert(task.id.clone());
                loaded.tasks.push(task);
            }
            Err(e) => loaded.dropped.push(e),
        }
    }

    for e in &loaded.dropped {
        tracing::warn!(error = %e, "dropped task record");
    }
    Ok(loaded)
}

/// Validate one candidate record against the task schema.
pub fn validate_record(index: usize, record: &Value) -> Result<Task, ValidationError> {
    let obj = record
        .as_object()
        .ok_or(ValidationError::NotAnObject { index })?;

    let id = string_field(obj, index, "id")?;
    let name = string_field(obj, index, "name")?;

    let parent_id = match obj.get("parentId") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ValidationError::WrongType {
                index,
                field: "parentId",
                expected: "a string or null",
            });
        }
    };

    let display_order = match obj.get("displayOrder") {
        None => {
            return Err(ValidationError::MissingField {
                index,
                field: "displayOrder",
            });
        }
        Some(Value::Number(n)) => match integral(n) {
            Some(order) => order,
            None => return Err(ValidationError::FractionalOrder { index, id }),
        },
        Some(_) => {
            return Err(ValidationError::WrongType {
                index,
                field: "displayOrder",
                expected: "a number",
            });
        }
    };

    Ok(Task {
        id,
        name,
        parent_id,
        display_order,
    })
}

fn string_field(
    obj: &Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<String, ValidationError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            index,
            field,
            expected: "a string",
        }),
        None => Err(ValidationError::MissingField { index, field }),
    }
}

/// Integral value of a JSON number; `2.0` counts, `2.5` and overflow don't.
fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_and_blank_payloads_are_empty() {
        assert_eq!(load(None).unwrap(), Loaded::default());
        assert_eq!(load(Some("")).unwrap(), Loaded::default());
        assert_eq!(load(Some("   \n")).unwrap(), Loaded::default());
        assert_eq!(load(Some("null")).unwrap(), Loaded::default());
    }

    #[test]
    fn not_json_is_parse_error() {
        let err = load(Some("not json")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn object_payload_is_parse_error() {
        let err = load(Some(r#"{"id":"A"}"#)).unwrap_err();
        assert_eq!(err, ParseError::NotAnArray("an object"));
    }

    #[test]
    fn valid_records_load() {
        let loaded = load(Some(
            r#"[
                {"id":"A","name":"Alpha","displayOrder":1},
                {"id":"C","name":"Charlie","parentId":"A","displayOrder":1},
                {"id":"B","name":"Bravo","parentId":null,"displayOrder":2}
            ]"#,
        ))
        .unwrap();
        assert!(loaded.dropped.is_empty());
        assert_eq!(
            loaded.tasks,
            vec![
                Task::new("A", "Alpha", 1),
                Task::new("C", "Charlie", 1).with_parent("A"),
                Task::new("B", "Bravo", 2),
            ]
        );
    }

    #[test]
    fn invalid_records_dropped_not_fatal() {
        let loaded = load(Some(
            r#"[
                {"id":"A","name":"Alpha","displayOrder":1},
                {"id":7,"name":"Bad id","displayOrder":1},
                {"id":"B","displayOrder":2},
                {"id":"C","name":"Charlie","displayOrder":"3"},
                {"id":"D","name":"Delta","parentId":5,"displayOrder":4},
                "loose string",
                {"id":"E","name":"Echo","displayOrder":1.5},
                {"id":"A","name":"Again","displayOrder":9}
            ]"#,
        ))
        .unwrap();
        assert_eq!(loaded.tasks, vec![Task::new("A", "Alpha", 1)]);
        assert_eq!(
            loaded.dropped,
            vec![
                ValidationError::WrongType {
                    index: 1,
                    field: "id",
                    expected: "a string"
                },
                ValidationError::MissingField {
                    index: 2,
                    field: "name"
                },
                ValidationError::WrongType {
                    index: 3,
                    field: "displayOrder",
                    expected: "a number"
                },
                ValidationError::WrongType {
                    index: 4,
                    field: "parentId",
                    expected: "a string or null"
                },
                ValidationError::NotAnObject { index: 5 },
                ValidationError::FractionalOrder {
                    index: 6,
                    id: "E".into()
                },
                ValidationError::DuplicateId {
                    index: 7,
                    id: "A".into()
                },
            ]
        );
    }

    #[test]
    fn integral_float_order_accepted() {
        let loaded = load(Some(r#"[{"id":"A","name":"Alpha","displayOrder":2.0}]"#)).unwrap();
        assert_eq!(loaded.tasks[0].display_order, 2);
    }

    #[test]
    fn out_of_range_order_dropped() {
        let loaded = load(Some(
            r#"[
                {"id":"A","name":"a","displayOrder":9223372036854775808},
                {"id":"B","name":"b","displayOrder":9223372036854775808.0},
                {"id":"C","name":"c","displayOrder":9223372036854775807}
            ]"#,
        ))
        .unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].display_order, i64::MAX);
        assert_eq!(loaded.dropped.len(), 2);
        assert!(
            loaded
                .dropped
                .iter()
                .all(|e| matches!(e, ValidationError::FractionalOrder { .. }))
        );
    }

    #[test]
    fn extra_fields_ignored() {
        let loaded = load(Some(
            r#"[{"id":"A","name":"Alpha","displayOrder":1,"color":"red"}]"#,
        ))
        .unwrap();
        assert_eq!(loaded.tasks, vec![Task::new("A", "Alpha", 1)]);
    }

    #[test]
    fn validation_error_serializes_tagged() {
        let e = ValidationError::DuplicateId {
            index: 3,
            id: "A".into(),
        };
        assert_eq!(e.index(), 3);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"type":"duplicate_id","index":3,"id":"A"}"#);
    }
}
