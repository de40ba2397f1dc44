use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::ExecutionError;

/// A single field value inside a [`Row`](crate::model::Row).
///
/// Records are schemaless, so a field can hold any of the scalar kinds
/// below or a list of them. The representation is untagged: a JSON scalar
/// or array on an input line maps directly onto a variant, and the same
/// shape is written back out by the terminal write.
///
/// Ordering is defined only within a variant. [`Value::try_cmp`] compares
/// two values of the same kind (strings and lists lexicographically,
/// numbers and booleans by value, floats by total order) and fails when
/// the kinds differ; pipelines are expected to sort on homogeneous key
/// columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Human-readable kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Returns [`ExecutionError::IncomparableValues`] when the kinds
    /// differ, including inside nested lists.
    pub fn try_cmp(&self, other: &Value) -> Result<Ordering, ExecutionError> {
        let ordering = match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
            (Value::Int(left), Value::Int(right)) => left.cmp(right),
            (Value::Float(left), Value::Float(right)) => left.total_cmp(right),
            (Value::Str(left), Value::Str(right)) => left.cmp(right),
            (Value::List(left), Value::List(right)) => {
                for (l, r) in left.iter().zip(right.iter()) {
                    match l.try_cmp(r)? {
                        Ordering::Equal => continue,
                        decided => return Ok(decided),
                    }
                }
                left.len().cmp(&right.len())
            }
            (left, right) => {
                return Err(ExecutionError::IncomparableValues {
                    left: left.kind(),
                    right: right.kind(),
                })
            }
        };
        Ok(ordering)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_representation() {
        let decoded: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "word", [1, 2]]"#).unwrap();
        assert_eq!(
            decoded,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(2.5),
                Value::Str("word".to_string()),
                Value::List(vec![Value::Int(1), Value::Int(2)]),
            ]
        );

        let encoded = serde_json::to_string(&decoded).unwrap();
        assert_eq!(encoded, r#"[null,true,3,2.5,"word",[1,2]]"#);
    }

    #[test]
    fn test_within_variant_ordering() {
        assert_eq!(
            Value::Int(1).try_cmp(&Value::Int(2)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::Str("b".into()).try_cmp(&Value::Str("a".into())).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            Value::Float(1.5).try_cmp(&Value::Float(1.5)).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_list_ordering_is_lexicographic() {
        let short = Value::List(vec![Value::Int(1)]);
        let long = Value::List(vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(short.try_cmp(&long).unwrap(), Ordering::Less);

        let a = Value::List(vec![Value::Int(2)]);
        assert_eq!(a.try_cmp(&long).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_cross_variant_comparison_fails() {
        let error = Value::Int(1).try_cmp(&Value::Str("1".into())).unwrap_err();
        match error {
            ExecutionError::IncomparableValues { left, right } => {
                assert_eq!(left, "integer");
                assert_eq!(right, "string");
            }
            other => panic!("expected IncomparableValues, got {other:?}"),
        }
    }
}
