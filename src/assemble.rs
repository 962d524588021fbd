//! Response assembly: decoded JSON into typed entities.
//!
//! Every entity is built in two phases. A private raw record is deserialized
//! first, then a builder produces the public entity with derived fields
//! computed and nested lists resolved into typed collections. Errors name
//! the model being built and the underlying cause.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::collection::{Model, ModelList};
use crate::error::{BigsdbError, Result};

/// Construct a value from a decoded JSON document.
pub trait FromJson: Sized {
    /// Model name used in error messages.
    const NAME: &'static str;

    /// Build the value, failing with a shape error if `value` does not fit.
    fn from_json(value: Value) -> Result<Self>;
}

/// Human-readable JSON type of a value.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserialize the raw record of `model`, which must be a JSON object.
pub(crate) fn raw_record<R: DeserializeOwned>(model: &'static str, value: Value) -> Result<R> {
    if !value.is_object() {
        return Err(BigsdbError::shape(
            model,
            format!("expected a JSON object, got {}", json_type(&value)),
        ));
    }
    serde_json::from_value(value).map_err(|e| BigsdbError::shape(model, e))
}

/// Turn a raw list field of `parent` into a typed collection.
pub(crate) fn nested_list<T: Model>(
    parent: &'static str,
    field: &'static str,
    values: Vec<Value>,
) -> Result<ModelList<T>> {
    values
        .into_iter()
        .map(T::from_json)
        .collect::<Result<Vec<T>>>()
        .map(ModelList::new)
        .map_err(|e| {
            BigsdbError::shape(
                parent,
                format!("field '{field}': error instantiating {} objects: {e}", T::NAME),
            )
        })
}

/// Accept identifiers BIGSdb sends either as strings or as bare numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    }

    #[test]
    fn test_raw_record_rejects_non_objects() {
        let err = raw_record::<Sample>("Sample", json!([1, 2])).unwrap_err();
        assert!(err.is_shape());
        assert!(err.to_string().contains("expected a JSON object, got array"));
    }

    #[test]
    fn test_raw_record_names_model_on_missing_field() {
        let err = raw_record::<Sample>("Sample", json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Cannot build Sample"), "{msg}");
        assert!(msg.contains("missing field `id`"), "{msg}");
    }

    #[test]
    fn test_string_or_number() {
        let s: Sample = raw_record("Sample", json!({"id": 7})).unwrap();
        assert_eq!(s.id, "7");
        let s: Sample = raw_record("Sample", json!({"id": "7a"})).unwrap();
        assert_eq!(s.id, "7a");
    }
}
