use serde::de::DeserializeOwned;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Load a schema document with JSON-path context in error messages.
pub fn schema_from_str(src: &str) -> Result<Schema, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, Schema>(de).map_err(|err| SchemaError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn schema_from_slice(bytes: &[u8]) -> Result<Schema, SchemaError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, Schema>(de).map_err(|err| SchemaError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Deserialize an in-memory JSON value, returning `(path, message)` on error.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, (String, String)> {
    serde_path_to_error::deserialize::<_, T>(value)
        .map_err(|err| (err.path().to_string(), err.into_inner().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_name_the_failing_path() {
        let err = schema_from_str(r#"{"type":"object","fields":{"a":{"type":"array"}}}"#).unwrap_err();
        assert!(err.message.contains("element"), "{err}");

        let err = schema_from_str(r#"{"type":"object","fields":{"a":{"type":"tuple"}}}"#).unwrap_err();
        assert!(err.message.contains("tuple"), "{err}");
    }

    #[test]
    fn schema_from_slice_loads_documents() {
        let s = schema_from_slice(br#"{"type":"nullable","inner":{"type":"boolean"}}"#).unwrap();
        assert_eq!(s, Schema::boolean().nullable());
    }
}
