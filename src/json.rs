//! Decoding of already-structured JSON input.
use crate::context::DecodeContext;
use crate::engine::{DecodeStrategy, Decoder};
use crate::result::DecodeResult;
use crate::schema::Schema;
use crate::value::Value;

/// JSON values are already typed: booleans must be JSON booleans and
/// object fields are read by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStrategy;

pub type JsonDecoder = Decoder<JsonStrategy>;

impl JsonDecoder {
    pub fn json(schema: Schema) -> Self {
        Decoder::new(schema, JsonStrategy)
    }
}

impl DecodeStrategy for JsonStrategy {
    type Input = serde_json::Value;

    fn preprocess(&self, input: serde_json::Value) -> Value {
        input.into()
    }

    fn decode_boolean(&self, _ctx: &DecodeContext, input: Value) -> DecodeResult {
        match input {
            Value::Bool(_) => DecodeResult::Success(input),
            other => DecodeResult::Failure(other),
        }
    }

    fn read_field(&self, _ctx: &DecodeContext, input: &Value, key: &str, _field: &Schema) -> Value {
        input.get(key).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DecodeOptions;
    use serde_json::json;

    #[test]
    fn booleans_are_not_parsed_from_text() {
        let d = JsonDecoder::json(Schema::object([("a", Schema::boolean()), ("b", Schema::boolean())]));
        let r = d.safe_decode(json!({ "a": true, "b": "false" }), DecodeOptions::default()).unwrap();
        assert_eq!(r.input().unwrap().to_json(), json!({ "a": true, "b": "false" }));
    }

    #[test]
    fn nested_objects_decode_by_key() {
        let d = JsonDecoder::json(Schema::object([(
            "filter",
            Schema::object([("min", Schema::number()), ("max", Schema::number().optional())]),
        )]));
        let out = d.decode(json!({ "filter": { "min": "2" } }), DecodeOptions::default()).unwrap();
        assert_eq!(out, json!({ "filter": { "min": 2 } }));
        assert!(out.get("filter").get("max").is_undefined());
    }
}
