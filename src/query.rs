//! Query-string decoding.
//!
//! Every accepted input shape is normalized into `QueryParams`, an ordered
//! multi-map. Array-shaped fields read every value under their key, all other
//! fields read the first one.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use url::form_urlencoded;

use crate::context::DecodeContext;
use crate::engine::{DecodeStrategy, Decoder};
use crate::result::DecodeResult;
use crate::schema::{unwrap_structural, Schema};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// PARAMS
// ————————————————————————————————————————————————————————————————————————————

/// Ordered `key=value` pairs; keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `application/x-www-form-urlencoded` text. A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Every value under `key`, in encounter order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Distinct keys, in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !out.contains(&k.as_str()) {
                out.push(k);
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// `{"key": ["v1", "v2"]}`, keys in first-seen order.
    pub fn to_json(&self) -> serde_json::Value {
        let mut grouped: IndexMap<&str, Vec<serde_json::Value>> = IndexMap::new();
        for (k, v) in self.iter() {
            grouped.entry(k).or_default().push(serde_json::Value::from(v));
        }
        serde_json::Value::Object(
            grouped
                .into_iter()
                .map(|(k, vs)| (k.to_string(), serde_json::Value::Array(vs)))
                .collect(),
        )
    }
}

impl FromStr for QueryParams {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QueryParams::parse(s))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INPUT SHAPES
// ————————————————————————————————————————————————————————————————————————————

/// Raw inputs the query decoder accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryInput {
    #[default]
    None,
    /// `a=1&b=x&b=y`
    Str(String),
    Params(QueryParams),
    /// `[["a", "1"], ["b", "x"]]`
    Pairs(Vec<(String, String)>),
    /// A plain string-keyed mapping; one value per key.
    Map(IndexMap<String, String>),
}

impl From<QueryInput> for QueryParams {
    fn from(input: QueryInput) -> Self {
        match input {
            QueryInput::None => QueryParams::new(),
            QueryInput::Str(s) => QueryParams::parse(&s),
            QueryInput::Params(p) => p,
            QueryInput::Pairs(pairs) => pairs.into_iter().collect(),
            QueryInput::Map(map) => map.into_iter().collect(),
        }
    }
}

impl From<&str> for QueryInput {
    fn from(s: &str) -> Self {
        QueryInput::Str(s.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(s: String) -> Self {
        QueryInput::Str(s)
    }
}

impl From<QueryParams> for QueryInput {
    fn from(p: QueryParams) -> Self {
        QueryInput::Params(p)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for QueryInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        QueryInput::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<IndexMap<String, String>> for QueryInput {
    fn from(map: IndexMap<String, String>) -> Self {
        QueryInput::Map(map)
    }
}

impl<T: Into<QueryInput>> From<Option<T>> for QueryInput {
    fn from(input: Option<T>) -> Self {
        input.map(Into::into).unwrap_or_default()
    }
}

impl QueryInput {
    /// Read a JSON document as query input: an object of scalars becomes a
    /// mapping, an array of two-element arrays becomes pairs, a string is
    /// parsed as a query. Non-string scalars are stringified.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value as J;
        fn scalar(v: J) -> Option<String> {
            match v {
                J::String(s) => Some(s),
                J::Number(n) => Some(n.to_string()),
                J::Bool(b) => Some(b.to_string()),
                J::Null => Some("null".to_string()),
                J::Array(_) | J::Object(_) => None,
            }
        }
        match value {
            J::String(s) => Some(QueryInput::Str(s)),
            J::Object(m) => m
                .into_iter()
                .map(|(k, v)| scalar(v).map(|v| (k, v)))
                .collect::<Option<IndexMap<_, _>>>()
                .map(QueryInput::Map),
            J::Array(xs) => xs
                .into_iter()
                .map(|pair| match pair {
                    J::Array(kv) if kv.len() == 2 => {
                        let mut kv = kv.into_iter();
                        Some((scalar(kv.next()?)?, scalar(kv.next()?)?))
                    }
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(QueryInput::Pairs),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// STRATEGY
// ————————————————————————————————————————————————————————————————————————————

pub type BooleanStrategy = Arc<dyn Fn(&Value) -> DecodeResult + Send + Sync>;

#[derive(Clone, Default)]
pub struct QueryStrategy {
    decode_boolean: Option<BooleanStrategy>,
}

impl fmt::Debug for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStrategy")
            .field("custom_boolean", &self.decode_boolean.is_some())
            .finish()
    }
}

impl QueryStrategy {
    /// Replace the JSON-literal boolean rule.
    pub fn with_boolean<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> DecodeResult + Send + Sync + 'static,
    {
        self.decode_boolean = Some(Arc::new(f));
        self
    }
}

pub type QueryDecoder = Decoder<QueryStrategy>;

impl QueryDecoder {
    pub fn query(schema: Schema) -> Self {
        Decoder::new(schema, QueryStrategy::default())
    }
}

/// `true`/`false` as JSON literals, surrounding whitespace allowed.
/// Anything else, including other valid JSON, is a failure.
pub fn decode_json_boolean(input: &Value) -> DecodeResult {
    match input {
        Value::Bool(b) => DecodeResult::Success(Value::Bool(*b)),
        Value::String(s) => match serde_json::from_str::<serde_json::Value>(s) {
            Ok(serde_json::Value::Bool(b)) => DecodeResult::Success(Value::Bool(b)),
            _ => DecodeResult::Failure(input.clone()),
        },
        _ => DecodeResult::Failure(input.clone()),
    }
}

impl DecodeStrategy for QueryStrategy {
    type Input = QueryInput;

    fn preprocess(&self, input: QueryInput) -> Value {
        Value::Params(QueryParams::from(input))
    }

    fn decode_boolean(&self, _ctx: &DecodeContext, input: Value) -> DecodeResult {
        match &self.decode_boolean {
            Some(f) => f(&input),
            None => decode_json_boolean(&input),
        }
    }

    fn read_field(&self, _ctx: &DecodeContext, input: &Value, key: &str, field: &Schema) -> Value {
        match input {
            Value::Params(params) if unwrap_structural(field).is_array() => {
                Value::Array(params.get_all(key).map(Value::from).collect())
            }
            Value::Params(params) => params.get(key).map(Value::from).unwrap_or(Value::Null),
            other => other.get(key).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_handles_encoding_and_repeats() {
        let p = QueryParams::parse("?a=1&b=x+y&b=%F0%9F%A6%80&c");
        assert_eq!(p.get("a"), Some("1"));
        assert_eq!(p.get_all("b").collect::<Vec<_>>(), vec!["x y", "🦀"]);
        assert_eq!(p.get("c"), Some(""));
        assert_eq!(p.get("d"), None);
        assert_eq!(p.get_all("d").count(), 0);
        assert_eq!(p.keys(), vec!["a", "b", "c"]);
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn query_string_roundtrip_keeps_order() {
        let p: QueryParams = "b=2&a=1&b=3".parse().unwrap();
        assert_eq!(p.to_string(), "b=2&a=1&b=3");
        assert_eq!(p.to_json(), json!({ "b": ["2", "3"], "a": ["1"] }));
    }

    #[test]
    fn every_input_shape_normalizes_to_params() {
        let expected: QueryParams = vec![("a", "1"), ("b", "x")].into_iter().collect();
        let mut map = IndexMap::new();
        map.insert("a".to_string(), "1".to_string());
        map.insert("b".to_string(), "x".to_string());
        let inputs = [
            QueryInput::from("a=1&b=x"),
            QueryInput::from(expected.clone()),
            QueryInput::from(vec![("a", "1"), ("b", "x")]),
            QueryInput::from(map),
        ];
        for input in inputs {
            assert_eq!(QueryParams::from(input), expected);
        }
        assert!(QueryParams::from(QueryInput::from(None::<&str>)).is_empty());
    }

    #[test]
    fn json_documents_as_input() {
        assert_eq!(
            QueryInput::from_json(json!({ "a": 1, "b": "x" })),
            Some(QueryInput::Map(
                [("a".to_string(), "1".to_string()), ("b".to_string(), "x".to_string())].into_iter().collect()
            ))
        );
        assert_eq!(
            QueryInput::from_json(json!([["a", "1"], ["a", "2"]])),
            Some(QueryInput::from(vec![("a", "1"), ("a", "2")]))
        );
        assert_eq!(QueryInput::from_json(json!([["a"]])), None);
        assert_eq!(QueryInput::from_json(json!({ "a": [1] })), None);
    }

    #[test]
    fn json_boolean_literals() {
        assert_eq!(decode_json_boolean(&Value::from("true")), DecodeResult::success(Value::Bool(true)));
        assert_eq!(decode_json_boolean(&Value::from(" false ")), DecodeResult::success(Value::Bool(false)));
        for raw in ["1", "yes", "True", "", "\"true\""] {
            assert_eq!(decode_json_boolean(&Value::from(raw)), DecodeResult::failure(raw));
        }
        assert_eq!(decode_json_boolean(&Value::Null), DecodeResult::failure(Value::Null));
    }

    #[test]
    fn read_field_picks_single_or_all() {
        let strategy = QueryStrategy::default();
        let ctx = DecodeContext::default();
        let input = Value::Params(QueryParams::parse("a=1&a=2"));
        let many = Schema::string().array().optional();
        assert_eq!(strategy.read_field(&ctx, &input, "a", &many), Value::from(vec!["1", "2"]));
        assert_eq!(strategy.read_field(&ctx, &input, "a", &Schema::string()), Value::from("1"));
        assert_eq!(strategy.read_field(&ctx, &input, "z", &many), Value::Array(vec![]));
        assert_eq!(strategy.read_field(&ctx, &input, "z", &Schema::string()), Value::Null);
    }
}
