//! Schema node tree consumed by the decoder.
//!
//! A closed sum type: the decoder matches it exhaustively, so adding a kind
//! here fails to compile until the engine handles it.
//!
//! Schema documents are JSON, internally tagged by `"type"`:
//! `{"type":"object","fields":{"a":{"type":"array","element":{"type":"number"}}}}`
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    String,
    Number,
    Boolean,
    Enum {
        options: Vec<String>,
    },
    Optional {
        inner: Box<Schema>,
    },
    Nullable {
        inner: Box<Schema>,
    },
    /// `value` is applied by the schema layer after decoding, never by the walk.
    Default {
        inner: Box<Schema>,
        value: serde_json::Value,
    },
    /// Transform/refinement wrapper. Structurally it is its source schema.
    Effect {
        inner: Box<Schema>,
        #[serde(default)]
        effect: EffectKind,
    },
    Object {
        fields: IndexMap<String, Schema>,
    },
    Array {
        element: Box<Schema>,
    },

    // Describable, but the decoder has no rule for them.
    Literal {
        value: serde_json::Value,
    },
    Union {
        options: Vec<Schema>,
    },
    Record {
        value: Box<Schema>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Transform,
    Refinement,
    Preprocess,
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDERS
// ————————————————————————————————————————————————————————————————————————————

impl Schema {
    pub fn string() -> Self {
        Schema::String
    }

    pub fn number() -> Self {
        Schema::Number
    }

    pub fn boolean() -> Self {
        Schema::Boolean
    }

    pub fn enumeration<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum { options: options.into_iter().map(Into::into).collect() }
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object { fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }

    pub fn array_of(element: Schema) -> Self {
        Schema::Array { element: Box::new(element) }
    }

    pub fn array(self) -> Self {
        Schema::array_of(self)
    }

    pub fn optional(self) -> Self {
        Schema::Optional { inner: Box::new(self) }
    }

    pub fn nullable(self) -> Self {
        Schema::Nullable { inner: Box::new(self) }
    }

    pub fn with_default(self, value: serde_json::Value) -> Self {
        Schema::Default { inner: Box::new(self), value }
    }

    pub fn transform(self) -> Self {
        Schema::Effect { inner: Box::new(self), effect: EffectKind::Transform }
    }

    pub fn refine(self) -> Self {
        Schema::Effect { inner: Box::new(self), effect: EffectKind::Refinement }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Schema::String => "string",
            Schema::Number => "number",
            Schema::Boolean => "boolean",
            Schema::Enum { .. } => "enum",
            Schema::Optional { .. } => "optional",
            Schema::Nullable { .. } => "nullable",
            Schema::Default { .. } => "default",
            Schema::Effect { .. } => "effect",
            Schema::Object { .. } => "object",
            Schema::Array { .. } => "array",
            Schema::Literal { .. } => "literal",
            Schema::Union { .. } => "union",
            Schema::Record { .. } => "record",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Schema::Array { .. })
    }

    /// Declared fields of an object schema, in order.
    pub fn fields(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Schema::Object { fields } => Some(fields),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTROSPECTION
// ————————————————————————————————————————————————————————————————————————————

/// Strip effect, nullable/optional and default wrappers down to the
/// innermost structural node. Only for shape tests; decoding still walks
/// wrapper by wrapper.
pub fn unwrap_structural(schema: &Schema) -> &Schema {
    match schema {
        Schema::Effect { inner, .. } => unwrap_structural(inner),
        Schema::Nullable { inner } | Schema::Optional { inner } => unwrap_structural(inner),
        Schema::Default { inner, .. } => unwrap_structural(inner),
        _ => schema,
    }
}

/// `string().nullable().optional()` → `string()`
pub fn unwrap_nullish(schema: &Schema) -> &Schema {
    match schema {
        Schema::Nullable { inner } | Schema::Optional { inner } => unwrap_nullish(inner),
        _ => schema,
    }
}

/// Rebuild the optional/nullable chain of `wrapper` around `inner`.
///
/// `string().nullable().optional()`, `number()` → `number().nullable().optional()`
pub fn replace_nullish(wrapper: &Schema, inner: Schema) -> Schema {
    match wrapper {
        Schema::Nullable { inner: w } => replace_nullish(w, inner).nullable(),
        Schema::Optional { inner: w } => replace_nullish(w, inner).optional(),
        _ => inner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwrap_structural_strips_every_wrapper() {
        let s = Schema::string()
            .array()
            .transform()
            .nullable()
            .with_default(json!([]))
            .optional();
        assert!(unwrap_structural(&s).is_array());
        assert_eq!(unwrap_structural(&Schema::number()), &Schema::Number);
    }

    #[test]
    fn unwrap_structural_stops_at_containers() {
        let s = Schema::string().optional().array();
        // the array itself is the structural node, its element stays wrapped
        assert_eq!(unwrap_structural(&s), &s);
    }

    #[test]
    fn unwrap_nullish_keeps_other_wrappers() {
        let s = Schema::string().transform().nullable().optional();
        assert_eq!(unwrap_nullish(&s), &Schema::string().transform());
    }

    #[test]
    fn replace_nullish_preserves_wrapper_order() {
        let s = Schema::string().nullable().optional();
        assert_eq!(replace_nullish(&s, Schema::number()), Schema::number().nullable().optional());
        assert_eq!(replace_nullish(&Schema::string(), Schema::boolean()), Schema::boolean());
    }

    #[test]
    fn schema_documents_are_tagged_by_type() {
        let s: Schema = serde_json::from_value(json!({
            "type": "object",
            "fields": {
                "q": { "type": "string" },
                "tags": { "type": "array", "element": { "type": "enum", "options": ["a", "b"] } },
                "n": { "type": "effect", "inner": { "type": "number" } }
            }
        }))
        .unwrap();
        let fields = s.fields().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["q", "tags", "n"]);
        assert_eq!(fields["tags"], Schema::enumeration(["a", "b"]).array());
        assert_eq!(fields["n"], Schema::number().transform());
    }
}
