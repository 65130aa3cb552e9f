//! Schema-driven decode walk.
//!
//! `Decoder` dispatches on each schema node's kind and recurses through
//! objects and arrays, producing a `DecodeResult` per node. Source-specific
//! behavior (input normalization, booleans, reading object fields) comes from
//! the injected `DecodeStrategy`.
//!
//! Invariants:
//! - Data mismatches are never errors mid-walk; they are `Failure(raw)` values
//!   merged into the parent's shadow.
//! - An unsupported schema kind is the only `Err`, and it aborts the walk.
//! - Passthrough is applied once, at the dispatch boundary, for every kind.
//! - The context path after any node equals the path before it.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::context::{DecodeContext, DecodeOptions};
use crate::error::{DecodeError, FatalError, TypedDecodeError};
use crate::result::{unwrap_decode_result, DecodeResult};
use crate::schema::Schema;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// STRATEGY
// ————————————————————————————————————————————————————————————————————————————

/// What a concrete input source must supply to the generic walk.
pub trait DecodeStrategy: Send + Sync {
    /// Raw input accepted at the call surface.
    type Input;

    /// Normalize raw input into the structural form the walk reads.
    fn preprocess(&self, input: Self::Input) -> Value;

    /// Booleans have no source-independent textual form.
    fn decode_boolean(&self, ctx: &DecodeContext, input: Value) -> DecodeResult;

    /// Read the slot for `key` out of a record-like input. `field` is the
    /// declared schema of that slot, for strategies that read differently
    /// depending on its shape.
    fn read_field(&self, ctx: &DecodeContext, input: &Value, key: &str, field: &Schema) -> Value;
}

// ————————————————————————————————————————————————————————————————————————————
// DECODER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Decoder<S> {
    schema: Schema,
    strategy: S,
}

impl<S: DecodeStrategy> Decoder<S> {
    pub fn new(schema: Schema, strategy: S) -> Self {
        Self { schema, strategy }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Decode without raising on data mismatches. `Err` only for schema
    /// constructs the decoder cannot interpret.
    pub fn safe_decode(
        &self,
        input: impl Into<S::Input>,
        options: DecodeOptions,
    ) -> Result<DecodeResult, FatalError> {
        let mut ctx = DecodeContext::new(&options);
        let input = self.strategy.preprocess(input.into());
        let result = self.decode_node(&mut ctx, &self.schema, input)?;
        debug!(success = result.is_success(), passthrough = options.passthrough, "decoded input");
        Ok(result)
    }

    /// Decode, turning a root-level failure into `DecodeError::Rejected`.
    pub fn decode(&self, input: impl Into<S::Input>, options: DecodeOptions) -> Result<Value, DecodeError> {
        unwrap_decode_result(self.safe_decode(input, options)?)
    }

    /// Decode, then deserialize the decoded value into `T`.
    pub fn decode_into<T: DeserializeOwned>(
        &self,
        input: impl Into<S::Input>,
        options: DecodeOptions,
    ) -> Result<T, TypedDecodeError> {
        let value = self.decode(input, options)?;
        crate::path_de::from_value_with_path(value.to_json())
            .map_err(|(path, message)| TypedDecodeError::Deserialize { path, message })
    }

    /// Decode `input` positioned at `schema`.
    pub fn decode_node(
        &self,
        ctx: &mut DecodeContext,
        schema: &Schema,
        input: Value,
    ) -> Result<DecodeResult, FatalError> {
        let result = match schema {
            Schema::String => decode_string(input),
            Schema::Number => decode_number(input),
            Schema::Boolean => self.strategy.decode_boolean(ctx, input),
            Schema::Enum { options } => decode_enum(options, input),
            Schema::Optional { inner } => match input {
                x if x.is_nullish() => DecodeResult::Success(Value::Undefined),
                x => self.decode_node(ctx, inner, x)?,
            },
            Schema::Nullable { inner } => match input {
                x if x.is_nullish() => DecodeResult::Success(Value::Null),
                x => self.decode_node(ctx, inner, x)?,
            },
            // the default value itself is filled in by the schema layer
            Schema::Default { inner, .. } => match input {
                x if x.is_nullish() => DecodeResult::Success(Value::Undefined),
                x => self.decode_node(ctx, inner, x)?,
            },
            Schema::Effect { inner, .. } => self.decode_node(ctx, inner, input)?,
            Schema::Object { fields } => self.decode_object(ctx, fields, input)?,
            Schema::Array { element } => self.decode_array(ctx, element, input)?,
            Schema::Literal { .. } | Schema::Union { .. } | Schema::Record { .. } => {
                let err = FatalError::Unsupported { kind: schema.kind(), path: ctx.path_string() };
                warn!(%err, "aborting decode");
                return Err(err);
            }
        };

        match result {
            DecodeResult::Failure(raw) if ctx.passthrough() => Ok(DecodeResult::Success(raw)),
            DecodeResult::Failure(raw) => {
                trace!(path = %ctx.path_string(), kind = schema.kind(), got = raw.kind(), "rejected");
                Ok(DecodeResult::Failure(raw))
            }
            success => Ok(success),
        }
    }

    fn decode_object(
        &self,
        ctx: &mut DecodeContext,
        fields: &IndexMap<String, Schema>,
        input: Value,
    ) -> Result<DecodeResult, FatalError> {
        if !input.is_record() {
            return Ok(DecodeResult::Failure(input));
        }

        let mut data = IndexMap::with_capacity(fields.len());
        let mut has_errors = false;

        for (key, field) in fields {
            let mut scope = ctx.enter(key.as_str());
            let slot = self.strategy.read_field(&scope, &input, key, field);
            match self.decode_node(&mut scope, field, slot)? {
                DecodeResult::Success(v) => {
                    data.insert(key.clone(), v);
                }
                DecodeResult::Failure(raw) => {
                    has_errors = true;
                    data.insert(key.clone(), raw);
                }
            }
        }

        if has_errors {
            Ok(DecodeResult::Failure(Value::Object(data)))
        } else {
            Ok(DecodeResult::Success(Value::Object(data)))
        }
    }

    fn decode_array(
        &self,
        ctx: &mut DecodeContext,
        element: &Schema,
        input: Value,
    ) -> Result<DecodeResult, FatalError> {
        let items = match input {
            Value::Array(items) => items,
            other => return Ok(DecodeResult::Failure(other)),
        };

        let mut data = Vec::with_capacity(items.len());
        let mut has_errors = false;

        for (i, item) in items.into_iter().enumerate() {
            let mut scope = ctx.enter(i);
            match self.decode_node(&mut scope, element, item)? {
                DecodeResult::Success(v) => data.push(v),
                DecodeResult::Failure(raw) => {
                    has_errors = true;
                    data.push(raw);
                }
            }
        }

        if has_errors {
            Ok(DecodeResult::Failure(Value::Array(data)))
        } else {
            Ok(DecodeResult::Success(Value::Array(data)))
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LEAF RULES
// ————————————————————————————————————————————————————————————————————————————

fn decode_string(input: Value) -> DecodeResult {
    match input {
        Value::String(s) => DecodeResult::Success(Value::String(s)),
        other => DecodeResult::Failure(other),
    }
}

fn decode_number(input: Value) -> DecodeResult {
    let parsed = match &input {
        Value::Number(n) => Some(*n),
        Value::String(s) => parse_number_literal(s.trim()).filter(|n| n.is_finite()),
        _ => None,
    };
    match parsed {
        Some(n) => DecodeResult::Success(Value::Number(n)),
        None => DecodeResult::Failure(input),
    }
}

fn decode_enum(options: &[String], input: Value) -> DecodeResult {
    let allowed = input.as_str().is_some_and(|s| options.iter().any(|o| o == s));
    if allowed {
        DecodeResult::Success(input)
    } else {
        DecodeResult::Failure(input)
    }
}

static DECIMAL_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

static RADIX_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0([xXoObB])([0-9a-fA-F]+)$").unwrap());

/// Whole-string numeric literal: decimal with optional exponent, or an
/// unsigned `0x`/`0o`/`0b` integer. Empty input and trailing garbage
/// (`"1px"`) are rejected rather than partially parsed.
pub fn parse_number_literal(s: &str) -> Option<f64> {
    if DECIMAL_LITERAL.is_match(s) {
        return s.parse::<f64>().ok();
    }
    let caps = RADIX_LITERAL.captures(s)?;
    let radix = match &caps[1] {
        "x" | "X" => 16,
        "o" | "O" => 8,
        _ => 2,
    };
    caps[2].chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}
