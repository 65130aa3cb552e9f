//! Schema-driven decoding of loosely-typed input.
//!
//! Given a [`Schema`] tree and raw input (typically a query string), the
//! [`Decoder`] rebuilds a value shaped like the schema, converting textual
//! primitives into typed values. Leaves that do not fit are not errors: they
//! come back as [`DecodeResult::Failure`] carrying the raw input, and every
//! container reports a full *shadow* of what it saw.
//!
//! ```
//! use schema_endec::{DecodeOptions, QueryDecoder, Schema};
//! use serde_json::json;
//!
//! let decoder = QueryDecoder::query(Schema::object([
//!     ("page", Schema::number()),
//!     ("tag", Schema::string().array()),
//!     ("draft", Schema::boolean().optional()),
//! ]));
//!
//! let out = decoder.decode("page=2&tag=a&tag=b", DecodeOptions::default()).unwrap();
//! assert_eq!(out, json!({ "page": 2, "tag": ["a", "b"] }));
//!
//! let shadow = decoder.safe_decode("page=2px", DecodeOptions::default()).unwrap();
//! assert_eq!(shadow.input().unwrap().to_json(), json!({ "page": "2px", "tag": [] }));
//! ```
pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod json;
pub mod path_de;
pub mod query;
pub mod result;
pub mod schema;
pub mod value;

pub use context::{DecodeContext, DecodeOptions, PathSegment};
pub use engine::{DecodeStrategy, Decoder};
pub use error::{DecodeError, FatalError, SchemaError, TypedDecodeError};
pub use json::{JsonDecoder, JsonStrategy};
pub use query::{QueryDecoder, QueryInput, QueryParams, QueryStrategy};
pub use result::{unwrap_decode_result, DecodeResult};
pub use schema::{unwrap_structural, Schema};
pub use value::Value;
