use thiserror::Error;

use crate::value::Value;

/// The schema holds a construct the decoder cannot interpret.
///
/// This is a programmer error: it aborts the whole walk and is never
/// converted by passthrough.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FatalError {
    #[error("{kind} is not handled at `{path}`. Is it supported?")]
    Unsupported { kind: &'static str, path: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    /// Structural mismatch. `input` is the shadow: decoded where possible,
    /// raw where not.
    #[error("decode error: got unexpected raw input {}", .input.to_json())]
    Rejected { input: Value },
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl DecodeError {
    /// The raw-input shadow of a rejected decode.
    pub fn input(&self) -> Option<&Value> {
        match self {
            DecodeError::Rejected { input } => Some(input),
            DecodeError::Fatal(_) => None,
        }
    }
}

/// Failure loading a schema document.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

/// Failure of a typed decode: either the structural walk, or the final
/// deserialization into the caller's type.
#[derive(Debug, Error)]
pub enum TypedDecodeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("at path {path} → {message}")]
    Deserialize { path: String, message: String },
}
