use crate::error::DecodeError;
use crate::value::Value;

/// Outcome of decoding one node.
///
/// A failure carries the raw input at that position rather than an error,
/// so containers can always assemble a full shadow of what was seen.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeResult<T = Value> {
    Success(T),
    Failure(Value),
}

impl<T> DecodeResult<T> {
    pub fn success(data: T) -> Self {
        DecodeResult::Success(data)
    }

    pub fn failure(input: impl Into<Value>) -> Self {
        DecodeResult::Failure(input.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DecodeResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            DecodeResult::Success(data) => Some(data),
            DecodeResult::Failure(_) => None,
        }
    }

    /// Raw input of a failure.
    pub fn input(&self) -> Option<&Value> {
        match self {
            DecodeResult::Success(_) => None,
            DecodeResult::Failure(input) => Some(input),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DecodeResult<U> {
        match self {
            DecodeResult::Success(data) => DecodeResult::Success(f(data)),
            DecodeResult::Failure(input) => DecodeResult::Failure(input),
        }
    }
}

impl DecodeResult<Value> {
    /// Decoded value on success, raw shadow on failure.
    pub fn into_value(self) -> Value {
        match self {
            DecodeResult::Success(v) | DecodeResult::Failure(v) => v,
        }
    }

    /// `{"success":true,"data":..}` / `{"success":false,"input":..}`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            DecodeResult::Success(data) => serde_json::json!({ "success": true, "data": data.to_json() }),
            DecodeResult::Failure(input) => serde_json::json!({ "success": false, "input": input.to_json() }),
        }
    }
}

/// Returns the data if success, `DecodeError::Rejected` if not.
pub fn unwrap_decode_result<T>(result: DecodeResult<T>) -> Result<T, DecodeError> {
    match result {
        DecodeResult::Success(data) => Ok(data),
        DecodeResult::Failure(input) => Err(DecodeError::Rejected { input }),
    }
}

impl<T> From<DecodeResult<T>> for Result<T, DecodeError> {
    fn from(result: DecodeResult<T>) -> Self {
        unwrap_decode_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_returns_data_on_success() {
        let r = DecodeResult::success(Value::from("a"));
        assert_eq!(unwrap_decode_result(r).unwrap(), Value::from("a"));
    }

    #[test]
    fn unwrap_carries_raw_input_on_failure() {
        let r: DecodeResult<Value> = DecodeResult::failure("1px");
        match unwrap_decode_result(r) {
            Err(DecodeError::Rejected { input }) => assert_eq!(input, Value::from("1px")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_keeps_failure_payload() {
        let r: DecodeResult<f64> = DecodeResult::failure("x");
        assert_eq!(r.map(|n| n + 1.0).input(), Some(&Value::from("x")));
        assert_eq!(DecodeResult::success(1.0).map(|n| n + 1.0).data(), Some(&2.0));
    }
}
