//! Response bodies as JSON records.

use serde_json::Value;

use crate::core::ParseError;

/// A fetched body validated as JSON and ready for the sink.
///
/// Only syntax is checked; services are heterogeneous so no schema applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    value: Value,
}

impl ResponseRecord {
    /// Parse a raw response body.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedJson` if the body is not a single valid
    /// JSON document.
    pub fn parse(body: &[u8]) -> Result<Self, ParseError> {
        serde_json::from_slice(body)
            .map(|value| Self { value })
            .map_err(|e| ParseError::MalformedJson(e.to_string()))
    }

    /// Borrow the JSON value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Take the JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}
