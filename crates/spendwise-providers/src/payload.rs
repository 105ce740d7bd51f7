//! Inbound request body, validated at the boundary.
//!
//! Only the fields that carry provider signal are pulled out, each as a
//! [`Field`]: missing, present with the wrong JSON type, or valid.

use std::str::FromStr;

use serde_json::Value;

// ─────────────────────────────────────────────
// Field
// ─────────────────────────────────────────────

/// One known field of an inbound payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field<T> {
    /// Key not present (or the payload wasn't a JSON object).
    Missing,
    /// Key present, but not the JSON type we expect.
    Mismatched,
    Valid(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Field::Valid(_))
    }

    /// The valid value, treating `Missing` and `Mismatched` alike.
    pub fn valid(&self) -> Option<&T> {
        match self {
            Field::Valid(v) => Some(v),
            Field::Missing | Field::Mismatched => None,
        }
    }

    fn probe(obj: &serde_json::Map<String, Value>, key: &str, f: impl FnOnce(&Value) -> Option<T>) -> Self {
        match obj.get(key) {
            None => Field::Missing,
            Some(v) => f(v).map_or(Field::Mismatched, Field::Valid),
        }
    }
}

// ─────────────────────────────────────────────
// RequestPayload
// ─────────────────────────────────────────────

/// Errors turning raw bytes into a [`RequestPayload`].
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// The fields of an inbound request body that carry provider signal.
///
/// Array fields keep only their length; the classifier never looks inside.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestPayload {
    /// `model` — string.
    pub model: Field<String>,
    /// `messages` — array (OpenAI and Anthropic chat shape).
    pub messages: Field<usize>,
    /// `system` — string (Anthropic top-level system prompt).
    pub system: Field<String>,
    /// `contents` — array (Gemini shape).
    pub contents: Field<usize>,
}

impl RequestPayload {
    /// Validate a parsed JSON value. Never fails: a non-object value yields a
    /// payload with every field `Missing`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            model: Field::probe(obj, "model", |v| v.as_str().map(String::from)),
            messages: Field::probe(obj, "messages", |v| v.as_array().map(Vec::len)),
            system: Field::probe(obj, "system", |v| v.as_str().map(String::from)),
            contents: Field::probe(obj, "contents", |v| v.as_array().map(Vec::len)),
        }
    }

    /// Parse raw body bytes. Fails only on syntactically invalid JSON.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }
}

impl FromStr for RequestPayload {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
