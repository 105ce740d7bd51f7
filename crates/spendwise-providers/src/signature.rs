//! Signature extraction — the provider-relevant summary of one request.

use serde::Serialize;
use serde_json::Value;

use crate::payload::RequestPayload;

/// Schema-independent feature summary of an inbound request.
///
/// Built once per request and thrown away after classification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSignature {
    /// `model`, when it is a string.
    pub model_name: Option<String>,
    /// `messages` is present and an array.
    pub has_messages_array: bool,
    /// `system` is present and a string.
    pub has_system_field: bool,
    /// `contents` is present and an array.
    pub has_contents_array: bool,
    /// The inbound request path, verbatim.
    pub path_hint: String,
}

impl RequestSignature {
    /// Derive a signature from a validated payload and the request path.
    pub fn extract(payload: &RequestPayload, path: &str) -> Self {
        Self {
            model_name: payload.model.valid().cloned(),
            has_messages_array: payload.messages.is_valid(),
            has_system_field: payload.system.is_valid(),
            has_contents_array: payload.contents.is_valid(),
            path_hint: path.to_string(),
        }
    }

    /// Shorthand for `extract(&RequestPayload::from_value(value), path)`.
    pub fn from_value(value: &Value, path: &str) -> Self {
        Self::extract(&RequestPayload::from_value(value), path)
    }
}
