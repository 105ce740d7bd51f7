//! Core types shared by every Spendwise crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// ProviderIdentity
// ─────────────────────────────────────────────

/// The upstream LLM vendor an inbound request is meant for.
///
/// `Unknown` is a normal classification outcome, not an error. Callers decide
/// whether to reject it or route it somewhere else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderIdentity {
    OpenAi,
    Anthropic,
    Google,
    #[default]
    Unknown,
}

impl ProviderIdentity {
    /// Every routable provider, in registry order. Excludes `Unknown`.
    pub const ROUTABLE: [ProviderIdentity; 3] = [
        ProviderIdentity::OpenAi,
        ProviderIdentity::Anthropic,
        ProviderIdentity::Google,
    ];

    /// Wire name (e.g. `"openai"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderIdentity::OpenAi => "openai",
            ProviderIdentity::Anthropic => "anthropic",
            ProviderIdentity::Google => "google",
            ProviderIdentity::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ProviderIdentity::Unknown)
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid provider '{0}', expected one of: openai, anthropic, google, unknown")]
pub struct ParseProviderError(pub String);

impl FromStr for ProviderIdentity {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderIdentity::OpenAi),
            "anthropic" => Ok(ProviderIdentity::Anthropic),
            "google" | "gemini" => Ok(ProviderIdentity::Google),
            "unknown" => Ok(ProviderIdentity::Unknown),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
