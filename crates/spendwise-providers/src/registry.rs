//! Provider registry — static specs for every routable upstream.
//!
//! Each `ProviderSpec` describes how to reach one vendor once a request has
//! been classified: default base URL, the env var holding its key, and the
//! endpoint a chat request goes to.

use spendwise_core::ProviderIdentity;
use tracing::warn;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one upstream LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub identity: ProviderIdentity,
    /// Internal name, same as the identity's wire name (e.g. `"openai"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    /// Environment variable for the API key. E.g. `"OPENAI_API_KEY"`.
    pub env_key: &'static str,
    /// Default API base URL, without trailing slash.
    pub default_api_base: &'static str,
    /// Chat endpoint relative to the base. `{model}` is substituted.
    pub endpoint: &'static str,
    /// Model used to fill `{model}` when the request names none.
    pub default_model: &'static str,
}

impl ProviderSpec {
    /// Build the full upstream URL for a chat request.
    ///
    /// `api_base` overrides the spec default; trailing slashes are trimmed.
    /// A model that isn't a plain path segment is replaced by `default_model`.
    pub fn endpoint_url(&self, api_base: Option<&str>, model: Option<&str>) -> String {
        let base = api_base.unwrap_or(self.default_api_base).trim_end_matches('/');
        if !self.endpoint.contains("{model}") {
            return format!("{}{}", base, self.endpoint);
        }

        let model = match model {
            Some(m) if is_path_segment(m) => m,
            Some(m) => {
                warn!(provider = self.name, model = %m, "model is not a valid path segment, using default");
                self.default_model
            }
            None => self.default_model,
        };
        format!("{}{}", base, self.endpoint.replace("{model}", model))
    }
}

/// Model names are substituted into a URL path: letters, digits, `-`, `_`,
/// `.` and `@` only, and no `..`.
fn is_path_segment(model: &str) -> bool {
    !model.is_empty()
        && !model.contains("..")
        && model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}

// ─────────────────────────────────────────────
// All routable providers
// ─────────────────────────────────────────────

/// Complete list of routable provider specifications, in registry order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        identity: ProviderIdentity::OpenAi,
        name: "openai",
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        default_api_base: "https://api.openai.com/v1",
        endpoint: "/chat/completions",
        default_model: "gpt-4o-mini",
    },
    ProviderSpec {
        identity: ProviderIdentity::Anthropic,
        name: "anthropic",
        display_name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        default_api_base: "https://api.anthropic.com/v1",
        endpoint: "/messages",
        default_model: "claude-3-5-haiku-latest",
    },
    ProviderSpec {
        identity: ProviderIdentity::Google,
        name: "google",
        display_name: "Google Gemini",
        env_key: "GEMINI_API_KEY",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        endpoint: "/models/{model}:generateContent",
        default_model: "gemini-1.5-flash",
    },
];

// ─────────────────────────────────────────────
// Lookups
// ─────────────────────────────────────────────

/// Find the spec for a classified provider. `Unknown` has none.
pub fn find_by_identity(identity: ProviderIdentity) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.identity == identity)
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
