//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `RoutingConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::ProviderIdentity;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.spendwise/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub routing: RoutingConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Credentials and endpoint override for a single upstream provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key used when forwarding to this provider.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides the registry default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations, one per routable provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
    #[serde(default)]
    pub google: ProviderConfig,
}

impl ProvidersConfig {
    /// Get the config for a provider. `Unknown` has none.
    pub fn get(&self, provider: ProviderIdentity) -> Option<&ProviderConfig> {
        match provider {
            ProviderIdentity::OpenAi => Some(&self.openai),
            ProviderIdentity::Anthropic => Some(&self.anthropic),
            ProviderIdentity::Google => Some(&self.google),
            ProviderIdentity::Unknown => None,
        }
    }

    /// Get a provider config by wire name (e.g. `"anthropic"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        name.parse::<ProviderIdentity>()
            .ok()
            .and_then(|p| self.get(p))
    }

    /// Convert to a map keyed by provider, for the route resolver.
    pub fn to_map(&self) -> HashMap<ProviderIdentity, ProviderConfig> {
        ProviderIdentity::ROUTABLE
            .iter()
            .filter_map(|p| self.get(*p).map(|c| (*p, c.clone())))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Routing
// ─────────────────────────────────────────────

/// What the route resolver does with a request classified as `unknown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    /// Refuse to route; the caller returns an error to the client.
    #[default]
    Reject,
    /// Send to `RoutingConfig::fallback_provider`.
    Fallback,
}

impl std::str::FromStr for UnknownPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(UnknownPolicy::Reject),
            "fallback" => Ok(UnknownPolicy::Fallback),
            _ => Err(format!(
                "invalid unknown policy '{}', expected: reject, fallback",
                s
            )),
        }
    }
}

/// A user-defined model prefix, tried after the built-in model prefixes.
///
/// E.g. `{ "prefix": "chatgpt-", "provider": "openai" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAlias {
    pub prefix: String,
    pub provider: ProviderIdentity,
}

/// Routing behaviour on top of classification.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    /// Policy for requests the classifier cannot attribute.
    pub unknown_policy: UnknownPolicy,
    /// Target for `unknown` requests when the policy is `fallback`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_provider: Option<ProviderIdentity>,
    /// Refuse to route to a provider with no API key available.
    pub require_credentials: bool,
    /// Extra model prefixes, in priority order.
    pub model_aliases: Vec<ModelAlias>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.routing.unknown_policy, UnknownPolicy::Reject);
        assert!(config.routing.fallback_provider.is_none());
        assert!(!config.routing.require_credentials);
        assert!(config.routing.model_aliases.is_empty());
        assert!(!config.providers.openai.is_configured());
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "providers": {
                "anthropic": { "apiKey": "sk-ant-123" },
                "google": { "apiKey": "g-456", "apiBase": "https://proxy.internal/v1beta" }
            },
            "routing": {
                "unknownPolicy": "fallback",
                "fallbackProvider": "openai",
                "requireCredentials": true,
                "modelAliases": [
                    { "prefix": "chatgpt-", "provider": "openai" }
                ]
            }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.providers.anthropic.api_key, "sk-ant-123");
        assert_eq!(
            config.providers.google.api_base.as_deref(),
            Some("https://proxy.internal/v1beta")
        );
        assert_eq!(config.routing.unknown_policy, UnknownPolicy::Fallback);
        assert_eq!(config.routing.fallback_provider, Some(ProviderIdentity::OpenAi));
        assert!(config.routing.require_credentials);
        assert_eq!(config.routing.model_aliases.len(), 1);
        assert_eq!(config.routing.model_aliases[0].provider, ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let config = Config::default();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json["routing"].get("unknownPolicy").is_some());
        assert!(json["routing"].get("requireCredentials").is_some());
        assert!(json["providers"]["openai"].get("apiKey").is_some());
        assert!(json["routing"].get("unknown_policy").is_none());
        // Unset optionals are omitted
        assert!(json["routing"].get("fallbackProvider").is_none());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.routing.unknown_policy, UnknownPolicy::Reject);
        assert!(!config.providers.google.is_configured());
    }

    #[test]
    fn test_invalid_alias_provider_rejected() {
        let json = serde_json::json!({
            "routing": { "modelAliases": [{ "prefix": "x-", "provider": "cohere" }] }
        });
        assert!(serde_json::from_value::<Config>(json).is_err());
    }

    #[test]
    fn test_providers_get_by_name() {
        let mut providers = ProvidersConfig::default();
        providers.anthropic.api_key = "sk-ant-123".to_string();

        assert!(providers.get_by_name("anthropic").unwrap().is_configured());
        assert!(!providers.get_by_name("openai").unwrap().is_configured());
        assert!(providers.get_by_name("unknown").is_none());
        assert!(providers.get_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_providers_to_map() {
        let mut providers = ProvidersConfig::default();
        providers.google.api_key = "g-key".to_string();

        let map = providers.to_map();
        assert_eq!(map.len(), 3);
        assert!(map[&ProviderIdentity::Google].is_configured());
        assert!(!map.contains_key(&ProviderIdentity::Unknown));
    }

    #[test]
    fn test_unknown_policy_from_str() {
        assert_eq!("Fallback".parse::<UnknownPolicy>().unwrap(), UnknownPolicy::Fallback);
        assert_eq!("reject".parse::<UnknownPolicy>().unwrap(), UnknownPolicy::Reject);
        assert!("drop".parse::<UnknownPolicy>().is_err());
    }
}
