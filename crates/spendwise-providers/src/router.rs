//! Route resolver — turns a classification into an upstream target.
//!
//! This is the caller the classifier expects: it owns the policy for
//! `unknown` and checks that the chosen provider has a usable credential.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use spendwise_core::config::{Config, ProviderConfig, RoutingConfig, UnknownPolicy};
use spendwise_core::ProviderIdentity;

use crate::payload::{PayloadError, RequestPayload};
use crate::registry::{find_by_identity, PROVIDERS};
use crate::rules::RuleSet;
use crate::signature::RequestSignature;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("could not determine the upstream provider for request to '{path}'")]
    Unclassified { path: String },

    #[error("no API key available for {provider} (set providers.{provider}.apiKey or {env_key})")]
    MissingCredential {
        provider: ProviderIdentity,
        env_key: &'static str,
    },
}

// ─────────────────────────────────────────────
// RouteDecision
// ─────────────────────────────────────────────

/// Where a routed request's API key comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    Config,
    Env,
    None,
}

/// The upstream target chosen for one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDecision {
    pub provider: ProviderIdentity,
    pub display_name: &'static str,
    pub api_base: String,
    pub upstream_url: String,
    pub credential: CredentialSource,
    pub env_key: &'static str,
    /// The classifier said `unknown` and the fallback policy picked the provider.
    pub fallback: bool,
    /// Human-readable rule that decided the provider, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl RouteDecision {
    pub fn credential_configured(&self) -> bool {
        self.credential != CredentialSource::None
    }
}

// ─────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────

/// Immutable after construction; share it freely across threads.
#[derive(Clone, Debug)]
pub struct Router {
    rules: RuleSet,
    routing: RoutingConfig,
    providers: HashMap<ProviderIdentity, ProviderConfig>,
    env_credentials: HashSet<ProviderIdentity>,
}

impl Router {
    /// Build a router from config, checking provider env vars in the process
    /// environment.
    pub fn new(config: &Config) -> Self {
        Self::with_env(config, |key| std::env::var(key).ok())
    }

    /// Build a router with a custom env var lookup.
    pub fn with_env(config: &Config, var: impl Fn(&str) -> Option<String>) -> Self {
        let rules = config
            .routing
            .model_aliases
            .iter()
            .fold(RuleSet::standard(), |rules, alias| {
                rules.with_model_prefix(alias.prefix.as_str(), alias.provider)
            });

        let env_credentials = PROVIDERS
            .iter()
            .filter(|spec| var(spec.env_key).is_some_and(|v| !v.is_empty()))
            .map(|spec| spec.identity)
            .collect();

        if config.routing.unknown_policy == UnknownPolicy::Fallback
            && !config.routing.fallback_provider.is_some_and(|p| p.is_known())
        {
            warn!("unknownPolicy is 'fallback' but no routable fallbackProvider is set; unknown requests will be rejected");
        }

        Self {
            rules,
            routing: config.routing.clone(),
            providers: config.providers.to_map(),
            env_credentials,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Credential availability for a provider, config before env.
    pub fn credential_source(&self, provider: ProviderIdentity) -> CredentialSource {
        if self.providers.get(&provider).is_some_and(|c| c.is_configured()) {
            CredentialSource::Config
        } else if self.env_credentials.contains(&provider) {
            CredentialSource::Env
        } else {
            CredentialSource::None
        }
    }

    /// Route a raw request body.
    pub fn route_body(&self, body: &[u8], path: &str) -> Result<RouteDecision, RouteError> {
        let payload = RequestPayload::from_slice(body)?;
        self.route_payload(&payload, path)
    }

    /// Route a parsed JSON body.
    pub fn route(&self, body: &Value, path: &str) -> Result<RouteDecision, RouteError> {
        self.route_payload(&RequestPayload::from_value(body), path)
    }

    pub fn route_payload(&self, payload: &RequestPayload, path: &str) -> Result<RouteDecision, RouteError> {
        let sig = RequestSignature::extract(payload, path);
        let classification = self.rules.classify(&sig);

        let (provider, fallback) = if classification.provider.is_known() {
            (classification.provider, false)
        } else {
            (self.resolve_unknown(path)?, true)
        };

        let Some(spec) = find_by_identity(provider) else {
            return Err(RouteError::Unclassified {
                path: path.to_string(),
            });
        };

        let credential = self.credential_source(provider);
        if self.routing.require_credentials && credential == CredentialSource::None {
            return Err(RouteError::MissingCredential {
                provider,
                env_key: spec.env_key,
            });
        }

        let api_base_override = self
            .providers
            .get(&provider)
            .and_then(|c| c.api_base.as_deref());
        let api_base = api_base_override
            .unwrap_or(spec.default_api_base)
            .trim_end_matches('/')
            .to_string();
        let upstream_url = spec.endpoint_url(Some(api_base.as_str()), payload.model.valid().map(String::as_str));

        debug!(provider = %provider, fallback, upstream = %upstream_url, "routed request");

        Ok(RouteDecision {
            provider,
            display_name: spec.display_name,
            api_base,
            upstream_url,
            credential,
            env_key: spec.env_key,
            fallback,
            matched_rule: classification.matched.map(|r| r.matcher.to_string()),
        })
    }

    fn resolve_unknown(&self, path: &str) -> Result<ProviderIdentity, RouteError> {
        let unclassified = || RouteError::Unclassified {
            path: path.to_string(),
        };

        match self.routing.unknown_policy {
            UnknownPolicy::Reject => Err(unclassified()),
            UnknownPolicy::Fallback => self
                .routing
                .fallback_provider
                .filter(|p| p.is_known())
                .ok_or_else(unclassified),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
