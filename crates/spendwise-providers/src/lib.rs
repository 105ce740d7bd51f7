//! Inbound request classification and routing for Spendwise.
//!
//! # Architecture
//!
//! - [`payload`] — typed view of an inbound body (`Missing` / `Mismatched` / `Valid` fields)
//! - [`signature`] — [`RequestSignature`], the provider-relevant summary of a request
//! - [`rules`] — the ordered rule table ([`STANDARD_RULES`]) and [`RuleSet`]
//! - [`classifier`] — first-match classification to a [`ProviderIdentity`]
//! - [`registry`] — static specs for each routable upstream
//! - [`router`] — [`Router`], which applies the `unknown` policy and credentials
//!
//! ```
//! use serde_json::json;
//! use spendwise_providers::{detect_provider, ProviderIdentity};
//!
//! let body = json!({ "messages": [{ "role": "user", "content": "hi" }], "system": "be brief" });
//! assert_eq!(detect_provider(&body, "/proxy"), ProviderIdentity::Anthropic);
//! ```

pub mod classifier;
pub mod payload;
pub mod registry;
pub mod router;
pub mod rules;
pub mod signature;

// Re-export main types for convenience
pub use classifier::{classify, classify_detailed, classify_with, detect_provider, Classification};
pub use payload::{Field, PayloadError, RequestPayload};
pub use registry::{ProviderSpec, PROVIDERS};
pub use router::{CredentialSource, RouteDecision, RouteError, Router};
pub use rules::{Matcher, Rule, RuleSet, RuleTier, STANDARD_RULES};
pub use signature::RequestSignature;
pub use spendwise_core::ProviderIdentity;
