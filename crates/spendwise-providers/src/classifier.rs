//! Provider classifier — walks a rule table and returns exactly one provider.
//!
//! Classification never fails. A signature that matches no rule is
//! [`ProviderIdentity::Unknown`], which callers must handle as a normal value.

use serde_json::Value;
use spendwise_core::ProviderIdentity;
use tracing::debug;

use crate::rules::{Rule, RuleSet, STANDARD_RULES};
use crate::signature::RequestSignature;

/// Result of one classification, with the rule that committed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification<'r> {
    pub provider: ProviderIdentity,
    /// `None` when nothing matched and the result is `unknown`.
    pub matched: Option<&'r Rule>,
}

/// Classify against `rules`, first match wins.
pub fn classify_with<'r>(rules: &'r [Rule], sig: &RequestSignature) -> Classification<'r> {
    let model_lower = sig.model_name.as_deref().map(str::to_lowercase);

    let matched = rules
        .iter()
        .find(|rule| rule.matcher.matches(sig, model_lower.as_deref()));

    let provider = matched.map_or(ProviderIdentity::Unknown, |r| r.provider);
    match matched {
        Some(rule) => debug!(provider = %provider, rule = %rule.matcher, "classified request"),
        None => debug!(path = %sig.path_hint, "no classification rule matched"),
    }

    Classification { provider, matched }
}

/// Classify against the built-in rule table.
pub fn classify(sig: &RequestSignature) -> ProviderIdentity {
    classify_with(STANDARD_RULES, sig).provider
}

/// Like [`classify`], but also reports which rule matched.
pub fn classify_detailed(sig: &RequestSignature) -> Classification<'static> {
    classify_with(STANDARD_RULES, sig)
}

/// Full pipeline: JSON body + path → provider, using the built-in rules.
pub fn detect_provider(body: &Value, path: &str) -> ProviderIdentity {
    classify(&RequestSignature::from_value(body, path))
}

impl RuleSet {
    pub fn classify(&self, sig: &RequestSignature) -> Classification<'_> {
        classify_with(self.rules(), sig)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Matcher;
    use serde_json::json;

    const UNRECOGNIZED: &str = "/api/v2/proxy";

    fn detect(body: Value) -> ProviderIdentity {
        detect_provider(&body, UNRECOGNIZED)
    }

    // ── model prefix ──

    #[test]
    fn test_openai_model_prefixes() {
        for model in ["gpt-4o-mini", "GPT-4", "o1-preview", "o1", "O3-mini", "o3"] {
            assert_eq!(detect(json!({ "model": model })), ProviderIdentity::OpenAi, "{model}");
        }
    }

    #[test]
    fn test_anthropic_model_prefix() {
        assert_eq!(
            detect(json!({ "model": "claude-3-5-sonnet-20241022" })),
            ProviderIdentity::Anthropic
        );
        assert_eq!(detect(json!({ "model": "Claude-Opus-4" })), ProviderIdentity::Anthropic);
    }

    #[test]
    fn test_google_model_prefix() {
        assert_eq!(detect(json!({ "model": "gemini-1.5-pro" })), ProviderIdentity::Google);
    }

    #[test]
    fn test_model_prefix_ignores_other_fields() {
        let body = json!({
            "model": "gpt-4",
            "messages": [{ "role": "user", "content": "hi" }],
            "system": "x",
            "contents": []
        });
        assert_eq!(detect_provider(&body, "/v1/messages"), ProviderIdentity::OpenAi);

        let body = json!({ "model": "claude-3-haiku", "contents": [] });
        assert_eq!(
            detect_provider(&body, "/v1/chat/completions"),
            ProviderIdentity::Anthropic
        );
    }

    #[test]
    fn test_model_prefix_beats_shape() {
        let body = json!({ "model": "gpt-4", "contents": [{ "parts": [] }] });
        assert_eq!(detect(body), ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_prefix_is_anchored_at_start() {
        // "gpt-" appears, but not as a prefix; falls through to shape.
        let body = json!({ "model": "my-gpt-4", "contents": [] });
        assert_eq!(detect(body), ProviderIdentity::Google);
    }

    #[test]
    fn test_unrecognized_model_falls_through() {
        let body = json!({ "model": "llama-3-70b", "messages": [] });
        assert_eq!(detect(body), ProviderIdentity::OpenAi);
    }

    // ── shape ──

    #[test]
    fn test_messages_with_system_is_anthropic() {
        let body = json!({ "messages": [{ "role": "user", "content": "hi" }], "system": "x" });
        assert_eq!(detect(body), ProviderIdentity::Anthropic);
    }

    #[test]
    fn test_messages_without_system_is_openai() {
        let body = json!({ "messages": [{ "role": "user", "content": "hi" }] });
        assert_eq!(detect(body), ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_non_string_system_counts_as_absent() {
        let body = json!({
            "messages": [],
            "system": [{ "type": "text", "text": "be brief" }]
        });
        assert_eq!(detect(body), ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_contents_is_google() {
        let body = json!({ "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }] });
        assert_eq!(detect(body), ProviderIdentity::Google);
    }

    #[test]
    fn test_messages_outrank_contents() {
        let body = json!({ "messages": [], "contents": [] });
        assert_eq!(detect(body), ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_shape_beats_path() {
        let body = json!({ "contents": [] });
        assert_eq!(
            detect_provider(&body, "/v1/chat/completions"),
            ProviderIdentity::Google
        );
    }

    // ── path ──

    #[test]
    fn test_path_chat_completions() {
        assert_eq!(
            detect_provider(&json!({}), "/v1/chat/completions"),
            ProviderIdentity::OpenAi
        );
    }

    #[test]
    fn test_path_messages() {
        assert_eq!(detect_provider(&json!({}), "/v1/messages"), ProviderIdentity::Anthropic);
    }

    #[test]
    fn test_path_generate_content() {
        assert_eq!(
            detect_provider(&json!({}), "/v1beta/models/gemini-pro:generateContent"),
            ProviderIdentity::Google
        );
    }

    #[test]
    fn test_path_order() {
        // Both substrings present; chat/completions is checked first.
        assert_eq!(
            detect_provider(&json!({}), "/messages/chat/completions"),
            ProviderIdentity::OpenAi
        );
    }

    #[test]
    fn test_malformed_fields_fall_to_path() {
        let body = json!({ "model": 42, "messages": "nope", "contents": null });
        assert_eq!(detect_provider(&body, "/v1/messages"), ProviderIdentity::Anthropic);
    }

    // ── fallback ──

    #[test]
    fn test_empty_object_unrecognized_path_is_unknown() {
        assert_eq!(detect(json!({})), ProviderIdentity::Unknown);
        assert_eq!(detect_provider(&json!({}), ""), ProviderIdentity::Unknown);
    }

    #[test]
    fn test_non_object_body_uses_path() {
        assert_eq!(detect(json!(["gpt-4"])), ProviderIdentity::Unknown);
        assert_eq!(
            detect_provider(&json!("claude-3"), "/v1/chat/completions"),
            ProviderIdentity::OpenAi
        );
    }

    #[test]
    fn test_idempotent() {
        let body = json!({ "messages": [], "system": "x" });
        let first = detect_provider(&body, "/v1/chat/completions");
        let second = detect_provider(&body, "/v1/chat/completions");
        assert_eq!(first, second);
    }

    // ── detailed / rule sets ──

    #[test]
    fn test_detailed_reports_matched_rule() {
        let sig = RequestSignature::from_value(&json!({ "model": "o3-mini" }), "");
        let result = classify_detailed(&sig);
        assert_eq!(result.provider, ProviderIdentity::OpenAi);
        assert_eq!(result.matched, Some(&STANDARD_RULES[2]));
    }

    #[test]
    fn test_detailed_unknown_has_no_rule() {
        let sig = RequestSignature::from_value(&json!({}), UNRECOGNIZED);
        let result = classify_detailed(&sig);
        assert_eq!(result.provider, ProviderIdentity::Unknown);
        assert!(result.matched.is_none());
    }

    #[test]
    fn test_alias_outranks_shape() {
        let rules = RuleSet::standard().with_model_prefix("chatgpt-", ProviderIdentity::OpenAi);
        let sig = RequestSignature::from_value(
            &json!({ "model": "ChatGPT-4o-latest", "messages": [], "system": "x" }),
            "",
        );
        let result = rules.classify(&sig);
        assert_eq!(result.provider, ProviderIdentity::OpenAi);
        assert!(matches!(result.matched.map(|r| &r.matcher), Some(Matcher::ModelPrefix(_))));
        // Without the alias the shape rule decides
        assert_eq!(classify(&sig), ProviderIdentity::Anthropic);
    }

    #[test]
    fn test_alias_never_outranks_builtin() {
        let rules = RuleSet::standard().with_model_prefix("gpt-4", ProviderIdentity::Google);
        let sig = RequestSignature::from_value(&json!({ "model": "gpt-4o" }), "");
        assert_eq!(rules.classify(&sig).provider, ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_concurrent_classification() {
        let rules = std::sync::Arc::new(RuleSet::standard());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let rules = rules.clone();
                std::thread::spawn(move || {
                    let body = if i % 2 == 0 {
                        json!({ "model": "claude-3-opus" })
                    } else {
                        json!({ "contents": [] })
                    };
                    rules.classify(&RequestSignature::from_value(&body, "")).provider
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 {
                ProviderIdentity::Anthropic
            } else {
                ProviderIdentity::Google
            };
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
