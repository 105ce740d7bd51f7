//! Classification rules — the ordered table the classifier walks.
//!
//! Each [`Rule`] is an independent predicate over a [`RequestSignature`] plus
//! the provider it commits to. The classifier tries rules in table order and
//! stops at the first match, so the order of [`STANDARD_RULES`] *is* the
//! priority order:
//!
//! 1. model prefix (`gpt-`, `o1`, `o3`, `claude-`, `gemini-`)
//! 2. body shape (messages + system, messages, contents)
//! 3. path substring (`chat/completions`, `messages`, `generateContent`)
//!
//! Anything that matches nothing is `unknown`.

use std::borrow::Cow;
use std::fmt;

use spendwise_core::ProviderIdentity;
use tracing::warn;

use crate::signature::RequestSignature;

// ─────────────────────────────────────────────
// Rule
// ─────────────────────────────────────────────

/// Signal class of a rule, in decreasing specificity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleTier {
    Model,
    Shape,
    Path,
}

/// The predicate half of a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// Lowercased model name starts with this (lowercase) prefix.
    ModelPrefix(Cow<'static, str>),
    /// `messages` array and a string `system`.
    MessagesWithSystem,
    /// `messages` array, regardless of `system`. Only reached when
    /// `MessagesWithSystem` sits above it and didn't match.
    MessagesOnly,
    /// `contents` array.
    ContentsArray,
    /// Request path contains this substring (case-sensitive).
    PathContains(&'static str),
}

impl Matcher {
    pub fn tier(&self) -> RuleTier {
        match self {
            Matcher::ModelPrefix(_) => RuleTier::Model,
            Matcher::MessagesWithSystem | Matcher::MessagesOnly | Matcher::ContentsArray => {
                RuleTier::Shape
            }
            Matcher::PathContains(_) => RuleTier::Path,
        }
    }

    /// Test the signature. `model_lower` is the signature's model name,
    /// lowercased once by the caller.
    pub fn matches(&self, sig: &RequestSignature, model_lower: Option<&str>) -> bool {
        match self {
            Matcher::ModelPrefix(prefix) => {
                model_lower.is_some_and(|m| m.starts_with(&**prefix))
            }
            Matcher::MessagesWithSystem => sig.has_messages_array && sig.has_system_field,
            Matcher::MessagesOnly => sig.has_messages_array,
            Matcher::ContentsArray => sig.has_contents_array,
            Matcher::PathContains(needle) => sig.path_hint.contains(needle),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::ModelPrefix(p) => write!(f, "model prefix \"{}\"", p),
            Matcher::MessagesWithSystem => f.write_str("messages array with system string"),
            Matcher::MessagesOnly => f.write_str("messages array"),
            Matcher::ContentsArray => f.write_str("contents array"),
            Matcher::PathContains(s) => write!(f, "path contains \"{}\"", s),
        }
    }
}

/// A predicate and the provider it commits to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub provider: ProviderIdentity,
}

impl Rule {
    pub fn tier(&self) -> RuleTier {
        self.matcher.tier()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.matcher, self.provider)
    }
}

// ─────────────────────────────────────────────
// Standard table
// ─────────────────────────────────────────────

const fn model(prefix: &'static str, provider: ProviderIdentity) -> Rule {
    Rule {
        matcher: Matcher::ModelPrefix(Cow::Borrowed(prefix)),
        provider,
    }
}

const fn shape(matcher: Matcher, provider: ProviderIdentity) -> Rule {
    Rule { matcher, provider }
}

const fn path(needle: &'static str, provider: ProviderIdentity) -> Rule {
    Rule {
        matcher: Matcher::PathContains(needle),
        provider,
    }
}

/// Built-in rules, in priority order. Reordering changes outcomes for
/// payloads that satisfy more than one rule.
pub static STANDARD_RULES: &[Rule] = &[
    model("gpt-", ProviderIdentity::OpenAi),
    model("o1", ProviderIdentity::OpenAi),
    model("o3", ProviderIdentity::OpenAi),
    model("claude-", ProviderIdentity::Anthropic),
    model("gemini-", ProviderIdentity::Google),
    shape(Matcher::MessagesWithSystem, ProviderIdentity::Anthropic),
    shape(Matcher::MessagesOnly, ProviderIdentity::OpenAi),
    shape(Matcher::ContentsArray, ProviderIdentity::Google),
    path("chat/completions", ProviderIdentity::OpenAi),
    path("messages", ProviderIdentity::Anthropic),
    path("generateContent", ProviderIdentity::Google),
];

// ─────────────────────────────────────────────
// RuleSet
// ─────────────────────────────────────────────

/// An owned rule table: the standard rules plus any configured model aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    /// The built-in table.
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_RULES.to_vec(),
        }
    }

    /// Add a model prefix after every existing model-prefix rule and before
    /// the first shape rule. Built-ins therefore always win over aliases.
    ///
    /// Empty prefixes and aliases to `unknown` are ignored with a warning.
    pub fn with_model_prefix(mut self, prefix: impl Into<String>, provider: ProviderIdentity) -> Self {
        let prefix = prefix.into().to_lowercase();
        if prefix.is_empty() {
            warn!("Ignoring empty model alias prefix");
            return self;
        }
        if !provider.is_known() {
            warn!(prefix = %prefix, "Ignoring model alias to unknown provider");
            return self;
        }

        let at = self
            .rules
            .iter()
            .position(|r| r.tier() > RuleTier::Model)
            .unwrap_or(self.rules.len());
        self.rules.insert(
            at,
            Rule {
                matcher: Matcher::ModelPrefix(Cow::Owned(prefix)),
                provider,
            },
        );
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
