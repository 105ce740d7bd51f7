//! `spendwise classify` and `spendwise route`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use spendwise_core::config::Config;
use spendwise_providers::{CredentialSource, RequestPayload, RequestSignature, RouteDecision, Router};

use crate::helpers::{check_mark, provider_label, read_input};

/// JSON output of `classify`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyOutput {
    provider: spendwise_core::ProviderIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<RequestSignature>,
}

/// Run the classify command.
pub fn run_classify(
    config: &Config,
    file: Option<&Path>,
    path: &str,
    explain: bool,
    json: bool,
) -> Result<()> {
    let body = read_input(file)?;
    let payload = RequestPayload::from_slice(&body).context("invalid request body")?;
    let sig = RequestSignature::extract(&payload, path);

    let router = Router::new(config);
    let classification = router.rules().classify(&sig);
    info!(provider = %classification.provider, "classified");

    if json {
        let output = ClassifyOutput {
            provider: classification.provider,
            matched_rule: explain
                .then(|| classification.matched.map(|r| r.matcher.to_string()))
                .flatten(),
            signature: explain.then_some(sig),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", provider_label(classification.provider));

    if explain {
        println!();
        println!("  {:<14} {}", "Model:".bold(), sig.model_name.as_deref().unwrap_or("-"));
        println!("  {:<14} {}", "messages[]:".bold(), check_mark(sig.has_messages_array));
        println!("  {:<14} {}", "system:".bold(), check_mark(sig.has_system_field));
        println!("  {:<14} {}", "contents[]:".bold(), check_mark(sig.has_contents_array));
        println!("  {:<14} {}", "Path:".bold(), sig.path_hint);
        let rule = classification
            .matched
            .map(|r| r.to_string())
            .unwrap_or_else(|| "no rule matched".dimmed().to_string());
        println!("  {:<14} {}", "Rule:".bold(), rule);
    }

    Ok(())
}

/// Run the route command. Routing errors become a non-zero exit.
pub fn run_route(config: &Config, file: Option<&Path>, path: &str, json: bool) -> Result<()> {
    let body = read_input(file)?;
    let router = Router::new(config);
    let decision = router.route_body(&body, path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print_decision(&decision);
    }

    Ok(())
}

fn print_decision(decision: &RouteDecision) {
    println!();
    println!(
        "  {:<14} {} ({})",
        "Provider:".bold(),
        provider_label(decision.provider),
        decision.display_name
    );
    if decision.fallback {
        println!("  {:<14} {}", "", "via unknown-request fallback".yellow());
    }
    if let Some(rule) = &decision.matched_rule {
        println!("  {:<14} {}", "Rule:".bold(), rule);
    }
    println!("  {:<14} {}", "Upstream:".bold(), decision.upstream_url);
    let credential = match decision.credential {
        CredentialSource::Config => format!("{} config", check_mark(true)),
        CredentialSource::Env => {
            format!("{} ${}", check_mark(true), decision.env_key)
        }
        CredentialSource::None => {
            format!("{}", "✗ not configured".red())
        }
    };
    println!("  {:<14} {}", "Credential:".bold(), credential);
    println!();
}
