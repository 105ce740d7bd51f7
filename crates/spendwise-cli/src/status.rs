//! `spendwise status` — show configuration and provider status.
//!
//! - Shows config path and routing policy
//! - Shows credential source and upstream base for each provider

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use spendwise_core::config::{get_config_path, load_config, UnknownPolicy};
use spendwise_core::utils::mask_secret;
use spendwise_providers::{CredentialSource, Router, PROVIDERS};

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);
    let router = Router::new(&config);

    println!();
    println!("{}", "Spendwise Status".cyan().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    // Routing
    let routing = &config.routing;
    let policy = match (routing.unknown_policy, routing.fallback_provider) {
        (UnknownPolicy::Reject, _) => "reject".to_string(),
        (UnknownPolicy::Fallback, Some(p)) if p.is_known() => format!("fallback → {p}"),
        (UnknownPolicy::Fallback, _) => format!("{}", "fallback (no provider set, rejecting)".yellow()),
    };
    println!("  {:<18} {}", "Unknown requests:".bold(), policy);
    println!(
        "  {:<18} {}",
        "Require keys:".bold(),
        if routing.require_credentials { "yes" } else { "no" }
    );
    println!(
        "  {:<18} {}",
        "Rules:".bold(),
        format!(
            "{} ({} model aliases)",
            router.rules().rules().len(),
            routing.model_aliases.len()
        )
        .dimmed()
    );
    for alias in &routing.model_aliases {
        println!("    {:<20} → {}", alias.prefix, alias.provider);
    }

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let provider_config = config.providers.get(spec.identity);
        let source = router.credential_source(spec.identity);
        let key = provider_config.map(|c| c.api_key.as_str()).unwrap_or_default();
        let cell = credential_cell(source, key, spec.env_key);
        let status = match source {
            CredentialSource::None => cell.dimmed(),
            CredentialSource::Config | CredentialSource::Env => cell.green(),
        };
        let base = provider_config
            .and_then(|c| c.api_base.as_deref())
            .unwrap_or(spec.default_api_base);
        println!("    {:<16} {} {}", spec.display_name, status, base.dimmed());
    }

    println!();

    Ok(())
}

/// Credential column text, padded before colouring so escape codes don't
/// count toward the width.
fn credential_cell(source: CredentialSource, api_key: &str, env_key: &str) -> String {
    let text = match source {
        CredentialSource::Config => format!("✓ key {}", mask_secret(api_key)),
        CredentialSource::Env => format!("✓ ${}", env_key),
        CredentialSource::None => "· not configured".to_string(),
    };
    format!("{:<28}", text)
}
