//! Config loader — reads `~/.spendwise/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.spendwise/config.json`
//! 3. Environment variables `SPENDWISE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig, UnknownPolicy};
use crate::types::ProviderIdentity;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

/// Read and migrate the config file, without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return Config::default();
        }
    };

    migrate_config(&mut raw);

    match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves top-level `defaultProvider` → `routing.fallbackProvider` and switches
/// `routing.unknownPolicy` to `"fallback"`, unless routing already names a
/// fallback.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    let Some(legacy) = obj.remove("defaultProvider") else {
        return;
    };

    let routing = obj
        .entry("routing")
        .or_insert_with(|| serde_json::json!({}));
    let Some(routing) = routing.as_object_mut() else {
        return;
    };

    if routing.contains_key("fallbackProvider") {
        debug!("Ignoring legacy defaultProvider, routing.fallbackProvider is set");
        return;
    }

    routing.insert("fallbackProvider".to_string(), legacy);
    routing
        .entry("unknownPolicy")
        .or_insert_with(|| serde_json::json!("fallback"));
    debug!("Migrated defaultProvider → routing.fallbackProvider");
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `SPENDWISE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `SPENDWISE_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `SPENDWISE_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `SPENDWISE_ROUTING__UNKNOWN_POLICY` → `routing.unknown_policy`
/// - `SPENDWISE_ROUTING__FALLBACK_PROVIDER` → `routing.fallback_provider`
/// - `SPENDWISE_ROUTING__REQUIRE_CREDENTIALS` → `routing.require_credentials`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    apply_provider_env(&mut config.providers.openai, "OPENAI", &var);
    apply_provider_env(&mut config.providers.anthropic, "ANTHROPIC", &var);
    apply_provider_env(&mut config.providers.google, "GOOGLE", &var);

    if let Some(val) = var("SPENDWISE_ROUTING__UNKNOWN_POLICY") {
        match val.parse::<UnknownPolicy>() {
            Ok(policy) => config.routing.unknown_policy = policy,
            Err(e) => warn!("Ignoring SPENDWISE_ROUTING__UNKNOWN_POLICY: {}", e),
        }
    }
    if let Some(val) = var("SPENDWISE_ROUTING__FALLBACK_PROVIDER") {
        match val.parse::<ProviderIdentity>() {
            Ok(provider) => config.routing.fallback_provider = Some(provider),
            Err(e) => warn!("Ignoring SPENDWISE_ROUTING__FALLBACK_PROVIDER: {}", e),
        }
    }
    if let Some(val) = var("SPENDWISE_ROUTING__REQUIRE_CREDENTIALS") {
        config.routing.require_credentials = val == "true" || val == "1";
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(
    provider: &mut ProviderConfig,
    name: &str,
    var: &impl Fn(&str) -> Option<String>,
) {
    if let Some(val) = var(&format!("SPENDWISE_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Some(val) = var(&format!("SPENDWISE_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
