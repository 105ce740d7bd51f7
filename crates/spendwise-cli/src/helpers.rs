//! Shared CLI helpers — path expansion, input reading, status marks.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use spendwise_core::ProviderIdentity;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Read a request body from `file`, or stdin when `None`.
pub fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            let path = expand_tilde(&path.to_string_lossy());
            std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read request body from stdin")?;
            Ok(buf)
        }
    }
}

/// Provider name, coloured per vendor. `unknown` is dimmed.
pub fn provider_label(provider: ProviderIdentity) -> ColoredString {
    match provider {
        ProviderIdentity::OpenAi => provider.as_str().green().bold(),
        ProviderIdentity::Anthropic => provider.as_str().yellow().bold(),
        ProviderIdentity::Google => provider.as_str().blue().bold(),
        ProviderIdentity::Unknown => provider.as_str().dimmed(),
    }
}

/// `✓` or a dimmed `·`, as used in status listings.
pub fn check_mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "·".dimmed().to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
