//! `spendwise onboard` — create the default config file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use spendwise_core::config::{get_config_path, save_config, Config};

/// Run the onboard command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "Spendwise — Setup".cyan().bold());
    println!();

    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "  Add provider keys under \"providers\", then run `spendwise status`.".green()
    );
    println!();

    Ok(())
}

/// Write `Config::default()` unless a file already exists. Returns whether
/// a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
