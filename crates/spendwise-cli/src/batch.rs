//! `spendwise batch` — classify a JSONL capture of proxied requests.
//!
//! Each non-blank line is `{"path": "/v1/...", "body": {...}}`. Lines that
//! don't parse are reported and counted, never fatal.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::warn;

use spendwise_core::config::Config;
use spendwise_core::utils::{timestamp, truncate_string};
use spendwise_core::ProviderIdentity;
use spendwise_providers::{RequestSignature, RuleSet, Router};

use crate::helpers::{expand_tilde, provider_label};

#[derive(Debug, Deserialize)]
struct BatchRecord {
    #[serde(default)]
    path: String,
    #[serde(default)]
    body: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchLine {
    line: usize,
    provider: ProviderIdentity,
    path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport {
    generated_at: String,
    total: usize,
    malformed: Vec<usize>,
    counts: BTreeMap<&'static str, usize>,
    results: Vec<BatchLine>,
}

/// Run the batch command.
pub fn run(config: &Config, file: &Path, json: bool) -> Result<()> {
    let path = expand_tilde(&file.to_string_lossy());
    let handle = std::fs::File::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let router = Router::new(config);
    let report = summarize(router.rules(), std::io::BufReader::new(handle))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn summarize(rules: &RuleSet, reader: impl BufRead) -> Result<BatchReport> {
    let mut counts: BTreeMap<&'static str, usize> = ProviderIdentity::ROUTABLE
        .iter()
        .chain(std::iter::once(&ProviderIdentity::Unknown))
        .map(|p| (p.as_str(), 0))
        .collect();
    let mut malformed = Vec::new();
    let mut results = Vec::new();

    for (idx, line) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        if line.trim_ascii().is_empty() {
            continue;
        }

        let record: BatchRecord = match serde_json::from_slice(&line) {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line_no, "skipping malformed record: {}", e);
                malformed.push(line_no);
                continue;
            }
        };

        let sig = RequestSignature::from_value(&record.body, &record.path);
        let provider = rules.classify(&sig).provider;
        *counts.entry(provider.as_str()).or_default() += 1;
        results.push(BatchLine {
            line: line_no,
            provider,
            path: record.path,
        });
    }

    Ok(BatchReport {
        generated_at: timestamp(),
        total: results.len(),
        malformed,
        counts,
        results,
    })
}

fn print_report(report: &BatchReport) {
    println!();
    for r in &report.results {
        println!(
            "  {:>5}  {:<10} {}",
            r.line,
            provider_label(r.provider),
            truncate_string(&r.path, 60).as_str().dimmed()
        );
    }

    println!();
    println!("  {}", "Summary:".bold());
    for (name, count) in &report.counts {
        println!("    {:<12} {}", name, count);
    }
    println!("    {:<12} {}", "classified", report.total);
    if !report.malformed.is_empty() {
        let lines: Vec<String> = report.malformed.iter().map(|n| n.to_string()).collect();
        println!(
            "    {:<12} {} (lines {})",
            "malformed".red(),
            report.malformed.len(),
            lines.join(", ")
        );
    }
    println!("  {}", report.generated_at.as_str().dimmed());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = r#"{"path":"/v1/chat/completions","body":{"model":"gpt-4o","messages":[]}}
{"path":"/v1/messages","body":{"model":"claude-3-5-sonnet-latest","messages":[],"system":"x"}}

{"path":"/proxy","body":{"contents":[]}}
this is not json
{"path":"/healthz"}
{"body":{"messages":[],"system":"x"}}
"#;

    #[test]
    fn test_summarize_counts() {
        let report = summarize(&RuleSet::standard(), CAPTURE.as_bytes()).unwrap();

        assert_eq!(report.total, 5);
        assert_eq!(report.counts["openai"], 1);
        assert_eq!(report.counts["anthropic"], 2);
        assert_eq!(report.counts["google"], 1);
        assert_eq!(report.counts["unknown"], 1);
        assert_eq!(report.malformed, vec![5]);
    }

    #[test]
    fn test_summarize_keeps_line_numbers() {
        let report = summarize(&RuleSet::standard(), CAPTURE.as_bytes()).unwrap();
        let lines: Vec<usize> = report.results.iter().map(|r| r.line).collect();
        // Line 3 is blank, line 5 malformed
        assert_eq!(lines, vec![1, 2, 4, 6, 7]);
        assert_eq!(report.results[3].path, "/healthz");
        assert_eq!(report.results[3].provider, ProviderIdentity::Unknown);
    }

    #[test]
    fn test_summarize_uses_aliases() {
        let rules = RuleSet::standard().with_model_prefix("mistral-", ProviderIdentity::OpenAi);
        let input = r#"{"path":"/x","body":{"model":"mistral-large","contents":[]}}"#;
        let report = summarize(&rules, input.as_bytes()).unwrap();
        assert_eq!(report.results[0].provider, ProviderIdentity::OpenAi);
    }

    #[test]
    fn test_summarize_invalid_utf8_line() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"path":"/v1/chat/completions","body":{"model":"gpt-4o"}}"#);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"path":"/v1/messages","body":{"model":"claude-3-haiku"}}"#);
        input.extend_from_slice(b"\r\n");

        let report = summarize(&RuleSet::standard(), input.as_slice()).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.malformed, vec![2]);
        assert_eq!(report.counts["openai"], 1);
        assert_eq!(report.counts["anthropic"], 1);
    }

    #[test]
    fn test_summarize_empty_input() {
        let report = summarize(&RuleSet::standard(), "".as_bytes()).unwrap();
        assert_eq!(report.total, 0);
        assert!(report.malformed.is_empty());
        assert_eq!(report.counts.len(), 4);
        assert!(report.counts.values().all(|&n| n == 0));
    }

    #[test]
    fn test_report_json_shape() {
        let report = summarize(&RuleSet::standard(), CAPTURE.as_bytes()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("generatedAt").is_some());
        assert_eq!(json["counts"]["anthropic"], 2);
        assert_eq!(json["results"][0]["provider"], "openai");
    }
}
