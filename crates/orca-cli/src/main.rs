//! Command-line interface for the Orca checkout decision engine.
//!
//! Wraps [`orca_engine::DecisionEngine`] for local/offline use: feed it a
//! decision request as a JSON literal, a file, or stdin, and get back the
//! AP2 contract (or the legacy internal response shape) on stdout or a
//! file. Also exposes the contract validator and a human-readable
//! decision explanation, independent of the HTTP server.

use clap::{Parser, Subcommand};
use orca_core::contract::DecisionContract;
use orca_core::request::{Channel, Rail};
use orca_core::DecisionRequest;
use orca_engine::{DecisionEngine, DecisionOutcome, OrcaSettings};
use orca_events::ContractValidator;
use serde_json::Value as Json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "orca", about = "Orca checkout decision engine CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide on a request given as a JSON literal (or `-` for stdin).
    Decide {
        json: String,
        #[command(flatten)]
        overrides: RailChannelOverrides,
        #[arg(long)]
        legacy_json: bool,
    },
    /// Decide on a request read from stdin.
    DecideStdin {
        #[command(flatten)]
        overrides: RailChannelOverrides,
        #[arg(long)]
        legacy_json: bool,
    },
    /// Decide on a request loaded from a file.
    DecideFile {
        path: PathBuf,
        #[command(flatten)]
        overrides: RailChannelOverrides,
        /// Write the result to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit the internal `DecisionResponse` shape instead of the AP2 contract.
        #[arg(long)]
        legacy_json: bool,
        /// Attach the human-readable explanation under an `explanation` key.
        #[arg(long)]
        explain: bool,
        /// Only validate the request and report; do not run the decision.
        #[arg(long)]
        validate_only: bool,
    },
    /// Validate a file against the AP2 decision contract schema.
    Validate {
        path: PathBuf,
        #[arg(long)]
        verbose: bool,
    },
    /// Write a sample decision request to a file.
    CreateSample {
        path: PathBuf,
        #[arg(long, default_value_t = 100.0)]
        amount: f64,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long, default_value = "web")]
        channel: String,
        #[arg(long, default_value = "immediate")]
        modality: String,
        #[arg(long, default_value = "US")]
        country: String,
    },
    /// Print a human-readable explanation for a decided request file.
    Explain {
        path: PathBuf,
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(clap::Args)]
struct RailChannelOverrides {
    #[arg(long)]
    rail: Option<String>,
    #[arg(long)]
    channel: Option<String>,
}

impl RailChannelOverrides {
    fn apply(&self, request: &mut DecisionRequest) -> Result<(), String> {
        if let Some(rail) = &self.rail {
            request.rail = match rail.to_ascii_lowercase().as_str() {
                "card" => Rail::Card,
                "ach" => Rail::ACH,
                other => return Err(format!("unknown rail: {other}")),
            };
        }
        if let Some(channel) = &self.channel {
            request.channel = match channel.to_ascii_lowercase().as_str() {
                "online" | "web" => Channel::Online,
                "pos" => Channel::Pos,
                other => return Err(format!("unknown channel: {other}")),
            };
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Decide { json, overrides, legacy_json } => {
            let raw = if json == "-" { read_stdin()? } else { json };
            let request = parse_request(&raw)?;
            let outcome = decide(request, &overrides).await?;
            println!("{}", render(&outcome, legacy_json, false)?);
            Ok(())
        }
        Commands::DecideStdin { overrides, legacy_json } => {
            let raw = read_stdin()?;
            let request = parse_request(&raw)?;
            let outcome = decide(request, &overrides).await?;
            println!("{}", render(&outcome, legacy_json, false)?);
            Ok(())
        }
        Commands::DecideFile { path, overrides, output, legacy_json, explain, validate_only } => {
            let raw = read_file(&path)?;
            let request = parse_request(&raw)?;

            if validate_only {
                request.validate().map_err(|e| format!("validation failed: {e}"))?;
                println!("\u{2705} AP2 contract is valid");
                return Ok(());
            }

            let outcome = decide(request, &overrides).await?;
            let rendered = render(&outcome, legacy_json, explain)?;
            match output {
                Some(path) => std::fs::write(&path, rendered)
                    .map_err(|e| format!("failed to write {}: {e}", path.display()))?,
                None => println!("{rendered}"),
            }
            Ok(())
        }
        Commands::Validate { path, verbose } => validate_command(&path, verbose),
        Commands::CreateSample { path, amount, currency, channel, modality, country } => {
            create_sample_command(&path, amount, &currency, &channel, &modality, &country)
        }
        Commands::Explain { path, verbose } => explain_command(&path, verbose).await,
    }
}

fn read_stdin() -> Result<String, String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    if buffer.trim().is_empty() {
        return Err("No JSON input provided".to_string());
    }
    Ok(buffer)
}

fn read_file(path: &Path) -> Result<String, String> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()));
    }
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

fn parse_request(raw: &str) -> Result<DecisionRequest, String> {
    if raw.trim().is_empty() {
        return Err("No JSON input provided".to_string());
    }
    serde_json::from_str(raw).map_err(|e| format!("Invalid JSON in file: {e}"))
}

async fn decide(
    mut request: DecisionRequest,
    overrides: &RailChannelOverrides,
) -> Result<DecisionOutcome, String> {
    overrides.apply(&mut request)?;
    request.validate().map_err(|e| format!("validation failed: {e}"))?;

    let settings = OrcaSettings::load();
    let explainer = DecisionEngine::build_explainer(&settings);
    let engine = DecisionEngine::new(&settings, explainer);
    engine.decide(request).await.map_err(|e| format!("decision failed: {e}"))
}

fn render(outcome: &DecisionOutcome, legacy_json: bool, with_explanation: bool) -> Result<String, String> {
    let mut value = if legacy_json {
        serde_json::to_value(&outcome.response)
    } else {
        serde_json::to_value(&outcome.contract)
    }
    .map_err(|e| format!("failed to serialize response: {e}"))?;

    if with_explanation {
        if let Json::Object(map) = &mut value {
            map.insert("explanation".to_string(), Json::String(outcome.response.explanation_human.clone()));
        }
    }

    serde_json::to_string_pretty(&value).map_err(|e| format!("failed to render JSON: {e}"))
}

fn validate_command(path: &Path, verbose: bool) -> Result<(), String> {
    if !path.exists() {
        println!("\u{274c} File does not exist: {}", path.display());
        return Err(format!("{} does not exist", path.display()));
    }
    let raw = read_file(path)?;
    let payload: Json = serde_json::from_str(&raw).map_err(|e| {
        println!("\u{274c} Invalid JSON: {e}");
        format!("invalid JSON: {e}")
    })?;

    let validator = ContractValidator::without_schemas();
    match validator.validate_mandate(&payload, "ap2_decision") {
        Ok(()) => {
            println!("\u{2705} AP2 contract is valid");
            if verbose {
                println!("Contract Summary:");
                println!("  AP2 Version: {}", payload.get("ap2_version").and_then(Json::as_str).unwrap_or("?"));
                println!(
                    "  Intent Channel: {}",
                    payload.pointer("/intent/channel").and_then(Json::as_str).unwrap_or("?")
                );
            }
            Ok(())
        }
        Err(issues) => {
            println!("\u{274c} AP2 contract validation failed");
            for issue in &issues {
                println!("  {}: {}", issue.path, issue.message);
            }
            Err("contract validation failed".to_string())
        }
    }
}

fn create_sample_command(
    path: &Path,
    amount: f64,
    currency: &str,
    channel: &str,
    modality: &str,
    country: &str,
) -> Result<(), String> {
    let channel_value = match channel.to_ascii_lowercase().as_str() {
        "pos" => "pos",
        _ => "online",
    };
    let sample = serde_json::json!({
        "cart_total": amount,
        "currency": currency,
        "rail": "Card",
        "channel": channel_value,
        "features": {},
        "context": {
            "billing_country": country,
            "location_ip_country": country,
            "payment_modality": modality,
        },
    });
    let rendered =
        serde_json::to_string_pretty(&sample).map_err(|e| format!("failed to render sample: {e}"))?;
    std::fs::write(path, rendered).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    println!("\u{2705} Sample AP2 contract created at {}", path.display());
    Ok(())
}

async fn explain_command(path: &Path, verbose: bool) -> Result<(), String> {
    let raw = read_file(path)?;
    let request = parse_request(&raw)?;
    let outcome = decide(request, &RailChannelOverrides { rail: None, channel: None }).await?;

    println!("Decision Explanation");
    println!("Decision: {}", outcome.contract.decision.result);
    println!("{}", outcome.response.explanation_human);

    if verbose {
        println!("Decision Summary:");
        println!("  Result: {}", outcome.contract.decision.result);
        println!("  Risk Score: {:.2}", outcome.contract.decision.risk_score);
        println!("  Reasons: {}", outcome.contract.decision.reasons.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rail_override_rejects_unknown_value() {
        let mut request: DecisionRequest = serde_json::from_value(serde_json::json!({"cart_total": 1.0})).unwrap();
        let overrides = RailChannelOverrides { rail: Some("bogus".to_string()), channel: None };
        assert!(overrides.apply(&mut request).is_err());
    }

    #[test]
    fn channel_override_accepts_web_alias() {
        let mut request: DecisionRequest = serde_json::from_value(serde_json::json!({"cart_total": 1.0})).unwrap();
        let overrides = RailChannelOverrides { rail: None, channel: Some("web".to_string()) };
        overrides.apply(&mut request).unwrap();
        assert_eq!(request.channel, Channel::Online);
    }

    #[test]
    fn parse_request_rejects_empty_input() {
        assert!(parse_request("").is_err());
    }

    #[test]
    fn parse_request_rejects_malformed_json() {
        assert!(parse_request("not json").is_err());
    }
}
