// crates/acgs2-cli/src/main.rs
// ============================================================================
// Module: CLI Composition Root
// Description: Wires the governance core crates together behind a single
//              `acgs2` binary: score+route+guard a message, run the
//              Propose-Solve-Verify loop, and sign/verify bundle manifests.
// ============================================================================

mod bundle_cmd;
mod decider;
mod error;
mod logging;
mod pipeline;
mod verify_policy;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use acgs2_bundle::BundleManifest;
use clap::Parser;
use clap::Subcommand;

use crate::bundle_cmd::run_bundle_sign;
use crate::bundle_cmd::run_bundle_verify;
use crate::error::CliError;
use crate::pipeline::run_govern_pipeline;
use crate::pipeline::GovernRequest;
use crate::verify_policy::run_verify_policy;

/// Command-line surface for exercising the ACGS-2 governance core locally.
#[derive(Debug, Parser)]
#[command(name = "acgs2", version, about = "ACGS-2 governance core CLI")]
struct Cli {
    /// Path to a TOML configuration file. Falls back to `ACGS2_CONFIG` or
    /// built-in defaults when unset.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit structured JSON logs instead of human-readable ones.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scores, routes, and (for fast-lane messages) gates one message read
    /// from a JSON request file.
    Govern {
        /// Path to a JSON file deserializing to a `GovernRequest`.
        #[arg(long)]
        request: PathBuf,
    },
    /// Runs the bounded Propose-Solve-Verify loop over a natural-language
    /// specification.
    VerifyPolicy {
        /// The requirement text to generate and verify a policy for.
        #[arg(long)]
        specification: String,
        /// Path to the Dafny binary used for formal verification.
        #[arg(long, default_value = "dafny")]
        dafny_binary: String,
        /// Maximum Propose-Solve-Verify iterations before giving up.
        #[arg(long, default_value_t = 5)]
        max_iterations: u32,
    },
    /// Signs and verifies bundle manifests.
    #[command(subcommand)]
    Bundle(BundleCommand),
    /// Prints the effective configuration as TOML.
    ConfigShow,
}

#[derive(Debug, Subcommand)]
enum BundleCommand {
    /// Builds and signs a new bundle manifest.
    Sign {
        /// Semantic version of the bundle.
        #[arg(long)]
        version: String,
        /// 40-character git SHA this bundle was built from.
        #[arg(long)]
        revision: String,
        /// Policy roots this bundle covers. Repeat the flag for each root.
        #[arg(long = "root", required = true)]
        roots: Vec<String>,
        /// 64-character hex-encoded Ed25519 signing key seed.
        #[arg(long)]
        seed_hex: String,
        /// Where to write the signed manifest as JSON.
        #[arg(long)]
        out: PathBuf,
    },
    /// Verifies a signed bundle manifest against a public key.
    Verify {
        /// Path to a signed manifest JSON file.
        #[arg(long)]
        manifest: PathBuf,
        /// 64-character hex-encoded Ed25519 public key.
        #[arg(long)]
        public_key_hex: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    match cli.command {
        Command::Govern { request } => govern(cli.config.as_deref(), &request).await,
        Command::VerifyPolicy { specification, dafny_binary, max_iterations } => {
            verify_policy_cmd(&specification, &dafny_binary, max_iterations).await
        }
        Command::Bundle(BundleCommand::Sign { version, revision, roots, seed_hex, out }) => {
            bundle_sign(&version, &revision, roots, &seed_hex, &out)
        }
        Command::Bundle(BundleCommand::Verify { manifest, public_key_hex }) => {
            bundle_verify(&manifest, &public_key_hex)
        }
        Command::ConfigShow => config_show(cli.config.as_deref()),
    }
}

async fn govern(config_path: Option<&Path>, request_path: &Path) -> Result<(), CliError> {
    let config = acgs2_config::load(config_path)?;
    let body = fs::read_to_string(request_path)?;
    let request: GovernRequest = serde_json::from_str(&body)?;
    let outcome = run_govern_pipeline(&config, request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn verify_policy_cmd(specification: &str, dafny_binary: &str, max_iterations: u32) -> Result<(), CliError> {
    let policy = run_verify_policy(specification, dafny_binary, max_iterations).await?;
    println!("{}", serde_json::to_string_pretty(&policy)?);
    Ok(())
}

fn bundle_sign(
    version: &str,
    revision: &str,
    roots: Vec<String>,
    seed_hex: &str,
    out: &Path,
) -> Result<(), CliError> {
    let manifest = run_bundle_sign(version, revision, roots, seed_hex)?;
    fs::write(out, serde_json::to_string_pretty(&manifest)?)?;
    tracing::info!(path = %out.display(), "wrote signed bundle manifest");
    Ok(())
}

fn bundle_verify(manifest_path: &Path, public_key_hex: &str) -> Result<(), CliError> {
    let body = fs::read_to_string(manifest_path)?;
    let manifest: BundleManifest = serde_json::from_str(&body)?;
    let valid = run_bundle_verify(&manifest, public_key_hex)?;
    println!("{}", serde_json::json!({ "valid": valid }));
    Ok(())
}

fn config_show(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = acgs2_config::load(config_path)?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}
