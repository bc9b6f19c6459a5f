//! # licmgr-verify entry point
//!
//! Exit status: 0 verified, 2 signature mismatch (canonical bytes written to
//! the debug path), 1 anything that kept the check from running.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use licmgr_verify::{Verdict, VerifyOptions};
use tracing_subscriber::EnvFilter;

/// Verify the newest signed usage summary against the signer's seed file.
#[derive(Parser, Debug)]
#[command(name = "licmgr-verify", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Seed file. Defaults to the first of ./hw.json, ./hw-emulator/hw.json.
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Directory holding the summary artifacts.
    #[arg(long, default_value = "summaries")]
    summaries_dir: PathBuf,

    /// Verify this artifact instead of the newest one.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Where to write the canonical bytes when verification fails.
    #[arg(long, default_value = "last_canonical.json")]
    debug_out: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = VerifyOptions {
        seed: cli.seed,
        summaries_dir: cli.summaries_dir,
        file: cli.file,
        debug_out: cli.debug_out,
    };

    match licmgr_verify::run(&options) {
        Ok(verdict) => {
            match &verdict {
                Verdict::Verified { path, digest } => {
                    println!("OK: signature verified for {}", path.display());
                    println!("  digest: {digest}");
                }
                Verdict::Failed {
                    path,
                    digest,
                    debug_out,
                } => {
                    println!("FAIL: signature verification failed for {}", path.display());
                    println!("  digest: {digest}");
                    if let Some(out) = debug_out {
                        println!("wrote {} for debugging", out.display());
                    }
                }
            }
            ExitCode::from(verdict.exit_code())
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
