//! # licmgr-signer entry point
//!
//! `serve` runs the signer emulator; `keygen` writes a seed file.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use licmgr_crypto::DEFAULT_DEVICE_ID;
use tracing_subscriber::EnvFilter;

/// Hardware signer emulator for the license manager.
#[derive(Parser, Debug)]
#[command(name = "licmgr-signer", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve `/sign` and `/info`.
    Serve(ServeArgs),
    /// Generate a new seed file.
    Keygen(KeygenArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "LICMGR_SIGNER_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,
    /// Port to listen on.
    #[arg(long, env = "LICMGR_SIGNER_PORT", default_value_t = 8081)]
    port: u16,
    /// Seed file holding the signing key. Read on every request.
    #[arg(long, env = "LICMGR_SIGNER_SEED_FILE", default_value = "hw.json")]
    seed_file: PathBuf,
}

#[derive(Args, Debug)]
struct KeygenArgs {
    /// Where to write the seed file.
    #[arg(long, default_value = "hw.json")]
    out: PathBuf,
    /// Device id recorded in the file.
    #[arg(long, default_value = DEFAULT_DEVICE_ID)]
    device_id: String,
    /// Replace an existing file.
    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Serve(args) => serve(args),
        Commands::Keygen(args) => keygen(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match std::env::var("LICMGR_LOG_FORMAT") {
        Ok(v) if v.eq_ignore_ascii_case("json") => builder.json().init(),
        _ => builder.init(),
    }
}

fn keygen(args: KeygenArgs) -> anyhow::Result<()> {
    let public_key = licmgr_signer::write_seed_file(&args.out, &args.device_id, args.force)?;
    println!("OK: generated {} (keep this file private)", args.out.display());
    println!("  Device id:  {}", args.device_id);
    println!("  Public key: {}", public_key.to_base64());
    Ok(())
}

fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    runtime.block_on(async {
        if !args.seed_file.exists() {
            tracing::warn!(
                seed_file = %args.seed_file.display(),
                "seed file not found; /sign will answer hw_lock_not_found until it exists"
            );
        }
        let app = licmgr_signer::router(args.seed_file.clone());
        let addr = SocketAddr::new(args.bind, args.port);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        tracing::info!(seed_file = %args.seed_file.display(), "signer emulator listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("signer server")
    })
}
