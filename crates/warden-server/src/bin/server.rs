//! `warden-server` — standalone binary for the Warden tool-execution server.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden_config::TransportKind;
use warden_server::WardenServer;

/// Warden — secure tool-execution server.
#[derive(Parser)]
#[command(name = "warden-server")]
#[command(author, version, about = "Warden secure tool-execution server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "warden.toml")]
    config: PathBuf,

    /// Override the configured transport.
    #[arg(long, value_enum)]
    transport: Option<CliTransport>,

    /// Override the configured bind address (ignored for `stdio`).
    #[arg(long)]
    bind: Option<String>,

    /// Increase log verbosity. Repeat for more detail (`-v`, `-vv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliTransport {
    Stdio,
    Tcp,
    Ws,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warden_server=info,warden_execution=info,warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = warden_config::load(&args.config)?;
    if let Some(transport) = args.transport {
        config.server.transport = match transport {
            CliTransport::Stdio => TransportKind::Stdio,
            CliTransport::Tcp => TransportKind::Tcp,
            CliTransport::Ws => TransportKind::Websocket,
        };
    }
    if args.bind.is_some() {
        config.server.bind = args.bind;
    }

    let server = WardenServer::bootstrap(&config, warden_server::default_tools())?;

    tracing::info!(transport = ?config.server.transport, "warden-server starting");

    tokio::select! {
        result = server.run(&config) => result.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
            Ok(())
        }
    }
}
