//! HTTP front end for the reactor model: tick loop, snapshot and command
//! endpoints, a server-sent event stream and static assets.

mod action;
mod app;
mod error;
mod hub;
mod ticker;
mod trace;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use sim::{Reactor, ReactorConfig};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::AppState;
use crate::hub::Hub;
use crate::ticker::TickDriver;
use crate::trace::TraceArgs;

#[derive(Parser, Debug)]
#[command(
    name = "reactor-sim",
    version,
    about = "Real-time reactor simulation served over HTTP",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Run headless and print a JSONL trace to stdout
    Trace(TraceArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Wall-clock tick period in milliseconds
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Simulated seconds per tick, independent of --tick-ms
    #[arg(long, default_value_t = 0.2)]
    dt: f64,

    /// Static asset directory. Defaults to frontend/ if present, else ./static
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Seed for the grid load generator
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Trace(args)) => {
            let stdout = std::io::stdout();
            trace::run(&args, &mut stdout.lock())
        }
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(cli.serve).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    // stdout carries trace output; logs go to stderr.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve(args: ServeArgs) -> Result<()> {
    ensure!(
        args.dt >= 0.0 && args.dt.is_finite(),
        "--dt must be a non-negative number"
    );

    let cfg = ReactorConfig {
        seed: args.seed,
        ..ReactorConfig::default()
    };
    let reactor = Arc::new(Reactor::with_config(cfg).context("invalid reactor configuration")?);
    let hub = Arc::new(Hub::new());

    let driver = TickDriver::new(Arc::clone(&reactor), Arc::clone(&hub), args.dt);
    tokio::spawn(driver.run(Duration::from_millis(args.tick_ms)));

    let static_dir = resolve_static_dir(args.static_dir);
    let app = app::router(AppState { reactor, hub }, &static_dir);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("failed to parse bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;

    info!(
        "server listening on http://{} (static: {})",
        addr,
        static_dir.display()
    );

    let server = axum::serve(listener, app.into_make_service());

    tokio::select! {
        result = server => result.context("server exited with error")?,
        _ = signal::ctrl_c() => {
            warn!("received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

fn resolve_static_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    let frontend = Path::new("frontend");
    if frontend.is_dir() {
        frontend.to_path_buf()
    } else {
        PathBuf::from("static")
    }
}
