use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth_fga::{bootstrap, FgaClientHandle, FgaConfig};
use users_server::{create_app, AppState};

/// Users API HTTP server
#[derive(Parser, Debug)]
#[command(name = "users-server")]
#[command(about = "Users CRUD API with OpenFGA relationship-based authorization")]
struct Args {
    /// Server bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Do not write the baseline relationships at startup
    #[arg(long)]
    skip_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    init_tracing(args.verbose);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting users API server");

    let config = FgaConfig::from_env().context("failed to load OpenFGA configuration")?;
    let handle = Arc::new(FgaClientHandle::from_config(config));

    let connected = bootstrap::probe_connectivity(&handle).await;
    if connected {
        info!("OpenFGA authorization is enabled and connected");
        if args.skip_seed {
            info!("Skipping baseline relationship seeding");
        } else {
            bootstrap::seed_relationships(&handle).await;
        }
    } else {
        warn!(
            "Using fallback authorization rules: admin has full access, \
             users can access their own records"
        );
    }

    let app = create_app(AppState::in_memory(handle).with_connectivity(connected));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    info!(address = %addr, "Users API listening");
    info!("Health check available at: http://{}/health", addr);

    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "users_server={level},auth_fga={level},auth_gateway={level},\
             tower_http=info,reqwest=info"
        )
        .into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
