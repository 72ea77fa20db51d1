//! chatauth API server binary.
//!
//! Serves the login/registration endpoints and the token-protected API over
//! an in-memory identity directory.

use std::sync::Arc;

use chatauth_api::config::ApiConfig;
use chatauth_core::directory::MemoryDirectory;
use clap::Parser;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "chatauth_server", about = "chatauth API server")]
struct Args {
    /// Port to listen on (0 = ephemeral). Overrides the port in `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Interface to bind when `--port` is given.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Create an admin identity from `ADMIN_USERNAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`.
    #[arg(long, default_value_t = false)]
    seed_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatauth_api=debug,chatauth_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(port) = args.port {
        config.bind_addr = format!("{}:{port}", args.host);
    }
    info!(?config, "starting chatauth_server");

    let directory = Arc::new(MemoryDirectory::new());

    if args.seed_admin {
        match (
            std::env::var("ADMIN_USERNAME"),
            std::env::var("ADMIN_EMAIL"),
            std::env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => {
                chatauth_api::services::auth::seed_admin(
                    directory.as_ref(),
                    &username,
                    &email,
                    &password,
                )
                .await?;
                info!(username = %username, "admin identity seeded");
            }
            _ => warn!("--seed-admin needs ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD"),
        }
    }

    let state = chatauth_api::AppState::new(config.clone(), directory)?;
    let app = chatauth_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
