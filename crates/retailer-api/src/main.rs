use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use retailer_api::{router, state, AppConfig, AppState, StoreKind};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Retailer onboarding records service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Run database migrations
    Migrate,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on (overrides RETAILER_BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Skip running migrations before serving
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Serve(args) => serve(config, args).await,
        Command::Migrate => {
            if config.store != StoreKind::Postgres {
                bail!("migrations only apply to the postgres store");
            }
            let repository = state::connect_postgres(&config).await?;
            repository
                .run_migrations()
                .await
                .context("failed to run database migrations")?;
            info!("Database migrations applied");
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, args: ServeArgs) -> Result<()> {
    let app_state = AppState::open(&config, !args.skip_migrations).await?;
    let bind_addr = args.bind.unwrap_or(config.bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(
        timezone = %config.settings.timezone,
        validation = %config.settings.validation,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, router(app_state.clone()).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app_state.close().await;
    info!("record store closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
