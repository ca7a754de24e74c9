//! pbt-dash - Pitcher Biomechanics Tracker dashboard
//!
//! Serves the dashboard (default) or runs a one-shot cleanup of sessions
//! whose CSV files have gone missing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pbt_common::config::{self, TomlConfig, DEFAULT_BIND_ADDRESS, DEFAULT_PORT};
use pbt_common::db::init_database;
use pbt_common::DashboardConfig;
use pbt_dash::api::buildinfo::BuildInfo;
use pbt_dash::services::admin;
use pbt_dash::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pbt-dash
#[derive(Parser, Debug)]
#[command(name = "pbt-dash")]
#[command(about = "Pitcher Biomechanics Tracker dashboard")]
#[command(version)]
struct Args {
    /// Root folder holding pbt.db, videos/ and data/
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PBT_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// TOML config file
    #[arg(short, long, env = "PBT_CONFIG")]
    config: Option<PathBuf>,

    /// Bearer token required on API routes
    #[arg(long, env = "PBT_OPERATOR_TOKEN", hide_env_values = true)]
    operator_token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP dashboard (default)
    Serve,
    /// Remove sessions whose CSV file no longer exists, then exit
    Prune,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so the file can set the log level
    let toml = TomlConfig::load_or_default(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("pbt_dash={0},pbt_common={0},tower_http=info", toml.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database work
    info!(
        "Starting Pitcher Biomechanics Tracker (pbt-dash) {}",
        BuildInfo::current()
    );

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml);
    let mut dashboard = DashboardConfig::from_toml(&root_folder, &toml);
    if let Some(token) = args.operator_token.filter(|t| !t.is_empty()) {
        dashboard.operator_token = Some(token);
    }
    dashboard
        .ensure_directories()
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;
    info!("Root folder: {}", root_folder.display());
    info!("Database path: {}", dashboard.database_path.display());

    let pool = match init_database(&dashboard.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Prune => {
            let report = admin::prune_broken_sessions(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            pool.close().await;
            Ok(())
        }
        Command::Serve => {
            let port = args.port.or(toml.port).unwrap_or(DEFAULT_PORT);
            let bind = args
                .bind
                .or(toml.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
            serve(pool, dashboard, &bind, port).await
        }
    }
}

async fn serve(
    pool: sqlx::SqlitePool,
    dashboard: DashboardConfig,
    bind: &str,
    port: u16,
) -> Result<()> {
    if dashboard.operator_token.is_some() {
        info!("Operator token set; API authentication enabled");
    } else {
        info!("No operator token configured; API authentication disabled");
    }

    let addr = config::listen_address(bind, port)?;

    let app = build_router(AppState::new(pool.clone(), dashboard));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("pbt-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
