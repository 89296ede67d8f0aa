mod fetch;
mod store;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricesync")]
#[command(about = "Fetch supplier price lists and normalize them into product records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch all active suppliers concurrently and save their products
    Fetch {
        /// Fetch a single supplier by name (case-insensitive)
        #[arg(long)]
        supplier: Option<String>,
        /// Directory to write `<supplier>.json` files into (overrides
        /// `PRICESYNC_OUTPUT_DIR`)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the suppliers that would be fetched without fetching
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Validate the suppliers file and list its suppliers
    Suppliers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pricesync_core::load_app_config()?;
    let default_level = if config.debug {
        "debug".to_owned()
    } else {
        config.log_level.clone()
    };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(app = %config.app_name, env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Fetch {
            supplier,
            output_dir,
            dry_run,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let cancel = CancellationToken::new();
            let deadline = config.batch_deadline_secs.map(Duration::from_secs);
            let watcher = tokio::spawn(cancel_on_shutdown(cancel.clone(), deadline));

            let result = fetch::run_fetch(
                &config,
                supplier.as_deref(),
                &output_dir,
                dry_run,
                &cancel,
            )
            .await;

            watcher.abort();
            result?;
        }
        Commands::Suppliers => fetch::run_list_suppliers(&config)?,
    }

    Ok(())
}

/// Cancels `cancel` on Ctrl-C, SIGTERM, or once `deadline` elapses.
async fn cancel_on_shutdown(cancel: CancellationToken, deadline: Option<Duration>) {
    let deadline = async {
        match deadline {
            Some(deadline) => tokio::time::sleep(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        () = shutdown_signal() => {
            tracing::warn!("received shutdown signal, cancelling in-flight fetches");
        }
        () = deadline => {
            tracing::warn!("batch deadline elapsed, cancelling in-flight fetches");
        }
    }
    cancel.cancel();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
