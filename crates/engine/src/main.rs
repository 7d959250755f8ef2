//! XHaven Engine - Main entry point.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xhaven_engine::api::Repl;
use xhaven_engine::infrastructure::config::AppConfig;
use xhaven_engine::infrastructure::transport::PeerConnection;
use xhaven_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (also works when run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xhaven_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting XHaven Engine");

    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        parameters = ?config.parameters_path,
        characters_named = config.names.character_names.len(),
        monsters_named = config.names.monster_names.len(),
        stale_index = ?config.store_policy.stale_index,
        echo_reconciled = config.store_policy.echo_reconciled,
        "Configuration loaded"
    );

    let (app, outbound) = App::new(&config);
    let app = Arc::new(app);
    let cancel = CancellationToken::new();

    let transport = tokio::spawn(
        PeerConnection::new(config.transport(), app.store.clone(), outbound, cancel.clone()).run(),
    );

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
            signal_cancel.cancel();
        }
    });

    let repl = Repl::new(app.clone());
    if let Err(e) = repl
        .run(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            cancel.clone(),
        )
        .await
    {
        tracing::error!(error = %e, "Console failed");
    }

    cancel.cancel();
    if let Err(e) = transport.await {
        tracing::error!(error = %e, "Transport task failed");
    }

    tracing::info!(index = app.store.index(), "XHaven Engine stopped");

    // A pending stdin read cannot be cancelled; waiting for it would hang shutdown.
    std::process::exit(0)
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
    let _ = dotenvy::dotenv();
}
