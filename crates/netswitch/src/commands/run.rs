//! Daemon mode.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let switch = super::build_switch(global, cfg).await?;

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    switch.run(cancel).await?;
    Ok(())
}

/// Cancel on ctrl-c or SIGTERM. The in-flight pass finishes first.
async fn shutdown_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("ctrl-c received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
    cancel.cancel();
}
