/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! fixbridge binary entry point.

use anyhow::{Context, Result};
use clap::Parser;
use fixbridge::cli::Cli;
use fixbridge::logging::init_logging;
use fixbridge_server::Listener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let env = |name: &str| std::env::var(name).ok();
    let config = cli.load_config(env).map_err(|e| {
        error!(error = %format!("{e:#}"), "failed to load config");
        e
    })?;

    let endpoint = config.endpoint()?;
    info!(
        connector = %config.connector,
        endpoint = %endpoint,
        venue = %format!("{}:{}", config.fix.host, config.fix.port),
        "starting fixbridge"
    );

    let listener = Listener::bind(&endpoint)
        .await
        .with_context(|| format!("cannot create command channel at {endpoint}"))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    fixbridge::app::serve(&config, listener, shutdown, env).await
}

async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(terminate) => terminate,
            Err(e) => {
                error!(error = %e, "cannot install SIGTERM handler");
                wait_for_ctrl_c(shutdown).await;
                return;
            }
        };
        tokio::select! {
            () = shutdown.cancelled() => return,
            Ok(()) = tokio::signal::ctrl_c() => info!("ctrl-c received"),
            Some(()) = terminate.recv() => info!("SIGTERM received"),
        }
        shutdown.cancel();
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c(shutdown).await;
}

async fn wait_for_ctrl_c(shutdown: CancellationToken) {
    tokio::select! {
        () = shutdown.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "cannot listen for ctrl-c");
                return;
            }
            info!("ctrl-c received");
            shutdown.cancel();
        }
    }
}
