/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Process wiring: connector, response log and command server.

use crate::config::BridgeConfig;
use anyhow::Result;
use fixbridge_engine::{Connector, ConnectorKind, build_connector};
use fixbridge_server::{CommandServer, Listener, ResponseLog};
use fixbridge_session::SessionConfig;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the bridge on an already bound listener until `shutdown` fires or a
/// client sends EXIT, then closes the venue session and removes the socket.
///
/// Secrets are read through `lookup`.
///
/// # Errors
/// Fails if the connector or session settings are invalid. Command failures
/// are reported to the client and never end the process.
pub async fn serve<F>(
    config: &BridgeConfig,
    listener: Listener,
    shutdown: CancellationToken,
    lookup: F,
) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let (kind, session, idle_timeout) = match prepare(config, lookup) {
        Ok(parts) => parts,
        Err(e) => {
            listener.cleanup();
            return Err(e);
        }
    };
    let connector = build_connector(kind, session);

    let (log, writer) = match config.response_log_path() {
        Some(path) => match ResponseLog::spawn(&path).await {
            Ok((log, writer)) => (log, Some(writer)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "response log unavailable, continuing without it");
                (ResponseLog::disabled(), None)
            }
        },
        None => (ResponseLog::disabled(), None),
    };

    let mut server = CommandServer::new(connector, log)
        .with_shutdown(shutdown)
        .with_idle_timeout(idle_timeout);
    server.run(&listener).await;

    let mut connector = server.into_connector();
    if connector.is_connected() {
        info!(connector = connector.name(), "closing venue session");
    }
    connector.close().await;
    listener.cleanup();

    if let Some(writer) = writer {
        if let Err(e) = writer.await {
            warn!(error = %e, "response log writer failed");
        }
    }
    info!("bridge stopped");
    Ok(())
}

fn prepare<F>(
    config: &BridgeConfig,
    lookup: F,
) -> Result<(ConnectorKind, SessionConfig, Duration)>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = config.connector_kind()?;
    let session = config.session_config(lookup)?;
    let idle_timeout = config.idle_timeout()?;
    Ok((kind, session, idle_timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixbridge_server::Endpoint;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    fn secrets(name: &str) -> Option<String> {
        match name {
            "FIX_PASSWORD" => Some("s3cret-pw".to_string()),
            _ => None,
        }
    }

    async fn exchange(client: &mut BufReader<TcpStream>, request: &str) -> String {
        client
            .get_mut()
            .write_all(format!("{request}\n").as_bytes())
            .await
            .unwrap();
        let mut line = String::new();
        client.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    #[tokio::test]
    async fn test_stub_bridge_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("responses.log");

        let mut config = BridgeConfig::default();
        config.fix.username = "trader1".to_string();
        config.response_log = log_path.display().to_string();

        let listener = Listener::bind(&"tcp:127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let Endpoint::Tcp(addr) = listener.local_endpoint().unwrap() else {
            panic!("expected tcp endpoint");
        };

        let client = async move {
            let mut client = BufReader::new(TcpStream::connect(addr).await.unwrap());
            assert_eq!(exchange(&mut client, "PING").await, "ERROR not connected");
            assert_eq!(
                exchange(&mut client, "CONNECT").await,
                "OK stub connected (host=uhfix-sim.t4login.com:10443 user=trader1)"
            );
            let placed = exchange(&mut client, "PLACE AAPL BUY 100 150.25 LIMIT").await;
            assert!(placed.starts_with("OK STUB-"), "{placed}");
            assert_eq!(
                exchange(&mut client, "PLACE AAPL BUY notanumber 150.25").await,
                "ERROR qty must be an integer"
            );
            assert_eq!(
                exchange(&mut client, "FOO").await,
                "ERROR unknown command 'FOO'"
            );
            assert_eq!(exchange(&mut client, "EXIT").await, "OK bye");
        };

        let (served, ()) = tokio::join!(
            serve(&config, listener, CancellationToken::new(), secrets),
            client
        );
        served.unwrap();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 6);
        assert!(!contents.contains("s3cret-pw"));
    }

    #[tokio::test]
    async fn test_external_cancellation_stops_bridge() {
        let mut config = BridgeConfig::default();
        config.response_log = String::new();
        let listener = Listener::bind(&"tcp:127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let token = CancellationToken::new();
        let cancel = {
            let token = token.clone();
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                token.cancel();
            }
        };

        let (served, ()) = tokio::join!(serve(&config, listener, token, |_| None), cancel);
        served.unwrap();
    }

    #[tokio::test]
    async fn test_retired_connector_fails_fast() {
        let mut config = BridgeConfig::default();
        config.connector = "real".to_string();
        let listener = Listener::bind(&"tcp:127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let err = serve(&config, listener, CancellationToken::new(), |_| None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("use 'fix'"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_idle_timeout_fails_fast_and_removes_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.sock");
        let mut config = BridgeConfig::default();
        config.idle_timeout_secs = 0;
        config.response_log = String::new();

        let listener = Listener::bind(&Endpoint::Unix(path.clone())).await.unwrap();
        let err = serve(&config, listener, CancellationToken::new(), |_| None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("idle_timeout_secs"));
        assert!(!path.exists());
    }
}
