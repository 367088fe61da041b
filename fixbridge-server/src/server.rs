/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Command server: accept loop and per-connection request loop.
//!
//! Both loops also drive venue session upkeep between commands, so the
//! connector stays owned by a single task.

use crate::command::Command;
use crate::endpoint::{Accepted, Listener};
use crate::response_log::ResponseLog;
use bytes::BytesMut;
use fixbridge_core::error::ConnectorError;
use fixbridge_engine::{Connector, VenueWork};
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout_at};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default client idle window.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest request line accepted, in bytes.
pub const MAX_REQUEST_LEN: usize = 4 * 1024;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Why a client connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// The client closed its side.
    ClientClosed,
    /// No request arrived within the idle window.
    IdleTimeout,
    /// A request exceeded [`MAX_REQUEST_LEN`].
    RequestTooLong,
    /// EXIT or SHUTDOWN was processed.
    Stopped,
    /// The shutdown token fired.
    Cancelled,
}

/// One response line and whether serving should stop after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Response without the trailing newline.
    pub line: String,
    /// True after EXIT or SHUTDOWN.
    pub stop: bool,
}

impl Reply {
    fn ok(payload: impl fmt::Display) -> Self {
        Self {
            line: single_line(&format!("OK {payload}")),
            stop: false,
        }
    }

    fn error(err: impl fmt::Display) -> Self {
        Self {
            line: single_line(&format!("ERROR {err}")),
            stop: false,
        }
    }

    fn stop(payload: &str) -> Self {
        Self {
            line: format!("OK {payload}"),
            stop: true,
        }
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim_end().to_string()
}

/// Serves line-oriented requests against one connector, one client at a
/// time.
///
/// Requests on a connection are answered strictly in order; the connector
/// is owned here and never shared, so its sequence counter and transport
/// see one operation at a time.
pub struct CommandServer<C> {
    connector: C,
    log: ResponseLog,
    shutdown: CancellationToken,
    idle_timeout: Duration,
    max_request_len: usize,
    connections: u64,
}

impl<C: Connector> CommandServer<C> {
    /// Creates a server with default limits and its own shutdown token.
    pub fn new(connector: C, log: ResponseLog) -> Self {
        Self {
            connector,
            log,
            shutdown: CancellationToken::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_request_len: MAX_REQUEST_LEN,
            connections: 0,
        }
    }

    /// Uses `token` as the stop signal.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Sets the client idle window.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Token that stops the server when cancelled. EXIT cancels it too.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Client connections served so far.
    #[must_use]
    pub const fn connections(&self) -> u64 {
        self.connections
    }

    /// The connector.
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Consumes the server and returns the connector for shutdown.
    pub fn into_connector(self) -> C {
        self.connector
    }

    /// Parses and runs one request line.
    pub async fn execute(&mut self, request: &str) -> Reply {
        let command = match Command::parse(request) {
            Ok(command) => command,
            Err(e) => {
                debug!(request, error = %e, "request rejected");
                return Reply::error(e);
            }
        };

        let verb = command.verb();
        let result = match command {
            Command::Ping => self.connector.ping().await,
            Command::Connect => self.connector.connect().await,
            Command::Place(order) => self.connector.place_order(&order).await,
            Command::Cancel { symbol, account } => {
                self.connector
                    .cancel_orders(&symbol, account.as_deref())
                    .await
            }
            Command::Exit => return Reply::stop("bye"),
            Command::Shutdown => return Reply::stop("shutting down"),
        };

        match result {
            Ok(payload) => {
                info!(command = verb, connector = self.connector.name(), "command ok");
                Reply::ok(payload)
            }
            Err(e) => {
                warn!(command = verb, connector = self.connector.name(), error = %e, "command failed");
                Reply::error(e)
            }
        }
    }

    /// Handles venue upkeep reported while no command was running.
    async fn service_venue(&mut self, work: Result<VenueWork, ConnectorError>) {
        let shutdown = self.shutdown.clone();
        let result = match work {
            Ok(work) => tokio::select! {
                biased;
                () = shutdown.cancelled() => return,
                result = self.connector.service(work) => result,
            },
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(connector = self.connector.name(), error = %e, "venue session error");
        }
    }

    /// Serves one client until it disconnects, idles out, sends EXIT, or the
    /// shutdown token fires. A command still running when the token fires
    /// is abandoned without a reply.
    ///
    /// # Errors
    /// Returns an I/O error if reading from or writing to the client fails.
    pub async fn serve_connection<S>(&mut self, mut stream: S) -> io::Result<Disconnect>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let shutdown = self.shutdown.clone();
        let mut codec = LinesCodec::new_with_max_length(self.max_request_len);
        let mut buf = BytesMut::with_capacity(1024);
        let mut idle_deadline = Instant::now() + self.idle_timeout;

        loop {
            let read = tokio::select! {
                biased;
                () = shutdown.cancelled() => return Ok(Disconnect::Cancelled),
                read = timeout_at(idle_deadline, read_line(&mut stream, &mut codec, &mut buf)) => read,
                work = self.connector.wait_venue() => {
                    self.service_venue(work).await;
                    continue;
                }
            };
            idle_deadline = Instant::now() + self.idle_timeout;

            let line = match read {
                Err(_) => {
                    info!(idle = ?self.idle_timeout, "client idle, closing connection");
                    return Ok(Disconnect::IdleTimeout);
                }
                Ok(Ok(Some(line))) => line,
                Ok(Ok(None)) => return Ok(Disconnect::ClientClosed),
                Ok(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    warn!(limit = self.max_request_len, "request too long, closing connection");
                    write_reply(&mut stream, "ERROR request too long").await?;
                    return Ok(Disconnect::RequestTooLong);
                }
                Ok(Err(LinesCodecError::Io(e))) if e.kind() == io::ErrorKind::InvalidData => {
                    write_reply(&mut stream, "ERROR request is not valid UTF-8").await?;
                    continue;
                }
                Ok(Err(LinesCodecError::Io(e))) => return Err(e),
            };

            let request = line.trim();
            if request.is_empty() {
                continue;
            }

            let reply = tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!(request, "shutdown while a command was running");
                    return Ok(Disconnect::Cancelled);
                }
                reply = self.execute(request) => reply,
            };
            self.log.record(request, &reply.line);
            write_reply(&mut stream, &reply.line).await?;

            if reply.stop {
                info!(request, "stop requested by client");
                self.shutdown.cancel();
                let _ = stream.shutdown().await;
                return Ok(Disconnect::Stopped);
            }
        }
    }

    /// Accepts clients one at a time until the shutdown token fires or a
    /// client sends EXIT.
    pub async fn run(&mut self, listener: &Listener) {
        match listener.local_endpoint() {
            Ok(endpoint) => info!(endpoint = %endpoint, "command server listening"),
            Err(e) => warn!(error = %e, "command server listening on unknown endpoint"),
        }

        let shutdown = self.shutdown.clone();
        loop {
            let accepted = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
                work = self.connector.wait_venue() => {
                    self.service_venue(work).await;
                    continue;
                }
            };

            let served = match accepted {
                #[cfg(unix)]
                Ok(Accepted::Unix(stream)) => {
                    info!("client connected");
                    self.serve_connection(stream).await
                }
                Ok(Accepted::Tcp(stream, peer)) => {
                    info!(%peer, "client connected");
                    self.serve_connection(stream).await
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            self.connections += 1;
            match served {
                Ok(reason) => info!(?reason, "client disconnected"),
                Err(e) => warn!(error = %e, "client connection failed"),
            }
        }

        info!(connections = self.connections, "command server stopped");
    }
}

impl<C: Connector> fmt::Debug for CommandServer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandServer")
            .field("connector", &self.connector.name())
            .field("idle_timeout", &self.idle_timeout)
            .field("max_request_len", &self.max_request_len)
            .field("connections", &self.connections)
            .finish_non_exhaustive()
    }
}

async fn read_line<S>(
    stream: &mut S,
    codec: &mut LinesCodec,
    buf: &mut BytesMut,
) -> Result<Option<String>, LinesCodecError>
where
    S: AsyncRead + Unpin,
{
    loop {
        if let Some(line) = codec.decode(buf)? {
            return Ok(Some(line));
        }
        if stream.read_buf(buf).await? == 0 {
            return codec.decode_eof(buf);
        }
    }
}

async fn write_reply<S>(stream: &mut S, line: &str) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use async_trait::async_trait;
    use fixbridge_core::error::Result;
    use fixbridge_core::types::{Secret, Timestamp};
    use fixbridge_engine::{Dialer, FixConnector, OrderRequest};
    use fixbridge_session::SessionConfig;
    use fixbridge_tagvalue::{Encoder, decode_field};
    use fixbridge_transport::FixStream;
    use std::sync::Mutex;
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream, duplex};

    /// Connector that records calls and counts outbound messages.
    #[derive(Debug, Default)]
    struct RecordingConnector {
        connected: bool,
        sent: u64,
        calls: Vec<String>,
    }

    impl RecordingConnector {
        fn require_connected(&self) -> Result<()> {
            if self.connected {
                Ok(())
            } else {
                Err(ConnectorError::NotConnected)
            }
        }
    }

    #[async_trait]
    impl Connector for RecordingConnector {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self) -> Result<String> {
            self.calls.push("connect".to_string());
            self.connected = true;
            self.sent += 1;
            Ok("connected".to_string())
        }

        async fn ping(&mut self) -> Result<String> {
            self.calls.push("ping".to_string());
            self.require_connected()?;
            self.sent += 1;
            Ok("PONG".to_string())
        }

        async fn place_order(&mut self, order: &OrderRequest) -> Result<String> {
            self.calls.push(format!("place {}", order.symbol()));
            self.require_connected()?;
            if order.symbol() == "REJ" {
                return Err(ConnectorError::OrderRejected {
                    text: "bad symbol\nsee venue".to_string(),
                });
            }
            self.sent += 1;
            Ok(format!("ORD-{}", self.sent))
        }

        async fn cancel_orders(&mut self, symbol: &str, account: Option<&str>) -> Result<String> {
            self.calls
                .push(format!("cancel {symbol} {}", account.unwrap_or("-")));
            self.require_connected()?;
            self.sent += 1;
            Ok("cancel request sent".to_string())
        }

        async fn close(&mut self) {
            self.connected = false;
        }
    }

    fn server() -> CommandServer<RecordingConnector> {
        CommandServer::new(RecordingConnector::default(), ResponseLog::disabled())
    }

    async fn exchange<S>(client: &mut BufReader<S>, request: &str) -> String
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        client
            .get_mut()
            .write_all(format!("{request}\n").as_bytes())
            .await
            .unwrap();
        let mut line = String::new();
        client.read_line(&mut line).await.unwrap();
        assert!(line.ends_with('\n'));
        line.trim_end().to_string()
    }

    async fn read_eof<S: AsyncRead + Unpin>(client: &mut BufReader<S>) {
        let mut rest = String::new();
        assert_eq!(client.read_line(&mut rest).await.unwrap(), 0, "got {rest:?}");
    }

    #[tokio::test]
    async fn test_session_scenarios_over_duplex() {
        let mut server = server();
        let (server_io, client_io) = duplex(64 * 1024);

        let client = async move {
            let mut client = BufReader::new(client_io);
            assert_eq!(exchange(&mut client, "PING").await, "ERROR not connected");
            assert_eq!(exchange(&mut client, "CONNECT").await, "OK connected");

            let placed = exchange(&mut client, "PLACE AAPL BUY 100 150.25 LIMIT").await;
            assert!(placed.starts_with("OK "));
            assert!(placed.contains("ORD-"));

            assert_eq!(
                exchange(&mut client, "PLACE AAPL BUY notanumber 150.25").await,
                "ERROR qty must be an integer"
            );
            assert_eq!(
                exchange(&mut client, "FOO").await,
                "ERROR unknown command 'FOO'"
            );
            assert_eq!(exchange(&mut client, "ping").await, "OK PONG");
            assert_eq!(
                exchange(&mut client, "CANCEL AAPL ACC1").await,
                "OK cancel request sent"
            );
            assert_eq!(exchange(&mut client, "EXIT").await, "OK bye");
            read_eof(&mut client).await;
        };

        let (served, ()) = tokio::join!(server.serve_connection(server_io), client);
        assert_eq!(served.unwrap(), Disconnect::Stopped);
        assert!(server.shutdown_token().is_cancelled());

        let connector = server.connector();
        assert_eq!(
            connector.calls,
            vec![
                "ping",
                "connect",
                "place AAPL",
                "ping",
                "cancel AAPL ACC1"
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_quantity_sends_nothing() {
        let mut server = server();
        assert_eq!(server.execute("CONNECT").await.line, "OK connected");
        let sent = server.connector().sent;

        let reply = server.execute("PLACE AAPL BUY notanumber 150.25").await;
        assert_eq!(reply.line, "ERROR qty must be an integer");
        assert!(!reply.stop);
        assert_eq!(server.connector().sent, sent);
        assert_eq!(server.connector().calls, vec!["connect"]);
    }

    #[tokio::test]
    async fn test_error_text_is_kept_on_one_line() {
        let mut server = server();
        server.execute("CONNECT").await;
        let reply = server.execute("PLACE REJ SELL 1 2").await;
        assert_eq!(reply.line, "ERROR order rejected: bad symbol see venue");
    }

    #[tokio::test]
    async fn test_shutdown_alias() {
        let mut server = server();
        let reply = server.execute("shutdown").await;
        assert_eq!(reply.line, "OK shutting down");
        assert!(reply.stop);
    }

    #[tokio::test]
    async fn test_blank_lines_and_crlf_are_tolerated() {
        let mut server = server();
        let (server_io, client_io) = duplex(4096);

        let client = async move {
            let mut client = BufReader::new(client_io);
            client.get_mut().write_all(b"\n   \r\n").await.unwrap();
            assert_eq!(exchange(&mut client, "  CONNECT \r").await, "OK connected");
            drop(client);
        };

        let (served, ()) = tokio::join!(server.serve_connection(server_io), client);
        assert_eq!(served.unwrap(), Disconnect::ClientClosed);
        assert!(!server.shutdown_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_idle_client_is_closed_without_response() {
        let mut server = server().with_idle_timeout(Duration::from_millis(50));
        let (server_io, client_io) = duplex(4096);

        let client = async move {
            let mut client = BufReader::new(client_io);
            read_eof(&mut client).await;
        };

        let (served, ()) = tokio::join!(server.serve_connection(server_io), client);
        assert_eq!(served.unwrap(), Disconnect::IdleTimeout);
        assert!(server.connector().calls.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_request_closes_connection() {
        let mut server = server();
        let (server_io, client_io) = duplex(64 * 1024);

        let client = async move {
            let mut client = BufReader::new(client_io);
            let request = format!("PLACE {}\n", "A".repeat(MAX_REQUEST_LEN + 10));
            client.get_mut().write_all(request.as_bytes()).await.unwrap();
            let mut line = String::new();
            client.read_line(&mut line).await.unwrap();
            assert_eq!(line, "ERROR request too long\n");
            read_eof(&mut client).await;
        };

        let (served, ()) = tokio::join!(server.serve_connection(server_io), client);
        assert_eq!(served.unwrap(), Disconnect::RequestTooLong);
    }

    #[tokio::test]
    async fn test_cancellation_unblocks_idle_read() {
        let mut server = server();
        let token = server.shutdown_token();
        let (server_io, _client_io) = duplex(4096);

        let cancel = async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        };

        let (served, ()) = tokio::join!(server.serve_connection(server_io), cancel);
        assert_eq!(served.unwrap(), Disconnect::Cancelled);
    }

    #[tokio::test]
    async fn test_responses_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.log");
        let (log, writer) = ResponseLog::spawn(&path).await.unwrap();

        let mut server = CommandServer::new(RecordingConnector::default(), log);
        let (server_io, client_io) = duplex(4096);
        let client = async move {
            let mut client = BufReader::new(client_io);
            exchange(&mut client, "PING").await;
            exchange(&mut client, "EXIT").await;
        };
        let (served, ()) = tokio::join!(server.serve_connection(server_io), client);
        served.unwrap();
        drop(server);
        writer.await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("PING -> ERROR not connected"));
        assert!(lines[1].ends_with("EXIT -> OK bye"));
    }

    #[tokio::test]
    async fn test_accept_loop_over_tcp_stops_after_exit() {
        let endpoint: Endpoint = "tcp:127.0.0.1:0".parse().unwrap();
        let listener = Listener::bind(&endpoint).await.unwrap();
        let Endpoint::Tcp(addr) = listener.local_endpoint().unwrap() else {
            panic!("expected tcp endpoint");
        };
        let mut server = server();

        let clients = async move {
            let first = tokio::net::TcpStream::connect(addr).await.unwrap();
            let mut first = BufReader::new(first);
            assert_eq!(exchange(&mut first, "CONNECT").await, "OK connected");
            drop(first);

            let second = tokio::net::TcpStream::connect(addr).await.unwrap();
            let mut second = BufReader::new(second);
            let placed = exchange(&mut second, "PLACE AAPL BUY 100 150.25 LIMIT").await;
            assert!(placed.starts_with("OK ORD-"));
            assert_eq!(exchange(&mut second, "EXIT").await, "OK bye");
            read_eof(&mut second).await;
        };

        let ((), ()) = tokio::join!(server.run(&listener), clients);
        assert_eq!(server.connections(), 2);
        assert!(server.connector().is_connected());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_accept_loop_over_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.sock");
        let listener = Listener::bind(&Endpoint::Unix(path.clone())).await.unwrap();
        let mut server = server();

        let client = async move {
            let stream = tokio::net::UnixStream::connect(&path).await.unwrap();
            let mut client = BufReader::new(stream);
            assert_eq!(exchange(&mut client, "SHUTDOWN").await, "OK shutting down");
        };

        let ((), ()) = tokio::join!(server.run(&listener), client);
        assert_eq!(server.connections(), 1);
        listener.cleanup();
    }

    #[tokio::test]
    async fn test_cancelled_server_accepts_nothing() {
        let listener = Listener::bind(&"tcp:127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let mut server = server().with_shutdown(token);
        server.run(&listener).await;
        assert_eq!(server.connections(), 0);
    }

    struct DuplexDialer(Mutex<Option<DuplexStream>>);

    #[async_trait]
    impl Dialer for DuplexDialer {
        type Stream = DuplexStream;

        async fn dial(&self, _config: &SessionConfig) -> Result<DuplexStream> {
            self.0
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| ConnectorError::Transport("connection refused".to_string()))
        }
    }

    fn venue_message(seq: u64, msg_type: &str, fields: &[(u32, &str)]) -> Vec<u8> {
        let mut encoder = Encoder::new("FIX.4.2");
        encoder.put_str(35, msg_type);
        encoder.put_str(49, "CTS");
        encoder.put_str(56, "trader1");
        encoder.put_uint(34, seq);
        encoder.put_str(52, &Timestamp::now().format_millis());
        for (tag, value) in fields {
            encoder.put_str(*tag, value);
        }
        encoder.finish().to_vec()
    }

    fn fix_server(
        config: SessionConfig,
    ) -> (
        CommandServer<FixConnector<DuplexDialer>>,
        FixStream<DuplexStream>,
    ) {
        let (engine_io, venue_io) = duplex(16 * 1024);
        let connector =
            FixConnector::with_dialer(config, DuplexDialer(Mutex::new(Some(engine_io))));
        (
            CommandServer::new(connector, ResponseLog::disabled()),
            FixStream::new(venue_io),
        )
    }

    fn venue_config() -> SessionConfig {
        SessionConfig::default().with_credentials("trader1", Secret::new("pw"))
    }

    #[tokio::test]
    async fn test_idle_client_connection_answers_venue_test_request() {
        let (mut server, mut venue) = fix_server(venue_config());
        let (server_io, client_io) = duplex(4096);

        let script = async move {
            let mut client = BufReader::new(client_io);
            client.get_mut().write_all(b"CONNECT\n").await.unwrap();
            let logon = venue.recv().await.unwrap();
            assert_eq!(decode_field(&logon, 35), Some("A"));
            venue.send(&venue_message(1, "A", &[])).await.unwrap();
            let mut line = String::new();
            client.read_line(&mut line).await.unwrap();
            assert_eq!(line, "OK connected\n");

            venue
                .send(&venue_message(2, "1", &[(112, "IDLE-1")]))
                .await
                .unwrap();
            let heartbeat = tokio::time::timeout(Duration::from_secs(3), venue.recv())
                .await
                .expect("heartbeat while the client is idle")
                .unwrap();
            assert_eq!(decode_field(&heartbeat, 35), Some("0"));
            assert_eq!(decode_field(&heartbeat, 112), Some("IDLE-1"));

            assert_eq!(exchange(&mut client, "EXIT").await, "OK bye");
            venue
        };

        let (served, _venue) = tokio::join!(server.serve_connection(server_io), script);
        assert_eq!(served.unwrap(), Disconnect::Stopped);
        assert!(server.connector().is_connected());
    }

    #[tokio::test]
    async fn test_accept_loop_answers_venue_test_request_without_clients() {
        let (mut server, mut venue) = fix_server(venue_config());
        let (reply, ()) = tokio::join!(server.execute("CONNECT"), async {
            venue.recv().await.unwrap();
            venue.send(&venue_message(1, "A", &[])).await.unwrap();
        });
        assert_eq!(reply.line, "OK connected");

        let listener = Listener::bind(&"tcp:127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let token = server.shutdown_token();
        let venue_side = async move {
            venue
                .send(&venue_message(2, "1", &[(112, "NO-CLIENT")]))
                .await
                .unwrap();
            let heartbeat = tokio::time::timeout(Duration::from_secs(3), venue.recv())
                .await
                .expect("heartbeat with no client attached")
                .unwrap();
            token.cancel();
            heartbeat
        };

        let ((), heartbeat) = tokio::join!(server.run(&listener), venue_side);
        assert_eq!(decode_field(&heartbeat, 112), Some("NO-CLIENT"));
        assert_eq!(server.connections(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_running_command() {
        let config = venue_config().with_logon_timeout(Duration::from_secs(30));
        let (mut server, _venue) = fix_server(config);
        let token = server.shutdown_token();
        let (server_io, client_io) = duplex(4096);

        let client = async move {
            let mut client = BufReader::new(client_io);
            client.get_mut().write_all(b"CONNECT\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
            read_eof(&mut client).await;
        };

        let (served, ()) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(server.serve_connection(server_io), client)
        })
        .await
        .expect("shutdown must not wait for the logon deadline");
        assert_eq!(served.unwrap(), Disconnect::Cancelled);
        assert!(!server.connector().is_connected());
    }
}
