/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! FIX 4.2 session engine.
//!
//! [`FixConnector`] owns one venue transport, the outbound sequence counter
//! and the session state. Every wait on the venue carries a deadline, and
//! every TestRequest seen while reading is answered with a Heartbeat before
//! the read continues. Between commands the same upkeep runs through
//! [`Connector::wait_venue`], which also reports when a Heartbeat is due
//! after HeartBtInt of outbound silence.

use crate::connector::{Connector, VenueWork};
use crate::order::OrderRequest;
use async_trait::async_trait;
use fixbridge_core::error::{ConnectorError, Result};
use fixbridge_core::message::OutboundMsgType;
use fixbridge_core::tags;
use fixbridge_core::types::{SeqNum, Timestamp};
use fixbridge_session::{
    Inbound, SequenceManager, SessionConfig, SessionEvent, SessionState, generate_cl_ord_id,
    generate_test_req_id,
};
use fixbridge_tagvalue::encode_message;
use fixbridge_transport::{FixStream, TlsStream, connect_tls};
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

/// Opens the byte transport to the venue.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Stream type produced by this dialer.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Connects to the venue described by `config`.
    async fn dial(&self, config: &SessionConfig) -> Result<Self::Stream>;
}

/// Production dialer: TCP plus TLS 1.2 or newer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TlsDialer;

#[async_trait]
impl Dialer for TlsDialer {
    type Stream = TlsStream;

    async fn dial(&self, config: &SessionConfig) -> Result<TlsStream> {
        connect_tls(&config.host, config.port, config.connect_timeout).await
    }
}

/// Connector speaking FIX 4.2 to the venue.
pub struct FixConnector<D: Dialer = TlsDialer> {
    config: SessionConfig,
    dialer: D,
    state: SessionState,
    seq: SequenceManager,
    stream: Option<FixStream<D::Stream>>,
    last_sent: Instant,
}

impl FixConnector<TlsDialer> {
    /// Creates a connector that dials the venue over TLS.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_dialer(config, TlsDialer)
    }
}

impl<D: Dialer> FixConnector<D> {
    /// Creates a connector with a custom dialer.
    #[must_use]
    pub fn with_dialer(config: SessionConfig, dialer: D) -> Self {
        Self {
            config,
            dialer,
            state: SessionState::Disconnected,
            seq: SequenceManager::new(),
            stream: None,
            last_sent: Instant::now(),
        }
    }

    /// Returns the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the sequence number the next outbound message will carry.
    #[must_use]
    pub fn next_seq(&self) -> SeqNum {
        self.seq.next_sender_seq()
    }

    fn advance(&mut self, event: SessionEvent) -> Result<()> {
        self.state = self.state.transition(event)?;
        Ok(())
    }

    /// Drops the transport and returns to `Disconnected`.
    fn teardown(&mut self) {
        if self.stream.take().is_some() {
            debug!(state = %self.state, "transport dropped");
        }
        self.state = self
            .state
            .transition(SessionEvent::Failed)
            .unwrap_or_default();
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state.is_connected() && self.stream.is_some() {
            Ok(())
        } else {
            Err(ConnectorError::NotConnected)
        }
    }

    /// Maps a venue Logout or Reject to its error. A Logout also ends the
    /// session.
    fn venue_error(&mut self, inbound: &Inbound) -> Option<ConnectorError> {
        let err = inbound.protocol_error()?;
        warn!(error = %err, "venue refused request");
        if matches!(inbound, Inbound::Logout { .. }) {
            self.teardown();
        }
        Some(err)
    }

    async fn send(&mut self, msg_type: OutboundMsgType, fields: &[(u32, &str)]) -> Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectorError::NotConnected);
        };
        let seq = self.seq.allocate_sender_seq();
        let msg = encode_message(
            &self.config.header(),
            msg_type,
            seq,
            &Timestamp::now(),
            fields,
        );
        debug!(msg_type = %msg_type, seq = seq.value(), "fix >>");

        if let Err(e) = stream.send(&msg).await {
            warn!(error = %e, "send failed, closing session");
            self.teardown();
            return Err(e.into());
        }
        self.last_sent = Instant::now();
        Ok(())
    }

    /// Reads the next message, or `None` once `deadline` passes.
    async fn recv_until(&mut self, deadline: Instant) -> Result<Option<Inbound>> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectorError::NotConnected);
        };
        match timeout_at(deadline, stream.recv()).await {
            Err(_) => Ok(None),
            Ok(Ok(frame)) => {
                let inbound = Inbound::classify(&frame);
                debug!(msg_type = %inbound.msg_type(), "fix <<");
                Ok(Some(inbound))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "receive failed, closing session");
                self.teardown();
                Err(e.into())
            }
        }
    }

    async fn answer_test_request(&mut self, test_req_id: &str) -> Result<()> {
        self.send(OutboundMsgType::Heartbeat, &[(tags::TEST_REQ_ID, test_req_id)])
            .await?;
        debug!(test_req_id, "answered TestRequest");
        Ok(())
    }

    async fn logon(&mut self) -> Result<String> {
        self.config.validate_credentials()?;
        self.advance(SessionEvent::Dial)?;
        info!(host = %self.config.host, port = self.config.port, "connecting to venue");

        let started = Instant::now();
        let deadline = started + self.config.logon_timeout;
        let dial_deadline = deadline.min(started + self.config.connect_timeout);
        let dialed = timeout_at(dial_deadline, self.dialer.dial(&self.config))
            .await
            .unwrap_or_else(|_| Err(ConnectorError::Timeout("venue connect".to_string())));
        let io = match dialed {
            Ok(io) => io,
            Err(e) => {
                warn!(error = %e, "venue connect failed");
                self.teardown();
                return Err(e);
            }
        };
        self.stream = Some(FixStream::new(io));
        self.seq.reset();

        let heart_bt_int = self.config.heartbeat_interval_secs().to_string();
        let username = self.config.username.clone();
        let password = self.config.password.clone();
        let license_key = self.config.license_key.clone();
        let mut fields = vec![
            (tags::ENCRYPT_METHOD, "0"),
            (tags::HEART_BT_INT, heart_bt_int.as_str()),
            (tags::USERNAME, username.as_str()),
            (tags::PASSWORD, password.expose()),
        ];
        if !license_key.is_empty() {
            fields.push((tags::RAW_DATA, license_key.expose()));
        }
        self.send(OutboundMsgType::Logon, &fields).await?;
        self.advance(SessionEvent::LogonSent)?;
        info!(user = %username, "logon sent");

        loop {
            let Some(inbound) = self.recv_until(deadline).await? else {
                warn!("logon timed out");
                self.teardown();
                return Err(ConnectorError::Timeout("Logon".to_string()));
            };
            match inbound {
                Inbound::Logon => {
                    self.advance(SessionEvent::LogonAccepted)?;
                    info!("logon accepted");
                    return Ok("connected".to_string());
                }
                Inbound::TestRequest { test_req_id } => {
                    self.answer_test_request(&test_req_id).await?;
                }
                Inbound::Heartbeat { .. } => {}
                other => {
                    if let Some(err) = other.protocol_error() {
                        warn!(error = %err, "logon refused");
                        self.teardown();
                        return Err(err);
                    }
                    debug!(msg_type = %other.msg_type(), "ignoring message while awaiting logon");
                }
            }
        }
    }
}

impl<D: Dialer> fmt::Debug for FixConnector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixConnector")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<D: Dialer> Connector for FixConnector<D> {
    fn name(&self) -> &'static str {
        "fix"
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    async fn connect(&mut self) -> Result<String> {
        if self.state.is_connected() {
            return Ok("already connected".to_string());
        }
        if self.state != SessionState::Disconnected {
            // An earlier attempt was abandoned midway.
            self.teardown();
        }
        self.logon().await
    }

    async fn ping(&mut self) -> Result<String> {
        self.ensure_connected()?;
        let test_req_id = generate_test_req_id();
        self.send(
            OutboundMsgType::TestRequest,
            &[(tags::TEST_REQ_ID, test_req_id.as_str())],
        )
        .await?;

        let deadline = Instant::now() + self.config.ping_timeout;
        let Some(reply) = self.recv_until(deadline).await? else {
            return Err(ConnectorError::Timeout("TestRequest".to_string()));
        };
        match reply {
            Inbound::Heartbeat { .. } => Ok("PONG".to_string()),
            Inbound::TestRequest { test_req_id } => {
                self.answer_test_request(&test_req_id).await?;
                Ok("PONG".to_string())
            }
            Inbound::Logout { .. } => Err(self
                .venue_error(&reply)
                .unwrap_or(ConnectorError::NotConnected)),
            other => Ok(format!("PONG (35={})", other.msg_type())),
        }
    }

    async fn place_order(&mut self, order: &OrderRequest) -> Result<String> {
        self.ensure_connected()?;
        let cl_ord_id = generate_cl_ord_id();
        let transact_time = Timestamp::now().format_secs();
        let quantity = order.quantity().to_string();
        let price = order.price().to_string();
        let side = order.side().as_char().to_string();
        let ord_type = order.ord_type().as_char().to_string();

        let mut fields = vec![
            (tags::CL_ORD_ID, cl_ord_id.as_str()),
            (tags::HANDL_INST, "1"),
            (tags::SYMBOL, order.symbol()),
            (tags::SIDE, side.as_str()),
            (tags::TRANSACT_TIME, transact_time.as_str()),
            (tags::ORDER_QTY, quantity.as_str()),
            (tags::ORD_TYPE, ord_type.as_str()),
        ];
        if order.ord_type().carries_price() {
            fields.push((tags::PRICE, price.as_str()));
        }
        self.send(OutboundMsgType::NewOrderSingle, &fields).await?;
        info!(
            cl_ord_id = %cl_ord_id,
            symbol = order.symbol(),
            side = %order.side(),
            qty = order.quantity(),
            ord_type = %order.ord_type(),
            "order sent"
        );

        let deadline = Instant::now() + self.config.ack_timeout;
        loop {
            let Some(inbound) = self.recv_until(deadline).await? else {
                debug!(cl_ord_id = %cl_ord_id, "no execution report yet");
                return Ok(cl_ord_id);
            };
            match inbound {
                Inbound::ExecutionReport {
                    cl_ord_id: reported,
                    order_id,
                    ord_status,
                    text,
                } => {
                    if reported.as_deref().is_some_and(|r| r != cl_ord_id) {
                        debug!(reported = ?reported, "execution report for another order");
                        continue;
                    }
                    if ord_status.as_deref() == Some(tags::ORD_STATUS_REJECTED) {
                        warn!(cl_ord_id = %cl_ord_id, reason = %text, "order rejected");
                        return Err(ConnectorError::OrderRejected { text });
                    }
                    return Ok(order_id.unwrap_or(cl_ord_id));
                }
                Inbound::TestRequest { test_req_id } => {
                    self.answer_test_request(&test_req_id).await?;
                }
                other => {
                    if let Some(err) = self.venue_error(&other) {
                        return Err(err);
                    }
                }
            }
        }
    }

    async fn cancel_orders(&mut self, symbol: &str, account: Option<&str>) -> Result<String> {
        self.ensure_connected()?;
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ConnectorError::Validation("symbol is required".to_string()));
        }
        let cancel_id = generate_cl_ord_id();
        let transact_time = Timestamp::now().format_secs();

        let mut fields = vec![
            (tags::ORIG_CL_ORD_ID, cancel_id.as_str()),
            (tags::CL_ORD_ID, cancel_id.as_str()),
        ];
        if let Some(account) = account.filter(|a| !a.is_empty()) {
            fields.push((tags::ACCOUNT, account));
        }
        fields.push((tags::SYMBOL, symbol));
        fields.push((tags::TRANSACT_TIME, transact_time.as_str()));

        self.send(OutboundMsgType::OrderCancelRequest, &fields).await?;
        info!(cancel_id = %cancel_id, symbol, "cancel request sent");
        Ok("cancel request sent".to_string())
    }

    async fn close(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        let was_connected = self.state.is_connected();
        self.state = self
            .state
            .transition(SessionEvent::Close)
            .unwrap_or_default();

        let logout_timeout = self.config.logout_timeout;
        if was_connected {
            match tokio::time::timeout(logout_timeout, self.send(OutboundMsgType::Logout, &[]))
                .await
            {
                Ok(Ok(())) => info!("logout sent"),
                Ok(Err(e)) => warn!(error = %e, "logout failed"),
                Err(_) => warn!("logout timed out"),
            }
        }
        if let Some(mut stream) = self.stream.take()
            && tokio::time::timeout(logout_timeout, stream.shutdown())
                .await
                .is_err()
        {
            debug!("transport shutdown timed out");
        }
        self.state = self
            .state
            .transition(SessionEvent::Closed)
            .unwrap_or_default();
        info!("session closed");
    }

    async fn wait_venue(&mut self) -> Result<VenueWork> {
        if self.ensure_connected().is_err() {
            return std::future::pending().await;
        }
        let heartbeat_due = self.last_sent + self.config.heartbeat_interval;
        Ok(match self.recv_until(heartbeat_due).await? {
            Some(inbound) => VenueWork::Received(inbound),
            None => VenueWork::HeartbeatDue,
        })
    }

    async fn service(&mut self, work: VenueWork) -> Result<()> {
        match work {
            VenueWork::HeartbeatDue => {
                self.send(OutboundMsgType::Heartbeat, &[]).await?;
                debug!("heartbeat sent");
            }
            VenueWork::Received(Inbound::TestRequest { test_req_id }) => {
                self.answer_test_request(&test_req_id).await?;
            }
            VenueWork::Received(Inbound::Heartbeat { .. }) => {}
            VenueWork::Received(other) => {
                if let Some(err) = self.venue_error(&other) {
                    return Err(err);
                }
                debug!(msg_type = %other.msg_type(), "ignoring unsolicited message");
            }
        }
        Ok(())
    }
}
