/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Framed FIX stream over any async byte transport.

use crate::codec::{CodecError, FixCodec};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Decoder;
use tracing::trace;

/// A byte stream paired with a [`FixCodec`] read buffer.
///
/// Works over TLS in production and over `tokio::io::duplex` in tests.
#[derive(Debug)]
pub struct FixStream<S> {
    io: S,
    codec: FixCodec,
    read_buf: BytesMut,
}

impl<S> FixStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected transport.
    pub fn new(io: S) -> Self {
        Self::with_codec(io, FixCodec::new())
    }

    /// Wraps a connected transport with a custom codec.
    pub fn with_codec(io: S, codec: FixCodec) -> Self {
        Self {
            io,
            codec,
            read_buf: BytesMut::with_capacity(4096),
        }
    }

    /// Writes one encoded message and flushes it.
    ///
    /// # Errors
    /// Returns `CodecError::Io` if the write fails.
    pub async fn send(&mut self, msg: &[u8]) -> Result<(), CodecError> {
        trace!(bytes = msg.len(), "fix send");
        self.io.write_all(msg).await?;
        self.io.flush().await?;
        Ok(())
    }

    /// Reads the next complete frame.
    ///
    /// # Errors
    /// Returns `CodecError::Frame` on a malformed frame and `CodecError::Io`
    /// when the peer closes the connection or the read fails.
    pub async fn recv(&mut self) -> Result<BytesMut, CodecError> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.read_buf)? {
                trace!(bytes = frame.len(), "fix recv");
                return Ok(frame);
            }
            let n = self.io.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(CodecError::Io("connection closed by peer".to_string()));
            }
        }
    }

    /// Shuts down the write side of the transport.
    ///
    /// # Errors
    /// Returns `CodecError::Io` if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<(), CodecError> {
        self.io.shutdown().await?;
        Ok(())
    }
}
