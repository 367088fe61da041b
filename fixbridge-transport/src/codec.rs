/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! A frame is complete once BodyLength (9) bytes of body and the 7-byte
//! `10=NNN<SOH>` trailer have arrived. BeginString, BodyLength and CheckSum
//! are validated before a frame is handed out.

use bytes::{BufMut, BytesMut};
use fixbridge_core::error::{ConnectorError, DecodeError};
use fixbridge_tagvalue::checksum::{TRAILER_LEN, verify_checksum};
use memchr::memchr;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Largest frame accepted from the venue.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Errors that can occur during codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The byte stream does not hold a well-formed FIX frame.
    #[error(transparent)]
    Frame(#[from] DecodeError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<CodecError> for ConnectorError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Frame(e) => Self::Decode(e),
            CodecError::Io(e) => Self::Transport(e),
        }
    }
}

/// SOH delimiter.
const SOH: u8 = 0x01;

/// Most digits accepted in a BodyLength (9) value.
const MAX_BODY_LENGTH_DIGITS: usize = 10;

/// Tokio codec for FIX message framing.
#[derive(Debug, Clone)]
pub struct FixCodec {
    /// Maximum message size in bytes.
    max_message_size: usize,
    /// Whether to validate checksums.
    validate_checksum: bool,
}

impl FixCodec {
    /// Creates a new codec with a 64 KiB frame limit and checksum validation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            validate_checksum: true,
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets whether to validate checksums.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() >= 2 && &src[0..2] != b"8=" {
            return Err(DecodeError::InvalidBeginString.into());
        }

        let Some(first_soh) = memchr(SOH, src) else {
            if src.len() > self.max_message_size {
                return Err(DecodeError::MessageTooLarge {
                    size: src.len(),
                    max_size: self.max_message_size,
                }
                .into());
            }
            return Ok(None);
        };

        let body_len_start = first_soh + 1;
        if src.len() < body_len_start + 2 {
            return Ok(None);
        }
        if &src[body_len_start..body_len_start + 2] != b"9=" {
            return Err(DecodeError::MissingBodyLength.into());
        }

        let Some(pos) = memchr(SOH, &src[body_len_start..]) else {
            if src.len() - body_len_start > 2 + MAX_BODY_LENGTH_DIGITS {
                return Err(DecodeError::InvalidBodyLength.into());
            }
            return Ok(None);
        };
        let body_len_soh = body_len_start + pos;

        let digits = &src[body_len_start + 2..body_len_soh];
        if digits.is_empty()
            || digits.len() > MAX_BODY_LENGTH_DIGITS
            || !digits.iter().all(u8::is_ascii_digit)
        {
            return Err(DecodeError::InvalidBodyLength.into());
        }
        let body_length = digits
            .iter()
            .try_fold(0usize, |acc, d| {
                acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
            })
            .ok_or(DecodeError::InvalidBodyLength)?;

        // BodyLength counts from after 9=XXX| to before 10=
        let total_length = (body_len_soh + 1)
            .checked_add(body_length)
            .and_then(|n| n.checked_add(TRAILER_LEN))
            .ok_or(DecodeError::InvalidBodyLength)?;

        if total_length > self.max_message_size {
            return Err(DecodeError::MessageTooLarge {
                size: total_length,
                max_size: self.max_message_size,
            }
            .into());
        }

        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        let frame = &src[..total_length];
        if self.validate_checksum {
            verify_checksum(frame).map_err(|e| match e {
                DecodeError::Incomplete => DecodeError::InvalidBodyLength,
                other => other,
            })?;
        } else if &frame[total_length - TRAILER_LEN..total_length - 4] != b"10=" {
            return Err(DecodeError::InvalidBodyLength.into());
        }

        Ok(Some(src.split_to(total_length)))
    }
}

impl Encoder<&[u8]> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for FixCodec {
    type Error = CodecError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixbridge_tagvalue::calculate_checksum;

    fn make_fix_message(body: &str) -> Vec<u8> {
        let header = format!("8=FIX.4.2\x019={}\x01", body.len());
        let without_checksum = format!("{header}{body}");
        let checksum = calculate_checksum(without_checksum.as_bytes());
        format!("{without_checksum}10={checksum:03}\x01").into_bytes()
    }

    #[test]
    fn test_codec_decode_complete_message() {
        let mut codec = FixCodec::new();
        let msg = make_fix_message("35=0\x01");
        let mut buf = BytesMut::from(&msg[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], &msg[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_decode_incomplete() {
        let mut codec = FixCodec::new();
        let msg = make_fix_message("35=0\x01");

        for cut in [1, 5, 12, msg.len() - 1] {
            let mut buf = BytesMut::from(&msg[..cut]);
            assert!(codec.decode(&mut buf).unwrap().is_none(), "cut at {cut}");
        }
    }

    #[test]
    fn test_codec_decode_two_frames_in_one_read() {
        let mut codec = FixCodec::new();
        let first = make_fix_message("35=0\x01");
        let second = make_fix_message("35=1\x01112=T1\x01");
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&first);
        buf.extend_from_slice(&second);

        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &first[..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &second[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_codec_decode_invalid_begin_string() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"9=FIX.4.2\x019=5\x0135=0\x0110=000\x01"[..]);

        let result = codec.decode(&mut buf);
        assert_eq!(
            result,
            Err(CodecError::Frame(DecodeError::InvalidBeginString))
        );
    }

    #[test]
    fn test_codec_decode_missing_body_length() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x0135=0\x0110=000\x01"[..]);
        assert_eq!(
            codec.decode(&mut buf),
            Err(CodecError::Frame(DecodeError::MissingBodyLength))
        );
    }

    #[test]
    fn test_codec_decode_checksum_mismatch() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=5\x0135=0\x0110=000\x01"[..]);

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(CodecError::Frame(DecodeError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_codec_decode_wrong_body_length() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=3\x0135=0\x0110=000\x01"[..]);
        assert_eq!(
            codec.decode(&mut buf),
            Err(CodecError::Frame(DecodeError::InvalidBodyLength))
        );
    }

    #[test]
    fn test_codec_decode_no_checksum_validation() {
        let mut codec = FixCodec::new().with_checksum_validation(false);
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=5\x0135=0\x0110=000\x01"[..]);

        assert!(codec.decode(&mut buf).unwrap().is_some());
    }

    #[test]
    fn test_codec_rejects_oversized_frame() {
        let mut codec = FixCodec::new().with_max_message_size(64);
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=1000\x0135=0\x01"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::Frame(DecodeError::MessageTooLarge { max_size: 64, .. }))
        ));
    }

    #[test]
    fn test_codec_rejects_overlong_body_length() {
        for validate in [true, false] {
            let mut codec = FixCodec::new().with_checksum_validation(validate);
            let mut buf = BytesMut::from(
                &b"8=FIX.4.2\x019=18446744073709551615\x0135=0\x0110=000\x01"[..],
            );
            assert_eq!(
                codec.decode(&mut buf),
                Err(CodecError::Frame(DecodeError::InvalidBodyLength))
            );
        }
    }

    #[test]
    fn test_codec_rejects_non_digit_body_length() {
        let mut codec = FixCodec::new();
        for raw in [
            &b"8=FIX.4.2\x019=+5\x0135=0\x0110=000\x01"[..],
            &b"8=FIX.4.2\x019=\x0135=0\x0110=000\x01"[..],
        ] {
            let mut buf = BytesMut::from(raw);
            assert_eq!(
                codec.decode(&mut buf),
                Err(CodecError::Frame(DecodeError::InvalidBodyLength))
            );
        }
    }

    #[test]
    fn test_codec_large_body_length_is_too_large_not_a_panic() {
        let mut codec = FixCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.2\x019=9999999999\x0135=0\x01"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::Frame(DecodeError::MessageTooLarge { .. }))
        ));
    }

    #[test]
    fn test_codec_encode() {
        let mut codec = FixCodec::new();
        let msg = b"8=FIX.4.2\x019=5\x0135=0\x0110=161\x01";
        let mut dst = BytesMut::new();

        codec.encode(&msg[..], &mut dst).unwrap();
        assert_eq!(&dst[..], msg);
    }

    #[test]
    fn test_codec_error_maps_to_connector_error() {
        let err: ConnectorError = CodecError::Io("broken pipe".into()).into();
        assert_eq!(err.to_string(), "transport error: broken pipe");
        let err: ConnectorError = CodecError::Frame(DecodeError::InvalidBodyLength).into();
        assert!(err.is_fatal_to_session());
    }
}
