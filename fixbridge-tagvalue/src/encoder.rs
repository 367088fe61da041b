/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! FIX message encoder.
//!
//! [`Encoder`] appends body fields and finalizes a message by prepending
//! BeginString and BodyLength and appending CheckSum. [`encode_message`]
//! builds on it to produce a complete session message with the standard
//! header in its fixed order.

use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, BytesMut};
use fixbridge_core::message::OutboundMsgType;
use fixbridge_core::tags;
use fixbridge_core::types::{SeqNum, Timestamp};

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// FIX message encoder.
///
/// The encoder builds FIX messages by appending fields in tag=value format.
/// It handles BeginString, BodyLength, and Checksum fields automatically.
#[derive(Debug)]
pub struct Encoder {
    /// Buffer for the message body (between BodyLength and Checksum).
    body: BytesMut,
    /// The BeginString value (e.g., "FIX.4.2").
    begin_string: &'static str,
}

impl Encoder {
    /// Creates a new encoder with the specified BeginString.
    #[must_use]
    pub fn new(begin_string: &'static str) -> Self {
        Self {
            body: BytesMut::with_capacity(256),
            begin_string,
        }
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with an unsigned integer value.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        let s = buf.format(value);
        self.put_raw(tag, s.as_bytes());
    }

    /// Appends a field with raw bytes.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        let tag_str = tag_buf.format(tag);

        self.body.put_slice(tag_str.as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Finalizes the message and returns the complete encoded bytes.
    ///
    /// This method:
    /// 1. Prepends BeginString (tag 8) and BodyLength (tag 9)
    /// 2. Appends Checksum (tag 10)
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let body_len = self.body.len();
        let mut len_buf = itoa::Buffer::new();
        let len_str = len_buf.format(body_len);

        let mut message =
            BytesMut::with_capacity(self.begin_string.len() + len_str.len() + body_len + 16);
        message.put_slice(b"8=");
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(SOH);
        message.put_slice(b"9=");
        message.put_slice(len_str.as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum = calculate_checksum(&message);
        message.put_slice(b"10=");
        message.put_slice(&format_checksum(checksum));
        message.put_u8(SOH);

        message
    }

    /// Returns the current body length.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

/// Session identifiers stamped on every outbound message.
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    /// BeginString (8).
    pub begin_string: &'static str,
    /// SenderCompID (49).
    pub sender_comp_id: &'a str,
    /// TargetCompID (56).
    pub target_comp_id: &'a str,
    /// SenderSubID (50); omitted when empty.
    pub sender_sub_id: &'a str,
    /// TargetSubID (57); omitted when empty.
    pub target_sub_id: &'a str,
}

/// Encodes a complete outbound message.
///
/// Field order is 8, 9, 35, 49, 56, 50 (if set), 57 (if set), 34, 52, then
/// `fields` in caller order, then 10. Empty sub-identifiers are omitted
/// rather than sent as empty values.
///
/// # Arguments
/// * `header` - Session identifiers
/// * `msg_type` - Outbound message type
/// * `seq` - MsgSeqNum (34)
/// * `sending_time` - SendingTime (52), rendered with millisecond precision
/// * `fields` - Body fields, in order
#[must_use]
pub fn encode_message(
    header: &Header<'_>,
    msg_type: OutboundMsgType,
    seq: SeqNum,
    sending_time: &Timestamp,
    fields: &[(u32, &str)],
) -> BytesMut {
    let mut encoder = Encoder::new(header.begin_string);
    encoder.put_str(tags::MSG_TYPE, msg_type.as_str());
    encoder.put_str(tags::SENDER_COMP_ID, header.sender_comp_id);
    encoder.put_str(tags::TARGET_COMP_ID, header.target_comp_id);
    if !header.sender_sub_id.is_empty() {
        encoder.put_str(tags::SENDER_SUB_ID, header.sender_sub_id);
    }
    if !header.target_sub_id.is_empty() {
        encoder.put_str(tags::TARGET_SUB_ID, header.target_sub_id);
    }
    encoder.put_uint(tags::MSG_SEQ_NUM, seq.value());
    encoder.put_str(tags::SENDING_TIME, &sending_time.format_millis());
    for (tag, value) in fields {
        encoder.put_str(*tag, value);
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::verify_checksum;
    use crate::decoder::{decode_field, decode_fields};

    const HEADER: Header<'static> = Header {
        begin_string: "FIX.4.2",
        sender_comp_id: "SENDER",
        target_comp_id: "CTS",
        sender_sub_id: "",
        target_sub_id: "T4FIX",
    };

    fn sample(fields: &[(u32, &str)]) -> BytesMut {
        encode_message(
            &HEADER,
            OutboundMsgType::Logon,
            SeqNum::new(1),
            &Timestamp::from_millis(1_700_000_000_123),
            fields,
        )
    }

    #[test]
    fn test_encoder_basic() {
        let mut encoder = Encoder::new("FIX.4.2");
        encoder.put_str(35, "0");

        let message = encoder.finish();
        assert_eq!(&message[..], b"8=FIX.4.2\x019=5\x0135=0\x0110=161\x01");
    }

    #[test]
    fn test_encoder_str_and_uint() {
        let mut encoder = Encoder::new("FIX.4.2");
        encoder.put_str(54, "1");
        encoder.put_uint(34, 12);
        assert_eq!(encoder.body_len(), "54=1\x0134=12\x01".len());

        let msg_str = String::from_utf8_lossy(&encoder.finish()).into_owned();
        assert!(msg_str.contains("\x0154=1\x0134=12\x01"));
    }

    #[test]
    fn test_header_field_order() {
        let msg = sample(&[(98, "0"), (108, "30")]);
        let order: Vec<u32> = decode_fields(&msg).iter().map(|f| f.tag).collect();
        assert_eq!(order, vec![8, 9, 35, 49, 56, 57, 34, 52, 98, 108, 10]);
    }

    #[test]
    fn test_empty_sub_ids_are_omitted() {
        let header = Header {
            target_sub_id: "",
            ..HEADER
        };
        let msg = encode_message(
            &header,
            OutboundMsgType::Heartbeat,
            SeqNum::new(3),
            &Timestamp::from_millis(0),
            &[],
        );
        assert_eq!(decode_field(&msg, 50), None);
        assert_eq!(decode_field(&msg, 57), None);
        assert!(!msg.windows(4).any(|w| w == b"\x0157="));
    }

    #[test]
    fn test_sending_time_and_seq_rendering() {
        let msg = encode_message(
            &HEADER,
            OutboundMsgType::TestRequest,
            SeqNum::new(107),
            &Timestamp::from_millis(1_700_000_000_123),
            &[(112, "PING")],
        );
        assert_eq!(decode_field(&msg, 34), Some("107"));
        assert_eq!(decode_field(&msg, 52), Some("20231114-22:13:20.123"));
        assert_eq!(decode_field(&msg, 35), Some("1"));
    }

    #[test]
    fn test_body_length_matches_body_bytes() {
        let msg = sample(&[(553, "user"), (554, "pw"), (96, "licence-key")]);
        let declared: usize = decode_field(&msg, 9).unwrap().parse().unwrap();

        let body_start = msg.windows(4).position(|w| w == b"\x0135=").unwrap() + 1;
        let body_end = msg.len() - 7;
        assert_eq!(declared, body_end - body_start);
    }

    #[test]
    fn test_checksum_is_valid_and_three_digits() {
        for seq in 1..50u64 {
            let msg = encode_message(
                &HEADER,
                OutboundMsgType::NewOrderSingle,
                SeqNum::new(seq),
                &Timestamp::from_millis(seq as i64 * 997),
                &[(11, "CL1"), (55, "AAPL")],
            );
            assert_eq!(verify_checksum(&msg), Ok(()));
            assert_eq!(decode_field(&msg, 10).unwrap().len(), 3);
        }
    }
}
