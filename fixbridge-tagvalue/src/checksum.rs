/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The FIX checksum is the sum of all bytes preceding the `10=` field,
//! modulo 256, rendered as exactly three zero-padded decimal digits.

use fixbridge_core::error::DecodeError;

/// Length of the trailer `10=NNN<SOH>`.
pub const TRAILER_LEN: usize = 7;

/// Calculates the FIX checksum for the given data.
///
/// # Arguments
/// * `data` - The message bytes to checksum (excluding the 10=NNN field)
///
/// # Example
/// ```
/// use fixbridge_tagvalue::calculate_checksum;
///
/// assert_eq!(calculate_checksum(b"ABC"), 198);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Formats a checksum value as a 3-digit zero-padded string.
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    [
        b'0' + (checksum / 100),
        b'0' + ((checksum / 10) % 10),
        b'0' + (checksum % 10),
    ]
}

/// Parses a 3-digit checksum string to a u8 value.
///
/// # Returns
/// `Some(checksum)` if valid, `None` otherwise.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value =
        u16::from(bytes[0] - b'0') * 100 + u16::from(bytes[1] - b'0') * 10 + u16::from(bytes[2] - b'0');
    u8::try_from(value).ok()
}

/// Verifies the trailing checksum of a complete message.
///
/// # Errors
/// Returns `DecodeError::Incomplete` if the message does not end with a
/// `10=NNN<SOH>` trailer, `DecodeError::InvalidChecksum` if the digits are
/// malformed, and `DecodeError::ChecksumMismatch` if the value is wrong.
pub fn verify_checksum(message: &[u8]) -> Result<(), DecodeError> {
    if message.len() < TRAILER_LEN {
        return Err(DecodeError::Incomplete);
    }
    let trailer_start = message.len() - TRAILER_LEN;
    let trailer = &message[trailer_start..];
    if &trailer[..3] != b"10=" || trailer[6] != 0x01 {
        return Err(DecodeError::Incomplete);
    }
    let declared = parse_checksum(&trailer[3..6]).ok_or(DecodeError::InvalidChecksum)?;
    let calculated = calculate_checksum(&message[..trailer_start]);
    if calculated != declared {
        return Err(DecodeError::ChecksumMismatch {
            calculated,
            declared,
        });
    }
    Ok(())
}
