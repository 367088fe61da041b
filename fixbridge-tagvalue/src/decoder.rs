/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Zero-copy FIX field lookup.
//!
//! Inbound messages are small and the bridge reads only a handful of tags
//! from each, so fields are located on demand rather than parsed into a
//! map. Values are returned as slices of the original buffer.

use fixbridge_core::field::FieldRef;
use memchr::{memchr, memmem};
use smallvec::SmallVec;

use crate::encoder::SOH;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Sequential field reader over a message buffer.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given input buffer.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Parses the next field from the buffer.
    ///
    /// # Returns
    /// The next field, or `None` if the buffer is exhausted or the next
    /// field is malformed.
    #[inline]
    pub fn next_field(&mut self) -> Option<FieldRef<'a>> {
        if self.offset >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.offset..];
        let eq_pos = memchr(EQUALS, remaining)?;
        let tag = parse_tag(&remaining[..eq_pos])?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..])?;
        let value = &remaining[value_start..value_start + soh_pos];

        self.offset += value_start + soh_pos + 1;

        Some(FieldRef::new(tag, value))
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = FieldRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_field()
    }
}

/// Returns the value of the first occurrence of `tag` in `raw`.
///
/// The tag matches only at the start of the buffer or directly after a
/// SOH, so `35=` never matches inside `135=`. A value with no terminating
/// SOH, or one that is not valid UTF-8, yields `None`.
///
/// # Example
/// ```
/// use fixbridge_tagvalue::decode_field;
///
/// let raw = b"8=FIX.4.2\x0135=A\x01108=30\x01";
/// assert_eq!(decode_field(raw, 35), Some("A"));
/// assert_eq!(decode_field(raw, 8), Some("FIX.4.2"));
/// assert_eq!(decode_field(raw, 58), None);
/// ```
#[must_use]
pub fn decode_field(raw: &[u8], tag: u32) -> Option<&str> {
    let mut tag_buf = itoa::Buffer::new();
    let tag_str = tag_buf.format(tag).as_bytes();

    let value_start = if raw.starts_with(tag_str) && raw.get(tag_str.len()) == Some(&EQUALS) {
        tag_str.len() + 1
    } else {
        let mut needle = Vec::with_capacity(tag_str.len() + 2);
        needle.push(SOH);
        needle.extend_from_slice(tag_str);
        needle.push(EQUALS);
        memmem::find(raw, &needle)? + needle.len()
    };

    let rest = &raw[value_start..];
    let end = memchr(SOH, rest)?;
    std::str::from_utf8(&rest[..end]).ok()
}

/// Splits a message into its fields, stopping at the first malformed one.
#[must_use]
pub fn decode_fields(raw: &[u8]) -> SmallVec<[FieldRef<'_>; 32]> {
    Decoder::new(raw).collect()
}

#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    Some(result)
}
