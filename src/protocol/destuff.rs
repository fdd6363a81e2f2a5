//! Frame de-stuffing and checksum verification.
//!
//! A wire frame looks like this, where the payload and both checksum
//! bytes may contain escape sequences:
//!
//! ```text
//! 5b | escaped payload | crc hi | crc lo | 5d
//! ```
//!
//! [decode] undoes the escaping and computes the CRC of the decoded
//! payload in the same pass. The result is rewritten with the
//! *calculated* checksum in place of the wire one:
//!
//! ```text
//! 5b | payload | calc hi | calc lo | 5d
//! ```

use super::crc::{self, Digest};
use super::escape::{self, Unescape};
use super::hex::HexDump;
use super::{MIN_FRAME_SIZE, TRAILER_LEN};
use crate::{Error, MessageReader, Result};

/// How far content extends in a reader's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Produced by [decode]. The last [TRAILER_LEN] bytes are checksum
    /// and terminator, never content.
    Decoded,
    /// Anything else. Content runs to the end of the buffer.
    Raw,
}

impl Mode {
    /// Offset one past the last content byte in a buffer of `len` bytes.
    pub fn content_end(self, len: usize) -> usize {
        match self {
            Self::Decoded => len.saturating_sub(TRAILER_LEN),
            Self::Raw => len,
        }
    }

    /// Content bytes left at `pos` in a buffer of `len` bytes.
    pub fn remaining(self, len: usize, pos: usize) -> usize {
        self.content_end(len).saturating_sub(pos)
    }
}

/// Calculated and wire checksums of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CheckCode {
    /// CRC over the decoded payload.
    pub calculated: u16,
    /// CRC carried by the frame.
    pub provided: u16,
    /// Whether the two agree.
    pub valid: bool,
}

impl CheckCode {
    /// State of a buffer that was never checksummed.
    pub const fn unchecked() -> Self {
        Self {
            calculated: crc::INITIAL,
            provided: 0,
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for CheckCode {
    fn default() -> Self {
        Self::unchecked()
    }
}

/// A decoded frame, ready to be read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoded<'a> {
    source: &'a [u8],
    buffer: Vec<u8>,
    mode: Mode,
    check: CheckCode,
}

impl<'a> Decoded<'a> {
    /// The wire frame this was decoded from.
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// The decoded bytes.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn check_code(&self) -> CheckCode {
        self.check
    }

    /// A reader positioned at the start marker.
    pub fn reader(&self) -> MessageReader<'_> {
        MessageReader::with_mode(&self.buffer, self.mode, self.check)
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// Pull the wire checksum off the end of a frame.
///
/// Returns the checksum and how many wire bytes it took up (2 to 4).
/// Each half is escaped independently, so the low byte is inspected
/// first and the high byte only looked at as an escape if the low one
/// was. `frame` must hold at least [MIN_FRAME_SIZE] bytes; an escaped low
/// byte needs one more, or this fails with [Error::FrameTooShort].
fn provided_checksum(frame: &[u8]) -> Result<(u16, usize)> {
    let len = frame.len();
    let (lo, lo_escaped) = escape::unescape(&frame[len - 3..len - 1]);
    if !lo_escaped {
        return Ok((u16::from_be_bytes([frame[len - 3], frame[len - 2]]), 2));
    }

    // an escaped low byte needs a high window in front of it
    let start = len.checked_sub(5).ok_or(Error::FrameTooShort { len })?;
    let window = &frame[start..len - 3];
    Ok(match escape::unescape(window) {
        (hi, true) => (u16::from_be_bytes([hi, lo]), 4),
        (_, false) => (u16::from_be_bytes([window[1], lo]), 3),
    })
}

/// Decode `frame` into `out`.
///
/// `out` must be at least as long as `frame`; de-stuffing never makes
/// data longer. Returns the number of bytes written and the checksums.
pub fn decode_into(frame: &[u8], out: &mut [u8]) -> Result<(usize, CheckCode)> {
    let len = frame.len();
    if len < MIN_FRAME_SIZE {
        return Err(Error::FrameTooShort { len });
    }
    if out.len() < len {
        return Err(Error::OutOfBounds {
            offset: 0,
            requested: len,
            len: out.len(),
        });
    }

    let (provided, checksum_len) = provided_checksum(frame)?;
    let payload_len = len
        .checked_sub(checksum_len + 2)
        .ok_or(Error::FrameTooShort { len })?;
    let payload = &frame[1..1 + payload_len];

    let mut digest = Digest::new();
    out[0] = frame[0];
    let mut offset = 1;
    for b in Unescape::new(payload) {
        out[offset] = b;
        digest.push(b);
        offset += 1;
    }

    let calculated = digest.finalize();
    let [hi, lo] = calculated.to_be_bytes();
    out[offset] = hi;
    out[offset + 1] = lo;
    out[offset + 2] = frame[len - 1];
    offset += TRAILER_LEN;

    let check = CheckCode {
        calculated,
        provided,
        valid: calculated == provided,
    };

    tracing::trace!(wire_len = len, decoded_len = offset, "decoded frame");
    if !check.valid {
        tracing::debug!(
            calculated = format_args!("{:#06x}", calculated),
            provided = format_args!("{:#06x}", provided),
            "frame checksum mismatch\n{}",
            HexDump(frame)
        );
    }

    Ok((offset, check))
}

/// Decode a standard checksummed frame.
///
/// A checksum mismatch is not an error; see [Decoded::check_code].
pub fn decode(frame: &[u8]) -> Result<Decoded<'_>> {
    let mut buffer = vec![0u8; frame.len()];
    let (len, check) = decode_into(frame, &mut buffer)?;
    buffer.truncate(len);
    Ok(Decoded {
        source: frame,
        buffer,
        mode: Mode::Decoded,
        check,
    })
}

/// Unescape every byte of `frame`, markers included, without any
/// checksum handling.
///
/// For fragments that aren't whole checksummed frames, like a header
/// on its own. The result reads in [Mode::Raw].
pub fn full_decode(frame: &[u8]) -> Decoded<'_> {
    let mut buffer = Vec::with_capacity(frame.len());
    buffer.extend(Unescape::new(frame));
    Decoded {
        source: frame,
        buffer,
        mode: Mode::Raw,
        check: CheckCode::unchecked(),
    }
}
