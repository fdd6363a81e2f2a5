use chrono::NaiveDateTime;

/// Frame start marker.
pub const BEGIN_FLAG: u8 = 0x5b;
/// Frame terminator.
pub const END_FLAG: u8 = 0x5d;

/// Bytes after the content of a decoded frame: 2 checksum + terminator.
pub const TRAILER_LEN: usize = 3;

/// Start marker, an unescaped checksum and the terminator. A frame whose
/// low checksum byte is escaped needs one more byte.
pub const MIN_FRAME_SIZE: usize = 4;

/// Two-digit years in date fields are offset from this year.
pub const DATE_LIMIT_YEAR: i32 = 2000;

/// Hours added to UTC timestamps (Beijing time).
pub const UTC_OFFSET_HOURS: i64 = 8;

/// The protocol epoch, `1970-01-01 00:00:00`.
///
/// UTC timestamps count from here, and invalid date fields decode to it.
pub fn utc_base_time() -> NaiveDateTime {
    NaiveDateTime::default()
}

pub mod crc;

pub mod datetime;
pub use datetime::DigitBase;

pub mod destuff;
pub use destuff::{decode, full_decode, CheckCode, Decoded, Mode};

pub mod escape;

pub mod hex;

pub mod text;
