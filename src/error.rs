/// Errors that abort decoding of the current frame.
///
/// Checksum mismatches and malformed date fields are *not* errors;
/// they are reported through [crate::protocol::destuff::CheckCode] and
/// the epoch fallback respectively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The frame cannot hold start, checksum and terminator.
    #[error("frame too short to decode ({len} bytes)")]
    FrameTooShort { len: usize },

    /// A read, skip, seek or slice went past the end of the buffer.
    #[error("read of {requested} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        len: usize,
    },

    /// The big number field is wider than a u64.
    #[error("big number field of {len} bytes is wider than 8 bytes")]
    BigNumberTooWide { len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
