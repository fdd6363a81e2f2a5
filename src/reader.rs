use chrono::{Local, NaiveDate, NaiveDateTime};
use nom::number::complete::{be_i32, be_u16, be_u32, be_u64, u8 as byte};
use nom::IResult;

use crate::protocol::datetime::{self, DigitBase};
use crate::protocol::destuff::{CheckCode, Mode};
use crate::protocol::{hex, text};
use crate::{Error, Result};

/// Widest field [MessageReader::read_big_number] accepts.
pub const BIG_NUMBER_MAX_LEN: usize = 8;

/// A cursor over a frame's bytes, reading protocol fields in order.
///
/// Consuming reads advance the cursor by exactly the bytes they use.
/// `read_virtual_*` reads look at the same bytes without moving it.
/// Slices returned borrow the underlying buffer, not the reader, so
/// they can be held across later reads.
///
/// Nothing here knows the message layout; reading fields out of
/// order just gives the wrong values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageReader<'a> {
    buffer: &'a [u8],
    pos: usize,
    mode: Mode,
    check: CheckCode,
}

fn slice_at(buffer: &[u8], offset: usize, count: usize) -> Result<&[u8]> {
    offset
        .checked_add(count)
        .filter(|end| *end <= buffer.len())
        .map(|end| &buffer[offset..end])
        .ok_or(Error::OutOfBounds {
            offset,
            requested: count,
            len: buffer.len(),
        })
}

impl<'a> MessageReader<'a> {
    /// Read a buffer as-is, in [Mode::Raw].
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_mode(buffer, Mode::Raw, CheckCode::unchecked())
    }

    /// Read a buffer produced by the de-stuffer.
    pub fn with_mode(buffer: &'a [u8], mode: Mode, check: CheckCode) -> Self {
        Self {
            buffer,
            pos: 0,
            mode,
            check,
        }
    }

    /// The whole buffer, regardless of position.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn check_code(&self) -> CheckCode {
        self.check
    }

    fn span(&mut self, count: usize) -> Result<&'a [u8]> {
        let span = slice_at(self.buffer, self.pos, count)?;
        self.pos += count;
        Ok(span)
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.span(N)?);
        Ok(out)
    }

    fn number<O>(
        &mut self,
        count: usize,
        parser: impl FnOnce(&'a [u8]) -> IResult<&'a [u8], O>,
    ) -> Result<O> {
        let offset = self.pos;
        let span = self.span(count)?;
        self.finish(offset, span, parser)
    }

    fn virtual_number<O>(
        &self,
        count: usize,
        parser: impl FnOnce(&'a [u8]) -> IResult<&'a [u8], O>,
    ) -> Result<O> {
        let span = self.read_virtual_array(count)?;
        self.finish(self.pos, span, parser)
    }

    fn finish<O>(
        &self,
        offset: usize,
        span: &'a [u8],
        parser: impl FnOnce(&'a [u8]) -> IResult<&'a [u8], O>,
    ) -> Result<O> {
        // spans are already bounds-checked, so this only fails on a
        // parser asking for more than its width
        parser(span)
            .map(|(_, value)| value)
            .map_err(|_| Error::OutOfBounds {
                offset,
                requested: span.len(),
                len: self.buffer.len(),
            })
    }

    /// Start marker byte. Not validated.
    pub fn read_start(&mut self) -> Result<u8> {
        self.read_u8()
    }

    /// Terminator byte. Not validated.
    pub fn read_end(&mut self) -> Result<u8> {
        self.read_u8()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.number(1, byte)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.number(2, be_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.number(4, be_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.number(4, be_i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.number(8, be_u64)
    }

    /// An unsigned big-endian number of `len` bytes, as decimal text.
    ///
    /// `len` may be at most [BIG_NUMBER_MAX_LEN]; wider fields fail
    /// without consuming anything.
    pub fn read_big_number(&mut self, len: usize) -> Result<String> {
        if len > BIG_NUMBER_MAX_LEN {
            return Err(Error::BigNumberTooWide { len });
        }
        let value = self
            .span(len)?
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | *b as u64);
        Ok(value.to_string())
    }

    /// The next `len` bytes.
    pub fn read_array(&mut self, len: usize) -> Result<&'a [u8]> {
        self.span(len)
    }

    /// `length` bytes starting at absolute offset `start`.
    ///
    /// The second argument is a length, not an end offset. The cursor
    /// doesn't move.
    pub fn read_array_at(&self, start: usize, length: usize) -> Result<&'a [u8]> {
        slice_at(self.buffer, start, length)
    }

    /// A GBK text field of `len` bytes, without trailing NUL padding.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        Ok(text::decode_gbk(self.span(len)?))
    }

    /// The next `len` bytes as lowercase hex.
    pub fn read_hex(&mut self, len: usize) -> Result<String> {
        Ok(hex::to_hex(self.span(len)?))
    }

    /// A packed decimal field of `len` digits (`len / 2` bytes).
    ///
    /// Leading zeros are dropped, so an all-zero field reads as `""`.
    pub fn read_bcd(&mut self, len: usize) -> Result<String> {
        let digits = hex::to_hex_upper(self.span(len / 2)?);
        Ok(digits.trim_start_matches('0').to_owned())
    }

    /// `YY MM DD hh mm ss`. Invalid values read as the epoch.
    pub fn read_date_time6(&mut self, base: DigitBase) -> Result<NaiveDateTime> {
        let bytes = self.fixed::<6>()?;
        Ok(datetime::or_epoch(
            "date_time6",
            &bytes,
            datetime::date_time6(bytes, base),
        ))
    }

    /// `hh mm ss` and milliseconds, on today's local date.
    pub fn read_date_time5(&mut self, base: DigitBase) -> Result<NaiveDateTime> {
        self.read_date_time5_on(Local::now().date_naive(), base)
    }

    /// `hh mm ss` and milliseconds, on a given date.
    pub fn read_date_time5_on(
        &mut self,
        date: NaiveDate,
        base: DigitBase,
    ) -> Result<NaiveDateTime> {
        let bytes = self.fixed::<5>()?;
        Ok(datetime::or_epoch(
            "date_time5",
            &bytes,
            datetime::date_time5(bytes, date, base),
        ))
    }

    /// `YYYY MM DD`. Invalid values read as the epoch.
    pub fn read_date_time4(&mut self, base: DigitBase) -> Result<NaiveDateTime> {
        let bytes = self.fixed::<4>()?;
        Ok(datetime::or_epoch(
            "date_time4",
            &bytes,
            datetime::date_time4(bytes, base),
        ))
    }

    /// 8-byte UTC seconds, shifted to UTC+8.
    pub fn read_utc_date_time(&mut self) -> Result<NaiveDateTime> {
        let bytes = self.fixed::<8>()?;
        Ok(datetime::or_epoch(
            "utc_date_time",
            &bytes,
            datetime::utc_date_time(bytes),
        ))
    }

    pub fn read_virtual_u8(&self) -> Result<u8> {
        self.virtual_number(1, byte)
    }

    pub fn read_virtual_u16(&self) -> Result<u16> {
        self.virtual_number(2, be_u16)
    }

    pub fn read_virtual_u32(&self) -> Result<u32> {
        self.virtual_number(4, be_u32)
    }

    pub fn read_virtual_u64(&self) -> Result<u64> {
        self.virtual_number(8, be_u64)
    }

    /// The next `count` bytes, without consuming them.
    pub fn read_virtual_array(&self, count: usize) -> Result<&'a [u8]> {
        slice_at(self.buffer, self.pos, count)
    }

    /// Content bytes left after the cursor.
    ///
    /// In [Mode::Decoded] the checksum and terminator don't count.
    pub fn read_current_remaining_length(&self) -> usize {
        self.mode.remaining(self.buffer.len(), self.pos)
    }

    /// All remaining content except the last `reserve` bytes.
    pub fn read_content(&mut self, reserve: usize) -> Result<&'a [u8]> {
        let remaining = self.read_current_remaining_length();
        if reserve > remaining {
            return Err(Error::OutOfBounds {
                offset: self.pos,
                requested: reserve,
                len: remaining,
            });
        }
        self.span(remaining - reserve)
    }

    /// All remaining content as GBK text.
    pub fn read_remaining_string_content(&mut self) -> Result<String> {
        Ok(text::decode_gbk(self.read_content(0)?))
    }

    /// Step over `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.span(count).map(|_| ())
    }

    /// Move the cursor to an absolute offset, forwards or back.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buffer.len() {
            return Err(Error::OutOfBounds {
                offset: pos,
                requested: 0,
                len: self.buffer.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }
}
