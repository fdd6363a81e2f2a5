//! Fixed-layout date and time fields.
//!
//! Every decoder here returns `None` for values that don't make a
//! calendar date; [or_epoch] turns that into the protocol epoch so one
//! bad field never aborts the rest of a frame.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use super::{utc_base_time, DATE_LIMIT_YEAR, UTC_OFFSET_HOURS};

/// How a single date byte holds its two-digit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitBase {
    /// Packed decimal: `0x15` is 15. Nibbles above 9 are invalid.
    #[default]
    Bcd,
    /// Plain binary: `0x0f` is 15.
    Binary,
}

impl DigitBase {
    /// Numeric value of one byte under this base.
    pub fn value(self, byte: u8) -> Option<u32> {
        match self {
            Self::Bcd => {
                let (hi, lo) = (byte >> 4, byte & 0x0f);
                if hi > 9 || lo > 9 {
                    None
                } else {
                    Some(hi as u32 * 10 + lo as u32)
                }
            }
            Self::Binary => Some(byte as u32),
        }
    }
}

// the calendar range callers of this protocol can represent
fn in_range(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    use chrono::Datelike;
    (1..=9999).contains(&dt.year()).then_some(dt)
}

/// `YY MM DD hh mm ss`, years counted from [DATE_LIMIT_YEAR].
pub fn date_time6(bytes: [u8; 6], base: DigitBase) -> Option<NaiveDateTime> {
    let [y, mo, d, h, mi, s] = bytes.map(|b| base.value(b));
    NaiveDate::from_ymd_opt(DATE_LIMIT_YEAR + y? as i32, mo?, d?)?.and_hms_opt(h?, mi?, s?)
}

/// `hh mm ss` plus a big-endian u16 of milliseconds, on `date`.
pub fn date_time5(bytes: [u8; 5], date: NaiveDate, base: DigitBase) -> Option<NaiveDateTime> {
    let millis = u16::from_be_bytes([bytes[3], bytes[4]]) as u32;
    // chrono allows up to 1999 here for leap seconds
    if millis >= 1000 {
        return None;
    }
    date.and_hms_milli_opt(
        base.value(bytes[0])?,
        base.value(bytes[1])?,
        base.value(bytes[2])?,
        millis,
    )
}

/// `YYYY MM DD` at midnight.
///
/// The year's high byte goes through `base`, but the low byte is
/// always taken as binary.
pub fn date_time4(bytes: [u8; 4], base: DigitBase) -> Option<NaiveDateTime> {
    let year = (base.value(bytes[0])? << 8) + bytes[1] as u32;
    let date = NaiveDate::from_ymd_opt(
        year.try_into().ok()?,
        base.value(bytes[2])?,
        base.value(bytes[3])?,
    )?;
    in_range(date.and_hms_opt(0, 0, 0)?)
}

/// Big-endian seconds since the epoch, shifted to UTC+8.
pub fn utc_date_time(bytes: [u8; 8]) -> Option<NaiveDateTime> {
    let seconds = i64::try_from(u64::from_be_bytes(bytes)).ok()?;
    let dt = utc_base_time()
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)?
        .checked_add_signed(TimeDelta::try_hours(UTC_OFFSET_HOURS)?)?;
    in_range(dt)
}

/// Resolve a decoded field, falling back to the epoch.
pub fn or_epoch(
    field: &'static str,
    bytes: &[u8],
    value: Option<NaiveDateTime>,
) -> NaiveDateTime {
    value.unwrap_or_else(|| {
        tracing::debug!(field, ?bytes, "invalid date field, using epoch");
        utc_base_time()
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn digit_bcd() {
        assert_eq!(DigitBase::Bcd.value(0x15), Some(15));
        assert_eq!(DigitBase::Bcd.value(0x99), Some(99));
        assert_eq!(DigitBase::Bcd.value(0x0f), None);
        assert_eq!(DigitBase::Bcd.value(0xa0), None);
    }

    #[test]
    fn digit_binary() {
        assert_eq!(DigitBase::Binary.value(0x0f), Some(15));
        assert_eq!(DigitBase::Binary.value(0xff), Some(255));
    }

    #[test]
    fn six_binary() {
        let bytes = [0x07, 0x09, 0x0f, 0x0a, 0x1e, 0x2d];
        assert_eq!(
            date_time6(bytes, DigitBase::Binary),
            Some(dt(2007, 9, 15, 10, 30, 45))
        );
    }

    #[test]
    fn six_bcd() {
        let bytes = [0x07, 0x09, 0x15, 0x10, 0x30, 0x45];
        assert_eq!(
            date_time6(bytes, DigitBase::Bcd),
            Some(dt(2007, 9, 15, 10, 30, 45))
        );
    }

    #[test]
    fn six_bcd_rejects_hex_nibbles() {
        let bytes = [0x07, 0x09, 0x0f, 0x0a, 0x1e, 0x2d];
        assert_eq!(date_time6(bytes, DigitBase::Bcd), None);
    }

    #[test]
    fn six_bad_calendar() {
        let bytes = [0x19, 0x02, 0x30, 0x00, 0x00, 0x00];
        assert_eq!(date_time6(bytes, DigitBase::Bcd), None);
        let bytes = [0x19, 0x01, 0x01, 0x24, 0x00, 0x00];
        assert_eq!(date_time6(bytes, DigitBase::Bcd), None);
    }

    #[test]
    fn five() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bytes = [0x12, 0x34, 0x56, 0x01, 0xf4];
        assert_eq!(
            date_time5(bytes, date, DigitBase::Bcd),
            date.and_hms_milli_opt(12, 34, 56, 500)
        );
    }

    #[test]
    fn five_millis_out_of_range() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bytes = [0x12, 0x34, 0x56, 0x03, 0xe8];
        assert_eq!(date_time5(bytes, date, DigitBase::Bcd), None);
    }

    #[test]
    fn four() {
        // 2019 = 0x07e3
        let bytes = [0x07, 0xe3, 0x12, 0x31];
        assert_eq!(
            date_time4(bytes, DigitBase::Bcd),
            Some(dt(2019, 12, 31, 0, 0, 0))
        );
    }

    #[test]
    fn four_year_zero() {
        let bytes = [0x00, 0x00, 0x01, 0x01];
        assert_eq!(date_time4(bytes, DigitBase::Bcd), None);
    }

    #[test]
    fn four_year_too_large() {
        let bytes = [0x99, 0x00, 0x01, 0x01];
        assert_eq!(date_time4(bytes, DigitBase::Bcd), None);
    }

    #[test]
    fn utc() {
        // 2020-01-01 00:00:00 UTC
        let bytes = 1_577_836_800u64.to_be_bytes();
        assert_eq!(utc_date_time(bytes), Some(dt(2020, 1, 1, 8, 0, 0)));
    }

    #[test]
    fn utc_zero() {
        assert_eq!(utc_date_time([0; 8]), Some(dt(1970, 1, 1, 8, 0, 0)));
    }

    #[test]
    fn utc_overflow() {
        assert_eq!(utc_date_time([0xff; 8]), None);
        assert_eq!(utc_date_time([0x00, 0x00, 0x01, 0, 0, 0, 0, 0]), None);
    }

    #[test]
    fn epoch_fallback() {
        assert_eq!(or_epoch("test", &[], None), dt(1970, 1, 1, 0, 0, 0));
        let value = dt(2001, 2, 3, 4, 5, 6);
        assert_eq!(or_epoch("test", &[], Some(value)), value);
    }
}
