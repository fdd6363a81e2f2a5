//! Hexadecimal rendering of field bytes and whole frames.

use std::fmt::Write;

const WIDTH: usize = 0x10;

/// Render bytes as contiguous lowercase hex, two digits per byte.
pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for b in data {
        // writing to a String can't fail
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Render bytes as contiguous uppercase hex, two digits per byte.
pub fn to_hex_upper(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for b in data {
        let _ = write!(out, "{:02X}", b);
    }
    out
}

fn printable(chr: u8) -> Option<char> {
    if (0x20..0x7f).contains(&chr) {
        Some(chr as char)
    } else {
        None
    }
}

/// A multi-line hexdump, for logging frames.
///
/// ```text
/// 0000  5b 00 00 00 1a 00 00 00  01 12 00 00 00 00 00 00  |[...............|
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HexDump<'a>(pub &'a [u8]);

impl<'a> std::fmt::Display for HexDump<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (n, line) in self.0.chunks(WIDTH).enumerate() {
            if n > 0 {
                writeln!(f)?;
            }
            write!(f, "{:04x}", n * WIDTH)?;

            for i in 0..WIDTH {
                if i % 8 == 0 {
                    write!(f, " ")?;
                }
                if i < line.len() {
                    write!(f, " {:02x}", line[i])?;
                } else {
                    write!(f, "   ")?;
                }
            }

            write!(f, "  |")?;
            for b in line {
                write!(f, "{}", printable(*b).unwrap_or('.'))?;
            }
            write!(f, "|")?;
        }
        Ok(())
    }
}
