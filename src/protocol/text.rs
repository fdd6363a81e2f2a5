//! Protocol text fields.
//!
//! Text is GBK encoded and padded with NUL to its field width.

use encoding_rs::GBK;

/// Decode a GBK text field, dropping trailing NUL padding.
///
/// Invalid sequences decode to U+FFFD rather than failing the frame.
///
/// Only trailing NULs are trimmed. Leading NULs stay in the result, unlike
/// a two-sided trim, so a field that starts with padding keeps it.
pub fn decode_gbk(bytes: &[u8]) -> String {
    let (text, had_errors) = GBK.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::debug!(len = bytes.len(), "invalid GBK sequence in text field");
    }
    text.trim_end_matches('\0').to_owned()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(decode_gbk(b"hello"), "hello");
    }

    #[test]
    fn trailing_padding() {
        assert_eq!(decode_gbk(b"A12345\0\0\0\0"), "A12345");
        assert_eq!(decode_gbk(b"\0\0\0"), "");
    }

    #[test]
    fn leading_nul_kept() {
        assert_eq!(decode_gbk(b"\0ab\0"), "\0ab");
        assert_eq!(decode_gbk(b"\0\0AB\0\0"), "\0\0AB");
    }

    #[test]
    fn gbk_plate() {
        // "粤A" in GBK
        assert_eq!(decode_gbk(&[0xd4, 0xc1, b'A', 0x00]), "粤A");
    }
}
