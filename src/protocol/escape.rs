//! The escape table shared by frame payloads and checksums.
//!
//! Frame markers and escape lead bytes never appear bare inside a
//! frame; each is replaced by a lead byte and a 1 or 2.

/// Escape sequences and the byte each one stands for.
pub const ESCAPES: [([u8; 2], u8); 4] = [
    ([0x5a, 0x01], 0x5b),
    ([0x5a, 0x02], 0x5a),
    ([0x5e, 0x01], 0x5d),
    ([0x5e, 0x02], 0x5e),
];

/// Try to decode an escape sequence at the start of `window`.
///
/// Returns the decoded byte and `true` if the first two bytes are an
/// escape sequence, or the first byte and `false` if not. Windows
/// shorter than two bytes never match.
///
/// # Panics
///
/// If `window` is empty.
pub fn unescape(window: &[u8]) -> (u8, bool) {
    if let [a, b, ..] = window {
        for (seq, value) in ESCAPES.iter() {
            if seq[0] == *a && seq[1] == *b {
                return (*value, true);
            }
        }
    }
    (window[0], false)
}

/// The escape sequence standing in for `byte`, if it needs one.
pub fn escape(byte: u8) -> Option<[u8; 2]> {
    ESCAPES
        .iter()
        .find(|(_, value)| *value == byte)
        .map(|(seq, _)| *seq)
}

/// Iterator over the unescaped bytes of a slice.
///
/// Each step consumes two input bytes if they form an escape sequence,
/// and one otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unescape<'a> {
    input: &'a [u8],
}

impl<'a> Unescape<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }
}

impl<'a> Iterator for Unescape<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.input.is_empty() {
            return None;
        }
        let (value, escaped) = unescape(self.input);
        let step = if escaped { 2 } else { 1 };
        self.input = &self.input[step..];
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.input.len().div_ceil(2), Some(self.input.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use quickcheck_macros::quickcheck;

    fn escape_all(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() * 2);
        for b in data {
            match escape(*b) {
                Some(seq) => out.extend_from_slice(&seq),
                None => out.push(*b),
            }
        }
        out
    }

    #[test]
    fn unescape_table() {
        assert_eq!(unescape(&[0x5a, 0x01]), (0x5b, true));
        assert_eq!(unescape(&[0x5a, 0x02]), (0x5a, true));
        assert_eq!(unescape(&[0x5e, 0x01]), (0x5d, true));
        assert_eq!(unescape(&[0x5e, 0x02]), (0x5e, true));
    }

    #[test]
    fn unescape_no_match() {
        assert_eq!(unescape(&[0x5a, 0x03]), (0x5a, false));
        assert_eq!(unescape(&[0x01, 0x5a]), (0x01, false));
        assert_eq!(unescape(&[0x5b, 0x01]), (0x5b, false));
    }

    #[test]
    fn unescape_lone_byte() {
        assert_eq!(unescape(&[0x5a]), (0x5a, false));
    }

    #[test]
    fn escape_inverse() {
        for (seq, value) in ESCAPES.iter() {
            assert_eq!(escape(*value), Some(*seq));
        }
        assert_eq!(escape(0x00), None);
        assert_eq!(escape(0x5c), None);
    }

    #[test]
    fn unescape_iter_mixed() {
        let input = [0x01, 0x5a, 0x02, 0x5e, 0x01, 0x5a];
        let out: Vec<u8> = Unescape::new(&input).collect();
        assert_eq!(out, vec![0x01, 0x5a, 0x5d, 0x5a]);
    }

    #[quickcheck]
    fn roundtrip(data: Vec<u8>) -> bool {
        let escaped = escape_all(&data);
        Unescape::new(&escaped).collect::<Vec<u8>>() == data
    }

    #[quickcheck]
    fn roundtrip_reserved(picks: Vec<u8>) -> bool {
        // bias towards the bytes that need escaping
        let reserved = [0x5a, 0x5b, 0x5d, 0x5e, 0x01, 0x02];
        let data: Vec<u8> = picks
            .iter()
            .map(|p| reserved[*p as usize % reserved.len()])
            .collect();
        let escaped = escape_all(&data);
        escaped.iter().all(|b| *b != 0x5b && *b != 0x5d)
            && Unescape::new(&escaped).collect::<Vec<u8>>() == data
    }
}
