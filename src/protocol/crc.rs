//! CRC-16 used to check frame payloads.
//!
//! The protocol uses CRC-16/CCITT-FALSE: polynomial `0x1021`, no
//! reflection, register seeded to `0xffff`, no final XOR.

/// Initial value of the CRC register.
pub const INITIAL: u16 = 0xffff;

/// Generator polynomial.
pub const POLYNOMIAL: u16 = 0x1021;

/// Byte-at-a-time lookup table for [POLYNOMIAL].
pub static TABLE: [u16; 256] = make_table(POLYNOMIAL);

const fn make_table(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut reg = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            reg = if reg & 0x8000 != 0 {
                (reg << 1) ^ poly
            } else {
                reg << 1
            };
            bit += 1;
        }
        table[i] = reg;
        i += 1;
    }
    table
}

/// Feed one byte through the CRC register.
#[inline]
pub fn update(register: u16, byte: u8) -> u16 {
    (register << 8) ^ TABLE[((register >> 8) as u8 ^ byte) as usize]
}

/// A running CRC register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digest {
    register: u16,
}

impl Digest {
    pub const fn new() -> Self {
        Self { register: INITIAL }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.register = update(self.register, byte);
    }

    pub fn finalize(self) -> u16 {
        self.register
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC of a whole byte slice.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes.iter().fold(INITIAL, |reg, b| update(reg, *b))
}
