//! Adler-32 checksum (RFC 1950 section 8.2).
//!
//! The state is the pair of running sums, so a checksum can be continued
//! from any earlier value: `adler32(adler32(seed, a), b) == adler32(seed, a ++ b)`.

/// Largest prime smaller than 65536.
pub const ADLER_MOD: u32 = 65521;

/// Largest n such that 255n(n+1)/2 + (n+1)(ADLER_MOD-1) fits in a u32.
const NMAX: usize = 5552;

/// Incremental Adler-32 state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Fresh checksum (value 1).
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Continue from a previously computed checksum value.
    pub fn from_checksum(checksum: u32) -> Self {
        Self {
            a: checksum & 0xFFFF,
            b: checksum >> 16,
        }
    }

    /// Feed bytes.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                a += byte as u32;
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        self.a = a;
        self.b = b;
    }

    /// Current checksum value.
    #[inline]
    pub fn checksum(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Continue the checksum `seed` over `data`. Use a seed of 1 to start.
pub fn adler32(seed: u32, data: &[u8]) -> u32 {
    let mut state = Adler32::from_checksum(seed);
    state.update(data);
    state.checksum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adler32() {
        // Known test vectors
        assert_eq!(adler32(1, b""), 1);
        assert_eq!(adler32(1, b"a"), 0x00620062);
        assert_eq!(adler32(1, b"abc"), 0x024d0127);
        assert_eq!(adler32(1, b"Wikipedia"), 0x11E60398);
    }

    #[test]
    fn test_split_matches_whole() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let whole = adler32(1, &data);
        for split in [0, 1, 5551, 5552, 5553, 19_999, 20_000] {
            let (head, tail) = data.split_at(split);
            assert_eq!(adler32(adler32(1, head), tail), whole, "split at {}", split);
        }
    }

    #[test]
    fn test_large_run_of_ff_does_not_overflow() {
        let data = vec![0xFFu8; 100_000];
        let mut incremental = Adler32::new();
        for chunk in data.chunks(7) {
            incremental.update(chunk);
        }
        assert_eq!(incremental.checksum(), adler32(1, &data));
    }
}
