//! Huffman coding for DEFLATE.
//!
//! Implements both encoding and decoding of Huffman codes as specified in RFC 1951:
//! length-limited tree construction from symbol frequencies, canonical code
//! assignment, the static code tables, and lookup-table decoders.

use std::sync::OnceLock;

use sluice_core::DataError;

/// Maximum bits in a literal/length or distance code.
pub const MAX_BITS: u8 = 15;

/// Maximum bits in a bit-length code.
pub const MAX_BL_BITS: u8 = 7;

/// Number of literal bytes 0..255.
pub const LITERALS: usize = 256;

/// End-of-block symbol.
pub const END_BLOCK: usize = 256;

/// Number of length codes, not counting the special END_BLOCK code.
pub const LENGTH_CODES: usize = 29;

/// Number of usable literal/length codes.
pub const L_CODES: usize = LITERALS + 1 + LENGTH_CODES;

/// Number of usable distance codes.
pub const D_CODES: usize = 30;

/// Number of codes used to transfer the bit lengths.
pub const BL_CODES: usize = 19;

/// Repeat previous bit length 3-6 times (2 bits of repeat count).
pub const REP_3_6: usize = 16;

/// Repeat a zero length 3-10 times (3 bits of repeat count).
pub const REPZ_3_10: usize = 17;

/// Repeat a zero length 11-138 times (7 bits of repeat count).
pub const REPZ_11_138: usize = 18;

/// Order of code length codes in the dynamic header.
pub const CL_CODE_ORDER: [usize; BL_CODES] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; LENGTH_CODES] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base lengths for length codes 257-285.
pub const LENGTH_BASE: [u16; LENGTH_CODES] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; D_CODES] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Base distances for distance codes 0-29.
pub const DISTANCE_BASE: [u16; D_CODES] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for each bit-length code.
pub const BL_EXTRA_BITS: [u8; BL_CODES] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 3, 7];

/// Fixed Huffman literal/length code lengths (RFC 1951 section 3.2.6).
pub const FIXED_LIT_LENGTHS: [u8; 288] = {
    let mut lengths = [0u8; 288];
    let mut i = 0;
    while i < 144 {
        lengths[i] = 8;
        i += 1;
    }
    while i < 256 {
        lengths[i] = 9;
        i += 1;
    }
    while i < 280 {
        lengths[i] = 7;
        i += 1;
    }
    while i < 288 {
        lengths[i] = 8;
        i += 1;
    }
    lengths
};

/// Fixed Huffman distance code lengths.
pub const FIXED_DIST_LENGTHS: [u8; 32] = [5; 32];

/// A code ready for emission: bit-reversed value and its length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    /// Code bits, reversed so they can be written LSB-first.
    pub code: u16,
    /// Number of bits.
    pub len: u8,
}

/// Immutable tables shared by every encoder.
pub struct StaticTables {
    /// Fixed literal/length codes (288 entries, 286 and 287 unused).
    pub lit: Vec<Code>,
    /// Fixed distance codes.
    pub dist: Vec<Code>,
    /// Length code (0..28) indexed by `length - 3`.
    pub length_code: [u8; 256],
    /// Distance code for `dist - 1` below 256, then for `(dist - 1) >> 7`.
    pub dist_code: [u8; 512],
}

impl StaticTables {
    fn build() -> Self {
        let lit = to_codes(&FIXED_LIT_LENGTHS, &canonical_codes(&FIXED_LIT_LENGTHS));
        let dist_lengths = [5u8; D_CODES];
        let dist = to_codes(&dist_lengths, &canonical_codes(&dist_lengths));

        let mut length_code = [0u8; 256];
        for code in 0..LENGTH_CODES - 1 {
            let base = LENGTH_BASE[code] as usize - 3;
            for n in 0..(1usize << LENGTH_EXTRA_BITS[code]) {
                length_code[base + n] = code as u8;
            }
        }
        // Length 258 has its own code; 227 + 31 would otherwise claim it.
        length_code[255] = (LENGTH_CODES - 1) as u8;

        let mut dist_code = [0u8; 512];
        for code in 0..D_CODES {
            let base = DISTANCE_BASE[code] as usize - 1;
            for n in 0..(1usize << DISTANCE_EXTRA_BITS[code]) {
                let dist = base + n;
                if dist < 256 {
                    dist_code[dist] = code as u8;
                } else {
                    dist_code[256 + (dist >> 7)] = code as u8;
                }
            }
        }

        Self {
            lit,
            dist,
            length_code,
            dist_code,
        }
    }

    /// Length code index (0..28) for a match length in 3..=258.
    #[inline]
    pub fn length_symbol(&self, length: usize) -> usize {
        self.length_code[length - 3] as usize
    }

    /// Distance code (0..29) for a distance in 1..=32768.
    #[inline]
    pub fn distance_symbol(&self, distance: usize) -> usize {
        let d = distance - 1;
        if d < 256 {
            self.dist_code[d] as usize
        } else {
            self.dist_code[256 + (d >> 7)] as usize
        }
    }
}

/// Shared static tables, built on first use.
pub fn static_tables() -> &'static StaticTables {
    static TABLES: OnceLock<StaticTables> = OnceLock::new();
    TABLES.get_or_init(StaticTables::build)
}

/// Reverse `bits` number of bits in `code`.
#[inline]
pub fn reverse_bits(code: u32, bits: u8) -> u32 {
    let mut result = 0;
    let mut code = code;
    for _ in 0..bits {
        result = (result << 1) | (code & 1);
        code >>= 1;
    }
    result
}

/// Canonical codes for the given lengths, already bit-reversed.
///
/// Shorter codes come first; codes of equal length are consecutive in
/// symbol order.
pub fn canonical_codes(lengths: &[u8]) -> Vec<u16> {
    let mut bl_count = [0u32; MAX_BITS as usize + 1];
    for &len in lengths {
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u32; MAX_BITS as usize + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_BITS as usize {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return 0;
            }
            let code = next_code[len as usize];
            next_code[len as usize] += 1;
            reverse_bits(code, len) as u16
        })
        .collect()
}

fn to_codes(lengths: &[u8], codes: &[u16]) -> Vec<Code> {
    lengths
        .iter()
        .zip(codes)
        .map(|(&len, &code)| Code { code, len })
        .collect()
}

/// A length-limited Huffman code built from frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Code length per symbol (0 for unused).
    pub lengths: Vec<u8>,
    /// Bit-reversed code per symbol.
    pub codes: Vec<u16>,
    /// Largest symbol with a non-zero length.
    pub max_code: usize,
}

impl HuffmanTree {
    /// Build an optimal code limited to `max_bits`.
    ///
    /// At least two symbols always receive codes, so a lone symbol still
    /// gets a 1-bit code. Ties between equal weights are broken by subtree
    /// depth, which keeps the result deterministic.
    pub fn build(freqs: &[u32], max_bits: u8) -> Self {
        let elems = freqs.len();
        let heap_size = 2 * elems + 1;

        let mut freq = vec![0u32; heap_size];
        freq[..elems].copy_from_slice(freqs);
        let mut depth = vec![0u8; heap_size];
        let mut dad = vec![0usize; heap_size];
        let mut node_len = vec![0u8; heap_size];

        // heap[1..=heap_len] is a min-heap; heap[heap_max..] collects nodes
        // in decreasing frequency order as they are combined.
        let mut heap = vec![0usize; heap_size];
        let mut heap_len = 0;
        let mut heap_max = heap_size;
        let mut max_code: Option<usize> = None;

        for (n, &f) in freqs.iter().enumerate() {
            if f != 0 {
                heap_len += 1;
                heap[heap_len] = n;
                max_code = Some(n);
            }
        }

        while heap_len < 2 {
            let node = match max_code {
                Some(m) if m >= 2 => 0,
                Some(m) => {
                    max_code = Some(m + 1);
                    m + 1
                }
                None => {
                    max_code = Some(0);
                    0
                }
            };
            heap_len += 1;
            heap[heap_len] = node;
            freq[node] = 1;
            depth[node] = 0;
        }
        let max_code = max_code.unwrap_or(1);

        for k in (1..=heap_len / 2).rev() {
            sift_down(&mut heap, heap_len, &freq, &depth, k);
        }

        let mut node = elems;
        loop {
            let n = heap[1];
            heap[1] = heap[heap_len];
            heap_len -= 1;
            sift_down(&mut heap, heap_len, &freq, &depth, 1);
            let m = heap[1];

            heap_max -= 1;
            heap[heap_max] = n;
            heap_max -= 1;
            heap[heap_max] = m;

            freq[node] = freq[n] + freq[m];
            depth[node] = depth[n].max(depth[m]) + 1;
            dad[n] = node;
            dad[m] = node;

            heap[1] = node;
            node += 1;
            sift_down(&mut heap, heap_len, &freq, &depth, 1);

            if heap_len < 2 {
                break;
            }
        }
        heap_max -= 1;
        heap[heap_max] = heap[1];

        // Depth-first lengths, clamped at max_bits.
        let mut bl_count = [0i32; MAX_BITS as usize + 1];
        node_len[heap[heap_max]] = 0;
        let mut overflow = 0i32;

        for &n in &heap[heap_max + 1..heap_size] {
            let mut bits = node_len[dad[n]] + 1;
            if bits > max_bits {
                bits = max_bits;
                overflow += 1;
            }
            node_len[n] = bits;
            if n > max_code {
                continue;
            }
            bl_count[bits as usize] += 1;
        }

        if overflow > 0 {
            let max = max_bits as usize;
            while overflow > 0 {
                let mut bits = max - 1;
                while bl_count[bits] == 0 {
                    bits -= 1;
                }
                bl_count[bits] -= 1;
                bl_count[bits + 1] += 2;
                bl_count[max] -= 1;
                overflow -= 2;
            }

            // Reassign lengths: the nodes are in frequency order, so hand
            // the longest lengths to the least frequent leaves.
            let mut h = heap_size;
            for bits in (1..=max).rev() {
                let mut count = bl_count[bits];
                while count != 0 {
                    h -= 1;
                    let m = heap[h];
                    if m > max_code {
                        continue;
                    }
                    node_len[m] = bits as u8;
                    count -= 1;
                }
            }
        }

        // Only leaves that entered the heap (non-zero or forced) carry a length.
        let lengths: Vec<u8> = (0..elems)
            .map(|n| if freq[n] != 0 { node_len[n] } else { 0 })
            .collect();

        let codes = canonical_codes(&lengths);
        Self {
            lengths,
            codes,
            max_code,
        }
    }

    /// Code for a symbol.
    #[inline]
    pub fn code(&self, symbol: usize) -> Code {
        Code {
            code: self.codes[symbol],
            len: self.lengths[symbol],
        }
    }
}

fn smaller(freq: &[u32], depth: &[u8], n: usize, m: usize) -> bool {
    freq[n] < freq[m] || (freq[n] == freq[m] && depth[n] <= depth[m])
}

fn sift_down(heap: &mut [usize], heap_len: usize, freq: &[u32], depth: &[u8], mut k: usize) {
    let v = heap[k];
    let mut j = k << 1;
    while j <= heap_len {
        if j < heap_len && smaller(freq, depth, heap[j + 1], heap[j]) {
            j += 1;
        }
        if smaller(freq, depth, v, heap[j]) {
            break;
        }
        heap[k] = heap[j];
        k = j;
        j <<= 1;
    }
    heap[k] = v;
}

/// Which alphabet a decoder serves; selects the error reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// The 19-symbol bit-length alphabet.
    CodeLengths,
    /// Literal/length alphabet.
    LiteralLength,
    /// Distance alphabet.
    Distance,
}

impl CodeKind {
    fn set_error(self) -> DataError {
        match self {
            CodeKind::CodeLengths => DataError::InvalidCodeLengthsSet,
            CodeKind::LiteralLength => DataError::InvalidLiteralLengthsSet,
            CodeKind::Distance => DataError::InvalidDistancesSet,
        }
    }

    /// Error for bits that match no code of this alphabet.
    pub fn code_error(self) -> DataError {
        match self {
            CodeKind::CodeLengths => DataError::InvalidCodeLengthsSet,
            CodeKind::LiteralLength => DataError::InvalidLiteralLengthCode,
            CodeKind::Distance => DataError::InvalidDistanceCode,
        }
    }
}

/// Huffman decoder using lookup tables.
#[derive(Clone)]
pub struct HuffmanDecoder {
    /// Lookup table: code -> (symbol, bits)
    /// Index by reversed code bits, value is (symbol << 4) | bits
    table: Vec<u16>,
    /// Number of bits for table lookup
    table_bits: u8,
    kind: CodeKind,
}

impl std::fmt::Debug for HuffmanDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuffmanDecoder")
            .field("table_bits", &self.table_bits)
            .field("kind", &self.kind)
            .finish()
    }
}

impl HuffmanDecoder {
    /// Build a Huffman decoder from code lengths.
    ///
    /// Over-subscribed sets are rejected. Incomplete sets are rejected too,
    /// except a single 1-bit code for the literal/length and distance
    /// alphabets. An empty distance set is accepted; any lookup then fails.
    pub fn from_lengths(lengths: &[u8], kind: CodeKind) -> Result<Self, DataError> {
        // Count codes of each length
        let mut bl_count = [0i32; MAX_BITS as usize + 1];
        let mut max_bits = 0u8;

        for &len in lengths {
            if len > 0 {
                bl_count[len as usize] += 1;
                max_bits = max_bits.max(len);
            }
        }

        if max_bits == 0 {
            if kind == CodeKind::CodeLengths {
                return Err(kind.set_error());
            }
            // All zeros - create minimal table
            return Ok(Self {
                table: vec![0; 2],
                table_bits: 1,
                kind,
            });
        }

        let mut left = 1i32;
        for &count in &bl_count[1..] {
            left <<= 1;
            left -= count;
            if left < 0 {
                return Err(kind.set_error());
            }
        }
        if left > 0 && (kind == CodeKind::CodeLengths || max_bits != 1) {
            return Err(kind.set_error());
        }

        Ok(Self::build_table(lengths, max_bits, kind))
    }

    fn build_table(lengths: &[u8], max_bits: u8, kind: CodeKind) -> Self {
        let codes = canonical_codes(lengths);

        let table_bits = max_bits;
        let table_size = 1usize << table_bits;
        let mut table = vec![0u16; table_size];

        for (symbol, (&len, &reversed)) in lengths.iter().zip(&codes).enumerate() {
            if len == 0 {
                continue;
            }

            // Fill all entries that match this code
            let entry = ((symbol as u16) << 4) | (len as u16);
            let step = 1usize << len;
            let mut index = reversed as usize;
            while index < table_size {
                table[index] = entry;
                index += step;
            }
        }

        Self {
            table,
            table_bits,
            kind,
        }
    }

    /// Bits needed for a guaranteed-complete lookup.
    #[inline]
    pub fn table_bits(&self) -> u32 {
        self.table_bits as u32
    }

    /// Alphabet served by this decoder.
    #[inline]
    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    /// Look up the low bits of `hold`; returns `(symbol, code length)`.
    ///
    /// A length of zero marks bits that match no code. When fewer than
    /// `table_bits` bits are valid in `hold`, a non-zero length that does
    /// not exceed the valid bit count is still a correct decode.
    #[inline]
    pub fn lookup(&self, hold: u64) -> (u16, u32) {
        let mask = (1u64 << self.table_bits) - 1;
        let entry = self.table[(hold & mask) as usize];
        (entry >> 4, (entry & 0xF) as u32)
    }
}

/// Decoders for the fixed literal/length and distance codes.
pub struct FixedDecoders {
    /// Literal/length decoder.
    pub lit: HuffmanDecoder,
    /// Distance decoder.
    pub dist: HuffmanDecoder,
}

/// Shared fixed decoders, built on first use.
pub fn fixed_decoders() -> &'static FixedDecoders {
    static FIXED: OnceLock<FixedDecoders> = OnceLock::new();
    // Both fixed codes are complete, so validation is skipped.
    FIXED.get_or_init(|| FixedDecoders {
        lit: HuffmanDecoder::build_table(&FIXED_LIT_LENGTHS, 9, CodeKind::LiteralLength),
        dist: HuffmanDecoder::build_table(&FIXED_DIST_LENGTHS, 5, CodeKind::Distance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kraft_sum(lengths: &[u8]) -> f64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 2f64.powi(-(l as i32)))
            .sum()
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b1100, 4), 0b0011);
        assert_eq!(reverse_bits(0b10101010, 8), 0b01010101);
        assert_eq!(reverse_bits(0b1, 1), 0b1);
    }

    #[test]
    fn test_canonical_codes_rfc_example() {
        // RFC 1951 section 3.2.2: lengths (3, 3, 3, 3, 3, 2, 4, 4)
        let lengths = [3, 3, 3, 3, 3, 2, 4, 4];
        let codes = canonical_codes(&lengths);
        let expected = [0b010, 0b011, 0b100, 0b101, 0b110, 0b00, 0b1110, 0b1111];
        for (i, (&code, &len)) in codes.iter().zip(&lengths).enumerate() {
            assert_eq!(
                reverse_bits(code as u32, len),
                expected[i],
                "symbol {}",
                i
            );
        }
    }

    #[test]
    fn test_static_tables() {
        let tables = static_tables();
        assert_eq!(tables.lit[0].len, 8);
        assert_eq!(tables.lit[END_BLOCK].len, 7);
        assert_eq!(tables.lit[END_BLOCK].code, 0);
        assert_eq!(tables.lit[200].len, 9);
        assert_eq!(tables.dist[3].len, 5);

        assert_eq!(tables.length_symbol(3), 0);
        assert_eq!(tables.length_symbol(10), 7);
        assert_eq!(tables.length_symbol(11), 8);
        assert_eq!(tables.length_symbol(12), 8);
        assert_eq!(tables.length_symbol(257), 27);
        assert_eq!(tables.length_symbol(258), 28);

        assert_eq!(tables.distance_symbol(1), 0);
        assert_eq!(tables.distance_symbol(4), 3);
        assert_eq!(tables.distance_symbol(5), 4);
        assert_eq!(tables.distance_symbol(256), 15);
        assert_eq!(tables.distance_symbol(257), 16);
        assert_eq!(tables.distance_symbol(24577), 29);
        assert_eq!(tables.distance_symbol(32768), 29);
    }

    #[test]
    fn test_every_length_and_distance_maps_to_its_range() {
        let tables = static_tables();
        for length in 3..=258usize {
            let code = tables.length_symbol(length);
            let base = LENGTH_BASE[code] as usize;
            assert!(length >= base);
            assert!(length - base < (1 << LENGTH_EXTRA_BITS[code]) || code == 28);
        }
        for distance in 1..=32768usize {
            let code = tables.distance_symbol(distance);
            let base = DISTANCE_BASE[code] as usize;
            assert!(distance >= base);
            assert!(distance - base < (1 << DISTANCE_EXTRA_BITS[code]));
        }
    }

    #[test]
    fn test_build_single_symbol_gets_two_leaves() {
        let mut freqs = [0u32; 30];
        freqs[7] = 42;
        let tree = HuffmanTree::build(&freqs, MAX_BITS);
        assert_eq!(tree.lengths[7], 1);
        assert_eq!(tree.lengths.iter().filter(|&&l| l > 0).count(), 2);
        assert_eq!(tree.max_code, 7);
        assert!((kraft_sum(&tree.lengths) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_empty_alphabet() {
        let freqs = [0u32; 30];
        let tree = HuffmanTree::build(&freqs, MAX_BITS);
        assert_eq!(tree.lengths[0], 1);
        assert_eq!(tree.lengths[1], 1);
        assert_eq!(tree.max_code, 1);
    }

    #[test]
    fn test_build_limits_length() {
        // Fibonacci weights produce a maximally skewed tree.
        let mut freqs = vec![0u32; BL_CODES];
        let (mut a, mut b) = (1u32, 1u32);
        for f in freqs.iter_mut() {
            *f = a;
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = HuffmanTree::build(&freqs, MAX_BL_BITS);
        assert!(tree.lengths.iter().all(|&l| l <= MAX_BL_BITS && l > 0));
        assert!(kraft_sum(&tree.lengths) <= 1.0 + 1e-12);
    }

    #[test]
    fn test_build_is_optimal_for_simple_weights() {
        let freqs = [5u32, 9, 12, 13, 16, 45];
        let tree = HuffmanTree::build(&freqs, MAX_BITS);
        let cost: u32 = freqs
            .iter()
            .zip(&tree.lengths)
            .map(|(&f, &l)| f * l as u32)
            .sum();
        assert_eq!(cost, 224);
        assert_eq!(tree.lengths[5], 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        let freqs: Vec<u32> = (0..286).map(|i| (i * 37 % 11) as u32).collect();
        let a = HuffmanTree::build(&freqs, MAX_BITS);
        let b = HuffmanTree::build(&freqs, MAX_BITS);
        assert_eq!(a.lengths, b.lengths);
        assert_eq!(a.codes, b.codes);
    }

    #[test]
    fn test_fixed_huffman_decoder() {
        let fixed = fixed_decoders();
        assert_eq!(fixed.lit.table_bits(), 9);
        // End of block is seven zero bits.
        assert_eq!(fixed.lit.lookup(0), (256, 7));
        // Literal 0 is 00110000 (reversed on the wire).
        let code = static_tables().lit[0];
        assert_eq!(fixed.lit.lookup(code.code as u64), (0, 8));
    }

    #[test]
    fn test_decoder_rejects_oversubscribed() {
        let lengths = [1u8, 1, 1];
        assert_eq!(
            HuffmanDecoder::from_lengths(&lengths, CodeKind::LiteralLength).unwrap_err(),
            DataError::InvalidLiteralLengthsSet
        );
    }

    #[test]
    fn test_decoder_incomplete_rules() {
        // A lone one-bit distance code is allowed.
        let mut dist = [0u8; 30];
        dist[0] = 1;
        let decoder = HuffmanDecoder::from_lengths(&dist, CodeKind::Distance).unwrap();
        assert_eq!(decoder.lookup(0), (0, 1));
        assert_eq!(decoder.lookup(1).1, 0);

        // Incomplete bit-length codes are not.
        let mut cl = [0u8; BL_CODES];
        cl[0] = 2;
        cl[1] = 2;
        assert_eq!(
            HuffmanDecoder::from_lengths(&cl, CodeKind::CodeLengths).unwrap_err(),
            DataError::InvalidCodeLengthsSet
        );

        // Empty distance set is fine; empty bit-length set is not.
        assert!(HuffmanDecoder::from_lengths(&[0u8; 30], CodeKind::Distance).is_ok());
        assert!(HuffmanDecoder::from_lengths(&[0u8; 19], CodeKind::CodeLengths).is_err());
    }

    #[test]
    fn test_built_tree_decodes() {
        let freqs: Vec<u32> = (0..BL_CODES as u32).map(|i| i * i + 1).collect();
        let tree = HuffmanTree::build(&freqs, MAX_BL_BITS);
        let decoder = HuffmanDecoder::from_lengths(&tree.lengths, CodeKind::CodeLengths).unwrap();
        for symbol in 0..BL_CODES {
            let code = tree.code(symbol);
            assert_eq!(
                decoder.lookup(code.code as u64),
                (symbol as u16, code.len as u32)
            );
        }
    }
}
