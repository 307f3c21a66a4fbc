//! Block encoder: symbol tallies, block-type selection, and emission.

use tracing::trace;

use crate::bits::BitWriter;
use crate::huffman::{
    static_tables, Code, HuffmanTree, BL_CODES, BL_EXTRA_BITS, CL_CODE_ORDER, DISTANCE_BASE,
    DISTANCE_EXTRA_BITS, D_CODES, END_BLOCK, LENGTH_BASE, LENGTH_EXTRA_BITS, LITERALS, L_CODES,
    MAX_BITS, MAX_BL_BITS, REPZ_11_138, REPZ_3_10, REP_3_6,
};

const STORED_BLOCK: u32 = 0;
const STATIC_TREES: u32 = 1;
const DYN_TREES: u32 = 2;

/// Largest payload of one stored block.
pub const MAX_STORED: usize = 0xFFFF;

/// One tallied symbol: a literal (`dist == 0`) or a match.
#[derive(Debug, Clone, Copy)]
struct Symbol {
    dist: u16,
    /// Literal byte, or match length minus 3.
    lc: u8,
}

/// Which block type a flush produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Raw bytes.
    Stored,
    /// Fixed Huffman codes.
    Fixed,
    /// Codes sent in the block header.
    Dynamic,
}

/// Accumulates symbols for the current block and writes finished blocks
/// into its pending [`BitWriter`].
pub struct BlockEncoder {
    /// Compressed bytes not yet handed to the caller.
    pub writer: BitWriter,
    symbols: Vec<Symbol>,
    lit_bufsize: usize,
    lit_freq: Vec<u32>,
    dist_freq: Vec<u32>,
    blocks: usize,
}

impl BlockEncoder {
    /// Symbol buffer of `1 << (mem_level + 6)` entries.
    pub fn new(mem_level: u8) -> Self {
        let lit_bufsize = 1usize << (mem_level + 6);
        let mut encoder = Self {
            writer: BitWriter::with_capacity(lit_bufsize * 4),
            symbols: Vec::with_capacity(lit_bufsize),
            lit_bufsize,
            lit_freq: vec![0; L_CODES],
            dist_freq: vec![0; D_CODES],
            blocks: 0,
        };
        encoder.init_block();
        encoder
    }

    /// Largest stored block the stored loop will build.
    pub fn max_stored_block(&self) -> usize {
        MAX_STORED.min(self.lit_bufsize * 4 - 5)
    }

    /// Blocks emitted so far.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// True when no symbols are tallied.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Drop tallies, pending output and counters.
    pub fn reset(&mut self) {
        self.writer.reset();
        self.blocks = 0;
        self.init_block();
    }

    /// Release the buffers.
    pub fn release(&mut self) {
        self.writer = BitWriter::new();
        self.symbols = Vec::new();
    }

    fn init_block(&mut self) {
        self.lit_freq.fill(0);
        self.dist_freq.fill(0);
        self.lit_freq[END_BLOCK] = 1;
        self.symbols.clear();
    }

    /// Tally a literal. Returns true when the block should be flushed.
    #[inline]
    pub fn tally_lit(&mut self, byte: u8) -> bool {
        self.symbols.push(Symbol { dist: 0, lc: byte });
        self.lit_freq[byte as usize] += 1;
        self.symbols.len() == self.lit_bufsize - 1
    }

    /// Tally a match. Returns true when the block should be flushed.
    #[inline]
    pub fn tally_dist(&mut self, distance: usize, length: usize) -> bool {
        let tables = static_tables();
        self.symbols.push(Symbol {
            dist: distance as u16,
            lc: (length - 3) as u8,
        });
        self.lit_freq[tables.length_symbol(length) + LITERALS + 1] += 1;
        self.dist_freq[tables.distance_symbol(distance)] += 1;
        self.symbols.len() == self.lit_bufsize - 1
    }

    /// Emit the current block as the cheapest of stored, fixed or dynamic.
    ///
    /// `stored` holds the raw bytes of the block if they are still
    /// available; without them a stored block cannot be chosen.
    pub fn flush_block(&mut self, stored: Option<&[u8]>, stored_len: usize, last: bool, level: u8) {
        let mut dynamic = None;
        let (opt_lenb, static_lenb) = if level > 0 {
            let ltree = HuffmanTree::build(&self.lit_freq, MAX_BITS);
            let dtree = HuffmanTree::build(&self.dist_freq, MAX_BITS);

            let bl_freq = bl_frequencies(&ltree, &dtree);
            let bl_tree = HuffmanTree::build(&bl_freq, MAX_BL_BITS);
            let mut max_blindex = BL_CODES - 1;
            while max_blindex >= 3 && bl_tree.lengths[CL_CODE_ORDER[max_blindex]] == 0 {
                max_blindex -= 1;
            }

            let mut opt_len = self.tree_cost(&ltree.lengths, &dtree.lengths);
            opt_len += bl_freq
                .iter()
                .zip(&bl_tree.lengths)
                .zip(&BL_EXTRA_BITS)
                .map(|((&f, &len), &extra)| f as u64 * (len as u64 + extra as u64))
                .sum::<u64>();
            opt_len += 3 * (max_blindex as u64 + 1) + 5 + 5 + 4;
            let static_len = self.static_cost();

            let mut opt_lenb = ((opt_len + 3 + 7) >> 3) as usize;
            let static_lenb = ((static_len + 3 + 7) >> 3) as usize;
            if static_lenb <= opt_lenb {
                opt_lenb = static_lenb;
            }
            dynamic = Some((ltree, dtree, bl_tree, max_blindex));
            (opt_lenb, static_lenb)
        } else {
            (stored_len + 5, stored_len + 5)
        };

        let kind = match (stored, dynamic) {
            (Some(bytes), _) if stored_len + 4 <= opt_lenb => {
                self.stored_block(bytes, last);
                BlockKind::Stored
            }
            (_, Some((ltree, dtree, bl_tree, max_blindex))) if static_lenb != opt_lenb => {
                self.writer.write_bits((DYN_TREES << 1) + last as u32, 3);
                self.send_all_trees(&ltree, &dtree, &bl_tree, max_blindex);
                self.compress_block(&codes_of(&ltree), &codes_of(&dtree));
                BlockKind::Dynamic
            }
            _ => {
                let tables = static_tables();
                self.writer.write_bits((STATIC_TREES << 1) + last as u32, 3);
                self.compress_block(&tables.lit, &tables.dist);
                BlockKind::Fixed
            }
        };

        trace!(
            ?kind,
            symbols = self.symbols.len(),
            stored_len,
            opt_lenb,
            static_lenb,
            last,
            "flushed block"
        );

        self.blocks += 1;
        self.init_block();
        if last {
            self.writer.align();
        }
    }

    /// Write a stored block (split when longer than one block may hold).
    pub fn stored_block(&mut self, bytes: &[u8], last: bool) {
        let mut chunks = bytes.chunks(MAX_STORED).peekable();
        if chunks.peek().is_none() {
            self.write_stored_header(0, last);
            return;
        }
        while let Some(chunk) = chunks.next() {
            let is_last = last && chunks.peek().is_none();
            self.write_stored_header(chunk.len(), is_last);
            self.writer.write_bytes(chunk);
        }
    }

    fn write_stored_header(&mut self, len: usize, last: bool) {
        self.writer.write_bits((STORED_BLOCK << 1) + last as u32, 3);
        self.writer.align();
        self.writer.write_u16_le(len as u16);
        self.writer.write_u16_le(!(len as u16));
    }

    /// Empty stored block: byte-aligns the stream with `00 00 FF FF`.
    pub fn sync_marker(&mut self) {
        self.write_stored_header(0, false);
    }

    /// Empty fixed block: pushes out the bits of the previous block
    /// without byte alignment.
    pub fn align(&mut self) {
        let eob = static_tables().lit[END_BLOCK];
        self.writer.write_bits(STATIC_TREES << 1, 3);
        self.writer.write_code(eob.code, eob.len);
    }

    fn tree_cost(&self, lit_lengths: &[u8], dist_lengths: &[u8]) -> u64 {
        let mut cost = 0u64;
        for (n, (&f, &len)) in self.lit_freq.iter().zip(lit_lengths).enumerate() {
            let extra = if n > LITERALS {
                LENGTH_EXTRA_BITS[n - LITERALS - 1] as u64
            } else {
                0
            };
            cost += f as u64 * (len as u64 + extra);
        }
        for (n, (&f, &len)) in self.dist_freq.iter().zip(dist_lengths).enumerate() {
            cost += f as u64 * (len as u64 + DISTANCE_EXTRA_BITS[n] as u64);
        }
        cost
    }

    fn static_cost(&self) -> u64 {
        let tables = static_tables();
        let lit_lengths: Vec<u8> = tables.lit.iter().map(|c| c.len).collect();
        let dist_lengths: Vec<u8> = tables.dist.iter().map(|c| c.len).collect();
        self.tree_cost(&lit_lengths, &dist_lengths)
    }

    fn send_all_trees(
        &mut self,
        ltree: &HuffmanTree,
        dtree: &HuffmanTree,
        bl_tree: &HuffmanTree,
        max_blindex: usize,
    ) {
        let lcodes = ltree.max_code + 1;
        let dcodes = dtree.max_code + 1;
        let blcodes = max_blindex + 1;

        self.writer.write_bits((lcodes - 257) as u32, 5);
        self.writer.write_bits((dcodes - 1) as u32, 5);
        self.writer.write_bits((blcodes - 4) as u32, 4);
        for &symbol in &CL_CODE_ORDER[..blcodes] {
            self.writer.write_bits(bl_tree.lengths[symbol] as u32, 3);
        }

        let writer = &mut self.writer;
        for tree in [ltree, dtree] {
            rle_code_lengths(&tree.lengths[..=tree.max_code], |symbol, extra, extra_bits| {
                let code = bl_tree.code(symbol);
                writer.write_code(code.code, code.len);
                if extra_bits > 0 {
                    writer.write_bits(extra, extra_bits);
                }
            });
        }
    }

    fn compress_block(&mut self, lit: &[Code], dist: &[Code]) {
        let tables = static_tables();
        let writer = &mut self.writer;

        for symbol in &self.symbols {
            if symbol.dist == 0 {
                let code = lit[symbol.lc as usize];
                writer.write_code(code.code, code.len);
                continue;
            }

            let length = symbol.lc as usize + 3;
            let lcode = tables.length_symbol(length);
            let code = lit[lcode + LITERALS + 1];
            writer.write_code(code.code, code.len);
            let extra = LENGTH_EXTRA_BITS[lcode] as u32;
            if extra > 0 {
                writer.write_bits((length - LENGTH_BASE[lcode] as usize) as u32, extra);
            }

            let distance = symbol.dist as usize;
            let dcode = tables.distance_symbol(distance);
            let code = dist[dcode];
            writer.write_code(code.code, code.len);
            let extra = DISTANCE_EXTRA_BITS[dcode] as u32;
            if extra > 0 {
                writer.write_bits((distance - DISTANCE_BASE[dcode] as usize) as u32, extra);
            }
        }

        let eob = lit[END_BLOCK];
        writer.write_code(eob.code, eob.len);
    }
}

fn codes_of(tree: &HuffmanTree) -> Vec<Code> {
    (0..tree.lengths.len()).map(|n| tree.code(n)).collect()
}

fn bl_frequencies(ltree: &HuffmanTree, dtree: &HuffmanTree) -> [u32; BL_CODES] {
    let mut freq = [0u32; BL_CODES];
    for tree in [ltree, dtree] {
        rle_code_lengths(&tree.lengths[..=tree.max_code], |symbol, _, _| {
            freq[symbol] += 1;
        });
    }
    freq
}

/// Run-length code a sequence of code lengths with symbols 16, 17 and 18.
///
/// Calls `emit(symbol, extra_value, extra_bits)` per output token. Used
/// both to count bit-length frequencies and to transmit the lengths, so the
/// two always agree.
pub fn rle_code_lengths(lengths: &[u8], mut emit: impl FnMut(usize, u32, u32)) {
    let mut prevlen: Option<u8> = None;
    let mut count = 0usize;
    let (mut max_count, mut min_count) = match lengths.first() {
        Some(0) => (138, 3),
        _ => (7, 4),
    };

    for (n, &curlen) in lengths.iter().enumerate() {
        let next = lengths.get(n + 1).copied();
        count += 1;

        if count < max_count && next == Some(curlen) {
            continue;
        } else if count < min_count {
            for _ in 0..count {
                emit(curlen as usize, 0, 0);
            }
        } else if curlen != 0 {
            if prevlen != Some(curlen) {
                emit(curlen as usize, 0, 0);
                count -= 1;
            }
            emit(REP_3_6, (count - 3) as u32, 2);
        } else if count <= 10 {
            emit(REPZ_3_10, (count - 3) as u32, 3);
        } else {
            emit(REPZ_11_138, (count - 11) as u32, 7);
        }

        count = 0;
        prevlen = Some(curlen);
        (max_count, min_count) = if next == Some(0) {
            (138, 3)
        } else if next == Some(curlen) {
            (6, 3)
        } else {
            (7, 4)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(tokens: &[(usize, u32, u32)]) -> Vec<u8> {
        let mut out = Vec::new();
        for &(symbol, extra, _) in tokens {
            match symbol {
                REP_3_6 => {
                    let last = *out.last().unwrap();
                    out.extend(std::iter::repeat(last).take(3 + extra as usize));
                }
                REPZ_3_10 => out.extend(std::iter::repeat(0).take(3 + extra as usize)),
                REPZ_11_138 => out.extend(std::iter::repeat(0).take(11 + extra as usize)),
                len => out.push(len as u8),
            }
        }
        out
    }

    fn tokens(lengths: &[u8]) -> Vec<(usize, u32, u32)> {
        let mut out = Vec::new();
        rle_code_lengths(lengths, |s, e, b| out.push((s, e, b)));
        out
    }

    #[test]
    fn test_rle_round_trips() {
        let cases: Vec<Vec<u8>> = vec![
            vec![8; 144],
            vec![0; 200],
            vec![5, 5, 5, 5, 5, 5, 5, 5, 0, 0, 3, 0, 0, 0, 7],
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            (0..286).map(|i| (i % 4) as u8 * 3).collect(),
        ];
        for lengths in cases {
            assert_eq!(expand(&tokens(&lengths)), lengths);
        }
    }

    #[test]
    fn test_rle_uses_repeat_codes() {
        let t = tokens(&[0; 138]);
        assert_eq!(t, vec![(REPZ_11_138, 127, 7)]);

        let t = tokens(&[4; 7]);
        assert_eq!(t, vec![(4, 0, 0), (REP_3_6, 3, 2)]);

        let t = tokens(&[0, 0]);
        assert_eq!(t, vec![(0, 0, 0), (0, 0, 0)]);
    }

    #[test]
    fn test_sync_marker_bytes() {
        let mut encoder = BlockEncoder::new(8);
        encoder.sync_marker();
        assert_eq!(encoder.writer.finish(), vec![0x00, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_stored_choice_for_incompressible_block() {
        let mut encoder = BlockEncoder::new(8);
        let bytes: Vec<u8> = (0..=255u8).collect();
        for &b in &bytes {
            encoder.tally_lit(b);
        }
        encoder.flush_block(Some(&bytes), bytes.len(), true, 6);
        let out = encoder.writer.finish();
        assert_eq!(out.len(), 1 + 4 + 256);
        assert_eq!(out[0], 0x01);
        assert_eq!(&out[1..5], &[0x00, 0x01, 0xFF, 0xFE]);
    }

    #[test]
    fn test_fixed_choice_for_tiny_block() {
        let mut encoder = BlockEncoder::new(8);
        encoder.tally_lit(b'a');
        encoder.flush_block(None, 1, true, 6);
        let blocks = encoder.blocks();
        let out = encoder.writer.finish();
        // BFINAL=1, BTYPE=01, 'a' (8 bits), end-of-block (7 bits).
        assert_eq!(out.len(), 3);
        assert_eq!(out[0] & 0b111, 0b011);
        assert_eq!(blocks, 1);
    }

    #[test]
    fn test_level_zero_forces_stored() {
        let mut encoder = BlockEncoder::new(8);
        encoder.flush_block(Some(b"abc"), 3, false, 0);
        let out = encoder.writer.finish();
        assert_eq!(out, vec![0x00, 0x03, 0x00, 0xFC, 0xFF, b'a', b'b', b'c']);
    }

    #[test]
    fn test_max_stored_block() {
        // Capped by the pending buffer (4 * lit_bufsize) less the header.
        assert_eq!(BlockEncoder::new(8).max_stored_block(), 65531);
        assert_eq!(BlockEncoder::new(9).max_stored_block(), MAX_STORED);
        assert_eq!(BlockEncoder::new(1).max_stored_block(), 507);
    }
}
