//! Compression-side sliding window and hash-chain match finder.

use crate::adler32::Adler32;
use crate::bits::InputCursor;

/// Shortest match worth encoding.
pub const MIN_MATCH: usize = 3;

/// Longest encodable match.
pub const MAX_MATCH: usize = 258;

/// Lookahead needed so that a full match can always be compared.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Length-3 matches farther back than this are not worth a distance code.
pub const TOO_FAR: usize = 4096;

/// Which compression loop a level runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stored blocks only.
    Stored,
    /// Greedy matching; `max_lazy` bounds hash insertion for matched bytes.
    Fast,
    /// Lazy matching.
    Slow,
}

/// Tuning knobs for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    /// Quarter the chain search once the previous match is this long.
    pub good_length: usize,
    /// Lazy: skip the search when the previous match is this long.
    /// Fast: insert every position of matches up to this length.
    pub max_lazy: usize,
    /// Stop searching once a match this long is found.
    pub nice_length: usize,
    /// Maximum hash-chain entries examined.
    pub max_chain: usize,
    /// Compression loop.
    pub mode: Mode,
}

const fn params(
    good_length: usize,
    max_lazy: usize,
    nice_length: usize,
    max_chain: usize,
    mode: Mode,
) -> LevelParams {
    LevelParams {
        good_length,
        max_lazy,
        nice_length,
        max_chain,
        mode,
    }
}

/// Per-level parameters, indexed by level 0..=9.
pub const LEVELS: [LevelParams; 10] = [
    params(0, 0, 0, 0, Mode::Stored),
    params(4, 4, 8, 4, Mode::Fast),
    params(4, 5, 16, 8, Mode::Fast),
    params(4, 6, 32, 32, Mode::Fast),
    params(4, 4, 16, 16, Mode::Slow),
    params(8, 16, 32, 32, Mode::Slow),
    params(8, 16, 128, 128, Mode::Slow),
    params(8, 32, 128, 256, Mode::Slow),
    params(32, 128, 258, 1024, Mode::Slow),
    params(32, 258, 258, 4096, Mode::Slow),
];

/// Sliding window over the input with hash chains of 3-byte prefixes.
///
/// The buffer holds two window sizes. Positions in `head` and `prev` are
/// buffer offsets; 0 doubles as the empty marker.
pub struct Window {
    buf: Vec<u8>,
    w_size: usize,
    w_mask: usize,
    head: Vec<u16>,
    prev: Vec<u16>,
    hash_mask: usize,
    hash_shift: u32,
    ins_h: usize,

    /// Start of the string to insert next.
    pub strstart: usize,
    /// Start of the current block; negative once slid out of the buffer.
    pub block_start: isize,
    /// Start of the longest match found.
    pub match_start: usize,
    /// Valid bytes ahead of `strstart`.
    pub lookahead: usize,
    /// Bytes before `strstart` still to be hashed once more input arrives.
    pub insert: usize,

    /// Length of the current match.
    pub match_length: usize,
    /// Length of the match held back by lazy evaluation.
    pub prev_length: usize,
    /// Start of the held-back match.
    pub prev_match: usize,
    /// A literal at `strstart - 1` is still pending (lazy mode).
    pub match_available: bool,
}

impl Window {
    /// Allocate a window of `1 << window_bits` bytes and a hash table of
    /// `1 << (mem_level + 7)` heads.
    pub fn new(window_bits: u8, mem_level: u8) -> Self {
        let w_size = 1usize << window_bits;
        let hash_bits = mem_level as u32 + 7;
        let hash_size = 1usize << hash_bits;

        let mut window = Self {
            buf: vec![0; 2 * w_size],
            w_size,
            w_mask: w_size - 1,
            head: vec![0; hash_size],
            prev: vec![0; w_size],
            hash_mask: hash_size - 1,
            hash_shift: hash_bits.div_ceil(3),
            ins_h: 0,
            strstart: 0,
            block_start: 0,
            match_start: 0,
            lookahead: 0,
            insert: 0,
            match_length: 0,
            prev_length: 0,
            prev_match: 0,
            match_available: false,
        };
        window.reset();
        window
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.clear_hash();
        self.strstart = 0;
        self.block_start = 0;
        self.lookahead = 0;
        self.insert = 0;
        self.match_length = MIN_MATCH - 1;
        self.prev_length = MIN_MATCH - 1;
        self.match_available = false;
        self.match_start = 0;
        self.prev_match = 0;
        self.ins_h = 0;
    }

    /// Drop every hash chain.
    pub fn clear_hash(&mut self) {
        self.head.fill(0);
    }

    /// Release the buffers.
    pub fn release(&mut self) {
        self.buf = Vec::new();
        self.head = Vec::new();
        self.prev = Vec::new();
    }

    /// Window size in bytes.
    #[inline]
    pub fn w_size(&self) -> usize {
        self.w_size
    }

    /// Farthest distance a match may reach.
    #[inline]
    pub fn max_dist(&self) -> usize {
        self.w_size - MIN_LOOKAHEAD
    }

    /// Byte at a buffer offset.
    #[inline]
    pub fn byte(&self, pos: usize) -> u8 {
        self.buf[pos]
    }

    /// Bytes of the current block, if they are still in the buffer.
    pub fn block_bytes(&self) -> Option<&[u8]> {
        if self.block_start >= 0 {
            Some(&self.buf[self.block_start as usize..self.strstart])
        } else {
            None
        }
    }

    /// Bytes in the current block so far.
    #[inline]
    pub fn block_len(&self) -> usize {
        (self.strstart as isize - self.block_start) as usize
    }

    #[inline]
    fn update_hash(&self, h: usize, c: u8) -> usize {
        ((h << self.hash_shift) ^ c as usize) & self.hash_mask
    }

    /// Restart the rolling hash at `pos` from its first two bytes.
    #[inline]
    pub fn seed_hash(&mut self, pos: usize) {
        self.ins_h = self.update_hash(self.buf[pos] as usize, self.buf[pos + 1]);
    }

    /// Insert the string at `pos` and return the previous head of its chain.
    #[inline]
    pub fn insert_string(&mut self, pos: usize) -> usize {
        self.ins_h = self.update_hash(self.ins_h, self.buf[pos + MIN_MATCH - 1]);
        let head = self.head[self.ins_h];
        self.prev[pos & self.w_mask] = head;
        self.head[self.ins_h] = pos as u16;
        head as usize
    }

    /// Rebase every position after the upper half moved down.
    fn slide_hash(&mut self) {
        let w_size = self.w_size;
        for entry in self.head.iter_mut().chain(self.prev.iter_mut()) {
            let pos = *entry as usize;
            *entry = if pos >= w_size {
                (pos - w_size) as u16
            } else {
                0
            };
        }
    }

    /// Read input until the lookahead is full or the input runs dry,
    /// sliding the window first when `strstart` nears the end.
    ///
    /// Bytes read are added to `adler` when one is given.
    pub fn fill_window(&mut self, input: &mut InputCursor<'_>, mut adler: Option<&mut Adler32>) {
        let window_size = 2 * self.w_size;
        loop {
            let mut more = window_size - self.lookahead - self.strstart;

            if self.strstart >= self.w_size + self.max_dist() {
                self.buf.copy_within(self.w_size..window_size, 0);
                self.match_start = self.match_start.saturating_sub(self.w_size);
                self.strstart -= self.w_size;
                self.block_start -= self.w_size as isize;
                if self.insert > self.strstart {
                    self.insert = self.strstart;
                }
                self.slide_hash();
                more += self.w_size;
            }

            if input.remaining() == 0 {
                break;
            }

            let start = self.strstart + self.lookahead;
            let chunk = input.take(more);
            self.buf[start..start + chunk.len()].copy_from_slice(chunk);
            if let Some(adler) = adler.as_deref_mut() {
                adler.update(chunk);
            }
            self.lookahead += chunk.len();

            // Hash the bytes left over from before this input arrived.
            if self.lookahead + self.insert >= MIN_MATCH {
                let mut pos = self.strstart - self.insert;
                self.seed_hash(pos);
                while self.insert > 0 {
                    self.insert_string(pos);
                    pos += 1;
                    self.insert -= 1;
                    if self.lookahead + self.insert < MIN_MATCH {
                        break;
                    }
                }
            }

            if self.lookahead >= MIN_LOOKAHEAD || input.remaining() == 0 {
                break;
            }
        }
    }

    /// Load a preset dictionary into the window and hash chains.
    ///
    /// Only the last window's worth of a longer dictionary is kept.
    pub fn load_dictionary(&mut self, dictionary: &[u8]) {
        let dictionary = if dictionary.len() >= self.w_size {
            self.reset();
            &dictionary[dictionary.len() - self.w_size..]
        } else {
            dictionary
        };

        let mut input = InputCursor::new(dictionary);
        self.fill_window(&mut input, None);
        while self.lookahead >= MIN_MATCH {
            let mut pos = self.strstart;
            for _ in 0..self.lookahead - (MIN_MATCH - 1) {
                self.insert_string(pos);
                pos += 1;
            }
            self.strstart = pos;
            self.lookahead = MIN_MATCH - 1;
            self.fill_window(&mut input, None);
        }
        self.strstart += self.lookahead;
        self.block_start = self.strstart as isize;
        self.insert = self.lookahead;
        self.lookahead = 0;
        self.match_length = MIN_MATCH - 1;
        self.prev_length = MIN_MATCH - 1;
        self.match_available = false;
    }

    /// Follow the hash chain from `cur_match` for the longest match at
    /// `strstart`. Sets `match_start` and returns the length, which never
    /// exceeds the lookahead.
    pub fn longest_match(&mut self, mut cur_match: usize, params: &LevelParams) -> usize {
        let mut chain_length = params.max_chain;
        let scan = self.strstart;
        let mut best_len = self.prev_length;
        let mut nice_match = params.nice_length;
        let limit = self.strstart.saturating_sub(self.max_dist());

        if self.prev_length >= params.good_length {
            chain_length >>= 2;
        }
        if nice_match > self.lookahead {
            nice_match = self.lookahead;
        }

        let buf = &self.buf;
        loop {
            let m = cur_match;
            if buf[m + best_len] == buf[scan + best_len]
                && buf[m + best_len - 1] == buf[scan + best_len - 1]
                && buf[m] == buf[scan]
                && buf[m + 1] == buf[scan + 1]
            {
                let len = 2 + buf[scan + 2..scan + MAX_MATCH]
                    .iter()
                    .zip(&buf[m + 2..m + MAX_MATCH])
                    .take_while(|(a, b)| a == b)
                    .count();

                if len > best_len {
                    self.match_start = cur_match;
                    best_len = len;
                    if len >= nice_match {
                        break;
                    }
                }
            }

            cur_match = self.prev[cur_match & self.w_mask] as usize;
            chain_length = chain_length.saturating_sub(1);
            if cur_match <= limit || chain_length == 0 {
                break;
            }
        }

        best_len.min(self.lookahead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primed(data: &[u8]) -> Window {
        let mut window = Window::new(15, 8);
        let mut input = InputCursor::new(data);
        window.fill_window(&mut input, None);
        window
    }

    #[test]
    fn test_level_table() {
        assert_eq!(LEVELS[0].mode, Mode::Stored);
        assert_eq!(LEVELS[3].mode, Mode::Fast);
        assert_eq!(LEVELS[4].mode, Mode::Slow);
        assert_eq!(LEVELS[6].max_chain, 128);
        assert_eq!(LEVELS[9].nice_length, MAX_MATCH);
    }

    #[test]
    fn test_fill_window_reads_and_checksums() {
        let data = vec![7u8; 1000];
        let mut window = Window::new(15, 8);
        let mut adler = Adler32::new();
        let mut input = InputCursor::new(&data);
        window.fill_window(&mut input, Some(&mut adler));
        assert_eq!(window.lookahead, 1000);
        assert_eq!(input.remaining(), 0);
        assert_eq!(adler.checksum(), crate::adler32::adler32(1, &data));
    }

    #[test]
    fn test_longest_match_finds_repeat() {
        let mut data = b"abcdefgh".to_vec();
        data.extend_from_slice(b"abcdefgh");
        data.extend_from_slice(&[0u8; 300]);
        let mut window = primed(&data);

        for pos in 0..8 {
            window.seed_hash(pos);
            window.insert_string(pos);
        }
        window.strstart = 8;
        window.lookahead = data.len() - 8;
        window.seed_hash(8);
        let head = window.insert_string(8);
        assert_eq!(head, 0);

        // Position 0 reads as empty; a match at 1 is still found.
        window.strstart = 9;
        window.lookahead = data.len() - 9;
        window.seed_hash(9);
        let head = window.insert_string(9);
        assert_eq!(head, 1);
        let len = window.longest_match(head, &LEVELS[6]);
        assert_eq!(len, 7);
        assert_eq!(window.match_start, 1);
    }

    #[test]
    fn test_match_capped_by_lookahead() {
        let data = vec![b'z'; 40];
        let mut window = primed(&data);
        window.seed_hash(1);
        window.insert_string(1);
        window.strstart = 2;
        window.lookahead = 10;
        window.seed_hash(2);
        let head = window.insert_string(2);
        assert_eq!(head, 1);
        assert_eq!(window.longest_match(head, &LEVELS[9]), 10);
    }

    #[test]
    fn test_slide_rebases_positions() {
        let mut window = Window::new(9, 1);
        let data: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
        let mut input = InputCursor::new(&data);

        window.fill_window(&mut input, None);
        assert_eq!(window.lookahead, 1024);
        window.strstart = window.w_size() + window.max_dist();
        window.lookahead = 1024 - window.strstart;
        window.fill_window(&mut input, None);

        assert_eq!(window.strstart, window.max_dist());
        assert!(window.block_start < 0);
        assert!(window.block_bytes().is_none());
        assert_eq!(window.byte(window.strstart), data[window.w_size() + window.max_dist()]);
    }

    #[test]
    fn test_dictionary_load_sets_block_start() {
        let mut window = Window::new(15, 8);
        window.load_dictionary(b"hello dictionary");
        assert_eq!(window.strstart, 16);
        assert_eq!(window.block_start, 16);
        assert_eq!(window.lookahead, 0);
        assert_eq!(window.insert, 2);
    }
}
