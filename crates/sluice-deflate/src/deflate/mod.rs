//! DEFLATE compression (RFC 1951), optionally zlib-wrapped (RFC 1950).
//!
//! [`Deflater`] is a re-entrant state machine over caller-owned buffers:
//! each call consumes what input it can, writes what output fits, and keeps
//! every partial result (window, tallies, pending bits) for the next call.

pub mod block;
pub mod window;

use sluice_core::{
    Algorithm, CompressionLevel, CompressionStats, DictionaryCompressor, Error, Flush, Outcome,
    Result, Status, StreamConfig, StreamState, StreamingCompressor,
};
use tracing::{debug, warn};

use crate::adler32::{adler32, Adler32};
use crate::bits::{BitWriter, InputCursor};
use crate::config::{DeflateConfig, Format, Strategy, DEFAULT_MEM_LEVEL, MAX_WINDOW_BITS};
use crate::zlib;

use self::block::BlockEncoder;
use self::window::{LevelParams, Mode, Window, LEVELS, MIN_LOOKAHEAD, MIN_MATCH, TOO_FAR};

/// Where a compression loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    /// Out of input or output; call again.
    NeedMore,
    /// The flush completed a block.
    BlockDone,
    /// The final block was started but output filled up.
    FinishStarted,
    /// The final block is complete.
    FinishDone,
}

/// The caller's output slice and how much of it is written.
struct Sink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Sink<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn drain(&mut self, writer: &mut BitWriter) {
        self.pos += writer.drain_into(&mut self.buf[self.pos..]);
    }
}

/// Streaming DEFLATE compressor.
pub struct Deflater {
    config: DeflateConfig,
    level: u8,
    params: LevelParams,
    window: Window,
    block: BlockEncoder,
    state: StreamState,
    /// Rank of the previous flush; `None` after a call that filled the
    /// output, so the same flush may be repeated.
    last_flush: Option<u8>,
    adler: Adler32,
    dict_id: Option<u32>,
    trailer_written: bool,
    total_in: u64,
    total_out: u64,
    last_message: Option<String>,
}

impl std::fmt::Debug for Deflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deflater")
            .field("level", &self.level)
            .field("format", &self.config.format)
            .field("state", &self.state)
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish()
    }
}

impl Deflater {
    /// Create a compressor; all buffers are allocated here.
    pub fn new(config: DeflateConfig) -> Result<Self> {
        let level = config.validate()?;
        let window_bits = config.effective_window_bits();

        debug!(
            level,
            window_bits,
            mem_level = config.mem_level,
            format = ?config.format,
            strategy = ?config.strategy,
            "deflate stream initialized"
        );

        Ok(Self {
            level,
            params: LEVELS[level as usize],
            window: Window::new(window_bits, config.mem_level),
            block: BlockEncoder::new(config.mem_level),
            state: StreamState::Initial,
            last_flush: Some(Flush::None.rank()),
            adler: Adler32::new(),
            dict_id: None,
            trailer_written: false,
            total_in: 0,
            total_out: 0,
            last_message: None,
            config,
        })
    }

    /// Zlib-wrapped compressor at the given level.
    pub fn zlib(level: CompressionLevel) -> Result<Self> {
        Self::new(DeflateConfig::with_level(level))
    }

    /// Raw deflate compressor at the given level.
    pub fn raw(level: CompressionLevel) -> Result<Self> {
        Self::new(DeflateConfig::with_level(level).raw())
    }

    /// Configuration in effect.
    pub fn config(&self) -> &DeflateConfig {
        &self.config
    }

    /// Upper bound on the output for `len` more input bytes.
    pub fn bound(&self, len: usize) -> usize {
        deflate_bound(&self.config, len)
    }

    /// Input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Output bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Running Adler-32 of the input (zlib format), or of the dictionary
    /// right after [`set_dictionary`](Self::set_dictionary).
    pub fn adler(&self) -> u32 {
        self.dict_id
            .filter(|_| self.state == StreamState::Initial)
            .unwrap_or_else(|| self.adler.checksum())
    }

    /// Diagnostic for the most recent error.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!(error = %err, "deflate stream error");
        self.last_message = Some(err.to_string());
        err
    }

    fn misuse(&mut self, message: &str) -> Error {
        let err = self.fail(Error::stream(message));
        self.state = StreamState::Error;
        err
    }

    /// Compress `input` into `output`.
    ///
    /// Returns how much of each was used. `Status::StreamEnd` is reported
    /// once a `Flush::Finish` call has written the last byte of the stream.
    pub fn compress(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Outcome> {
        match self.state {
            StreamState::Ended => {
                return Err(self.fail(Error::InvalidState {
                    expected: "active",
                    actual: "ended",
                }))
            }
            StreamState::Error => return Err(self.fail(Error::stream("deflate stream failed"))),
            StreamState::Finished | StreamState::Finishing => {
                if !input.is_empty() {
                    return Err(self.misuse("input after finish"));
                }
                if flush != Flush::Finish {
                    return Err(self.misuse("flush after finish must be Finish"));
                }
                if self.state == StreamState::Finished {
                    return Ok(Outcome::new(0, 0, Status::StreamEnd));
                }
            }
            _ => {}
        }

        if output.is_empty() {
            return Ok(Outcome::new(0, 0, Status::BufError));
        }

        let mut cursor = InputCursor::new(input);
        let mut sink = Sink::new(output);
        let status = self.run(&mut cursor, &mut sink, flush);

        let consumed = cursor.position();
        let produced = sink.pos;
        self.total_in += consumed as u64;
        self.total_out += produced as u64;
        Ok(Outcome::new(consumed, produced, status))
    }

    fn run(&mut self, input: &mut InputCursor<'_>, sink: &mut Sink<'_>, flush: Flush) -> Status {
        let old_flush = self.last_flush;
        self.last_flush = Some(flush.rank());

        if self.state == StreamState::Initial {
            if self.config.format == Format::Zlib {
                let header = zlib::header(
                    self.config.effective_window_bits(),
                    self.level_flags(),
                    self.dict_id.is_some(),
                );
                self.block.writer.write_u16_be(header);
                if let Some(dict_id) = self.dict_id {
                    self.block.writer.write_u32_be(dict_id);
                }
            }
            self.state = StreamState::Active;
        }

        if self.block.writer.pending_len() != 0 {
            sink.drain(&mut self.block.writer);
            if sink.is_full() {
                self.last_flush = None;
                return Status::Ok;
            }
        } else if input.remaining() == 0
            && old_flush.is_some_and(|old| flush.rank() <= old)
            && flush != Flush::Finish
        {
            return Status::BufError;
        }

        let finishing = self.state == StreamState::Finishing;
        if input.remaining() != 0 || self.window.lookahead != 0 || (flush != Flush::None && !finishing)
        {
            let bstate = if self.level == 0 {
                self.deflate_stored(input, sink, flush)
            } else if self.config.strategy == Strategy::HuffmanOnly {
                self.deflate_huff(input, sink, flush)
            } else {
                match self.params.mode {
                    Mode::Fast => self.deflate_fast(input, sink, flush),
                    _ => self.deflate_slow(input, sink, flush),
                }
            };

            if matches!(bstate, BlockState::FinishStarted | BlockState::FinishDone) {
                self.state = StreamState::Finishing;
            }
            if matches!(bstate, BlockState::NeedMore | BlockState::FinishStarted) {
                if sink.is_full() {
                    self.last_flush = None;
                }
                return Status::Ok;
            }
            if bstate == BlockState::BlockDone {
                match flush {
                    Flush::Partial => self.block.align(),
                    Flush::Block => {}
                    _ => {
                        self.block.sync_marker();
                        if flush == Flush::Full {
                            self.window.clear_hash();
                            if self.window.lookahead == 0 {
                                self.window.strstart = 0;
                                self.window.block_start = 0;
                                self.window.insert = 0;
                            }
                        }
                    }
                }
                sink.drain(&mut self.block.writer);
                if sink.is_full() {
                    self.last_flush = None;
                    return Status::Ok;
                }
            }
        }

        if flush != Flush::Finish {
            return Status::Ok;
        }

        if self.config.format == Format::Zlib && !self.trailer_written {
            self.block.writer.write_u32_be(self.adler.checksum());
            self.trailer_written = true;
        }
        sink.drain(&mut self.block.writer);
        if self.block.writer.pending_len() != 0 {
            return Status::Ok;
        }

        self.state = StreamState::Finished;
        debug!(
            total_in = self.total_in + input.position() as u64,
            total_out = self.total_out + sink.pos as u64,
            blocks = self.block.blocks(),
            "deflate stream finished"
        );
        Status::StreamEnd
    }

    /// Level hint for the zlib header (FLEVEL).
    fn level_flags(&self) -> u8 {
        if self.config.strategy == Strategy::HuffmanOnly || self.level < 2 {
            0
        } else if self.level < 6 {
            1
        } else if self.level == 6 {
            2
        } else {
            3
        }
    }

    fn fill_window(&mut self, input: &mut InputCursor<'_>) {
        let adler = match self.config.format {
            Format::Zlib => Some(&mut self.adler),
            Format::Raw => None,
        };
        self.window.fill_window(input, adler);
    }

    /// Emit the current block and hand as much output as fits to the caller.
    fn flush_block(&mut self, sink: &mut Sink<'_>, last: bool) {
        let stored_len = self.window.block_len();
        self.block
            .flush_block(self.window.block_bytes(), stored_len, last, self.level);
        self.window.block_start = self.window.strstart as isize;
        sink.drain(&mut self.block.writer);
    }

    /// Store input without compression, in blocks as large as allowed.
    fn deflate_stored(&mut self, input: &mut InputCursor<'_>, sink: &mut Sink<'_>, flush: Flush) -> BlockState {
        let max_block_size = self.block.max_stored_block();

        loop {
            if self.window.lookahead <= 1 {
                self.fill_window(input);
                if self.window.lookahead == 0 {
                    if flush == Flush::None {
                        return BlockState::NeedMore;
                    }
                    break;
                }
            }

            self.window.strstart += self.window.lookahead;
            self.window.lookahead = 0;

            let max_start = self.window.block_start as usize + max_block_size;
            if self.window.strstart >= max_start {
                self.window.lookahead = self.window.strstart - max_start;
                self.window.strstart = max_start;
                self.flush_block(sink, false);
                if sink.is_full() {
                    return BlockState::NeedMore;
                }
            }

            // Flush before the block slides out of the window.
            if self.window.block_len() >= self.window.max_dist() {
                self.flush_block(sink, false);
                if sink.is_full() {
                    return BlockState::NeedMore;
                }
            }
        }

        self.window.insert = 0;
        if flush == Flush::Finish {
            return self.finish_block(sink);
        }
        if self.window.block_len() > 0 {
            self.flush_block(sink, false);
            if sink.is_full() {
                return BlockState::NeedMore;
            }
        }
        BlockState::BlockDone
    }

    /// Greedy matching for the fast levels.
    fn deflate_fast(&mut self, input: &mut InputCursor<'_>, sink: &mut Sink<'_>, flush: Flush) -> BlockState {
        loop {
            if self.window.lookahead < MIN_LOOKAHEAD {
                self.fill_window(input);
                if self.window.lookahead < MIN_LOOKAHEAD && flush == Flush::None {
                    return BlockState::NeedMore;
                }
                if self.window.lookahead == 0 {
                    break;
                }
            }

            let mut hash_head = 0;
            if self.window.lookahead >= MIN_MATCH {
                hash_head = self.window.insert_string(self.window.strstart);
            }

            if hash_head != 0 && self.window.strstart - hash_head <= self.window.max_dist() {
                self.window.match_length = self.window.longest_match(hash_head, &self.params);
            }

            let bflush;
            if self.window.match_length >= MIN_MATCH {
                let window = &mut self.window;
                bflush = self
                    .block
                    .tally_dist(window.strstart - window.match_start, window.match_length);
                window.lookahead -= window.match_length;

                if window.match_length <= self.params.max_lazy && window.lookahead >= MIN_MATCH {
                    window.match_length -= 1;
                    while window.match_length != 0 {
                        window.strstart += 1;
                        window.insert_string(window.strstart);
                        window.match_length -= 1;
                    }
                    window.strstart += 1;
                } else {
                    window.strstart += window.match_length;
                    window.match_length = 0;
                    window.seed_hash(window.strstart);
                }
            } else {
                bflush = self.block.tally_lit(self.window.byte(self.window.strstart));
                self.window.lookahead -= 1;
                self.window.strstart += 1;
            }

            if bflush {
                self.flush_block(sink, false);
                if sink.is_full() {
                    return BlockState::NeedMore;
                }
            }
        }

        self.window.insert = self.window.strstart.min(MIN_MATCH - 1);
        self.end_of_input(sink, flush)
    }

    /// Lazy matching: a match is kept only if the next position does not
    /// start a longer one.
    fn deflate_slow(&mut self, input: &mut InputCursor<'_>, sink: &mut Sink<'_>, flush: Flush) -> BlockState {
        loop {
            if self.window.lookahead < MIN_LOOKAHEAD {
                self.fill_window(input);
                if self.window.lookahead < MIN_LOOKAHEAD && flush == Flush::None {
                    return BlockState::NeedMore;
                }
                if self.window.lookahead == 0 {
                    break;
                }
            }

            let mut hash_head = 0;
            if self.window.lookahead >= MIN_MATCH {
                hash_head = self.window.insert_string(self.window.strstart);
            }

            let window = &mut self.window;
            window.prev_length = window.match_length;
            window.prev_match = window.match_start;
            window.match_length = MIN_MATCH - 1;

            if hash_head != 0
                && window.prev_length < self.params.max_lazy
                && window.strstart - hash_head <= window.max_dist()
            {
                window.match_length = window.longest_match(hash_head, &self.params);

                if window.match_length <= 5
                    && (self.config.strategy == Strategy::Filtered
                        || (window.match_length == MIN_MATCH
                            && window.strstart - window.match_start > TOO_FAR))
                {
                    window.match_length = MIN_MATCH - 1;
                }
            }

            if window.prev_length >= MIN_MATCH && window.match_length <= window.prev_length {
                let max_insert = window.strstart + window.lookahead - MIN_MATCH;
                let bflush = self
                    .block
                    .tally_dist(window.strstart - 1 - window.prev_match, window.prev_length);

                // The match covers prev_length bytes starting one back;
                // strstart-1 and strstart are already hashed.
                window.lookahead -= window.prev_length - 1;
                window.prev_length -= 2;
                while window.prev_length != 0 {
                    window.strstart += 1;
                    if window.strstart <= max_insert {
                        window.insert_string(window.strstart);
                    }
                    window.prev_length -= 1;
                }
                window.match_available = false;
                window.match_length = MIN_MATCH - 1;
                window.strstart += 1;

                if bflush {
                    self.flush_block(sink, false);
                    if sink.is_full() {
                        return BlockState::NeedMore;
                    }
                }
            } else if window.match_available {
                let bflush = self.block.tally_lit(window.byte(window.strstart - 1));
                if bflush {
                    self.flush_block(sink, false);
                }
                self.window.strstart += 1;
                self.window.lookahead -= 1;
                if sink.is_full() {
                    return BlockState::NeedMore;
                }
            } else {
                window.match_available = true;
                window.strstart += 1;
                window.lookahead -= 1;
            }
        }

        if self.window.match_available {
            self.block.tally_lit(self.window.byte(self.window.strstart - 1));
            self.window.match_available = false;
        }
        self.window.insert = self.window.strstart.min(MIN_MATCH - 1);
        self.end_of_input(sink, flush)
    }

    /// Literals only.
    fn deflate_huff(&mut self, input: &mut InputCursor<'_>, sink: &mut Sink<'_>, flush: Flush) -> BlockState {
        loop {
            if self.window.lookahead == 0 {
                self.fill_window(input);
                if self.window.lookahead == 0 {
                    if flush == Flush::None {
                        return BlockState::NeedMore;
                    }
                    break;
                }
            }

            self.window.match_length = 0;
            let bflush = self.block.tally_lit(self.window.byte(self.window.strstart));
            self.window.lookahead -= 1;
            self.window.strstart += 1;
            if bflush {
                self.flush_block(sink, false);
                if sink.is_full() {
                    return BlockState::NeedMore;
                }
            }
        }

        self.window.insert = 0;
        self.end_of_input(sink, flush)
    }

    /// Common tail of the matching loops once input is exhausted under a flush.
    fn end_of_input(&mut self, sink: &mut Sink<'_>, flush: Flush) -> BlockState {
        if flush == Flush::Finish {
            return self.finish_block(sink);
        }
        if !self.block.is_empty() {
            self.flush_block(sink, false);
            if sink.is_full() {
                return BlockState::NeedMore;
            }
        }
        BlockState::BlockDone
    }

    fn finish_block(&mut self, sink: &mut Sink<'_>) -> BlockState {
        self.flush_block(sink, true);
        if sink.is_full() {
            BlockState::FinishStarted
        } else {
            BlockState::FinishDone
        }
    }

    /// Prime the window with a preset dictionary.
    ///
    /// Only allowed before the first call to [`compress`](Self::compress).
    /// For the zlib format the dictionary's Adler-32 is written as DICTID.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        if self.state != StreamState::Initial {
            return Err(self.fail(Error::InvalidState {
                expected: "initial",
                actual: self.state.name(),
            }));
        }
        if self.dict_id.is_some() {
            return Err(self.fail(Error::InvalidDictionary(
                "dictionary already set".to_string(),
            )));
        }
        if dictionary.is_empty() {
            return Ok(());
        }

        self.window.load_dictionary(dictionary);
        self.dict_id = Some(adler32(1, dictionary));
        debug!(
            len = dictionary.len(),
            dict_id = ?self.dict_id,
            "deflate dictionary applied"
        );
        Ok(())
    }

    /// Restart with the same parameters, keeping the buffers.
    pub fn reset(&mut self) {
        if self.state == StreamState::Ended {
            return;
        }
        self.window.reset();
        self.block.reset();
        self.state = StreamState::Initial;
        self.last_flush = Some(Flush::None.rank());
        self.adler = Adler32::new();
        self.dict_id = None;
        self.trailer_written = false;
        self.total_in = 0;
        self.total_out = 0;
        self.last_message = None;
        debug!("deflate stream reset");
    }

    /// Release all buffers. Every later call fails.
    pub fn end(&mut self) -> Result<()> {
        if self.state == StreamState::Ended {
            return Err(self.fail(Error::stream("deflate stream already ended")));
        }
        if !matches!(self.state, StreamState::Initial | StreamState::Finished) {
            debug!(state = self.state.name(), "deflate stream ended before finish");
        }
        self.window.release();
        self.block.release();
        self.state = StreamState::Ended;
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Totals so far.
    pub fn stats(&self) -> CompressionStats {
        CompressionStats {
            algorithm: Some(self.algorithm()),
            original_size: self.total_in as usize,
            compressed_size: self.total_out as usize,
            blocks_processed: self.block.blocks(),
            dictionary_used: self.dict_id.is_some(),
            checksum: match self.config.format {
                Format::Zlib => Some(self.adler.checksum() as u64),
                Format::Raw => None,
            },
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self.config.format {
            Format::Zlib => Algorithm::Zlib,
            Format::Raw => Algorithm::Deflate,
        }
    }
}

impl StreamingCompressor for Deflater {
    fn algorithm(&self) -> Algorithm {
        Deflater::algorithm(self)
    }

    fn compress_chunk(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Outcome> {
        self.compress(input, output, flush)
    }

    fn state(&self) -> StreamState {
        self.state
    }

    fn stats(&self) -> CompressionStats {
        Deflater::stats(self)
    }

    fn reset(&mut self) {
        Deflater::reset(self)
    }

    fn end(&mut self) -> Result<()> {
        Deflater::end(self)
    }
}

impl DictionaryCompressor for Deflater {
    fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        Deflater::set_dictionary(self, dictionary)
    }
}

fn framing(format: Format) -> usize {
    match format {
        Format::Zlib => zlib::HEADER_SIZE + zlib::TRAILER_SIZE,
        Format::Raw => 0,
    }
}

/// Upper bound on the compressed size of `len` input bytes at any level.
///
/// Assumes the default 32 KiB window and memory level 8. Smaller windows
/// or memory levels cut stored blocks shorter; use [`deflate_bound`] for
/// those.
pub fn compress_bound(len: usize, format: Format) -> usize {
    let stored_blocks = len / block::MAX_STORED + 1;
    len + (len >> 12) + (len >> 14) + (len >> 25) + 13 + 5 * stored_blocks + framing(format)
}

/// Upper bound on the compressed size of `len` input bytes under `config`.
pub fn deflate_bound(config: &DeflateConfig, len: usize) -> usize {
    if config.effective_window_bits() == MAX_WINDOW_BITS && config.mem_level == DEFAULT_MEM_LEVEL {
        return compress_bound(len, config.format);
    }
    // Stored blocks may be as short as one window less the lookahead.
    len + ((len + 7) >> 3) + ((len + 63) >> 6) + 5 + framing(config.format)
}

/// Drive a [`Deflater`] over a complete input, appending to `out`.
pub(crate) fn drive(
    deflater: &mut Deflater,
    input: &[u8],
    out: &mut Vec<u8>,
    config: &StreamConfig,
) -> Result<usize> {
    let start = out.len();
    let mut offset = 0;
    loop {
        let end = (offset + config.input_buffer_size).min(input.len());
        let flush = if end == input.len() {
            Flush::Finish
        } else {
            Flush::None
        };
        let pos = out.len();
        out.resize(pos + config.output_buffer_size, 0);
        let outcome = match deflater.compress(&input[offset..end], &mut out[pos..], flush) {
            Ok(outcome) => outcome,
            Err(err) => {
                out.truncate(pos);
                return Err(err);
            }
        };
        out.truncate(pos + outcome.produced);
        offset += outcome.consumed;

        match outcome.status {
            Status::StreamEnd => return Ok(out.len() - start),
            Status::Ok => {}
            Status::BufError | Status::NeedDictionary => {
                return Err(Error::stream("compressor made no progress"))
            }
        }
    }
}

/// Compress `input` as raw deflate data.
pub fn deflate(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut deflater = Deflater::raw(level)?;
    let mut out = Vec::with_capacity(compress_bound(input.len(), Format::Raw).min(1 << 20));
    drive(&mut deflater, input, &mut out, &StreamConfig::default())?;
    Ok(out)
}
