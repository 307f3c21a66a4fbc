//! DEFLATE decompression (RFC 1951), optionally zlib-wrapped (RFC 1950).
//!
//! [`Inflater`] decodes straight into the caller's output slice. Its
//! position in the stream is an explicit [`Mode`]; whenever input or output
//! runs out mid-field, the call returns and the next call resumes in the
//! same mode with the same partial bits.

mod fast;
pub mod history;

use sluice_core::{
    Algorithm, CompressionStats, DataError, DictionaryDecompressor, Error, Flush, Outcome, Result,
    Status, StreamConfig, StreamState, StreamingDecompressor,
};
use tracing::{debug, trace, warn};

use crate::adler32::{adler32, Adler32};
use crate::bits::{BitBuffer, InputCursor};
use crate::config::{Format, InflateConfig};
use crate::huffman::{
    fixed_decoders, CodeKind, HuffmanDecoder, BL_CODES, CL_CODE_ORDER, DISTANCE_BASE,
    DISTANCE_EXTRA_BITS, D_CODES, END_BLOCK, LENGTH_BASE, LENGTH_CODES, LENGTH_EXTRA_BITS,
};

use self::history::History;

/// Where the decoder is in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// zlib header (CMF, FLG).
    Header,
    /// Four-byte dictionary id.
    DictId,
    /// Waiting for [`Inflater::set_dictionary`].
    Dict,
    /// Block header.
    Type,
    /// Stored block lengths.
    Stored,
    /// Copying stored bytes.
    Copy,
    /// Dynamic block counts.
    Table,
    /// Bit-length code lengths.
    LenLens,
    /// Literal/length and distance code lengths.
    CodeLens,
    /// Literal/length symbol.
    Len,
    /// Length extra bits.
    LenExt,
    /// Distance symbol.
    Dist,
    /// Distance extra bits.
    DistExt,
    /// Copying a match.
    Match,
    /// Writing a literal.
    Lit,
    /// Adler-32 trailer.
    Check,
    /// Stream complete.
    Done,
    /// Corrupt stream; every later call repeats the error.
    Bad(DataError),
    /// Searching for a sync marker.
    Sync,
}

/// Decode tables for the current block.
enum CodeTables {
    Fixed,
    Dynamic {
        lit: HuffmanDecoder,
        dist: HuffmanDecoder,
    },
}

impl CodeTables {
    fn get(&self) -> (&HuffmanDecoder, &HuffmanDecoder) {
        match self {
            CodeTables::Fixed => {
                let fixed = fixed_decoders();
                (&fixed.lit, &fixed.dist)
            }
            CodeTables::Dynamic { lit, dist } => (lit, dist),
        }
    }
}

/// Peek the next symbol, pulling input bytes until it is complete.
///
/// Returns `Ok(None)` when input ran out first; nothing is consumed.
fn peek_symbol(
    bits: &mut BitBuffer,
    input: &mut InputCursor<'_>,
    table: &HuffmanDecoder,
) -> std::result::Result<Option<(u16, u32)>, DataError> {
    loop {
        let (symbol, len) = table.lookup(bits.hold());
        if len != 0 && len <= bits.bits() {
            return Ok(Some((symbol, len)));
        }
        if len == 0 && bits.bits() >= table.table_bits() {
            return Err(table.kind().code_error());
        }
        if !bits.pull_byte(input) {
            return Ok(None);
        }
    }
}

/// Copy up to `length` bytes of a match at `offset` into `out[put..]`.
///
/// The source starts in `history` when `offset` reaches past the output
/// written this call. Returns the bytes written, bounded by the space left.
fn copy_match(history: &History, out: &mut [u8], put: usize, offset: usize, length: usize) -> usize {
    let mut want = length.min(out.len() - put);
    let mut pos = put;

    if offset > put {
        let mut back = offset - put;
        while want > 0 && back > 0 {
            let run = history.tail_from(back);
            let n = run.len().min(want);
            out[pos..pos + n].copy_from_slice(&run[..n]);
            pos += n;
            want -= n;
            back -= n;
        }
    }

    // Byte by byte: source and destination may overlap.
    for i in pos..pos + want {
        out[i] = out[i - offset];
    }
    pos + want - put
}

/// Streaming DEFLATE decompressor.
pub struct Inflater {
    config: InflateConfig,
    wrap: bool,
    verify: bool,
    mode: Mode,
    /// The final block has started.
    last: bool,
    bits: BitBuffer,
    length: usize,
    offset: usize,
    extra: u32,
    nlen: usize,
    ndist: usize,
    ncode: usize,
    have: usize,
    lens: [u8; 320],
    cl_decoder: Option<HuffmanDecoder>,
    codes: CodeTables,
    history: History,
    adler: Adler32,
    dict_id: u32,
    have_dict: bool,
    sync_got: u8,
    blocks: usize,
    total_in: u64,
    total_out: u64,
    ended: bool,
    last_message: Option<String>,
}

impl std::fmt::Debug for Inflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inflater")
            .field("mode", &self.mode)
            .field("format", &self.config.format)
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish()
    }
}

impl Inflater {
    /// Create a decompressor; the history buffer is allocated here.
    pub fn new(config: InflateConfig) -> Result<Self> {
        config.validate()?;
        let window_bits = config.effective_window_bits();
        let wrap = config.format == Format::Zlib;

        debug!(window_bits, format = ?config.format, "inflate stream initialized");

        Ok(Self {
            wrap,
            verify: config.verify_checksum,
            mode: if wrap { Mode::Header } else { Mode::Type },
            last: false,
            bits: BitBuffer::new(),
            length: 0,
            offset: 0,
            extra: 0,
            nlen: 0,
            ndist: 0,
            ncode: 0,
            have: 0,
            lens: [0; 320],
            cl_decoder: None,
            codes: CodeTables::Fixed,
            history: History::new(window_bits),
            adler: Adler32::new(),
            dict_id: 0,
            have_dict: false,
            sync_got: 0,
            blocks: 0,
            total_in: 0,
            total_out: 0,
            ended: false,
            last_message: None,
            config,
        })
    }

    /// Zlib-wrapped decompressor with default settings.
    pub fn zlib() -> Result<Self> {
        Self::new(InflateConfig::default())
    }

    /// Raw deflate decompressor with default settings.
    pub fn raw() -> Result<Self> {
        Self::new(InflateConfig::default().raw())
    }

    /// Current decoder mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True once the end of the stream (and trailer) has been decoded.
    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Done
    }

    /// Input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Output bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Adler-32 of the output so far, or the requested DICTID while
    /// waiting for a dictionary.
    pub fn adler(&self) -> u32 {
        if self.mode == Mode::Dict {
            self.dict_id
        } else {
            self.adler.checksum()
        }
    }

    /// Diagnostic for the most recent error.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!(error = %err, "inflate stream error");
        self.last_message = Some(err.to_string());
        err
    }

    /// Decompress `input` into `output`.
    ///
    /// `Flush::Finish` declares that no more input follows; an `Ok` result
    /// then becomes `Status::BufError` unless the stream ended. Without it,
    /// `BufError` means the call could make no progress at all.
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Outcome> {
        if self.ended {
            return Err(self.fail(Error::InvalidState {
                expected: "active",
                actual: "ended",
            }));
        }
        match self.mode {
            Mode::Bad(err) => return Err(self.fail(Error::Data(err))),
            Mode::Sync => return Err(self.fail(Error::stream("inflate stream is resynchronizing"))),
            _ => {}
        }

        let mut cursor = InputCursor::new(input);
        let mut put = 0;
        let mut checked = 0;
        let result = self.run(&mut cursor, output, &mut put, &mut checked);

        if let Err(err) = result {
            self.mode = Mode::Bad(err);
            return Err(self.fail(Error::Data(err)));
        }

        self.history.update(&output[..put]);
        if self.wrap {
            self.adler.update(&output[checked..put]);
        }

        let consumed = cursor.position();
        self.total_in += consumed as u64;
        self.total_out += put as u64;

        let status = match self.mode {
            Mode::Done => Status::StreamEnd,
            Mode::Dict => Status::NeedDictionary,
            _ if (consumed == 0 && put == 0) || flush == Flush::Finish => Status::BufError,
            _ => Status::Ok,
        };
        Ok(Outcome::new(consumed, put, status))
    }

    fn run(
        &mut self,
        input: &mut InputCursor<'_>,
        out: &mut [u8],
        put: &mut usize,
        checked: &mut usize,
    ) -> std::result::Result<(), DataError> {
        loop {
            match self.mode {
                Mode::Header => {
                    if !self.bits.need(input, 16) {
                        return Ok(());
                    }
                    let cmf = self.bits.peek(8);
                    let flg = self.bits.peek(16) >> 8;
                    if ((cmf << 8) | flg) % 31 != 0 {
                        return Err(DataError::IncorrectHeaderCheck);
                    }
                    if cmf & 0x0F != crate::zlib::CM_DEFLATE as u32 {
                        return Err(DataError::UnknownMethod);
                    }
                    let window_bits = (cmf >> 4) + 8;
                    if window_bits > self.config.effective_window_bits() as u32 {
                        return Err(DataError::InvalidWindowSize);
                    }
                    self.bits.consume(16);
                    self.adler = Adler32::new();
                    debug!(window_bits, fdict = flg & 0x20 != 0, "zlib header parsed");
                    self.mode = if flg & 0x20 != 0 {
                        Mode::DictId
                    } else {
                        Mode::Type
                    };
                }
                Mode::DictId => {
                    if !self.bits.need(input, 32) {
                        return Ok(());
                    }
                    self.dict_id = self.bits.take(32).swap_bytes();
                    self.mode = Mode::Dict;
                }
                Mode::Dict => {
                    if !self.have_dict {
                        return Ok(());
                    }
                    self.adler = Adler32::new();
                    self.mode = Mode::Type;
                }
                Mode::Type => {
                    if self.last {
                        self.bits.align_to_byte();
                        self.mode = Mode::Check;
                        continue;
                    }
                    if !self.bits.need(input, 3) {
                        return Ok(());
                    }
                    self.last = self.bits.take(1) == 1;
                    let block_type = self.bits.take(2);
                    self.blocks += 1;
                    match block_type {
                        0 => {
                            trace!(last = self.last, "stored block");
                            self.mode = Mode::Stored;
                        }
                        1 => {
                            trace!(last = self.last, "fixed block");
                            self.codes = CodeTables::Fixed;
                            self.mode = Mode::Len;
                        }
                        2 => {
                            trace!(last = self.last, "dynamic block");
                            self.mode = Mode::Table;
                        }
                        _ => return Err(DataError::InvalidBlockType),
                    }
                }
                Mode::Stored => {
                    self.bits.align_to_byte();
                    if !self.bits.need(input, 32) {
                        return Ok(());
                    }
                    let lengths = self.bits.take(32);
                    if lengths & 0xFFFF != (lengths >> 16) ^ 0xFFFF {
                        return Err(DataError::InvalidStoredLengths);
                    }
                    self.length = (lengths & 0xFFFF) as usize;
                    self.mode = Mode::Copy;
                }
                Mode::Copy => {
                    // Whole bytes still held in the bit buffer come first.
                    while self.length > 0 && *put < out.len() {
                        match self.bits.pop_byte() {
                            Some(byte) => {
                                out[*put] = byte;
                                *put += 1;
                                self.length -= 1;
                            }
                            None => break,
                        }
                    }
                    let n = self.length.min(input.remaining()).min(out.len() - *put);
                    out[*put..*put + n].copy_from_slice(input.take(n));
                    *put += n;
                    self.length -= n;
                    if self.length > 0 {
                        return Ok(());
                    }
                    self.mode = Mode::Type;
                }
                Mode::Table => {
                    if !self.bits.need(input, 14) {
                        return Ok(());
                    }
                    self.nlen = self.bits.take(5) as usize + 257;
                    self.ndist = self.bits.take(5) as usize + 1;
                    self.ncode = self.bits.take(4) as usize + 4;
                    if self.nlen > 286 || self.ndist > D_CODES {
                        return Err(DataError::TooManySymbols);
                    }
                    self.have = 0;
                    self.mode = Mode::LenLens;
                }
                Mode::LenLens => {
                    while self.have < self.ncode {
                        if !self.bits.need(input, 3) {
                            return Ok(());
                        }
                        self.lens[CL_CODE_ORDER[self.have]] = self.bits.take(3) as u8;
                        self.have += 1;
                    }
                    for &symbol in &CL_CODE_ORDER[self.ncode..] {
                        self.lens[symbol] = 0;
                    }
                    self.cl_decoder = Some(HuffmanDecoder::from_lengths(
                        &self.lens[..BL_CODES],
                        CodeKind::CodeLengths,
                    )?);
                    self.have = 0;
                    self.mode = Mode::CodeLens;
                }
                Mode::CodeLens => {
                    let total = self.nlen + self.ndist;
                    let Some(cl_decoder) = self.cl_decoder.as_ref() else {
                        return Err(DataError::InvalidCodeLengthsSet);
                    };
                    while self.have < total {
                        let Some((symbol, len)) = peek_symbol(&mut self.bits, input, cl_decoder)?
                        else {
                            return Ok(());
                        };
                        if symbol < 16 {
                            self.bits.consume(len);
                            self.lens[self.have] = symbol as u8;
                            self.have += 1;
                            continue;
                        }

                        let (base, extra) = match symbol {
                            16 => (3, 2),
                            17 => (3, 3),
                            _ => (11, 7),
                        };
                        if !self.bits.need(input, len + extra) {
                            return Ok(());
                        }
                        self.bits.consume(len);
                        let value = if symbol == 16 {
                            if self.have == 0 {
                                return Err(DataError::InvalidBitLengthRepeat);
                            }
                            self.lens[self.have - 1]
                        } else {
                            0
                        };
                        let count = base + self.bits.take(extra) as usize;
                        if self.have + count > total {
                            return Err(DataError::InvalidBitLengthRepeat);
                        }
                        self.lens[self.have..self.have + count].fill(value);
                        self.have += count;
                    }

                    if self.lens[END_BLOCK] == 0 {
                        return Err(DataError::MissingEndOfBlock);
                    }
                    let lit = HuffmanDecoder::from_lengths(
                        &self.lens[..self.nlen],
                        CodeKind::LiteralLength,
                    )?;
                    let dist = HuffmanDecoder::from_lengths(
                        &self.lens[self.nlen..total],
                        CodeKind::Distance,
                    )?;
                    self.codes = CodeTables::Dynamic { lit, dist };
                    self.cl_decoder = None;
                    self.mode = Mode::Len;
                }
                Mode::Len => {
                    if input.remaining() >= fast::MIN_INPUT && out.len() - *put >= fast::MIN_OUTPUT {
                        self.inflate_fast(input, out, put)?;
                        continue;
                    }

                    let (lit, _) = self.codes.get();
                    let Some((symbol, len)) = peek_symbol(&mut self.bits, input, lit)? else {
                        return Ok(());
                    };
                    self.bits.consume(len);
                    let symbol = symbol as usize;

                    if symbol < END_BLOCK {
                        self.length = symbol;
                        self.mode = Mode::Lit;
                    } else if symbol == END_BLOCK {
                        self.mode = Mode::Type;
                    } else {
                        let index = symbol - END_BLOCK - 1;
                        if index >= LENGTH_CODES {
                            return Err(DataError::InvalidLiteralLengthCode);
                        }
                        self.length = LENGTH_BASE[index] as usize;
                        self.extra = LENGTH_EXTRA_BITS[index] as u32;
                        self.mode = Mode::LenExt;
                    }
                }
                Mode::LenExt => {
                    if !self.bits.need(input, self.extra) {
                        return Ok(());
                    }
                    self.length += self.bits.take(self.extra) as usize;
                    self.mode = Mode::Dist;
                }
                Mode::Dist => {
                    let (_, dist) = self.codes.get();
                    let Some((symbol, len)) = peek_symbol(&mut self.bits, input, dist)? else {
                        return Ok(());
                    };
                    self.bits.consume(len);
                    let symbol = symbol as usize;
                    if symbol >= D_CODES {
                        return Err(DataError::InvalidDistanceCode);
                    }
                    self.offset = DISTANCE_BASE[symbol] as usize;
                    self.extra = DISTANCE_EXTRA_BITS[symbol] as u32;
                    self.mode = Mode::DistExt;
                }
                Mode::DistExt => {
                    if !self.bits.need(input, self.extra) {
                        return Ok(());
                    }
                    self.offset += self.bits.take(self.extra) as usize;
                    if self.offset > self.history.have() + *put {
                        return Err(DataError::DistanceTooFarBack);
                    }
                    self.mode = Mode::Match;
                }
                Mode::Match => {
                    if *put == out.len() {
                        return Ok(());
                    }
                    if self.offset > *put && self.offset - *put > self.history.have() {
                        return Err(DataError::DistanceTooFarBack);
                    }
                    let n = copy_match(&self.history, out, *put, self.offset, self.length);
                    *put += n;
                    self.length -= n;
                    if self.length == 0 {
                        self.mode = Mode::Len;
                    }
                }
                Mode::Lit => {
                    if *put == out.len() {
                        return Ok(());
                    }
                    out[*put] = self.length as u8;
                    *put += 1;
                    self.mode = Mode::Len;
                }
                Mode::Check => {
                    if self.wrap {
                        self.adler.update(&out[*checked..*put]);
                        *checked = *put;
                        if !self.bits.need(input, 32) {
                            return Ok(());
                        }
                        let expected = self.bits.take(32).swap_bytes();
                        if self.verify && expected != self.adler.checksum() {
                            return Err(DataError::IncorrectDataCheck);
                        }
                    }
                    debug!(
                        total_in = self.total_in + input.position() as u64,
                        total_out = self.total_out + *put as u64,
                        blocks = self.blocks,
                        "inflate stream finished"
                    );
                    self.mode = Mode::Done;
                }
                Mode::Done => return Ok(()),
                Mode::Bad(err) => return Err(err),
                Mode::Sync => return Ok(()),
            }
        }
    }

    /// Supply the preset dictionary.
    ///
    /// For the zlib format this is only accepted when the stream asked for
    /// it ([`Status::NeedDictionary`]) and its Adler-32 must match the
    /// stream's DICTID. Raw streams accept a dictionary at any time.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        if self.ended {
            return Err(self.fail(Error::stream("inflate stream already ended")));
        }
        if self.wrap && self.mode != Mode::Dict {
            return Err(self.fail(Error::InvalidState {
                expected: "need dictionary",
                actual: "decoding",
            }));
        }
        if self.mode == Mode::Dict && adler32(1, dictionary) != self.dict_id {
            return Err(self.fail(Error::Data(DataError::IncorrectDictionary)));
        }

        self.history.update(dictionary);
        self.have_dict = true;
        debug!(len = dictionary.len(), "inflate dictionary applied");
        Ok(())
    }

    /// Skip ahead to the next `00 00 FF FF` flush marker.
    ///
    /// Returns the input consumed. The status is `Ok` once a marker was
    /// found, after which decoding resumes at the following block with an
    /// empty history and no trailer check; `BufError` means the marker was
    /// not in `input` and the search continues on the next call.
    pub fn sync(&mut self, input: &[u8]) -> Result<Outcome> {
        if self.ended {
            return Err(self.fail(Error::stream("inflate stream already ended")));
        }
        if input.is_empty() && self.bits.bits() < 8 && self.mode != Mode::Sync {
            return Ok(Outcome::new(0, 0, Status::BufError));
        }

        if self.mode != Mode::Sync {
            let header_pending = self.wrap && self.mode == Mode::Header;
            self.mode = Mode::Sync;
            self.sync_got = 0;
            self.bits.align_to_byte();
            let mut held = Vec::with_capacity(8);
            while let Some(byte) = self.bits.pop_byte() {
                held.push(byte);
            }
            self.bits.clear();
            sync_search(&mut self.sync_got, &held);
            if header_pending {
                self.wrap = false;
            }
        }

        let consumed = sync_search(&mut self.sync_got, input);
        self.total_in += consumed as u64;
        if self.sync_got != 4 {
            return Ok(Outcome::new(consumed, 0, Status::BufError));
        }

        self.verify = false;
        self.restart_blocks();
        self.mode = Mode::Type;
        debug!(total_in = self.total_in, "inflate resynchronized");
        Ok(Outcome::new(consumed, 0, Status::Ok))
    }

    /// True when the decoder sits at the start of a stored block's lengths,
    /// a point a sync flush produces.
    pub fn sync_point(&self) -> bool {
        self.mode == Mode::Stored && self.bits.bits() == 0
    }

    fn restart_blocks(&mut self) {
        self.last = false;
        self.bits.clear();
        self.history.reset();
        self.codes = CodeTables::Fixed;
        self.cl_decoder = None;
        self.length = 0;
        self.offset = 0;
        self.have = 0;
    }

    /// Restart with the same parameters, keeping the buffers.
    pub fn reset(&mut self) {
        if self.ended {
            return;
        }
        self.restart_blocks();
        self.wrap = self.config.format == Format::Zlib;
        self.verify = self.config.verify_checksum;
        self.mode = if self.wrap { Mode::Header } else { Mode::Type };
        self.adler = Adler32::new();
        self.dict_id = 0;
        self.have_dict = false;
        self.sync_got = 0;
        self.blocks = 0;
        self.total_in = 0;
        self.total_out = 0;
        self.last_message = None;
        debug!("inflate stream reset");
    }

    /// Release all buffers. Every later call fails.
    pub fn end(&mut self) -> Result<()> {
        if self.ended {
            return Err(self.fail(Error::stream("inflate stream already ended")));
        }
        self.history.release();
        self.cl_decoder = None;
        self.codes = CodeTables::Fixed;
        self.ended = true;
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        if self.ended {
            StreamState::Ended
        } else {
            match self.mode {
                Mode::Bad(_) => StreamState::Error,
                Mode::Done => StreamState::Finished,
                _ if self.total_in == 0 && self.total_out == 0 => StreamState::Initial,
                Mode::Check => StreamState::Finishing,
                _ => StreamState::Active,
            }
        }
    }

    /// Totals so far.
    pub fn stats(&self) -> CompressionStats {
        CompressionStats {
            algorithm: Some(self.algorithm()),
            original_size: self.total_out as usize,
            compressed_size: self.total_in as usize,
            blocks_processed: self.blocks,
            dictionary_used: self.have_dict,
            checksum: self.wrap.then(|| self.adler.checksum() as u64),
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self.config.format {
            Format::Zlib => Algorithm::Zlib,
            Format::Raw => Algorithm::Deflate,
        }
    }
}

/// Advance the marker search over `buf`; returns the bytes examined.
///
/// `got` counts how much of `00 00 FF FF` has been matched so far.
fn sync_search(got: &mut u8, buf: &[u8]) -> usize {
    let mut next = 0;
    while next < buf.len() && *got < 4 {
        let want = if *got < 2 { 0 } else { 0xFF };
        if buf[next] == want {
            *got += 1;
        } else if buf[next] != 0 {
            *got = 0;
        } else {
            *got = 4 - *got;
        }
        next += 1;
    }
    next
}

impl StreamingDecompressor for Inflater {
    fn algorithm(&self) -> Algorithm {
        Inflater::algorithm(self)
    }

    fn decompress_chunk(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Outcome> {
        self.decompress(input, output, flush)
    }

    fn is_finished(&self) -> bool {
        Inflater::is_finished(self)
    }

    fn state(&self) -> StreamState {
        Inflater::state(self)
    }

    fn stats(&self) -> CompressionStats {
        Inflater::stats(self)
    }

    fn reset(&mut self) {
        Inflater::reset(self)
    }

    fn end(&mut self) -> Result<()> {
        Inflater::end(self)
    }
}

impl DictionaryDecompressor for Inflater {
    fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<()> {
        Inflater::set_dictionary(self, dictionary)
    }
}

/// Decompress straight into `output`; the stream must end within it.
pub(crate) fn decompress_into(
    config: InflateConfig,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    let mut inflater = Inflater::new(config)?;
    let outcome = inflater.decompress(input, output, Flush::Finish)?;
    match outcome.status {
        Status::StreamEnd => Ok(outcome.produced),
        Status::NeedDictionary => Err(Error::InvalidDictionary(
            "stream requires a preset dictionary".to_string(),
        )),
        _ if outcome.produced == output.len() => {
            Err(Error::buffer_too_small(output.len() + 1, output.len()))
        }
        _ => Err(Error::unexpected_eof(outcome.consumed)),
    }
}

/// Drive an [`Inflater`] over a complete input, appending to `out`.
///
/// Returns the number of bytes appended. A stream that stops short is an
/// [`Error::UnexpectedEof`]; one that needs a preset dictionary is an
/// [`Error::InvalidDictionary`].
pub(crate) fn drive(
    inflater: &mut Inflater,
    input: &[u8],
    out: &mut Vec<u8>,
    config: &StreamConfig,
) -> Result<usize> {
    let start = out.len();
    let mut offset = 0;
    loop {
        let pos = out.len();
        out.resize(pos + config.output_buffer_size, 0);
        let end = (offset + config.input_buffer_size).min(input.len());
        let outcome = match inflater.decompress(&input[offset..end], &mut out[pos..], Flush::None) {
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
            Status::NeedDictionary => {
                return Err(Error::InvalidDictionary(
                    "stream requires a preset dictionary".to_string(),
                ))
            }
            Status::BufError => return Err(Error::unexpected_eof(offset)),
            Status::Ok => {}
        }
    }
}

/// Decompress raw deflate data, appending to `out`.
///
/// Returns the number of bytes appended.
pub fn inflate(input: &[u8], out: &mut Vec<u8>) -> Result<usize> {
    let mut inflater = Inflater::raw()?;
    drive(&mut inflater, input, out, &StreamConfig::default())
}
