//! LSB-first bit packing for DEFLATE streams.
//!
//! [`BitWriter`] accumulates compressed output in a pending buffer that the
//! caller drains into its own slices. [`BitBuffer`] is the decoder-side
//! accumulator; it pulls bytes from an [`InputCursor`] only when a field
//! needs them, so a decoder can stop between any two bytes and resume later.

/// Bit writer with a drainable pending buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    pending: Vec<u8>,
    /// Bytes of `pending` already handed to the caller.
    drained: usize,
    bit_buf: u64,
    bit_count: u32,
}

impl BitWriter {
    /// Create a new bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Write the low `n` bits of `value` (n ≤ 32).
    #[inline]
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32);
        debug_assert!(n == 32 || value >> n == 0);
        self.bit_buf |= (value as u64) << self.bit_count;
        self.bit_count += n;

        while self.bit_count >= 8 {
            self.pending.push(self.bit_buf as u8);
            self.bit_buf >>= 8;
            self.bit_count -= 8;
        }
    }

    /// Write a Huffman code already stored in bit-reversed form.
    #[inline]
    pub fn write_code(&mut self, code: u16, len: u8) {
        self.write_bits(code as u32, len as u32);
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn align(&mut self) {
        if self.bit_count > 0 {
            self.pending.push(self.bit_buf as u8);
            self.bit_buf = 0;
            self.bit_count = 0;
        }
    }

    /// Write a 16-bit little-endian value (aligns first).
    pub fn write_u16_le(&mut self, value: u16) {
        self.align();
        self.pending.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 16-bit big-endian value (aligns first).
    pub fn write_u16_be(&mut self, value: u16) {
        self.align();
        self.pending.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a 32-bit big-endian value (aligns first).
    pub fn write_u32_be(&mut self, value: u32) {
        self.align();
        self.pending.extend_from_slice(&value.to_be_bytes());
    }

    /// Write raw bytes (aligns first).
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align();
        self.pending.extend_from_slice(bytes);
    }

    /// Bits waiting for a byte boundary (always < 8).
    #[inline]
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Complete bytes not yet drained.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.drained
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.pending_len() == 0 && self.bit_count == 0
    }

    /// Copy as many complete pending bytes as fit into `out`.
    ///
    /// Returns the number of bytes written.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let available = &self.pending[self.drained..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.drained += n;

        if self.drained == self.pending.len() {
            self.pending.clear();
            self.drained = 0;
        }
        n
    }

    /// Drop everything, including partial bits.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.drained = 0;
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    /// Flush remaining bits (pad with zeros) and return all pending bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.align();
        self.pending.split_off(self.drained)
    }
}

/// Read position within the caller's input slice for one call.
#[derive(Debug)]
pub struct InputCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> InputCursor<'a> {
    /// Wrap an input slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still unread.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Unread part of the input.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Take one byte.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Take up to `n` bytes.
    pub fn take(&mut self, n: usize) -> &'a [u8] {
        let n = n.min(self.remaining());
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    /// Give back `n` bytes taken during this call.
    pub fn unread(&mut self, n: usize) {
        debug_assert!(n <= self.pos);
        self.pos -= n;
    }
}

/// Decoder-side bit accumulator, persistent across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitBuffer {
    hold: u64,
    bits: u32,
}

impl BitBuffer {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits currently held.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Raw accumulator contents.
    #[inline]
    pub fn hold(&self) -> u64 {
        self.hold
    }

    /// Pull one byte from the input. Returns false when input is exhausted.
    #[inline]
    pub fn pull_byte(&mut self, input: &mut InputCursor<'_>) -> bool {
        match input.next_byte() {
            Some(byte) => {
                debug_assert!(self.bits <= 56);
                self.hold |= (byte as u64) << self.bits;
                self.bits += 8;
                true
            }
            None => false,
        }
    }

    /// Ensure at least `n` bits are held. Returns false if input ran out
    /// first; the bytes already pulled stay in the accumulator.
    #[inline]
    pub fn need(&mut self, input: &mut InputCursor<'_>, n: u32) -> bool {
        while self.bits < n {
            if !self.pull_byte(input) {
                return false;
            }
        }
        true
    }

    /// Top up to at least 56 bits from a slice with 8+ spare bytes.
    ///
    /// Used by the fast path; returns the number of bytes taken.
    #[inline]
    pub fn refill(&mut self, input: &mut InputCursor<'_>) -> usize {
        let mut taken = 0;
        while self.bits <= 56 {
            if !self.pull_byte(input) {
                break;
            }
            taken += 1;
        }
        taken
    }

    /// Low `n` bits without consuming them.
    #[inline]
    pub fn peek(&self, n: u32) -> u32 {
        (self.hold & ((1u64 << n) - 1)) as u32
    }

    /// Drop `n` bits.
    #[inline]
    pub fn consume(&mut self, n: u32) {
        debug_assert!(n <= self.bits);
        self.hold >>= n;
        self.bits -= n;
    }

    /// Read and drop `n` bits (caller ensured availability).
    #[inline]
    pub fn take(&mut self, n: u32) -> u32 {
        let value = self.peek(n);
        self.consume(n);
        value
    }

    /// Discard bits up to the next byte boundary.
    #[inline]
    pub fn align_to_byte(&mut self) {
        let extra = self.bits & 7;
        self.consume(extra);
    }

    /// Pop one whole byte out of the accumulator, if held.
    #[inline]
    pub fn pop_byte(&mut self) -> Option<u8> {
        if self.bits >= 8 {
            Some(self.take(8) as u8)
        } else {
            None
        }
    }

    /// Return whole bytes to the input, leaving fewer than 8 bits held.
    ///
    /// At most `limit` bytes are returned (those taken during this call).
    pub fn return_bytes(&mut self, input: &mut InputCursor<'_>, limit: usize) {
        let back = ((self.bits >> 3) as usize).min(limit);
        if back == 0 {
            return;
        }
        input.unread(back);
        self.bits -= (back as u32) * 8;
        self.hold &= (1u64 << self.bits) - 1;
    }

    /// Forget all held bits.
    pub fn clear(&mut self) {
        self.hold = 0;
        self.bits = 0;
    }
}
