//! Bulk decoding for the common case where plenty of input and output
//! space remain, so no symbol can stop halfway.

use sluice_core::DataError;
use tracing::trace;

use crate::bits::InputCursor;
use crate::huffman::{
    DISTANCE_BASE, DISTANCE_EXTRA_BITS, D_CODES, END_BLOCK, LENGTH_BASE, LENGTH_CODES,
    LENGTH_EXTRA_BITS,
};

use super::{copy_match, Inflater, Mode};

/// Input bytes required to enter the fast loop.
pub(super) const MIN_INPUT: usize = 10;

/// Output space required to enter the fast loop (one maximal match).
pub(super) const MIN_OUTPUT: usize = 258;

impl Inflater {
    /// Decode literal/length and distance pairs until the block ends or the
    /// buffers get close to running out.
    ///
    /// A refilled accumulator holds at least 57 bits, enough for the longest
    /// length code, its extra bits, and a full distance.
    pub(super) fn inflate_fast(
        &mut self,
        input: &mut InputCursor<'_>,
        out: &mut [u8],
        put: &mut usize,
    ) -> Result<(), DataError> {
        let (lit, dist) = self.codes.get();
        let mut bits = self.bits;
        let mut pos = *put;
        let mut taken = 0;
        let mut result = Ok(());

        while input.remaining() >= MIN_INPUT && out.len() - pos >= MIN_OUTPUT {
            taken += bits.refill(input);

            let (symbol, len) = lit.lookup(bits.hold());
            if len == 0 {
                result = Err(DataError::InvalidLiteralLengthCode);
                break;
            }
            bits.consume(len);
            let symbol = symbol as usize;

            if symbol < END_BLOCK {
                out[pos] = symbol as u8;
                pos += 1;
                continue;
            }
            if symbol == END_BLOCK {
                trace!("end of block");
                self.mode = Mode::Type;
                break;
            }

            let index = symbol - END_BLOCK - 1;
            if index >= LENGTH_CODES {
                result = Err(DataError::InvalidLiteralLengthCode);
                break;
            }
            let length =
                LENGTH_BASE[index] as usize + bits.take(LENGTH_EXTRA_BITS[index] as u32) as usize;

            let (symbol, len) = dist.lookup(bits.hold());
            if len == 0 || symbol as usize >= D_CODES {
                result = Err(DataError::InvalidDistanceCode);
                break;
            }
            bits.consume(len);
            let symbol = symbol as usize;
            let offset = DISTANCE_BASE[symbol] as usize
                + bits.take(DISTANCE_EXTRA_BITS[symbol] as u32) as usize;

            if offset > self.history.have() + pos {
                result = Err(DataError::DistanceTooFarBack);
                break;
            }
            pos += copy_match(&self.history, out, pos, offset, length);
        }

        // Hand unused whole bytes back to the input.
        bits.return_bytes(input, taken);
        self.bits = bits;
        *put = pos;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use sluice_core::CompressionLevel;

    #[test]
    fn test_fast_path_matches_slow_path() {
        let text = b"abcabcabcabcabcabcabcabcabcabc".repeat(40);
        let data = crate::deflate::deflate(&text, CompressionLevel::Default).unwrap();

        let mut fast_out = Vec::new();
        inflate(&data, &mut fast_out).unwrap();

        // One output byte at a time never enters the fast loop.
        let mut inflater = Inflater::raw().unwrap();
        let mut slow_out = Vec::new();
        let mut byte = [0u8; 1];
        let mut input = &data[..];
        loop {
            let outcome = inflater.decompress(input, &mut byte, Flush::None).unwrap();
            slow_out.extend_from_slice(&byte[..outcome.produced]);
            input = &input[outcome.consumed..];
            if outcome.status == Status::StreamEnd {
                break;
            }
        }

        assert_eq!(fast_out, slow_out);
        assert_eq!(fast_out, text);
    }

    #[test]
    fn test_fast_path_leaves_input_unconsumed_past_block_end() {
        // Bytes after the final block stay with the caller.
        let first = crate::deflate::deflate(&[7u8; 500], CompressionLevel::Default).unwrap();
        let mut data = first.clone();
        data.extend_from_slice(&[0xAA; 32]);

        let mut inflater = Inflater::raw().unwrap();
        let mut out = vec![0u8; 1024];
        let outcome = inflater.decompress(&data, &mut out, Flush::None).unwrap();
        assert_eq!(outcome.status, Status::StreamEnd);
        assert_eq!(outcome.consumed, first.len());
        assert_eq!(&out[..outcome.produced], &[7u8; 500][..]);
    }
}
