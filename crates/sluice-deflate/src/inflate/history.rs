//! Decoder-side history: the last window of output, kept across calls so
//! back-references may reach into data already handed to the caller.

/// Circular buffer of recent output.
#[derive(Debug)]
pub struct History {
    buf: Vec<u8>,
    size: usize,
    /// Next write position.
    next: usize,
    /// Valid bytes, at most `size`.
    have: usize,
}

impl History {
    /// History of `1 << window_bits` bytes.
    pub fn new(window_bits: u8) -> Self {
        let size = 1usize << window_bits;
        Self {
            buf: vec![0; size],
            size,
            next: 0,
            have: 0,
        }
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.next = 0;
        self.have = 0;
    }

    /// Release the buffer.
    pub fn release(&mut self) {
        self.buf = Vec::new();
        self.size = 0;
        self.reset();
    }

    /// Bytes of history available.
    #[inline]
    pub fn have(&self) -> usize {
        self.have
    }

    /// Append output produced since the last update.
    pub fn update(&mut self, written: &[u8]) {
        if self.size == 0 || written.is_empty() {
            return;
        }

        if written.len() >= self.size {
            self.buf
                .copy_from_slice(&written[written.len() - self.size..]);
            self.next = 0;
            self.have = self.size;
            return;
        }

        let first = (self.size - self.next).min(written.len());
        self.buf[self.next..self.next + first].copy_from_slice(&written[..first]);
        let rest = written.len() - first;
        if rest > 0 {
            self.buf[..rest].copy_from_slice(&written[first..]);
            self.next = rest;
            self.have = self.size;
        } else {
            self.next += first;
            if self.next == self.size {
                self.next = 0;
            }
            self.have = (self.have + first).min(self.size);
        }
    }

    /// Contiguous run of history starting `back` bytes before the end.
    ///
    /// The run stops at the wrap point, so it may be shorter than `back`.
    /// `back` must be in `1..=have()`.
    #[inline]
    pub fn tail_from(&self, back: usize) -> &[u8] {
        debug_assert!(back > 0 && back <= self.have);
        if back > self.next {
            let start = self.size - (back - self.next);
            &self.buf[start..self.size]
        } else {
            &self.buf[self.next - back..self.next]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(history: &History) -> Vec<u8> {
        let mut out = Vec::new();
        let mut back = history.have();
        while back > 0 {
            let run = history.tail_from(back);
            out.extend_from_slice(run);
            back -= run.len();
        }
        out
    }

    #[test]
    fn test_fills_then_wraps() {
        let mut history = History::new(9);
        let data: Vec<u8> = (0..700u32).map(|i| (i % 256) as u8).collect();

        history.update(&data[..300]);
        assert_eq!(history.have(), 300);
        assert_eq!(contents(&history), &data[..300]);

        history.update(&data[300..700]);
        assert_eq!(history.have(), 512);
        assert_eq!(contents(&history), &data[700 - 512..700]);
    }

    #[test]
    fn test_large_update_keeps_tail() {
        let mut history = History::new(9);
        let data: Vec<u8> = (0..2000u32).map(|i| (i * 3 % 256) as u8).collect();
        history.update(&data);
        assert_eq!(contents(&history), &data[2000 - 512..]);
    }

    #[test]
    fn test_tail_from_short_distance() {
        let mut history = History::new(9);
        history.update(b"abcdef");
        assert_eq!(history.tail_from(3), b"def");
    }
}
