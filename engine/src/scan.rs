//! Delimiter search that keeps its place.
//!
//! A [`Scanner`] walks one partition in 32-byte blocks and remembers the
//! match bits of the block it loaded last. Each line costs a few bit
//! operations on that mask instead of a fresh search, and no byte is
//! loaded twice.

use std::ops::Range;

/// Block width of every kernel.
pub const LANES: usize = 32;

/// Match mask of one block: bit `i` is set when byte `i` equals either needle.
pub type Kernel = fn(&[u8; LANES], u8, u8) -> u32;

pub struct Scanner<'a> {
    haystack: &'a [u8],
    delimiter: u8,
    terminator: u8,
    /// Offset of bit 0 of `pending`.
    block: usize,
    pending: u32,
    /// One past the last byte loaded.
    scanned: usize,
    kernel: Kernel,
}

impl<'a> Scanner<'a> {
    /// Scans `data[range]`. Offsets going in and out are absolute offsets
    /// into `data`.
    pub fn new(data: &'a [u8], range: Range<usize>, delimiter: u8, terminator: u8) -> Self {
        Self::with_kernel(data, range, delimiter, terminator, kernel().0)
    }

    pub fn with_kernel(
        data: &'a [u8],
        range: Range<usize>,
        delimiter: u8,
        terminator: u8,
        kernel: Kernel,
    ) -> Self {
        Self {
            haystack: &data[..range.end],
            delimiter,
            terminator,
            block: range.start,
            pending: 0,
            scanned: range.start,
            kernel,
        }
    }

    /// First delimiter or terminator at or after `from`.
    ///
    /// Matches behind the furthest `from` seen so far count as consumed. A
    /// `from` behind the scanner's progress is answered from the pending
    /// mask; a `from` beyond it skips the gap without reading it.
    #[inline]
    pub fn next_from(&mut self, from: usize) -> Option<usize> {
        loop {
            if from > self.block {
                let skip = from - self.block;
                self.pending = if skip >= LANES {
                    0
                } else {
                    self.pending & (u32::MAX << skip)
                };
            }
            if self.pending != 0 {
                return Some(self.block + self.pending.trailing_zeros() as usize);
            }
            let start = self.scanned.max(from);
            if start >= self.haystack.len() {
                return None;
            }
            self.load(start);
        }
    }

    /// Offset one past the last byte this scanner has read.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    fn load(&mut self, start: usize) {
        let rest = &self.haystack[start..];
        let (mask, width) = match rest.first_chunk::<LANES>() {
            Some(block) => ((self.kernel)(block, self.delimiter, self.terminator), LANES),
            None => (tail_mask(rest, self.delimiter, self.terminator), rest.len()),
        };
        self.block = start;
        self.pending = mask;
        self.scanned = start + width;
    }
}

/// Byte-at-a-time mask for a final block shorter than [`LANES`].
fn tail_mask(rest: &[u8], a: u8, b: u8) -> u32 {
    rest.iter()
        .enumerate()
        .fold(0, |mask, (i, &c)| mask | ((((c == a) | (c == b)) as u32) << i))
}

/// Best kernel for this CPU and its name.
#[cfg(target_arch = "x86_64")]
pub fn kernel() -> (Kernel, &'static str) {
    if is_x86_feature_detected!("avx2") {
        return (x86::avx2_mask, "avx2");
    }
    (x86::sse2_mask, "sse2")
}

#[cfg(not(target_arch = "x86_64"))]
pub fn kernel() -> (Kernel, &'static str) {
    (swar_mask, "swar")
}

#[inline]
fn load_u64_le(bytes: &[u8]) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(arr)
}

/// 0x80 in every byte of `word` that is zero, 0x00 elsewhere. Exact: no
/// borrow crosses byte lanes.
#[inline]
fn zero_bytes(word: u64) -> u64 {
    const LOW7: u64 = 0x7f7f_7f7f_7f7f_7f7f;
    !(((word & LOW7).wrapping_add(LOW7)) | word | LOW7)
}

/// Packs the high bit of each byte into the low 8 bits, byte 0 first.
#[inline]
fn pack_high_bits(word: u64) -> u32 {
    ((word >> 7).wrapping_mul(0x0102_0408_1020_4080) >> 56) as u32
}

/// Portable kernel: four 64-bit words per block.
pub fn swar_mask(block: &[u8; LANES], a: u8, b: u8) -> u32 {
    let rep_a = u64::from_ne_bytes([a; 8]);
    let rep_b = u64::from_ne_bytes([b; 8]);
    block
        .chunks_exact(8)
        .enumerate()
        .fold(0, |mask, (i, bytes)| {
            let word = load_u64_le(bytes);
            let hits = zero_bytes(word ^ rep_a) | zero_bytes(word ^ rep_b);
            mask | (pack_high_bits(hits) << (i * 8))
        })
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::LANES;
    use std::arch::x86_64::{
        __m128i, __m256i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_or_si128,
        _mm_set1_epi8, _mm256_cmpeq_epi8, _mm256_loadu_si256, _mm256_movemask_epi8,
        _mm256_or_si256, _mm256_set1_epi8,
    };

    pub fn avx2_mask(block: &[u8; LANES], a: u8, b: u8) -> u32 {
        // SAFETY: only handed out by `kernel()` after avx2 was detected.
        unsafe { avx2(block, a, b) }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn avx2(block: &[u8; LANES], a: u8, b: u8) -> u32 {
        // SAFETY: `block` is 32 readable bytes; loadu has no alignment needs.
        unsafe {
            let v = _mm256_loadu_si256(block.as_ptr() as *const __m256i);
            let hits = _mm256_or_si256(
                _mm256_cmpeq_epi8(v, _mm256_set1_epi8(a as i8)),
                _mm256_cmpeq_epi8(v, _mm256_set1_epi8(b as i8)),
            );
            _mm256_movemask_epi8(hits) as u32
        }
    }

    pub fn sse2_mask(block: &[u8; LANES], a: u8, b: u8) -> u32 {
        // SAFETY: sse2 is part of the x86_64 baseline and both loads stay
        // inside the 32-byte block.
        unsafe {
            let na = _mm_set1_epi8(a as i8);
            let nb = _mm_set1_epi8(b as i8);
            let lo = _mm_loadu_si128(block.as_ptr() as *const __m128i);
            let hi = _mm_loadu_si128(block.as_ptr().add(16) as *const __m128i);
            let lo = _mm_or_si128(_mm_cmpeq_epi8(lo, na), _mm_cmpeq_epi8(lo, nb));
            let hi = _mm_or_si128(_mm_cmpeq_epi8(hi, na), _mm_cmpeq_epi8(hi, nb));
            (_mm_movemask_epi8(lo) as u32 & 0xffff) | ((_mm_movemask_epi8(hi) as u32) << 16)
        }
    }
}
