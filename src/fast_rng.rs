// Fast random number generation with reproducible per-history streams.
//
// The generator is a PCG variant built on a 64-bit LCG. Because the underlying
// state is an LCG, the state n steps ahead can be computed in O(log n) which is
// what lets every particle history start from its own fixed offset in the
// sequence no matter which worker runs it.

use rand::{RngCore, SeedableRng};

/// LCG multiplier
const PRN_MULT: u64 = 6364136223846793005;
/// LCG additive constant
const PRN_ADD: u64 = 1442695040888963407;
/// Number of random numbers reserved for each particle history
pub const PRN_STRIDE: u64 = 152_917;
/// Number of independent random number streams
pub const N_STREAMS: usize = 2;

/// Fast RNG using a PCG-LCG algorithm.
///
/// Reference: Melissa E. O'Neill, "PCG: A Family of Simple Fast Space-Efficient
/// Statistically Good Algorithms for Random Number Generation"
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FastRng {
    seed: u64,
}

impl FastRng {
    /// Create a new FastRng with the given seed
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generate a random f64 in [0, 1)
    #[inline(always)]
    pub fn random(&mut self) -> f64 {
        let result = self.next_u64();
        // Keep the top 53 bits so the result can never round up to 1.0
        (result >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Reseed the RNG (for reuse across particles)
    #[inline]
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
    }
}

/// Compute the LCG state `n` steps after `seed` in O(log n) operations.
///
/// Based on F. Brown, "Random Number Generation with Arbitrary Stride,"
/// Trans. Am. Nucl. Soc. (Nov. 1994).
pub fn future_seed(mut n: u64, seed: u64) -> u64 {
    let mut g = PRN_MULT;
    let mut c = PRN_ADD;
    let mut g_new: u64 = 1;
    let mut c_new: u64 = 0;

    while n > 0 {
        if n & 1 == 1 {
            g_new = g_new.wrapping_mul(g);
            c_new = c_new.wrapping_mul(g).wrapping_add(c);
        }
        c = c.wrapping_mul(g.wrapping_add(1));
        g = g.wrapping_mul(g);
        n >>= 1;
    }

    g_new.wrapping_mul(seed).wrapping_add(c_new)
}

impl SeedableRng for FastRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            seed: u64::from_le_bytes(seed),
        }
    }
}

impl RngCore for FastRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        // Advance the LCG
        self.seed = PRN_MULT.wrapping_mul(self.seed).wrapping_add(PRN_ADD);

        // PCG output permutation (RXS-M-XS variant)
        let word = ((self.seed >> ((self.seed >> 59) + 5)) ^ self.seed)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut left = dest;
        while left.len() >= 8 {
            let bytes = self.next_u64().to_le_bytes();
            left[..8].copy_from_slice(&bytes);
            left = &mut left[8..];
        }
        if !left.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            left.copy_from_slice(&bytes[..left.len()]);
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Named random number channels.
///
/// `Track` is consumed while transporting particles, `Other` by everything
/// else (source sampling, bank resampling).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Track = 0,
    Other = 1,
}

/// A set of seekable random number streams sharing one master seed.
///
/// This is a plain value: each particle history gets its own copy, seeks it to
/// the history's offset with [`RandomStreams::rn_skip`] and draws from it.
#[derive(Clone, Copy, Debug)]
pub struct RandomStreams {
    master_seed: u64,
    stream: Stream,
    rngs: [FastRng; N_STREAMS],
}

impl RandomStreams {
    /// Initialise every stream from the master seed; the active stream is `Other`.
    pub fn new(master_seed: u64) -> Self {
        let mut rngs = [FastRng::new(0); N_STREAMS];
        for (i, rng) in rngs.iter_mut().enumerate() {
            rng.reseed(master_seed.wrapping_add(i as u64));
        }
        Self {
            master_seed,
            stream: Stream::Other,
            rngs,
        }
    }

    /// Switch the active stream.
    pub fn set_stream(&mut self, stream: Stream) {
        self.stream = stream;
    }

    /// Seek the active stream to the start of history `n`.
    ///
    /// The position is absolute: it depends only on the master seed, the
    /// active stream and `n`, never on how many numbers were drawn before.
    pub fn rn_skip(&mut self, n: u64) {
        let offset = self.stream as u64;
        let seed = future_seed(
            n.wrapping_mul(PRN_STRIDE),
            self.master_seed.wrapping_add(offset),
        );
        self.rngs[self.stream as usize].reseed(seed);
    }

    /// Uniform random number in [0, 1) from the active stream.
    #[inline]
    pub fn prn(&mut self) -> f64 {
        self.rngs[self.stream as usize].random()
    }

    /// Uniform random integer in [lo, hi) from the active stream.
    #[inline]
    pub fn rni(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(hi > lo, "empty range [{lo}, {hi})");
        let span = hi - lo;
        let k = (self.prn() * span as f64) as u64;
        lo + k.min(span - 1)
    }

    /// Mutable access to the active stream's generator, for APIs taking `rand::Rng`.
    pub fn rng(&mut self) -> &mut FastRng {
        &mut self.rngs[self.stream as usize]
    }
}
