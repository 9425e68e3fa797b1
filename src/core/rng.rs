// Copyright @yucwang 2026

use crate::math::constants::{Float, ONE_MINUS_EPSILON, Vector2f};

const MULTIPLIER: u64 = 6364136223846793005;
const DEFAULT_STREAM: u64 = 1442695040888963407;

/// 64-bit LCG with a permuted 32-bit output (PCG XSH-RR). Each value owns
/// its whole state; there is no process-wide generator.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
    inc: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self::with_stream(seed, DEFAULT_STREAM)
    }

    /// Different streams give statistically independent sequences even for
    /// equal seeds.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = Self { state: 0, inc: (stream << 1) | 1 };
        rng.next_u32();
        rng.state = rng.state.wrapping_add(splitmix64(seed));
        rng.next_u32();
        rng
    }

    /// Draws a seed and a stream from `self` for a child generator.
    pub fn derive(&mut self) -> LcgRng {
        let seed = self.next_u64();
        let stream = self.next_u64();
        LcgRng::with_stream(seed, stream)
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(MULTIPLIER).wrapping_add(self.inc);
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u64(&mut self) -> u64 {
        ((self.next_u32() as u64) << 32) | self.next_u32() as u64
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> Float {
        ((self.next_u32() >> 8) as Float * (1.0 / (1u32 << 24) as Float)).min(ONE_MINUS_EPSILON)
    }

    pub fn next_vector2f(&mut self) -> Vector2f {
        let x = self.next_f32();
        let y = self.next_f32();
        Vector2f::new(x, y)
    }

    /// Uniform integer in `[0, bound)`; `bound` must be positive.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u32();
            if r >= threshold {
                return r % bound;
            }
        }
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
