//! Seeded random number generation
//!
//! Every roll made while building or playing a floor comes from one
//! ChaCha stream keyed by the floor's seed string, so a given seed and
//! call order always replay the same dungeon.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Game random number generator
///
/// Wraps ChaCha8Rng keyed from a seed string. Serialization keeps the seed
/// and the stream position so a restored game continues the same sequence.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: String,
}

#[derive(Serialize, Deserialize)]
struct RngState {
    seed: String,
    word_pos: u64,
}

impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RngState {
            seed: self.seed.clone(),
            word_pos: u64::try_from(self.rng.get_word_pos()).unwrap_or(u64::MAX),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let state = RngState::deserialize(deserializer)?;
        let mut rng = GameRng::new(&state.seed);
        rng.rng.set_word_pos(u128::from(state.word_pos));
        Ok(rng)
    }
}

/// FNV-1a over the seed bytes; stable across platforms and releases.
fn hash_seed(seed: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    seed.bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

impl GameRng {
    /// Create a new RNG from a seed string
    pub fn new(seed: &str) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(hash_seed(seed)),
            seed: seed.to_string(),
        }
    }

    /// Create a new RNG with a random printable seed
    pub fn from_entropy() -> Self {
        let seed = format!("{:016x}", rand::random::<u64>());
        Self::new(&seed)
    }

    /// Get the seed string used to create this RNG
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Uniform float in `[0, 1)`
    pub fn random(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Integer in `[min, max)` derived from [`random`](Self::random)
    ///
    /// Returns `min` when the range is empty.
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = f64::from(max - min);
        min + (self.random() * span).floor() as i32
    }

    /// Returns 0..n-1, or 0 if n is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Returns true with probability `p` (clamped to `[0, 1]`)
    pub fn chance(&mut self, p: f64) -> bool {
        self.random() < p.clamp(0.0, 1.0)
    }

    /// Returns true with probability percent/100
    pub fn percent(&mut self, percent: u32) -> bool {
        self.rn2(100) < percent
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as u32) as usize])
        }
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
