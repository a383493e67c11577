use crate::Generator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shortly_core::Slug;

/// Symbols a generated slug is drawn from.
pub const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated slug unless configured otherwise.
pub const DEFAULT_LENGTH: usize = 6;

/// Draws `length` symbols uniformly, with replacement, from [`ALPHABET`]
/// using the thread-local RNG.
///
/// Not cryptographically secure. A `length` of zero is treated as one so the
/// result is always a valid slug.
pub fn generate_slug(length: usize) -> Slug {
    draw(&mut rand::rng(), length)
}

fn draw<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Slug {
    let slug: String = (0..length.max(1))
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    Slug::new_unchecked(slug)
}

/// A slug generator over an injectable random source.
///
/// The default source is an OS-seeded [`StdRng`]. Use [`RandomGenerator::seeded`]
/// for reproducible sequences, or [`RandomGenerator::from_rng`] to supply any
/// other `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandomGenerator<R = StdRng> {
    rng: R,
    length: usize,
}

impl RandomGenerator<StdRng> {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Creates a generator whose output is fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomGenerator<R> {
    pub fn from_rng(rng: R) -> Self {
        Self {
            rng,
            length: DEFAULT_LENGTH,
        }
    }

    /// Sets the slug length. Zero is treated as one.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length.max(1);
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl<R: Rng + Send + 'static> Generator for RandomGenerator<R> {
    type Output = Slug;

    fn generate(&mut self) -> Self::Output {
        draw(&mut self.rng, self.length)
    }
}
