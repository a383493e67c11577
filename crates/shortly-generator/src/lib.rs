pub mod random;

pub use random::{generate_slug, RandomGenerator, ALPHABET, DEFAULT_LENGTH};

use shortly_core::Slug;

/// Trait for generating slugs.
///
/// Implementations are pure generators that don't interact with storage.
/// Collisions are possible and are handled by the caller, which may ask
/// for another slug a bounded number of times.
pub trait Generator: Send + 'static {
    type Output: Into<Slug>;
    /// Generates a candidate slug.
    fn generate(&mut self) -> Self::Output;
}
