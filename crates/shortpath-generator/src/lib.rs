pub mod error;
pub mod random;

pub use error::GeneratorError;
pub use random::{GeneratorSettings, RandomGenerator};

use shortpath_core::ShortPath;
use std::sync::Arc;

/// Trait for generating short paths.
///
/// Implementations are pure generators that don't interact with storage.
/// They are not required to produce unique values: the allocator checks
/// every candidate against the forward store and retries on collision.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortPath>;

    /// Generates a candidate short path.
    fn generate(&self) -> Self::Output;
}

impl<G: Generator> Generator for Arc<G> {
    type Output = G::Output;

    fn generate(&self) -> Self::Output {
        (**self).generate()
    }
}
