use crate::error::GeneratorError;
use crate::Generator;
use shortpath_core::short_path::{is_allowed_char, MAX_LENGTH};
use shortpath_core::ShortPath;
use std::collections::HashSet;
use typed_builder::TypedBuilder;

pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Configures a [`RandomGenerator`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct GeneratorSettings {
    /// Shortest generated path, inclusive.
    #[builder(default = 4)]
    pub min_length: usize,
    /// Longest generated path, inclusive.
    #[builder(default = 7)]
    pub max_length: usize,
    /// Ordered set of distinct characters to draw from.
    #[builder(default = DEFAULT_CHARSET.to_string(), setter(into))]
    pub charset: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.min_length == 0 || self.max_length == 0 {
            return Err(GeneratorError::ZeroLength);
        }
        if self.min_length > MAX_LENGTH || self.max_length > MAX_LENGTH {
            return Err(GeneratorError::TooLong { max: MAX_LENGTH });
        }
        if self.min_length > self.max_length {
            return Err(GeneratorError::InvertedRange {
                min: self.min_length,
                max: self.max_length,
            });
        }
        if self.charset.is_empty() {
            return Err(GeneratorError::EmptyCharset);
        }
        if !self.charset.chars().all(is_allowed_char) {
            return Err(GeneratorError::InvalidCharset);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.charset.chars().find(|c| !seen.insert(*c)) {
            return Err(GeneratorError::DuplicateChar(dup));
        }
        Ok(())
    }
}

/// Draws paths of uniformly random length in `[min_length, max_length]`,
/// each character uniformly from the charset.
///
/// Randomness comes from the thread-local RNG, so concurrent callers never
/// share generator state or seeds.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    min_length: usize,
    max_length: usize,
    charset: Vec<char>,
}

impl RandomGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, GeneratorError> {
        settings.validate()?;
        Ok(Self {
            min_length: settings.min_length,
            max_length: settings.max_length,
            charset: settings.charset.chars().collect(),
        })
    }
}

impl Generator for RandomGenerator {
    type Output = ShortPath;

    fn generate(&self) -> Self::Output {
        let length = if self.max_length > self.min_length {
            rand::random_range(self.min_length..=self.max_length)
        } else {
            self.min_length
        };

        let path: String = (0..length)
            .map(|_| self.charset[rand::random_range(0..self.charset.len())])
            .collect();

        // The charset was validated against the short path alphabet.
        ShortPath::new_unchecked(path)
    }
}
