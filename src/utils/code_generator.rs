use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(test)]
use mockall::automock;

#[derive(Debug)]
pub enum TokenGeneratorError {
    InvalidLength(usize),
}

impl std::fmt::Display for TokenGeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenGeneratorError::InvalidLength(length) => {
                write!(f, "code length must be at least 1, got {}", length)
            }
        }
    }
}

impl std::error::Error for TokenGeneratorError {}

/// Produces the short code that identifies a game in confirmation links.
#[cfg_attr(test, automock)]
pub trait TokenGenerator: Send + Sync {
    fn generate_code(
        &self,
        prefix: &str,
        length: usize,
        seed_text: &str,
        timestamp_millis: i64,
    ) -> Result<String, TokenGeneratorError>;
}

/// Derives the code from the seed text and the timestamp, so two games saved
/// at different instants get different codes even with identical objectives.
pub struct SeededCodeGenerator;

impl TokenGenerator for SeededCodeGenerator {
    fn generate_code(
        &self,
        prefix: &str,
        length: usize,
        seed_text: &str,
        timestamp_millis: i64,
    ) -> Result<String, TokenGeneratorError> {
        if length == 0 {
            return Err(TokenGeneratorError::InvalidLength(length));
        }
        let mut hasher = DefaultHasher::new();
        seed_text.hash(&mut hasher);
        timestamp_millis.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        let code: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();
        Ok(format!("{}{}", prefix, code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_has_requested_length_and_prefix() {
        let generator = SeededCodeGenerator;
        let code = generator.generate_code("G-", 8, "objetivo", 1234).unwrap();

        assert!(code.starts_with("G-"));
        assert_eq!(code.len(), 10);
        assert!(code[2..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_same_inputs_give_same_code() {
        let generator = SeededCodeGenerator;
        let first = generator.generate_code("", 8, "objetivo", 99).unwrap();
        let second = generator.generate_code("", 8, "objetivo", 99).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_timestamps_give_different_codes() {
        let generator = SeededCodeGenerator;
        let first = generator.generate_code("", 8, "objetivo", 1).unwrap();
        let second = generator.generate_code("", 8, "objetivo", 2).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_different_seed_texts_give_different_codes() {
        let generator = SeededCodeGenerator;
        let first = generator.generate_code("", 8, "achar o tesouro", 7).unwrap();
        let second = generator.generate_code("", 8, "vencer a corrida", 7).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_zero_length_is_rejected() {
        let generator = SeededCodeGenerator;
        let result = generator.generate_code("", 0, "objetivo", 7);

        assert!(matches!(
            result,
            Err(TokenGeneratorError::InvalidLength(0))
        ));
    }
}
