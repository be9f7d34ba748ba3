use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::KvError;

/// One feature vector, a single sequence position of a cache.
pub type Token = Vec<f32>;

/// An ordered sequence of equal-dimension tokens.
///
/// Serialises transparently as `[[f32]]`, which is the representation used on
/// the wire and in cache files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cache(Vec<Token>);

impl Cache {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.0
    }

    /// Feature dimensionality, taken from the first token.
    pub fn dimension(&self) -> Option<usize> {
        self.0.first().map(Vec::len)
    }

    /// Check that every token has the same length as the first one.
    ///
    /// Returns the shared dimensionality (`None` for an empty cache).
    pub fn validate_dimensions(&self) -> Result<Option<usize>, KvError> {
        let Some(expected) = self.dimension() else {
            return Ok(None);
        };
        for (index, token) in self.0.iter().enumerate() {
            if token.len() != expected {
                return Err(KvError::DimensionMismatch {
                    index,
                    expected,
                    found: token.len(),
                });
            }
        }
        Ok(Some(expected))
    }
}

impl From<Vec<Token>> for Cache {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

impl FromIterator<Token> for Cache {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<usize> for Cache {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Cache {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_has_no_dimension() {
        let cache = Cache::default();
        assert_eq!(cache.validate_dimensions(), Ok(None));
    }

    #[test]
    fn ragged_cache_reports_first_offender() {
        let cache = Cache::new(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0]]);
        assert_eq!(
            cache.validate_dimensions(),
            Err(KvError::DimensionMismatch {
                index: 2,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn serialises_as_nested_arrays() {
        let cache = Cache::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let json = serde_json::to_string(&cache).unwrap();
        assert_eq!(json, "[[1.0,2.0],[3.0,4.0]]");
        let back: Cache = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cache);
    }
}
